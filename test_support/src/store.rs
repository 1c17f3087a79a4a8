//! In-memory `EntityStorePort`. Every entity lives in its own
//! `Arc<Mutex<HashMap<_, _>>>`; ids are handed out by atomic counters the
//! same way a real store's auto-increment column would.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use tournament_core::ids::{
    AssignmentId, EventId, MatchId, MatchLockId, ScheduleVersionId, SlotId, SlotLockId, TeamId,
    TournamentId,
};
use tournament_core::model::{
    CourtState, Event, Match, MatchAssignment, MatchLock, ScheduleSlot, ScheduleVersion, SlotLock,
    Team, Tournament,
};
use tournament_core::ports::store::{
    EsAssignments, EsCourtState, EsEvents, EsLocks, EsMatches, EsSlots, EsTeams, EsTournaments,
    EsVersions, StoreResult,
};

#[derive(Default)]
struct Counters {
    version_id: AtomicI64,
    match_id: AtomicI64,
    slot_id: AtomicI64,
    assignment_id: AtomicI64,
    match_lock_id: AtomicI64,
    slot_lock_id: AtomicI64,
}

impl Counters {
    fn next_version(&self) -> ScheduleVersionId {
        ScheduleVersionId(self.version_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
    fn next_match(&self) -> MatchId {
        MatchId(self.match_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
    fn next_slot(&self) -> SlotId {
        SlotId(self.slot_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
    fn next_assignment(&self) -> AssignmentId {
        AssignmentId(self.assignment_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
    fn next_match_lock(&self) -> MatchLockId {
        MatchLockId(self.match_lock_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
    fn next_slot_lock(&self) -> SlotLockId {
        SlotLockId(self.slot_lock_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// In-memory stand-in for a production store, implementing
/// `EntityStorePort` the way a real database adapter would.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    tournaments: Arc<Mutex<HashMap<TournamentId, Tournament>>>,
    events: Arc<Mutex<HashMap<EventId, Event>>>,
    teams: Arc<Mutex<HashMap<TeamId, Team>>>,
    versions: Arc<Mutex<HashMap<ScheduleVersionId, ScheduleVersion>>>,
    matches: Arc<Mutex<HashMap<MatchId, Match>>>,
    slots: Arc<Mutex<HashMap<SlotId, ScheduleSlot>>>,
    assignments: Arc<Mutex<HashMap<AssignmentId, MatchAssignment>>>,
    match_locks: Arc<Mutex<HashMap<MatchLockId, MatchLock>>>,
    slot_locks: Arc<Mutex<HashMap<SlotLockId, SlotLock>>>,
    court_states: Arc<Mutex<HashMap<(TournamentId, u32), CourtState>>>,
    counters: Arc<Counters>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_tournament(&self, t: Tournament) -> TournamentId {
        let id = t.id();
        self.tournaments.lock().unwrap().insert(id, t);
        id
    }

    pub fn seed_event(&self, e: Event) -> EventId {
        let id = e.id();
        self.events.lock().unwrap().insert(id, e);
        id
    }

    pub fn seed_team(&self, t: Team) -> TeamId {
        let id = t.id();
        self.teams.lock().unwrap().insert(id, t);
        id
    }

    pub fn seed_version(&self, v: ScheduleVersion) -> ScheduleVersionId {
        let id = v.id;
        self.versions.lock().unwrap().insert(id, v);
        id
    }

    pub fn seed_matches(&self, matches: Vec<Match>) {
        let mut guard = self.matches.lock().unwrap();
        for m in matches {
            guard.insert(m.id(), m);
        }
    }

    pub fn seed_slots(&self, slots: Vec<ScheduleSlot>) {
        let mut guard = self.slots.lock().unwrap();
        for s in slots {
            guard.insert(s.id, s);
        }
    }

    pub fn seed_assignments(&self, assignments: Vec<MatchAssignment>) {
        let mut guard = self.assignments.lock().unwrap();
        for a in assignments {
            guard.insert(a.id, a);
        }
    }

    pub fn snapshot_matches(&self) -> Vec<Match> {
        self.matches.lock().unwrap().values().cloned().collect()
    }

    pub fn snapshot_slots(&self) -> Vec<ScheduleSlot> {
        self.slots.lock().unwrap().values().cloned().collect()
    }

    pub fn snapshot_assignments(&self) -> Vec<MatchAssignment> {
        self.assignments.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl EsTournaments for InMemoryEntityStore {
    async fn get_tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.tournaments.lock().unwrap().get(&id).cloned())
    }

    async fn save_tournament(&self, tournament: &Tournament) -> StoreResult<Tournament> {
        let t = tournament.clone();
        self.tournaments.lock().unwrap().insert(t.id(), t.clone());
        Ok(t)
    }
}

#[async_trait]
impl EsEvents for InMemoryEntityStore {
    async fn get_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        Ok(self.events.lock().unwrap().get(&id).cloned())
    }

    async fn save_event(&self, event: &Event) -> StoreResult<Event> {
        let e = event.clone();
        self.events.lock().unwrap().insert(e.id(), e.clone());
        Ok(e)
    }

    async fn list_events_of_tournament(&self, tournament: TournamentId) -> StoreResult<Vec<Event>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.tournament_id() == tournament)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EsTeams for InMemoryEntityStore {
    async fn get_team(&self, id: TeamId) -> StoreResult<Option<Team>> {
        Ok(self.teams.lock().unwrap().get(&id).cloned())
    }

    async fn save_team(&self, team: &Team) -> StoreResult<Team> {
        let t = team.clone();
        self.teams.lock().unwrap().insert(t.id(), t.clone());
        Ok(t)
    }

    async fn list_teams_of_event(&self, event: EventId) -> StoreResult<Vec<Team>> {
        Ok(self
            .teams
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.event_id() == event)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EsVersions for InMemoryEntityStore {
    async fn get_version(&self, id: ScheduleVersionId) -> StoreResult<Option<ScheduleVersion>> {
        Ok(self.versions.lock().unwrap().get(&id).cloned())
    }

    async fn save_version(&self, version: &ScheduleVersion) -> StoreResult<ScheduleVersion> {
        let mut v = version.clone();
        if !v.id.is_persisted() {
            v.id = self.counters.next_version();
        }
        self.versions.lock().unwrap().insert(v.id, v.clone());
        Ok(v)
    }

    async fn list_versions_of_tournament(
        &self,
        tournament: TournamentId,
    ) -> StoreResult<Vec<ScheduleVersion>> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.tournament_id == tournament)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EsMatches for InMemoryEntityStore {
    async fn get_match(&self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.matches.lock().unwrap().get(&id).cloned())
    }

    async fn save_match(&self, m: &Match) -> StoreResult<Match> {
        let mut m = m.clone();
        if !m.id().is_persisted() {
            m.set_id(self.counters.next_match());
        }
        self.matches.lock().unwrap().insert(m.id(), m.clone());
        Ok(m)
    }

    async fn list_matches_of_version(&self, version: ScheduleVersionId) -> StoreResult<Vec<Match>> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.version_id() == version)
            .cloned()
            .collect())
    }

    async fn delete_matches(&self, ids: &[MatchId]) -> StoreResult<()> {
        let mut guard = self.matches.lock().unwrap();
        for id in ids {
            guard.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl EsSlots for InMemoryEntityStore {
    async fn get_slot(&self, id: SlotId) -> StoreResult<Option<ScheduleSlot>> {
        Ok(self.slots.lock().unwrap().get(&id).cloned())
    }

    async fn save_slot(&self, slot: &ScheduleSlot) -> StoreResult<ScheduleSlot> {
        let mut s = *slot;
        if !s.id.is_persisted() {
            s.id = self.counters.next_slot();
        }
        self.slots.lock().unwrap().insert(s.id, s);
        Ok(s)
    }

    async fn list_slots_of_version(&self, version: ScheduleVersionId) -> StoreResult<Vec<ScheduleSlot>> {
        Ok(self
            .slots
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.version_id == version)
            .copied()
            .collect())
    }

    async fn delete_slots(&self, ids: &[SlotId]) -> StoreResult<()> {
        let mut guard = self.slots.lock().unwrap();
        for id in ids {
            guard.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl EsAssignments for InMemoryEntityStore {
    async fn get_assignment(&self, id: AssignmentId) -> StoreResult<Option<MatchAssignment>> {
        Ok(self.assignments.lock().unwrap().get(&id).cloned())
    }

    async fn save_assignment(&self, a: &MatchAssignment) -> StoreResult<MatchAssignment> {
        let mut a = *a;
        if !a.id.is_persisted() {
            a.id = self.counters.next_assignment();
        }
        self.assignments.lock().unwrap().insert(a.id, a);
        Ok(a)
    }

    async fn list_assignments_of_version(
        &self,
        version: ScheduleVersionId,
    ) -> StoreResult<Vec<MatchAssignment>> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.version_id == version)
            .copied()
            .collect())
    }

    async fn delete_assignments(&self, ids: &[AssignmentId]) -> StoreResult<()> {
        let mut guard = self.assignments.lock().unwrap();
        for id in ids {
            guard.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl EsLocks for InMemoryEntityStore {
    async fn list_match_locks(&self, version: ScheduleVersionId) -> StoreResult<Vec<MatchLock>> {
        Ok(self
            .match_locks
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.version_id == version)
            .copied()
            .collect())
    }

    async fn save_match_lock(&self, lock: &MatchLock) -> StoreResult<MatchLock> {
        let mut l = *lock;
        if !l.id.is_persisted() {
            l.id = self.counters.next_match_lock();
        }
        self.match_locks.lock().unwrap().insert(l.id, l);
        Ok(l)
    }

    async fn delete_match_lock(&self, id: MatchLockId) -> StoreResult<()> {
        self.match_locks.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn list_slot_locks(&self, version: ScheduleVersionId) -> StoreResult<Vec<SlotLock>> {
        Ok(self
            .slot_locks
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.version_id == version)
            .copied()
            .collect())
    }

    async fn save_slot_lock(&self, lock: &SlotLock) -> StoreResult<SlotLock> {
        let mut l = *lock;
        if !l.id.is_persisted() {
            l.id = self.counters.next_slot_lock();
        }
        self.slot_locks.lock().unwrap().insert(l.id, l);
        Ok(l)
    }

    async fn delete_slot_lock(&self, id: SlotLockId) -> StoreResult<()> {
        self.slot_locks.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[async_trait]
impl EsCourtState for InMemoryEntityStore {
    async fn list_court_states(&self, tournament: TournamentId) -> StoreResult<Vec<CourtState>> {
        Ok(self
            .court_states
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.tournament_id == tournament)
            .cloned()
            .collect())
    }

    async fn save_court_state(&self, state: &CourtState) -> StoreResult<CourtState> {
        let c = state.clone();
        self.court_states
            .lock()
            .unwrap()
            .insert((c.tournament_id, c.court_number), c.clone());
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tournament_core::model::{MatchType, VersionStatus};

    fn tournament() -> Tournament {
        let today = Utc::now().date_naive();
        Tournament::new(TournamentId(1), "Spring Open", "Europe/Berlin", today, today)
    }

    #[tokio::test]
    async fn round_trips_a_tournament() {
        let store = InMemoryEntityStore::new();
        store.seed_tournament(tournament());
        let got = store.get_tournament(TournamentId(1)).await.unwrap();
        assert_eq!(got.unwrap().name(), "Spring Open");
    }

    #[tokio::test]
    async fn save_match_assigns_an_id_when_unpersisted() {
        let store = InMemoryEntityStore::new();
        let m = Match::new(
            MatchId(0),
            TournamentId(1),
            EventId(1),
            ScheduleVersionId(1),
            "E1_MAIN_R1_M01",
            MatchType::Main,
            1,
            0,
            60,
        );
        let saved = store.save_match(&m).await.unwrap();
        assert!(saved.id().is_persisted());
    }

    #[tokio::test]
    async fn lists_assignments_scoped_to_their_version() {
        let store = InMemoryEntityStore::new();
        let v = ScheduleVersion { id: ScheduleVersionId(1), tournament_id: TournamentId(1), status: VersionStatus::Draft, tag: String::new() };
        store.seed_version(v);
        store.seed_assignments(vec![MatchAssignment {
            id: AssignmentId(1),
            version_id: ScheduleVersionId(1),
            match_id: MatchId(1),
            slot_id: SlotId(1),
            assigned_by: tournament_core::model::AssignedBy::AutoAssignV1,
            locked: false,
        }]);
        let listed = store.list_assignments_of_version(ScheduleVersionId(1)).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
