//! The persistence interface the core consumes.
//!
//! Transport, request validation, authentication and the concrete schema
//! behind this trait are all external collaborators; the core only ever
//! talks to `EntityStorePort`.

use crate::ids::{
    AssignmentId, EventId, MatchId, MatchLockId, ScheduleVersionId, SlotId, SlotLockId, TeamId,
    TournamentId,
};
use crate::model::{
    CourtState, Event, Match, MatchAssignment, MatchLock, ScheduleSlot, ScheduleVersion,
    SlotLock, Team, Tournament,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// update could not find a row matching id + version
    #[error("optimistic lock conflict")]
    OptimisticLockConflict,

    /// id does not exist
    #[error("entity not found")]
    NotFound,

    /// unique constraint violated (e.g. match_code)
    #[error("unique violation{0:?}")]
    UniqueViolation(Option<String>),

    /// transient store problem, a retry may succeed
    #[error("serialization failure")]
    SerializationFailure,

    /// connection, pool, or other store errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the core needs from persistence, grouped by entity. A single
/// implementor is expected to implement all of these; they are kept as
/// separate traits so test doubles can stub out only what a given test
/// exercises.
#[async_trait]
pub trait EsTournaments: Send + Sync {
    async fn get_tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;
    async fn save_tournament(&self, tournament: &Tournament) -> StoreResult<Tournament>;
}

#[async_trait]
pub trait EsEvents: Send + Sync {
    async fn get_event(&self, id: EventId) -> StoreResult<Option<Event>>;
    async fn save_event(&self, event: &Event) -> StoreResult<Event>;
    async fn list_events_of_tournament(&self, tournament: TournamentId) -> StoreResult<Vec<Event>>;
}

#[async_trait]
pub trait EsTeams: Send + Sync {
    async fn get_team(&self, id: TeamId) -> StoreResult<Option<Team>>;
    async fn save_team(&self, team: &Team) -> StoreResult<Team>;
    async fn list_teams_of_event(&self, event: EventId) -> StoreResult<Vec<Team>>;
}

#[async_trait]
pub trait EsVersions: Send + Sync {
    async fn get_version(&self, id: ScheduleVersionId) -> StoreResult<Option<ScheduleVersion>>;
    async fn save_version(&self, version: &ScheduleVersion) -> StoreResult<ScheduleVersion>;
    async fn list_versions_of_tournament(
        &self,
        tournament: TournamentId,
    ) -> StoreResult<Vec<ScheduleVersion>>;
}

#[async_trait]
pub trait EsMatches: Send + Sync {
    async fn get_match(&self, id: MatchId) -> StoreResult<Option<Match>>;
    async fn save_match(&self, m: &Match) -> StoreResult<Match>;
    async fn save_matches(&self, ms: &[Match]) -> StoreResult<Vec<Match>> {
        let mut out = Vec::with_capacity(ms.len());
        for m in ms {
            out.push(self.save_match(m).await?);
        }
        Ok(out)
    }
    async fn list_matches_of_version(&self, version: ScheduleVersionId) -> StoreResult<Vec<Match>>;
    async fn delete_matches(&self, ids: &[MatchId]) -> StoreResult<()>;
}

#[async_trait]
pub trait EsSlots: Send + Sync {
    async fn get_slot(&self, id: SlotId) -> StoreResult<Option<ScheduleSlot>>;
    async fn save_slot(&self, slot: &ScheduleSlot) -> StoreResult<ScheduleSlot>;
    async fn save_slots(&self, slots: &[ScheduleSlot]) -> StoreResult<Vec<ScheduleSlot>> {
        let mut out = Vec::with_capacity(slots.len());
        for s in slots {
            out.push(self.save_slot(s).await?);
        }
        Ok(out)
    }
    async fn list_slots_of_version(&self, version: ScheduleVersionId) -> StoreResult<Vec<ScheduleSlot>>;
    async fn delete_slots(&self, ids: &[SlotId]) -> StoreResult<()>;
}

#[async_trait]
pub trait EsAssignments: Send + Sync {
    async fn get_assignment(&self, id: AssignmentId) -> StoreResult<Option<MatchAssignment>>;
    async fn save_assignment(&self, a: &MatchAssignment) -> StoreResult<MatchAssignment>;
    async fn save_assignments(
        &self,
        assignments: &[MatchAssignment],
    ) -> StoreResult<Vec<MatchAssignment>> {
        let mut out = Vec::with_capacity(assignments.len());
        for a in assignments {
            out.push(self.save_assignment(a).await?);
        }
        Ok(out)
    }
    async fn list_assignments_of_version(
        &self,
        version: ScheduleVersionId,
    ) -> StoreResult<Vec<MatchAssignment>>;
    async fn delete_assignments(&self, ids: &[AssignmentId]) -> StoreResult<()>;
}

#[async_trait]
pub trait EsLocks: Send + Sync {
    async fn list_match_locks(&self, version: ScheduleVersionId) -> StoreResult<Vec<MatchLock>>;
    async fn save_match_lock(&self, lock: &MatchLock) -> StoreResult<MatchLock>;
    async fn delete_match_lock(&self, id: MatchLockId) -> StoreResult<()>;

    async fn list_slot_locks(&self, version: ScheduleVersionId) -> StoreResult<Vec<SlotLock>>;
    async fn save_slot_lock(&self, lock: &SlotLock) -> StoreResult<SlotLock>;
    async fn delete_slot_lock(&self, id: SlotLockId) -> StoreResult<()>;
}

#[async_trait]
pub trait EsCourtState: Send + Sync {
    async fn list_court_states(&self, tournament: TournamentId) -> StoreResult<Vec<CourtState>>;
    async fn save_court_state(&self, state: &CourtState) -> StoreResult<CourtState>;
}

/// Umbrella port the core is built against.
pub trait EntityStorePort:
    EsTournaments + EsEvents + EsTeams + EsVersions + EsMatches + EsSlots + EsAssignments + EsLocks + EsCourtState
{
}

impl<T> EntityStorePort for T where
    T: EsTournaments
        + EsEvents
        + EsTeams
        + EsVersions
        + EsMatches
        + EsSlots
        + EsAssignments
        + EsLocks
        + EsCourtState
{
}
