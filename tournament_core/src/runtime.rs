//! Runtime State Machine: per-match status transitions, finalize
//! idempotence, default-weekend, bulk operations, and desk move/swap.
//!
//! Every operation here is pure over the entities it's given — no store
//! I/O — mirroring how the Draw Plan Engine and Advancement Resolver are
//! built. The orchestration layer (not part of this crate's public
//! surface) is responsible for loading entities, calling these
//! functions, invoking Advancement where noted, and persisting results
//! inside one transaction.

use crate::errors::{CoreError, CoreResult};
use crate::ids::{MatchId, SlotId, TeamId};
use crate::model::enums::RuntimeStatus;
use crate::model::match_entity::Match;
use crate::model::schedule::{MatchAssignment, MinuteOfDay, ScheduleSlot, ScheduleVersion};
use crate::model::score::{default_score_for_duration, ScoreJson};
use crate::model::tournament::Tournament;
use crate::placement::compat::{is_compatible, EventRoundLookup, PlacementState};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

fn require_draft(version: &ScheduleVersion) -> CoreResult<()> {
    if version.status == crate::model::enums::VersionStatus::Draft {
        Ok(())
    } else {
        Err(CoreError::VersionNotDraft(version.id.to_string()))
    }
}

/// Any `SCHEDULED`/`DELAYED`/`IN_PROGRESS`/`PAUSED` transition except into
/// `FINAL`, which only [`finalize_match`] may perform.
#[instrument(name = "runtime.set_status", skip(version, m), fields(match_id = %m.id(), status = ?status))]
pub fn set_status(version: &ScheduleVersion, m: &mut Match, status: RuntimeStatus) -> CoreResult<()> {
    require_draft(version)?;
    if status == RuntimeStatus::Final {
        return Err(CoreError::Conflict(
            "FINAL is only reachable via finalize_match".to_string(),
        ));
    }
    if status == RuntimeStatus::InProgress && m.started_at().is_none() {
        m.set_started_at(Some(Utc::now()));
    }
    m.set_runtime_status(status);
    debug!("status_set");
    Ok(())
}

/// Transitions to FINAL. Re-finalizing with an identical winner+score is
/// a no-op; a different winner or score is a conflict unless the caller
/// uses [`correct_match`] instead.
#[instrument(name = "runtime.finalize_match", skip(version, m, score, at), fields(match_id = %m.id(), winner = %winner))]
pub fn finalize_match(
    version: &ScheduleVersion,
    m: &mut Match,
    winner: TeamId,
    score: ScoreJson,
    at: DateTime<Utc>,
) -> CoreResult<()> {
    require_draft(version)?;
    if !m.team_ids().any(|t| t == winner) {
        return Err(CoreError::Internal(format!(
            "winner {winner} is not a participant in match {}",
            m.match_code()
        )));
    }
    if m.runtime_status() == RuntimeStatus::Final {
        if m.winner_team_id() == Some(winner) && m.score_json() == Some(&score) {
            debug!("finalize_idempotent");
            return Ok(());
        }
        warn!("finalize_conflict");
        return Err(CoreError::Conflict(format!(
            "match {} is already FINAL with a different result",
            m.match_code()
        )));
    }
    m.finalize(winner, score, at);
    debug!("finalize_ok");
    Ok(())
}

/// Explicit correction of an already-FINAL match. Returns the prior
/// winner so the caller can clear stale downstream advancement before
/// re-running Advancement with the new winner.
pub fn correct_match(
    version: &ScheduleVersion,
    m: &mut Match,
    winner: TeamId,
    score: ScoreJson,
    at: DateTime<Utc>,
) -> CoreResult<Option<TeamId>> {
    require_draft(version)?;
    if !m.team_ids().any(|t| t == winner) {
        return Err(CoreError::Internal(format!(
            "winner {winner} is not a participant in match {}",
            m.match_code()
        )));
    }
    let old_winner = m.winner_team_id();
    m.finalize(winner, score, at);
    Ok(old_winner)
}

/// Default-weekend step (i), (ii): marks every eligible, both-sides-
/// assigned, non-terminal match involving `team` as FINAL with the
/// opponent winning and a stylized score. The caller is responsible for
/// marking the Team entity defaulted, running Advancement per touched
/// match, and re-invoking this function once more (advancement may just
/// have assigned the defaulted team into a new downstream match).
pub fn default_weekend(version: &ScheduleVersion, team: TeamId, matches: &mut [Match], at: DateTime<Utc>) -> CoreResult<Vec<MatchId>> {
    require_draft(version)?;
    let mut touched = Vec::new();
    for m in matches.iter_mut() {
        if m.runtime_status().is_terminal() || m.runtime_status() == RuntimeStatus::InProgress {
            continue;
        }
        if !m.is_assigned_both_sides() || !m.team_ids().any(|t| t == team) {
            continue;
        }
        let Some(opponent) = m.team_ids().find(|&t| t != team) else {
            continue;
        };
        let score = default_score_for_duration(m.duration_minutes());
        m.finalize(opponent, score, at);
        touched.push(m.id());
    }
    Ok(touched)
}

/// IN_PROGRESS → PAUSED for every match. Returns the count touched.
pub fn bulk_pause(matches: &mut [Match]) -> usize {
    bulk_transition(matches, RuntimeStatus::InProgress, RuntimeStatus::Paused)
}

/// PAUSED → IN_PROGRESS for every match. Returns the count touched.
pub fn bulk_resume(matches: &mut [Match]) -> usize {
    bulk_transition(matches, RuntimeStatus::Paused, RuntimeStatus::InProgress)
}

/// DELAYED → SCHEDULED for every match. Returns the count touched.
pub fn bulk_undelay(matches: &mut [Match]) -> usize {
    bulk_transition(matches, RuntimeStatus::Delayed, RuntimeStatus::Scheduled)
}

fn bulk_transition(matches: &mut [Match], from: RuntimeStatus, to: RuntimeStatus) -> usize {
    let mut n = 0;
    for m in matches.iter_mut() {
        if m.runtime_status() == from {
            m.set_runtime_status(to);
            n += 1;
        }
    }
    n
}

/// SCHEDULED → DELAYED for every match whose assigned slot starts at or
/// after `threshold_minute`, optionally restricted to one day.
pub fn bulk_delay(
    matches: &mut [Match],
    slot_of_match: &HashMap<MatchId, (NaiveDate, MinuteOfDay)>,
    threshold_minute: MinuteOfDay,
    only_day: Option<NaiveDate>,
) -> usize {
    let mut n = 0;
    for m in matches.iter_mut() {
        if m.runtime_status() != RuntimeStatus::Scheduled {
            continue;
        }
        let Some(&(day, start)) = slot_of_match.get(&m.id()) else {
            continue;
        };
        if let Some(target_day) = only_day {
            if day != target_day {
                continue;
            }
        }
        if start >= threshold_minute {
            m.set_runtime_status(RuntimeStatus::Delayed);
            n += 1;
        }
    }
    n
}

/// Moves an existing assignment to `target_slot`, validating slot
/// freedom, duration fit, and that stage ordering/rest still hold (reuses
/// the same compatibility test Placement uses).
#[allow(clippy::too_many_arguments)]
pub fn move_match(
    version: &ScheduleVersion,
    assignment: &mut MatchAssignment,
    m: &Match,
    target_slot: &ScheduleSlot,
    state: &PlacementState,
    matches_by_id: &HashMap<MatchId, &Match>,
    excluded_slots: &std::collections::HashSet<SlotId>,
    event_round_matches: &EventRoundLookup,
) -> CoreResult<()> {
    require_draft(version)?;
    if !is_compatible(m, target_slot, state, matches_by_id, excluded_slots, None, event_round_matches) {
        return Err(CoreError::Conflict(format!(
            "slot {} is not available for match {}",
            target_slot.id, m.match_code()
        )));
    }
    assignment.slot_id = target_slot.id;
    Ok(())
}

/// Atomic two-match slot exchange. Both directions must fit the other
/// match's duration; full dependency/rest re-validation is left to the
/// caller via [`move_match`] if a swap needs it (a straight swap between
/// two already-valid placements rarely changes either side's rest
/// window).
pub fn swap_matches(
    version: &ScheduleVersion,
    assignment_a: &mut MatchAssignment,
    match_a: &Match,
    slot_b: &ScheduleSlot,
    assignment_b: &mut MatchAssignment,
    match_b: &Match,
    slot_a: &ScheduleSlot,
) -> CoreResult<()> {
    require_draft(version)?;
    if !slot_b.fits(match_a.duration_minutes()) || !slot_a.fits(match_b.duration_minutes()) {
        return Err(CoreError::Capacity(format!(
            "swap of {} and {} does not fit both durations",
            match_a.match_code(),
            match_b.match_code()
        )));
    }
    assignment_a.slot_id = slot_b.id;
    assignment_b.slot_id = slot_a.id;
    Ok(())
}

/// Inserts a new ScheduleSlot at (day, start, end, court); id is assigned
/// by the entity store on save, same as every other entity.
pub fn add_slot(
    version_id: crate::ids::ScheduleVersionId,
    day_date: NaiveDate,
    start_minute: MinuteOfDay,
    end_minute: MinuteOfDay,
    court_number: u32,
) -> ScheduleSlot {
    ScheduleSlot {
        id: SlotId(0),
        version_id,
        day_date,
        start_minute,
        end_minute,
        court_number,
        block_minutes: end_minute.saturating_sub(start_minute),
        is_active: true,
    }
}

/// Appends a court label and optionally synthesizes matching slots across
/// every existing time window on `days`.
pub fn add_court(
    tournament: &mut Tournament,
    label: impl Into<String>,
    version_id: crate::ids::ScheduleVersionId,
    existing_windows: &[(NaiveDate, MinuteOfDay, MinuteOfDay)],
    synthesize_slots: bool,
) -> Vec<ScheduleSlot> {
    let court_number = tournament.court_count() as u32 + 1;
    tournament.push_court(label);
    if !synthesize_slots {
        return Vec::new();
    }
    existing_windows
        .iter()
        .map(|&(day, start, end)| add_slot(version_id, day, start, end, court_number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{EventId, ScheduleVersionId, TournamentId};
    use crate::model::enums::MatchType;

    fn draft_version() -> ScheduleVersion {
        ScheduleVersion {
            id: ScheduleVersionId(1),
            tournament_id: TournamentId(1),
            status: crate::model::enums::VersionStatus::Draft,
            tag: "Desk Draft".to_string(),
        }
    }

    fn m() -> Match {
        let mut m = Match::new(
            MatchId(1),
            TournamentId(1),
            EventId(1),
            ScheduleVersionId(1),
            "M1",
            MatchType::Main,
            1,
            0,
            60,
        );
        m.set_team_a(Some(TeamId(1)));
        m.set_team_b(Some(TeamId(2)));
        m
    }

    #[test]
    fn reentrant_finalize_with_same_result_is_a_no_op() {
        let version = draft_version();
        let mut match_ = m();
        let score = ScoreJson::display("6-0, 6-0");
        let now = Utc::now();
        finalize_match(&version, &mut match_, TeamId(1), score.clone(), now).unwrap();
        let result = finalize_match(&version, &mut match_, TeamId(1), score, now);
        assert!(result.is_ok());
    }

    #[test]
    fn finalize_with_different_winner_conflicts() {
        let version = draft_version();
        let mut match_ = m();
        finalize_match(&version, &mut match_, TeamId(1), ScoreJson::display("a"), Utc::now()).unwrap();
        let result = finalize_match(&version, &mut match_, TeamId(2), ScoreJson::display("b"), Utc::now());
        assert!(result.unwrap_err().is_conflict());
    }

    #[test]
    fn set_status_rejects_final() {
        let version = draft_version();
        let mut match_ = m();
        let result = set_status(&version, &mut match_, RuntimeStatus::Final);
        assert!(result.is_err());
    }

    #[test]
    fn swap_requires_duration_fit_both_ways() {
        let version = draft_version();
        let match_a = m();
        let mut match_b = m();
        match_b.set_duration_minutes(90);

        let mut assignment_a = MatchAssignment {
            id: crate::ids::AssignmentId(1),
            version_id: ScheduleVersionId(1),
            match_id: MatchId(1),
            slot_id: SlotId(1),
            assigned_by: crate::model::enums::AssignedBy::AutoAssignV1,
            locked: false,
        };
        let mut assignment_b = MatchAssignment {
            id: crate::ids::AssignmentId(2),
            version_id: ScheduleVersionId(1),
            match_id: MatchId(2),
            slot_id: SlotId(2),
            assigned_by: crate::model::enums::AssignedBy::AutoAssignV1,
            locked: false,
        };
        let slot_a = ScheduleSlot {
            id: SlotId(1),
            version_id: ScheduleVersionId(1),
            day_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            start_minute: 540,
            end_minute: 600,
            court_number: 1,
            block_minutes: 60,
            is_active: true,
        };
        let slot_b = ScheduleSlot { block_minutes: 60, ..slot_a };
        let result = swap_matches(&version, &mut assignment_a, &match_a, &slot_b, &mut assignment_b, &match_b, &slot_a);
        assert!(result.is_err());
    }
}
