//! Preview: a pure, non-mutating first-fit pass over the affected
//! match set, sharing [`crate::placement::compat::is_compatible`] with
//! the two ordinary placement drivers.

use super::is_lost;
use crate::ids::{MatchId, SlotId};
use crate::master_sequence::type_rank;
use crate::model::enums::{MatchType, RescheduleMode, RuntimeStatus, ScoringFormat};
use crate::model::match_entity::Match;
use crate::model::schedule::{MatchAssignment, MatchLock, MinuteOfDay, ScheduleSlot};
use crate::placement::compat::{is_compatible, PlacementState};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedMove {
    pub match_id: MatchId,
    pub slot_id: SlotId,
    pub new_duration_minutes: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ReschedulePreview {
    pub moves: Vec<ProposedMove>,
    /// Affected matches for which no compatible slot was found
    ///.
    pub unresolved: Vec<MatchId>,
}

fn standard_duration(m: &Match, new_format: Option<ScoringFormat>) -> u32 {
    match new_format {
        Some(format) if m.match_type() != MatchType::Wf => format.duration_minutes(),
        _ => m.duration_minutes(),
    }
}

/// Computes the proposed moves for one disruption without mutating
/// anything. `additional_slots` covers extended-day/overflow synthesis —
/// the caller builds those slots (mirroring [`crate::runtime::add_slot`])
/// and passes them in alongside the existing grid.
#[instrument(
    name = "reschedule.preview_reschedule",
    skip(matches, existing_slots, additional_slots, assignments, match_locks, unavailable_courts),
    fields(mode = ?mode, affected_day = %affected_day)
)]
#[allow(clippy::too_many_arguments)]
pub fn preview_reschedule(
    matches: &[Match],
    existing_slots: &[ScheduleSlot],
    additional_slots: &[ScheduleSlot],
    assignments: &[MatchAssignment],
    match_locks: &[MatchLock],
    mode: RescheduleMode,
    affected_day: NaiveDate,
    unavailable_from: Option<MinuteOfDay>,
    available_from: Option<MinuteOfDay>,
    unavailable_courts: &[u32],
    new_scoring_format: Option<ScoringFormat>,
) -> ReschedulePreview {
    let matches_by_id: HashMap<MatchId, &Match> = matches.iter().map(|m| (m.id(), m)).collect();
    let slots_by_id: HashMap<SlotId, &ScheduleSlot> =
        existing_slots.iter().chain(additional_slots.iter()).map(|s| (s.id, s)).collect();
    let assignment_by_match: HashMap<MatchId, &MatchAssignment> =
        assignments.iter().map(|a| (a.match_id, a)).collect();
    let locked_matches: HashSet<MatchId> = match_locks
        .iter()
        .map(|l| l.match_id)
        .chain(assignments.iter().filter(|a| a.locked).map(|a| a.match_id))
        .collect();

    let is_lost_slot = |slot: &ScheduleSlot| {
        is_lost(slot, mode, affected_day, unavailable_from, available_from, unavailable_courts)
    };

    let affected: Vec<&Match> = matches
        .iter()
        .filter(|m| !m.runtime_status().is_terminal() && m.runtime_status() != RuntimeStatus::InProgress)
        .filter(|m| !locked_matches.contains(&m.id()))
        .filter(|m| match assignment_by_match.get(&m.id()) {
            Some(a) => slots_by_id.get(&a.slot_id).map(|s| is_lost_slot(s)).unwrap_or(false),
            None => true,
        })
        .collect();
    let affected_ids: HashSet<MatchId> = affected.iter().map(|m| m.id()).collect();

    // Slots kept by matches that are neither affected nor going away stay
    // off the target pool; everything else not lost is fair game.
    let occupied_by_kept: HashSet<SlotId> = assignment_by_match
        .values()
        .filter(|a| !affected_ids.contains(&a.match_id))
        .map(|a| a.slot_id)
        .collect();
    let mut target_slots: Vec<&ScheduleSlot> = existing_slots
        .iter()
        .chain(additional_slots.iter())
        .filter(|s| s.is_active)
        .filter(|s| !is_lost_slot(s))
        .filter(|s| !occupied_by_kept.contains(&s.id))
        .collect();
    target_slots.sort_by_key(|s| (s.day_date != affected_day, s.day_date, s.start_minute, s.court_number, s.id.0));

    let mut with_original: Vec<(&Match, NaiveDate, MinuteOfDay)> = Vec::new();
    let mut without_original: Vec<&Match> = Vec::new();
    for &m in &affected {
        match assignment_by_match.get(&m.id()).and_then(|a| slots_by_id.get(&a.slot_id)) {
            Some(slot) => with_original.push((m, slot.day_date, slot.start_minute)),
            None => without_original.push(m),
        }
    }
    with_original.sort_by_key(|&(_, day, start)| (day, start));
    without_original.sort_by_key(|m| (type_rank(m.match_type()), m.round_index(), m.sequence_in_round()));

    let ordered: Vec<&Match> = with_original.into_iter().map(|(m, _, _)| m).chain(without_original).collect();

    // Seed the placement state with every kept assignment so dependency
    // and rest bookkeeping accounts for matches that stay where they are.
    let mut state = PlacementState::default();
    for a in assignments {
        if affected_ids.contains(&a.match_id) {
            continue;
        }
        if let (Some(&m), Some(&slot)) = (matches_by_id.get(&a.match_id), slots_by_id.get(&a.slot_id)) {
            state.record(m, slot);
        }
    }

    let event_round_lookup = |event: crate::ids::EventId, mt: MatchType, round: u32| -> Vec<MatchId> {
        matches
            .iter()
            .filter(|m| m.event_id() == event && m.match_type() == mt && m.round_index() == round)
            .map(|m| m.id())
            .collect()
    };

    let excluded_slots: HashSet<SlotId> = HashSet::new();
    let mut used: HashSet<SlotId> = HashSet::new();
    let mut moves = Vec::new();
    let mut unresolved = Vec::new();

    for m in ordered {
        let mut duration_override = m.clone();
        let effective_duration = standard_duration(m, new_scoring_format);
        duration_override.set_duration_minutes(effective_duration);

        let found = target_slots.iter().find(|s| {
            !used.contains(&s.id)
                && is_compatible(&duration_override, s, &state, &matches_by_id, &excluded_slots, None, &event_round_lookup)
        });

        match found {
            Some(&slot) => {
                used.insert(slot.id);
                state.record(&duration_override, slot);
                moves.push(ProposedMove {
                    match_id: m.id(),
                    slot_id: slot.id,
                    new_duration_minutes: if effective_duration != m.duration_minutes() {
                        Some(effective_duration)
                    } else {
                        None
                    },
                });
            }
            None => unresolved.push(m.id()),
        }
    }

    info!(move_count = moves.len(), unresolved_count = unresolved.len(), "reschedule_previewed");
    ReschedulePreview { moves, unresolved }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{AssignmentId, EventId, ScheduleVersionId, TeamId, TournamentId};

    fn slot(id: i64, day: NaiveDate, start: MinuteOfDay, court: u32) -> ScheduleSlot {
        ScheduleSlot {
            id: SlotId(id),
            version_id: ScheduleVersionId(1),
            day_date: day,
            start_minute: start,
            end_minute: start + 60,
            court_number: court,
            block_minutes: 60,
            is_active: true,
        }
    }

    fn m(id: i64) -> Match {
        let mut m = Match::new(
            MatchId(id),
            TournamentId(1),
            EventId(1),
            ScheduleVersionId(1),
            format!("M{id}"),
            MatchType::Main,
            1,
            0,
            60,
        );
        m.set_team_a(Some(TeamId(id)));
        m.set_team_b(Some(TeamId(id + 100)));
        m
    }

    #[test]
    fn match_displaced_by_court_loss_moves_to_a_surviving_court() {
        let day = NaiveDate::from_ymd_opt(2026, 6, 6).unwrap();
        let matches = vec![m(1)];
        let slots = vec![slot(1, day, 540, 1), slot(2, day, 540, 2)];
        let assignments = vec![MatchAssignment {
            id: AssignmentId(1),
            version_id: ScheduleVersionId(1),
            match_id: MatchId(1),
            slot_id: SlotId(1),
            assigned_by: crate::model::enums::AssignedBy::AutoAssignV1,
            locked: false,
        }];
        let preview = preview_reschedule(
            &matches,
            &slots,
            &[],
            &assignments,
            &[],
            RescheduleMode::CourtLoss,
            day,
            None,
            None,
            &[1],
            None,
        );
        assert_eq!(preview.moves.len(), 1);
        assert_eq!(preview.moves[0].slot_id, SlotId(2));
        assert!(preview.unresolved.is_empty());
    }

    #[test]
    fn no_surviving_slot_reports_unresolved() {
        let day = NaiveDate::from_ymd_opt(2026, 6, 6).unwrap();
        let matches = vec![m(1)];
        let slots = vec![slot(1, day, 540, 1)];
        let assignments = vec![MatchAssignment {
            id: AssignmentId(1),
            version_id: ScheduleVersionId(1),
            match_id: MatchId(1),
            slot_id: SlotId(1),
            assigned_by: crate::model::enums::AssignedBy::AutoAssignV1,
            locked: false,
        }];
        let preview = preview_reschedule(
            &matches,
            &slots,
            &[],
            &assignments,
            &[],
            RescheduleMode::FullWashout,
            day,
            None,
            None,
            &[],
            None,
        );
        assert!(preview.moves.is_empty());
        assert_eq!(preview.unresolved, vec![MatchId(1)]);
    }
}
