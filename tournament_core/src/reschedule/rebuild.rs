//! Rebuild: blows away non-FINAL assignments and slots on a set
//! of days, regenerates the grid from day configs, and first-fits every
//! remaining match back in with the tightened rest floor.

use crate::ids::{AssignmentId, EventId, MatchId, ScheduleVersionId, SlotId};
use crate::master_sequence::type_rank;
use crate::model::enums::{DropConsolationMode, MatchType, RuntimeStatus, ScoringFormat};
use crate::model::match_entity::Match;
use crate::model::schedule::{MatchAssignment, MinuteOfDay, ScheduleSlot};
use crate::placement::compat::{EventRoundLookup, PlacementState};
use crate::runtime::add_slot;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy)]
pub struct DayConfig {
    pub date: NaiveDate,
    pub start_minute: MinuteOfDay,
    pub end_minute: MinuteOfDay,
    pub court_count: u32,
    pub scoring_format: ScoringFormat,
}

#[derive(Debug, Clone)]
pub struct RebuildResult {
    pub removed_slot_ids: Vec<SlotId>,
    pub removed_assignment_ids: Vec<AssignmentId>,
    pub new_slots: Vec<ScheduleSlot>,
    pub new_assignments: Vec<MatchAssignment>,
    pub dropped_match_ids: Vec<MatchId>,
    pub unresolved: Vec<MatchId>,
}

fn should_drop(m: &Match, mode: DropConsolationMode) -> bool {
    match mode {
        DropConsolationMode::None => false,
        DropConsolationMode::All => matches!(m.match_type(), MatchType::Consolation | MatchType::Placement),
        DropConsolationMode::Finals => {
            m.match_type() == MatchType::Placement
                || (m.match_type() == MatchType::Consolation && m.round_index() >= 2)
        }
    }
}

fn generate_grid(version_id: ScheduleVersionId, configs: &[DayConfig]) -> Vec<ScheduleSlot> {
    let mut slots = Vec::new();
    for cfg in configs {
        let block = cfg.scoring_format.duration_minutes();
        let mut start = cfg.start_minute;
        while start + block <= cfg.end_minute {
            for court in 1..=cfg.court_count {
                slots.push(add_slot(version_id, cfg.date, start, start + block, court));
            }
            start += block;
        }
    }
    slots
}

/// Rebuilds every day named in `configs`. `kept_slots`/`kept_assignments`
/// are what remains after the caller has removed rows for
/// `removed_slot_ids`/`removed_assignment_ids` from the store; this
/// function computes exactly which ids those are and what should replace
/// them, leaving the actual delete/insert to the caller.
#[instrument(
    name = "reschedule.rebuild_days",
    skip(matches, slots, assignments, configs, allocate_assignment_id),
    fields(version_id = %version_id, day_count = configs.len(), drop_consolation = ?drop_consolation)
)]
#[allow(clippy::too_many_arguments)]
pub fn rebuild_days(
    matches: &[Match],
    slots: &[ScheduleSlot],
    assignments: &[MatchAssignment],
    configs: &[DayConfig],
    drop_consolation: DropConsolationMode,
    version_id: ScheduleVersionId,
    allocate_assignment_id: &mut dyn FnMut() -> AssignmentId,
) -> RebuildResult {
    let rebuild_dates: HashSet<NaiveDate> = configs.iter().map(|c| c.date).collect();
    let matches_by_id: HashMap<MatchId, &Match> = matches.iter().map(|m| (m.id(), m)).collect();
    let slots_by_id: HashMap<SlotId, &ScheduleSlot> = slots.iter().map(|s| (s.id, s)).collect();

    let removable_matches: HashSet<MatchId> = assignments
        .iter()
        .filter(|a| {
            slots_by_id.get(&a.slot_id).map(|s| rebuild_dates.contains(&s.day_date)).unwrap_or(false)
        })
        .filter(|a| matches_by_id.get(&a.match_id).map(|m| m.runtime_status() != RuntimeStatus::Final).unwrap_or(true))
        .map(|a| a.match_id)
        .collect();

    let removed_assignment_ids: Vec<AssignmentId> = assignments
        .iter()
        .filter(|a| removable_matches.contains(&a.match_id))
        .map(|a| a.id)
        .collect();
    let removed_slot_ids: Vec<SlotId> = slots
        .iter()
        .filter(|s| rebuild_dates.contains(&s.day_date))
        .filter(|s| {
            !assignments.iter().any(|a| {
                a.slot_id == s.id && !removable_matches.contains(&a.match_id)
            })
        })
        .map(|s| s.id)
        .collect();

    let new_slots = generate_grid(version_id, configs);

    let dropped_match_ids: Vec<MatchId> = matches
        .iter()
        .filter(|m| removable_matches.contains(&m.id()))
        .filter(|m| should_drop(m, drop_consolation))
        .map(|m| m.id())
        .collect();
    let dropped: HashSet<MatchId> = dropped_match_ids.iter().copied().collect();

    let kept_assignments: Vec<&MatchAssignment> =
        assignments.iter().filter(|a| !removable_matches.contains(&a.match_id)).collect();

    let mut state = PlacementState::default();
    for a in &kept_assignments {
        if let (Some(&m), Some(&slot)) = (matches_by_id.get(&a.match_id), slots_by_id.get(&a.slot_id)) {
            state.record(m, slot);
        }
    }

    let mut to_place: Vec<&Match> = matches
        .iter()
        .filter(|m| removable_matches.contains(&m.id()) && !dropped.contains(&m.id()))
        .collect();
    // status-first (IN_PROGRESS ahead of everything else), then the
    // ordinary deterministic ordering.
    to_place.sort_by_key(|m| {
        (
            m.runtime_status() != RuntimeStatus::InProgress,
            type_rank(m.match_type()),
            m.round_index(),
            m.sequence_in_round(),
        )
    });

    let rest_minutes: u32 = configs
        .iter()
        .map(|c| c.end_minute.saturating_sub(c.start_minute))
        .min()
        .unwrap_or(0);

    let mut new_slots_sorted: Vec<&ScheduleSlot> = new_slots.iter().collect();
    new_slots_sorted.sort_by_key(|s| (s.day_date, s.start_minute, s.court_number));

    let event_round_lookup = |event: EventId, mt: MatchType, round: u32| -> Vec<MatchId> {
        matches
            .iter()
            .filter(|m| m.event_id() == event && m.match_type() == mt && m.round_index() == round)
            .map(|m| m.id())
            .collect()
    };

    let excluded: HashSet<SlotId> = HashSet::new();
    let mut used: HashSet<SlotId> = HashSet::new();
    let mut new_assignments = Vec::new();
    let mut unresolved = Vec::new();

    for m in to_place {
        let found = new_slots_sorted.iter().find(|s| {
            !used.contains(&s.id)
                && !excluded.contains(&s.id)
                && !state.occupied_slots.contains(&s.id)
                && s.fits(m.duration_minutes())
                && dependency_ok(m, s, &state, &event_round_lookup)
                && rest_gap_ok(m, s, &state, rest_minutes)
        });
        match found {
            Some(&slot) => {
                used.insert(slot.id);
                state.record(m, slot);
                new_assignments.push(MatchAssignment {
                    id: allocate_assignment_id(),
                    version_id,
                    match_id: m.id(),
                    slot_id: slot.id,
                    assigned_by: crate::model::enums::AssignedBy::Rebuild,
                    locked: false,
                });
            }
            None => unresolved.push(m.id()),
        }
    }

    info!(
        dropped = dropped_match_ids.len(),
        unresolved = unresolved.len(),
        new_assignment_count = new_assignments.len(),
        "days_rebuilt"
    );
    RebuildResult {
        removed_slot_ids,
        removed_assignment_ids,
        new_slots,
        new_assignments,
        dropped_match_ids,
        unresolved,
    }
}

/// Same dependency ordering [`crate::placement::compat::is_compatible`]
/// enforces, kept local so rebuild can swap in its own flat rest rule
/// instead of the tiered one baked into that function.
fn dependency_ok(m: &Match, slot: &ScheduleSlot, state: &PlacementState, event_round_matches: &EventRoundLookup) -> bool {
    match m.match_type() {
        MatchType::Placement => true,
        MatchType::Wf | MatchType::Rr if m.round_index() > 1 => {
            let prior = event_round_matches(m.event_id(), m.match_type(), m.round_index() - 1);
            if prior.is_empty() {
                return true;
            }
            for prior_id in prior {
                let Some(&(prior_day, prior_end)) = state.end_of_match.get(&prior_id) else {
                    return false;
                };
                if prior_day > slot.day_date || (prior_day == slot.day_date && prior_end > slot.start_minute) {
                    return false;
                }
            }
            true
        }
        MatchType::Main | MatchType::Consolation => {
            let sources: Vec<MatchId> =
                [m.source_match_a_id(), m.source_match_b_id()].into_iter().flatten().collect();
            if sources.is_empty() {
                return true;
            }
            for src in sources {
                let Some(&(src_day, src_end)) = state.end_of_match.get(&src) else {
                    return false;
                };
                if src_day > slot.day_date || (src_day == slot.day_date && src_end >= slot.start_minute) {
                    return false;
                }
            }
            true
        }
        _ => true,
    }
}

/// Rebuild tightens the ordinary tiered rest gaps down to a single floor:
/// the smallest configured day length.
fn rest_gap_ok(m: &Match, slot: &ScheduleSlot, state: &PlacementState, rest_minutes: u32) -> bool {
    for team in m.team_ids() {
        if let Some(&(prev_end, _)) = state.team_last_end.get(&(team, slot.day_date)) {
            if slot.start_minute < prev_end + rest_minutes {
                return false;
            }
        }
    }
    true
}
