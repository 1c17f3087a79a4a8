//! Daily policy placement driver.

use crate::errors::Warning;
use crate::ids::{AssignmentId, EventId, MatchId, ScheduleVersionId, SlotId};
use crate::model::enums::{AssignedBy, MatchType};
use crate::model::match_entity::Match;
use crate::model::schedule::{MatchAssignment, ScheduleSlot};
use crate::placement::batches::{
    build_consolation_fill_batches, build_day1_batches, build_last_day_batches, build_mid_day_batches,
    event_priority_order, PlacementBatch,
};
use crate::placement::compat::{is_compatible, slot_sort_key, EventRoundLookup, PlacementState};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Day 2+'s consolation fill is capped to `round_index <= 1` per the
/// preserved Open Question resolution (consolation semis only, never
/// deeper rounds, so a leftover-spare-court fill never races ahead of
/// rounds that still depend on same-day upstream results).
const CONSOLATION_FILL_MAX_ROUND: u32 = 1;

fn event_round_lookup(matches: &[Match]) -> HashMap<(EventId, MatchType, u32), Vec<MatchId>> {
    let mut out: HashMap<(EventId, MatchType, u32), Vec<MatchId>> = HashMap::new();
    for m in matches {
        out.entry((m.event_id(), m.match_type(), m.round_index())).or_default().push(m.id());
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn run_batches(
    batches: &[PlacementBatch],
    matches_by_id: &HashMap<MatchId, &Match>,
    day: NaiveDate,
    day_slots: &[ScheduleSlot],
    excluded_slots: &HashSet<SlotId>,
    state: &mut PlacementState,
    lookup: &EventRoundLookup,
    version_id: ScheduleVersionId,
    allocate_id: &mut dyn FnMut() -> AssignmentId,
    assignments: &mut Vec<MatchAssignment>,
    warnings: &mut Vec<Warning>,
) {
    let mut sorted_slots = day_slots.to_vec();
    sorted_slots.sort_by_key(slot_sort_key);

    for batch in batches {
        for &match_id in &batch.match_ids {
            let Some(&m) = matches_by_id.get(&match_id) else { continue };
            let slot = sorted_slots.iter().find(|slot| {
                is_compatible(m, slot, state, matches_by_id, excluded_slots, Some(day), lookup)
            });
            match slot {
                Some(slot) => {
                    state.record(m, slot);
                    assignments.push(MatchAssignment {
                        id: allocate_id(),
                        version_id,
                        match_id: m.id(),
                        slot_id: slot.id,
                        assigned_by: AssignedBy::AutoAssignV1,
                        locked: false,
                    });
                }
                None => warnings.push(Warning::NoAvailableSlot { match_id: m.id() }),
            }
        }
    }
}

/// Places one day's worth of matches via the batch policy, reusing
/// whatever `state` already carries from prior days (rest gaps and daily
/// team counts keep accumulating across the whole run). `unplaced`
/// should contain every match not yet assigned anywhere in the version;
/// this function only ever assigns a subset of it onto `day`.
#[allow(clippy::too_many_arguments)]
pub fn run_daily_policy(
    day: NaiveDate,
    is_first_day: bool,
    is_last_day: bool,
    unplaced: &[Match],
    event_team_counts: &[(EventId, u32)],
    day_slots: &[ScheduleSlot],
    excluded_slots: &HashSet<SlotId>,
    version_id: ScheduleVersionId,
    state: &mut PlacementState,
    allocate_id: &mut dyn FnMut() -> AssignmentId,
) -> (Vec<MatchAssignment>, Vec<Warning>) {
    let matches_by_id: HashMap<MatchId, &Match> = unplaced.iter().map(|m| (m.id(), m)).collect();
    let by_round = event_round_lookup(unplaced);
    let lookup: &EventRoundLookup = &|event, mt, round| by_round.get(&(event, mt, round)).cloned().unwrap_or_default();
    let event_order = event_priority_order(event_team_counts);
    let refs: Vec<&Match> = unplaced.iter().collect();

    let mut assignments = Vec::new();
    let mut warnings = Vec::new();

    if is_last_day {
        let batches = build_last_day_batches(&refs, &event_order);
        run_batches(
            &batches,
            &matches_by_id,
            day,
            day_slots,
            excluded_slots,
            state,
            lookup,
            version_id,
            allocate_id,
            &mut assignments,
            &mut warnings,
        );
        return (assignments, warnings);
    }

    if is_first_day {
        let batches = build_day1_batches(&refs, &event_order);
        run_batches(
            &batches,
            &matches_by_id,
            day,
            day_slots,
            excluded_slots,
            state,
            lookup,
            version_id,
            allocate_id,
            &mut assignments,
            &mut warnings,
        );
        return (assignments, warnings);
    }

    let batches = build_mid_day_batches(&refs, &event_order);
    run_batches(
        &batches,
        &matches_by_id,
        day,
        day_slots,
        excluded_slots,
        state,
        lookup,
        version_id,
        allocate_id,
        &mut assignments,
        &mut warnings,
    );
    let placed_so_far: HashSet<MatchId> = assignments.iter().map(|a| a.match_id).collect();
    let remaining_refs: Vec<&Match> = refs.into_iter().filter(|m| !placed_so_far.contains(&m.id())).collect();
    let fill = build_consolation_fill_batches(&remaining_refs, &event_order, CONSOLATION_FILL_MAX_ROUND);
    run_batches(
        &fill,
        &matches_by_id,
        day,
        day_slots,
        excluded_slots,
        state,
        lookup,
        version_id,
        allocate_id,
        &mut assignments,
        &mut warnings,
    );
    (assignments, warnings)
}

/// Runs every tournament day in order, feeding each day's leftovers
/// forward (a match not placed on day D simply stays in `unplaced` for
/// day D+1 — the only carryover mechanism the policy driver needs).
#[allow(clippy::too_many_arguments)]
pub fn run_full_policy(
    days: &[NaiveDate],
    mut unplaced: Vec<Match>,
    event_team_counts: &[(EventId, u32)],
    slots_by_day: &dyn Fn(NaiveDate) -> Vec<ScheduleSlot>,
    excluded_slots: &HashSet<SlotId>,
    version_id: ScheduleVersionId,
    allocate_id: &mut dyn FnMut() -> AssignmentId,
) -> (Vec<MatchAssignment>, Vec<Warning>) {
    let mut state = PlacementState::default();
    let mut all_assignments = Vec::new();
    let mut all_warnings = Vec::new();

    for (i, &day) in days.iter().enumerate() {
        let is_first = i == 0;
        let is_last = i == days.len() - 1;
        let day_slots = slots_by_day(day);
        let (assignments, _warnings) = run_daily_policy(
            day,
            is_first,
            is_last,
            &unplaced,
            event_team_counts,
            &day_slots,
            excluded_slots,
            version_id,
            &mut state,
            allocate_id,
        );
        let placed: HashSet<MatchId> = assignments.iter().map(|a| a.match_id).collect();
        unplaced.retain(|m| !placed.contains(&m.id()));
        all_assignments.extend(assignments);
    }
    for m in &unplaced {
        all_warnings.push(Warning::NoAvailableSlot { match_id: m.id() });
    }
    (all_assignments, all_warnings)
}
