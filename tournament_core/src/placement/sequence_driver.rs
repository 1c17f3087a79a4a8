//! Master-sequence placement driver.

use crate::errors::Warning;
use crate::ids::{AssignmentId, EventId, MatchId, ScheduleVersionId, SlotId};
use crate::master_sequence::build_master_sequence;
use crate::model::enums::{AssignedBy, MatchType};
use crate::model::match_entity::Match;
use crate::model::schedule::{MatchAssignment, ScheduleSlot};
use crate::placement::compat::{is_compatible, slot_sort_key, EventRoundLookup, PlacementState};
use std::collections::{HashMap, HashSet};

/// Walks the master sequence in rank order; for each match, walks every
/// slot (across all days) in `(day, start_time, court)` order and claims
/// the first one that passes the compatibility test. All courts are used
/// — spare-court reservation is a verifier-only concept, not a
/// placement restriction.
pub fn assign_by_sequence(
    matches: &[Match],
    event_team_counts: &[(EventId, u32)],
    slots: &[ScheduleSlot],
    excluded_slots: &HashSet<SlotId>,
    version_id: ScheduleVersionId,
    allocate_id: &mut dyn FnMut() -> AssignmentId,
) -> (Vec<MatchAssignment>, Vec<Warning>) {
    let sequence = build_master_sequence(matches, event_team_counts);
    let matches_by_id: HashMap<MatchId, &Match> = matches.iter().map(|m| (m.id(), m)).collect();

    let mut by_event_type_round: HashMap<(EventId, MatchType, u32), Vec<MatchId>> = HashMap::new();
    for m in matches {
        by_event_type_round
            .entry((m.event_id(), m.match_type(), m.round_index()))
            .or_default()
            .push(m.id());
    }
    let lookup: &EventRoundLookup =
        &|event, mt, round| by_event_type_round.get(&(event, mt, round)).cloned().unwrap_or_default();

    let mut sorted_slots = slots.to_vec();
    sorted_slots.sort_by_key(slot_sort_key);

    let mut state = PlacementState::default();
    let mut assignments = Vec::new();
    let mut warnings = Vec::new();

    for match_id in sequence {
        let Some(&m) = matches_by_id.get(&match_id) else {
            continue;
        };
        let slot = sorted_slots
            .iter()
            .find(|slot| is_compatible(m, slot, &state, &matches_by_id, excluded_slots, None, lookup));
        match slot {
            Some(slot) => {
                state.record(m, slot);
                assignments.push(MatchAssignment {
                    id: allocate_id(),
                    version_id,
                    match_id: m.id(),
                    slot_id: slot.id,
                    assigned_by: AssignedBy::SequenceV1,
                    locked: false,
                });
            }
            None => warnings.push(Warning::NoAvailableSlot { match_id: m.id() }),
        }
    }
    (assignments, warnings)
}
