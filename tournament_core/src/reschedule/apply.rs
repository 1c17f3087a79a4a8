//! Apply: writes a computed [`ReschedulePreview`] into the
//! assignment set. Pure mutation over in-memory entities; the store write
//! itself is the caller's job, same split as [`crate::runtime`].

use super::preview::ReschedulePreview;
use crate::ids::AssignmentId;
use crate::model::enums::AssignedBy;
use crate::model::match_entity::Match;
use crate::model::schedule::MatchAssignment;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Applies every proposed move: existing assignments are repointed at
/// their new slot and locked; matches with no prior assignment get a
/// freshly allocated one. Duration updates are written onto the match.
#[instrument(name = "reschedule.apply_reschedule", skip(preview, matches, assignments, allocate_id), fields(version_id = %version_id, move_count = preview.moves.len()))]
pub fn apply_reschedule(
    preview: &ReschedulePreview,
    matches: &mut [Match],
    assignments: &mut Vec<MatchAssignment>,
    version_id: crate::ids::ScheduleVersionId,
    allocate_id: &mut dyn FnMut() -> AssignmentId,
) {
    let mut matches_by_id: HashMap<_, _> = matches.iter_mut().map(|m| (m.id(), m)).collect();
    let mut assignment_by_match: HashMap<_, usize> =
        assignments.iter().enumerate().map(|(i, a)| (a.match_id, i)).collect();

    for mv in &preview.moves {
        if let Some(m) = matches_by_id.get_mut(&mv.match_id) {
            if let Some(duration) = mv.new_duration_minutes {
                m.set_duration_minutes(duration);
            }
        }

        match assignment_by_match.get(&mv.match_id) {
            Some(&idx) => {
                let a = &mut assignments[idx];
                a.slot_id = mv.slot_id;
                a.locked = true;
                a.assigned_by = AssignedBy::Reschedule;
            }
            None => {
                let new_assignment = MatchAssignment {
                    id: allocate_id(),
                    version_id,
                    match_id: mv.match_id,
                    slot_id: mv.slot_id,
                    assigned_by: AssignedBy::Reschedule,
                    locked: true,
                };
                assignment_by_match.insert(mv.match_id, assignments.len());
                assignments.push(new_assignment);
            }
        }
    }
    info!("reschedule_applied");
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::preview::ProposedMove;
    use crate::ids::{EventId, MatchId, ScheduleVersionId, SlotId, TournamentId};
    use crate::model::enums::MatchType;

    fn m(id: i64) -> Match {
        Match::new(
            MatchId(id),
            TournamentId(1),
            EventId(1),
            ScheduleVersionId(1),
            format!("M{id}"),
            MatchType::Main,
            1,
            0,
            60,
        )
    }

    #[test]
    fn repoints_existing_assignment_and_locks_it() {
        let mut matches = vec![m(1)];
        let mut assignments = vec![MatchAssignment {
            id: AssignmentId(1),
            version_id: ScheduleVersionId(1),
            match_id: MatchId(1),
            slot_id: SlotId(1),
            assigned_by: AssignedBy::AutoAssignV1,
            locked: false,
        }];
        let preview = ReschedulePreview {
            moves: vec![ProposedMove { match_id: MatchId(1), slot_id: SlotId(2), new_duration_minutes: None }],
            unresolved: Vec::new(),
        };
        let mut next_id = 10;
        apply_reschedule(&preview, &mut matches, &mut assignments, ScheduleVersionId(1), &mut || {
            next_id += 1;
            AssignmentId(next_id)
        });
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].slot_id, SlotId(2));
        assert!(assignments[0].locked);
        assert_eq!(assignments[0].assigned_by, AssignedBy::Reschedule);
    }

    #[test]
    fn allocates_a_new_assignment_for_a_previously_unassigned_match() {
        let mut matches = vec![m(1)];
        let mut assignments: Vec<MatchAssignment> = Vec::new();
        let preview = ReschedulePreview {
            moves: vec![ProposedMove { match_id: MatchId(1), slot_id: SlotId(2), new_duration_minutes: Some(35) }],
            unresolved: Vec::new(),
        };
        let mut next_id = 10;
        apply_reschedule(&preview, &mut matches, &mut assignments, ScheduleVersionId(1), &mut || {
            next_id += 1;
            AssignmentId(next_id)
        });
        assert_eq!(assignments.len(), 1);
        assert_eq!(matches[0].duration_minutes(), 35);
    }
}
