//! Master Sequence Builder: one global playing order for every
//! match in a version, independent of slots.

use crate::ids::{EventId, MatchId};
use crate::model::enums::MatchType;
use crate::model::match_entity::Match;
use std::collections::BTreeMap;

/// Sibling-type ordering within a team-round: MAIN < RR < CONSOLATION, with
/// WF (always the earliest stage) and PLACEMENT (always last) bracketing
/// them.
pub(crate) fn type_rank(match_type: MatchType) -> u32 {
    match match_type {
        MatchType::Wf => 0,
        MatchType::Main => 1,
        MatchType::Rr => 2,
        MatchType::Consolation => 3,
        MatchType::Placement => 4,
    }
}

/// Tens digit = team-round (1st match for a team, 2nd, ...), units digit =
/// sibling-type order. `round_index` already is the team-round ordinal
/// within its stage, so it's used directly.
pub fn phase_of(m: &Match) -> u32 {
    m.round_index() * 10 + type_rank(m.match_type())
}

fn team_round_of(phase: u32) -> u32 {
    phase / 10
}

/// Groups events by `team_count`. Only the largest-`team_count` tied group
/// rotates by `offset`; every smaller group keeps its sorted order as-is,
/// appended unrotated behind it.
pub fn rotate_within_size_buckets(events: &[(EventId, u32)], offset: u32) -> Vec<EventId> {
    let mut by_size: BTreeMap<u32, Vec<EventId>> = BTreeMap::new();
    for &(id, team_count) in events {
        by_size.entry(team_count).or_default().push(id);
    }
    for ids in by_size.values_mut() {
        ids.sort();
    }

    let mut out = Vec::with_capacity(events.len());
    for (is_top_group, (_, mut ids)) in by_size.into_iter().rev().enumerate().map(|(i, g)| (i == 0, g)) {
        if is_top_group {
            let len = ids.len();
            if len > 1 {
                let shift = (offset as usize) % len;
                ids.rotate_left(shift);
            }
        }
        out.extend(ids);
    }
    out
}

/// Builds the global order. `event_team_counts` pairs every event id
/// appearing in `matches` with its declared team count, used purely for
/// the size-bucket rotation — the scheduler never reads it otherwise.
pub fn build_master_sequence(matches: &[Match], event_team_counts: &[(EventId, u32)]) -> Vec<MatchId> {
    let mut by_phase_event: BTreeMap<u32, BTreeMap<EventId, Vec<&Match>>> = BTreeMap::new();
    for m in matches {
        by_phase_event
            .entry(phase_of(m))
            .or_default()
            .entry(m.event_id())
            .or_default()
            .push(m);
    }

    let mut out = Vec::with_capacity(matches.len());
    for (phase, by_event) in by_phase_event {
        let offset = team_round_of(phase) / 2;
        let order = rotate_within_size_buckets(event_team_counts, offset);
        for event_id in order {
            if let Some(mut ms) = by_event.get(&event_id).cloned() {
                ms.sort_by_key(|m| m.id());
                out.extend(ms.iter().map(|m| m.id()));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{EventId, MatchId, ScheduleVersionId, TeamId, TournamentId};

    fn m(id: i64, event: i64, match_type: MatchType, round: u32, seq: u32) -> Match {
        let mut m = Match::new(
            MatchId(id),
            TournamentId(1),
            EventId(event),
            ScheduleVersionId(1),
            format!("M{id}"),
            match_type,
            round,
            seq,
            60,
        );
        m.set_team_a(Some(TeamId(1)));
        m.set_team_b(Some(TeamId(2)));
        m
    }

    #[test]
    fn rotation_keeps_bucket_order_but_rotates_within() {
        let events = vec![(EventId(1), 16), (EventId(2), 16), (EventId(3), 8)];
        let at_zero = rotate_within_size_buckets(&events, 0);
        assert_eq!(at_zero, vec![EventId(1), EventId(2), EventId(3)]);
        let at_one = rotate_within_size_buckets(&events, 1);
        assert_eq!(at_one, vec![EventId(2), EventId(1), EventId(3)]);
    }

    #[test]
    fn only_the_largest_group_rotates_smaller_groups_stay_put() {
        // Two 16-team events (the largest tied group) and two 8-team events
        // (a smaller group that must never rotate, regardless of offset).
        let events = vec![(EventId(1), 16), (EventId(2), 16), (EventId(3), 8), (EventId(4), 8)];
        let at_zero = rotate_within_size_buckets(&events, 0);
        assert_eq!(at_zero, vec![EventId(1), EventId(2), EventId(3), EventId(4)]);
        let at_one = rotate_within_size_buckets(&events, 1);
        assert_eq!(
            at_one,
            vec![EventId(2), EventId(1), EventId(3), EventId(4)],
            "the 8-team group must keep its original order, unrotated"
        );
        let at_two = rotate_within_size_buckets(&events, 2);
        assert_eq!(
            at_two,
            vec![EventId(1), EventId(2), EventId(3), EventId(4)],
            "offset 2 on a 2-item group is a full rotation back to the start"
        );
    }

    #[test]
    fn same_phase_orders_events_then_match_id() {
        let matches = vec![
            m(20, 2, MatchType::Wf, 1, 0),
            m(10, 1, MatchType::Wf, 1, 0),
            m(11, 1, MatchType::Wf, 1, 1),
        ];
        let events = vec![(EventId(1), 8), (EventId(2), 8)];
        let seq = build_master_sequence(&matches, &events);
        assert_eq!(seq, vec![MatchId(10), MatchId(11), MatchId(20)]);
    }

    #[test]
    fn sibling_types_within_a_team_round_order_main_before_rr_before_consolation() {
        let matches = vec![
            m(3, 1, MatchType::Consolation, 1, 0),
            m(1, 1, MatchType::Main, 1, 0),
            m(2, 1, MatchType::Rr, 1, 0),
        ];
        let events = vec![(EventId(1), 8)];
        let seq = build_master_sequence(&matches, &events);
        assert_eq!(seq, vec![MatchId(1), MatchId(2), MatchId(3)]);
    }
}
