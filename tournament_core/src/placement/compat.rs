//! Shared compatibility test and sort keys used by both placement drivers
//!.

use crate::ids::{EventId, MatchId, SlotId, TeamId};
use crate::model::enums::MatchType;
use crate::model::match_entity::Match;
use crate::model::schedule::{MinuteOfDay, ScheduleSlot};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Required rest in minutes between two consecutive matches of the same
/// team on the same day. The 30-minute floor only applies
/// WF-to-WF; any match touching a scoring-format stage needs the wider
/// gap.
pub fn required_rest_minutes(prev: MatchType, next: MatchType) -> u32 {
    match (prev == MatchType::Wf, next == MatchType::Wf) {
        (true, true) => 30,
        (true, false) | (false, true) => 60,
        (false, false) => 90,
    }
}

/// Accumulates the placement decisions made so far in one driver run, so
/// later candidates can see slots and rest gaps created earlier in the
/// same run without round-tripping through the store.
#[derive(Debug, Default)]
pub struct PlacementState {
    pub occupied_slots: HashSet<SlotId>,
    pub slot_of_match: HashMap<MatchId, SlotId>,
    pub end_of_match: HashMap<MatchId, (NaiveDate, MinuteOfDay)>,
    /// End instant and stage of the most recent match placed for a team,
    /// per day.
    pub team_last_end: HashMap<(TeamId, NaiveDate), (MinuteOfDay, MatchType)>,
}

impl PlacementState {
    pub fn record(&mut self, m: &Match, slot: &ScheduleSlot) {
        self.occupied_slots.insert(slot.id);
        self.slot_of_match.insert(m.id(), slot.id);
        let end = slot.start_minute + m.duration_minutes();
        self.end_of_match.insert(m.id(), (slot.day_date, end));
        for team in m.team_ids() {
            self.team_last_end
                .entry((team, slot.day_date))
                .and_modify(|e| {
                    if end > e.0 {
                        *e = (end, m.match_type());
                    }
                })
                .or_insert((end, m.match_type()));
        }
    }
}

/// Looks up every match of `(event, match_type, round_index)` on the
/// version being placed, used for WF/RR round-chaining in
/// [`dependency_ok`].
pub type EventRoundLookup<'a> = dyn Fn(EventId, MatchType, u32) -> Vec<MatchId> + 'a;

/// The five-point compatibility test.
#[allow(clippy::too_many_arguments)]
pub fn is_compatible(
    m: &Match,
    slot: &ScheduleSlot,
    state: &PlacementState,
    matches_by_id: &HashMap<MatchId, &Match>,
    excluded_slots: &HashSet<SlotId>,
    target_day: Option<NaiveDate>,
    event_round_matches: &EventRoundLookup,
) -> bool {
    if excluded_slots.contains(&slot.id) || state.occupied_slots.contains(&slot.id) {
        return false;
    }
    if !slot.fits(m.duration_minutes()) {
        return false;
    }
    if let Some(day) = target_day {
        if slot.day_date != day {
            return false;
        }
    }
    if !dependency_ok(m, slot, state, matches_by_id, event_round_matches) {
        return false;
    }
    for team in m.team_ids() {
        if let Some((prev_end, prev_type)) = state.team_last_end.get(&(team, slot.day_date)) {
            let required = required_rest_minutes(*prev_type, m.match_type());
            if slot.start_minute < prev_end + required {
                return false;
            }
        }
    }
    true
}

fn dependency_ok(
    m: &Match,
    slot: &ScheduleSlot,
    state: &PlacementState,
    matches_by_id: &HashMap<MatchId, &Match>,
    event_round_matches: &EventRoundLookup,
) -> bool {
    match m.match_type() {
        MatchType::Placement => true,
        MatchType::Wf | MatchType::Rr if m.round_index() > 1 => {
            let prior = event_round_matches(m.event_id(), m.match_type(), m.round_index() - 1);
            if prior.is_empty() {
                return true;
            }
            let prior_duration = prior
                .first()
                .and_then(|id| matches_by_id.get(id))
                .map(|pm| pm.duration_minutes())
                .unwrap_or(m.duration_minutes());
            for prior_id in prior {
                let Some(&(prior_day, prior_end)) = state.end_of_match.get(&prior_id) else {
                    return false;
                };
                if prior_day > slot.day_date {
                    return false;
                }
                if prior_day == slot.day_date && prior_end + prior_duration > slot.start_minute {
                    return false;
                }
            }
            true
        }
        MatchType::Main | MatchType::Consolation => {
            let sources: Vec<MatchId> = [m.source_match_a_id(), m.source_match_b_id()]
                .into_iter()
                .flatten()
                .collect();
            if !sources.is_empty() {
                for src in sources {
                    let Some(&(src_day, src_end)) = state.end_of_match.get(&src) else {
                        return false;
                    };
                    if src_day > slot.day_date {
                        return false;
                    }
                    if src_day == slot.day_date && src_end >= slot.start_minute {
                        return false;
                    }
                }
                return true;
            }

            // No source links wired (an externally-authored draw plan):
            // fall back to round-position tiers within the same (event,
            // match_type, bracket label) group. The first round (QF) has
            // nothing below it and is independent; every later round
            // (SF, Final, ...) needs the matching round directly below it
            // in its own bracket to have finished first.
            if m.round_index() <= 1 {
                return true;
            }
            let label = bracket_label_of(m.match_code());
            let prior_round = event_round_matches(m.event_id(), m.match_type(), m.round_index() - 1);
            let prior_in_bracket: Vec<MatchId> = prior_round
                .into_iter()
                .filter(|id| {
                    matches_by_id.get(id).map(|pm| bracket_label_of(pm.match_code())) == Some(label)
                })
                .collect();
            if prior_in_bracket.is_empty() {
                return true;
            }
            for prior_id in prior_in_bracket {
                let Some(&(prior_day, prior_end)) = state.end_of_match.get(&prior_id) else {
                    return false;
                };
                if prior_day > slot.day_date {
                    return false;
                }
                if prior_day == slot.day_date && prior_end >= slot.start_minute {
                    return false;
                }
            }
            true
        }
        _ => true,
    }
}

/// Pulls the "WW"/"WL"/... bracket label out of a match code built by
/// the Draw Plan Engine (`..._BR<label>_MAIN_...`); `None` for codes
/// with no bracket tag, i.e. events with a single bracket.
fn bracket_label_of(match_code: &str) -> Option<&str> {
    let after = match_code.split("_BR").nth(1)?;
    after.split('_').next()
}

/// Deterministic match ordering: phase, then round, then event
/// priority (bigger events first, then event id), then sequence, then
/// match_code as the final tiebreak.
pub fn match_sort_key(
    m: &Match,
    event_team_count: u32,
) -> (u32, u32, std::cmp::Reverse<u32>, i64, u32, String) {
    (
        crate::master_sequence::phase_of(m),
        m.round_index(),
        std::cmp::Reverse(event_team_count),
        m.event_id().0,
        m.sequence_in_round(),
        m.match_code().to_string(),
    )
}

/// Deterministic slot ordering: day, start time, court, then slot
/// id as the final tiebreak (this crate's grid has no separate
/// court_label column).
pub fn slot_sort_key(s: &ScheduleSlot) -> (NaiveDate, MinuteOfDay, u32, i64) {
    (s.day_date, s.start_minute, s.court_number, s.id.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_minutes_match_the_three_tiers() {
        assert_eq!(required_rest_minutes(MatchType::Wf, MatchType::Wf), 30);
        assert_eq!(required_rest_minutes(MatchType::Wf, MatchType::Main), 60);
        assert_eq!(required_rest_minutes(MatchType::Main, MatchType::Wf), 60);
        assert_eq!(required_rest_minutes(MatchType::Main, MatchType::Rr), 90);
    }

    #[test]
    fn bracket_label_is_pulled_out_of_the_match_code() {
        assert_eq!(bracket_label_of("E1_BRWW_MAIN_R1_M01"), Some("WW"));
        assert_eq!(bracket_label_of("E1_BR2_MAIN_R1_M01"), Some("2"));
        assert_eq!(bracket_label_of("E1_MAIN_R1_M01"), None);
    }
}
