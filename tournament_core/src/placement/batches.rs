//! PlacementBatch construction for the daily policy driver.
//!
//! A batch is a named, ordered list of match ids; the driver runs the
//! same first-fit primitive over each batch in turn, restricted to one
//! day's slots.

use crate::ids::{EventId, MatchId};
use crate::model::enums::MatchType;
use crate::model::match_entity::Match;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
pub struct PlacementBatch {
    pub label: String,
    pub match_ids: Vec<MatchId>,
}

impl PlacementBatch {
    fn new(label: impl Into<String>, mut match_ids: Vec<MatchId>) -> Self {
        match_ids.sort_by_key(|id| id.0);
        PlacementBatch { label: label.into(), match_ids }
    }
}

/// events ordered largest team_count first, then event_id — the event
/// priority both placement drivers use.
pub fn event_priority_order(events: &[(EventId, u32)]) -> Vec<EventId> {
    let mut v = events.to_vec();
    v.sort_by_key(|(id, team_count)| (std::cmp::Reverse(*team_count), id.0));
    v.into_iter().map(|(id, _)| id).collect()
}

fn group_by_event<'a>(matches: &'a [&'a Match], pred: impl Fn(&Match) -> bool) -> BTreeMap<EventId, Vec<&'a Match>> {
    let mut out: BTreeMap<EventId, Vec<&Match>> = BTreeMap::new();
    for &m in matches {
        if pred(m) {
            out.entry(m.event_id()).or_default().push(m);
        }
    }
    out
}

fn per_event_batches(
    grouped: BTreeMap<EventId, Vec<&Match>>,
    event_order: &[EventId],
    label_prefix: &str,
) -> Vec<PlacementBatch> {
    event_order
        .iter()
        .filter_map(|ev| grouped.get(ev).map(|ms| (ev, ms)))
        .map(|(ev, ms)| {
            PlacementBatch::new(
                format!("{label_prefix}:{ev}"),
                ms.iter().map(|m| m.id()).collect(),
            )
        })
        .collect()
}

fn events_without_wf(matches: &[&Match]) -> HashSet<EventId> {
    let with_wf: HashSet<EventId> = matches
        .iter()
        .filter(|m| m.match_type() == MatchType::Wf)
        .map(|m| m.event_id())
        .collect();
    matches
        .iter()
        .map(|m| m.event_id())
        .collect::<HashSet<_>>()
        .difference(&with_wf)
        .copied()
        .collect()
}

fn min_round_by_event(matches: &[&Match], match_type: MatchType) -> BTreeMap<EventId, u32> {
    let mut out: BTreeMap<EventId, u32> = BTreeMap::new();
    for m in matches {
        if m.match_type() != match_type {
            continue;
        }
        out.entry(m.event_id())
            .and_modify(|r| *r = (*r).min(m.round_index()))
            .or_insert(m.round_index());
    }
    out
}

fn max_round_by_event(matches: &[&Match], match_type: MatchType) -> BTreeMap<EventId, u32> {
    let mut out: BTreeMap<EventId, u32> = BTreeMap::new();
    for m in matches {
        if m.match_type() != match_type {
            continue;
        }
        out.entry(m.event_id())
            .and_modify(|r| *r = (*r).max(m.round_index()))
            .or_insert(m.round_index());
    }
    out
}

/// **Day 1** batch order: per-event WF R1 (largest event first), then the
/// first scheduled round of events with no WF stage, then per-event WF
/// R2, then anything Day-1-eligible left over (e.g. a direct-from-seeds
/// bracket's round 1 when `waterfall_rounds == 0`).
pub fn build_day1_batches(matches: &[&Match], event_order: &[EventId]) -> Vec<PlacementBatch> {
    let mut out = Vec::new();
    let wf_r1 = group_by_event(matches, |m| m.match_type() == MatchType::Wf && m.round_index() == 1);
    out.extend(per_event_batches(wf_r1, event_order, "WF_R1"));

    let no_wf = events_without_wf(matches);
    let first_rounds = min_round_by_event(matches, MatchType::Rr);
    let first_round_matches = group_by_event(matches, |m| {
        no_wf.contains(&m.event_id())
            && m.match_type() == MatchType::Rr
            && first_rounds.get(&m.event_id()) == Some(&m.round_index())
    });
    out.extend(per_event_batches(first_round_matches, event_order, "FIRST_ROUND"));

    let wf_r2 = group_by_event(matches, |m| m.match_type() == MatchType::Wf && m.round_index() == 2);
    out.extend(per_event_batches(wf_r2, event_order, "WF_R2"));

    let used: HashSet<MatchId> = out.iter().flat_map(|b| b.match_ids.iter().copied()).collect();
    let remaining: Vec<MatchId> = matches
        .iter()
        .filter(|m| !used.contains(&m.id()) && m.round_index() == 1)
        .map(|m| m.id())
        .collect();
    if !remaining.is_empty() {
        out.push(PlacementBatch::new("DAY1_REMAINING", remaining));
    }
    out
}

/// **Day 2..N-1** batch order: leftover WF, per-event QF/RR-R1, per-event
/// SF/RR-R2, extra RR rounds for pure pool-play events, then placement.
/// Consolation fill runs separately, capped to `round_index <= 1`, after
/// these batches exhaust the day's remaining spare courts.
pub fn build_mid_day_batches(matches: &[&Match], event_order: &[EventId]) -> Vec<PlacementBatch> {
    let mut out = Vec::new();

    let wf_left = group_by_event(matches, |m| m.match_type() == MatchType::Wf);
    out.extend(per_event_batches(wf_left, event_order, "WF_CARRYOVER"));

    let first_main = min_round_by_event(matches, MatchType::Main);
    let qf_or_rr1 = group_by_event(matches, |m| {
        (m.match_type() == MatchType::Main && first_main.get(&m.event_id()) == Some(&m.round_index()))
            || (m.match_type() == MatchType::Rr && m.round_index() == 1)
    });
    out.extend(per_event_batches(qf_or_rr1, event_order, "QF_OR_RR1"));

    let sf_or_rr2 = group_by_event(matches, |m| {
        (m.match_type() == MatchType::Main
            && first_main.get(&m.event_id()).map(|r| r + 1) == Some(m.round_index()))
            || (m.match_type() == MatchType::Rr && m.round_index() == 2)
    });
    out.extend(per_event_batches(sf_or_rr2, event_order, "SF_OR_RR2"));

    let extra_rr = group_by_event(matches, |m| m.match_type() == MatchType::Rr && m.round_index() >= 3);
    out.extend(per_event_batches(extra_rr, event_order, "EXTRA_RR"));

    let placement: Vec<MatchId> = matches
        .iter()
        .filter(|m| m.match_type() == MatchType::Placement)
        .map(|m| m.id())
        .collect();
    if !placement.is_empty() {
        out.push(PlacementBatch::new("PLACEMENT", placement));
    }
    out
}

/// Consolation fill: only whole per-event blocks, ordered by event size
/// then round, and (per caller) capped to `round_index <= 1` on Day 2.
pub fn build_consolation_fill_batches(
    matches: &[&Match],
    event_order: &[EventId],
    max_round_index: u32,
) -> Vec<PlacementBatch> {
    let eligible = group_by_event(matches, |m| {
        m.match_type() == MatchType::Consolation && m.round_index() <= max_round_index
    });
    let mut batches = per_event_batches(eligible, event_order, "CONSOLATION_FILL");
    batches.sort_by_key(|b| b.match_ids.first().copied().map(|id| id.0).unwrap_or(0));
    batches
}

/// **Last day**: remaining WF; all QFs (MAIN+CONS interleaved); all SFs;
/// remaining RR; all Finals (MAIN+CONS); placement.
pub fn build_last_day_batches(matches: &[&Match], event_order: &[EventId]) -> Vec<PlacementBatch> {
    let mut out = Vec::new();

    let wf_left = group_by_event(matches, |m| m.match_type() == MatchType::Wf);
    out.extend(per_event_batches(wf_left, event_order, "WF_REMAINING"));

    let first_main = min_round_by_event(matches, MatchType::Main);
    let first_cons = min_round_by_event(matches, MatchType::Consolation);
    let qf = group_by_event(matches, |m| {
        (m.match_type() == MatchType::Main && first_main.get(&m.event_id()) == Some(&m.round_index()))
            || (m.match_type() == MatchType::Consolation
                && first_cons.get(&m.event_id()) == Some(&m.round_index()))
    });
    out.extend(per_event_batches(qf, event_order, "QF_ALL"));

    let sf = group_by_event(matches, |m| {
        (m.match_type() == MatchType::Main
            && first_main.get(&m.event_id()).map(|r| r + 1) == Some(m.round_index()))
            || (m.match_type() == MatchType::Consolation
                && first_cons.get(&m.event_id()).map(|r| r + 1) == Some(m.round_index()))
    });
    out.extend(per_event_batches(sf, event_order, "SF_ALL"));

    let rr_left = group_by_event(matches, |m| m.match_type() == MatchType::Rr);
    out.extend(per_event_batches(rr_left, event_order, "RR_REMAINING"));

    let last_main = max_round_by_event(matches, MatchType::Main);
    let last_cons = max_round_by_event(matches, MatchType::Consolation);
    let finals = group_by_event(matches, |m| {
        (m.match_type() == MatchType::Main && last_main.get(&m.event_id()) == Some(&m.round_index()))
            || (m.match_type() == MatchType::Consolation
                && last_cons.get(&m.event_id()) == Some(&m.round_index()))
    });
    out.extend(per_event_batches(finals, event_order, "FINALS_ALL"));

    let placement: Vec<MatchId> = matches
        .iter()
        .filter(|m| m.match_type() == MatchType::Placement)
        .map(|m| m.id())
        .collect();
    if !placement.is_empty() {
        out.push(PlacementBatch::new("PLACEMENT", placement));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{EventId, ScheduleVersionId, TeamId, TournamentId};

    fn m(id: i64, event: i64, match_type: MatchType, round: u32) -> Match {
        let mut mm = Match::new(
            MatchId(id),
            TournamentId(1),
            EventId(event),
            ScheduleVersionId(1),
            format!("M{id}"),
            match_type,
            round,
            0,
            60,
        );
        mm.set_team_a(Some(TeamId(1)));
        mm
    }

    #[test]
    fn day1_batches_put_wf_r1_before_wf_r2() {
        let ms = vec![m(1, 1, MatchType::Wf, 1), m(2, 1, MatchType::Wf, 2)];
        let refs: Vec<&Match> = ms.iter().collect();
        let order = vec![EventId(1)];
        let batches = build_day1_batches(&refs, &order);
        assert_eq!(batches[0].label, "WF_R1:1");
        assert_eq!(batches[1].label, "WF_R2:1");
    }

    #[test]
    fn event_priority_orders_by_size_then_id() {
        let events = vec![(EventId(2), 8), (EventId(1), 16)];
        assert_eq!(event_priority_order(&events), vec![EventId(1), EventId(2)]);
    }
}
