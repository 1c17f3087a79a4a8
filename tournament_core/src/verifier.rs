//! Policy Invariants Verifier: re-checks I4-I8 after a day's
//! placement and computes the canonical policy hashes.

use crate::hashing::{output_hash, policy_input_hash, short_hash};
use crate::ids::{EventId, MatchId, SlotId, TeamId};
use crate::model::enums::MatchType;
use crate::model::event::Event;
use crate::model::match_entity::Match;
use crate::model::schedule::{MatchAssignment, MatchLock, MinuteOfDay, ScheduleSlot, SlotLock};
use crate::placement::compat::required_rest_minutes;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub code: &'static str,
    pub detail: String,
    pub match_ids: Vec<MatchId>,
}

fn violation(code: &'static str, detail: impl Into<String>, match_ids: Vec<MatchId>) -> InvariantViolation {
    InvariantViolation { code, detail: detail.into(), match_ids }
}

#[derive(Debug, Clone)]
pub struct InvariantReport {
    pub violations: Vec<InvariantViolation>,
    pub capacity_tight: bool,
    pub input_hash: String,
    pub input_hash_short: String,
    pub output_hash: String,
    pub output_hash_short: String,
}

struct Placed<'a> {
    m: &'a Match,
    slot: &'a ScheduleSlot,
}

fn placed_matches<'a>(
    matches: &'a [Match],
    slots: &'a [ScheduleSlot],
    assignments: &'a [MatchAssignment],
) -> HashMap<MatchId, Placed<'a>> {
    let matches_by_id: HashMap<MatchId, &Match> = matches.iter().map(|m| (m.id(), m)).collect();
    let slots_by_id: HashMap<_, &ScheduleSlot> = slots.iter().map(|s| (s.id, s)).collect();
    let mut out = HashMap::new();
    for a in assignments {
        if let (Some(&m), Some(&slot)) = (matches_by_id.get(&a.match_id), slots_by_id.get(&a.slot_id)) {
            out.insert(a.match_id, Placed { m, slot });
        }
    }
    out
}

/// I4/I6/I7: team daily cap and rest gaps, scoped to `day`.
fn check_team_day(placed: &HashMap<MatchId, Placed>, day: NaiveDate) -> Vec<InvariantViolation> {
    let mut per_team: HashMap<TeamId, Vec<(&Match, &ScheduleSlot)>> = HashMap::new();
    for p in placed.values() {
        if p.slot.day_date != day {
            continue;
        }
        for team in p.m.team_ids() {
            per_team.entry(team).or_default().push((p.m, p.slot));
        }
    }

    let mut out = Vec::new();
    for (team, mut matches) in per_team {
        if matches.len() > 2 {
            out.push(violation(
                "TEAM_OVER_DAILY_CAP",
                format!("team {team} has {} matches on {day}, cap is 2", matches.len()),
                matches.iter().map(|(m, _)| m.id()).collect(),
            ));
        }
        matches.sort_by_key(|(_, s)| s.start_minute);
        for pair in matches.windows(2) {
            let (m1, s1) = pair[0];
            let (m2, s2) = pair[1];
            let gap = s2.start_minute as i64 - (s1.start_minute + m1.duration_minutes()) as i64;
            let required = required_rest_minutes(m1.match_type(), m2.match_type()) as i64;
            if gap < required {
                out.push(violation(
                    "REST_GAP_VIOLATION",
                    format!(
                        "team {team}: {} then {} have only {gap} minutes rest, need {required}",
                        m1.match_code(),
                        m2.match_code()
                    ),
                    vec![m1.id(), m2.id()],
                ));
            }
        }
    }
    out
}

/// I5: dependency ordering, split into the two supplemented codes
///: the upstream match is scheduled nowhere at all, vs scheduled
/// but doesn't end before the candidate.
fn check_dependencies(placed: &HashMap<MatchId, Placed>, matches: &[Match]) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    for m in matches {
        let Some(p) = placed.get(&m.id()) else { continue };
        for src in [m.source_match_a_id(), m.source_match_b_id()].into_iter().flatten() {
            match placed.get(&src) {
                None => out.push(violation(
                    "UNRESOLVED_UPSTREAM_UNASSIGNED",
                    format!("{} depends on an upstream match that isn't assigned anywhere", m.match_code()),
                    vec![m.id(), src],
                )),
                Some(up) => {
                    let up_end = up.slot.start_minute + up.m.duration_minutes();
                    if up.slot.day_date > p.slot.day_date
                        || (up.slot.day_date == p.slot.day_date && up_end > p.slot.start_minute)
                    {
                        out.push(violation(
                            "UNRESOLVED_UPSTREAM_NOT_BEFORE",
                            format!("{} does not end before {} starts", up.m.match_code(), m.match_code()),
                            vec![m.id(), src],
                        ));
                    }
                }
            }
        }
    }
    out
}

/// I8: consolation round completeness.
fn check_consolation_completeness(placed: &HashMap<MatchId, Placed>, matches: &[Match], day: NaiveDate) -> Vec<InvariantViolation> {
    let mut by_group: HashMap<(EventId, u32), Vec<&Match>> = HashMap::new();
    for m in matches {
        if m.match_type() == MatchType::Consolation {
            by_group.entry((m.event_id(), m.round_index())).or_default().push(m);
        }
    }
    let mut out = Vec::new();
    for ((event, round), group) in by_group {
        let any_on_day = group.iter().any(|m| placed.get(&m.id()).map(|p| p.slot.day_date) == Some(day));
        if !any_on_day {
            continue;
        }
        let unplaced: Vec<MatchId> = group.iter().filter(|m| !placed.contains_key(&m.id())).map(|m| m.id()).collect();
        if !unplaced.is_empty() {
            out.push(violation(
                "CONSOLATION_PARTIAL_ROUND",
                format!("event {event} consolation round {round} is partially assigned"),
                unplaced,
            ));
        }
    }
    out
}

/// Supplemented fairness check: per (event, day), no team's second match
/// starts before every team in the event has started its first.
fn check_fairness(placed: &HashMap<MatchId, Placed>, day: NaiveDate) -> Vec<InvariantViolation> {
    let mut starts_by_event_team: HashMap<(EventId, TeamId), Vec<MinuteOfDay>> = HashMap::new();
    for p in placed.values() {
        if p.slot.day_date != day {
            continue;
        }
        for team in p.m.team_ids() {
            starts_by_event_team.entry((p.m.event_id(), team)).or_default().push(p.slot.start_minute);
        }
    }

    let mut by_event: HashMap<EventId, Vec<(TeamId, Vec<MinuteOfDay>)>> = HashMap::new();
    for ((event, team), mut starts) in starts_by_event_team {
        starts.sort();
        by_event.entry(event).or_default().push((team, starts));
    }

    let mut out = Vec::new();
    for (event, teams) in by_event {
        let Some(last_first_start) = teams.iter().map(|(_, s)| s[0]).max() else { continue };
        for (team, starts) in &teams {
            if let Some(&second) = starts.get(1) {
                if second < last_first_start {
                    out.push(violation(
                        "FAIRNESS_SECOND_BEFORE_ALL_FIRST",
                        format!("team {team} in event {event} starts its second match before every team's first"),
                        Vec::new(),
                    ));
                }
            }
        }
    }
    out
}

/// Reserves 1 spare slot per non-first time-bucket per day; capacity is
/// tight when total match count ≥ usable slots after that reservation.
fn capacity_tight(slots: &[ScheduleSlot], total_matches: usize) -> bool {
    let mut by_day: HashMap<NaiveDate, HashSet<MinuteOfDay>> = HashMap::new();
    for s in slots {
        by_day.entry(s.day_date).or_default().insert(s.start_minute);
    }
    let mut usable = slots.len();
    for buckets in by_day.values() {
        usable = usable.saturating_sub(buckets.len().saturating_sub(1));
    }
    total_matches >= usable
}

/// Every time bucket but the day's first must leave at least 1 court
/// unassigned, so a match that overruns has somewhere to move to.
/// Advisory-only (skipped entirely) once the tournament is capacity-tight,
/// since there's no spare room to reserve.
fn check_spare_court(slots: &[ScheduleSlot], assignments: &[MatchAssignment]) -> Vec<InvariantViolation> {
    let assigned_slots: HashSet<SlotId> = assignments.iter().map(|a| a.slot_id).collect();

    let mut by_day: HashMap<NaiveDate, BTreeMap<MinuteOfDay, Vec<&ScheduleSlot>>> = HashMap::new();
    for s in slots {
        by_day.entry(s.day_date).or_default().entry(s.start_minute).or_default().push(s);
    }

    let mut out = Vec::new();
    for (day, by_time) in &by_day {
        for (i, (start, bucket)) in by_time.iter().enumerate() {
            if i == 0 {
                continue;
            }
            let total = bucket.len();
            let assigned = bucket.iter().filter(|s| assigned_slots.contains(&s.id)).count();
            let spare = total.saturating_sub(assigned);
            if spare < 1 {
                out.push(violation(
                    "SPARE_COURT_VIOLATION",
                    format!("{day} {start}: {total} courts, {assigned} assigned, {spare} spare (need >= 1)"),
                    Vec::new(),
                ));
            }
        }
    }
    out
}

/// Re-checks I4-I8 for the assignments made on one day.
#[instrument(name = "verifier.verify_day", skip(matches, slots, assignments), fields(day = %day))]
pub fn verify_day(matches: &[Match], slots: &[ScheduleSlot], assignments: &[MatchAssignment], day: NaiveDate) -> Vec<InvariantViolation> {
    let placed = placed_matches(matches, slots, assignments);
    let mut out = Vec::new();
    out.extend(check_team_day(&placed, day));
    out.extend(check_dependencies(&placed, matches));
    out.extend(check_consolation_completeness(&placed, matches, day));
    out.extend(check_fairness(&placed, day));
    info!(violation_count = out.len(), "day_verified");
    out
}

/// Full-version verification plus the canonical policy hashes.
#[instrument(name = "verifier.verify_full", skip(matches, slots, assignments, events, match_locks, slot_locks, policy_version))]
#[allow(clippy::too_many_arguments)]
pub fn verify_full(
    matches: &[Match],
    slots: &[ScheduleSlot],
    assignments: &[MatchAssignment],
    events: &[Event],
    match_locks: &[MatchLock],
    slot_locks: &[SlotLock],
    policy_version: &str,
) -> InvariantReport {
    let placed = placed_matches(matches, slots, assignments);
    let days: HashSet<NaiveDate> = slots.iter().map(|s| s.day_date).collect();

    let mut violations = Vec::new();
    for &day in &days {
        violations.extend(check_team_day(&placed, day));
        violations.extend(check_consolation_completeness(&placed, matches, day));
        violations.extend(check_fairness(&placed, day));
    }
    violations.extend(check_dependencies(&placed, matches));
    let tight = capacity_tight(slots, matches.len());
    if !tight {
        violations.extend(check_spare_court(slots, assignments));
    }

    let input_hash = policy_input_hash(slots, matches, events, match_locks, slot_locks, policy_version);
    let assignment_tuples: Vec<(NaiveDate, MinuteOfDay, u32, i64)> = placed
        .values()
        .map(|p| (p.slot.day_date, p.slot.start_minute, p.slot.court_number, p.m.id().0))
        .collect();
    let out_hash = output_hash(&assignment_tuples);

    info!(violation_count = violations.len(), days = days.len(), "full_version_verified");
    InvariantReport {
        violations,
        capacity_tight: tight,
        input_hash_short: short_hash(&input_hash).to_string(),
        input_hash,
        output_hash_short: short_hash(&out_hash).to_string(),
        output_hash: out_hash,
    }
}
