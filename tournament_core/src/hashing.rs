//! Canonical policy input/output hashing. Reruns with the same
//! inputs must produce byte-identical hashes so a caller can tell a
//! replay from a stale run without diffing the full assignment set.

use crate::model::enums::MatchType;
use crate::model::event::Event;
use crate::model::match_entity::Match;
use crate::model::schedule::{MatchLock, MinuteOfDay, ScheduleSlot, SlotLock, SlotLockStatus};
use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Serialize)]
struct SlotEntry {
    day: NaiveDate,
    start_minute: MinuteOfDay,
    court_number: u32,
    duration_minutes: u32,
}

#[derive(Serialize)]
struct MatchEntry {
    id: i64,
    event_id: i64,
    match_type: MatchType,
    round_index: u32,
    sequence_in_round: u32,
}

#[derive(Serialize)]
struct EventEntry<'a> {
    id: i64,
    name: &'a str,
    team_count: u32,
    category: &'a str,
    draw_plan_json: Option<&'a crate::model::event::DrawPlan>,
}

#[derive(Serialize)]
struct MatchLockEntry {
    match_id: i64,
    slot_id: i64,
}

#[derive(Serialize)]
struct SlotLockEntry {
    slot_id: i64,
    status: SlotLockStatus,
}

#[derive(Serialize)]
struct PolicyInput<'a> {
    slots: Vec<SlotEntry>,
    matches: Vec<MatchEntry>,
    events: Vec<EventEntry<'a>>,
    match_locks: Vec<MatchLockEntry>,
    slot_locks: Vec<SlotLockEntry>,
    policy_version: &'a str,
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// First 16 hex characters of a full SHA-256 digest — the visible short
/// hash operators compare in the UI.
pub fn short_hash(full_hex: &str) -> &str {
    &full_hex[..16.min(full_hex.len())]
}

/// SHA-256 over a canonical JSON document built from sorted slots,
/// matches, events, locks and the policy version string.
pub fn policy_input_hash(
    slots: &[ScheduleSlot],
    matches: &[Match],
    events: &[Event],
    match_locks: &[MatchLock],
    slot_locks: &[SlotLock],
    policy_version: &str,
) -> String {
    let mut slot_entries: Vec<SlotEntry> = slots
        .iter()
        .map(|s| SlotEntry {
            day: s.day_date,
            start_minute: s.start_minute,
            court_number: s.court_number,
            duration_minutes: s.block_minutes,
        })
        .collect();
    slot_entries.sort_by_key(|e| (e.day, e.start_minute, e.court_number));

    let mut match_entries: Vec<MatchEntry> = matches
        .iter()
        .map(|m| MatchEntry {
            id: m.id().0,
            event_id: m.event_id().0,
            match_type: m.match_type(),
            round_index: m.round_index(),
            sequence_in_round: m.sequence_in_round(),
        })
        .collect();
    match_entries.sort_by_key(|e| e.id);

    let mut event_entries: Vec<EventEntry> = events
        .iter()
        .map(|e| EventEntry {
            id: e.id().0,
            name: e.name(),
            team_count: e.team_count(),
            category: e.category(),
            draw_plan_json: e.draw_plan(),
        })
        .collect();
    event_entries.sort_by_key(|e| e.id);

    let mut lock_entries: Vec<MatchLockEntry> = match_locks
        .iter()
        .map(|l| MatchLockEntry { match_id: l.match_id.0, slot_id: l.slot_id.0 })
        .collect();
    lock_entries.sort_by_key(|e| (e.match_id, e.slot_id));

    let mut slot_lock_entries: Vec<SlotLockEntry> =
        slot_locks.iter().map(|l| SlotLockEntry { slot_id: l.slot_id.0, status: l.status }).collect();
    slot_lock_entries.sort_by_key(|e| e.slot_id);

    let input = PolicyInput {
        slots: slot_entries,
        matches: match_entries,
        events: event_entries,
        match_locks: lock_entries,
        slot_locks: slot_lock_entries,
        policy_version,
    };
    let json = serde_json::to_vec(&input).expect("canonical hash input is always serializable");
    hex_digest(&json)
}

#[derive(Serialize, PartialEq, Eq, PartialOrd, Ord)]
struct AssignmentEntry {
    day: NaiveDate,
    start_minute: MinuteOfDay,
    court_number: u32,
    match_id: i64,
}

/// SHA-256 over sorted (day, time, court, match_id) tuples.
pub fn output_hash(assignments: &[(NaiveDate, MinuteOfDay, u32, i64)]) -> String {
    let mut entries: Vec<AssignmentEntry> = assignments
        .iter()
        .map(|&(day, start_minute, court_number, match_id)| AssignmentEntry {
            day,
            start_minute,
            court_number,
            match_id,
        })
        .collect();
    entries.sort();
    let json = serde_json::to_vec(&entries).expect("canonical hash input is always serializable");
    hex_digest(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_hash_is_order_independent() {
        let a = vec![(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(), 540, 1, 10)];
        let b = vec![(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(), 540, 1, 10)];
        assert_eq!(output_hash(&a), output_hash(&b));
    }

    #[test]
    fn short_hash_truncates_to_sixteen_chars() {
        let full = hex_digest(b"hello");
        assert_eq!(short_hash(&full).len(), 16);
    }
}
