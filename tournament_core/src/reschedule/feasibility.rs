//! Feasibility check: a pure read comparing affected match volume
//! against remaining minutes, one estimate per scoring format.

use super::is_lost;
use crate::ids::MatchId;
use crate::model::enums::{MatchType, RescheduleMode, RuntimeStatus, ScoringFormat};
use crate::model::match_entity::Match;
use crate::model::schedule::{MatchAssignment, MinuteOfDay, ScheduleSlot};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct FormatFeasibility {
    pub format: ScoringFormat,
    pub affected_match_count: usize,
    pub minutes_needed: u32,
    pub minutes_available: u32,
    pub fits: bool,
    pub utilization: f64,
}

#[derive(Debug, Clone)]
pub struct FeasibilityReport {
    pub per_format: Vec<FormatFeasibility>,
}

fn affected_matches<'a>(
    matches: &'a [Match],
    slots: &[ScheduleSlot],
    assignments: &[MatchAssignment],
    mode: RescheduleMode,
    affected_day: NaiveDate,
    unavailable_from: Option<MinuteOfDay>,
    available_from: Option<MinuteOfDay>,
    unavailable_courts: &[u32],
) -> Vec<&'a Match> {
    let slots_by_id: HashMap<_, _> = slots.iter().map(|s| (s.id, s)).collect();
    let lost_match_ids: std::collections::HashSet<MatchId> = assignments
        .iter()
        .filter(|a| {
            slots_by_id
                .get(&a.slot_id)
                .map(|s| is_lost(s, mode, affected_day, unavailable_from, available_from, unavailable_courts))
                .unwrap_or(false)
        })
        .map(|a| a.match_id)
        .collect();

    matches
        .iter()
        .filter(|m| m.runtime_status() != RuntimeStatus::Final && !m.runtime_status().is_terminal())
        .filter(|m| lost_match_ids.contains(&m.id()))
        .collect()
}

fn remaining_minutes(
    slots: &[ScheduleSlot],
    assignments: &[MatchAssignment],
    mode: RescheduleMode,
    affected_day: NaiveDate,
    unavailable_from: Option<MinuteOfDay>,
    available_from: Option<MinuteOfDay>,
    unavailable_courts: &[u32],
) -> u32 {
    let occupied: std::collections::HashSet<_> = assignments.iter().map(|a| a.slot_id).collect();
    slots
        .iter()
        .filter(|s| s.is_active)
        .filter(|s| !is_lost(s, mode, affected_day, unavailable_from, available_from, unavailable_courts))
        .filter(|s| !occupied.contains(&s.id))
        .map(|s| s.block_minutes)
        .sum()
}

/// One estimate per scoring format: how many affected matches at that
/// format's duration would fit in the minutes left elsewhere.
#[allow(clippy::too_many_arguments)]
pub fn assess_feasibility(
    matches: &[Match],
    slots: &[ScheduleSlot],
    assignments: &[MatchAssignment],
    mode: RescheduleMode,
    affected_day: NaiveDate,
    unavailable_from: Option<MinuteOfDay>,
    available_from: Option<MinuteOfDay>,
    unavailable_courts: &[u32],
) -> FeasibilityReport {
    let affected = affected_matches(
        matches,
        slots,
        assignments,
        mode,
        affected_day,
        unavailable_from,
        available_from,
        unavailable_courts,
    );
    // Exclude WF/RR from the "unplayed match" volume count: they're
    // fixed-duration waterfall blocks, not the standard-duration stages
    // this feasibility read is meaningful for.
    let affected_count = affected.iter().filter(|m| m.match_type() != MatchType::Wf).count();
    let available = remaining_minutes(
        slots,
        assignments,
        mode,
        affected_day,
        unavailable_from,
        available_from,
        unavailable_courts,
    );

    let per_format = [ScoringFormat::Regular, ScoringFormat::ProSet8, ScoringFormat::ProSet4]
        .into_iter()
        .map(|format| {
            let needed = affected_count as u32 * format.duration_minutes();
            let utilization = if available == 0 { 0.0 } else { needed as f64 / available as f64 };
            FormatFeasibility {
                format,
                affected_match_count: affected_count,
                minutes_needed: needed,
                minutes_available: available,
                fits: needed <= available,
                utilization,
            }
        })
        .collect();

    FeasibilityReport { per_format }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{AssignmentId, EventId, ScheduleVersionId, SlotId, TournamentId};

    fn slot(id: i64, day: NaiveDate, start: MinuteOfDay, court: u32, block: u32) -> ScheduleSlot {
        ScheduleSlot {
            id: SlotId(id),
            version_id: ScheduleVersionId(1),
            day_date: day,
            start_minute: start,
            end_minute: start + block,
            court_number: court,
            block_minutes: block,
            is_active: true,
        }
    }

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
    fn full_washout_leaves_nothing_fitting_with_no_other_slots() {
        let day = NaiveDate::from_ymd_opt(2026, 6, 6).unwrap();
        let matches = vec![m(1)];
        let slots = vec![slot(1, day, 540, 1, 60)];
        let assignments = vec![MatchAssignment {
            id: AssignmentId(1),
            version_id: ScheduleVersionId(1),
            match_id: MatchId(1),
            slot_id: SlotId(1),
            assigned_by: crate::model::enums::AssignedBy::AutoAssignV1,
            locked: false,
        }];
        let report =
            assess_feasibility(&matches, &slots, &assignments, RescheduleMode::FullWashout, day, None, None, &[]);
        assert!(report.per_format.iter().all(|f| !f.fits));
    }
}
