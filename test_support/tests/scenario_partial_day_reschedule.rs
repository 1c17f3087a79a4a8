//! S5: a 12:00 unavailability washes out the 12:00 and 13:30 matches on
//! that day; the preview proposes moves for both, ordered by their
//! original slot time, leaving the 9:00 and 10:30 matches untouched.

use chrono::NaiveDate;
use tournament_core::ids::{AssignmentId, EventId, MatchId, ScheduleVersionId, SlotId, TeamId, TournamentId};
use tournament_core::model::enums::{AssignedBy, MatchType, RescheduleMode};
use tournament_core::model::schedule::{MatchAssignment, ScheduleSlot};
use tournament_core::model::Match;
use tournament_core::reschedule::preview_reschedule;

fn slot(id: i64, day: NaiveDate, start: u32, court: u32) -> ScheduleSlot {
    ScheduleSlot {
        id: SlotId(id),
        version_id: ScheduleVersionId(1),
        day_date: day,
        start_minute: start,
        end_minute: start + 90,
        court_number: court,
        block_minutes: 90,
        is_active: true,
    }
}

fn assignment(id: i64, match_id: i64, slot_id: i64) -> MatchAssignment {
    MatchAssignment {
        id: AssignmentId(id),
        version_id: ScheduleVersionId(1),
        match_id: MatchId(match_id),
        slot_id: SlotId(slot_id),
        assigned_by: AssignedBy::AutoAssignV1,
        locked: false,
    }
}

fn m(id: i64) -> Match {
    let mut m = Match::new(MatchId(id), TournamentId(1), EventId(1), ScheduleVersionId(1), format!("M{id}"), MatchType::Main, 1, 0, 90);
    m.set_team_a(Some(TeamId(id)));
    m.set_team_b(Some(TeamId(id + 100)));
    m
}

#[test]
fn given_a_midday_washout_when_previewing_then_only_the_affected_two_matches_move() {
    test_support::init_tracing();
    let day = NaiveDate::from_ymd_opt(2026, 6, 6).unwrap();
    let next_day = NaiveDate::from_ymd_opt(2026, 6, 7).unwrap();

    let matches: Vec<Match> = (1..=4).map(m).collect();
    let existing_slots = vec![
        slot(1, day, 540, 1),  // 9:00
        slot(2, day, 630, 1),  // 10:30
        slot(3, day, 720, 1),  // 12:00 -- lost
        slot(4, day, 810, 1),  // 13:30 -- lost
    ];
    let additional_slots = vec![slot(5, next_day, 540, 1), slot(6, next_day, 630, 1)];
    let assignments = vec![
        assignment(1, 1, 1),
        assignment(2, 2, 2),
        assignment(3, 3, 3),
        assignment(4, 4, 4),
    ];

    let preview = preview_reschedule(
        &matches,
        &existing_slots,
        &additional_slots,
        &assignments,
        &[],
        RescheduleMode::PartialDay,
        day,
        Some(720),
        None,
        &[],
        None,
    );

    assert_eq!(preview.moves.len(), 2);
    assert!(preview.unresolved.is_empty());
    let moved_ids: Vec<MatchId> = preview.moves.iter().map(|mv| mv.match_id).collect();
    assert_eq!(moved_ids, vec![MatchId(3), MatchId(4)]);
}
