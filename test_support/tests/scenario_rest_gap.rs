//! S3: a 60-minute WF-to-scoring rest gap is the floor — 59 minutes is
//! rejected, 60 is accepted.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tournament_core::ids::{EventId, MatchId, ScheduleVersionId, SlotId, TeamId, TournamentId};
use tournament_core::model::enums::MatchType;
use tournament_core::model::schedule::ScheduleSlot;
use tournament_core::model::Match;
use tournament_core::placement::compat::{is_compatible, PlacementState};

fn slot(id: i64, day: NaiveDate, start: u32, court: u32) -> ScheduleSlot {
    ScheduleSlot {
        id: SlotId(id),
        version_id: ScheduleVersionId(1),
        day_date: day,
        start_minute: start,
        end_minute: start + 60,
        court_number: court,
        block_minutes: 60,
        is_active: true,
    }
}

fn wf_match() -> Match {
    let mut m = Match::new(MatchId(1), TournamentId(1), EventId(1), ScheduleVersionId(1), "WF01", MatchType::Wf, 1, 0, 60);
    m.set_team_a(Some(TeamId(1)));
    m
}

fn scoring_match() -> Match {
    let mut m = Match::new(MatchId(2), TournamentId(1), EventId(1), ScheduleVersionId(1), "MAIN01", MatchType::Main, 1, 0, 60);
    m.set_team_a(Some(TeamId(1)));
    m
}

#[test]
fn given_60_minute_gap_scoring_match_is_placeable_but_59_is_not() {
    test_support::init_tracing();
    let day = NaiveDate::from_ymd_opt(2026, 6, 6).unwrap();
    let wf = wf_match();
    let wf_slot = slot(1, day, 540, 1); // 9:00-10:00

    let mut state = PlacementState::default();
    state.record(&wf, &wf_slot);

    let matches_by_id: HashMap<MatchId, &Match> = HashMap::new();
    let excluded: HashSet<SlotId> = HashSet::new();
    let lookup = |_: EventId, _: MatchType, _: u32| Vec::new();

    let next = scoring_match();
    let rejected = slot(2, day, 659, 1); // 10:59, gap 59
    let accepted = slot(3, day, 660, 1); // 11:00, gap 60

    assert!(!is_compatible(&next, &rejected, &state, &matches_by_id, &excluded, None, &lookup));
    assert!(is_compatible(&next, &accepted, &state, &matches_by_id, &excluded, None, &lookup));
}
