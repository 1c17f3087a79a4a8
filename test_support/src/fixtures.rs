//! Fixture builders for the end-to-end scenario tests. Each helper wires
//! up just enough of a tournament to exercise one engine, the way the
//! teacher's `make_core_*_with_fakes` helpers build up a `Core<State>`.

use chrono::NaiveDate;
use tournament_core::draw_plan::generate_matches;
use tournament_core::ids::{EventId, MatchId, ScheduleVersionId, TeamId, TournamentId};
use tournament_core::model::{
    Event, Guarantee, Match, ScheduleVersion, Team, TemplateKey, Tournament, TournamentDay,
    VersionStatus,
};

use crate::store::InMemoryEntityStore;

pub fn naive_day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
}

/// A two-day, `court_count`-court tournament with a single published
/// empty draft, seeded into `store`.
pub fn seed_tournament(store: &InMemoryEntityStore, court_count: u32) -> TournamentId {
    let day1 = naive_day(2026, 6, 6);
    let day2 = naive_day(2026, 6, 7);
    let mut t = Tournament::new(TournamentId(1), "Spring Open", "Europe/Berlin", day1, day2);
    t.set_court_labels((1..=court_count).map(|n| format!("Court {n}")).collect());
    t.set_days(vec![
        TournamentDay { date: day1, earliest_start_minute: 540, latest_end_minute: 1140 },
        TournamentDay { date: day2, earliest_start_minute: 540, latest_end_minute: 1140 },
    ]);
    store.seed_tournament(t);
    TournamentId(1)
}

/// An event with `team_count` seeded teams, seed == 1-based arrival order.
pub fn seed_event_with_teams(
    store: &InMemoryEntityStore,
    tournament_id: TournamentId,
    event_id: EventId,
    team_count: u32,
) -> Vec<Team> {
    let event = Event::new(event_id, tournament_id, "Open Singles", "Singles", team_count);
    store.seed_event(event);

    (1..=team_count)
        .map(|seed| {
            let team = Team::new(TeamId(i64::from(seed)), event_id, seed, format!("Team {seed}"));
            store.seed_team(team.clone());
            team
        })
        .collect()
}

/// Compiles a draw plan for `teams` into a fresh desk-draft version and
/// seeds both into `store`, returning the version id and the matches.
#[allow(clippy::too_many_arguments)]
pub fn compile_desk_draft(
    store: &InMemoryEntityStore,
    tournament_id: TournamentId,
    event_id: EventId,
    version_id: ScheduleVersionId,
    template_key: TemplateKey,
    waterfall_rounds: u32,
    guarantee: Guarantee,
    teams: &[Team],
    waterfall_block_minutes: u32,
    standard_block_minutes: u32,
) -> Vec<Match> {
    store.seed_version(ScheduleVersion {
        id: version_id,
        tournament_id,
        status: VersionStatus::Draft,
        tag: "Desk Draft".into(),
    });

    let mut next_match_id: i64 = 1;
    let output = generate_matches(
        tournament_id,
        event_id,
        version_id,
        template_key,
        waterfall_rounds,
        guarantee,
        teams,
        waterfall_block_minutes,
        standard_block_minutes,
        &mut || {
            let id = MatchId(next_match_id);
            next_match_id += 1;
            id
        },
    )
    .expect("fixture draw plan must compile");

    store.seed_matches(output.matches.clone());
    output.matches
}
