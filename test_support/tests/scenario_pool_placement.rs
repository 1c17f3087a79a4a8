//! S6: an 8-team event with one WF round feeds two 4-team pools. Once all
//! four WF matches are FINAL with the higher seed winning, the projection
//! reports both pools confirmed with bucket W -> POOLA and bucket L ->
//! POOLB, and confirming placement rewrites the RR matches' `SEED_N`
//! placeholders into concrete team ids.

use chrono::Utc;
use tournament_core::ids::{EventId, MatchId, ScheduleVersionId, TeamId, TournamentId};
use tournament_core::model::enums::{MatchType, VersionStatus};
use tournament_core::model::schedule::ScheduleVersion;
use tournament_core::model::score::ScoreJson;
use tournament_core::model::Match;
use tournament_core::projection::{confirm_pool_placement, project_pools, ProjectionStatus};

fn wf(id: i64, seed_a: i64, seed_b: i64) -> Match {
    let mut m = Match::new(MatchId(id), TournamentId(1), EventId(1), ScheduleVersionId(1), format!("E1_WF_R1_M{id:02}"), MatchType::Wf, 1, 0, 20);
    m.set_team_a(Some(TeamId(seed_a)));
    m.set_team_b(Some(TeamId(seed_b)));
    // higher seed (lower TeamId) wins
    let winner = if seed_a < seed_b { seed_a } else { seed_b };
    m.finalize(TeamId(winner), ScoreJson::display("6-2"), Utc::now());
    m
}

fn rr(id: i64, pool: &str, seed_a: u32, seed_b: u32) -> Match {
    let mut m = Match::new(MatchId(id), TournamentId(1), EventId(1), ScheduleVersionId(1), format!("E1_POOL{pool}_RR_R1_M{id:02}"), MatchType::Rr, 1, 0, 60);
    m.set_placeholder_side_a(Some(format!("SEED_{seed_a}")));
    m.set_placeholder_side_b(Some(format!("SEED_{seed_b}")));
    m
}

#[test]
fn given_a_fully_final_waterfall_when_projected_then_pools_split_by_winner_loser_and_placement_resolves_seeds() {
    test_support::init_tracing();
    // Seeds 1 vs 8, 2 vs 7, 3 vs 6, 4 vs 5: higher seed (lower TeamId) always wins.
    let mut matches = vec![
        wf(1, 1, 8),
        wf(2, 2, 7),
        wf(3, 3, 6),
        wf(4, 4, 5),
        rr(10, "A", 1, 2),
        rr(11, "A", 3, 4),
        rr(20, "B", 1, 2),
        rr(21, "B", 3, 4),
    ];

    let projections = project_pools(EventId(1), &matches);
    assert_eq!(projections.len(), 2);

    let pool_a = projections.iter().find(|p| p.pool_label == "A").expect("pool A projected");
    assert_eq!(pool_a.teams.len(), 4);
    assert!(pool_a.teams.iter().all(|t| t.status == ProjectionStatus::Confirmed));
    assert!(pool_a.teams.iter().all(|t| t.bucket == "W"), "pool A is the winners' bucket");
    let pool_a_ids: Vec<TeamId> = pool_a.teams.iter().map(|t| t.team_id).collect();
    assert!(pool_a_ids.contains(&TeamId(1)));
    assert!(pool_a_ids.contains(&TeamId(2)));
    assert!(pool_a_ids.contains(&TeamId(3)));
    assert!(pool_a_ids.contains(&TeamId(4)));

    let pool_b = projections.iter().find(|p| p.pool_label == "B").expect("pool B projected");
    assert_eq!(pool_b.teams.len(), 4);
    assert!(pool_b.teams.iter().all(|t| t.bucket == "L"), "pool B is the losers' bucket");
    let pool_b_ids: Vec<TeamId> = pool_b.teams.iter().map(|t| t.team_id).collect();
    assert!(pool_b_ids.contains(&TeamId(5)));
    assert!(pool_b_ids.contains(&TeamId(6)));
    assert!(pool_b_ids.contains(&TeamId(7)));
    assert!(pool_b_ids.contains(&TeamId(8)));

    let version = ScheduleVersion { id: ScheduleVersionId(1), tournament_id: TournamentId(1), status: VersionStatus::Draft, tag: "Desk Draft".into() };

    let mut pool_a_ranked: Vec<TeamId> = pool_a.teams.iter().map(|t| t.team_id).collect();
    pool_a_ranked.sort_by_key(|t| t.0);
    let touched_a = confirm_pool_placement(&version, &mut matches, EventId(1), "A", &pool_a_ranked).expect("pool A confirms");
    assert_eq!(touched_a.len(), 2);

    let mut pool_b_ranked: Vec<TeamId> = pool_b.teams.iter().map(|t| t.team_id).collect();
    pool_b_ranked.sort_by_key(|t| t.0);
    let touched_b = confirm_pool_placement(&version, &mut matches, EventId(1), "B", &pool_b_ranked).expect("pool B confirms");
    assert_eq!(touched_b.len(), 2);

    let rr10 = matches.iter().find(|m| m.id() == MatchId(10)).unwrap();
    assert_eq!(rr10.team_a_id(), Some(TeamId(1)));
    assert_eq!(rr10.team_b_id(), Some(TeamId(2)));
    assert!(rr10.placeholder_side_a().is_none());
    assert!(rr10.placeholder_side_b().is_none());

    let rr20 = matches.iter().find(|m| m.id() == MatchId(20)).unwrap();
    assert_eq!(rr20.team_a_id(), Some(TeamId(5)));
    assert_eq!(rr20.team_b_id(), Some(TeamId(6)));
}
