//! S2: finalizing a WF R1 match advances the winner into the matching
//! side of the R2 match that draws from it.

use chrono::Utc;
use tournament_core::advancement::apply_advancement;
use tournament_core::ids::{EventId, MatchId, ScheduleVersionId, TeamId, TournamentId};
use tournament_core::model::enums::{MatchType, Role, RuntimeStatus, VersionStatus};
use tournament_core::model::match_entity::Side;
use tournament_core::model::schedule::ScheduleVersion;
use tournament_core::model::score::ScoreJson;
use tournament_core::model::Match;
use tournament_core::runtime::finalize_match;

fn wf_match(id: i64, code: &str, round: u32) -> Match {
    Match::new(MatchId(id), TournamentId(1), EventId(1), ScheduleVersionId(1), code, MatchType::Wf, round, 0, 20)
}

#[tokio::test]
async fn given_r1_winner_when_finalized_then_advancement_fills_r2_team_a() {
    test_support::init_tracing();
    let version = ScheduleVersion {
        id: ScheduleVersionId(1),
        tournament_id: TournamentId(1),
        status: VersionStatus::Draft,
        tag: "Desk Draft".into(),
    };

    let mut r1 = wf_match(1, "WOM_E1_WF_R1_M01", 1);
    r1.set_team_a(Some(TeamId(10))); // Alpha
    r1.set_team_b(Some(TeamId(20))); // Delta

    let mut r2 = wf_match(2, "WOM_E1_WF_R2_M01", 2);
    r2.wire_source_a(Some(r1.id()), Some(Role::Winner));

    finalize_match(&version, &mut r1, TeamId(10), ScoreJson::display("8-4"), Utc::now())
        .expect("finalize succeeds for a participant");
    assert_eq!(r1.runtime_status(), RuntimeStatus::Final);
    assert_eq!(r1.score_json().map(ScoreJson::to_display_string), Some("8-4".to_string()));

    let mut downstream = vec![(&mut r2, Side::A, Role::Winner, false)];
    let warnings = apply_advancement(&r1, &mut downstream);
    assert!(warnings.is_empty());
    assert_eq!(r2.team_a_id(), Some(TeamId(10)));
}
