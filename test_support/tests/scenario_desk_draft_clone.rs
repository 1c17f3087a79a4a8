//! S1: cloning a published version with FINAL matches into a fresh desk
//! draft, and the idempotent second call.

use chrono::Utc;
use test_support::store::InMemoryEntityStore;
use tournament_core::draft::create_desk_draft;
use tournament_core::ids::{EventId, MatchId, ScheduleVersionId, TeamId, TournamentId};
use tournament_core::model::{Match, MatchType, ScheduleVersion, ScoreJson, Tournament, VersionStatus};
use tournament_core::ports::store::EsMatches;

fn final_match(id: i64, code: &str, team_a: i64, team_b: i64) -> Match {
    let mut m = Match::new(
        MatchId(id),
        TournamentId(1),
        EventId(1),
        ScheduleVersionId(1),
        code,
        MatchType::Main,
        1,
        0,
        60,
    );
    m.set_team_a(Some(TeamId(team_a)));
    m.set_team_b(Some(TeamId(team_b)));
    m.finalize(TeamId(team_a), ScoreJson::display("8-4"), Utc::now());
    m
}

#[tokio::test]
async fn given_published_version_with_final_matches_when_creating_desk_draft_then_it_clones_them() {
    test_support::init_tracing();
    let store = InMemoryEntityStore::new();
    let today = Utc::now().date_naive();
    let mut t = Tournament::new(TournamentId(1), "Spring Open", "Europe/Berlin", today, today);
    t.set_published_version_id(Some(ScheduleVersionId(1)));
    store.seed_tournament(t);
    store.seed_version(ScheduleVersion {
        id: ScheduleVersionId(1),
        tournament_id: TournamentId(1),
        status: VersionStatus::Final,
        tag: String::new(),
    });
    store.seed_matches(vec![
        final_match(1, "E1_MAIN_R1_M01", 1, 2),
        final_match(2, "E1_MAIN_R1_M02", 3, 4),
        final_match(3, "E1_MAIN_R1_M03", 5, 6),
    ]);

    let draft = create_desk_draft(&store, TournamentId(1)).await.expect("draft creation succeeds");
    assert_ne!(draft.id, ScheduleVersionId(1));
    assert_eq!(draft.status, VersionStatus::Draft);
    assert_eq!(draft.tag, "Desk Draft");

    let cloned = store.list_matches_of_version(draft.id).await.unwrap();
    assert_eq!(cloned.len(), 3);

    let second = create_desk_draft(&store, TournamentId(1)).await.expect("idempotent call succeeds");
    assert_eq!(second.id, draft.id);
}
