//! WF → Pool Projection: projects pool membership from whatever
//! subset of an event's waterfall matches is FINAL, and resolves the
//! `SEED_N` placeholders once an operator confirms it.

use crate::errors::{CoreError, CoreResult};
use crate::ids::{EventId, MatchId, TeamId};
use crate::model::enums::{MatchType, RuntimeStatus, VersionStatus};
use crate::model::match_entity::Match;
use crate::model::schedule::ScheduleVersion;
use std::collections::HashMap;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionStatus {
    /// The team hasn't played any waterfall round yet.
    Pending,
    /// Some but not all of the team's waterfall rounds are FINAL; the
    /// bucket below assumes the team wins every remaining round.
    Projected,
    /// Every waterfall round for the team is FINAL.
    Confirmed,
}

#[derive(Debug, Clone)]
pub struct ProjectedTeam {
    pub team_id: TeamId,
    pub bucket: String,
    pub bucket_rank: u32,
    pub seed_in_pool: u32,
    pub status: ProjectionStatus,
}

#[derive(Debug, Clone)]
pub struct PoolProjection {
    pub pool_label: String,
    pub teams: Vec<ProjectedTeam>,
}

fn pool_label_of(match_code: &str) -> Option<String> {
    let rest = match_code.split_once("POOL")?.1;
    let label: String = rest.chars().take_while(|c| c.is_ascii_uppercase()).collect();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Builds each team's W/L bucket string from FINAL waterfall matches,
/// ordered by round_index; a round the team hasn't finished yet is
/// optimistically recorded as a win so a partial projection can still be
/// computed.
fn team_buckets(wf_matches: &[&Match]) -> (HashMap<TeamId, String>, HashMap<TeamId, ProjectionStatus>) {
    let max_round = wf_matches.iter().map(|m| m.round_index()).max().unwrap_or(0);
    let mut rounds: Vec<Vec<&&Match>> = vec![Vec::new(); max_round as usize];
    for m in wf_matches {
        if m.round_index() >= 1 {
            rounds[(m.round_index() - 1) as usize].push(m);
        }
    }

    let mut teams: Vec<TeamId> = wf_matches.iter().flat_map(|m| m.team_ids()).collect();
    teams.sort_by_key(|t| t.0);
    teams.dedup();

    let mut buckets = HashMap::new();
    let mut statuses = HashMap::new();
    for team in teams {
        let mut bucket = String::new();
        let mut played_any = false;
        let mut all_final = true;
        for round in &rounds {
            let Some(m) = round.iter().find(|m| m.team_ids().any(|t| t == team)) else {
                bucket.push('W');
                continue;
            };
            if m.runtime_status() == RuntimeStatus::Final {
                played_any = true;
                let won = m.winner_team_id() == Some(team);
                bucket.push(if won { 'W' } else { 'L' });
            } else {
                all_final = false;
                bucket.push('W');
            }
        }
        let status = if !played_any {
            ProjectionStatus::Pending
        } else if all_final {
            ProjectionStatus::Confirmed
        } else {
            ProjectionStatus::Projected
        };
        buckets.insert(team, bucket);
        statuses.insert(team, status);
    }
    (buckets, statuses)
}

fn bucket_rank(bucket: &str) -> u32 {
    bucket.chars().fold(0, |acc, c| (acc << 1) | if c == 'L' { 1 } else { 0 })
}

/// Computes projected pool assignments for one event from whatever WF
/// matches are currently FINAL.
#[instrument(name = "projection.project_pools", skip(matches), fields(event_id = %event_id))]
pub fn project_pools(event_id: EventId, matches: &[Match]) -> Vec<PoolProjection> {
    let wf_matches: Vec<&Match> =
        matches.iter().filter(|m| m.event_id() == event_id && m.match_type() == MatchType::Wf).collect();
    let (buckets, statuses) = team_buckets(&wf_matches);

    let mut pool_labels: Vec<String> = matches
        .iter()
        .filter(|m| m.event_id() == event_id && m.match_type() == MatchType::Rr)
        .filter_map(|m| pool_label_of(m.match_code()))
        .collect();
    pool_labels.sort();
    pool_labels.dedup();
    if pool_labels.is_empty() {
        info!("no_pools_to_project");
        return Vec::new();
    }
    let pool_count = pool_labels.len();
    let pool_size = buckets.len() / pool_count.max(1);

    let mut ranked: Vec<TeamId> = buckets.keys().copied().collect();
    ranked.sort_by_key(|t| (bucket_rank(&buckets[t]), t.0));

    pool_labels
        .into_iter()
        .enumerate()
        .map(|(i, pool_label)| {
            let start = i * pool_size;
            let end = if i + 1 == pool_count { ranked.len() } else { start + pool_size };
            let teams = ranked[start.min(ranked.len())..end.min(ranked.len())]
                .iter()
                .enumerate()
                .map(|(seed_index, &team_id)| ProjectedTeam {
                    team_id,
                    bucket: buckets[&team_id].clone(),
                    bucket_rank: bucket_rank(&buckets[&team_id]),
                    seed_in_pool: seed_index as u32 + 1,
                    status: statuses[&team_id],
                })
                .collect();
            PoolProjection { pool_label, teams }
        })
        .collect()
}

/// Confirms a pool's membership and rewrites its RR matches' `SEED_N`
/// placeholders into concrete team ids. Draft-only, and only once every
/// waterfall match in the event is FINAL.
#[instrument(name = "projection.confirm_pool_placement", skip(version, matches, team_ids), fields(event_id = %event_id, pool_label = %pool_label))]
pub fn confirm_pool_placement(
    version: &ScheduleVersion,
    matches: &mut [Match],
    event_id: EventId,
    pool_label: &str,
    team_ids: &[TeamId],
) -> CoreResult<Vec<MatchId>> {
    if version.status != VersionStatus::Draft {
        return Err(CoreError::VersionNotDraft(version.id.to_string()));
    }
    let wf_final = matches
        .iter()
        .filter(|m| m.event_id() == event_id && m.match_type() == MatchType::Wf)
        .all(|m| m.runtime_status() == RuntimeStatus::Final);
    if !wf_final {
        return Err(CoreError::Conflict("waterfall must be fully final before confirming pool placement".into()));
    }

    let mut touched = Vec::new();
    for m in matches.iter_mut() {
        if m.event_id() != event_id || m.match_type() != MatchType::Rr {
            continue;
        }
        if pool_label_of(m.match_code()).as_deref() != Some(pool_label) {
            continue;
        }
        let mut changed = false;
        if let Some(seed) = m.placeholder_side_a().and_then(parse_seed) {
            if let Some(&team) = team_ids.get(seed - 1) {
                m.set_team_a(Some(team));
                m.set_placeholder_side_a(None);
                changed = true;
            }
        }
        if let Some(seed) = m.placeholder_side_b().and_then(parse_seed) {
            if let Some(&team) = team_ids.get(seed - 1) {
                m.set_team_b(Some(team));
                m.set_placeholder_side_b(None);
                changed = true;
            }
        }
        if changed {
            touched.push(m.id());
        }
    }
    info!(touched_count = touched.len(), "pool_placement_confirmed");
    Ok(touched)
}

fn parse_seed(placeholder: &str) -> Option<usize> {
    placeholder.strip_prefix("SEED_")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ScheduleVersionId, TournamentId};

    fn wf(id: i64, event: i64, round: u32, a: i64, b: i64, winner: Option<i64>) -> Match {
        let mut m = Match::new(
            MatchId(id),
            TournamentId(1),
            EventId(event),
            ScheduleVersionId(1),
            format!("WF_R{round}_M{id}"),
            MatchType::Wf,
            round,
            0,
            20,
        );
        m.set_team_a(Some(TeamId(a)));
        m.set_team_b(Some(TeamId(b)));
        if let Some(w) = winner {
            m.finalize(TeamId(w), crate::model::score::ScoreJson::display("final"), chrono::Utc::now());
        }
        m
    }

    fn rr(id: i64, event: i64, pool: &str, seed_a: u32, seed_b: u32) -> Match {
        let mut m = Match::new(
            MatchId(id),
            TournamentId(1),
            EventId(event),
            ScheduleVersionId(1),
            format!("E{event}_POOL{pool}_RR_R1_M{id:02}"),
            MatchType::Rr,
            1,
            0,
            60,
        );
        m.set_placeholder_side_a(Some(format!("SEED_{seed_a}")));
        m.set_placeholder_side_b(Some(format!("SEED_{seed_b}")));
        m
    }

    #[test]
    fn confirmed_teams_split_into_two_pools_by_winner_loser() {
        let matches = vec![
            wf(1, 1, 1, 1, 2, Some(1)),
            wf(2, 1, 1, 3, 4, Some(3)),
            wf(3, 1, 1, 5, 6, Some(5)),
            wf(4, 1, 1, 7, 8, Some(7)),
            rr(10, 1, "A", 1, 2),
            rr(11, 1, "B", 1, 2),
        ];
        let projections = project_pools(EventId(1), &matches);
        assert_eq!(projections.len(), 2);
        let pool_a = projections.iter().find(|p| p.pool_label == "A").unwrap();
        assert!(pool_a.teams.iter().all(|t| t.status == ProjectionStatus::Confirmed));
        assert!(pool_a.teams.iter().all(|t| t.bucket == "W"));
    }

    #[test]
    fn confirm_placement_rewrites_seed_placeholders() {
        let version = ScheduleVersion {
            id: ScheduleVersionId(1),
            tournament_id: TournamentId(1),
            status: VersionStatus::Draft,
            tag: "Desk Draft".into(),
        };
        let mut matches = vec![wf(1, 1, 1, 1, 2, Some(1)), rr(10, 1, "A", 1, 2)];
        let touched =
            confirm_pool_placement(&version, &mut matches, EventId(1), "A", &[TeamId(1), TeamId(2)]).unwrap();
        assert_eq!(touched, vec![MatchId(10)]);
        assert_eq!(matches[1].team_a_id(), Some(TeamId(1)));
        assert_eq!(matches[1].team_b_id(), Some(TeamId(2)));
    }
}
