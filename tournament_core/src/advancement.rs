//! Advancement Resolver: propagates a finalized match's winner or
//! loser into every downstream match that draws from it.

use crate::errors::Warning;
use crate::ids::{MatchId, TeamId};
use crate::model::enums::{MatchType, Role, RuntimeStatus};
use crate::model::match_entity::{Match, Side};
use std::collections::HashMap;
use tracing::{instrument, warn};

/// One resolved downstream update: which match, which side, which team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamUpdate {
    pub match_id: MatchId,
    pub side: Side,
    pub team_id: TeamId,
}

fn advancing_team(source: &Match, role: Role) -> Option<TeamId> {
    match role {
        Role::Winner => source.winner_team_id(),
        Role::Loser => {
            let winner = source.winner_team_id()?;
            source.team_ids().find(|&t| t != winner)
        }
    }
}

/// Applies one finalized match's outcome to every match in `downstream`
/// (every match with `source_match_x_id == source.id()`, paired with the
/// side it feeds and whether that side is locked/pre-pinned). Mutates
/// each target in place; returns warnings for anything skipped.
#[instrument(name = "advancement.apply_advancement", skip(source, downstream), fields(source_id = %source.id(), downstream_count = downstream.len()))]
pub fn apply_advancement(
    source: &Match,
    downstream: &mut [(&mut Match, Side, Role, bool)],
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (target, side, role, locked) in downstream.iter_mut() {
        let Some(team) = advancing_team(source, *role) else {
            continue;
        };
        let current = match side {
            Side::A => target.team_a_id(),
            Side::B => target.team_b_id(),
        };
        if *locked {
            if current != Some(team) {
                warn!(downstream_match_id = %target.id(), "advancement_slot_locked");
                warnings.push(Warning::SlotLocked { downstream_match_id: target.id() });
            }
            continue;
        }
        match current {
            Some(existing) if existing != team => {
                warn!(downstream_match_id = %target.id(), existing = %existing, advancing = %team, "advancement_conflict");
                warnings.push(Warning::ConflictExistingTeam {
                    downstream_match_id: target.id(),
                    existing_team_id: existing,
                    advancing_team_id: team,
                });
            }
            Some(_) => {}
            None => {
                target.set_side(*side, Some(team));
            }
        }
    }
    warnings
}

/// **Score correction**: when a FINAL match's winner changes,
/// clear the previously-advanced team from every non-FINAL downstream
/// match and warn about any already-FINAL downstream match (the operator
/// must fix those by hand), then the caller re-runs
/// [`apply_advancement`] with the new winner.
pub fn clear_stale_advancement(
    old_winner: TeamId,
    downstream: &mut [(&mut Match, Side)],
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (target, side) in downstream.iter_mut() {
        let current = match side {
            Side::A => target.team_a_id(),
            Side::B => target.team_b_id(),
        };
        if current != Some(old_winner) {
            continue;
        }
        if target.runtime_status() == RuntimeStatus::Final {
            warnings.push(Warning::DownstreamAlreadyFinal { downstream_match_id: target.id() });
            continue;
        }
        target.set_side(*side, None);
    }
    warnings
}

/// Finds the next unstarted match on the same court as the just-finalized
/// match's slot (by day, then start_time, already the order
/// `same_court_in_order` is given in) and flips it to IN_PROGRESS.
/// Auto-start failure (no such match, or it's already started) is
/// non-fatal — callers just ignore a `None` result.
pub fn auto_start_next_on_court(same_court_in_order: &mut [Match]) -> Option<MatchId> {
    let next = same_court_in_order
        .iter_mut()
        .find(|m| m.runtime_status() == RuntimeStatus::Scheduled)?;
    next.set_runtime_status(RuntimeStatus::InProgress);
    Some(next.id())
}

/// Repair pass: rewrites dangling placeholder strings back
/// into concrete `source_match_x_id`/`source_x_role` links before a
/// normal advancement re-run. Never invoked during ordinary generation;
/// this is a maintenance-only operation gated by the caller.
///
/// Two placeholder shapes are understood, both produced historically by
/// draw plans this crate no longer emits itself: `"WINNER:code"` /
/// `"LOSER:code"`, and a bracket-role-implicit bare code whose role is
/// inferred from a `BWW`/`BLW` substring in the match's own match_code
/// (`BWW`/`BLW` imply WINNER, anything else implies LOSER).
pub fn repair_placeholders(matches: &mut [Match]) {
    let code_to_id: HashMap<String, MatchId> =
        matches.iter().map(|m| (m.match_code().to_string(), m.id())).collect();

    let legacy_r2_fix = |code: &str| -> Option<String> {
        let (prefix, rest) = code.rsplit_once("WF_R2_")?;
        let (track, seq) = rest.split_at(1);
        if track != "W" && track != "L" {
            return None;
        }
        let seq: u32 = seq.parse().ok()?;
        if seq <= 8 {
            return None;
        }
        Some(format!("{prefix}WF_R2_L{:02}", seq - 8))
    };

    for m in matches.iter_mut() {
        let needs_legacy_fix = (m.match_type() == MatchType::Main || m.match_type() == MatchType::Consolation)
            && (m.match_code().contains("BLW") || m.match_code().contains("BLL"));

        for side in [Side::A, Side::B] {
            let placeholder = match side {
                Side::A => m.placeholder_side_a().map(str::to_string),
                Side::B => m.placeholder_side_b().map(str::to_string),
            };
            let Some(raw) = placeholder else { continue };
            let fixed = if needs_legacy_fix {
                legacy_r2_fix(&raw).unwrap_or(raw)
            } else {
                raw
            };

            let (role, code) = if let Some(code) = fixed.strip_prefix("WINNER:") {
                (Role::Winner, code)
            } else if let Some(code) = fixed.strip_prefix("LOSER:") {
                (Role::Loser, code)
            } else {
                let role = if fixed.contains("BWW") || fixed.contains("BLW") {
                    Role::Winner
                } else {
                    Role::Loser
                };
                (role, fixed.as_str())
            };

            if let Some(&source_id) = code_to_id.get(code) {
                m.wire_source(side, Some(source_id), Some(role));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{EventId, ScheduleVersionId, TeamId, TournamentId};

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
    fn winner_advances_into_empty_side() {
        let mut source = m(1);
        source.set_team_a(Some(TeamId(1)));
        source.set_team_b(Some(TeamId(2)));
        source.finalize(TeamId(1), crate::model::score::ScoreJson::display("final"), chrono::Utc::now());

        let mut target = m(2);
        let mut downstream = vec![(&mut target, Side::A, Role::Winner, false)];
        let warnings = apply_advancement(&source, &mut downstream);
        assert!(warnings.is_empty());
        assert_eq!(target.team_a_id(), Some(TeamId(1)));
    }

    #[test]
    fn conflicting_team_is_not_overwritten() {
        let mut source = m(1);
        source.set_team_a(Some(TeamId(1)));
        source.set_team_b(Some(TeamId(2)));
        source.finalize(TeamId(1), crate::model::score::ScoreJson::display("final"), chrono::Utc::now());

        let mut target = m(2);
        target.set_team_a(Some(TeamId(9)));
        let mut downstream = vec![(&mut target, Side::A, Role::Winner, false)];
        let warnings = apply_advancement(&source, &mut downstream);
        assert_eq!(warnings.len(), 1);
        assert_eq!(target.team_a_id(), Some(TeamId(9)));
    }

    #[test]
    fn loser_role_advances_the_other_team() {
        let mut source = m(1);
        source.set_team_a(Some(TeamId(1)));
        source.set_team_b(Some(TeamId(2)));
        source.finalize(TeamId(1), crate::model::score::ScoreJson::display("final"), chrono::Utc::now());

        let mut target = m(2);
        let mut downstream = vec![(&mut target, Side::B, Role::Loser, false)];
        apply_advancement(&source, &mut downstream);
        assert_eq!(target.team_b_id(), Some(TeamId(2)));
    }
}
