//! Draw Plan Engine top-level orchestration: turns a template key,
//! waterfall round count, guarantee and seeded team list into the full set
//! of matches for a brand-new ScheduleVersion.
//!
//! Matches are first built against *local* indices into a draft buffer —
//! downstream references (WF R2 off R1, brackets off WF, consolation off
//! brackets) all point at a draft that already exists earlier in the
//! buffer. [`materialize`] allocates real ids in one pass and resolves the
//! local references into `(MatchId, Role)` pairs in a second.

use crate::errors::{CoreError, CoreResult, Warning};
use crate::ids::{EventId, MatchId, ScheduleVersionId, TeamId, TournamentId};
use crate::model::enums::{MatchType, Role, TemplateKey};
use crate::model::event::{Guarantee, InventoryCounts};
use crate::model::match_entity::{Match, Side};
use crate::model::team::Team;
use crate::utils::validation::{FieldError, ValidationErrors};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{info, instrument};

use super::brackets::{feeder_indices, round_sizes};
use super::rr::circle_method_pairings;
use super::wf_pairing::{wf_r1_pairing, SeedEntry};
use super::wf_wiring::{build_wf_r2_wiring, WiredR1Match};

pub struct DrawPlanOutput {
    pub matches: Vec<Match>,
    pub inventory: InventoryCounts,
    pub warnings: Vec<Warning>,
}

struct Draft {
    m: Match,
    src_a: Option<(usize, Role)>,
    src_b: Option<(usize, Role)>,
}

#[allow(clippy::too_many_arguments)]
#[instrument(
    name = "draw_plan.generate_matches",
    skip(guarantee, teams, allocate_id),
    fields(event_id = %event_id, template_key = ?template_key, team_count = teams.len())
)]
pub fn generate_matches(
    tournament_id: TournamentId,
    event_id: EventId,
    version_id: ScheduleVersionId,
    template_key: TemplateKey,
    waterfall_rounds: u32,
    guarantee: Guarantee,
    teams: &[Team],
    waterfall_block_minutes: u32,
    standard_block_minutes: u32,
    allocate_id: &mut dyn FnMut() -> MatchId,
) -> CoreResult<DrawPlanOutput> {
    use TemplateKey::*;

    let mut sorted: Vec<&Team> = teams.iter().collect();
    sorted.sort_by_key(|t| t.seed());

    let prefix = code_prefix(event_id);
    let mut warnings = Vec::new();
    let mut drafts: Vec<Draft> = Vec::new();

    match template_key {
        RrOnly => {
            build_rr_pool(
                &mut drafts,
                &prefix,
                "",
                &sorted,
                tournament_id,
                event_id,
                version_id,
                standard_block_minutes,
            );
        }
        WfToPoolsDynamic | WfToPools4 => {
            let buckets = build_wf_rounds(
                &mut drafts,
                &mut warnings,
                &prefix,
                &sorted,
                waterfall_rounds,
                tournament_id,
                event_id,
                version_id,
                waterfall_block_minutes,
            )?;
            let labels = bucket_labels(waterfall_rounds)?;
            let pool_count = labels.len() as u32;
            let n = sorted.len() as u32;
            if pool_count == 0 || n % pool_count != 0 {
                return Err(invalid_team_count("team_count does not split evenly into waterfall pools"));
            }
            let pool_size = n / pool_count;
            for (i, label) in labels.iter().enumerate() {
                let pool_label = ((b'A' + i as u8) as char).to_string();
                let feeders = &buckets[*label];
                build_pool_rr_from_feeders(
                    &mut drafts,
                    &prefix,
                    &pool_label,
                    feeders,
                    pool_size as usize,
                    tournament_id,
                    event_id,
                    version_id,
                    standard_block_minutes,
                );
            }
        }
        WfToBrackets8 => {
            let buckets = build_wf_rounds(
                &mut drafts,
                &mut warnings,
                &prefix,
                &sorted,
                waterfall_rounds,
                tournament_id,
                event_id,
                version_id,
                waterfall_block_minutes,
            )?;
            let n = sorted.len() as u32;
            let bracket_count = n.div_ceil(8);

            if waterfall_rounds == 0 {
                if n % bracket_count != 0 {
                    return Err(invalid_team_count("team_count does not split evenly into brackets"));
                }
                let track_size = (n / bracket_count) as usize;
                let sizes = round_sizes(track_size as u32)
                    .ok_or_else(|| invalid_team_count("bracket track size must be a power of two"))?;
                for (i, track) in sorted.chunks(track_size).enumerate() {
                    let bracket_label = if bracket_count == 1 { String::new() } else { (i + 1).to_string() };
                    build_bracket(
                        &mut drafts,
                        &prefix,
                        &bracket_label,
                        &sizes,
                        BracketSeed::Direct(standard_bracket_team_pairs(track)),
                        guarantee,
                        tournament_id,
                        event_id,
                        version_id,
                        standard_block_minutes,
                    );
                }
            } else {
                // The waterfall rounds always split into a fixed number of
                // outcome buckets (2 for one round, 4 for two); when that's
                // more buckets than `bracket_count` calls for, adjacent
                // buckets are merged pairwise into one bracket's feeder list
                // rather than dropped, so every team still lands in a
                // bracket.
                let all_labels = bucket_labels(waterfall_rounds)?;
                let total_labels = all_labels.len() as u32;
                if bracket_count == 0
                    || total_labels % bracket_count != 0
                    || n % bracket_count != 0
                {
                    return Err(invalid_team_count(
                        "team_count's bracket count does not evenly group the waterfall outcome buckets",
                    ));
                }
                let group_size = (total_labels / bracket_count) as usize;
                let track_size = n / bracket_count;
                let sizes = round_sizes(track_size)
                    .ok_or_else(|| invalid_team_count("bracket track size must be a power of two"))?;
                for label_group in all_labels.chunks(group_size) {
                    let bracket_label = label_group.join("");
                    let mut feeders = Vec::new();
                    for label in label_group {
                        feeders.extend(buckets[*label].iter().copied());
                    }
                    build_bracket(
                        &mut drafts,
                        &prefix,
                        &bracket_label,
                        &sizes,
                        BracketSeed::FromWf(feeders),
                        guarantee,
                        tournament_id,
                        event_id,
                        version_id,
                        standard_block_minutes,
                    );
                }
            }
        }
    }

    let mut codes = HashSet::with_capacity(drafts.len());
    for d in &drafts {
        if !codes.insert(d.m.match_code().to_string()) {
            return Err(CoreError::DuplicateMatchCode(d.m.match_code().to_string()));
        }
    }

    let inventory = count_inventory(&drafts);
    let matches = materialize(drafts, allocate_id);
    info!(match_count = matches.len(), warning_count = warnings.len(), "draw_plan_generated");
    Ok(DrawPlanOutput { matches, inventory, warnings })
}

fn invalid_team_count(message: &str) -> CoreError {
    let field_error = FieldError::builder()
        .on("team_count")
        .invalid_format()
        .message(message.to_string())
        .done();
    CoreError::Validation(ValidationErrors::from(field_error))
}

fn code_prefix(event_id: EventId) -> String {
    format!("E{event_id}")
}

fn bucket_labels(waterfall_rounds: u32) -> CoreResult<&'static [&'static str]> {
    match waterfall_rounds {
        1 => Ok(&["W", "L"]),
        2 => Ok(&["WW", "WL", "LW", "LL"]),
        other => Err(invalid_team_count(&format!(
            "unsupported waterfall_rounds {other} for this template"
        ))),
    }
}

fn count_inventory(drafts: &[Draft]) -> InventoryCounts {
    let mut counts = InventoryCounts::default();
    for d in drafts {
        match d.m.match_type() {
            MatchType::Wf => counts.wf += 1,
            MatchType::Rr => counts.rr += 1,
            MatchType::Main => counts.main += 1,
            MatchType::Consolation => counts.consolation += 1,
            MatchType::Placement => counts.placement += 1,
        }
    }
    counts
}

fn materialize(drafts: Vec<Draft>, allocate_id: &mut dyn FnMut() -> MatchId) -> Vec<Match> {
    let ids: Vec<MatchId> = drafts.iter().map(|_| allocate_id()).collect();
    let mut matches: Vec<Match> = drafts.iter().map(|d| d.m.clone()).collect();
    for (i, id) in ids.iter().enumerate() {
        matches[i].set_id(*id);
    }
    for (i, d) in drafts.iter().enumerate() {
        if let Some((src, role)) = d.src_a {
            matches[i].wire_source(Side::A, Some(ids[src]), Some(role));
        }
        if let Some((src, role)) = d.src_b {
            matches[i].wire_source(Side::B, Some(ids[src]), Some(role));
        }
    }
    matches
}

#[allow(clippy::too_many_arguments)]
fn build_rr_pool(
    drafts: &mut Vec<Draft>,
    prefix: &str,
    pool_label: &str,
    teams: &[&Team],
    tournament_id: TournamentId,
    event_id: EventId,
    version_id: ScheduleVersionId,
    duration: u32,
) {
    let n = teams.len();
    let pool_tag = if pool_label.is_empty() {
        String::new()
    } else {
        format!("POOL{pool_label}_")
    };
    for (r_idx, round) in circle_method_pairings(n).into_iter().enumerate() {
        let round_index = (r_idx + 1) as u32;
        for (seq, (a, b)) in round.into_iter().enumerate() {
            let code = format!("{prefix}_{pool_tag}RR_R{round_index}_M{:02}", seq + 1);
            let mut m = Match::new(
                MatchId(0),
                tournament_id,
                event_id,
                version_id,
                code,
                MatchType::Rr,
                round_index,
                seq as u32,
                duration,
            );
            m.set_team_a(Some(teams[a].id()));
            m.set_team_b(Some(teams[b].id()));
            drafts.push(Draft { m, src_a: None, src_b: None });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_pool_rr_from_feeders(
    drafts: &mut Vec<Draft>,
    prefix: &str,
    pool_label: &str,
    feeders: &[(usize, Role)],
    pool_size: usize,
    tournament_id: TournamentId,
    event_id: EventId,
    version_id: ScheduleVersionId,
    duration: u32,
) {
    debug_assert_eq!(feeders.len(), pool_size);
    for (r_idx, round) in circle_method_pairings(pool_size).into_iter().enumerate() {
        let round_index = (r_idx + 1) as u32;
        for (seq, (a, b)) in round.into_iter().enumerate() {
            let code = format!("{prefix}_POOL{pool_label}_RR_R{round_index}_M{:02}", seq + 1);
            let mut m = Match::new(
                MatchId(0),
                tournament_id,
                event_id,
                version_id,
                code,
                MatchType::Rr,
                round_index,
                seq as u32,
                duration,
            );
            m.set_placeholder_side_a(Some(format!("SEED_{}", a + 1)));
            m.set_placeholder_side_b(Some(format!("SEED_{}", b + 1)));
            drafts.push(Draft { m, src_a: None, src_b: None });
        }
    }
}

/// Builds the waterfall rounds and returns, per final bucket label, the
/// ordered list of (draft index, role) feeders a downstream pool or
/// bracket draws teams from. Empty when `waterfall_rounds == 0`.
#[allow(clippy::too_many_arguments)]
fn build_wf_rounds(
    drafts: &mut Vec<Draft>,
    warnings: &mut Vec<Warning>,
    prefix: &str,
    teams: &[&Team],
    waterfall_rounds: u32,
    tournament_id: TournamentId,
    event_id: EventId,
    version_id: ScheduleVersionId,
    duration: u32,
) -> CoreResult<BTreeMap<&'static str, Vec<(usize, Role)>>> {
    let mut buckets = BTreeMap::new();
    if waterfall_rounds == 0 {
        return Ok(buckets);
    }

    let seed_entries: Vec<SeedEntry> = teams
        .iter()
        .map(|t| SeedEntry {
            team_id: t.id(),
            seed: t.seed(),
            avoid_group: t.avoid_group().map(String::from),
        })
        .collect();
    let pairing = wf_r1_pairing(&seed_entries);
    for conflict in &pairing.conflicts {
        warnings.push(Warning::WfR1AvoidGroupConflict {
            event_id,
            group: conflict.group.clone(),
            team_a_id: conflict.team_a,
            team_b_id: conflict.team_b,
        });
    }

    let mut r1_indices = Vec::with_capacity(pairing.pairs.len());
    for (seq, (a, b)) in pairing.pairs.into_iter().enumerate() {
        let code = format!("{prefix}_WF_R1_M{:02}", seq + 1);
        let mut m = Match::new(
            MatchId(0),
            tournament_id,
            event_id,
            version_id,
            code,
            MatchType::Wf,
            1,
            seq as u32,
            duration,
        );
        m.set_team_a(Some(a));
        m.set_team_b(Some(b));
        drafts.push(Draft { m, src_a: None, src_b: None });
        r1_indices.push(drafts.len() - 1);
    }

    if waterfall_rounds == 1 {
        buckets.insert("W", r1_indices.iter().map(|&i| (i, Role::Winner)).collect());
        buckets.insert("L", r1_indices.iter().map(|&i| (i, Role::Loser)).collect());
        return Ok(buckets);
    }

    let team_group: BTreeMap<TeamId, Option<String>> = teams
        .iter()
        .map(|t| (t.id(), t.avoid_group().map(String::from)))
        .collect();
    let wired: Vec<WiredR1Match> = r1_indices
        .iter()
        .enumerate()
        .map(|(local, &idx)| {
            let d = &drafts[idx];
            let mut groups = BTreeSet::new();
            for team_id in d.m.team_ids() {
                if let Some(Some(g)) = team_group.get(&team_id) {
                    groups.insert(g.clone());
                }
            }
            WiredR1Match {
                match_id: MatchId(local as i64),
                match_code: d.m.match_code().to_string(),
                avoid_groups: groups,
            }
        })
        .collect();
    let plan = build_wf_r2_wiring(&wired, 4);
    for w in plan.warnings {
        warnings.push(Warning::WfR2AvoidGroupPotentialConflict {
            event_id,
            block_index: w.block_index,
            r1_match_codes: w.r1_match_codes,
            overlapping_groups: w.overlapping_groups,
        });
    }

    let mut r2w = Vec::new();
    let mut r2l = Vec::new();
    for (seq, (mi, mj)) in plan.pairs.into_iter().enumerate() {
        let ri = r1_indices[mi.0 as usize];
        let rj = r1_indices[mj.0 as usize];
        let code_i = drafts[ri].m.match_code().to_string();
        let code_j = drafts[rj].m.match_code().to_string();

        let w_code = format!("{prefix}_WF_R2_W{:02}", seq + 1);
        let mut wm = Match::new(
            MatchId(0),
            tournament_id,
            event_id,
            version_id,
            w_code,
            MatchType::Wf,
            2,
            seq as u32,
            duration,
        );
        wm.set_placeholder_side_a(Some(format!("WINNER:{code_i}")));
        wm.set_placeholder_side_b(Some(format!("WINNER:{code_j}")));
        drafts.push(Draft { m: wm, src_a: Some((ri, Role::Winner)), src_b: Some((rj, Role::Winner)) });
        r2w.push(drafts.len() - 1);

        let l_code = format!("{prefix}_WF_R2_L{:02}", seq + 1);
        let mut lm = Match::new(
            MatchId(0),
            tournament_id,
            event_id,
            version_id,
            l_code,
            MatchType::Wf,
            2,
            seq as u32,
            duration,
        );
        lm.set_placeholder_side_a(Some(format!("LOSER:{code_i}")));
        lm.set_placeholder_side_b(Some(format!("LOSER:{code_j}")));
        drafts.push(Draft { m: lm, src_a: Some((ri, Role::Loser)), src_b: Some((rj, Role::Loser)) });
        r2l.push(drafts.len() - 1);
    }

    buckets.insert("WW", r2w.iter().map(|&i| (i, Role::Winner)).collect());
    buckets.insert("WL", r2w.iter().map(|&i| (i, Role::Loser)).collect());
    buckets.insert("LW", r2l.iter().map(|&i| (i, Role::Winner)).collect());
    buckets.insert("LL", r2l.iter().map(|&i| (i, Role::Loser)).collect());
    Ok(buckets)
}

enum BracketSeed {
    Direct(Vec<(TeamId, TeamId)>),
    FromWf(Vec<(usize, Role)>),
}

/// The classic recursive seeding order (1v8, 4v5, 2v7, 3v6 for size 8) so
/// that top seeds can only meet in later rounds.
fn standard_bracket_seed_order(size: usize) -> Vec<usize> {
    let mut order = vec![1usize, 2];
    while order.len() < size {
        let n = order.len() * 2;
        let mut next = Vec::with_capacity(n);
        for &s in &order {
            next.push(s);
            next.push(n + 1 - s);
        }
        order = next;
    }
    order
}

fn standard_bracket_team_pairs(teams: &[&Team]) -> Vec<(TeamId, TeamId)> {
    let order = standard_bracket_seed_order(teams.len());
    order
        .chunks(2)
        .map(|c| (teams[c[0] - 1].id(), teams[c[1] - 1].id()))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn build_bracket(
    drafts: &mut Vec<Draft>,
    prefix: &str,
    bracket_label: &str,
    sizes: &[u32],
    seed: BracketSeed,
    guarantee: Guarantee,
    tournament_id: TournamentId,
    event_id: EventId,
    version_id: ScheduleVersionId,
    duration: u32,
) {
    let br_tag = if bracket_label.is_empty() { String::new() } else { format!("BR{bracket_label}_") };
    let mut rounds: Vec<Vec<usize>> = Vec::with_capacity(sizes.len());

    // Round 1.
    let mut r1 = Vec::new();
    match seed {
        BracketSeed::Direct(pairs) => {
            for (seq, (a, b)) in pairs.into_iter().enumerate() {
                let code = format!("{prefix}_{br_tag}MAIN_R1_M{:02}", seq + 1);
                let mut m = Match::new(
                    MatchId(0),
                    tournament_id,
                    event_id,
                    version_id,
                    code,
                    MatchType::Main,
                    1,
                    seq as u32,
                    duration,
                );
                m.set_team_a(Some(a));
                m.set_team_b(Some(b));
                drafts.push(Draft { m, src_a: None, src_b: None });
                r1.push(drafts.len() - 1);
            }
        }
        BracketSeed::FromWf(feeders) => {
            for (seq, chunk) in feeders.chunks(2).enumerate() {
                let (src_a, src_b) = (chunk[0], chunk[1]);
                let code = format!("{prefix}_{br_tag}MAIN_R1_M{:02}", seq + 1);
                let mut m = Match::new(
                    MatchId(0),
                    tournament_id,
                    event_id,
                    version_id,
                    code,
                    MatchType::Main,
                    1,
                    seq as u32,
                    duration,
                );
                let code_a = drafts[src_a.0].m.match_code().to_string();
                let code_b = drafts[src_b.0].m.match_code().to_string();
                m.set_placeholder_side_a(Some(format!("{}:{code_a}", src_a.1)));
                m.set_placeholder_side_b(Some(format!("{}:{code_b}", src_b.1)));
                drafts.push(Draft { m, src_a: Some(src_a), src_b: Some(src_b) });
                r1.push(drafts.len() - 1);
            }
        }
    }
    rounds.push(r1);

    for (r_offset, &count) in sizes.iter().enumerate().skip(1) {
        let round_index = (r_offset + 1) as u32;
        let prev = rounds[r_offset - 1].clone();
        let mut cur = Vec::with_capacity(count as usize);
        for seq in 0..count {
            let (fi, fj) = feeder_indices(seq);
            let (src_a, src_b) = (prev[fi as usize], prev[fj as usize]);
            let code = format!("{prefix}_{br_tag}MAIN_R{round_index}_M{:02}", seq + 1);
            let mut m = Match::new(
                MatchId(0),
                tournament_id,
                event_id,
                version_id,
                code,
                MatchType::Main,
                round_index,
                seq,
                duration,
            );
            let code_a = drafts[src_a].m.match_code().to_string();
            let code_b = drafts[src_b].m.match_code().to_string();
            m.set_placeholder_side_a(Some(format!("WINNER:{code_a}")));
            m.set_placeholder_side_b(Some(format!("WINNER:{code_b}")));
            drafts.push(Draft { m, src_a: Some((src_a, Role::Winner)), src_b: Some((src_b, Role::Winner)) });
            cur.push(drafts.len() - 1);
        }
        rounds.push(cur);
    }

    build_consolation(drafts, prefix, bracket_label, &rounds, guarantee, tournament_id, event_id, version_id, duration);
}

/// Consolation semis always run off the first round's losers. A
/// consolation final plus 3rd/4th and 7th/8th placement matches are added
/// only for `Guarantee::Five`; `Guarantee::Four` stops after the semis
/// (decision recorded in the grounding ledger — the original's exact
/// placement wiring was not in the retrieved source).
#[allow(clippy::too_many_arguments)]
fn build_consolation(
    drafts: &mut Vec<Draft>,
    prefix: &str,
    bracket_label: &str,
    rounds: &[Vec<usize>],
    guarantee: Guarantee,
    tournament_id: TournamentId,
    event_id: EventId,
    version_id: ScheduleVersionId,
    duration: u32,
) {
    let br_tag = if bracket_label.is_empty() { String::new() } else { format!("BR{bracket_label}_") };
    let first_round = &rounds[0];
    if first_round.len() < 2 || first_round.len() % 2 != 0 {
        return;
    }

    let mut cons_semis = Vec::new();
    for (seq, chunk) in first_round.chunks(2).enumerate() {
        let (a, b) = (chunk[0], chunk[1]);
        let code = format!("{prefix}_{br_tag}CONS_R1_M{:02}", seq + 1);
        let mut m = Match::new(
            MatchId(0),
            tournament_id,
            event_id,
            version_id,
            code,
            MatchType::Consolation,
            1,
            seq as u32,
            duration,
        );
        m.set_consolation_tier(Some(1));
        let code_a = drafts[a].m.match_code().to_string();
        let code_b = drafts[b].m.match_code().to_string();
        m.set_placeholder_side_a(Some(format!("LOSER:{code_a}")));
        m.set_placeholder_side_b(Some(format!("LOSER:{code_b}")));
        drafts.push(Draft { m, src_a: Some((a, Role::Loser)), src_b: Some((b, Role::Loser)) });
        cons_semis.push(drafts.len() - 1);
    }

    if guarantee != Guarantee::Five {
        return;
    }

    for (seq, chunk) in cons_semis.chunks(2).enumerate() {
        if chunk.len() < 2 {
            continue;
        }
        let (a, b) = (chunk[0], chunk[1]);
        let code = format!("{prefix}_{br_tag}CONS_R2_M{:02}", seq + 1);
        let mut m = Match::new(
            MatchId(0),
            tournament_id,
            event_id,
            version_id,
            code,
            MatchType::Consolation,
            2,
            seq as u32,
            duration,
        );
        m.set_consolation_tier(Some(1));
        let code_a = drafts[a].m.match_code().to_string();
        let code_b = drafts[b].m.match_code().to_string();
        m.set_placeholder_side_a(Some(format!("WINNER:{code_a}")));
        m.set_placeholder_side_b(Some(format!("WINNER:{code_b}")));
        drafts.push(Draft { m, src_a: Some((a, Role::Winner)), src_b: Some((b, Role::Winner)) });

        let p_code = format!("{prefix}_{br_tag}PLACEMENT_M{:02}", seq + 1);
        let mut pm = Match::new(
            MatchId(0),
            tournament_id,
            event_id,
            version_id,
            p_code,
            MatchType::Placement,
            1,
            seq as u32,
            duration,
        );
        pm.set_placement_type(Some("7TH_8TH".to_string()));
        pm.set_placeholder_side_a(Some(format!("LOSER:{code_a}")));
        pm.set_placeholder_side_b(Some(format!("LOSER:{code_b}")));
        drafts.push(Draft { m: pm, src_a: Some((a, Role::Loser)), src_b: Some((b, Role::Loser)) });
    }

    if rounds.len() >= 2 {
        let semifinal_round = &rounds[rounds.len() - 2];
        for (seq, chunk) in semifinal_round.chunks(2).enumerate() {
            if chunk.len() < 2 {
                continue;
            }
            let (a, b) = (chunk[0], chunk[1]);
            let code = format!("{prefix}_{br_tag}PLACEMENT_3RD_M{:02}", seq + 1);
            let mut m = Match::new(
                MatchId(0),
                tournament_id,
                event_id,
                version_id,
                code,
                MatchType::Placement,
                1,
                seq as u32,
                duration,
            );
            m.set_placement_type(Some("3RD_4TH".to_string()));
            let code_a = drafts[a].m.match_code().to_string();
            let code_b = drafts[b].m.match_code().to_string();
            m.set_placeholder_side_a(Some(format!("LOSER:{code_a}")));
            m.set_placeholder_side_b(Some(format!("LOSER:{code_b}")));
            drafts.push(Draft { m, src_a: Some((a, Role::Loser)), src_b: Some((b, Role::Loser)) });
        }
    }
}

#[cfg(test)]
mod wf_to_brackets_8_tests {
    use super::*;

    fn teams(event_id: EventId, n: u32) -> Vec<Team> {
        (1..=n)
            .map(|seed| Team::new(TeamId(seed as i64), event_id, seed, format!("Team {seed}")))
            .collect()
    }

    fn run(n: u32, waterfall_rounds: u32) -> DrawPlanOutput {
        let tournament_id = TournamentId(1);
        let event_id = EventId(1);
        let version_id = ScheduleVersionId(1);
        let teams = teams(event_id, n);
        let mut next_id = 0i64;
        generate_matches(
            tournament_id,
            event_id,
            version_id,
            TemplateKey::WfToBrackets8,
            waterfall_rounds,
            Guarantee::Four,
            &teams,
            20,
            0,
            &mut || {
                next_id += 1;
                MatchId(next_id)
            },
        )
        .expect("generation should succeed")
    }

    fn bracket_labels_in_output(output: &DrawPlanOutput) -> BTreeSet<String> {
        output
            .matches
            .iter()
            .filter(|m| m.match_type() == MatchType::Main && m.match_code().contains("_BR"))
            .map(|m| {
                let after_br = m.match_code().split("_BR").nth(1).unwrap();
                after_br.split("_MAIN").next().unwrap().to_string()
            })
            .collect()
    }

    fn main_round1_count(output: &DrawPlanOutput, bracket_label: &str) -> usize {
        output
            .matches
            .iter()
            .filter(|m| {
                m.match_type() == MatchType::Main
                    && m.match_code().contains(&format!("_BR{bracket_label}_MAIN_R1_"))
            })
            .count()
    }

    #[test]
    fn eight_teams_collapses_to_a_single_eight_team_bracket() {
        let out = run(8, 2);
        let labels = bracket_labels_in_output(&out);
        assert_eq!(labels.len(), 1, "n=8 must produce exactly 1 bracket, got {labels:?}");
        let label = labels.iter().next().unwrap();
        assert_eq!(main_round1_count(&out, label), 4, "an 8-team bracket has 4 round-1 matches");
        assert_eq!(out.inventory.main, 7, "single-elimination 8-team bracket has 7 main matches");
    }

    #[test]
    fn sixteen_teams_splits_into_two_eight_team_brackets_not_four_four_team_ones() {
        let out = run(16, 2);
        let labels = bracket_labels_in_output(&out);
        assert_eq!(labels.len(), 2, "n=16 must produce exactly 2 brackets, got {labels:?}");
        for label in &labels {
            assert_eq!(
                main_round1_count(&out, label),
                4,
                "each of the 2 brackets must be an 8-team (4 round-1 match) bracket"
            );
        }
        assert_eq!(out.inventory.main, 14, "two 7-match brackets");
    }

    #[test]
    fn twelve_teams_is_rejected_brackets_need_a_power_of_two_track_size() {
        // bracket_count = ceil(12/8) = 2, so each bracket would need to seat
        // 6 teams; single-elimination round construction only supports
        // power-of-two entrant counts, so this is a validation error rather
        // than a silently-wrong bracket shape.
        let tournament_id = TournamentId(1);
        let event_id = EventId(1);
        let version_id = ScheduleVersionId(1);
        let teams = teams(event_id, 12);
        let mut next_id = 0i64;
        let err = generate_matches(
            tournament_id,
            event_id,
            version_id,
            TemplateKey::WfToBrackets8,
            2,
            Guarantee::Four,
            &teams,
            20,
            0,
            &mut || {
                next_id += 1;
                MatchId(next_id)
            },
        )
        .expect_err("a 6-team bracket track size is not a power of two");
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn thirty_two_teams_splits_into_four_eight_team_brackets() {
        let out = run(32, 2);
        let labels = bracket_labels_in_output(&out);
        assert_eq!(labels.len(), 4, "n=32 must produce exactly 4 brackets, got {labels:?}");
        for label in &labels {
            assert_eq!(main_round1_count(&out, label), 4, "each of the 4 brackets is an 8-team bracket");
        }
        assert_eq!(out.inventory.main, 28, "four 7-match brackets");
    }

    #[test]
    fn every_team_enters_the_waterfall_exactly_once() {
        for n in [8, 12, 16, 32] {
            let out = run(n, 2);
            let mut seated: Vec<TeamId> = Vec::new();
            for m in &out.matches {
                if m.match_type() == MatchType::Wf && m.round_index() == 1 {
                    seated.extend(m.team_ids());
                }
            }
            seated.sort();
            let expected: Vec<TeamId> = (1..=n as i64).map(TeamId).collect();
            assert_eq!(seated, expected, "n={n}: every team must enter waterfall round 1 exactly once");
        }
    }

    #[test]
    fn direct_round1_matches_seat_every_team_exactly_once() {
        let out = run(16, 0);
        let mut seated: Vec<TeamId> = Vec::new();
        for m in &out.matches {
            if m.match_type() == MatchType::Main && m.round_index() == 1 {
                seated.extend(m.team_ids());
            }
        }
        seated.sort();
        let expected: Vec<TeamId> = (1..=16).map(TeamId).collect();
        assert_eq!(seated, expected, "every team must appear exactly once across the two direct brackets");
    }

    #[test]
    fn direct_seeding_with_no_waterfall_rounds_still_respects_bracket_count() {
        let out = run(16, 0);
        let labels = bracket_labels_in_output(&out);
        assert_eq!(labels.len(), 2, "n=16, bracket_count=2, must produce two direct brackets");
        assert_eq!(out.inventory.main, 14, "n=16, bracket_count=2, two direct 8-team brackets");
    }

    #[test]
    fn single_direct_bracket_uses_no_bracket_label_tag() {
        let out = run(8, 0);
        let labels = bracket_labels_in_output(&out);
        assert!(labels.is_empty(), "a single bracket needs no disambiguating label");
        assert_eq!(out.inventory.main, 7);
    }
}
