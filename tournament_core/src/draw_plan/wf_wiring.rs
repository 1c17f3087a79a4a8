//! Waterfall Round 2 wiring optimizer, ported from the block-based
//! avoid-group minimizer: blocks of 4 consecutive R1 matches, all 3
//! pairings evaluated, first-listed pattern wins ties.

use crate::ids::MatchId;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct WiredR1Match {
    pub match_id: MatchId,
    pub match_code: String,
    pub avoid_groups: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct WiringWarning {
    pub block_index: usize,
    pub r1_match_codes: Vec<String>,
    pub overlapping_groups: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WiringPlan {
    pub pairs: Vec<(MatchId, MatchId)>,
    pub warnings: Vec<WiringWarning>,
}

// The 3 ways to partition indices [0,1,2,3] into 2 unordered pairs.
const PATTERNS_4: [[(usize, usize); 2]; 3] = [
    [(0, 3), (1, 2)],
    [(0, 2), (1, 3)],
    [(0, 1), (2, 3)],
];

fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
    a.intersection(b).count()
}

fn best_pairing_for_block(block: &[WiredR1Match]) -> Vec<(usize, usize)> {
    match block.len() {
        2 => vec![(0, 1)],
        4 => {
            let mut best_score = usize::MAX;
            let mut best = Vec::new();
            for pattern in PATTERNS_4.iter() {
                let total: usize = pattern
                    .iter()
                    .map(|&(i, j)| overlap(&block[i].avoid_groups, &block[j].avoid_groups))
                    .sum();
                if total < best_score {
                    best_score = total;
                    best = pattern.to_vec();
                }
            }
            best
        }
        n => panic!("wf r2 wiring block must have 2 or 4 matches, got {n}"),
    }
}

/// `block_size` is always 4 in production; exposed for testing smaller
/// inputs without needing 4*k matches.
pub fn build_wf_r2_wiring(r1_matches_ordered: &[WiredR1Match], block_size: usize) -> WiringPlan {
    let mut plan = WiringPlan::default();

    for (block_idx, block) in r1_matches_ordered.chunks(block_size).enumerate() {
        let local_pairs = best_pairing_for_block(block);

        let mut block_overlap: BTreeSet<String> = BTreeSet::new();
        for &(i, j) in &local_pairs {
            block_overlap.extend(block[i].avoid_groups.intersection(&block[j].avoid_groups).cloned());
            plan.pairs.push((block[i].match_id, block[j].match_id));
        }

        if !block_overlap.is_empty() {
            plan.warnings.push(WiringWarning {
                block_index: block_idx,
                r1_match_codes: block.iter().map(|m| m.match_code.clone()).collect(),
                overlapping_groups: block_overlap.into_iter().collect(),
            });
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: i64, code: &str, groups: &[&str]) -> WiredR1Match {
        WiredR1Match {
            match_id: MatchId(id),
            match_code: code.into(),
            avoid_groups: groups.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn picks_zero_overlap_pattern_when_available() {
        let block = vec![
            m(1, "M01", &["a"]),
            m(2, "M02", &[]),
            m(3, "M03", &["a"]),
            m(4, "M04", &[]),
        ];
        // pattern (0,3)(1,2) has zero overlap: {a}&{} = 0, {}&{a} = 0
        let plan = build_wf_r2_wiring(&block, 4);
        assert_eq!(plan.pairs, vec![(MatchId(1), MatchId(4)), (MatchId(2), MatchId(3))]);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn unavoidable_overlap_is_reported() {
        let block = vec![
            m(1, "M01", &["a"]),
            m(2, "M02", &["a"]),
            m(3, "M03", &["a"]),
            m(4, "M04", &["a"]),
        ];
        let plan = build_wf_r2_wiring(&block, 4);
        assert_eq!(plan.pairs.len(), 2);
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.warnings[0].overlapping_groups, vec!["a".to_string()]);
    }

    #[test]
    fn trailing_block_of_two_pairs_directly() {
        let block = vec![m(5, "M05", &[]), m(6, "M06", &[])];
        let plan = build_wf_r2_wiring(&block, 4);
        assert_eq!(plan.pairs, vec![(MatchId(5), MatchId(6))]);
    }

    #[test]
    fn first_pattern_wins_tie() {
        // No avoid groups at all: every pattern scores 0, pattern (0,3)(1,2) must win.
        let block = vec![m(1, "A", &[]), m(2, "B", &[]), m(3, "C", &[]), m(4, "D", &[])];
        let plan = build_wf_r2_wiring(&block, 4);
        assert_eq!(plan.pairs, vec![(MatchId(1), MatchId(4)), (MatchId(2), MatchId(3))]);
    }
}
