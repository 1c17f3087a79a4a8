//! Waterfall Round 1 pairing: avoid-group-aware half-split.

use crate::ids::TeamId;

#[derive(Debug, Clone)]
pub struct SeedEntry {
    pub team_id: TeamId,
    pub seed: u32,
    pub avoid_group: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AvoidGroupConflict {
    pub group: String,
    pub team_a: TeamId,
    pub team_b: TeamId,
}

#[derive(Debug, Clone)]
pub struct WfR1Pairing {
    /// Ordered by top-half seed ascending; `.0` is always the top-half team.
    pub pairs: Vec<(TeamId, TeamId)>,
    pub conflicts: Vec<AvoidGroupConflict>,
}

/// `seeds` must be sorted ascending by `seed` and have an even length; all
/// `n` teams must carry seeds `1..=n` (the Draw Plan Engine enforces this
/// before calling in, matching the original's "require valid seeds" guard).
pub fn wf_r1_pairing(seeds: &[SeedEntry]) -> WfR1Pairing {
    let n = seeds.len();
    assert!(n >= 2 && n % 2 == 0, "wf r1 pairing requires an even team count");
    let half = n / 2;
    let top = &seeds[..half];
    let bottom = &seeds[half..];

    let mut used = vec![false; half];
    let mut pairs = Vec::with_capacity(half);
    let mut conflicts = Vec::new();

    for top_entry in top {
        // Prefer the lowest-indexed unused bottom seed with no group clash;
        // fall back to the lowest-indexed unused seed outright.
        let mut chosen: Option<usize> = None;
        for (j, bottom_entry) in bottom.iter().enumerate() {
            if used[j] {
                continue;
            }
            let clashes = match (&top_entry.avoid_group, &bottom_entry.avoid_group) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            if !clashes {
                chosen = Some(j);
                break;
            }
        }
        let j = chosen.unwrap_or_else(|| (0..half).find(|&k| !used[k]).expect("bottom half exhausted"));
        used[j] = true;
        let bottom_entry = &bottom[j];

        if let (Some(a), Some(b)) = (&top_entry.avoid_group, &bottom_entry.avoid_group) {
            if a == b {
                conflicts.push(AvoidGroupConflict {
                    group: a.clone(),
                    team_a: top_entry.team_id,
                    team_b: bottom_entry.team_id,
                });
            }
        }

        pairs.push((top_entry.team_id, bottom_entry.team_id));
    }

    WfR1Pairing { pairs, conflicts }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(n: u32, group: Option<&str>) -> SeedEntry {
        SeedEntry {
            team_id: TeamId(n as i64),
            seed: n,
            avoid_group: group.map(String::from),
        }
    }

    #[test]
    fn no_avoid_groups_pairs_top_with_bottom_in_seed_order() {
        let seeds = vec![seed(1, None), seed(2, None), seed(3, None), seed(4, None)];
        let result = wf_r1_pairing(&seeds);
        assert_eq!(
            result.pairs,
            vec![(TeamId(1), TeamId(3)), (TeamId(2), TeamId(4))]
        );
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn avoids_sharing_group_when_possible() {
        // seed 1 and seed 3 share group "club-a"; seed 1 should instead draw seed 4.
        let seeds = vec![
            seed(1, Some("club-a")),
            seed(2, None),
            seed(3, Some("club-a")),
            seed(4, None),
        ];
        let result = wf_r1_pairing(&seeds);
        assert_eq!(
            result.pairs,
            vec![(TeamId(1), TeamId(4)), (TeamId(2), TeamId(3))]
        );
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn unavoidable_conflict_is_surfaced_not_failed() {
        let seeds = vec![
            seed(1, Some("club-a")),
            seed(2, Some("club-a")),
            seed(3, Some("club-a")),
            seed(4, Some("club-a")),
        ];
        let result = wf_r1_pairing(&seeds);
        assert_eq!(result.pairs.len(), 2);
        assert_eq!(result.conflicts.len(), 2);
    }
}
