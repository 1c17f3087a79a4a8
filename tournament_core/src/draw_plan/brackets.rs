//! Generic single-elimination bracket topology, reused for MAIN and for the
//! two consolation shapes in WF_TO_BRACKETS_8.

/// Number of matches in each round of a single-elimination bracket seeded
/// with `team_count` entrants. `team_count` must be a power of two; callers
/// surface VALIDATION for anything else.
pub fn round_sizes(team_count: u32) -> Option<Vec<u32>> {
    if team_count < 2 || !team_count.is_power_of_two() {
        return None;
    }
    let mut sizes = Vec::new();
    let mut remaining = team_count;
    while remaining > 1 {
        sizes.push(remaining / 2);
        remaining /= 2;
    }
    Some(sizes)
}

/// For round `r` (1-based) match at `sequence_in_round` (0-based), the two
/// round-(r-1) winner slots that feed it, as 0-based sequence indices.
pub fn feeder_indices(sequence_in_round: u32) -> (u32, u32) {
    (sequence_in_round * 2, sequence_in_round * 2 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_team_bracket_is_qf_sf_final() {
        assert_eq!(round_sizes(8), Some(vec![4, 2, 1]));
    }

    #[test]
    fn non_power_of_two_is_unsupported() {
        assert_eq!(round_sizes(6), None);
        assert_eq!(round_sizes(12), None);
    }

    #[test]
    fn feeder_indices_pair_adjacent_winners() {
        assert_eq!(feeder_indices(0), (0, 1));
        assert_eq!(feeder_indices(1), (2, 3));
    }
}
