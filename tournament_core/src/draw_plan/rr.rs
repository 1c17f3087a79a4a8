//! Round-robin pairing via the standard circle method.
//!
//! For `n=4` this produces the standard seeded preset: R1 1v4 2v3, R2 1v3
//! 2v4, R3 1v2 3v4 (the top two seeds meet in the last round).

/// Zero-based seed index pairings, one `Vec` per round. `n` must be at
/// least 2. Odd `n` gets a phantom bye seat (index `n`); whichever real
/// seed draws the bye sits out that round, so rounds for odd `n` have
/// `(n-1)/2` pairs instead of `n/2`.
pub fn circle_method_pairings(n: usize) -> Vec<Vec<(usize, usize)>> {
    assert!(n >= 2, "circle method requires n >= 2");
    let has_bye = n % 2 == 1;
    let wheel_size = if has_bye { n + 1 } else { n };
    let bye = n; // only meaningful when has_bye

    let rounds = wheel_size - 1;
    let mut fixed = vec![0usize];
    let mut rotating: Vec<usize> = (1..wheel_size).collect();

    let mut out = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let mut wheel = fixed.clone();
        wheel.extend(rotating.iter().copied());

        let mut pairs = Vec::with_capacity(wheel_size / 2);
        for i in 0..wheel_size / 2 {
            let a = wheel[i];
            let b = wheel[wheel_size - 1 - i];
            if has_bye && (a == bye || b == bye) {
                continue;
            }
            pairs.push((a.min(b), a.max(b)));
        }
        out.push(pairs);

        // rotate: last of `rotating` moves to front
        let last = rotating.pop().unwrap();
        rotating.insert(0, last);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_of_4_matches_preset_exactly() {
        let rounds = circle_method_pairings(4);
        assert_eq!(rounds, vec![vec![(0, 3), (1, 2)], vec![(0, 2), (1, 3)], vec![(0, 1), (2, 3)]]);
    }

    #[test]
    fn every_pair_plays_exactly_once() {
        let n = 6;
        let rounds = circle_method_pairings(n);
        assert_eq!(rounds.len(), n - 1);
        let mut seen = std::collections::HashSet::new();
        for round in &rounds {
            assert_eq!(round.len(), n / 2);
            for &(a, b) in round {
                assert!(seen.insert((a, b)), "pair {a}-{b} repeated");
            }
        }
        assert_eq!(seen.len(), n * (n - 1) / 2);
    }

    #[test]
    fn odd_pool_gives_one_bye_per_round() {
        let n = 5;
        let rounds = circle_method_pairings(n);
        assert_eq!(rounds.len(), 5);
        for round in &rounds {
            assert_eq!(round.len(), 2); // one of the 5 seats sits out each round
        }
        let mut seen = std::collections::HashSet::new();
        for round in &rounds {
            for &(a, b) in round {
                assert!(a < n && b < n);
                assert!(seen.insert((a, b)));
            }
        }
        assert_eq!(seen.len(), n * (n - 1) / 2);
    }
}
