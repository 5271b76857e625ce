use super::types::{Division, Fixture};

/// All unordered pairs (i < j) for `n` entrants, in row-major order
pub fn round_robin_pairs(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(n.saturating_mul(n.saturating_sub(1)) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Round-robin fixtures for one division. Fewer than two entrants gives none.
pub fn generate_fixtures(division: &Division) -> Vec<Fixture> {
    round_robin_pairs(division.entrant_count())
        .into_iter()
        .map(|(home, away)| Fixture {
            division_id: division.id.clone(),
            phase: division.kind(),
            home,
            away,
        })
        .collect()
}

/// Number of matches a division must play
pub fn required_matches(division: &Division) -> usize {
    let n = division.entrant_count();
    n.saturating_mul(n.saturating_sub(1)) / 2
}
