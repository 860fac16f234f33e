//! Reward layout: which cells drop loot and how much each drops.

use crate::rng::FieldRng;

/// Re-rolls before a single candidate is picked outright.
const MAX_ROLLS: usize = 32;

/// Roll each candidate independently with probability `chance`.
///
/// The whole draw is repeated until at least one candidate qualifies. After
/// `MAX_ROLLS` empty draws a single uniformly chosen candidate qualifies.
/// No candidates means no qualifiers.
pub fn roll_qualifying(candidates: &[usize], chance: f64, rng: &mut FieldRng) -> Vec<usize> {
    if candidates.is_empty() {
        return Vec::new();
    }

    for _ in 0..MAX_ROLLS {
        let qualifying: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|_| rng.gen_bool(chance))
            .collect();
        if !qualifying.is_empty() {
            return qualifying;
        }
    }

    rng.choose(candidates).copied().into_iter().collect()
}

/// Split `reward` over `count` cells.
///
/// Every cell gets at least 1 and the amounts sum to exactly
/// `max(reward, count)`. Amounts alternate above and below the mean by up to
/// half of it; the last cell takes the remainder.
pub fn distribute(reward: u32, count: usize, rng: &mut FieldRng) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }

    let total = (reward as u64).max(count as u64);
    let mean = total / count as u64;
    let max_delta = (mean / 2) as usize;

    let mut remaining = total;
    let mut amounts = Vec::with_capacity(count);

    for i in 0..count - 1 {
        let delta = rng.gen_inclusive(max_delta) as u64;
        let wanted = if i % 2 == 0 {
            mean + delta
        } else {
            mean.saturating_sub(delta)
        };
        // Leave at least 1 for each cell still to come.
        let cells_after = (count - i - 1) as u64;
        let amount = wanted.clamp(1, remaining - cells_after);
        remaining -= amount;
        amounts.push(amount as u32);
    }
    amounts.push(remaining as u32);

    amounts
}
