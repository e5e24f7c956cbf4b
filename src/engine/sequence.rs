use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::curriculum::LevelConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("level has neither new nor review keys to draw from")]
    EmptyKeyPools,
}

/// Build a practice string of `length` keys drawn from the level's pools.
///
/// At least one new key is placed first (when the new pool is non-empty),
/// the rest are drawn pool-by-pool according to the weight ratio, and the
/// whole sequence is shuffled at the end.
pub fn generate_sequence<R: Rng + ?Sized>(
    config: &LevelConfig,
    length: usize,
    rng: &mut R,
) -> Result<String, GenerateError> {
    let new_pool = config.new_keys;
    let review_pool = config.review_keys;
    if new_pool.is_empty() && review_pool.is_empty() {
        return Err(GenerateError::EmptyKeyPools);
    }

    let new_ratio = new_key_ratio(config);
    let mut keys: Vec<char> = Vec::with_capacity(length);

    if length > 0
        && let Some(&first) = new_pool.choose(rng)
    {
        keys.push(first);
    }

    while keys.len() < length {
        let pool = if new_pool.is_empty() {
            review_pool
        } else if review_pool.is_empty() || rng.gen_bool(new_ratio) {
            new_pool
        } else {
            review_pool
        };
        // Pools are non-empty here by the checks above.
        if let Some(&ch) = pool.choose(rng) {
            keys.push(ch);
        }
    }

    keys.shuffle(rng);
    Ok(keys.into_iter().collect())
}

/// Probability of drawing from the new pool. Non-positive or non-finite
/// weights fall back to an even split.
fn new_key_ratio(config: &LevelConfig) -> f64 {
    let new = config.weights.new.max(0.0);
    let review = config.weights.review.max(0.0);
    let total = new + review;
    if !total.is_finite() || total <= 0.0 {
        return 0.5;
    }
    (new / total).clamp(0.0, 1.0)
}
