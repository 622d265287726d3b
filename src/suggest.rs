//! Deterministic seeded sampling for suggestions and the start screen.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::state::Fact;

/// How many category suggestions are displayed at most.
pub const SUGGESTION_SAMPLE_SIZE: usize = 8;
/// How many cached facts the start screen shows at most.
pub const DEFAULT_FACTS_SAMPLE_SIZE: usize = 10;

/// Injectable shuffle-seed capability.
///
/// Production wires [`epoch_seed`]; tests supply a fixed closure so
/// sampling is reproducible without mocking the clock.
pub type SeedSource = Box<dyn Fn() -> u64 + Send>;

/// Wall-clock epoch seconds, the production shuffle seed.
///
/// Captured once per call site; suggestion sampling and default-fact
/// sampling each take their own seed and are not correlated.
#[must_use]
pub fn epoch_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// What: Sample a bounded, display-ready subset of categories.
///
/// Inputs:
/// - `categories`: Full category list as fetched or persisted
/// - `seed`: Shuffle seed captured at call time
///
/// Output:
/// - The last `min(8, len)` elements of the seeded shuffle, sorted
///   alphabetically for stable display order.
///
/// Details:
/// - Applied to the full list every time a fresh one is obtained; never
///   re-applied to an already-sampled list.
#[must_use]
pub fn sample_suggestions(categories: &[String], seed: u64) -> Vec<String> {
    let mut pool = categories.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    pool.shuffle(&mut rng);
    let keep_from = pool.len().saturating_sub(SUGGESTION_SAMPLE_SIZE);
    let mut picked = pool.split_off(keep_from);
    picked.sort();
    picked
}

/// What: Pick the default facts shown before any search has run.
///
/// Inputs:
/// - `facts`: All cached facts, in any order
/// - `seed`: Shuffle seed captured at call time
///
/// Output:
/// - Up to 10 facts: sorted by id for a stable shuffle input, then
///   seeded-shuffled, then truncated.
#[must_use]
pub fn sample_default_facts<'a, I>(facts: I, seed: u64) -> Vec<Fact>
where
    I: Iterator<Item = &'a Fact>,
{
    let mut all: Vec<Fact> = facts.cloned().collect();
    all.sort_by(|a, b| a.id.cmp(&b.id));
    let mut rng = StdRng::seed_from_u64(seed);
    all.shuffle(&mut rng);
    all.truncate(DEFAULT_FACTS_SAMPLE_SIZE);
    all
}
