//! Scorer and ranker.
//!
//! Scores feasible swaps by projected-points gain, drops non-improving
//! ones, orders the rest and keeps a bounded, deduplicated short list.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use super::feasibility::FeasiblePair;
use crate::types::SwapCandidate;

/// Default number of suggestions returned.
pub const DEFAULT_TOP_N: usize = 3;

/// Score, filter, sort, dedup and truncate.
///
/// Ordering: `score_delta` descending, then `buy_cost` ascending, then
/// `sell.id` ascending, then `buy.id` ascending.
pub fn rank_swaps(pairs: &[FeasiblePair<'_>], top_n: usize) -> Vec<SwapCandidate> {
    let mut scored: Vec<SwapCandidate> = pairs
        .iter()
        .map(|p| SwapCandidate::new(p.sell, p.buy))
        .filter(|s| s.score_delta > 0.0)
        .collect();

    let positive = scored.len();
    scored.sort_by(compare_swaps);

    let mut seen = HashSet::with_capacity(scored.len());
    let ranked: Vec<SwapCandidate> = scored
        .into_iter()
        .filter(|s| seen.insert(s.key()))
        .take(top_n)
        .collect();

    debug!(
        feasible = pairs.len(),
        positive,
        returned = ranked.len(),
        top_n,
        "Swaps ranked"
    );

    ranked
}

/// Total order over swaps used for ranking.
pub fn compare_swaps(a: &SwapCandidate, b: &SwapCandidate) -> Ordering {
    b.score_delta
        .total_cmp(&a.score_delta)
        .then_with(|| a.buy_cost.cmp(&b.buy_cost))
        .then_with(|| a.sell.id.cmp(&b.sell.id))
        .then_with(|| a.buy.id.cmp(&b.buy.id))
}
