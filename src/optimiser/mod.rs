//! Transfer suggestion engine — feasibility filtering, scoring and ranking.
//!
//! Pure and synchronous: takes immutable squad/universe snapshots plus the
//! bank balance and returns an ordered short list. No I/O, no shared state.

pub mod feasibility;
pub mod ranker;

use tracing::info;

use crate::types::{Budget, Recommendation, Squad, SwapCandidate, Universe};
use feasibility::feasible_swaps;
use ranker::{rank_swaps, DEFAULT_TOP_N};

/// Run the full engine: enumerate feasible swaps, then rank them.
pub fn suggest_transfers(
    squad: &Squad,
    universe: &Universe,
    budget: Budget,
    top_n: usize,
) -> Recommendation {
    let pairs = feasible_swaps(squad, universe, budget);
    rank_swaps(&pairs, top_n).into()
}

/// Result of one optimiser pass, with the counts used for reporting.
#[derive(Debug, Clone)]
pub struct OptimiserOutcome {
    pub feasible_swaps: usize,
    pub recommendation: Recommendation,
}

/// Holds the short-list size and logs each stage.
#[derive(Debug, Clone)]
pub struct TransferOptimiser {
    top_n: usize,
}

impl Default for TransferOptimiser {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

impl TransferOptimiser {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn optimise(&self, squad: &Squad, universe: &Universe, budget: Budget) -> OptimiserOutcome {
        let pairs = feasible_swaps(squad, universe, budget);
        info!(
            squad = squad.len(),
            universe = universe.len(),
            bank = budget,
            feasible = pairs.len(),
            "Feasibility filter complete"
        );

        let ranked: Vec<SwapCandidate> = rank_swaps(&pairs, self.top_n);
        for (i, swap) in ranked.iter().enumerate() {
            info!(
                rank = i + 1,
                sell = %swap.sell.display_name,
                buy = %swap.buy.display_name,
                delta = format!("{:+.2}", swap.score_delta),
                sell_cost = swap.sell_cost,
                buy_cost = swap.buy_cost,
                "Suggested transfer"
            );
        }
        if ranked.is_empty() {
            info!("No positive-gain upgrades found");
        }

        OptimiserOutcome {
            feasible_swaps: pairs.len(),
            recommendation: ranked.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
