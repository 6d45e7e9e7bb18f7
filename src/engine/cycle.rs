//! Recommendation cycle.
//!
//! Fetches the roster and universe concurrently, resolves the squad, runs
//! the optimiser and hands the result to the sink. Fetch failures abort
//! the cycle; delivery failures are logged and recorded in the report.

use chrono::Utc;
use tracing::{error, info};

use crate::notify::ResultSink;
use crate::optimiser::TransferOptimiser;
use crate::sources::{RosterSource, UniverseSource};
use crate::types::{CycleReport, ScoutError, Squad};

/// Run one complete recommendation cycle.
pub async fn run_cycle(
    roster_source: &dyn RosterSource,
    universe_source: &dyn UniverseSource,
    sink: &dyn ResultSink,
    optimiser: &TransferOptimiser,
) -> Result<CycleReport, ScoutError> {
    info!(
        roster_source = roster_source.name(),
        universe_source = universe_source.name(),
        "Starting cycle"
    );

    // 1. Fetch both snapshots
    let (roster, universe) = futures::try_join!(
        async {
            roster_source
                .fetch_roster()
                .await
                .map_err(|e| ScoutError::from_fetch(roster_source.name(), e))
        },
        async {
            universe_source
                .fetch_universe()
                .await
                .map_err(|e| ScoutError::from_fetch(universe_source.name(), e))
        },
    )?;

    // 2. Normalise
    let squad = Squad::resolve(&roster.owned_ids, &universe)?;
    info!(
        squad = squad.len(),
        universe = universe.len(),
        bank = roster.bank,
        "Snapshots loaded"
    );

    // 3. Optimise
    let outcome = optimiser.optimise(&squad, &universe, roster.bank);

    // 4. Deliver
    let delivered = match sink.deliver(&outcome.recommendation, &universe).await {
        Ok(()) => true,
        Err(e) => {
            error!(sink = sink.name(), error = %format!("{e:#}"), "Delivery failed; recommendation kept");
            false
        }
    };

    Ok(CycleReport {
        timestamp: Utc::now(),
        universe_size: universe.len(),
        squad_size: squad.len(),
        bank: roster.bank,
        feasible_swaps: outcome.feasible_swaps,
        recommendation: outcome.recommendation,
        delivered,
    })
}
