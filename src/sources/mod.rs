//! Data sources.
//!
//! Defines the `RosterSource` and `UniverseSource` traits and provides the
//! Fantasy Premier League implementation. Sources own every network call,
//! retry and timeout; they hand the optimiser normalised snapshots only.

pub mod fpl;
pub mod retry;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{RosterSnapshot, Universe};

/// Supplies the caller's current squad and funds in bank.
///
/// Authentication failures should surface as `ScoutError::Authentication`
/// wrapped in the returned error so the cycle can report them distinctly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Fetch owned player ids (in roster order) and the bank balance.
    async fn fetch_roster(&self) -> Result<RosterSnapshot>;

    /// Source name for logging and error reports.
    fn name(&self) -> &str;
}

/// Supplies the full player universe with projected scores.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniverseSource: Send + Sync {
    /// Fetch a fresh universe snapshot.
    async fn fetch_universe(&self) -> Result<Universe>;

    fn name(&self) -> &str;
}
