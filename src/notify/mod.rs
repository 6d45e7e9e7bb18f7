//! Result delivery.
//!
//! Defines the `ResultSink` trait and provides a Telegram bot sink plus a
//! log-only sink for dry runs. Sinks own all user-facing formatting.

pub mod format;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::types::{Recommendation, Universe};

/// Abstraction over recommendation delivery channels.
///
/// A failed delivery is reported back to the cycle, which logs it; it never
/// invalidates the computed recommendation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Deliver a recommendation. `universe` supplies club names for display.
    async fn deliver(&self, recommendation: &Recommendation, universe: &Universe) -> Result<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}

/// Writes the rendered message to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl ResultSink for LogSink {
    async fn deliver(&self, recommendation: &Recommendation, universe: &Universe) -> Result<()> {
        let message = format::format_message(recommendation, Some(universe));
        info!(
            suggestions = recommendation.swaps().len(),
            "[DRY RUN] Would send:\n{message}"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
