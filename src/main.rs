//! FPL Scout — weekly single-transfer upgrade recommendations
//!
//! Entry point for the scheduled batch job. Loads `.env` and configuration,
//! initialises structured logging, runs exactly one recommendation cycle
//! and exits. Fetch and authentication failures exit non-zero; delivery
//! failures are logged and the run still counts as computed.

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use fpl_scout::config::AppConfig;
use fpl_scout::engine::run_cycle;
use fpl_scout::notify::telegram::TelegramNotifier;
use fpl_scout::notify::{LogSink, ResultSink};
use fpl_scout::optimiser::TransferOptimiser;
use fpl_scout::sources::fpl::FplClient;
use fpl_scout::types::CycleReport;

/// Config path, overridable via `FPL_SCOUT_CONFIG`.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("FPL_SCOUT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    let started_at = Utc::now().with_timezone(&cfg.logging.display_offset()?);
    info!(started_at = %started_at.format("%a %d %b %Y %H:%M:%S %:z"), "FPL Scout starting");

    // -- Initialise components -------------------------------------------

    let fpl_credentials = cfg.fpl_credentials()?;
    info!(team_id = fpl_credentials.team_id, "FPL credentials resolved");
    let fpl = FplClient::new(fpl_credentials, cfg.fpl.login_retry.clone())?;

    let sink: Box<dyn ResultSink> = match cfg.telegram_credentials()? {
        Some(creds) => {
            info!(chat_id = creds.chat_id, "Delivering via Telegram");
            Box::new(TelegramNotifier::new(creds)?)
        }
        None => {
            warn!("Telegram not configured — running in dry-run/log-only mode");
            Box::new(LogSink)
        }
    };

    let optimiser = TransferOptimiser::new(cfg.optimiser.top_n);

    // -- Run one cycle -----------------------------------------------------

    match run_cycle(&fpl, &fpl, sink.as_ref(), &optimiser).await {
        Ok(report) => {
            log_cycle_report(&report);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Cycle failed, no recommendation emitted");
            Err(e.into())
        }
    }
}

/// Log a human-readable cycle summary.
fn log_cycle_report(report: &CycleReport) {
    info!(
        feasible = report.feasible_swaps,
        suggested = report.recommendation.swaps().len(),
        delivered = report.delivered,
        "{report}"
    );
    if !report.delivered {
        warn!("Recommendation computed but notification failed");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fpl_scout=info"));

    let json_logging = std::env::var("FPL_SCOUT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
