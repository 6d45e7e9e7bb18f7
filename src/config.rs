//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (login, bot token) are referenced by env-var name in the config
//! and resolved once at startup into `secrecy` wrappers.

use anyhow::{Context, Result};
use chrono::FixedOffset;
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::optimiser::ranker::DEFAULT_TOP_N;
use crate::sources::retry::RetryPolicy;
use crate::types::ScoutError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub fpl: FplConfig,
    pub telegram: TelegramConfig,
    pub optimiser: OptimiserConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FplConfig {
    pub email_env: String,
    pub password_env: String,
    pub team_id_env: String,
    /// Auth-check polling after the login form is posted.
    pub login_retry: RetryPolicy,
}

impl Default for FplConfig {
    fn default() -> Self {
        Self {
            email_env: "FPL_EMAIL".to_string(),
            password_env: "FPL_PASSWORD".to_string(),
            team_id_env: "FPL_TEAM_ID".to_string(),
            login_retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub bot_token_env: String,
    pub chat_id_env: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token_env: "TELEGRAM_TOKEN".to_string(),
            chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OptimiserConfig {
    /// Number of suggestions to deliver.
    pub top_n: usize,
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self { top_n: DEFAULT_TOP_N }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Offset from UTC for human-facing timestamps, in minutes (330 = IST).
    pub utc_offset_minutes: i32,
}

impl LoggingConfig {
    /// The display offset, or a `Config` error when out of range.
    pub fn display_offset(&self) -> Result<FixedOffset, ScoutError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ScoutError::Config(format!(
                    "logging.utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }
}

/// Resolved FPL login details.
#[derive(Debug, Clone)]
pub struct FplCredentials {
    pub email: SecretString,
    pub password: SecretString,
    pub team_id: u64,
}

/// Resolved Telegram delivery details.
#[derive(Debug, Clone)]
pub struct TelegramCredentials {
    pub bot_token: SecretString,
    pub chat_id: i64,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve FPL credentials from the process environment.
    pub fn fpl_credentials(&self) -> Result<FplCredentials, ScoutError> {
        self.fpl_credentials_with(|name| std::env::var(name).ok())
    }

    /// Resolve FPL credentials through `lookup`. All three values are required.
    pub fn fpl_credentials_with<F>(&self, lookup: F) -> Result<FplCredentials, ScoutError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ScoutError::Config(format!("environment variable not set: {name}")))
        };

        let email = required(&self.fpl.email_env)?;
        let password = required(&self.fpl.password_env)?;
        let team_raw = required(&self.fpl.team_id_env)?;
        let team_id = team_raw.trim().parse::<u64>().map_err(|_| {
            ScoutError::Config(format!(
                "{} must be a numeric team id, got {team_raw:?}",
                self.fpl.team_id_env
            ))
        })?;

        Ok(FplCredentials {
            email: SecretString::new(email),
            password: SecretString::new(password),
            team_id,
        })
    }

    /// Resolve Telegram credentials from the process environment.
    pub fn telegram_credentials(&self) -> Result<Option<TelegramCredentials>, ScoutError> {
        self.telegram_credentials_with(|name| std::env::var(name).ok())
    }

    /// `Ok(None)` when Telegram is disabled or not configured; a chat id that
    /// is present but not numeric is an error.
    pub fn telegram_credentials_with<F>(
        &self,
        lookup: F,
    ) -> Result<Option<TelegramCredentials>, ScoutError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.telegram.enabled {
            return Ok(None);
        }
        let token = lookup(&self.telegram.bot_token_env).filter(|v| !v.trim().is_empty());
        let chat = lookup(&self.telegram.chat_id_env).filter(|v| !v.trim().is_empty());

        let (Some(token), Some(chat)) = (token, chat) else {
            return Ok(None);
        };
        let chat_id = chat.trim().parse::<i64>().map_err(|_| {
            ScoutError::Config(format!(
                "{} must be a numeric chat id, got {chat:?}",
                self.telegram.chat_id_env
            ))
        })?;

        Ok(Some(TelegramCredentials {
            bot_token: SecretString::new(token),
            chat_id,
        }))
    }
}
