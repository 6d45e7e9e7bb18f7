//! Fantasy Premier League integration.
//!
//! Session login (CSRF cookie + form POST), roster fetch for the caller's
//! team and the public player universe.
//!
//! Base URL: https://fantasy.premierleague.com/api/
//! Login:    https://users.premierleague.com/accounts/login/
//! Auth:     Session cookies from the login form. `/api/me/` reports a
//!           non-null `player` once the session is live.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::retry::RetryPolicy;
use super::{RosterSource, UniverseSource};
use crate::config::FplCredentials;
use crate::types::{
    coerce_projected_score, Availability, ClubId, Player, Position, RosterSnapshot, ScoutError,
    Universe,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const API_BASE: &str = "https://fantasy.premierleague.com/api";
const LOGIN_URL: &str = "https://users.premierleague.com/accounts/login/";
const REDIRECT_URI: &str = "https://fantasy.premierleague.com/a/login";
const LOGIN_APP: &str = "plfpl-web";
const SOURCE_NAME: &str = "fpl";

// ---------------------------------------------------------------------------
// API response types (FPL JSON → Rust)
// ---------------------------------------------------------------------------

/// `/api/bootstrap-static/` — only the parts we use.
#[derive(Debug, Deserialize)]
struct FplBootstrap {
    elements: Vec<FplElement>,
    #[serde(default)]
    teams: Vec<FplTeam>,
}

#[derive(Debug, Deserialize)]
struct FplElement {
    id: u32,
    #[serde(default)]
    web_name: String,
    /// 1 = GKP, 2 = DEF, 3 = MID, 4 = FWD.
    element_type: u8,
    /// Club id.
    team: ClubId,
    /// Price in tenths of £m.
    now_cost: u32,
    /// "a", "d", "i", "s", "u", "n".
    #[serde(default)]
    status: String,
    /// Expected points next gameweek. Usually a decimal string, sometimes
    /// null or a placeholder.
    #[serde(default)]
    ep_next: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FplTeam {
    id: ClubId,
    #[serde(default)]
    short_name: String,
}

/// `/api/my-team/{id}/`.
#[derive(Debug, Deserialize)]
struct FplMyTeam {
    picks: Vec<FplPick>,
    transfers: FplTransfers,
}

#[derive(Debug, Deserialize)]
struct FplPick {
    element: u32,
}

#[derive(Debug, Deserialize)]
struct FplTransfers {
    /// Funds in bank, tenths of £m.
    bank: u32,
}

/// `/api/me/`.
#[derive(Debug, Deserialize)]
struct FplMe {
    #[serde(default)]
    player: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// FPL client implementing both the roster and the universe source.
pub struct FplClient {
    http: Client,
    jar: Arc<Jar>,
    credentials: FplCredentials,
    login_retry: RetryPolicy,
    api_base: String,
    login_url: String,
    /// Set once the session has been confirmed by the auth check.
    session: OnceCell<()>,
}

impl FplClient {
    pub fn new(credentials: FplCredentials, login_retry: RetryPolicy) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("FPL-Scout/0.1.0")
            .build()
            .context("Failed to build HTTP client for FPL")?;

        Ok(Self {
            http,
            jar,
            credentials,
            login_retry,
            api_base: API_BASE.to_string(),
            login_url: LOGIN_URL.to_string(),
            session: OnceCell::new(),
        })
    }

    /// Point the client at different API and login endpoints.
    pub fn with_endpoints(mut self, api_base: impl Into<String>, login_url: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.login_url = login_url.into();
        self
    }

    pub fn team_id(&self) -> u64 {
        self.credentials.team_id
    }

    // -- Session ---------------------------------------------------------

    /// Log in once per client; later calls reuse the confirmed session.
    async fn ensure_session(&self) -> Result<()> {
        self.session
            .get_or_try_init(|| async { self.login().await })
            .await?;
        Ok(())
    }

    async fn login(&self) -> Result<()> {
        let login_url = Url::parse(&self.login_url).context("Invalid FPL login URL")?;

        // Prime the CSRF cookie.
        let resp = self
            .http
            .get(login_url.clone())
            .send()
            .await
            .context("FPL login page request failed")?;
        debug!(status = %resp.status(), "FPL login page fetched");

        let csrf = self
            .jar
            .cookies(&login_url)
            .and_then(|h| h.to_str().ok().map(str::to_owned))
            .and_then(|h| extract_cookie(&h, "csrftoken"));
        if csrf.is_none() {
            debug!("No csrftoken cookie issued, posting login without it");
        }

        let mut form: Vec<(&str, &str)> = vec![
            ("login", self.credentials.email.expose_secret().as_str()),
            ("password", self.credentials.password.expose_secret().as_str()),
            ("app", LOGIN_APP),
            ("redirect_uri", REDIRECT_URI),
        ];
        if let Some(token) = csrf.as_deref() {
            form.push(("csrfmiddlewaretoken", token));
        }

        let mut req = self
            .http
            .post(login_url.clone())
            .header(reqwest::header::REFERER, self.login_url.as_str())
            .form(&form);
        if let Some(token) = csrf.as_deref() {
            req = req.header("X-CSRFToken", token);
        }

        let resp = req.send().await.context("FPL login request failed")?;
        let status = resp.status();
        if status.is_client_error() {
            return Err(ScoutError::Authentication(format!(
                "login form rejected with HTTP {status}"
            ))
            .into());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("FPL login error {status}: {body}");
        }
        if login_redirect_failed(resp.url()) {
            return Err(ScoutError::Authentication(
                "login redirect reported state=fail (check email/password)".to_string(),
            )
            .into());
        }

        let confirmed = self
            .login_retry
            .poll("fpl-auth-check", |_| self.probe_session())
            .await?;

        match confirmed {
            Some(()) => {
                info!(team_id = self.credentials.team_id, "Logged in to FPL");
                Ok(())
            }
            None => Err(ScoutError::Authentication(format!(
                "session not confirmed after {} auth-check attempts",
                self.login_retry.attempts()
            ))
            .into()),
        }
    }

    /// One auth-check probe. `Ok(None)` means "not logged in yet".
    async fn probe_session(&self) -> Result<Option<()>> {
        let resp = self
            .http
            .get(format!("{}/me/", self.api_base))
            .send()
            .await
            .context("FPL auth-check request failed")?;

        if !resp.status().is_success() {
            debug!(status = %resp.status(), "FPL auth check not ready");
            return Ok(None);
        }

        let me: FplMe = resp
            .json()
            .await
            .context("Failed to parse FPL /me response")?;
        Ok(me.player.filter(|p| !p.is_null()).map(|_| ()))
    }

    // -- Internal helpers ------------------------------------------------

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{path}", self.api_base);
        debug!(url = %url, "Fetching FPL endpoint");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("FPL request failed: {path}"))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ScoutError::Authentication(format!("FPL {path} returned HTTP {status}")).into());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("FPL API error {status} on {path}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse FPL {path} response"))
    }

    /// Convert a wire element into a `Player`.
    fn to_player(e: FplElement) -> Result<Player, ScoutError> {
        let position = Position::from_element_type(e.element_type).ok_or_else(|| {
            ScoutError::MalformedData(format!(
                "player {} has unknown element_type {}",
                e.id, e.element_type
            ))
        })?;

        Ok(Player {
            id: e.id,
            display_name: e.web_name,
            position,
            club: e.team,
            cost: e.now_cost,
            availability: Availability::from_status_code(&e.status),
            projected_score: projected_score(e.ep_next.as_ref()),
        })
    }

    fn to_universe(bootstrap: FplBootstrap) -> Result<Universe, ScoutError> {
        let clubs: BTreeMap<ClubId, String> = bootstrap
            .teams
            .into_iter()
            .map(|t| (t.id, t.short_name))
            .collect();
        let players = bootstrap
            .elements
            .into_iter()
            .map(Self::to_player)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Universe::new(players)?.with_club_names(clubs))
    }

    fn to_roster(team: FplMyTeam) -> RosterSnapshot {
        RosterSnapshot {
            owned_ids: team.picks.into_iter().map(|p| p.element).collect(),
            bank: team.transfers.bank,
        }
    }
}

/// Coerce FPL's `ep_next` (string, number, null or placeholder) to `f64`.
fn projected_score(raw: Option<&serde_json::Value>) -> f64 {
    match raw {
        Some(serde_json::Value::String(s)) => coerce_projected_score(Some(s)),
        Some(serde_json::Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Pull a single cookie value out of a `Cookie:` header string.
fn extract_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

/// The login form redirects to `...?state=fail` on bad credentials.
fn login_redirect_failed(url: &Url) -> bool {
    url.query_pairs().any(|(k, v)| k == "state" && v == "fail")
}

// ---------------------------------------------------------------------------
// Source trait implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl RosterSource for FplClient {
    async fn fetch_roster(&self) -> Result<RosterSnapshot> {
        self.ensure_session().await?;

        let team: FplMyTeam = self
            .get_json(&format!("my-team/{}/", self.credentials.team_id))
            .await?;
        let roster = Self::to_roster(team);

        if roster.owned_ids.is_empty() {
            warn!(team_id = self.credentials.team_id, "FPL returned an empty squad");
        }
        info!(
            players = roster.owned_ids.len(),
            bank = roster.bank,
            "Pulled current squad"
        );
        Ok(roster)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

#[async_trait]
impl UniverseSource for FplClient {
    async fn fetch_universe(&self) -> Result<Universe> {
        let bootstrap: FplBootstrap = self.get_json("bootstrap-static/").await?;
        let universe = Self::to_universe(bootstrap)?;
        info!(players = universe.len(), "Pulled player universe");
        Ok(universe)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
