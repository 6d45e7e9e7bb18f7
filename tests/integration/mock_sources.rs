//! Mock sources and sink for integration testing.
//!
//! Deterministic, in-memory implementations of the source and sink traits.
//! Every mock can be told to fail so error paths can be exercised.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use fpl_scout::notify::format::format_message;
use fpl_scout::notify::ResultSink;
use fpl_scout::sources::{RosterSource, UniverseSource};
use fpl_scout::types::*;

pub fn player(
    id: PlayerId,
    name: &str,
    position: Position,
    club: ClubId,
    cost: Tenths,
    xp: f64,
) -> Player {
    Player {
        id,
        display_name: name.to_string(),
        position,
        club,
        cost,
        availability: Availability::Available,
        projected_score: xp,
    }
}

/// A small league: a legal 15-man squad (ids 1..=15) plus a handful of
/// unowned players with known prices and projections.
pub fn default_players() -> Vec<Player> {
    use Position::*;
    vec![
        // Owned
        player(1, "Raya", Goalkeeper, 1, 55, 3.8),
        player(2, "Flekken", Goalkeeper, 4, 45, 2.9),
        player(3, "Gabriel", Defender, 1, 60, 4.1),
        player(4, "Gvardiol", Defender, 13, 60, 3.9),
        player(5, "Mykolenko", Defender, 9, 45, 2.1),
        player(6, "Robinson", Defender, 8, 45, 2.4),
        player(7, "Munoz", Defender, 7, 45, 3.0),
        player(8, "Saka", Midfielder, 1, 100, 5.6),
        player(9, "Palmer", Midfielder, 6, 105, 5.9),
        player(10, "Mbeumo", Midfielder, 14, 80, 4.8),
        player(11, "Gordon", Midfielder, 15, 75, 3.1),
        player(12, "Andreas", Midfielder, 10, 55, 2.6),
        player(13, "Haaland", Forward, 13, 150, 7.2),
        player(14, "Wissa", Forward, 4, 65, 3.3),
        player(15, "Archer", Forward, 18, 45, 1.2),
        // Unowned
        player(20, "Isak", Forward, 15, 90, 6.1),
        player(21, "Watkins", Forward, 2, 80, 5.0),
        player(22, "Odegaard", Midfielder, 1, 85, 5.8), // Arsenal already has 3
        player(23, "Salah", Midfielder, 12, 130, 7.5),
        player(24, "Porro", Defender, 17, 55, 4.0),
        player(25, "Mitoma", Midfielder, 5, 65, 2.0),
    ]
}

pub fn default_roster() -> RosterSnapshot {
    RosterSnapshot {
        owned_ids: (1..=15).collect(),
        bank: 5,
    }
}

/// In-memory FPL stand-in implementing both source traits.
pub struct MockFpl {
    roster: RosterSnapshot,
    players: Vec<Player>,
    /// If set, roster fetches fail with this authentication error.
    auth_error: Arc<Mutex<Option<String>>>,
    /// If set, universe fetches fail with this plain error.
    fetch_error: Arc<Mutex<Option<String>>>,
    fetches: Arc<Mutex<u32>>,
}

impl MockFpl {
    pub fn new() -> Self {
        Self::with_data(default_roster(), default_players())
    }

    pub fn with_data(roster: RosterSnapshot, players: Vec<Player>) -> Self {
        Self {
            roster,
            players,
            auth_error: Arc::new(Mutex::new(None)),
            fetch_error: Arc::new(Mutex::new(None)),
            fetches: Arc::new(Mutex::new(0)),
        }
    }

    pub fn fail_auth(&self, msg: &str) {
        *self.auth_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_fetch(&self, msg: &str) {
        *self.fetch_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fetch_count(&self) -> u32 {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl RosterSource for MockFpl {
    async fn fetch_roster(&self) -> Result<RosterSnapshot> {
        *self.fetches.lock().unwrap() += 1;
        if let Some(msg) = self.auth_error.lock().unwrap().clone() {
            return Err(ScoutError::Authentication(msg).into());
        }
        Ok(self.roster.clone())
    }

    fn name(&self) -> &str {
        "mock-fpl"
    }
}

#[async_trait]
impl UniverseSource for MockFpl {
    async fn fetch_universe(&self) -> Result<Universe> {
        *self.fetches.lock().unwrap() += 1;
        if let Some(msg) = self.fetch_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        Ok(Universe::new(self.players.clone())?)
    }

    fn name(&self) -> &str {
        "mock-fpl"
    }
}

/// Sink that records every delivery and can be told to fail.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<Recommendation>>>,
    messages: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::default();
        *sink.fail.lock().unwrap() = true;
        sink
    }

    pub fn deliveries(&self) -> Vec<Recommendation> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn deliver(&self, recommendation: &Recommendation, universe: &Universe) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(ScoutError::Delivery("HTTP 503 from messaging API".into()).into());
        }
        self.delivered.lock().unwrap().push(recommendation.clone());
        self.messages
            .lock()
            .unwrap()
            .push(format_message(recommendation, Some(universe)));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
