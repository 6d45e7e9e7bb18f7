//! Shared types for FPL Scout.
//!
//! These types form the data model used across all modules. Sources
//! normalise their wire formats into these once, so the optimiser never
//! has to care where a player came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Maximum number of owned players allowed from any single club.
pub const MAX_PLAYERS_PER_CLUB: usize = 3;

/// Currency amount in tenths of £m (FPL's native unit: 84 == £8.4m).
pub type Tenths = u32;

/// Funds in bank, in tenths of £m.
pub type Budget = Tenths;

/// Club identifier as issued by the universe source.
pub type ClubId = u16;

/// Player identifier, unique within one universe snapshot.
pub type PlayerId = u32;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Playing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: &'static [Position] = &[
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Map FPL's `element_type` code (1..=4) to a position.
    pub fn from_element_type(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Player availability for the upcoming gameweek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Doubtful,
    Unavailable,
    Suspended,
    Other,
}

impl Availability {
    /// Map FPL's single-letter `status` code.
    pub fn from_status_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "a" => Availability::Available,
            "d" => Availability::Doubtful,
            "i" | "u" => Availability::Unavailable,
            "s" => Availability::Suspended,
            _ => Availability::Other,
        }
    }

    /// Whether a player in this state may be suggested as an incoming transfer.
    pub fn is_selectable(&self) -> bool {
        matches!(self, Availability::Available | Availability::Doubtful)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => write!(f, "available"),
            Availability::Doubtful => write!(f, "doubtful"),
            Availability::Unavailable => write!(f, "unavailable"),
            Availability::Suspended => write!(f, "suspended"),
            Availability::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player in the universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub position: Position,
    pub club: ClubId,
    /// Current price in tenths of £m.
    pub cost: Tenths,
    pub availability: Availability,
    /// Projected points for the next gameweek (xP). Always finite.
    pub projected_score: f64,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} | club {} | {}.{} | xP {:.2} | {})",
            self.display_name,
            self.position,
            self.club,
            self.cost / 10,
            self.cost % 10,
            self.projected_score,
            self.availability,
        )
    }
}

/// Coerce a raw projected-score value into a finite `f64`.
///
/// Anything that is not a finite number (missing, `"-"`, `"n/a"`, NaN)
/// becomes `0.0`.
pub fn coerce_projected_score(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Universe
// ---------------------------------------------------------------------------

/// A snapshot of every selectable player, ordered by ascending id.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    players: Vec<Player>,
    index: HashMap<PlayerId, usize>,
    club_names: BTreeMap<ClubId, String>,
}

impl Universe {
    /// Build a universe, rejecting duplicate ids.
    pub fn new(mut players: Vec<Player>) -> Result<Self, ScoutError> {
        players.sort_by_key(|p| p.id);
        let mut index = HashMap::with_capacity(players.len());
        for (i, p) in players.iter().enumerate() {
            if index.insert(p.id, i).is_some() {
                return Err(ScoutError::MalformedData(format!(
                    "duplicate player id {} in universe",
                    p.id
                )));
            }
        }
        Ok(Self {
            players,
            index,
            club_names: BTreeMap::new(),
        })
    }

    /// Attach club short names used for display.
    pub fn with_club_names(mut self, names: BTreeMap<ClubId, String>) -> Self {
        self.club_names = names;
        self
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.index.get(&id).map(|&i| &self.players[i])
    }

    /// All players in ascending id order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn club_name(&self, club: ClubId) -> Option<&str> {
        self.club_names.get(&club).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Raw roster as supplied by the roster source: owned ids in pick order
/// plus funds in bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub owned_ids: Vec<PlayerId>,
    pub bank: Budget,
}

/// The caller's current squad, resolved against a universe snapshot.
#[derive(Debug, Clone)]
pub struct Squad {
    players: Vec<Player>,
    owned: HashSet<PlayerId>,
}

impl Squad {
    /// Resolve owned ids against the universe, preserving roster order.
    ///
    /// Fails if an owned id is missing from the universe or repeated.
    pub fn resolve(owned_ids: &[PlayerId], universe: &Universe) -> Result<Self, ScoutError> {
        let mut players = Vec::with_capacity(owned_ids.len());
        let mut owned = HashSet::with_capacity(owned_ids.len());
        for &id in owned_ids {
            if !owned.insert(id) {
                return Err(ScoutError::MalformedData(format!(
                    "player {id} listed twice in roster"
                )));
            }
            let player = universe.get(id).ok_or_else(|| {
                ScoutError::MalformedData(format!("owned player {id} not found in universe"))
            })?;
            players.push(player.clone());
        }
        Ok(Self { players, owned })
    }

    /// Owned players in roster order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn owns(&self, id: PlayerId) -> bool {
        self.owned.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Count of owned players per club.
    pub fn club_quota(&self) -> ClubQuota {
        let mut counts = BTreeMap::new();
        for p in &self.players {
            *counts.entry(p.club).or_insert(0usize) += 1;
        }
        ClubQuota { counts }
    }
}

/// Owned-player count per club.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubQuota {
    counts: BTreeMap<ClubId, usize>,
}

impl ClubQuota {
    pub fn count(&self, club: ClubId) -> usize {
        self.counts.get(&club).copied().unwrap_or(0)
    }

    /// Total owned players across all clubs.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// The quota after selling one player from `club`.
    pub fn after_sale(&self, club: ClubId) -> ClubQuota {
        let mut next = self.clone();
        if let Some(c) = next.counts.get_mut(&club) {
            *c = c.saturating_sub(1);
        }
        next
    }

    /// Whether one more player from `club` fits under the per-club cap.
    pub fn has_room_for(&self, club: ClubId) -> bool {
        self.count(club) < MAX_PLAYERS_PER_CLUB
    }
}

// ---------------------------------------------------------------------------
// Swaps & recommendations
// ---------------------------------------------------------------------------

/// A single proposed one-for-one transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapCandidate {
    pub sell: Player,
    pub buy: Player,
    /// `buy.projected_score - sell.projected_score`.
    pub score_delta: f64,
    pub sell_cost: Tenths,
    pub buy_cost: Tenths,
}

impl SwapCandidate {
    pub fn new(sell: &Player, buy: &Player) -> Self {
        Self {
            score_delta: buy.projected_score - sell.projected_score,
            sell_cost: sell.cost,
            buy_cost: buy.cost,
            sell: sell.clone(),
            buy: buy.clone(),
        }
    }

    /// Dedup key.
    pub fn key(&self) -> (PlayerId, PlayerId) {
        (self.sell.id, self.buy.id)
    }
}

impl fmt::Display for SwapCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (ΔxP {:+.2})",
            self.sell.display_name, self.buy.display_name, self.score_delta
        )
    }
}

/// Output of one optimiser run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recommendation {
    /// One or more ranked positive-gain swaps, best first.
    Swaps(Vec<SwapCandidate>),
    /// No feasible swap improves the squad.
    NoUpgrades,
}

impl Recommendation {
    pub fn swaps(&self) -> &[SwapCandidate] {
        match self {
            Recommendation::Swaps(s) => s,
            Recommendation::NoUpgrades => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.swaps().is_empty()
    }
}

impl From<Vec<SwapCandidate>> for Recommendation {
    fn from(swaps: Vec<SwapCandidate>) -> Self {
        if swaps.is_empty() {
            Recommendation::NoUpgrades
        } else {
            Recommendation::Swaps(swaps)
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

/// Summary of one fetch → optimise → deliver run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    pub universe_size: usize,
    pub squad_size: usize,
    pub bank: Budget,
    pub feasible_swaps: usize,
    pub recommendation: Recommendation,
    pub delivered: bool,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cycle @ {}: universe={} squad={} bank={:.1} feasible={} suggested={} delivered={}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.universe_size,
            self.squad_size,
            self.bank as f64 / 10.0,
            self.feasible_swaps,
            self.recommendation.swaps().len(),
            self.delivered,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for FPL Scout.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Data fetch failed ({source_name}): {message}")]
    DataFetch { source_name: String, message: String },

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScoutError {
    /// Classify a boundary-layer error. Errors that already carry a
    /// `ScoutError` keep their variant; anything else is a data-fetch failure.
    pub fn from_fetch(source_name: &str, err: anyhow::Error) -> Self {
        match err.downcast::<ScoutError>() {
            Ok(e) => e,
            Err(other) => ScoutError::DataFetch {
                source_name: source_name.to_string(),
                message: format!("{other:#}"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
