//! Game configuration.
//!
//! `GameConfig` carries the table size, vote limits, the decision timeout and
//! every rule variant the game master supports. Variants that differ between
//! house rules (guard self-protection, witch self-save, badge weighting and
//! hand-off) are explicit policies rather than hard-coded behaviour.
//!
//! Configs can be built in code with the `with_*` methods or parsed from
//! JSON; missing fields take their defaults.
//!
//! ```
//! use rust_werewolf::core::{GameConfig, SeatId};
//!
//! let config = GameConfig::default()
//!     .with_player_count(12)
//!     .with_human_seat(SeatId::new(3))
//!     .with_seed(7);
//! assert!(config.validate().is_ok());
//!
//! let parsed = GameConfig::from_json_str(r#"{"player_count": 9}"#).unwrap();
//! assert_eq!(parsed.player_count, 9);
//! assert_eq!(parsed.max_revote_count, 1);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::player::SeatId;
use crate::error::ConfigError;

/// Smallest supported table.
pub const MIN_PLAYERS: usize = 8;
/// Largest supported table.
pub const MAX_PLAYERS: usize = 12;

/// AI difficulty. Opaque to the game master; read by decision sources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// When the Witch may use the antidote on herself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WitchSelfSave {
    Never,
    #[default]
    FirstNightOnly,
    Always,
}

impl WitchSelfSave {
    /// Whether self-save is allowed in the given round.
    #[must_use]
    pub fn allows(self, round: u32) -> bool {
        match self {
            WitchSelfSave::Never => false,
            WitchSelfSave::FirstNightOnly => round == 1,
            WitchSelfSave::Always => true,
        }
    }
}

/// Rounding rule for the badge holder's 1.5x elimination vote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeWeight {
    /// Counts as exactly 1.5 votes.
    #[default]
    Exact,
    /// Rounded up to 2 votes.
    RoundUp,
    /// Truncated to 1 vote.
    Truncate,
}

impl BadgeWeight {
    /// The badge holder's weight in half-vote units.
    #[must_use]
    pub fn half_votes(self) -> u32 {
        match self {
            BadgeWeight::Exact => 3,
            BadgeWeight::RoundUp => 4,
            BadgeWeight::Truncate => 2,
        }
    }
}

/// What happens to the badge when its holder dies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTransferPolicy {
    /// The dead holder names a living successor, or tears the badge up.
    #[default]
    HolderChooses,
    /// The badge leaves the game with its holder.
    Discard,
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Table size (8-12). Selects the role deck composition.
    pub player_count: usize,

    /// AI difficulty (opaque to the game master).
    pub difficulty: Difficulty,

    /// PK runoffs allowed for a day elimination before it is abandoned.
    pub max_revote_count: u32,

    /// PK runoffs allowed for the badge election before it is abandoned.
    pub max_badge_revote_count: u32,

    /// Per-request decision timeout in milliseconds.
    pub decision_timeout_ms: u64,

    /// Seat controlled by the human player, if any.
    pub human_seat: Option<SeatId>,

    /// Display names by seat. Missing names default to "Seat N".
    pub player_names: Vec<String>,

    /// Seed for the role deck shuffle.
    pub seed: u64,

    // === Rule variants ===
    pub guard_can_self_protect: bool,
    pub witch_self_save: WitchSelfSave,
    pub badge_election: bool,
    pub badge_weight: BadgeWeight,
    pub badge_transfer: BadgeTransferPolicy,
    pub hunter_shoots_when_poisoned: bool,
    /// Night deaths of round 1 get last words.
    pub first_night_last_words: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: 10,
            difficulty: Difficulty::Normal,
            max_revote_count: 1,
            max_badge_revote_count: 1,
            decision_timeout_ms: 30_000,
            human_seat: None,
            player_names: Vec::new(),
            seed: 42,
            guard_can_self_protect: true,
            witch_self_save: WitchSelfSave::FirstNightOnly,
            badge_election: true,
            badge_weight: BadgeWeight::Exact,
            badge_transfer: BadgeTransferPolicy::HolderChooses,
            hunter_shoots_when_poisoned: true,
            first_night_last_words: true,
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config is playable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount {
                count: self.player_count,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }
        if let Some(seat) = self.human_seat {
            if seat.index() >= self.player_count {
                return Err(ConfigError::HumanSeatOutOfRange {
                    seat,
                    player_count: self.player_count,
                });
            }
        }
        if self.decision_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.player_names.len() > self.player_count {
            return Err(ConfigError::TooManyNames {
                names: self.player_names.len(),
                player_count: self.player_count,
            });
        }
        Ok(())
    }

    /// Per-request decision timeout.
    #[must_use]
    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    /// Display name for a seat.
    #[must_use]
    pub fn player_name(&self, seat: SeatId) -> String {
        self.player_names
            .get(seat.index())
            .cloned()
            .unwrap_or_else(|| format!("Seat {}", seat.0))
    }

    pub fn with_player_count(mut self, count: usize) -> Self {
        self.player_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_human_seat(mut self, seat: SeatId) -> Self {
        self.human_seat = Some(seat);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_revote_limits(mut self, day: u32, badge: u32) -> Self {
        self.max_revote_count = day;
        self.max_badge_revote_count = badge;
        self
    }

    pub fn with_decision_timeout_ms(mut self, ms: u64) -> Self {
        self.decision_timeout_ms = ms;
        self
    }

    pub fn with_badge_election(mut self, enabled: bool) -> Self {
        self.badge_election = enabled;
        self
    }

    pub fn with_badge_weight(mut self, weight: BadgeWeight) -> Self {
        self.badge_weight = weight;
        self
    }

    pub fn with_badge_transfer(mut self, policy: BadgeTransferPolicy) -> Self {
        self.badge_transfer = policy;
        self
    }

    pub fn with_guard_self_protect(mut self, allowed: bool) -> Self {
        self.guard_can_self_protect = allowed;
        self
    }

    pub fn with_witch_self_save(mut self, rule: WitchSelfSave) -> Self {
        self.witch_self_save = rule;
        self
    }

    pub fn with_hunter_shoots_when_poisoned(mut self, allowed: bool) -> Self {
        self.hunter_shoots_when_poisoned = allowed;
        self
    }

    pub fn with_first_night_last_words(mut self, enabled: bool) -> Self {
        self.first_night_last_words = enabled;
        self
    }
}
