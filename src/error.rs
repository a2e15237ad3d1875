//! Typed errors.
//!
//! - `GameError`: rule and phase-machine failures. Only
//!   `IllegalPhaseTransition` is fatal; the rest are recovered as skip /
//!   abstain or silently dropped.
//! - `DecisionError`: what a decision source may fail with.
//! - `ConfigError`: invalid or unparsable configuration.
//! - `SnapshotError`: snapshot encoding failures.

use thiserror::Error;

use crate::core::{Phase, SeatId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{seat} submitted an invalid target: {reason}")]
    InvalidTarget { seat: SeatId, reason: String },

    #[error("{seat} did not decide within {timeout_ms}ms")]
    DecisionTimeout { seat: SeatId, timeout_ms: u64 },

    #[error("illegal phase transition in {phase:?}: {reason}")]
    IllegalPhaseTransition { phase: Phase, reason: String },

    #[error("stale response for game {game_id} request {sequence}")]
    StaleResponse { game_id: u64, sequence: u64 },
}

impl GameError {
    pub(crate) fn invalid(seat: SeatId, reason: impl Into<String>) -> Self {
        GameError::InvalidTarget {
            seat,
            reason: reason.into(),
        }
    }

    pub(crate) fn illegal(phase: Phase, reason: impl Into<String>) -> Self {
        GameError::IllegalPhaseTransition {
            phase,
            reason: reason.into(),
        }
    }

    /// Whether this error ends the game instance.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::IllegalPhaseTransition { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("decision source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed decision: {0}")]
    Malformed(String),

    #[error("decision channel closed")]
    ChannelClosed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("player count {count} outside supported range {min}-{max}")]
    PlayerCount { count: usize, min: usize, max: usize },

    #[error("human seat {seat} does not exist at a {player_count}-seat table")]
    HumanSeatOutOfRange { seat: SeatId, player_count: usize },

    #[error("decision timeout must be non-zero")]
    ZeroTimeout,

    #[error("{names} player names given for {player_count} seats")]
    TooManyNames { names: usize, player_count: usize },

    #[error("role deck of {roles} cards for {player_count} seats")]
    DeckSize { roles: usize, player_count: usize },

    #[error("{seats} decision sources given for {player_count} seats")]
    SourceCount { seats: usize, player_count: usize },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] bincode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_illegal_transition_is_fatal() {
        assert!(GameError::illegal(Phase::DayVote, "no voters").is_fatal());
        assert!(!GameError::invalid(SeatId::new(1), "dead").is_fatal());
        assert!(!GameError::DecisionTimeout {
            seat: SeatId::new(0),
            timeout_ms: 10
        }
        .is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = GameError::invalid(SeatId::new(3), "target is dead");
        assert_eq!(err.to_string(), "Seat 3 submitted an invalid target: target is dead");
    }
}
