//! # rust-werewolf
//!
//! A deterministic Werewolf game master for 8-12 seat tables mixing one
//! human with AI seats.
//!
//! ## Design Principles
//!
//! 1. **One writer**: `GameMaster` owns the only `GameState`. Everything
//!    else sees read-only snapshots.
//!
//! 2. **Rules are pure**: night resolution, ballots and win checks are
//!    plain functions over the player registry. The phase machine decides
//!    when to call them.
//!
//! 3. **Seats are interchangeable**: a seat is driven by a
//!    `DecisionSource`, and the game master never knows if it is a human
//!    behind a channel or an AI. Slow or broken seats are skipped after a
//!    timeout.
//!
//! 4. **Deterministic**: the same seed deals the same roles, and seeded AI
//!    seats make the same choices.
//!
//! ## Modules
//!
//! - `core`: Seats, roles, phases, decisions, state, RNG, configuration
//! - `deck`: Role deck compositions and seat assignment
//! - `rules`: Night resolver, vote resolver, win evaluator
//! - `events`: Presentation events and the observer seam
//! - `decision`: The decision source trait and its human/AI/scripted sources
//! - `machine`: The game master (phase machine)
//! - `error`: Typed errors

pub mod core;
pub mod deck;
pub mod decision;
pub mod error;
pub mod events;
pub mod machine;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    ActionDecision, Alignment, GameConfig, GameSnapshot, GameState, Phase, Player, Role, SeatId,
    SeatMap, Team, VoteDecision,
};

pub use crate::deck::RoleDeck;

pub use crate::decision::{DecisionRequest, DecisionSource, RandomSource, RequestTag, ScriptedSource};

pub use crate::error::{ConfigError, DecisionError, GameError, SnapshotError};

pub use crate::events::{EventLog, GameEvent, GameObserver};

pub use crate::machine::GameMaster;

pub use crate::rules::{NightResolver, VoteResolver, WinEvaluator};
