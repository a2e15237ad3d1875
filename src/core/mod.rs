//! Core types: seats, roles, phases, decisions, state, RNG, configuration.
//!
//! Everything here is plain data. The rules that act on it live in
//! `rules`, and the only writer of `GameState` is the game master in
//! `machine`.

pub mod action;
pub mod config;
pub mod phase;
pub mod player;
pub mod rng;
pub mod role;
pub mod state;

pub use action::{
    ActionDecision, NightSubmission, Speech, SpeechKind, VoteDecision, VoteKind, VoteRecord,
};
pub use config::{
    BadgeTransferPolicy, BadgeWeight, Difficulty, GameConfig, WitchSelfSave, MAX_PLAYERS,
    MIN_PLAYERS,
};
pub use phase::{Phase, Reaction, RunoffFor, TransitionContext};
pub use player::{Player, SeatId, SeatMap};
pub use rng::GameRng;
pub use role::{Alignment, Role, Team};
pub use state::{GameSnapshot, GameState, Inspection, PlayerView};
