//! Presentation events.
//!
//! Events carry the minimal payload a presentation layer needs to animate a
//! step: who acted, on whom, and what kind of outcome it was. They never
//! carry rule-violation detail; a fatal error surfaces only as `Failure`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Alignment, Phase, Role, SeatId, SpeechKind, Team, VoteKind};
use crate::rules::VoteOutcome;

/// What a single night action amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Protected,
    /// The pack settled on this victim.
    Attacked,
    Saved,
    Poisoned,
    Inspected(Alignment),
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    WolfAttack,
    Poison,
    Vote,
    HunterShot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged {
        from: Phase,
        to: Phase,
        round: u32,
    },

    NightActionResolved {
        role: Role,
        actor: SeatId,
        target: Option<SeatId>,
        outcome: ActionOutcome,
    },

    /// A dead hunter's reactive shot, day or night. `None` when it held fire.
    HunterShot {
        hunter: SeatId,
        target: Option<SeatId>,
    },

    /// Morning announcement of last night's deaths (empty = peaceful night).
    Dawn { deaths: SmallVec<[SeatId; 2]> },

    VoteResolved {
        kind: VoteKind,
        ballot: u32,
        /// Votes per candidate in half-vote units, seat order.
        tally: Vec<(SeatId, u32)>,
        outcome: VoteOutcome,
    },

    Elimination { seat: SeatId, cause: DeathCause },

    BadgeAssigned {
        from: Option<SeatId>,
        to: Option<SeatId>,
    },

    SpeechGiven { seat: SeatId, kind: SpeechKind },

    GameEnd { winner: Option<Team> },

    /// The game instance hit an internal error and was stopped.
    Failure,
}

impl GameEvent {
    /// Stable event name for presentation routing.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::PhaseChanged { .. } => "phase-changed",
            GameEvent::NightActionResolved { .. } => "night-action-resolved",
            GameEvent::HunterShot { .. } => "hunter-shot",
            GameEvent::Dawn { .. } => "dawn",
            GameEvent::VoteResolved { .. } => "vote-resolved",
            GameEvent::Elimination { .. } => "elimination",
            GameEvent::BadgeAssigned { .. } => "badge-assigned",
            GameEvent::SpeechGiven { .. } => "speech",
            GameEvent::GameEnd { .. } => "game-end",
            GameEvent::Failure => "failure",
        }
    }
}
