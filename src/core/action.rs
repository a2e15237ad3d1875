//! Decisions and the records kept of them.
//!
//! Decision sources answer with small typed values (`ActionDecision`,
//! `VoteDecision`). Once validated, the game master stores them as
//! `NightSubmission`s and `VoteRecord`s, which live only as long as the
//! night or ballot they belong to.

use serde::{Deserialize, Serialize};

use super::player::SeatId;
use super::role::Role;

/// A seat's answer to an ability request.
///
/// Guard, Werewolf, Seer and Hunter answer with `Target` or `Skip`.
/// The Witch answers with `Antidote`, `Poison` or `Skip`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionDecision {
    Skip,
    Target(SeatId),
    /// Use the antidote on tonight's wolf victim.
    Antidote,
    Poison(SeatId),
}

impl ActionDecision {
    /// The seat this decision points at, if any.
    #[must_use]
    pub fn target(self) -> Option<SeatId> {
        match self {
            ActionDecision::Target(seat) | ActionDecision::Poison(seat) => Some(seat),
            ActionDecision::Skip | ActionDecision::Antidote => None,
        }
    }
}

/// A seat's answer to a ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteDecision {
    Abstain,
    Target(SeatId),
}

impl VoteDecision {
    #[must_use]
    pub fn target(self) -> Option<SeatId> {
        match self {
            VoteDecision::Target(seat) => Some(seat),
            VoteDecision::Abstain => None,
        }
    }
}

/// What a ballot request is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteKind {
    BadgeElection,
    Elimination,
    /// A dead badge holder naming a successor.
    BadgeTransfer,
}

/// What a speech request is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeechKind {
    BadgeCampaign,
    PkDefence,
    Discussion,
    LastWords,
}

/// A validated night action, kept for the current night only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightSubmission {
    pub role: Role,
    pub seat: SeatId,
    pub decision: ActionDecision,
    /// Order of submission within the game.
    pub sequence: u64,
}

impl NightSubmission {
    #[must_use]
    pub fn target(&self) -> Option<SeatId> {
        self.decision.target()
    }
}

/// One ballot cast in the current vote phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: SeatId,
    /// `None` = abstain.
    pub target: Option<SeatId>,
    /// 0 for the first ballot, k for the k-th PK runoff.
    pub ballot: u32,
}

impl VoteRecord {
    #[must_use]
    pub fn new(voter: SeatId, target: Option<SeatId>, ballot: u32) -> Self {
        Self {
            voter,
            target,
            ballot,
        }
    }
}

/// A speech in the transcript. The text is opaque to the game master.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speech {
    pub seat: SeatId,
    pub kind: SpeechKind,
    pub round: u32,
    pub text: String,
}
