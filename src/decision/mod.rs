//! Decision sources: where a seat's actions, votes and speeches come from.
//!
//! The game master never knows whether a seat is driven by a human or an
//! AI. It calls the seat's `DecisionSource` with a tagged request and a
//! snapshot redacted to what that seat may know, and wraps every call in a
//! timeout.
//!
//! - `ChannelSource`: a human seat behind a pair of tokio channels.
//! - `RandomSource`: a seeded stand-in AI.
//! - `ScriptedSource`: fixed answers per round, for tests and replays.

mod channel;
mod random;
mod scripted;

pub use channel::{channel, Answer, ChannelSource, HumanHandle, Prompt, PromptMessage, Response};
pub use random::RandomSource;
pub use scripted::ScriptedSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{ActionDecision, GameSnapshot, Role, SeatId, SpeechKind, VoteDecision, VoteKind};
use crate::error::DecisionError;

/// Identifies one request within one game. Answers carrying an older tag
/// belong to a request that already timed out, or to a previous game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestTag {
    pub game_id: u64,
    pub sequence: u64,
}

/// Everything a source gets with a request.
#[derive(Clone, Debug)]
pub struct DecisionRequest {
    pub tag: RequestTag,
    pub seat: SeatId,
    /// Redacted to what `seat` is allowed to know.
    pub snapshot: GameSnapshot,
}

impl DecisionRequest {
    /// The requesting seat's own role.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.snapshot.known_role(self.seat)
    }
}

/// Supplies one seat's decisions.
///
/// Implementations may take as long as they like; the game master stops
/// waiting after the configured timeout and treats the seat as having
/// skipped or abstained. Errors are handled the same way.
#[async_trait]
pub trait DecisionSource: Send + Sync {
    /// A night ability, or the Hunter's reactive shot (`role` is `Hunter`).
    async fn request_action(
        &self,
        request: &DecisionRequest,
        role: Role,
    ) -> Result<ActionDecision, DecisionError>;

    async fn request_vote(
        &self,
        request: &DecisionRequest,
        candidates: &[SeatId],
        kind: VoteKind,
    ) -> Result<VoteDecision, DecisionError>;

    /// Free text; never parsed by the game master.
    async fn request_speech(
        &self,
        request: &DecisionRequest,
        kind: SpeechKind,
    ) -> Result<String, DecisionError>;

    /// Whether to run for the badge.
    async fn request_candidacy(&self, request: &DecisionRequest) -> Result<bool, DecisionError>;
}
