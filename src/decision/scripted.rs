//! Fixed answers keyed by round.
//!
//! Anything not scripted falls back to skip, abstain, an empty speech and
//! no candidacy. A scripted vote is repeated on every ballot of that kind
//! in that round, so the same answer carries through a PK runoff; if the
//! scripted target is not among the candidates the seat abstains.

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use super::{DecisionRequest, DecisionSource};
use crate::core::{ActionDecision, Role, SeatId, SpeechKind, VoteDecision, VoteKind};
use crate::error::DecisionError;

#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    actions: FxHashMap<u32, ActionDecision>,
    votes: FxHashMap<(u32, VoteKind), VoteDecision>,
    candidacy: bool,
    speech: String,
}

impl ScriptedSource {
    /// A seat that skips, abstains and stays quiet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the ability request of `round` with `decision`.
    #[must_use]
    pub fn with_action(mut self, round: u32, decision: ActionDecision) -> Self {
        self.actions.insert(round, decision);
        self
    }

    #[must_use]
    pub fn with_vote(mut self, round: u32, kind: VoteKind, decision: VoteDecision) -> Self {
        self.votes.insert((round, kind), decision);
        self
    }

    #[must_use]
    pub fn with_candidacy(mut self, running: bool) -> Self {
        self.candidacy = running;
        self
    }

    #[must_use]
    pub fn with_speech(mut self, text: impl Into<String>) -> Self {
        self.speech = text.into();
        self
    }
}

#[async_trait]
impl DecisionSource for ScriptedSource {
    async fn request_action(
        &self,
        request: &DecisionRequest,
        _role: Role,
    ) -> Result<ActionDecision, DecisionError> {
        Ok(self
            .actions
            .get(&request.snapshot.round)
            .copied()
            .unwrap_or(ActionDecision::Skip))
    }

    async fn request_vote(
        &self,
        request: &DecisionRequest,
        candidates: &[SeatId],
        kind: VoteKind,
    ) -> Result<VoteDecision, DecisionError> {
        let scripted = self.votes.get(&(request.snapshot.round, kind)).copied();
        Ok(match scripted {
            Some(VoteDecision::Target(t)) if candidates.contains(&t) => VoteDecision::Target(t),
            _ => VoteDecision::Abstain,
        })
    }

    async fn request_speech(
        &self,
        _request: &DecisionRequest,
        _kind: SpeechKind,
    ) -> Result<String, DecisionError> {
        Ok(self.speech.clone())
    }

    async fn request_candidacy(&self, _request: &DecisionRequest) -> Result<bool, DecisionError> {
        Ok(self.candidacy)
    }
}
