//! Human seats over tokio channels.
//!
//! The game master side holds a `ChannelSource`; the UI side holds the
//! matching `HumanHandle`. Every prompt carries a `RequestTag` and the
//! answer must echo it. Answers whose tag does not match the outstanding
//! request are dropped: they were typed after a timeout, or belong to a
//! game that has since been replaced.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::trace;

use super::{DecisionRequest, DecisionSource, RequestTag};
use crate::core::{ActionDecision, GameSnapshot, Role, SeatId, SpeechKind, VoteDecision, VoteKind};
use crate::error::{DecisionError, GameError};

/// What the human is being asked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prompt {
    Action { role: Role },
    Vote { candidates: Vec<SeatId>, kind: VoteKind },
    Speech { kind: SpeechKind },
    Candidacy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub tag: RequestTag,
    pub seat: SeatId,
    pub prompt: Prompt,
    pub snapshot: GameSnapshot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Action(ActionDecision),
    Vote(VoteDecision),
    Speech(String),
    Candidacy(bool),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub tag: RequestTag,
    pub answer: Answer,
}

/// Create a connected source/handle pair.
#[must_use]
pub fn channel(buffer: usize) -> (ChannelSource, HumanHandle) {
    let (prompt_tx, prompt_rx) = mpsc::channel(buffer);
    let (response_tx, response_rx) = mpsc::channel(buffer);
    (
        ChannelSource {
            prompts: prompt_tx,
            responses: Mutex::new(response_rx),
        },
        HumanHandle {
            prompts: prompt_rx,
            responses: response_tx,
        },
    )
}

/// Game-master side of a human seat.
pub struct ChannelSource {
    prompts: mpsc::Sender<PromptMessage>,
    responses: Mutex<mpsc::Receiver<Response>>,
}

impl ChannelSource {
    async fn ask(&self, request: &DecisionRequest, prompt: Prompt) -> Result<Answer, DecisionError> {
        let message = PromptMessage {
            tag: request.tag,
            seat: request.seat,
            prompt,
            snapshot: request.snapshot.clone(),
        };
        self.prompts
            .send(message)
            .await
            .map_err(|_| DecisionError::ChannelClosed)?;

        let mut responses = self.responses.lock().await;
        loop {
            let response = responses.recv().await.ok_or(DecisionError::ChannelClosed)?;
            if response.tag == request.tag {
                return Ok(response.answer);
            }
            let stale = GameError::StaleResponse {
                game_id: response.tag.game_id,
                sequence: response.tag.sequence,
            };
            trace!(seat = %request.seat, error = %stale, "discarding answer");
        }
    }
}

fn mismatch(expected: &str, got: &Answer) -> DecisionError {
    DecisionError::Malformed(format!("expected {expected} answer, got {got:?}"))
}

#[async_trait]
impl DecisionSource for ChannelSource {
    async fn request_action(
        &self,
        request: &DecisionRequest,
        role: Role,
    ) -> Result<ActionDecision, DecisionError> {
        match self.ask(request, Prompt::Action { role }).await? {
            Answer::Action(decision) => Ok(decision),
            other => Err(mismatch("action", &other)),
        }
    }

    async fn request_vote(
        &self,
        request: &DecisionRequest,
        candidates: &[SeatId],
        kind: VoteKind,
    ) -> Result<VoteDecision, DecisionError> {
        let prompt = Prompt::Vote {
            candidates: candidates.to_vec(),
            kind,
        };
        match self.ask(request, prompt).await? {
            Answer::Vote(decision) => Ok(decision),
            other => Err(mismatch("vote", &other)),
        }
    }

    async fn request_speech(
        &self,
        request: &DecisionRequest,
        kind: SpeechKind,
    ) -> Result<String, DecisionError> {
        match self.ask(request, Prompt::Speech { kind }).await? {
            Answer::Speech(text) => Ok(text),
            other => Err(mismatch("speech", &other)),
        }
    }

    async fn request_candidacy(&self, request: &DecisionRequest) -> Result<bool, DecisionError> {
        match self.ask(request, Prompt::Candidacy).await? {
            Answer::Candidacy(running) => Ok(running),
            other => Err(mismatch("candidacy", &other)),
        }
    }
}

/// UI side of a human seat.
pub struct HumanHandle {
    prompts: mpsc::Receiver<PromptMessage>,
    responses: mpsc::Sender<Response>,
}

impl HumanHandle {
    /// Wait for the next prompt. `None` once the game master is gone.
    pub async fn next_prompt(&mut self) -> Option<PromptMessage> {
        self.prompts.recv().await
    }

    pub async fn answer(&self, tag: RequestTag, answer: Answer) -> Result<(), DecisionError> {
        self.responses
            .send(Response { tag, answer })
            .await
            .map_err(|_| DecisionError::ChannelClosed)
    }
}
