//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use rust_werewolf::core::{ActionDecision, Role, SeatId, SpeechKind, VoteDecision, VoteKind};
use rust_werewolf::decision::{DecisionRequest, DecisionSource, ScriptedSource};
use rust_werewolf::error::DecisionError;

/// Log to the test writer when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn seat(i: u8) -> SeatId {
    SeatId::new(i)
}

pub fn target(i: u8) -> ActionDecision {
    ActionDecision::Target(seat(i))
}

pub fn vote_for(i: u8) -> VoteDecision {
    VoteDecision::Target(seat(i))
}

pub fn boxed(sources: Vec<ScriptedSource>) -> Vec<Arc<dyn DecisionSource>> {
    sources
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn DecisionSource>)
        .collect()
}

/// A source whose every call fails.
pub struct FailingSource;

#[async_trait]
impl DecisionSource for FailingSource {
    async fn request_action(&self, _: &DecisionRequest, _: Role) -> Result<ActionDecision, DecisionError> {
        Err(DecisionError::Unavailable("offline".into()))
    }

    async fn request_vote(
        &self,
        _: &DecisionRequest,
        _: &[SeatId],
        _: VoteKind,
    ) -> Result<VoteDecision, DecisionError> {
        Err(DecisionError::Unavailable("offline".into()))
    }

    async fn request_speech(&self, _: &DecisionRequest, _: SpeechKind) -> Result<String, DecisionError> {
        Err(DecisionError::Unavailable("offline".into()))
    }

    async fn request_candidacy(&self, _: &DecisionRequest) -> Result<bool, DecisionError> {
        Err(DecisionError::Unavailable("offline".into()))
    }
}

/// A source that never answers.
pub struct SilentSource;

#[async_trait]
impl DecisionSource for SilentSource {
    async fn request_action(&self, _: &DecisionRequest, _: Role) -> Result<ActionDecision, DecisionError> {
        std::future::pending().await
    }

    async fn request_vote(
        &self,
        _: &DecisionRequest,
        _: &[SeatId],
        _: VoteKind,
    ) -> Result<VoteDecision, DecisionError> {
        std::future::pending().await
    }

    async fn request_speech(&self, _: &DecisionRequest, _: SpeechKind) -> Result<String, DecisionError> {
        std::future::pending().await
    }

    async fn request_candidacy(&self, _: &DecisionRequest) -> Result<bool, DecisionError> {
        std::future::pending().await
    }
}

/// `n` seats that skip, abstain and stay out of the badge race.
pub fn scripts(n: usize) -> Vec<ScriptedSource> {
    (0..n).map(|_| ScriptedSource::new()).collect()
}

/// Rewrite the scripts of `seats`.
pub fn edit(scripts: &mut [ScriptedSource], seats: &[u8], f: impl Fn(ScriptedSource) -> ScriptedSource) {
    for &i in seats {
        let script = std::mem::take(&mut scripts[i as usize]);
        scripts[i as usize] = f(script);
    }
}
