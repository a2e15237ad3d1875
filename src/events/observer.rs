//! Observer seam for presentation and statistics collaborators.
//!
//! Observers receive read-only snapshots and events; they never touch the
//! game state itself. All methods default to no-ops so a statistics sink
//! can implement only `on_round` and `on_game_end`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::{GameSnapshot, Team};

use super::GameEvent;

pub trait GameObserver: Send {
    /// Full snapshot after every transition.
    fn on_snapshot(&mut self, _snapshot: &GameSnapshot) {}

    fn on_event(&mut self, _event: &GameEvent) {}

    /// A new round (night) started.
    fn on_round(&mut self, _round: u32) {}

    /// Terminal signal. `None` when the game was stopped by a failure.
    fn on_game_end(&mut self, _winner: Option<Team>) {}
}

#[derive(Debug, Default)]
struct LogInner {
    events: Vec<GameEvent>,
    snapshots: usize,
    rounds: Vec<u32>,
    ended: Option<Option<Team>>,
}

/// In-memory observer. Clones share the same log, so a clone can be handed
/// to the game master while the original is kept for inspection.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    inner: Arc<Mutex<LogInner>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn events(&self) -> Vec<GameEvent> {
        self.lock().events.clone()
    }

    /// Events with the given `GameEvent::kind`.
    #[must_use]
    pub fn events_of(&self, kind: &str) -> Vec<GameEvent> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.lock().snapshots
    }

    #[must_use]
    pub fn rounds(&self) -> Vec<u32> {
        self.lock().rounds.clone()
    }

    /// `Some(winner)` once the terminal signal arrived.
    #[must_use]
    pub fn ended(&self) -> Option<Option<Team>> {
        self.lock().ended
    }
}

impl GameObserver for EventLog {
    fn on_snapshot(&mut self, _snapshot: &GameSnapshot) {
        self.lock().snapshots += 1;
    }

    fn on_event(&mut self, event: &GameEvent) {
        self.lock().events.push(event.clone());
    }

    fn on_round(&mut self, round: u32) {
        self.lock().rounds.push(round);
    }

    fn on_game_end(&mut self, winner: Option<Team>) {
        self.lock().ended = Some(winner);
    }
}
