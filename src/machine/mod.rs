//! The game master: the phase machine that drives one game.
//!
//! `GameMaster` owns the only `GameState`. Each `step` executes the current
//! phase (collecting decisions, applying rules) and then takes exactly one
//! transition from the table in `core::phase`. Observers get a full
//! snapshot after every transition.
//!
//! ## Collecting decisions
//!
//! Requests to independent seats (votes, wolf nominations, candidacies) are
//! issued together and joined; speeches are requested one seat at a time.
//! Every request runs under the configured timeout. A timeout, a source
//! error or an illegal answer all count as skip / abstain, so a missing or
//! broken seat can slow a game down but never stop it.
//!
//! ## Failure
//!
//! An `IllegalPhaseTransition` ends the game at once: the phase becomes
//! `GameEnd` with no winner, a `Failure` event is emitted and observers
//! get the terminal signal.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rust_werewolf::core::{Difficulty, GameConfig, SeatId};
//! use rust_werewolf::decision::{DecisionSource, RandomSource};
//! use rust_werewolf::machine::GameMaster;
//!
//! # async fn play() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GameConfig::default().with_seed(7);
//! let sources: Vec<Arc<dyn DecisionSource>> = SeatId::all(config.player_count)
//!     .map(|seat| Arc::new(RandomSource::for_seat(7, seat, Difficulty::Normal)) as Arc<dyn DecisionSource>)
//!     .collect();
//!
//! let mut master = GameMaster::new(config, sources)?;
//! let winner = master.run().await;
//! println!("winner: {winner:?}");
//! # Ok(())
//! # }
//! ```

mod day;
mod night;

use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use tokio::time::{self, error::Elapsed};
use tracing::{debug, error, info, warn};

use crate::core::{
    GameConfig, GameSnapshot, GameState, Phase, Reaction, Role, SeatId, SeatMap, Team,
};
use crate::deck::RoleDeck;
use crate::decision::{DecisionRequest, DecisionSource, RequestTag};
use crate::error::{ConfigError, DecisionError, GameError};
use crate::events::{DeathCause, GameEvent, GameObserver};
use crate::rules::WinEvaluator;

pub struct GameMaster {
    config: GameConfig,
    state: GameState,
    sources: SeatMap<Arc<dyn DecisionSource>>,
    observers: Vec<Box<dyn GameObserver>>,
}

impl GameMaster {
    /// Deal a new game from `config.seed` with one source per seat.
    pub fn new(
        config: GameConfig,
        sources: Vec<Arc<dyn DecisionSource>>,
    ) -> Result<Self, ConfigError> {
        let deck = RoleDeck::shuffled(&config)?;
        Self::with_deck(config, deck, sources)
    }

    /// Seat a game from a deck as given: seat `i` gets the `i`-th role.
    ///
    /// Used for replays and fixed scenarios.
    pub fn with_deck(
        config: GameConfig,
        deck: RoleDeck,
        sources: Vec<Arc<dyn DecisionSource>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if deck.len() != config.player_count {
            return Err(ConfigError::DeckSize {
                roles: deck.len(),
                player_count: config.player_count,
            });
        }
        if sources.len() != config.player_count {
            return Err(ConfigError::SourceCount {
                seats: sources.len(),
                player_count: config.player_count,
            });
        }

        let players = deck.assign(&config);
        info!(game_id = 1, seed = config.seed, players = config.player_count, "game dealt");

        Ok(Self {
            config,
            state: GameState::new(1, players),
            sources: SeatMap::from_vec(sources),
            observers: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl GameObserver + 'static) -> Self {
        self.add_observer(observer);
        self
    }

    pub fn add_observer(&mut self, observer: impl GameObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Full, unredacted view.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    #[must_use]
    pub fn winner(&self) -> Option<Team> {
        self.state.winner
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.phase.is_terminal()
    }

    /// Throw the current game away and deal a fresh one from `seed`.
    ///
    /// The game id is bumped, so any answer still in flight for the old
    /// game is recognised as stale.
    pub fn start_new_game(&mut self, seed: u64) -> Result<(), ConfigError> {
        self.config.seed = seed;
        let players = RoleDeck::deal(&self.config)?;
        let game_id = self.state.game_id + 1;
        self.state = GameState::new(game_id, players);
        info!(game_id, seed, "new game dealt");
        self.publish_snapshot();
        Ok(())
    }

    /// Execute the current phase and transition once. Returns the new phase.
    pub async fn step(&mut self) -> Phase {
        let phase = self.state.phase;
        if phase.is_terminal() {
            return phase;
        }

        match self.execute(phase).await {
            Ok(()) => self.advance(),
            Err(err) => self.fail(err),
        }
        self.state.phase
    }

    /// Step until the game ends.
    pub async fn run(&mut self) -> Option<Team> {
        while !self.is_over() {
            self.step().await;
        }
        self.state.winner
    }

    /// Step until the game ends or `max_rounds` full rounds have been played.
    pub async fn run_rounds(&mut self, max_rounds: u32) -> Option<Team> {
        while !self.is_over() && self.state.round <= max_rounds {
            self.step().await;
        }
        self.state.winner
    }

    async fn execute(&mut self, phase: Phase) -> Result<(), GameError> {
        match phase {
            Phase::NightStart => {
                self.begin_night();
                Ok(())
            }
            Phase::NightGuardAction => self.guard_action().await,
            Phase::NightWolfAction => self.wolf_action().await,
            Phase::NightWitchAction => self.witch_action().await,
            Phase::NightSeerAction => self.seer_action().await,
            Phase::NightResolve => self.resolve_night(),
            Phase::DayStart => {
                self.dawn();
                Ok(())
            }
            Phase::DayBadgeSignup => self.badge_signup().await,
            Phase::DayBadgeSpeech => self.badge_speeches().await,
            Phase::DayBadgeElection => self.badge_election().await,
            Phase::DayPkSpeech => self.pk_speeches().await,
            Phase::DaySpeech => self.discussion().await,
            Phase::DayLastWords => self.last_words().await,
            Phase::DayVote => self.day_vote().await,
            Phase::DayResolve => self.resolve_day(),
            Phase::HunterShoot => self.hunter_shoot().await,
            Phase::BadgeTransfer => self.badge_transfer().await,
            Phase::GameEnd => Ok(()),
        }
    }

    fn advance(&mut self) {
        let from = self.state.phase;
        let ctx = self.state.transition_context(&self.config);
        let to = from.next(&ctx);

        if to == Phase::NightStart {
            self.state.round += 1;
        }
        self.state.phase = to;

        info!(
            game_id = self.state.game_id,
            round = self.state.round,
            ?from,
            ?to,
            "phase transition"
        );
        if let Some(reaction) = self.state.reactions.front().filter(|r| r.phase() == to) {
            debug!(game_id = self.state.game_id, seat = %reaction.seat(), ?to, "reaction due");
        }
        self.emit(GameEvent::PhaseChanged {
            from,
            to,
            round: self.state.round,
        });

        if to.is_terminal() {
            let winner = self.state.winner;
            info!(game_id = self.state.game_id, ?winner, "game over");
            self.emit(GameEvent::GameEnd { winner });
            for observer in &mut self.observers {
                observer.on_game_end(winner);
            }
        }

        self.publish_snapshot();
    }

    fn fail(&mut self, err: GameError) {
        if !err.is_fatal() {
            // Recoverable errors are handled where they occur.
            warn!(game_id = self.state.game_id, error = %err, "unexpected recoverable error");
            self.advance();
            return;
        }

        error!(
            game_id = self.state.game_id,
            round = self.state.round,
            phase = ?self.state.phase,
            error = %err,
            "stopping game"
        );
        self.state.failed = true;
        self.state.winner = None;
        self.state.reactions.clear();
        self.state.last_words.clear();
        self.emit(GameEvent::Failure);
        self.advance();
    }

    fn emit(&mut self, event: GameEvent) {
        debug!(game_id = self.state.game_id, kind = event.kind(), "event");
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
        self.state.record_event(event);
    }

    fn publish_snapshot(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.state.snapshot();
        for observer in &mut self.observers {
            observer.on_snapshot(&snapshot);
        }
    }

    fn notify_round(&mut self) {
        let round = self.state.round;
        for observer in &mut self.observers {
            observer.on_round(round);
        }
    }

    // === Deaths ===

    /// Mark `seat` dead and queue whatever its death owes.
    ///
    /// Does not check for a winner; callers apply every death of the step
    /// first and then call `check_win`.
    fn kill(&mut self, seat: SeatId, cause: DeathCause) {
        let hunter_poisoned_allowed = self.config.hunter_shoots_when_poisoned;
        let Some(player) = self.state.players.get_mut(seat) else {
            return;
        };
        if !player.alive {
            return;
        }
        player.alive = false;

        let mut reactions = Vec::new();
        if player.role == Role::Hunter && player.hunter_can_shoot {
            if cause == DeathCause::Poison && !hunter_poisoned_allowed {
                player.hunter_can_shoot = false;
            } else {
                reactions.push(Reaction::HunterShoot(seat));
            }
        }
        if player.holds_badge {
            reactions.push(Reaction::BadgeTransfer(seat));
        }

        info!(game_id = self.state.game_id, round = self.state.round, %seat, ?cause, "elimination");
        self.state.recent_death = Some(seat);
        self.state.reactions.extend(reactions);
        self.emit(GameEvent::Elimination { seat, cause });
    }

    /// Record a winner if there is one. Queued reactions and last words are
    /// abandoned when the game is decided.
    fn check_win(&mut self) -> bool {
        match WinEvaluator::evaluate(&self.state.players) {
            Some(team) => {
                self.state.winner = Some(team);
                self.state.reactions.clear();
                self.state.last_words.clear();
                true
            }
            None => false,
        }
    }

    // === Requests ===

    fn request_for(&mut self, seat: SeatId) -> DecisionRequest {
        DecisionRequest {
            tag: RequestTag {
                game_id: self.state.game_id,
                sequence: self.state.next_sequence(),
            },
            seat,
            snapshot: self.state.snapshot_for(seat),
        }
    }

    /// Ask every seat in `seats` at once and wait for all of them.
    ///
    /// `None` means the seat timed out or its source failed.
    async fn gather<T, F>(&mut self, seats: &[SeatId], ask: F) -> Vec<(SeatId, Option<T>)>
    where
        T: Send + 'static,
        F: Fn(Arc<dyn DecisionSource>, DecisionRequest) -> BoxFuture<'static, Result<T, DecisionError>>,
    {
        let timeout = self.config.decision_timeout();
        let pending: Vec<_> = seats
            .iter()
            .map(|&seat| {
                let request = self.request_for(seat);
                let source = Arc::clone(&self.sources[seat]);
                let answer = ask(source, request);
                async move { (seat, time::timeout(timeout, answer).await) }
            })
            .collect();

        join_all(pending)
            .await
            .into_iter()
            .map(|(seat, answer)| (seat, self.settle(seat, answer)))
            .collect()
    }

    /// Ask a single seat.
    async fn ask_one<T, F>(&mut self, seat: SeatId, ask: F) -> Option<T>
    where
        T: Send + 'static,
        F: Fn(Arc<dyn DecisionSource>, DecisionRequest) -> BoxFuture<'static, Result<T, DecisionError>>,
    {
        self.gather(&[seat], ask).await.pop().and_then(|(_, answer)| answer)
    }

    fn settle<T>(&self, seat: SeatId, answer: Result<Result<T, DecisionError>, Elapsed>) -> Option<T> {
        match answer {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                warn!(game_id = self.state.game_id, %seat, error = %err, "decision failed, skipping");
                None
            }
            Err(_) => {
                let err = GameError::DecisionTimeout {
                    seat,
                    timeout_ms: self.config.decision_timeout_ms,
                };
                warn!(game_id = self.state.game_id, %seat, error = %err, "skipping");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::ScriptedSource;
    use crate::events::EventLog;

    fn quiet_sources(n: usize) -> Vec<Arc<dyn DecisionSource>> {
        (0..n)
            .map(|_| Arc::new(ScriptedSource::new()) as Arc<dyn DecisionSource>)
            .collect()
    }

    fn master() -> (GameMaster, EventLog) {
        let config = GameConfig::default().with_player_count(8);
        let log = EventLog::new();
        let master = GameMaster::new(config, quiet_sources(8))
            .unwrap()
            .with_observer(log.clone());
        (master, log)
    }

    #[test]
    fn test_source_count_checked() {
        let err = GameMaster::new(GameConfig::default(), quiet_sources(3)).err().unwrap();
        assert!(matches!(err, ConfigError::SourceCount { seats: 3, player_count: 10 }));
    }

    #[test]
    fn test_deck_size_checked() {
        let deck = RoleDeck::for_players(9).unwrap();
        let err = GameMaster::with_deck(GameConfig::default(), deck, quiet_sources(10))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::DeckSize { roles: 9, player_count: 10 }));
    }

    #[tokio::test]
    async fn test_first_step_clears_the_night() {
        let (mut master, log) = master();
        assert_eq!(master.state().phase, Phase::NightStart);

        assert_eq!(master.step().await, Phase::NightGuardAction);
        assert_eq!(log.rounds(), vec![1]);
        assert_eq!(log.snapshot_count(), 1);
        assert_eq!(log.events_of("phase-changed").len(), 1);
    }

    #[tokio::test]
    async fn test_missing_reaction_is_fatal() {
        let (mut master, log) = master();
        master.state.phase = Phase::HunterShoot;

        assert_eq!(master.step().await, Phase::GameEnd);
        assert!(master.state().failed);
        assert_eq!(master.winner(), None);
        assert_eq!(log.events_of("failure").len(), 1);
        assert_eq!(log.ended(), Some(None));

        // Terminal: further steps do nothing.
        assert_eq!(master.step().await, Phase::GameEnd);
        assert_eq!(log.events_of("game-end").len(), 1);
    }

    #[tokio::test]
    async fn test_witch_without_potions_is_not_asked() {
        let witch_events = |log: &EventLog| {
            log.events_of("night-action-resolved")
                .into_iter()
                .filter(|e| matches!(e, GameEvent::NightActionResolved { role: Role::Witch, .. }))
                .count()
        };

        let (mut master, log) = master();
        master.state.phase = Phase::NightWitchAction;
        assert_eq!(master.step().await, Phase::NightSeerAction);
        assert_eq!(witch_events(&log), 1);

        let (mut master, log) = self::master();
        let witch = master.state().living_with_role(Role::Witch)[0];
        master.state.players[witch].witch_has_antidote = false;
        master.state.players[witch].witch_has_poison = false;
        master.state.phase = Phase::NightWitchAction;
        assert_eq!(master.step().await, Phase::NightSeerAction);
        assert_eq!(witch_events(&log), 0);
    }

    #[tokio::test]
    async fn test_start_new_game_bumps_id() {
        let (mut master, _log) = master();
        master.run_rounds(1).await;
        assert!(master.state().round > 1 || master.is_over());

        master.start_new_game(1234).unwrap();
        assert_eq!(master.state().game_id, 2);
        assert_eq!(master.state().round, 1);
        assert_eq!(master.state().phase, Phase::NightStart);
        assert_eq!(master.config().seed, 1234);
        assert!(master.state().history.is_empty());
    }
}
