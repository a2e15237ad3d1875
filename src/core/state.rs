//! Game state and read-only snapshots.
//!
//! ## GameState
//!
//! The single explicitly-owned record of a game in progress. Only the game
//! master mutates it. It holds the player registry, the current phase and
//! round, tonight's submissions, the current ballot, revote counters, the
//! reaction and last-words queues, and the winner.
//!
//! ## GameSnapshot
//!
//! What observers and decision sources see. `GameState::snapshot` is the
//! full view for the presentation layer; `GameState::snapshot_for` redacts
//! hidden information down to what one seat is allowed to know.
//!
//! Transcript and event history use `im` persistent vectors, so taking a
//! snapshot after every transition is O(1) in their length.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

use super::action::{Speech, VoteRecord};
use super::config::GameConfig;
use super::phase::{Phase, Reaction, RunoffFor, TransitionContext};
use super::player::{Player, SeatId, SeatMap};
use super::role::{Alignment, Role, Team};
use crate::error::SnapshotError;
use crate::events::GameEvent;
use crate::rules::NightSubmissions;

/// One Seer inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub round: u32,
    pub seer: SeatId,
    pub target: SeatId,
    pub alignment: Alignment,
}

pub struct GameState {
    pub game_id: u64,
    pub phase: Phase,
    /// Starts at 1; incremented on every return to `NightStart`.
    pub round: u32,
    pub players: SeatMap<Player>,

    // === Night ===
    pub night: NightSubmissions,
    /// Deaths announced at the next `DayStart`.
    pub last_night_deaths: SmallVec<[SeatId; 2]>,
    pub inspections: Vec<Inspection>,

    // === Ballots ===
    pub votes: Vec<VoteRecord>,
    /// 0 for the first ballot of a vote phase, k for the k-th runoff.
    pub ballot: u32,
    pub revote_count: u32,
    pub badge_revote_count: u32,
    pub badge_candidates: Vec<SeatId>,
    pub pk_candidates: Vec<SeatId>,
    pub runoff: RunoffFor,
    /// The last ballot tied and earned a runoff.
    pub tie: bool,
    pub pending_elimination: Option<SeatId>,
    /// Today's elimination vote has been resolved.
    pub vote_resolved: bool,

    // === Deaths ===
    pub reactions: VecDeque<Reaction>,
    pub last_words: VecDeque<SeatId>,
    /// Most recent death, used to anchor speaking order.
    pub recent_death: Option<SeatId>,

    pub winner: Option<Team>,
    /// Set when the game was stopped by an internal error.
    pub failed: bool,

    pub transcript: Vector<Speech>,
    pub history: Vector<GameEvent>,

    next_sequence: u64,
}

impl GameState {
    /// A fresh game at `NightStart` of round 1.
    #[must_use]
    pub fn new(game_id: u64, players: SeatMap<Player>) -> Self {
        Self {
            game_id,
            phase: Phase::NightStart,
            round: 1,
            players,
            night: NightSubmissions::default(),
            last_night_deaths: SmallVec::new(),
            inspections: Vec::new(),
            votes: Vec::new(),
            ballot: 0,
            revote_count: 0,
            badge_revote_count: 0,
            badge_candidates: Vec::new(),
            pk_candidates: Vec::new(),
            runoff: RunoffFor::Elimination,
            tie: false,
            pending_elimination: None,
            vote_resolved: false,
            reactions: VecDeque::new(),
            last_words: VecDeque::new(),
            recent_death: None,
            winner: None,
            failed: false,
            transcript: Vector::new(),
            history: Vector::new(),
            next_sequence: 0,
        }
    }

    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.players.seat_count()
    }

    #[must_use]
    pub fn is_alive(&self, seat: SeatId) -> bool {
        self.players.get(seat).is_some_and(|p| p.alive)
    }

    /// Living seats in seat order.
    #[must_use]
    pub fn living(&self) -> Vec<SeatId> {
        self.players
            .iter()
            .filter(|(_, p)| p.alive)
            .map(|(seat, _)| seat)
            .collect()
    }

    /// Living seats holding `role`, seat order.
    #[must_use]
    pub fn living_with_role(&self, role: Role) -> Vec<SeatId> {
        self.players
            .iter()
            .filter(|(_, p)| p.alive && p.role == role)
            .map(|(seat, _)| seat)
            .collect()
    }

    #[must_use]
    pub fn badge_holder(&self) -> Option<SeatId> {
        self.players
            .iter()
            .find(|(_, p)| p.holds_badge)
            .map(|(seat, _)| seat)
    }

    /// Living seats clockwise from the seat after the speaking anchor: the
    /// living badge holder, else the most recent death, else seat 0's
    /// left-hand neighbour (so seat 0 speaks first).
    #[must_use]
    pub fn speaking_order(&self) -> Vec<SeatId> {
        let count = self.seat_count();
        let anchor = self
            .badge_holder()
            .filter(|s| self.is_alive(*s))
            .or(self.recent_death)
            .unwrap_or(SeatId::new((count - 1) as u8));

        anchor
            .clockwise_after(count)
            .filter(|s| self.is_alive(*s))
            .collect()
    }

    /// Sequence numbers for requests and submissions.
    pub fn next_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.history.push_back(event);
    }

    /// Inputs to the transition table.
    #[must_use]
    pub fn transition_context(&self, config: &GameConfig) -> TransitionContext {
        TransitionContext {
            round: self.round,
            badge_election: config.badge_election,
            tie: self.tie,
            runoff: self.runoff,
            next_reaction: self.reactions.front().copied(),
            last_words_owed: !self.last_words.is_empty(),
            vote_resolved: self.vote_resolved,
            game_over: self.winner.is_some() || self.failed,
        }
    }

    /// Full view for the presentation layer.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.build_snapshot(None)
    }

    /// What `viewer` is allowed to know.
    ///
    /// - Own role always; wolves also see their teammates.
    /// - The Witch (and the pack) see tonight's wolf victim until dawn.
    /// - The Seer sees her own inspections.
    /// - Everyone sees every role once the game is over.
    #[must_use]
    pub fn snapshot_for(&self, viewer: SeatId) -> GameSnapshot {
        self.build_snapshot(Some(viewer))
    }

    fn build_snapshot(&self, viewer: Option<SeatId>) -> GameSnapshot {
        let viewer_role = viewer.and_then(|v| self.players.get(v)).map(|p| p.role);
        let reveal_all = viewer.is_none() || self.phase.is_terminal();

        let role_visible = |p: &Player| -> bool {
            reveal_all
                || Some(p.seat) == viewer
                || (viewer_role == Some(Role::Werewolf) && p.is_werewolf())
        };

        let players = self
            .players
            .values()
            .map(|p| PlayerView {
                seat: p.seat,
                name: p.name.clone(),
                alive: p.alive,
                is_human: p.is_human,
                holds_badge: p.holds_badge,
                role: role_visible(p).then_some(p.role),
            })
            .collect();

        let sees_victim = reveal_all
            || (self.phase.is_night()
                && matches!(viewer_role, Some(Role::Witch) | Some(Role::Werewolf)));
        let inspections = self
            .inspections
            .iter()
            .filter(|i| reveal_all || Some(i.seer) == viewer)
            .copied()
            .collect();

        GameSnapshot {
            game_id: self.game_id,
            phase: self.phase,
            round: self.round,
            viewer,
            players,
            badge_holder: self.badge_holder(),
            badge_candidates: self.badge_candidates.clone(),
            pk_candidates: self.pk_candidates.clone(),
            last_night_deaths: self.last_night_deaths.to_vec(),
            wolf_victim: if sees_victim { self.night.wolf_victim } else { None },
            inspections,
            transcript: self.transcript.clone(),
            winner: self.winner,
        }
    }
}

/// Public face of one seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub seat: SeatId,
    pub name: String,
    pub alive: bool,
    pub is_human: bool,
    pub holds_badge: bool,
    /// `None` when hidden from the viewer.
    pub role: Option<Role>,
}

/// Read-only view of a game, safe to hand to observers and decision sources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: u64,
    pub phase: Phase,
    pub round: u32,
    /// `None` for the full presentation view.
    pub viewer: Option<SeatId>,
    pub players: Vec<PlayerView>,
    pub badge_holder: Option<SeatId>,
    pub badge_candidates: Vec<SeatId>,
    pub pk_candidates: Vec<SeatId>,
    pub last_night_deaths: Vec<SeatId>,
    pub wolf_victim: Option<SeatId>,
    pub inspections: Vec<Inspection>,
    pub transcript: Vector<Speech>,
    pub winner: Option<Team>,
}

impl GameSnapshot {
    #[must_use]
    pub fn living(&self) -> Vec<SeatId> {
        self.players.iter().filter(|p| p.alive).map(|p| p.seat).collect()
    }

    #[must_use]
    pub fn player(&self, seat: SeatId) -> Option<&PlayerView> {
        self.players.get(seat.index())
    }

    /// Role of `seat` as far as the viewer knows.
    #[must_use]
    pub fn known_role(&self, seat: SeatId) -> Option<Role> {
        self.player(seat).and_then(|p| p.role)
    }

    /// Compact binary encoding for handing snapshots across a process or
    /// FFI boundary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
