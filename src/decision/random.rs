//! Seeded stand-in AI.
//!
//! Plays legal-looking moves at random, sharpened a little by difficulty:
//! harder seats abstain less, and use what they know (wolf teammates,
//! Seer results) when picking targets. The game master still validates
//! everything, so an occasional illegal pick just becomes a skip.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{DecisionRequest, DecisionSource};
use crate::core::{
    ActionDecision, Alignment, Difficulty, GameRng, GameSnapshot, Role, SeatId, SpeechKind,
    VoteDecision, VoteKind,
};
use crate::error::DecisionError;

struct Memory {
    rng: GameRng,
    game_id: Option<u64>,
    last_guarded: Option<SeatId>,
}

pub struct RandomSource {
    difficulty: Difficulty,
    memory: Mutex<Memory>,
}

impl RandomSource {
    /// An AI seat whose choices are fixed by `seed`.
    #[must_use]
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            memory: Mutex::new(Memory {
                rng: GameRng::new(seed).for_context("ai"),
                game_id: None,
                last_guarded: None,
            }),
        }
    }

    /// One source per seat, each with its own stream.
    #[must_use]
    pub fn for_seat(seed: u64, seat: SeatId, difficulty: Difficulty) -> Self {
        let rng = GameRng::new(seed).for_context(&format!("ai-seat-{}", seat.0));
        Self::new(rng.seed(), difficulty)
    }

    fn memory(&self, game_id: u64) -> MutexGuard<'_, Memory> {
        let mut memory = self.memory.lock().unwrap_or_else(PoisonError::into_inner);
        if memory.game_id != Some(game_id) {
            memory.game_id = Some(game_id);
            memory.last_guarded = None;
        }
        memory
    }

    /// Chance of acting on an ability at all.
    fn initiative(&self) -> f64 {
        match self.difficulty {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 0.8,
            Difficulty::Hard => 1.0,
        }
    }

    /// Chance of using private knowledge when it applies.
    fn insight(&self) -> f64 {
        match self.difficulty {
            Difficulty::Easy => 0.0,
            Difficulty::Normal => 0.5,
            Difficulty::Hard => 0.9,
        }
    }

    fn pick(rng: &mut GameRng, seats: &[SeatId]) -> Option<SeatId> {
        rng.choose(seats).copied()
    }

    fn action(&self, req: &DecisionRequest, role: Role) -> ActionDecision {
        let me = req.seat;
        let snapshot = &req.snapshot;
        let mut memory = self.memory(req.tag.game_id);
        let initiative = self.initiative();

        let others: Vec<SeatId> = snapshot.living().into_iter().filter(|s| *s != me).collect();

        match role {
            Role::Werewolf => {
                let prey: Vec<SeatId> = others
                    .iter()
                    .copied()
                    .filter(|s| snapshot.known_role(*s) != Some(Role::Werewolf))
                    .collect();
                Self::pick(&mut memory.rng, &prey).map_or(ActionDecision::Skip, ActionDecision::Target)
            }
            Role::Guard => {
                let last = memory.last_guarded;
                let options: Vec<SeatId> = snapshot
                    .living()
                    .into_iter()
                    .filter(|s| Some(*s) != last)
                    .collect();
                let choice = if memory.rng.gen_bool(initiative) {
                    Self::pick(&mut memory.rng, &options)
                } else {
                    None
                };
                memory.last_guarded = choice;
                choice.map_or(ActionDecision::Skip, ActionDecision::Target)
            }
            Role::Witch => {
                if snapshot.wolf_victim.is_some() && memory.rng.gen_bool(initiative * 0.6) {
                    ActionDecision::Antidote
                } else if memory.rng.gen_bool(initiative * 0.2) {
                    Self::pick(&mut memory.rng, &others).map_or(ActionDecision::Skip, ActionDecision::Poison)
                } else {
                    ActionDecision::Skip
                }
            }
            Role::Seer => {
                let unchecked: Vec<SeatId> = others
                    .iter()
                    .copied()
                    .filter(|s| !snapshot.inspections.iter().any(|i| i.target == *s))
                    .collect();
                let pool = if unchecked.is_empty() { &others } else { &unchecked };
                Self::pick(&mut memory.rng, pool).map_or(ActionDecision::Skip, ActionDecision::Target)
            }
            Role::Hunter => {
                let insight = self.insight();
                if let Some(wolf) = known_wolf(snapshot, &others) {
                    if memory.rng.gen_bool(insight) {
                        return ActionDecision::Target(wolf);
                    }
                }
                if memory.rng.gen_bool(initiative) {
                    Self::pick(&mut memory.rng, &others).map_or(ActionDecision::Skip, ActionDecision::Target)
                } else {
                    ActionDecision::Skip
                }
            }
            Role::Villager => ActionDecision::Skip,
        }
    }

    fn vote(&self, req: &DecisionRequest, candidates: &[SeatId], kind: VoteKind) -> VoteDecision {
        let me = req.seat;
        let snapshot = &req.snapshot;
        let my_role = req.role();
        let insight = self.insight();
        let mut memory = self.memory(req.tag.game_id);

        if kind == VoteKind::Elimination && !memory.rng.gen_bool(self.initiative()) {
            return VoteDecision::Abstain;
        }

        let wolf = my_role == Some(Role::Werewolf);
        let options: Vec<SeatId> = candidates
            .iter()
            .copied()
            .filter(|s| *s != me)
            .filter(|s| !wolf || snapshot.known_role(*s) != Some(Role::Werewolf))
            .collect();

        if !wolf && kind != VoteKind::BadgeElection {
            if let Some(target) = known_wolf(snapshot, &options) {
                if memory.rng.gen_bool(insight) {
                    return VoteDecision::Target(target);
                }
            }
        }

        Self::pick(&mut memory.rng, &options).map_or(VoteDecision::Abstain, VoteDecision::Target)
    }
}

/// A seat among `seats` this viewer knows to be a werewolf.
fn known_wolf(snapshot: &GameSnapshot, seats: &[SeatId]) -> Option<SeatId> {
    snapshot
        .inspections
        .iter()
        .filter(|i| i.alignment == Alignment::Werewolf)
        .map(|i| i.target)
        .find(|s| seats.contains(s))
}

#[async_trait]
impl DecisionSource for RandomSource {
    async fn request_action(
        &self,
        request: &DecisionRequest,
        role: Role,
    ) -> Result<ActionDecision, DecisionError> {
        Ok(self.action(request, role))
    }

    async fn request_vote(
        &self,
        request: &DecisionRequest,
        candidates: &[SeatId],
        kind: VoteKind,
    ) -> Result<VoteDecision, DecisionError> {
        Ok(self.vote(request, candidates, kind))
    }

    async fn request_speech(
        &self,
        request: &DecisionRequest,
        kind: SpeechKind,
    ) -> Result<String, DecisionError> {
        let lines: &[&str] = match kind {
            SpeechKind::BadgeCampaign => &["would make a fair sheriff.", "will keep the vote honest."],
            SpeechKind::PkDefence => &["is not who you are looking for.", "votes with the village."],
            SpeechKind::Discussion => &["is listening.", "has doubts about the quiet ones.", "passes."],
            SpeechKind::LastWords => &["has nothing more to say.", "trusts the seer."],
        };
        let mut memory = self.memory(request.tag.game_id);
        let line = lines[memory.rng.gen_range_usize(0..lines.len())];
        Ok(format!("{} {line}", request.seat))
    }

    async fn request_candidacy(&self, request: &DecisionRequest) -> Result<bool, DecisionError> {
        let mut memory = self.memory(request.tag.game_id);
        Ok(memory.rng.gen_bool(0.4))
    }
}
