//! Night resolution.
//!
//! The game master collects at most one action per night role into
//! `NightSubmissions`, validating each against `NightRules` as it arrives.
//! `NightResolver::resolve` then turns the submissions into a single
//! `NightOutcome` in a fixed order:
//!
//! 1. Guard protection (recorded before the wolves act, never revealed).
//! 2. Wolf victim (plurality of nominations, seat-order tie-break).
//! 3. Witch decision, made knowing the victim but not the guard target.
//! 4. Deaths: the victim survives if guarded or antidoted (both is still a
//!    save); poison kills regardless of protection.
//!
//! The Seer's inspection is a read-only query and never affects deaths.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::config::{GameConfig, WitchSelfSave};
use crate::core::{ActionDecision, NightSubmission, Player, Role, SeatId, SeatMap};
use crate::error::GameError;
use crate::events::DeathCause;

/// Everything validation needs to know about tonight.
#[derive(Clone, Copy, Debug)]
pub struct NightRules {
    pub round: u32,
    pub wolf_victim: Option<SeatId>,
    pub guard_can_self_protect: bool,
    pub witch_self_save: WitchSelfSave,
}

impl NightRules {
    #[must_use]
    pub fn from_config(config: &GameConfig, round: u32, wolf_victim: Option<SeatId>) -> Self {
        Self {
            round,
            wolf_victim,
            guard_can_self_protect: config.guard_can_self_protect,
            witch_self_save: config.witch_self_save,
        }
    }
}

/// Tonight's validated actions. Cleared at the start of every night.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightSubmissions {
    pub guard: Option<NightSubmission>,
    /// One nomination per living werewolf, seat order.
    pub wolves: Vec<NightSubmission>,
    pub wolf_victim: Option<SeatId>,
    pub witch: Option<NightSubmission>,
    pub seer: Option<NightSubmission>,
}

impl NightSubmissions {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn guarded(&self) -> Option<SeatId> {
        self.guard.and_then(|s| s.target())
    }

    #[must_use]
    pub fn antidote_used(&self) -> bool {
        matches!(
            self.witch.map(|s| s.decision),
            Some(ActionDecision::Antidote)
        )
    }

    #[must_use]
    pub fn poisoned(&self) -> Option<SeatId> {
        match self.witch.map(|s| s.decision) {
            Some(ActionDecision::Poison(seat)) => Some(seat),
            _ => None,
        }
    }
}

/// The single consistent result of a night.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightOutcome {
    pub wolf_victim: Option<SeatId>,
    pub guarded: Option<SeatId>,
    pub antidote: bool,
    pub poisoned: Option<SeatId>,
    /// Deaths in seat order. A seat appears at most once.
    pub deaths: SmallVec<[(SeatId, DeathCause); 2]>,
}

impl NightOutcome {
    /// The wolf victim, if they survived the attack.
    #[must_use]
    pub fn saved(&self) -> Option<SeatId> {
        self.wolf_victim
            .filter(|victim| !self.deaths.iter().any(|(seat, _)| seat == victim))
    }

    #[must_use]
    pub fn death_seats(&self) -> SmallVec<[SeatId; 2]> {
        self.deaths.iter().map(|(seat, _)| *seat).collect()
    }
}

pub struct NightResolver;

impl NightResolver {
    /// Check a night decision against the rules.
    ///
    /// `Skip` is always valid. Anything else that breaks a rule comes back
    /// as `InvalidTarget`; callers treat that as a skip.
    pub fn validate(
        players: &SeatMap<Player>,
        actor: &Player,
        decision: ActionDecision,
        rules: &NightRules,
    ) -> Result<ActionDecision, GameError> {
        let seat = actor.seat;
        match (actor.role, decision) {
            (_, ActionDecision::Skip) => Ok(decision),

            (Role::Guard, ActionDecision::Target(target)) => {
                living_target(players, seat, target)?;
                if actor.guard_last_target == Some(target) {
                    return Err(GameError::invalid(seat, "guard cannot protect the same seat twice in a row"));
                }
                if target == seat && !rules.guard_can_self_protect {
                    return Err(GameError::invalid(seat, "guard cannot protect itself"));
                }
                Ok(decision)
            }

            (Role::Werewolf, ActionDecision::Target(target)) => {
                living_target(players, seat, target)?;
                Ok(decision)
            }

            (Role::Seer, ActionDecision::Target(target)) => {
                living_target(players, seat, target)?;
                if target == seat {
                    return Err(GameError::invalid(seat, "seer cannot inspect itself"));
                }
                Ok(decision)
            }

            (Role::Hunter, ActionDecision::Target(target)) => {
                living_target(players, seat, target)?;
                if target == seat {
                    return Err(GameError::invalid(seat, "hunter cannot shoot itself"));
                }
                Ok(decision)
            }

            (Role::Witch, ActionDecision::Antidote) => {
                if !actor.witch_has_antidote {
                    return Err(GameError::invalid(seat, "antidote already used"));
                }
                let victim = rules
                    .wolf_victim
                    .ok_or_else(|| GameError::invalid(seat, "no wolf victim to save"))?;
                if victim == seat && !rules.witch_self_save.allows(rules.round) {
                    return Err(GameError::invalid(seat, "witch cannot save herself tonight"));
                }
                Ok(decision)
            }

            (Role::Witch, ActionDecision::Poison(target)) => {
                if !actor.witch_has_poison {
                    return Err(GameError::invalid(seat, "poison already used"));
                }
                living_target(players, seat, target)?;
                if target == seat {
                    return Err(GameError::invalid(seat, "witch cannot poison herself"));
                }
                Ok(decision)
            }

            (role, other) => Err(GameError::invalid(
                seat,
                format!("{role} cannot answer with {other:?}"),
            )),
        }
    }

    /// Pick the pack's victim from the wolves' nominations.
    ///
    /// Plurality wins. On a tie, the nominee of the lowest-seated wolf among
    /// the tied targets is chosen. No nominations means no victim.
    #[must_use]
    pub fn wolf_victim(nominations: &[NightSubmission]) -> Option<SeatId> {
        let mut ordered: Vec<&NightSubmission> = nominations.iter().collect();
        ordered.sort_by_key(|s| s.seat);

        let mut counts: FxHashMap<SeatId, u32> = FxHashMap::default();
        for target in ordered.iter().filter_map(|s| s.target()) {
            *counts.entry(target).or_insert(0) += 1;
        }
        let top = counts.values().copied().max()?;

        ordered
            .iter()
            .filter_map(|s| s.target())
            .find(|target| counts.get(target) == Some(&top))
    }

    /// Resolve the night into deaths.
    #[must_use]
    pub fn resolve(night: &NightSubmissions) -> NightOutcome {
        let wolf_victim = night.wolf_victim;
        let guarded = night.guarded();
        let antidote = night.antidote_used() && wolf_victim.is_some();
        let poisoned = night.poisoned();

        let mut deaths: SmallVec<[(SeatId, DeathCause); 2]> = SmallVec::new();

        if let Some(victim) = wolf_victim {
            let protected = guarded == Some(victim);
            if !protected && !antidote {
                deaths.push((victim, DeathCause::WolfAttack));
            }
        }

        if let Some(target) = poisoned {
            match deaths.iter_mut().find(|(seat, _)| *seat == target) {
                Some(entry) => entry.1 = DeathCause::Poison,
                None => deaths.push((target, DeathCause::Poison)),
            }
        }

        deaths.sort_by_key(|(seat, _)| *seat);

        NightOutcome {
            wolf_victim,
            guarded,
            antidote,
            poisoned,
            deaths,
        }
    }
}

fn living_target(players: &SeatMap<Player>, actor: SeatId, target: SeatId) -> Result<(), GameError> {
    if !players.contains(target) {
        return Err(GameError::invalid(actor, format!("{target} does not exist")));
    }
    if !players[target].alive {
        return Err(GameError::invalid(actor, format!("{target} is dead")));
    }
    Ok(())
}
