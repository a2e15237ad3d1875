//! Night phases.

use futures::FutureExt;
use tracing::{debug, info, warn};

use super::GameMaster;
use crate::core::{ActionDecision, Inspection, NightSubmission, Role, SeatId};
use crate::error::GameError;
use crate::events::{ActionOutcome, GameEvent};
use crate::rules::{NightResolver, NightRules};

impl GameMaster {
    pub(super) fn begin_night(&mut self) {
        self.state.night.clear();
        self.state.last_night_deaths.clear();
        self.state.votes.clear();
        self.state.pk_candidates.clear();
        self.state.pending_elimination = None;
        self.state.vote_resolved = false;
        self.state.revote_count = 0;
        self.state.tie = false;
        self.notify_round();
    }

    /// Ask every living holder of `role` for tonight's action and validate
    /// the answers. Invalid or missing answers become `Skip`.
    async fn night_decisions(&mut self, role: Role) -> Vec<NightSubmission> {
        let mut seats = self.state.living_with_role(role);
        if role == Role::Witch {
            seats.retain(|s| self.state.players[*s].has_potion());
        }
        let answers = self
            .gather(&seats, move |source, request| {
                async move { source.request_action(&request, role).await }.boxed()
            })
            .await;

        answers
            .into_iter()
            .map(|(seat, answer)| {
                let decision = self.validated_action(seat, answer);
                debug!(game_id = self.state.game_id, %seat, ?role, ?decision, "night decision");
                NightSubmission {
                    role,
                    seat,
                    decision,
                    sequence: self.state.next_sequence(),
                }
            })
            .collect()
    }

    pub(super) fn validated_action(&self, seat: SeatId, answer: Option<ActionDecision>) -> ActionDecision {
        let Some(decision) = answer else {
            return ActionDecision::Skip;
        };
        let Some(actor) = self.state.players.get(seat) else {
            return ActionDecision::Skip;
        };
        let rules = NightRules::from_config(&self.config, self.state.round, self.state.night.wolf_victim);

        match NightResolver::validate(&self.state.players, actor, decision, &rules) {
            Ok(decision) => decision,
            Err(err) => {
                warn!(game_id = self.state.game_id, %seat, error = %err, "treating as skip");
                ActionDecision::Skip
            }
        }
    }

    pub(super) async fn guard_action(&mut self) -> Result<(), GameError> {
        for submission in self.night_decisions(Role::Guard).await {
            let target = submission.target();
            // Skipping clears the cooldown.
            self.state.players[submission.seat].guard_last_target = target;
            self.state.night.guard = Some(submission);
            self.emit(GameEvent::NightActionResolved {
                role: Role::Guard,
                actor: submission.seat,
                target,
                outcome: if target.is_some() {
                    ActionOutcome::Protected
                } else {
                    ActionOutcome::Skipped
                },
            });
        }
        Ok(())
    }

    pub(super) async fn wolf_action(&mut self) -> Result<(), GameError> {
        let nominations = self.night_decisions(Role::Werewolf).await;
        let victim = NightResolver::wolf_victim(&nominations);

        let actor = nominations
            .iter()
            .filter(|s| victim.is_some() && s.target() == victim)
            .chain(nominations.iter())
            .map(|s| s.seat)
            .next();

        self.state.night.wolves = nominations;
        self.state.night.wolf_victim = victim;

        if let Some(actor) = actor {
            info!(game_id = self.state.game_id, round = self.state.round, ?victim, "pack decided");
            self.emit(GameEvent::NightActionResolved {
                role: Role::Werewolf,
                actor,
                target: victim,
                outcome: if victim.is_some() {
                    ActionOutcome::Attacked
                } else {
                    ActionOutcome::Skipped
                },
            });
        }
        Ok(())
    }

    pub(super) async fn witch_action(&mut self) -> Result<(), GameError> {
        for submission in self.night_decisions(Role::Witch).await {
            let witch = &mut self.state.players[submission.seat];
            let (target, outcome) = match submission.decision {
                ActionDecision::Antidote => {
                    witch.witch_has_antidote = false;
                    (self.state.night.wolf_victim, ActionOutcome::Saved)
                }
                ActionDecision::Poison(seat) => {
                    witch.witch_has_poison = false;
                    (Some(seat), ActionOutcome::Poisoned)
                }
                _ => (None, ActionOutcome::Skipped),
            };
            self.state.night.witch = Some(submission);
            self.emit(GameEvent::NightActionResolved {
                role: Role::Witch,
                actor: submission.seat,
                target,
                outcome,
            });
        }
        Ok(())
    }

    pub(super) async fn seer_action(&mut self) -> Result<(), GameError> {
        for submission in self.night_decisions(Role::Seer).await {
            let inspected = submission
                .target()
                .and_then(|t| self.state.players.get(t).map(|p| (t, p.role.alignment())));

            let outcome = match inspected {
                Some((target, alignment)) => {
                    self.state.inspections.push(Inspection {
                        round: self.state.round,
                        seer: submission.seat,
                        target,
                        alignment,
                    });
                    ActionOutcome::Inspected(alignment)
                }
                None => ActionOutcome::Skipped,
            };
            self.state.night.seer = Some(submission);
            self.emit(GameEvent::NightActionResolved {
                role: Role::Seer,
                actor: submission.seat,
                target: submission.target(),
                outcome,
            });
        }
        Ok(())
    }

    /// Apply the night's deaths in one go, then check for a winner.
    pub(super) fn resolve_night(&mut self) -> Result<(), GameError> {
        let outcome = NightResolver::resolve(&self.state.night);
        info!(
            game_id = self.state.game_id,
            round = self.state.round,
            deaths = outcome.deaths.len(),
            saved = ?outcome.saved(),
            "night resolved"
        );

        for &(seat, _) in &outcome.deaths {
            if !self.state.is_alive(seat) {
                return Err(GameError::illegal(
                    self.state.phase,
                    format!("{seat} is already dead"),
                ));
            }
        }

        for &(seat, cause) in &outcome.deaths {
            self.kill(seat, cause);
        }
        self.state.last_night_deaths = outcome.death_seats();

        if self.state.round == 1 && self.config.first_night_last_words {
            self.state.last_words.extend(outcome.death_seats());
        }

        self.check_win();
        Ok(())
    }

    /// Morning announcement.
    pub(super) fn dawn(&mut self) {
        let deaths = self.state.last_night_deaths.clone();
        if deaths.is_empty() {
            info!(game_id = self.state.game_id, round = self.state.round, "peaceful night");
        }
        self.emit(GameEvent::Dawn { deaths });
    }
}
