//! Day phases and the reactive steps that follow a death.

use futures::FutureExt;
use tracing::{debug, info, warn};

use super::GameMaster;
use crate::core::{
    BadgeTransferPolicy, Reaction, Role, RunoffFor, SeatId, Speech, SpeechKind, VoteDecision,
    VoteKind, VoteRecord,
};
use crate::error::GameError;
use crate::events::{DeathCause, GameEvent};
use crate::rules::{Ballot, VoteOutcome, VoteResolver, VoteWeights};

/// Parameters for one ballot.
struct BallotSpec {
    kind: VoteKind,
    voters: Vec<SeatId>,
    candidates: Vec<SeatId>,
    weights: VoteWeights,
    revotes_used: u32,
    max_revotes: u32,
}

impl GameMaster {
    // === Speeches ===

    /// Ask each seat in turn for a speech and append it to the transcript.
    async fn speeches(&mut self, seats: Vec<SeatId>, kind: SpeechKind) {
        for seat in seats {
            let answer = self
                .ask_one(seat, move |source, request| {
                    async move { source.request_speech(&request, kind).await }.boxed()
                })
                .await;
            let Some(text) = answer else {
                continue;
            };

            info!(
                game_id = self.state.game_id,
                round = self.state.round,
                %seat,
                ?kind,
                %text,
                "speech"
            );
            self.state.transcript.push_back(Speech {
                seat,
                kind,
                round: self.state.round,
                text,
            });
            self.emit(GameEvent::SpeechGiven { seat, kind });
        }
    }

    /// Speaking order restricted to `seats`.
    fn in_speaking_order(&self, seats: &[SeatId]) -> Vec<SeatId> {
        self.state
            .speaking_order()
            .into_iter()
            .filter(|s| seats.contains(s))
            .collect()
    }

    pub(super) async fn discussion(&mut self) -> Result<(), GameError> {
        self.state.pk_candidates.clear();
        self.state.ballot = 0;
        self.state.revote_count = 0;
        self.state.runoff = RunoffFor::Elimination;
        self.state.tie = false;

        let order = self.state.speaking_order();
        self.speeches(order, SpeechKind::Discussion).await;
        Ok(())
    }

    pub(super) async fn pk_speeches(&mut self) -> Result<(), GameError> {
        let order = self.in_speaking_order(&self.state.pk_candidates);
        self.speeches(order, SpeechKind::PkDefence).await;
        Ok(())
    }

    pub(super) async fn last_words(&mut self) -> Result<(), GameError> {
        let owed: Vec<SeatId> = self.state.last_words.drain(..).collect();
        self.speeches(owed, SpeechKind::LastWords).await;
        Ok(())
    }

    // === Ballots ===

    /// Collect one ballot, validate every vote and resolve it.
    async fn ballot(&mut self, spec: BallotSpec) -> Result<VoteOutcome, GameError> {
        let BallotSpec {
            kind,
            voters,
            candidates,
            weights,
            revotes_used,
            max_revotes,
        } = spec;
        let ballot_no = self.state.ballot;

        let asked = candidates.clone();
        let answers = self
            .gather(&voters, move |source, request| {
                let candidates = asked.clone();
                async move { source.request_vote(&request, &candidates, kind).await }.boxed()
            })
            .await;

        let records: Vec<VoteRecord> = answers
            .into_iter()
            .map(|(voter, answer)| {
                let decision = answer.unwrap_or(VoteDecision::Abstain);
                let target = match VoteResolver::validate(&self.state.players, voter, decision, &candidates) {
                    Ok(target) => target,
                    Err(err) => {
                        warn!(game_id = self.state.game_id, seat = %voter, error = %err, "vote dropped");
                        None
                    }
                };
                debug!(game_id = self.state.game_id, seat = %voter, ?target, ?kind, "vote");
                VoteRecord::new(voter, target, ballot_no)
            })
            .collect();
        self.state.votes = records;

        let (tally, outcome) = VoteResolver::resolve(&Ballot {
            kind,
            records: &self.state.votes,
            candidates: &candidates,
            weights,
            revotes_used,
            max_revotes,
        })?;

        info!(
            game_id = self.state.game_id,
            round = self.state.round,
            ?kind,
            ballot = ballot_no,
            ?outcome,
            "ballot resolved"
        );
        self.emit(GameEvent::VoteResolved {
            kind,
            ballot: ballot_no,
            tally: tally.into_counts(),
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// Voters for the current ballot: everyone alive, minus the tied seats
    /// during a runoff.
    fn eligible_voters(&self) -> Vec<SeatId> {
        let pk = &self.state.pk_candidates;
        self.state
            .living()
            .into_iter()
            .filter(|s| !pk.contains(s))
            .collect()
    }

    fn open_runoff(&mut self, leaders: Vec<SeatId>, runoff: RunoffFor) {
        self.state.pk_candidates = leaders;
        self.state.runoff = runoff;
        self.state.tie = true;
        self.state.ballot += 1;
    }

    // === Badge ===

    pub(super) async fn badge_signup(&mut self) -> Result<(), GameError> {
        self.state.badge_candidates.clear();
        self.state.pk_candidates.clear();
        self.state.badge_revote_count = 0;
        self.state.ballot = 0;
        self.state.tie = false;

        let living = self.state.living();
        let answers = self
            .gather(&living, |source, request| {
                async move { source.request_candidacy(&request).await }.boxed()
            })
            .await;

        self.state.badge_candidates = answers
            .into_iter()
            .filter(|(_, running)| *running == Some(true))
            .map(|(seat, _)| seat)
            .collect();
        info!(
            game_id = self.state.game_id,
            candidates = ?self.state.badge_candidates,
            "badge signup closed"
        );
        Ok(())
    }

    pub(super) async fn badge_speeches(&mut self) -> Result<(), GameError> {
        let order = self.in_speaking_order(&self.state.badge_candidates);
        self.speeches(order, SpeechKind::BadgeCampaign).await;
        Ok(())
    }

    pub(super) async fn badge_election(&mut self) -> Result<(), GameError> {
        self.state.tie = false;
        let runoff = !self.state.pk_candidates.is_empty();
        let candidates = if runoff {
            self.state.pk_candidates.clone()
        } else {
            self.state.badge_candidates.clone()
        };

        let elected = match candidates.len() {
            0 => {
                info!(game_id = self.state.game_id, "nobody ran for the badge");
                None
            }
            1 if !runoff => Some(candidates[0]),
            _ => {
                let voters = self.eligible_voters();
                if voters.is_empty() {
                    warn!(game_id = self.state.game_id, "no eligible badge voters, badge withheld");
                    None
                } else {
                    let outcome = self
                        .ballot(BallotSpec {
                            kind: VoteKind::BadgeElection,
                            voters,
                            candidates,
                            weights: VoteWeights::flat(),
                            revotes_used: self.state.badge_revote_count,
                            max_revotes: self.config.max_badge_revote_count,
                        })
                        .await?;
                    match outcome {
                        VoteOutcome::Elected(seat) => Some(seat),
                        VoteOutcome::Runoff(leaders) => {
                            self.state.badge_revote_count += 1;
                            self.open_runoff(leaders, RunoffFor::Badge);
                            return Ok(());
                        }
                        VoteOutcome::NoResult => None,
                    }
                }
            }
        };

        self.state.pk_candidates.clear();
        self.state.ballot = 0;
        self.state.runoff = RunoffFor::Elimination;
        if elected.is_some() {
            self.assign_badge(None, elected);
        }
        Ok(())
    }

    fn assign_badge(&mut self, from: Option<SeatId>, to: Option<SeatId>) {
        for player in self.state.players.values_mut() {
            player.holds_badge = Some(player.seat) == to;
        }
        info!(game_id = self.state.game_id, ?from, ?to, "badge assigned");
        self.emit(GameEvent::BadgeAssigned { from, to });
    }

    // === Elimination ===

    pub(super) async fn day_vote(&mut self) -> Result<(), GameError> {
        self.state.tie = false;
        self.state.pending_elimination = None;

        let runoff = !self.state.pk_candidates.is_empty();
        let candidates = if runoff {
            self.state.pk_candidates.clone()
        } else {
            self.state.living()
        };
        let voters = self.eligible_voters();
        if voters.is_empty() {
            warn!(game_id = self.state.game_id, "no eligible voters, nobody eliminated");
            self.state.pk_candidates.clear();
            return Ok(());
        }

        let outcome = self
            .ballot(BallotSpec {
                kind: VoteKind::Elimination,
                voters,
                candidates,
                weights: VoteWeights::with_badge(self.state.badge_holder(), self.config.badge_weight),
                revotes_used: self.state.revote_count,
                max_revotes: self.config.max_revote_count,
            })
            .await?;

        match outcome {
            VoteOutcome::Elected(seat) => {
                self.state.pending_elimination = Some(seat);
                self.state.pk_candidates.clear();
            }
            VoteOutcome::Runoff(leaders) => {
                self.state.revote_count += 1;
                self.open_runoff(leaders, RunoffFor::Elimination);
            }
            VoteOutcome::NoResult => self.state.pk_candidates.clear(),
        }
        Ok(())
    }

    pub(super) fn resolve_day(&mut self) -> Result<(), GameError> {
        self.state.vote_resolved = true;

        match self.state.pending_elimination.take() {
            Some(seat) => {
                if !self.state.is_alive(seat) {
                    return Err(GameError::illegal(
                        self.state.phase,
                        format!("{seat} voted out but already dead"),
                    ));
                }
                self.kill(seat, DeathCause::Vote);
                self.state.last_words.push_back(seat);
                self.check_win();
            }
            None => info!(game_id = self.state.game_id, round = self.state.round, "nobody eliminated"),
        }
        Ok(())
    }

    // === Reactions ===

    pub(super) async fn hunter_shoot(&mut self) -> Result<(), GameError> {
        let hunter = match self.state.reactions.pop_front() {
            Some(Reaction::HunterShoot(seat)) => seat,
            other => {
                return Err(GameError::illegal(
                    self.state.phase,
                    format!("expected a queued hunter shot, found {other:?}"),
                ))
            }
        };

        let answer = self
            .ask_one(hunter, |source, request| {
                async move { source.request_action(&request, Role::Hunter).await }.boxed()
            })
            .await;
        let target = self.validated_action(hunter, answer).target();
        self.state.players[hunter].hunter_can_shoot = false;

        self.emit(GameEvent::HunterShot { hunter, target });

        if let Some(target) = target {
            self.kill(target, DeathCause::HunterShot);
            self.state.last_words.push_back(target);
            self.check_win();
        }
        Ok(())
    }

    pub(super) async fn badge_transfer(&mut self) -> Result<(), GameError> {
        let holder = match self.state.reactions.pop_front() {
            Some(Reaction::BadgeTransfer(seat)) => seat,
            other => {
                return Err(GameError::illegal(
                    self.state.phase,
                    format!("expected a queued badge transfer, found {other:?}"),
                ))
            }
        };

        let successor = match self.config.badge_transfer {
            BadgeTransferPolicy::Discard => None,
            BadgeTransferPolicy::HolderChooses => {
                let living = self.state.living();
                let asked = living.clone();
                let answer = self
                    .ask_one(holder, move |source, request| {
                        let candidates = asked.clone();
                        async move {
                            source
                                .request_vote(&request, &candidates, VoteKind::BadgeTransfer)
                                .await
                        }
                        .boxed()
                    })
                    .await;

                let decision = answer.unwrap_or(VoteDecision::Abstain);
                match VoteResolver::validate(&self.state.players, holder, decision, &living) {
                    Ok(successor) => successor,
                    Err(err) => {
                        warn!(game_id = self.state.game_id, seat = %holder, error = %err, "badge torn up");
                        None
                    }
                }
            }
        };

        self.assign_badge(Some(holder), successor);
        Ok(())
    }
}
