//! Ballot tallying.
//!
//! Ballots are counted in half-vote units so the badge holder's 1.5x weight
//! stays an integer. A strict single maximum wins; a shared maximum goes to
//! a PK runoff while the revote budget lasts, after which the ballot is
//! abandoned.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::BadgeWeight;
use crate::core::{Phase, Player, SeatId, SeatMap, VoteDecision, VoteKind, VoteRecord};
use crate::error::GameError;

/// One ordinary vote.
pub const HALF_VOTES_PER_VOTE: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOutcome {
    Elected(SeatId),
    /// Tied leaders go to a PK runoff.
    Runoff(Vec<SeatId>),
    /// Nobody: all abstained, or the revote budget ran out.
    NoResult,
}

/// Per-voter weights for a ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteWeights {
    badge_holder: Option<SeatId>,
    badge_half_votes: u32,
}

impl VoteWeights {
    /// Every vote counts once.
    #[must_use]
    pub fn flat() -> Self {
        Self {
            badge_holder: None,
            badge_half_votes: HALF_VOTES_PER_VOTE,
        }
    }

    /// The badge holder's vote counts per `weight`.
    #[must_use]
    pub fn with_badge(holder: Option<SeatId>, weight: BadgeWeight) -> Self {
        Self {
            badge_holder: holder,
            badge_half_votes: weight.half_votes(),
        }
    }

    #[must_use]
    pub fn of(&self, voter: SeatId) -> u32 {
        if self.badge_holder == Some(voter) {
            self.badge_half_votes
        } else {
            HALF_VOTES_PER_VOTE
        }
    }
}

/// Votes per candidate, in half-votes, seat order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    counts: Vec<(SeatId, u32)>,
}

impl Tally {
    #[must_use]
    pub fn counts(&self) -> &[(SeatId, u32)] {
        &self.counts
    }

    #[must_use]
    pub fn top(&self) -> u32 {
        self.counts.iter().map(|(_, n)| *n).max().unwrap_or(0)
    }

    /// Every candidate sharing the maximum, seat order.
    #[must_use]
    pub fn leaders(&self) -> Vec<SeatId> {
        let top = self.top();
        if top == 0 {
            return Vec::new();
        }
        self.counts
            .iter()
            .filter(|(_, n)| *n == top)
            .map(|(seat, _)| *seat)
            .collect()
    }

    #[must_use]
    pub fn into_counts(self) -> Vec<(SeatId, u32)> {
        self.counts
    }
}

/// Input for resolving one ballot.
#[derive(Clone, Copy, Debug)]
pub struct Ballot<'a> {
    pub kind: VoteKind,
    pub records: &'a [VoteRecord],
    pub candidates: &'a [SeatId],
    pub weights: VoteWeights,
    /// Runoffs already held for this vote.
    pub revotes_used: u32,
    pub max_revotes: u32,
}

pub struct VoteResolver;

impl VoteResolver {
    /// Check a ballot against the candidate list. `Ok(None)` is an abstention.
    pub fn validate(
        players: &SeatMap<Player>,
        voter: SeatId,
        decision: VoteDecision,
        candidates: &[SeatId],
    ) -> Result<Option<SeatId>, GameError> {
        match decision {
            VoteDecision::Abstain => Ok(None),
            VoteDecision::Target(target) => {
                if !candidates.contains(&target) {
                    return Err(GameError::invalid(voter, format!("{target} is not a candidate")));
                }
                if !players.get(target).is_some_and(|p| p.alive) {
                    return Err(GameError::invalid(voter, format!("{target} is dead")));
                }
                Ok(Some(target))
            }
        }
    }

    /// Count the records for the given candidates.
    #[must_use]
    pub fn tally(records: &[VoteRecord], candidates: &[SeatId], weights: &VoteWeights) -> Tally {
        let mut totals: FxHashMap<SeatId, u32> = FxHashMap::default();
        for record in records {
            if let Some(target) = record.target.filter(|t| candidates.contains(t)) {
                *totals.entry(target).or_insert(0) += weights.of(record.voter);
            }
        }

        let mut counts: Vec<(SeatId, u32)> = totals.into_iter().collect();
        counts.sort_by_key(|(seat, _)| *seat);
        Tally { counts }
    }

    /// Tally a ballot and decide its outcome.
    ///
    /// A ballot with no records at all is an internal error: the game master
    /// must never open a ballot nobody can vote in.
    pub fn resolve(ballot: &Ballot<'_>) -> Result<(Tally, VoteOutcome), GameError> {
        if ballot.records.is_empty() {
            let phase = match ballot.kind {
                VoteKind::BadgeElection => Phase::DayBadgeElection,
                VoteKind::Elimination => Phase::DayVote,
                VoteKind::BadgeTransfer => Phase::BadgeTransfer,
            };
            return Err(GameError::illegal(phase, "ballot resolved with zero submissions"));
        }

        let tally = Self::tally(ballot.records, ballot.candidates, &ballot.weights);
        let leaders = tally.leaders();

        let outcome = match leaders.as_slice() {
            [] => VoteOutcome::NoResult,
            [winner] => VoteOutcome::Elected(*winner),
            _ if ballot.revotes_used < ballot.max_revotes => VoteOutcome::Runoff(leaders),
            _ => VoteOutcome::NoResult,
        };

        Ok((tally, outcome))
    }
}
