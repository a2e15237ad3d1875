//! Game phases and the transition table.
//!
//! Every phase has exactly one successor for a given `TransitionContext`.
//! The table is a single exhaustive match so adding a phase without wiring
//! it is a compile error.

use serde::{Deserialize, Serialize};

use super::player::SeatId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    NightStart,
    NightGuardAction,
    NightWolfAction,
    NightWitchAction,
    NightSeerAction,
    NightResolve,
    DayStart,
    DayBadgeSignup,
    DayBadgeSpeech,
    DayBadgeElection,
    DayPkSpeech,
    DaySpeech,
    DayLastWords,
    DayVote,
    DayResolve,
    BadgeTransfer,
    HunterShoot,
    GameEnd,
}

impl Phase {
    #[must_use]
    pub fn is_night(self) -> bool {
        matches!(
            self,
            Phase::NightStart
                | Phase::NightGuardAction
                | Phase::NightWolfAction
                | Phase::NightWitchAction
                | Phase::NightSeerAction
                | Phase::NightResolve
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Phase::GameEnd
    }

    /// The phase that follows `self`.
    #[must_use]
    pub fn next(self, ctx: &TransitionContext) -> Phase {
        if ctx.game_over {
            return Phase::GameEnd;
        }

        match self {
            Phase::NightStart => Phase::NightGuardAction,
            Phase::NightGuardAction => Phase::NightWolfAction,
            Phase::NightWolfAction => Phase::NightWitchAction,
            Phase::NightWitchAction => Phase::NightSeerAction,
            Phase::NightSeerAction => Phase::NightResolve,
            Phase::NightResolve => Phase::DayStart,
            Phase::DayStart => {
                if ctx.round == 1 && ctx.badge_election {
                    Phase::DayBadgeSignup
                } else {
                    ctx.follow_up()
                }
            }
            Phase::DayBadgeSignup => Phase::DayBadgeSpeech,
            Phase::DayBadgeSpeech => Phase::DayBadgeElection,
            Phase::DayBadgeElection => {
                if ctx.tie {
                    Phase::DayPkSpeech
                } else {
                    ctx.follow_up()
                }
            }
            Phase::DayPkSpeech => match ctx.runoff {
                RunoffFor::Badge => Phase::DayBadgeElection,
                RunoffFor::Elimination => Phase::DayVote,
            },
            Phase::DaySpeech => Phase::DayVote,
            Phase::DayVote => {
                if ctx.tie {
                    Phase::DayPkSpeech
                } else {
                    Phase::DayResolve
                }
            }
            Phase::DayResolve | Phase::HunterShoot | Phase::BadgeTransfer => ctx.follow_up(),
            Phase::DayLastWords => {
                if ctx.vote_resolved {
                    Phase::NightStart
                } else {
                    Phase::DaySpeech
                }
            }
            Phase::GameEnd => Phase::GameEnd,
        }
    }
}

/// A reactive step owed by a seat that just died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reaction {
    HunterShoot(SeatId),
    BadgeTransfer(SeatId),
}

impl Reaction {
    #[must_use]
    pub fn phase(self) -> Phase {
        match self {
            Reaction::HunterShoot(_) => Phase::HunterShoot,
            Reaction::BadgeTransfer(_) => Phase::BadgeTransfer,
        }
    }

    #[must_use]
    pub fn seat(self) -> SeatId {
        match self {
            Reaction::HunterShoot(seat) | Reaction::BadgeTransfer(seat) => seat,
        }
    }
}

/// Which ballot a PK runoff belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunoffFor {
    Badge,
    #[default]
    Elimination,
}

/// Everything the transition table looks at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionContext {
    pub round: u32,
    pub badge_election: bool,
    /// The ballot just cast ended in a tie that gets a PK runoff.
    pub tie: bool,
    pub runoff: RunoffFor,
    pub next_reaction: Option<Reaction>,
    pub last_words_owed: bool,
    /// Today's elimination vote has been resolved.
    pub vote_resolved: bool,
    pub game_over: bool,
}

impl TransitionContext {
    fn follow_up(&self) -> Phase {
        if let Some(reaction) = self.next_reaction {
            reaction.phase()
        } else if self.last_words_owed {
            Phase::DayLastWords
        } else if self.vote_resolved {
            Phase::NightStart
        } else {
            Phase::DaySpeech
        }
    }
}
