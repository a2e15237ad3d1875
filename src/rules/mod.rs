//! Game rules: night resolution, ballots and win conditions.
//!
//! These are pure functions over the player registry and the buffered
//! submissions. The game master decides *when* to call them; the rules
//! decide *what* happens.

mod night;
mod vote;
mod win;

pub use night::{NightOutcome, NightResolver, NightRules, NightSubmissions};
pub use vote::{Ballot, Tally, VoteOutcome, VoteResolver, VoteWeights, HALF_VOTES_PER_VOTE};
pub use win::{Census, WinEvaluator};
