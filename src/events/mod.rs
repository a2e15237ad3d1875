//! Events and observers.
//!
//! The game master reports every step to its observers as a `GameEvent`,
//! plus a full `GameSnapshot` after each transition. Presentation and
//! statistics collaborators plug in through `GameObserver`.

mod event;
mod observer;

pub use event::{ActionOutcome, DeathCause, GameEvent};
pub use observer::{EventLog, GameObserver};
