//! Roles, alignments and teams.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A seat's secret role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Werewolf,
    Seer,
    Witch,
    Hunter,
    Guard,
    Villager,
}

impl Role {
    #[must_use]
    pub fn is_werewolf(self) -> bool {
        matches!(self, Role::Werewolf)
    }

    /// The alignment a Seer learns when inspecting this role.
    #[must_use]
    pub fn alignment(self) -> Alignment {
        match self {
            Role::Werewolf => Alignment::Werewolf,
            Role::Seer | Role::Witch | Role::Hunter | Role::Guard | Role::Villager => {
                Alignment::Village
            }
        }
    }

    /// The team that wins alongside this role.
    #[must_use]
    pub fn team(self) -> Team {
        match self.alignment() {
            Alignment::Werewolf => Team::Wolf,
            Alignment::Village => Team::Villager,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Werewolf => write!(f, "Werewolf"),
            Role::Seer => write!(f, "Seer"),
            Role::Witch => write!(f, "Witch"),
            Role::Hunter => write!(f, "Hunter"),
            Role::Guard => write!(f, "Guard"),
            Role::Villager => write!(f, "Villager"),
        }
    }
}

/// What a Seer inspection reveals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Werewolf,
    Village,
}

/// The winning side of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Wolf,
    Villager,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Wolf => write!(f, "wolf"),
            Team::Villager => write!(f, "villager"),
        }
    }
}
