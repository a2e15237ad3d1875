//! Win conditions.
//!
//! Checked after every mutation that lowers the living count, and only once
//! all of that step's deaths are applied.

use crate::core::{Player, SeatMap, Team};

/// Living seats split by alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Census {
    pub wolves: usize,
    pub others: usize,
}

impl Census {
    #[must_use]
    pub fn of(players: &SeatMap<Player>) -> Self {
        players
            .values()
            .filter(|p| p.alive)
            .fold(Census::default(), |mut census, p| {
                if p.role.team() == Team::Wolf {
                    census.wolves += 1;
                } else {
                    census.others += 1;
                }
                census
            })
    }
}

pub struct WinEvaluator;

impl WinEvaluator {
    /// The winning team, or `None` while the game continues.
    ///
    /// Villagers win when no werewolf lives; werewolves win at parity. The
    /// villager check runs first, so an empty table is a villager win.
    #[must_use]
    pub fn evaluate(players: &SeatMap<Player>) -> Option<Team> {
        let census = Census::of(players);
        if census.wolves == 0 {
            Some(Team::Villager)
        } else if census.wolves >= census.others {
            Some(Team::Wolf)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Role, SeatId};

    fn players(roles: &[Role]) -> SeatMap<Player> {
        SeatMap::new(roles.len(), |s| Player::new(s, "p", roles[s.index()], false))
    }

    fn kill(players: &mut SeatMap<Player>, seats: &[u8]) {
        for &seat in seats {
            players[SeatId::new(seat)].alive = false;
        }
    }

    #[test]
    fn test_game_continues() {
        let p = players(&[Role::Werewolf, Role::Seer, Role::Villager]);
        assert_eq!(WinEvaluator::evaluate(&p), None);
        assert_eq!(Census::of(&p), Census { wolves: 1, others: 2 });
    }

    #[test]
    fn test_villagers_win_when_wolves_gone() {
        let mut p = players(&[Role::Werewolf, Role::Werewolf, Role::Seer, Role::Villager]);
        kill(&mut p, &[0, 1]);
        assert_eq!(WinEvaluator::evaluate(&p), Some(Team::Villager));
    }

    #[test]
    fn test_wolves_win_at_parity() {
        let mut p = players(&[Role::Werewolf, Role::Werewolf, Role::Seer, Role::Villager, Role::Guard]);
        assert_eq!(WinEvaluator::evaluate(&p), None);
        kill(&mut p, &[4]);
        assert_eq!(WinEvaluator::evaluate(&p), Some(Team::Wolf));
    }

    #[test]
    fn test_empty_table_is_villager_win() {
        let mut p = players(&[Role::Werewolf, Role::Villager]);
        kill(&mut p, &[0, 1]);
        assert_eq!(WinEvaluator::evaluate(&p), Some(Team::Villager));
    }
}
