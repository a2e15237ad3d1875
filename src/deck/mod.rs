//! Role deck: table compositions and seat assignment.
//!
//! Every table has exactly one Seer, Witch, Hunter and Guard. The werewolf
//! count grows with the table and the remaining seats are Villagers.
//!
//! | Seats | Werewolves | Villagers |
//! |------:|-----------:|----------:|
//! | 8     | 2          | 2         |
//! | 9     | 3          | 2         |
//! | 10    | 3          | 3         |
//! | 11    | 3          | 4         |
//! | 12    | 4          | 4         |
//!
//! ```
//! use rust_werewolf::deck::RoleDeck;
//! use rust_werewolf::core::Role;
//!
//! let deck = RoleDeck::for_players(10).unwrap();
//! assert_eq!(deck.count(Role::Werewolf), 3);
//! assert_eq!(deck.count(Role::Villager), 3);
//! ```

use crate::core::config::{GameConfig, MAX_PLAYERS, MIN_PLAYERS};
use crate::core::{GameRng, Player, Role, SeatId, SeatMap};
use crate::error::ConfigError;

const SPECIALS: [Role; 4] = [Role::Seer, Role::Witch, Role::Hunter, Role::Guard];

/// Werewolves for a supported table size.
fn werewolf_count(player_count: usize) -> usize {
    match player_count {
        0..=8 => 2,
        9..=11 => 3,
        _ => 4,
    }
}

/// The multiset of roles for one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleDeck {
    roles: Vec<Role>,
}

impl RoleDeck {
    /// The composition for `player_count` seats, unshuffled.
    pub fn for_players(player_count: usize) -> Result<Self, ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(ConfigError::PlayerCount {
                count: player_count,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }

        let wolves = werewolf_count(player_count);
        let villagers = player_count - wolves - SPECIALS.len();

        let mut roles = Vec::with_capacity(player_count);
        roles.extend(std::iter::repeat(Role::Werewolf).take(wolves));
        roles.extend(SPECIALS);
        roles.extend(std::iter::repeat(Role::Villager).take(villagers));

        Ok(Self { roles })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    #[must_use]
    pub fn count(&self, role: Role) -> usize {
        self.roles.iter().filter(|r| **r == role).count()
    }

    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Shuffle the deck in place.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.roles);
    }

    /// The composition for `config`, shuffled with its seed.
    pub fn shuffled(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut deck = Self::for_players(config.player_count)?;
        let mut rng = GameRng::new(config.seed).for_context("role-deck");
        deck.shuffle(&mut rng);
        Ok(deck)
    }

    /// Shuffle with the config seed and deal one role per seat.
    ///
    /// The same config always produces the same table.
    pub fn deal(config: &GameConfig) -> Result<SeatMap<Player>, ConfigError> {
        Ok(Self::shuffled(config)?.assign(config))
    }

    /// Seat `i` receives the `i`-th role.
    #[must_use]
    pub fn assign(&self, config: &GameConfig) -> SeatMap<Player> {
        SeatMap::new(self.roles.len(), |seat: SeatId| {
            Player::new(
                seat,
                config.player_name(seat),
                self.roles[seat.index()],
                config.human_seat == Some(seat),
            )
        })
    }
}
