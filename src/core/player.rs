//! Seat identification and the per-seat player registry.
//!
//! ## SeatId
//!
//! Type-safe seat identifier. Seats are stable for a game's lifetime
//! regardless of who (human or AI) controls them.
//!
//! ## SeatMap
//!
//! Per-seat storage backed by `Vec` for O(1) access, indexable by `SeatId`.
//!
//! ## Player
//!
//! The mutable record the game master keeps for each seat: role, life,
//! role flags and badge ownership.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::role::Role;

/// Seat identifier. Seat indices are 0-based: the first seat is `SeatId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatId(pub u8);

impl SeatId {
    /// Create a new seat ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seat IDs for a table of `seat_count` seats.
    ///
    /// ```
    /// use rust_werewolf::core::SeatId;
    ///
    /// let seats: Vec<_> = SeatId::all(4).collect();
    /// assert_eq!(seats.len(), 4);
    /// assert_eq!(seats[3], SeatId::new(3));
    /// ```
    pub fn all(seat_count: usize) -> impl Iterator<Item = SeatId> {
        (0..seat_count as u8).map(SeatId)
    }

    /// Iterate over all seats clockwise, starting with the seat after `self`.
    ///
    /// The last item yielded is `self`.
    pub fn clockwise_after(self, seat_count: usize) -> impl Iterator<Item = SeatId> {
        let start = self.index() + 1;
        (0..seat_count).map(move |offset| SeatId(((start + offset) % seat_count) as u8))
    }
}

impl std::fmt::Display for SeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatMap<T> {
    data: Vec<T>,
}

impl<T> SeatMap<T> {
    /// Create a new SeatMap with values from a factory function.
    pub fn new(seat_count: usize, factory: impl Fn(SeatId) -> T) -> Self {
        assert!(seat_count > 0, "Must have at least 1 seat");
        assert!(seat_count <= 255, "At most 255 seats supported");

        let data = (0..seat_count as u8).map(|i| factory(SeatId(i))).collect();

        Self { data }
    }

    /// Build a SeatMap from an existing vector (seat `i` = element `i`).
    pub fn from_vec(data: Vec<T>) -> Self {
        assert!(!data.is_empty(), "Must have at least 1 seat");
        assert!(data.len() <= 255, "At most 255 seats supported");
        Self { data }
    }

    /// Get the number of seats.
    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.data.len()
    }

    /// Whether `seat` is a valid index into this map.
    #[must_use]
    pub fn contains(&self, seat: SeatId) -> bool {
        seat.index() < self.data.len()
    }

    /// Get a reference to a seat's data, or `None` if out of range.
    #[must_use]
    pub fn get(&self, seat: SeatId) -> Option<&T> {
        self.data.get(seat.index())
    }

    /// Get a mutable reference to a seat's data, or `None` if out of range.
    pub fn get_mut(&mut self, seat: SeatId) -> Option<&mut T> {
        self.data.get_mut(seat.index())
    }

    /// Iterate over (SeatId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (SeatId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (SeatId(i as u8), v))
    }

    /// Iterate over values in seat order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Iterate over mutable values in seat order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }
}

impl<T> Index<SeatId> for SeatMap<T> {
    type Output = T;

    fn index(&self, seat: SeatId) -> &Self::Output {
        &self.data[seat.index()]
    }
}

impl<T> IndexMut<SeatId> for SeatMap<T> {
    fn index_mut(&mut self, seat: SeatId) -> &mut Self::Output {
        &mut self.data[seat.index()]
    }
}

/// Per-seat mutable record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub seat: SeatId,
    pub name: String,
    pub role: Role,
    pub alive: bool,
    pub is_human: bool,

    /// Seat the Guard protected on the previous night it acted.
    pub guard_last_target: Option<SeatId>,
    pub witch_has_antidote: bool,
    pub witch_has_poison: bool,
    pub hunter_can_shoot: bool,

    pub holds_badge: bool,
}

impl Player {
    /// Create a living player with fresh role flags.
    #[must_use]
    pub fn new(seat: SeatId, name: impl Into<String>, role: Role, is_human: bool) -> Self {
        Self {
            seat,
            name: name.into(),
            role,
            alive: true,
            is_human,
            guard_last_target: None,
            witch_has_antidote: role == Role::Witch,
            witch_has_poison: role == Role::Witch,
            hunter_can_shoot: role == Role::Hunter,
            holds_badge: false,
        }
    }

    #[must_use]
    pub fn is_werewolf(&self) -> bool {
        self.role.is_werewolf()
    }

    /// Whether the witch still holds at least one potion.
    #[must_use]
    pub fn has_potion(&self) -> bool {
        self.witch_has_antidote || self.witch_has_poison
    }
}
