//! Side identification and per-side data storage.
//!
//! ## SideId
//!
//! A battle always has exactly two sides. `SideId(0)` moves first unless the
//! battle setup says otherwise.
//!
//! ## SideMap
//!
//! Per-side data backed by a fixed two-element array for O(1) access.
//! Supports iteration and indexing by `SideId`.
//!
//! ## FighterRef
//!
//! Addresses one character on the field: its side plus its roster slot.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two sides of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SideId(u8);

impl SideId {
    /// The side that moves first by default.
    pub const FIRST: SideId = SideId(0);

    /// The other side.
    pub const SECOND: SideId = SideId(1);

    /// Create a side ID from an index.
    ///
    /// Returns `None` for anything other than 0 or 1.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index < 2 {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Get the side index (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Both sides, in index order.
    ///
    /// ```
    /// use lingcard::core::SideId;
    ///
    /// let sides: Vec<_> = SideId::both().collect();
    /// assert_eq!(sides, vec![SideId::FIRST, SideId::SECOND]);
    /// ```
    pub fn both() -> impl Iterator<Item = SideId> {
        [SideId::FIRST, SideId::SECOND].into_iter()
    }
}

impl std::fmt::Display for SideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Side {}", self.0)
    }
}

/// A character on the field: side plus roster slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FighterRef {
    /// Owning side.
    pub side: SideId,
    /// Position in that side's roster.
    pub slot: u8,
}

impl FighterRef {
    /// Create a fighter reference.
    #[must_use]
    pub const fn new(side: SideId, slot: u8) -> Self {
        Self { side, slot }
    }

    /// Slot as a roster index.
    #[must_use]
    pub const fn slot_index(self) -> usize {
        self.slot as usize
    }
}

impl std::fmt::Display for FighterRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.side, self.slot)
    }
}

/// Per-side data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use lingcard::core::{SideId, SideMap};
///
/// let mut hp: SideMap<u32> = SideMap::with_value(15);
/// hp[SideId::SECOND] = 12;
///
/// assert_eq!(hp[SideId::FIRST], 15);
/// assert_eq!(hp[SideId::SECOND], 12);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: [T; 2],
}

impl<T> SideMap<T> {
    /// Create a SideMap with values from a factory function.
    pub fn new(mut factory: impl FnMut(SideId) -> T) -> Self {
        Self {
            data: [factory(SideId::FIRST), factory(SideId::SECOND)],
        }
    }

    /// Create a SideMap from explicit values, first side first.
    pub fn from_pair(first: T, second: T) -> Self {
        Self {
            data: [first, second],
        }
    }

    /// Create a SideMap with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Create a SideMap with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Get a reference to a side's data.
    #[must_use]
    pub fn get(&self, side: SideId) -> &T {
        &self.data[side.index()]
    }

    /// Get a mutable reference to a side's data.
    pub fn get_mut(&mut self, side: SideId) -> &mut T {
        &mut self.data[side.index()]
    }

    /// Iterate over (SideId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (SideId, &T)> {
        SideId::both().zip(self.data.iter())
    }

    /// Iterate over (SideId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SideId, &mut T)> {
        SideId::both().zip(self.data.iter_mut())
    }

    /// Map each entry to a new value.
    pub fn map<U>(&self, mut f: impl FnMut(SideId, &T) -> U) -> SideMap<U> {
        SideMap::new(|side| f(side, self.get(side)))
    }
}

impl<T> Index<SideId> for SideMap<T> {
    type Output = T;

    fn index(&self, side: SideId) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<SideId> for SideMap<T> {
    fn index_mut(&mut self, side: SideId) -> &mut Self::Output {
        self.get_mut(side)
    }
}
