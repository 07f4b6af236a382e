//! Action card definitions - static card data.
//!
//! An `ActionCard` is the immutable description of a card type: who it may
//! target, what it does, how strong it is, and how many copies go into a
//! deck. Copies are fungible, so hands and decks only store `CardId`s.

use serde::{Deserialize, Serialize};

/// Identifier of an action card definition (e.g. `"attack"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(String);

impl CardId {
    /// Create a new card ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Which side a card may be played on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// An alive fighter of the opposing side.
    Enemy,
    /// An alive fighter of the acting side, the actor included.
    Ally,
}

impl TargetType {
    /// Parse the configuration spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "enemy" => Some(Self::Enemy),
            "ally" => Some(Self::Ally),
            _ => None,
        }
    }
}

/// What a card does to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardEffectType {
    /// Reduce the target's HP.
    Damage,
    /// Restore the target's HP, capped at max HP.
    Heal,
    /// Reduce the next incoming damage instance against the target.
    Defense,
}

impl CardEffectType {
    /// Parse the configuration spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "damage" => Some(Self::Damage),
            "heal" => Some(Self::Heal),
            "defense" => Some(Self::Defense),
            _ => None,
        }
    }
}

/// Static action card definition.
///
/// ## Example
///
/// ```
/// use lingcard::cards::{ActionCard, CardEffectType, CardId, TargetType};
///
/// let attack = ActionCard::new("attack", TargetType::Enemy, CardEffectType::Damage, 3)
///     .with_quantity(10);
///
/// assert_eq!(attack.id, CardId::new("attack"));
/// assert!(attack.is_attack());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCard {
    /// Unique identifier.
    pub id: CardId,

    /// Legal target side.
    pub target: TargetType,

    /// Effect applied to the target.
    pub effect: CardEffectType,

    /// Effect magnitude (always positive).
    pub base_value: u32,

    /// Copies placed in each deck.
    pub quantity: u32,
}

impl ActionCard {
    /// Create a card definition with a quantity of zero.
    pub fn new(
        id: impl Into<String>,
        target: TargetType,
        effect: CardEffectType,
        base_value: u32,
    ) -> Self {
        Self {
            id: CardId::new(id),
            target,
            effect,
            base_value,
            quantity: 0,
        }
    }

    /// Set the deck quantity (builder pattern).
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Does playing this card count as an attack?
    #[must_use]
    pub fn is_attack(&self) -> bool {
        self.effect == CardEffectType::Damage
    }
}
