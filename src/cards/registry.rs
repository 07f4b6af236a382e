//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores every action card definition of a ruleset.
//! Lookup is by `CardId`; iteration follows registration order so decks are
//! built the same way on every run.

use rustc_hash::FxHashMap;

use super::definition::{ActionCard, CardId};

/// Registry of action card definitions.
///
/// ## Example
///
/// ```
/// use lingcard::cards::{ActionCard, CardEffectType, CardId, CardRegistry, TargetType};
///
/// let mut registry = CardRegistry::new();
/// registry.register(
///     ActionCard::new("attack", TargetType::Enemy, CardEffectType::Damage, 3).with_quantity(10),
/// );
///
/// let found = registry.get(&CardId::new("attack")).unwrap();
/// assert_eq!(found.base_value, 3);
/// assert_eq!(registry.deck_list().len(), 10);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, ActionCard>,
    order: Vec<CardId>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Returns the previous definition if one was registered under the same ID;
    /// the card keeps its original position in iteration order.
    pub fn register(&mut self, card: ActionCard) -> Option<ActionCard> {
        let id = card.id.clone();
        let previous = self.cards.insert(id.clone(), card);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&ActionCard> {
        self.cards.get(id)
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.contains_key(id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionCard> {
        self.order.iter().filter_map(|id| self.cards.get(id))
    }

    /// Every copy of every card, `quantity` copies each, in registration order.
    #[must_use]
    pub fn deck_list(&self) -> Vec<CardId> {
        self.iter()
            .flat_map(|card| std::iter::repeat(card.id.clone()).take(card.quantity as usize))
            .collect()
    }
}
