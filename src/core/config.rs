//! Engine configuration.
//!
//! The data tables (characters, cards, team effects) say *what* exists.
//! `EngineConfig` says how a battle runs: how many cards are drawn, how many
//! plays a turn allows, what happens when a deck runs dry.
//!
//! All fields have defaults, so a partial JSON object is a valid config:
//!
//! ```
//! use lingcard::core::{DeckPolicy, EngineConfig};
//!
//! let config: EngineConfig = serde_json::from_str(r#"{ "base_draw": 2 }"#).unwrap();
//! assert_eq!(config.base_draw, 2);
//! assert_eq!(config.deck_policy, DeckPolicy::Finite);
//! ```

use serde::{Deserialize, Serialize};

/// What happens when a draw hits an empty deck.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckPolicy {
    /// Drawing from an empty deck does nothing.
    #[default]
    Finite,
    /// Shuffle the discard pile back into the deck, then keep drawing.
    ReshuffleDiscard,
}

/// Rule knobs for a battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cards drawn by the active side at the start of each turn.
    pub base_draw: u32,

    /// Cards each side draws before the first turn.
    pub opening_hand: u32,

    /// Cards the active side may play before its turn ends automatically.
    pub max_plays_per_turn: usize,

    /// Empty-deck behavior.
    pub deck_policy: DeckPolicy,

    /// Largest roster a side may field.
    pub max_roster: usize,

    /// Battle ends in a draw once this many turns have completed.
    /// `None` for no limit.
    pub turn_limit: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_draw: 3,
            opening_hand: 0,
            max_plays_per_turn: 1,
            deck_policy: DeckPolicy::Finite,
            max_roster: 2,
            turn_limit: None,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-turn draw.
    #[must_use]
    pub fn with_base_draw(mut self, count: u32) -> Self {
        self.base_draw = count;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_opening_hand(mut self, count: u32) -> Self {
        self.opening_hand = count;
        self
    }

    /// Set how many cards a turn allows. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_plays_per_turn(mut self, plays: usize) -> Self {
        self.max_plays_per_turn = plays.max(1);
        self
    }

    /// Set the empty-deck policy.
    #[must_use]
    pub fn with_deck_policy(mut self, policy: DeckPolicy) -> Self {
        self.deck_policy = policy;
        self
    }

    /// Set the largest allowed roster.
    #[must_use]
    pub fn with_max_roster(mut self, size: usize) -> Self {
        self.max_roster = size;
        self
    }

    /// End the battle in a draw after `turns` completed turns.
    #[must_use]
    pub fn with_turn_limit(mut self, turns: u32) -> Self {
        self.turn_limit = Some(turns);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.base_draw, 3);
        assert_eq!(config.opening_hand, 0);
        assert_eq!(config.max_plays_per_turn, 1);
        assert_eq!(config.deck_policy, DeckPolicy::Finite);
        assert_eq!(config.max_roster, 2);
        assert_eq!(config.turn_limit, None);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_base_draw(1)
            .with_opening_hand(4)
            .with_max_plays_per_turn(0)
            .with_deck_policy(DeckPolicy::ReshuffleDiscard)
            .with_max_roster(1)
            .with_turn_limit(30);

        assert_eq!(config.base_draw, 1);
        assert_eq!(config.opening_hand, 4);
        assert_eq!(config.max_plays_per_turn, 1);
        assert_eq!(config.deck_policy, DeckPolicy::ReshuffleDiscard);
        assert_eq!(config.max_roster, 1);
        assert_eq!(config.turn_limit, Some(30));
    }

    #[test]
    fn test_partial_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "deck_policy": "reshuffle_discard", "turn_limit": 12 }"#)
                .unwrap();
        assert_eq!(config.deck_policy, DeckPolicy::ReshuffleDiscard);
        assert_eq!(config.turn_limit, Some(12));
        assert_eq!(config.base_draw, 3);
    }

    #[test]
    fn test_draw_counts_out_of_range() {
        let big = serde_json::from_str::<EngineConfig>(r#"{ "opening_hand": 4294967296 }"#);
        assert!(big.is_err());

        let negative = serde_json::from_str::<EngineConfig>(r#"{ "base_draw": -1 }"#);
        assert!(negative.is_err());

        let max: EngineConfig = serde_json::from_str(r#"{ "base_draw": 4294967295 }"#).unwrap();
        assert_eq!(max.base_draw, u32::MAX);
    }
}
