//! Battle setup: who fights, under which rules.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::characters::CharacterId;
use crate::core::{EngineConfig, SideId, SideMap};

/// Everything needed to start a battle besides the tables and the seed.
///
/// ## Example
///
/// ```
/// use lingcard::core::{EngineConfig, SideId};
/// use lingcard::rules::BattleSetup;
///
/// let setup = BattleSetup::new(["cafe", "xinhe"], ["jun", "liuli"])
///     .with_config(EngineConfig::new().with_opening_hand(2))
///     .with_first_side(SideId::SECOND);
///
/// assert_eq!(setup.roster(SideId::SECOND).len(), 2);
/// assert_eq!(setup.config.opening_hand, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSetup {
    /// Character IDs per side, in slot order.
    pub rosters: SideMap<Vec<CharacterId>>,

    /// Rule knobs.
    pub config: EngineConfig,

    /// The side that takes the first turn.
    pub first_side: SideId,

    /// Explicit deck order per side, front drawn first. Sides without one
    /// get the full shuffled deck list.
    pub stacked_decks: SideMap<Option<Vec<CardId>>>,
}

impl BattleSetup {
    /// Create a setup with default rules.
    pub fn new(
        first: impl IntoIterator<Item = impl Into<CharacterId>>,
        second: impl IntoIterator<Item = impl Into<CharacterId>>,
    ) -> Self {
        Self {
            rosters: SideMap::from_pair(
                first.into_iter().map(Into::into).collect(),
                second.into_iter().map(Into::into).collect(),
            ),
            config: EngineConfig::default(),
            first_side: SideId::FIRST,
            stacked_decks: SideMap::with_default(),
        }
    }

    /// Set the engine configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set who moves first (builder pattern).
    #[must_use]
    pub fn with_first_side(mut self, side: SideId) -> Self {
        self.first_side = side;
        self
    }

    /// Give `side` a fixed deck instead of a shuffled one (builder pattern).
    #[must_use]
    pub fn with_stacked_deck(
        mut self,
        side: SideId,
        cards: impl IntoIterator<Item = impl Into<CardId>>,
    ) -> Self {
        self.stacked_decks[side] = Some(cards.into_iter().map(Into::into).collect());
        self
    }

    /// The roster of one side.
    #[must_use]
    pub fn roster(&self, side: SideId) -> &[CharacterId] {
        &self.rosters[side]
    }
}
