//! Team effects: bonuses for fielding a specific pair of characters.
//!
//! Team effects are never stored on a side. Whether one is active is derived
//! on demand from the side's alive roster, so a pair stops working the
//! moment one of its members is downed.

use serde::{Deserialize, Serialize};

use super::definition::CharacterId;

/// Identifier of a team effect (e.g. `"jun_liuli"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamEffectId(String);

impl TeamEffectId {
    /// Create a new team effect ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TeamEffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an active team effect grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamEffectKind {
    /// Add `value` to the side's first attack each turn.
    FirstAttackBonus,
    /// Draw `value` extra cards at turn start.
    ExtraDraw,
    /// Negate the first damage instance the side receives each turn.
    FirstDamageImmunity,
}

impl TeamEffectKind {
    /// Parse the configuration spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "first_attack_bonus" => Some(Self::FirstAttackBonus),
            "extra_draw" => Some(Self::ExtraDraw),
            "first_damage_immunity" => Some(Self::FirstDamageImmunity),
            _ => None,
        }
    }
}

/// A configured team effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEffect {
    /// Unique identifier.
    pub id: TeamEffectId,

    /// The two required characters, sorted.
    members: [CharacterId; 2],

    /// Granted effect.
    pub kind: TeamEffectKind,

    /// Effect magnitude.
    pub value: u32,
}

impl TeamEffect {
    /// Create a team effect. Member order does not matter.
    pub fn new(
        id: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
        kind: TeamEffectKind,
        value: u32,
    ) -> Self {
        let mut members = [CharacterId::new(first), CharacterId::new(second)];
        members.sort();
        Self {
            id: TeamEffectId::new(id),
            members,
            kind,
            value,
        }
    }

    /// The required pair, sorted.
    #[must_use]
    pub fn members(&self) -> &[CharacterId; 2] {
        &self.members
    }

    /// Is the effect active for a roster containing these characters?
    ///
    /// ```
    /// use lingcard::characters::{CharacterId, TeamEffect, TeamEffectKind};
    ///
    /// let pair = TeamEffect::new("jun_liuli", "liuli", "jun", TeamEffectKind::FirstAttackBonus, 1);
    /// let roster = [CharacterId::new("jun"), CharacterId::new("liuli")];
    /// assert!(pair.matches(roster.iter()));
    /// assert!(!pair.matches(roster[..1].iter()));
    /// ```
    pub fn matches<'a>(&self, roster: impl IntoIterator<Item = &'a CharacterId> + Clone) -> bool {
        self.members
            .iter()
            .all(|member| roster.clone().into_iter().any(|id| id == member))
    }
}
