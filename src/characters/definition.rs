//! Character definitions - static character data.
//!
//! `CharacterDef` holds what never changes during a battle: max HP and the
//! passive skills. Current HP, pending defense and per-turn flags live on the
//! runtime `Fighter` instead.

use serde::{Deserialize, Serialize};

use super::skill::{Skill, SkillEffect, SkillTrigger};

/// Identifier of a character definition (e.g. `"liuli"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(String);

impl CharacterId {
    /// Create a new character ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Static character definition.
///
/// ## Example
///
/// ```
/// use lingcard::characters::{CharacterDef, Skill, SkillEffect, SkillTrigger};
///
/// let cafe = CharacterDef::new("cafe", 15).with_skill(Skill::passive(
///     "first_strike",
///     SkillTrigger::FirstDamageDealt,
///     SkillEffect::DamageBonus { bonus: 1 },
/// ));
///
/// assert_eq!(cafe.display_name, "cafe");
/// assert_eq!(cafe.skills_for(SkillTrigger::FirstDamageDealt).count(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDef {
    /// Unique identifier.
    pub id: CharacterId,

    /// Name shown to players; defaults to the identifier.
    pub display_name: String,

    /// Maximum and starting HP (always positive).
    pub max_hp: u32,

    /// Passive skills in configuration order.
    pub skills: Vec<Skill>,
}

impl CharacterDef {
    /// Create a character with no skills.
    pub fn new(id: impl Into<String>, max_hp: u32) -> Self {
        let id = CharacterId::new(id);
        Self {
            display_name: id.as_str().to_string(),
            id,
            max_hp,
            skills: Vec::new(),
        }
    }

    /// Set the display name (builder pattern).
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Add a skill (builder pattern).
    #[must_use]
    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    /// Skills listening for `trigger`, in configuration order.
    pub fn skills_for(&self, trigger: SkillTrigger) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(move |s| s.trigger == trigger)
    }

    /// Effects of the skills listening for `trigger`.
    pub fn effects_for(&self, trigger: SkillTrigger) -> impl Iterator<Item = &SkillEffect> {
        self.skills_for(trigger).map(|s| &s.effect)
    }
}
