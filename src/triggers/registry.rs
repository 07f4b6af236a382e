//! Passive skill registry.
//!
//! Built once per battle from both rosters. Skills are indexed by trigger so
//! the resolver asks "who on this side listens for `take_damage`?" without
//! walking every character's skill list.

use rustc_hash::FxHashMap;

use crate::characters::{CharacterDef, Skill, SkillEffect, SkillTrigger};
use crate::core::{FighterRef, SideId};

/// One passive skill bound to the fighter holding it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassiveEntry {
    /// The fighter holding the skill.
    pub holder: FighterRef,
    /// Skill identifier, for event reporting.
    pub skill: String,
    /// What the skill does.
    pub effect: SkillEffect,
}

/// Passive skills of a battle, indexed by trigger.
///
/// Within a trigger, entries are ordered by side, then slot, then the
/// skill's position on its character.
///
/// ## Example
///
/// ```
/// use lingcard::characters::{CharacterDef, Skill, SkillEffect, SkillTrigger};
/// use lingcard::core::{FighterRef, SideId};
/// use lingcard::triggers::PassiveRegistry;
///
/// let cafe = CharacterDef::new("cafe", 15).with_skill(Skill::passive(
///     "first_strike",
///     SkillTrigger::FirstDamageDealt,
///     SkillEffect::DamageBonus { bonus: 1 },
/// ));
///
/// let mut registry = PassiveRegistry::new();
/// registry.register_fighter(FighterRef::new(SideId::FIRST, 0), &cafe);
///
/// let holder = FighterRef::new(SideId::FIRST, 0);
/// assert_eq!(registry.for_holder(holder, SkillTrigger::FirstDamageDealt).count(), 1);
/// assert_eq!(registry.for_holder(holder, SkillTrigger::TakeDamage).count(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PassiveRegistry {
    by_trigger: FxHashMap<SkillTrigger, Vec<PassiveEntry>>,
}

impl PassiveRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one skill for `holder`.
    pub fn register(&mut self, holder: FighterRef, skill: &Skill) {
        let entries = self.by_trigger.entry(skill.trigger).or_default();
        entries.push(PassiveEntry {
            holder,
            skill: skill.id.clone(),
            effect: skill.effect.clone(),
        });
        entries.sort_by_key(|entry| entry.holder);
    }

    /// Register every skill of a character placed at `holder`.
    pub fn register_fighter(&mut self, holder: FighterRef, character: &CharacterDef) {
        for skill in &character.skills {
            self.register(holder, skill);
        }
    }

    /// All entries listening for `trigger`.
    #[must_use]
    pub fn listeners(&self, trigger: SkillTrigger) -> &[PassiveEntry] {
        self.by_trigger.get(&trigger).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries of one fighter listening for `trigger`.
    pub fn for_holder(
        &self,
        holder: FighterRef,
        trigger: SkillTrigger,
    ) -> impl Iterator<Item = &PassiveEntry> {
        self.listeners(trigger)
            .iter()
            .filter(move |entry| entry.holder == holder)
    }

    /// Entries of one side listening for `trigger`, in slot order.
    pub fn on_side(&self, side: SideId, trigger: SkillTrigger) -> impl Iterator<Item = &PassiveEntry> {
        self.listeners(trigger)
            .iter()
            .filter(move |entry| entry.holder.side == side)
    }

    /// Total registered skills.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_trigger.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
