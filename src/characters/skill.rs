//! Passive skill descriptors.
//!
//! A skill pairs a [`SkillTrigger`] (the event it listens for) with a
//! [`SkillEffect`] (what happens). The effect payload is a tagged union, so
//! a `lucky_counter` always carries its dice and a `damage_reduction` always
//! carries its limits; shapes are checked once when tables load.

use serde::{Deserialize, Serialize};

/// Skill kind. The rules only know passive skills.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Fires automatically when its trigger condition holds.
    #[default]
    Passive,
}

impl SkillKind {
    /// Parse the configuration spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "passive" => Some(Self::Passive),
            _ => None,
        }
    }
}

/// Event a passive skill listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTrigger {
    /// The holder deals the first damage of its side's turn.
    FirstDamageDealt,
    /// The holder's side ends its turn without playing a card.
    TurnEndNoSkill,
    /// The opposing side's previous turn contained no attack card.
    OpponentNoAttack,
    /// The holder is about to take damage.
    TakeDamage,
    /// A teammate of the holder is about to take damage.
    TeammateTakeDamage,
}

impl SkillTrigger {
    /// Parse the configuration spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "first_damage_dealt" => Some(Self::FirstDamageDealt),
            "turn_end_no_skill" => Some(Self::TurnEndNoSkill),
            "opponent_no_attack" => Some(Self::OpponentNoAttack),
            "take_damage" => Some(Self::TakeDamage),
            "teammate_take_damage" => Some(Self::TeammateTakeDamage),
            _ => None,
        }
    }

    /// Configuration spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstDamageDealt => "first_damage_dealt",
            Self::TurnEndNoSkill => "turn_end_no_skill",
            Self::OpponentNoAttack => "opponent_no_attack",
            Self::TakeDamage => "take_damage",
            Self::TeammateTakeDamage => "teammate_take_damage",
        }
    }

    /// Can a skill with this trigger carry an effect of `kind`?
    #[must_use]
    pub fn accepts(self, kind: SkillEffectKind) -> bool {
        use SkillEffectKind as K;
        matches!(
            (self, kind),
            (Self::FirstDamageDealt, K::DamageBonus)
                | (Self::TurnEndNoSkill, K::DrawCard)
                | (Self::OpponentNoAttack, K::DrawCard)
                | (Self::TakeDamage, K::LuckyCounter)
                | (Self::TakeDamage, K::DamageReduction)
                | (Self::TeammateTakeDamage, K::DamageRedirect)
        )
    }
}

/// Effect kind without its payload, as named in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillEffectKind {
    DamageBonus,
    DrawCard,
    LuckyCounter,
    DamageReduction,
    DamageRedirect,
}

impl SkillEffectKind {
    /// Parse the configuration spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "damage_bonus" => Some(Self::DamageBonus),
            "draw_card" => Some(Self::DrawCard),
            "lucky_counter" => Some(Self::LuckyCounter),
            "damage_reduction" => Some(Self::DamageReduction),
            "damage_redirect" => Some(Self::DamageRedirect),
            _ => None,
        }
    }

    /// Configuration spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DamageBonus => "damage_bonus",
            Self::DrawCard => "draw_card",
            Self::LuckyCounter => "lucky_counter",
            Self::DamageReduction => "damage_reduction",
            Self::DamageRedirect => "damage_redirect",
        }
    }
}

/// Effect of a passive skill together with its payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkillEffect {
    /// Add `bonus` to the first damage the holder deals each turn.
    DamageBonus { bonus: u32 },

    /// Draw `count` cards.
    DrawCard { count: u32 },

    /// Roll in `[dice_low, dice_high]`; on `lucky_number` negate the hit and
    /// deal `counter_damage` back to the attacker.
    LuckyCounter {
        dice_low: i32,
        dice_high: i32,
        lucky_number: i32,
        counter_damage: u32,
    },

    /// Reduce each incoming hit by `reduction`, at most `max_times` per turn.
    DamageReduction { max_times: u32, reduction: u32 },

    /// Take a hit in place of a teammate, once per turn.
    DamageRedirect,
}

impl SkillEffect {
    /// The payload-free kind.
    #[must_use]
    pub fn kind(&self) -> SkillEffectKind {
        match self {
            Self::DamageBonus { .. } => SkillEffectKind::DamageBonus,
            Self::DrawCard { .. } => SkillEffectKind::DrawCard,
            Self::LuckyCounter { .. } => SkillEffectKind::LuckyCounter,
            Self::DamageReduction { .. } => SkillEffectKind::DamageReduction,
            Self::DamageRedirect => SkillEffectKind::DamageRedirect,
        }
    }
}

/// A passive skill as configured on a character.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Skill {
    /// Identifier, unique within the owning character.
    pub id: String,

    /// Always passive.
    pub kind: SkillKind,

    /// When the skill fires.
    pub trigger: SkillTrigger,

    /// What the skill does.
    pub effect: SkillEffect,
}

impl Skill {
    /// Create a passive skill.
    pub fn passive(id: impl Into<String>, trigger: SkillTrigger, effect: SkillEffect) -> Self {
        Self {
            id: id.into(),
            kind: SkillKind::Passive,
            trigger,
            effect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_round_trip_names() {
        for raw in [
            "first_damage_dealt",
            "turn_end_no_skill",
            "opponent_no_attack",
            "take_damage",
            "teammate_take_damage",
        ] {
            assert_eq!(SkillTrigger::parse(raw).map(SkillTrigger::as_str), Some(raw));
        }
        assert_eq!(SkillTrigger::parse("on_heal"), None);
    }

    #[test]
    fn test_trigger_pairings() {
        assert!(SkillTrigger::TakeDamage.accepts(SkillEffectKind::LuckyCounter));
        assert!(SkillTrigger::TakeDamage.accepts(SkillEffectKind::DamageReduction));
        assert!(SkillTrigger::OpponentNoAttack.accepts(SkillEffectKind::DrawCard));
        assert!(!SkillTrigger::TakeDamage.accepts(SkillEffectKind::DrawCard));
        assert!(!SkillTrigger::FirstDamageDealt.accepts(SkillEffectKind::DamageRedirect));
    }

    #[test]
    fn test_effect_kind() {
        let effect = SkillEffect::DamageReduction {
            max_times: 2,
            reduction: 1,
        };
        assert_eq!(effect.kind(), SkillEffectKind::DamageReduction);
        assert_eq!(effect.kind().as_str(), "damage_reduction");
        assert_eq!(SkillEffect::DamageRedirect.kind(), SkillEffectKind::DamageRedirect);
    }

    #[test]
    fn test_effect_serialization_is_tagged() {
        let effect = SkillEffect::DamageBonus { bonus: 1 };
        let json = serde_json::to_string(&effect).unwrap();
        assert_eq!(json, r#"{"kind":"damage_bonus","bonus":1}"#);
    }
}
