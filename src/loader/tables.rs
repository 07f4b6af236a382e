//! Validated, indexed game tables.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::cards::{ActionCard, CardEffectType, CardId, CardRegistry, TargetType};
use crate::characters::{
    CharacterDef, CharacterId, Skill, SkillEffect, SkillEffectKind, SkillKind, SkillTrigger,
    TeamEffect, TeamEffectId, TeamEffectKind,
};

use super::error::ConfigError;
use super::json::Node;

const BUILTIN_CONFIG: &str = include_str!("../../data/game_config.json");

/// Immutable lookup tables for one ruleset.
///
/// Built once by the loader and shared read-only between any number of
/// battles, typically behind an `Arc`.
///
/// ## Example
///
/// ```
/// use lingcard::cards::CardId;
/// use lingcard::characters::CharacterId;
/// use lingcard::loader::GameTables;
///
/// let tables = GameTables::builtin().unwrap();
/// assert_eq!(tables.character(&CharacterId::new("liuli")).unwrap().max_hp, 15);
/// assert_eq!(tables.card(&CardId::new("attack")).unwrap().base_value, 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GameTables {
    characters: FxHashMap<CharacterId, CharacterDef>,
    cards: CardRegistry,
    team_effects: Vec<TeamEffect>,
    team_index: FxHashMap<TeamEffectId, usize>,
}

impl GameTables {
    /// Load the tables shipped with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json_str(BUILTIN_CONFIG)
    }

    /// Load tables from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Load tables from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value(&value)
    }

    /// Load tables from an already parsed JSON document.
    pub fn from_json_value(value: &Value) -> Result<Self, ConfigError> {
        let root = Node::root(value);
        let mut tables = GameTables::default();

        for (id, node) in root.field("characters")?.entries()? {
            let character = parse_character(id, &node)?;
            tables.characters.insert(character.id.clone(), character);
        }

        for (id, node) in root.field("action_cards")?.entries()? {
            tables.cards.register(parse_card(id, &node)?);
        }

        for (id, node) in root.field("team_effects")?.entries()? {
            let team = parse_team_effect(id, &node, &tables.characters)?;
            tables.team_index.insert(team.id.clone(), tables.team_effects.len());
            tables.team_effects.push(team);
        }

        tracing::debug!(
            characters = tables.characters.len(),
            cards = tables.cards.len(),
            team_effects = tables.team_effects.len(),
            "game tables loaded"
        );
        Ok(tables)
    }

    /// Look up a character definition.
    #[must_use]
    pub fn character(&self, id: &CharacterId) -> Option<&CharacterDef> {
        self.characters.get(id)
    }

    /// Iterate over character definitions (unordered).
    pub fn characters(&self) -> impl Iterator<Item = &CharacterDef> {
        self.characters.values()
    }

    /// Look up an action card definition.
    #[must_use]
    pub fn card(&self, id: &CardId) -> Option<&ActionCard> {
        self.cards.get(id)
    }

    /// The action card registry.
    #[must_use]
    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }

    /// Look up a team effect.
    #[must_use]
    pub fn team_effect(&self, id: &TeamEffectId) -> Option<&TeamEffect> {
        self.team_index.get(id).map(|&i| &self.team_effects[i])
    }

    /// All team effects, in document order.
    pub fn team_effects(&self) -> impl Iterator<Item = &TeamEffect> {
        self.team_effects.iter()
    }

    /// Team effects of `kind` active for a roster, in document order.
    pub fn active_team_effects<'r>(
        &self,
        kind: TeamEffectKind,
        roster: impl IntoIterator<Item = &'r CharacterId> + Clone,
    ) -> Vec<&TeamEffect> {
        self.team_effects
            .iter()
            .filter(|team| team.kind == kind && team.matches(roster.clone()))
            .collect()
    }
}

fn parse_character(id: &str, node: &Node<'_>) -> Result<CharacterDef, ConfigError> {
    let max_hp = node.field("max_hp")?.as_positive()?;
    let mut character = CharacterDef::new(id, max_hp);

    if let Some(name) = node.optional("display_name")? {
        character = character.with_display_name(name.as_str()?);
    }

    if let Some(skills) = node.optional("skills")? {
        for skill in skills.elements()? {
            character = character.with_skill(parse_skill(&skill)?);
        }
    }

    Ok(character)
}

fn parse_skill(node: &Node<'_>) -> Result<Skill, ConfigError> {
    let id = node.field("name")?.as_str()?.to_string();
    let kind = match node.optional("type")? {
        Some(kind) => kind.as_enum("skill type", SkillKind::parse)?,
        None => SkillKind::Passive,
    };
    let trigger_node = node.field("trigger")?;
    let trigger = trigger_node.as_enum("trigger", SkillTrigger::parse)?;
    let effect_kind = node.field("effect")?.as_enum("effect", SkillEffectKind::parse)?;

    if !trigger.accepts(effect_kind) {
        return Err(ConfigError::invalid(
            trigger_node.path(),
            format!(
                "trigger `{}` cannot carry effect `{}`",
                trigger.as_str(),
                effect_kind.as_str()
            ),
        ));
    }

    let effect = parse_payload(effect_kind, &node.field("value")?)?;
    Ok(Skill {
        id,
        kind,
        trigger,
        effect,
    })
}

/// Decode a skill payload whose required shape depends on `kind`.
fn parse_payload(kind: SkillEffectKind, value: &Node<'_>) -> Result<SkillEffect, ConfigError> {
    match kind {
        SkillEffectKind::DamageBonus => Ok(SkillEffect::DamageBonus {
            bonus: value.as_positive()?,
        }),
        SkillEffectKind::DrawCard => Ok(SkillEffect::DrawCard {
            count: value.as_positive()?,
        }),
        SkillEffectKind::DamageRedirect => {
            value.as_positive()?;
            Ok(SkillEffect::DamageRedirect)
        }
        SkillEffectKind::LuckyCounter => {
            value.as_object()?;
            let range_node = value.field("dice_range")?;
            let range = range_node.elements()?;
            if range.len() != 2 {
                return Err(ConfigError::invalid(
                    range_node.path(),
                    format!("expected [low, high], got {} elements", range.len()),
                ));
            }
            let dice_low = range[0].as_i32()?;
            let dice_high = range[1].as_i32()?;
            if dice_low > dice_high {
                return Err(ConfigError::invalid(
                    range_node.path(),
                    format!("low {dice_low} exceeds high {dice_high}"),
                ));
            }
            let lucky_node = value.field("lucky_number")?;
            let lucky_number = lucky_node.as_i32()?;
            if !(dice_low..=dice_high).contains(&lucky_number) {
                return Err(ConfigError::invalid(
                    lucky_node.path(),
                    format!("{lucky_number} is outside [{dice_low}, {dice_high}]"),
                ));
            }
            Ok(SkillEffect::LuckyCounter {
                dice_low,
                dice_high,
                lucky_number,
                counter_damage: value.field("counter_damage")?.as_non_negative()?,
            })
        }
        SkillEffectKind::DamageReduction => {
            value.as_object()?;
            Ok(SkillEffect::DamageReduction {
                max_times: value.field("max_times")?.as_non_negative()?,
                reduction: value.field("reduction")?.as_non_negative()?,
            })
        }
    }
}

fn parse_card(id: &str, node: &Node<'_>) -> Result<ActionCard, ConfigError> {
    let target = node.field("target_type")?.as_enum("target type", TargetType::parse)?;
    let effect = node.field("effect_type")?.as_enum("effect type", CardEffectType::parse)?;
    let base_value = node.field("base_value")?.as_positive()?;
    let quantity = node.field("quantity")?.as_non_negative()?;

    Ok(ActionCard::new(id, target, effect, base_value).with_quantity(quantity))
}

fn parse_team_effect(
    id: &str,
    node: &Node<'_>,
    characters: &FxHashMap<CharacterId, CharacterDef>,
) -> Result<TeamEffect, ConfigError> {
    let pair_node = node.field("characters")?;
    let pair = pair_node.elements()?;
    if pair.len() != 2 {
        return Err(ConfigError::invalid(
            pair_node.path(),
            format!("expected exactly 2 characters, got {}", pair.len()),
        ));
    }

    let mut members = Vec::with_capacity(2);
    for member in &pair {
        let member_id = member.as_str()?;
        if !characters.contains_key(&CharacterId::new(member_id)) {
            return Err(ConfigError::UnknownReference {
                path: member.path().to_string(),
                table: "characters",
                id: member_id.to_string(),
            });
        }
        members.push(member_id);
    }
    if members[0] == members[1] {
        return Err(ConfigError::invalid(
            pair_node.path(),
            format!("pair names `{}` twice", members[0]),
        ));
    }

    let kind = node.field("effect")?.as_enum("team effect", TeamEffectKind::parse)?;
    let value = node.field("value")?.as_positive()?;

    Ok(TeamEffect::new(id, members[0], members[1], kind, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "characters": {
                "cafe": {
                    "max_hp": 15,
                    "skills": [{
                        "name": "first_strike",
                        "type": "passive",
                        "trigger": "first_damage_dealt",
                        "effect": "damage_bonus",
                        "value": 1
                    }]
                },
                "xinhe": { "max_hp": 12 }
            },
            "action_cards": {
                "attack": {
                    "target_type": "enemy",
                    "effect_type": "damage",
                    "base_value": 3,
                    "quantity": 10
                }
            },
            "team_effects": {
                "cafe_xinhe": {
                    "characters": ["cafe", "xinhe"],
                    "effect": "extra_draw",
                    "value": 2
                }
            }
        })
    }

    #[test]
    fn test_builtin_tables() {
        let tables = GameTables::builtin().unwrap();
        assert_eq!(tables.characters().count(), 5);
        assert_eq!(tables.cards().len(), 3);
        assert_eq!(tables.team_effects().count(), 3);

        let jun = tables.character(&CharacterId::new("jun")).unwrap();
        assert_eq!(jun.skills.len(), 2);
        assert_eq!(jun.display_name, "Jun");

        let liuli = tables.character(&CharacterId::new("liuli")).unwrap();
        assert_eq!(
            liuli.skills[0].effect,
            SkillEffect::LuckyCounter {
                dice_low: 1,
                dice_high: 6,
                lucky_number: 6,
                counter_damage: 2,
            }
        );
    }

    #[test]
    fn test_minimal_tables() {
        let tables = GameTables::from_json_value(&minimal()).unwrap();
        let xinhe = tables.character(&CharacterId::new("xinhe")).unwrap();
        assert_eq!(xinhe.display_name, "xinhe");
        assert!(xinhe.skills.is_empty());

        let team = tables.team_effect(&TeamEffectId::new("cafe_xinhe")).unwrap();
        assert_eq!(team.kind, TeamEffectKind::ExtraDraw);
        assert_eq!(team.value, 2);
    }

    #[test]
    fn test_active_team_effects() {
        let tables = GameTables::builtin().unwrap();
        let roster = [CharacterId::new("liuli"), CharacterId::new("jun")];

        let bonus = tables.active_team_effects(TeamEffectKind::FirstAttackBonus, roster.iter());
        assert_eq!(bonus.len(), 1);
        assert_eq!(bonus[0].id.as_str(), "jun_liuli");

        assert!(tables
            .active_team_effects(TeamEffectKind::FirstDamageImmunity, roster.iter())
            .is_empty());
        assert!(tables
            .active_team_effects(TeamEffectKind::FirstAttackBonus, roster[..1].iter())
            .is_empty());
    }

    #[test]
    fn test_missing_table() {
        let mut doc = minimal();
        doc.as_object_mut().unwrap().remove("team_effects");
        let err = GameTables::from_json_value(&doc).unwrap_err();
        assert_eq!(err.kind(), "missing_field");
        assert_eq!(err.path(), Some("team_effects"));
    }

    #[test]
    fn test_scalar_where_record_expected() {
        let mut doc = minimal();
        doc["characters"]["cafe"]["skills"][0] = json!({
            "name": "tenacity",
            "trigger": "take_damage",
            "effect": "damage_reduction",
            "value": 1
        });
        let err = GameTables::from_json_value(&doc).unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");
        assert_eq!(err.path(), Some("characters.cafe.skills[0].value"));
    }

    #[test]
    fn test_record_where_scalar_expected() {
        let mut doc = minimal();
        doc["characters"]["cafe"]["skills"][0]["value"] = json!({ "bonus": 1 });
        let err = GameTables::from_json_value(&doc).unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");
    }

    #[test]
    fn test_unsupported_pairing() {
        let mut doc = minimal();
        doc["characters"]["cafe"]["skills"][0]["trigger"] = json!("take_damage");
        let err = GameTables::from_json_value(&doc).unwrap_err();
        assert_eq!(err.kind(), "invalid_value");
        assert_eq!(err.path(), Some("characters.cafe.skills[0].trigger"));
    }

    #[test]
    fn test_unknown_team_member() {
        let mut doc = minimal();
        doc["team_effects"]["cafe_xinhe"]["characters"] = json!(["cafe", "nobody"]);
        let err = GameTables::from_json_value(&doc).unwrap_err();
        match err {
            ConfigError::UnknownReference { path, table, id } => {
                assert_eq!(path, "team_effects.cafe_xinhe.characters[1]");
                assert_eq!(table, "characters");
                assert_eq!(id, "nobody");
            }
            other => panic!("Expected UnknownReference, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_hp() {
        let mut doc = minimal();
        doc["characters"]["xinhe"]["max_hp"] = json!(0);
        let err = GameTables::from_json_value(&doc).unwrap_err();
        assert_eq!(err.kind(), "invalid_value");
    }

    #[test]
    fn test_negative_quantity() {
        let mut doc = minimal();
        doc["action_cards"]["attack"]["quantity"] = json!(-1);
        assert_eq!(GameTables::from_json_value(&doc).unwrap_err().kind(), "invalid_value");
    }

    #[test]
    fn test_zero_quantity_allowed() {
        let mut doc = minimal();
        doc["action_cards"]["attack"]["quantity"] = json!(0);
        let tables = GameTables::from_json_value(&doc).unwrap();
        assert!(tables.cards().deck_list().is_empty());
    }

    #[test]
    fn test_lucky_number_outside_range() {
        let mut doc = minimal();
        doc["characters"]["cafe"]["skills"][0] = json!({
            "name": "lucky",
            "trigger": "take_damage",
            "effect": "lucky_counter",
            "value": { "dice_range": [1, 6], "lucky_number": 7, "counter_damage": 2 }
        });
        let err = GameTables::from_json_value(&doc).unwrap_err();
        assert_eq!(err.path(), Some("characters.cafe.skills[0].value.lucky_number"));
    }

    #[test]
    fn test_malformed_json() {
        let err = GameTables::from_json_str("{ \"characters\": ").unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn test_missing_file() {
        let err = GameTables::from_path("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
