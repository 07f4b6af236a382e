//! Characters, their passive skills, and team effects.
//!
//! ## Key Types
//!
//! - `CharacterDef`: max HP plus passive skills
//! - `Skill`: trigger + tagged effect payload
//! - `TeamEffect`: bonus for fielding a specific pair

pub mod definition;
pub mod skill;
pub mod team;

pub use definition::{CharacterDef, CharacterId};
pub use skill::{Skill, SkillEffect, SkillEffectKind, SkillKind, SkillTrigger};
pub use team::{TeamEffect, TeamEffectId, TeamEffectKind};
