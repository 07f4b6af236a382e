//! # lingcard
//!
//! A deterministic rules engine for a two-side battle game. Each side fields
//! up to two characters and draws action cards (attack, heal, defend) from a
//! shared deck list. Characters carry passive skills; specific pairs unlock
//! team effects.
//!
//! ## Design Principles
//!
//! 1. **Data-Driven**: Characters, cards and team effects come from a JSON
//!    document validated up front. Nothing about a specific character is
//!    hardcoded in the engine.
//!
//! 2. **Deterministic**: Every random draw goes through a seeded
//!    [`GameRng`] stream or an injected [`Judge`](core::Judge). Same seed,
//!    same setup and same actions give the same battle.
//!
//! 3. **Observable**: Every state change is reported as a
//!    [`BattleEvent`], in resolution order.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: Decks and hands use `im-rs`, so cloning
//!   a [`BattleState`](core::BattleState) for look-ahead is cheap.
//!
//! - **Single Entry Point**: [`Battle::submit`] validates an action, applies
//!   it, advances the turn cycle and returns the events it produced. A
//!   rejected action leaves the battle untouched.
//!
//! ## Modules
//!
//! - `loader`: JSON config validation into [`GameTables`]
//! - `characters`: Character definitions, passive skills, team effects
//! - `cards`: Action card definitions and registry
//! - `core`: Sides, battle state, actions, errors, RNG, configuration
//! - `effects`: Effect resolution (the damage pipeline)
//! - `triggers`: Battle events and the passive skill registry
//! - `rules`: Setup and the turn controller
//! - `policy`: Automated players

pub mod cards;
pub mod characters;
pub mod core;
pub mod effects;
pub mod loader;
pub mod policy;
pub mod rules;
pub mod triggers;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord,
    EngineConfig, EngineError, RuleViolation,
    FighterRef, SideId, SideMap,
    GameRng, GameRngState,
};

pub use crate::cards::{ActionCard, CardEffectType, CardId, TargetType};

pub use crate::characters::{CharacterDef, CharacterId, TeamEffectKind};

pub use crate::loader::{ConfigError, GameTables};

pub use crate::rules::{Battle, BattleResult, BattleSetup};

pub use crate::triggers::BattleEvent;

pub use crate::policy::{GreedyPolicy, Policy, RandomPolicy};
