//! Core battle types: sides, state, actions, errors, RNG, configuration.
//!
//! These are the building blocks the resolver and turn controller share.
//! Nothing here knows about the damage pipeline or turn order.

pub mod action;
pub mod config;
pub mod error;
pub mod rng;
pub mod side;
pub mod state;

pub use action::{Action, ActionRecord};
pub use config::{DeckPolicy, EngineConfig};
pub use error::{EngineError, InvariantFailure, RuleViolation};
pub use rng::{GameRng, GameRngState, Judge, ScriptedRolls};
pub use side::{FighterRef, SideId, SideMap};
pub use state::{BattleState, Fighter, Hand, SideState, TurnFlags, TurnPhase};
