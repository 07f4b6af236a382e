//! Battle rules: setup, the turn controller and results.
//!
//! [`Battle`] is the only way to advance a battle. It validates every
//! submitted [`Action`](crate::core::Action), drives the turn cycle and
//! reports what happened as [`BattleEvent`](crate::triggers::BattleEvent)s.

pub mod engine;
pub mod setup;

pub use engine::{Battle, BattleResult};
pub use setup::BattleSetup;
