//! Automated players.
//!
//! A [`Policy`] picks one of the legal actions for the active side. The
//! crate ships two:
//!
//! - [`GreedyPolicy`]: the classic computer opponent. Attack the weakest
//!   enemy, otherwise patch up the most injured ally, otherwise shield the
//!   weakest ally, otherwise pass.
//! - [`RandomPolicy`]: uniform over legal actions, seeded.
//!
//! [`play_out`] drives a battle with one policy per side.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use lingcard::core::SideMap;
//! use lingcard::loader::GameTables;
//! use lingcard::policy::{play_out, GreedyPolicy, Policy};
//! use lingcard::rules::{Battle, BattleSetup};
//!
//! let tables = Arc::new(GameTables::builtin().unwrap());
//! let setup = BattleSetup::new(["cafe", "xinhe"], ["jun", "liuli"]);
//! let mut battle = Battle::new(tables, setup, 11).unwrap();
//!
//! let mut policies: SideMap<Box<dyn Policy>> =
//!     SideMap::new(|_| Box::new(GreedyPolicy::new()) as Box<dyn Policy>);
//! let result = play_out(&mut battle, &mut policies, 500).unwrap();
//! assert_eq!(result, battle.result());
//! ```

mod policies;

pub use policies::{GreedyPolicy, RandomPolicy};

use crate::core::{Action, BattleState, EngineError, Judge, SideMap};
use crate::loader::GameTables;
use crate::rules::{Battle, BattleResult};

/// Chooses actions for a side.
pub trait Policy {
    /// Pick one of `legal`, which is never empty and always ends with
    /// `EndTurn`.
    fn choose(&mut self, state: &BattleState, tables: &GameTables, legal: &[Action]) -> Action;
}

/// Let the policies play until the battle ends or `max_submissions`
/// actions have been submitted.
///
/// Returns the result if the battle finished.
pub fn play_out<J: Judge>(
    battle: &mut Battle<J>,
    policies: &mut SideMap<Box<dyn Policy>>,
    max_submissions: usize,
) -> Result<Option<BattleResult>, EngineError> {
    for _ in 0..max_submissions {
        let legal = battle.legal_actions();
        if legal.is_empty() {
            break;
        }
        let side = battle.active_side();
        let action = policies[side].choose(battle.state(), battle.tables(), &legal);
        battle.submit(action)?;
    }

    tracing::debug!(
        submissions = battle.history().len(),
        result = ?battle.result(),
        "play-out finished"
    );
    Ok(battle.result())
}
