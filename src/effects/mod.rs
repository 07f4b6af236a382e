//! Effect system: what a played card or granted draw does to a battle.
//!
//! - `Effect`: damage, heal, defense or draw
//! - `EffectResolver`: applies effects, running passive skills and team
//!   effects in their fixed order
//! - `Resolution`: the events one resolution produced

mod effect;
mod resolver;

pub use effect::{DamageSource, Effect};
pub use resolver::{EffectResolver, Resolution, ResolverContext};
