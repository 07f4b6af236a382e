//! Battle events and the passive skill index.
//!
//! ## Key Components
//!
//! - [`BattleEvent`]: one reported state change
//! - [`DrawReason`], [`PreventReason`], [`ReductionReason`]: event details
//! - [`PassiveRegistry`]: per-battle lookup of passive skills by trigger

mod event;
mod registry;

pub use event::{BattleEvent, DrawReason, PreventReason, ReductionReason};
pub use registry::{PassiveEntry, PassiveRegistry};
