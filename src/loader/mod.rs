//! Configuration loading and validation.
//!
//! The loader turns the character / action-card / team-effect document into
//! immutable [`GameTables`]. Validation is all-or-nothing: the first problem
//! aborts the load with a [`ConfigError`] naming the JSON path at fault.
//!
//! ## Checks
//!
//! - Every required field is present and of the right JSON type
//! - Skill payloads have the shape their effect kind demands
//!   (scalar for `damage_bonus`, record for `lucky_counter`, ...)
//! - Trigger / effect pairings are ones the rules can execute
//! - HP and card values are positive, quantities non-negative
//! - Team effects name two distinct, existing characters

mod error;
mod json;
mod tables;

pub use error::ConfigError;
pub use tables::GameTables;
