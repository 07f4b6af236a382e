//! Action cards: definitions and registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `ActionCard`: Static card data (target type, effect, value, quantity)
//! - `CardRegistry`: Card definition lookup
//!
//! Cards are fungible by identifier. Hands, decks and discard piles store
//! `CardId`s; the registry resolves them to definitions.

pub mod definition;
pub mod registry;

pub use definition::{ActionCard, CardEffectType, CardId, TargetType};
pub use registry::CardRegistry;
