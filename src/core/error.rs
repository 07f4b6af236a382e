//! Runtime errors.
//!
//! Two failure classes exist once a battle is running:
//!
//! - [`RuleViolation`]: the caller asked for something the rules forbid.
//!   The battle state is left untouched and the caller may try again.
//! - [`InvariantFailure`]: the engine itself produced an impossible state.
//!   The battle is marked faulted and refuses further actions.
//!
//! [`EngineError`] wraps both for APIs that can return either.

use thiserror::Error;

use super::side::{FighterRef, SideId};
use crate::cards::CardId;
use crate::characters::CharacterId;

/// A request the rules do not allow. Recoverable; nothing was mutated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("the battle is over")]
    BattleOver,

    #[error("the battle was halted by an invariant failure")]
    Faulted,

    #[error("{side} does not hold card `{card}`")]
    CardNotHeld { side: SideId, card: CardId },

    #[error("unknown card `{0}`")]
    UnknownCard(CardId),

    #[error("unknown character `{0}`")]
    UnknownCharacter(CharacterId),

    #[error("{fighter} cannot act: {reason}")]
    InvalidActor {
        fighter: FighterRef,
        reason: &'static str,
    },

    #[error("{fighter} is not a valid target for `{card}`: {reason}")]
    InvalidTarget {
        fighter: FighterRef,
        card: CardId,
        reason: &'static str,
    },

    #[error("{side} must field between 1 and {max} characters, got {found}")]
    RosterSize {
        side: SideId,
        found: usize,
        max: usize,
    },

    #[error("{side} fields `{character}` more than once")]
    DuplicateCharacter { side: SideId, character: CharacterId },
}

impl RuleViolation {
    /// Stable short name of the violation.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RuleViolation::BattleOver => "battle_over",
            RuleViolation::Faulted => "faulted",
            RuleViolation::CardNotHeld { .. } => "card_not_held",
            RuleViolation::UnknownCard(_) => "unknown_card",
            RuleViolation::UnknownCharacter(_) => "unknown_character",
            RuleViolation::InvalidActor { .. } => "invalid_actor",
            RuleViolation::InvalidTarget { .. } => "invalid_target",
            RuleViolation::RosterSize { .. } => "roster_size",
            RuleViolation::DuplicateCharacter { .. } => "duplicate_character",
        }
    }
}

/// An engine bug surfaced by a post-resolution check.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantFailure {
    #[error("{fighter} has {hp} HP, above its maximum of {max_hp}")]
    HpAboveMax {
        fighter: FighterRef,
        hp: u32,
        max_hp: u32,
    },

    #[error("{side} accounts for {found} cards across deck, hand and discard, expected {expected}")]
    CardCountChanged {
        side: SideId,
        expected: usize,
        found: usize,
    },

    #[error("{side} played `{card}` but it was not in hand")]
    PlayedCardMissing { side: SideId, card: CardId },
}

/// Any runtime error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error("invariant failure: {0}")]
    Invariant(#[from] InvariantFailure),
}

impl EngineError {
    /// Stable short name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Rule(violation) => violation.kind(),
            EngineError::Invariant(_) => "invariant_failure",
        }
    }

    /// Is this a recoverable rule violation?
    #[must_use]
    pub fn is_rule_violation(&self) -> bool {
        matches!(self, EngineError::Rule(_))
    }
}
