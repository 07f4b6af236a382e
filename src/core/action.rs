//! Player actions and the action history.
//!
//! A side does one of two things during its action phase: play a card from
//! its hand (naming the acting fighter and a target) or end the turn.

use serde::{Deserialize, Serialize};

use super::side::{FighterRef, SideId};
use crate::cards::CardId;

/// An action submitted by the active side.
///
/// ## Example
///
/// ```
/// use lingcard::core::{Action, FighterRef, SideId};
///
/// let attack = Action::play(
///     "attack",
///     FighterRef::new(SideId::FIRST, 0),
///     FighterRef::new(SideId::SECOND, 1),
/// );
/// assert_eq!(attack.card().map(|c| c.as_str()), Some("attack"));
/// assert!(Action::EndTurn.card().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Play one copy of `card` from the hand.
    Play {
        card: CardId,
        /// Fighter using the card; must be alive and on the active side.
        actor: FighterRef,
        /// Fighter receiving the effect.
        target: FighterRef,
    },

    /// Pass the rest of the action phase.
    EndTurn,
}

impl Action {
    /// Create a play action.
    #[must_use]
    pub fn play(card: impl Into<CardId>, actor: FighterRef, target: FighterRef) -> Self {
        Action::Play {
            card: card.into(),
            actor,
            target,
        }
    }

    /// The played card, if this is a play.
    #[must_use]
    pub fn card(&self) -> Option<&CardId> {
        match self {
            Action::Play { card, .. } => Some(card),
            Action::EndTurn => None,
        }
    }

    /// Is this the end-turn action?
    #[must_use]
    pub fn is_end_turn(&self) -> bool {
        matches!(self, Action::EndTurn)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Play { card, actor, target } => write!(f, "{actor} plays {card} on {target}"),
            Action::EndTurn => f.write_str("end turn"),
        }
    }
}

/// An accepted action with the turn it was taken in.
///
/// The history of records, together with the tables, setup and seed, is
/// enough to replay a battle exactly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The side that acted.
    pub side: SideId,

    /// The action taken.
    pub action: Action,

    /// Turn number when the action was taken.
    pub turn: u32,

    /// Sequence number within the turn.
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(side: SideId, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            side,
            action,
            turn,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_accessors() {
        let actor = FighterRef::new(SideId::FIRST, 0);
        let target = FighterRef::new(SideId::FIRST, 1);
        let heal = Action::play("heal", actor, target);

        assert_eq!(heal.card(), Some(&CardId::new("heal")));
        assert!(!heal.is_end_turn());
        assert_eq!(heal.to_string(), "Side 0/0 plays heal on Side 0/1");
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::play(
            "attack",
            FighterRef::new(SideId::FIRST, 0),
            FighterRef::new(SideId::SECOND, 0),
        );
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"type\":\"play\""));

        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);

        let end: Action = serde_json::from_str(r#"{ "type": "end_turn" }"#).unwrap();
        assert!(end.is_end_turn());
    }

    #[test]
    fn test_action_record() {
        let record = ActionRecord::new(SideId::SECOND, Action::EndTurn, 4, 0);
        assert_eq!(record.side, SideId::SECOND);
        assert_eq!(record.turn, 4);
    }
}
