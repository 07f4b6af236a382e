//! Battle events.
//!
//! Every state change the engine makes is reported as a [`BattleEvent`].
//! A battle keeps the full event log, which is enough to reconstruct what
//! happened turn by turn and to replay the dice (see
//! [`BattleEvent::dice_rolls`]).

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::characters::{SkillTrigger, TeamEffectId, TeamEffectKind};
use crate::core::{FighterRef, SideId};
use crate::rules::BattleResult;

/// Why cards were drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    /// Dealt before the first turn.
    OpeningHand,
    /// The base draw at the start of a turn.
    TurnStart,
    /// An `extra_draw` team effect.
    TeamEffect,
    /// A `draw_card` passive.
    Passive,
}

/// Why a damage instance was negated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreventReason {
    /// The defender's `first_damage_immunity` team effect.
    Immunity,
    /// A lucky counter roll.
    LuckyCounter,
}

/// What reduced a damage instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionReason {
    /// A `damage_reduction` passive.
    Passive,
    /// A pending defense card.
    Defense,
}

/// Something that happened during a battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    TurnStarted {
        side: SideId,
        turn: u32,
    },

    /// `drawn` is less than `requested` when the deck ran out.
    CardsDrawn {
        side: SideId,
        requested: u32,
        drawn: u32,
        reason: DrawReason,
    },

    DeckReshuffled {
        side: SideId,
        cards: u32,
    },

    CardPlayed {
        side: SideId,
        card: CardId,
        actor: FighterRef,
        target: FighterRef,
    },

    DiceRolled {
        fighter: FighterRef,
        low: i32,
        high: i32,
        roll: i32,
    },

    DamagePrevented {
        target: FighterRef,
        amount: u32,
        reason: PreventReason,
    },

    Redirected {
        from: FighterRef,
        to: FighterRef,
    },

    DamageReduced {
        target: FighterRef,
        amount: u32,
        reason: ReductionReason,
    },

    /// `amount` is the HP actually lost.
    DamageDealt {
        attacker: FighterRef,
        target: FighterRef,
        amount: u32,
        hp_after: u32,
    },

    /// `amount` is the HP actually restored.
    Healed {
        target: FighterRef,
        amount: u32,
        hp_after: u32,
    },

    DefenseGranted {
        target: FighterRef,
        amount: u32,
        pending: u32,
    },

    FighterDowned {
        fighter: FighterRef,
    },

    PassiveTriggered {
        holder: FighterRef,
        skill: String,
        trigger: SkillTrigger,
    },

    TeamEffectTriggered {
        side: SideId,
        effect: TeamEffectId,
        kind: TeamEffectKind,
    },

    TurnEnded {
        side: SideId,
        turn: u32,
        attacked: bool,
    },

    BattleOver {
        result: BattleResult,
    },
}

impl BattleEvent {
    /// The dice results recorded in `events`, in order.
    ///
    /// Feeding these to a `ScriptedRolls` judge reproduces a battle without
    /// its seed.
    pub fn dice_rolls<'a>(events: impl IntoIterator<Item = &'a BattleEvent>) -> Vec<i32> {
        events
            .into_iter()
            .filter_map(|event| match event {
                BattleEvent::DiceRolled { roll, .. } => Some(*roll),
                _ => None,
            })
            .collect()
    }

    /// Split a log into turns, each starting at its `TurnStarted` event.
    ///
    /// Events before the first turn (opening hands) are dropped.
    pub fn by_turn(events: &[BattleEvent]) -> Vec<&[BattleEvent]> {
        let starts: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, BattleEvent::TurnStarted { .. }))
            .map(|(i, _)| i)
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let end = starts.get(n + 1).copied().unwrap_or(events.len());
                &events[start..end]
            })
            .collect()
    }
}
