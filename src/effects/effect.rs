//! Discrete effects applied to a battle.
//!
//! A played card becomes one [`Effect`]; so does each draw the turn
//! controller grants. Passive skills are not effects of their own: they
//! modify or follow the effect that triggered them inside the resolver.

use serde::{Deserialize, Serialize};

use crate::cards::{ActionCard, CardEffectType};
use crate::core::{FighterRef, SideId};
use crate::triggers::DrawReason;

/// Where a damage instance comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    /// A played damage card.
    Card,
    /// A lucky counter striking back. Gets no attack bonuses and cannot
    /// itself be countered.
    Counter,
}

/// One unit of work for the resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    Damage {
        attacker: FighterRef,
        target: FighterRef,
        amount: u32,
        source: DamageSource,
    },
    Heal {
        target: FighterRef,
        amount: u32,
    },
    Defense {
        target: FighterRef,
        amount: u32,
    },
    Draw {
        side: SideId,
        count: u32,
        reason: DrawReason,
    },
}

impl Effect {
    /// The effect of playing `card` from `actor` onto `target`.
    ///
    /// ```
    /// use lingcard::cards::{ActionCard, CardEffectType, TargetType};
    /// use lingcard::core::{FighterRef, SideId};
    /// use lingcard::effects::{DamageSource, Effect};
    ///
    /// let attack = ActionCard::new("attack", TargetType::Enemy, CardEffectType::Damage, 3);
    /// let actor = FighterRef::new(SideId::FIRST, 0);
    /// let target = FighterRef::new(SideId::SECOND, 0);
    ///
    /// assert_eq!(
    ///     Effect::from_card(&attack, actor, target),
    ///     Effect::Damage { attacker: actor, target, amount: 3, source: DamageSource::Card },
    /// );
    /// ```
    #[must_use]
    pub fn from_card(card: &ActionCard, actor: FighterRef, target: FighterRef) -> Self {
        let amount = card.base_value;
        match card.effect {
            CardEffectType::Damage => Effect::Damage {
                attacker: actor,
                target,
                amount,
                source: DamageSource::Card,
            },
            CardEffectType::Heal => Effect::Heal { target, amount },
            CardEffectType::Defense => Effect::Defense { target, amount },
        }
    }

    /// Create a draw effect.
    #[must_use]
    pub fn draw(side: SideId, count: u32, reason: DrawReason) -> Self {
        Effect::Draw {
            side,
            count,
            reason,
        }
    }
}
