//! Effect resolution - applying effects to battle state.
//!
//! The `EffectResolver` applies one [`Effect`] at a time and reports what
//! changed as a [`Resolution`]. Passive skills and team effects that modify
//! the effect fire inside the resolver, in a fixed order.
//!
//! ## Damage pipeline
//!
//! For one damage instance from `attacker` to `target`:
//!
//! 1. Defender team: `first_damage_immunity` negates the first instance the
//!    defending side receives this turn. Card damage negated this way also
//!    uses up the attacker's first-damage slot.
//! 2. Attacker team (card damage): `first_attack_bonus` on the side's first
//!    damage of the turn.
//! 3. Attacker passive (card damage): `damage_bonus` under the same
//!    condition. The first-damage slot is spent here.
//! 4. Defender side: `damage_redirect` moves the hit onto the first alive
//!    teammate holding it who has not redirected this turn.
//! 5. Final target (card damage): `lucky_counter` rolls once per skill; a
//!    lucky roll negates the hit and strikes the attacker back.
//! 6. Final target: `damage_reduction`, up to `max_times` per turn.
//! 7. Final target: pending defense, consumed.
//! 8. HP loss, floored at 0.
//!
//! After every effect the state invariants are checked; a failure is
//! returned as an [`InvariantFailure`].

use crate::characters::{SkillEffect, SkillTrigger, TeamEffectKind};
use crate::core::{BattleState, DeckPolicy, FighterRef, InvariantFailure, Judge, SideId};
use crate::loader::GameTables;
use crate::triggers::{
    BattleEvent, DrawReason, PassiveRegistry, PreventReason, ReductionReason,
};

use super::effect::{DamageSource, Effect};

/// What the resolver needs besides the state itself.
pub struct ResolverContext<'a> {
    /// Character, card and team effect definitions.
    pub tables: &'a GameTables,
    /// Passive skills of the fighters in this battle.
    pub passives: &'a PassiveRegistry,
    /// Dice source for luck-based passives.
    pub judge: &'a mut dyn Judge,
}

impl<'a> ResolverContext<'a> {
    /// Create a resolver context.
    pub fn new(
        tables: &'a GameTables,
        passives: &'a PassiveRegistry,
        judge: &'a mut dyn Judge,
    ) -> Self {
        Self {
            tables,
            passives,
            judge,
        }
    }
}

/// Events produced by resolving effects, in the order they happened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    events: Vec<BattleEvent>,
}

impl Resolution {
    /// Create an empty resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    pub(crate) fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub(crate) fn extend(&mut self, other: Resolution) {
        self.events.extend(other.events);
    }
}

/// Resolves effects on battle state.
pub struct EffectResolver;

impl EffectResolver {
    /// Apply `effect` and check the state invariants afterwards.
    ///
    /// Effects aimed at a downed or missing fighter do nothing.
    pub fn resolve(
        state: &mut BattleState,
        effect: &Effect,
        ctx: &mut ResolverContext<'_>,
    ) -> Result<Resolution, InvariantFailure> {
        let mut out = Resolution::new();

        match *effect {
            Effect::Damage {
                attacker,
                target,
                amount,
                source,
            } => Self::resolve_damage(state, attacker, target, amount, source, ctx, &mut out),
            Effect::Heal { target, amount } => Self::resolve_heal(state, target, amount, &mut out),
            Effect::Defense { target, amount } => {
                Self::resolve_defense(state, target, amount, &mut out)
            }
            Effect::Draw {
                side,
                count,
                reason,
            } => Self::resolve_draw(state, side, count, reason, &mut out),
        }

        tracing::trace!(?effect, events = out.events.len(), "effect resolved");
        state.check_invariants()?;
        Ok(out)
    }

    fn is_alive(state: &BattleState, fighter: FighterRef) -> bool {
        state.fighter(fighter).is_some_and(|f| f.is_alive())
    }

    fn resolve_damage(
        state: &mut BattleState,
        attacker: FighterRef,
        target: FighterRef,
        amount: u32,
        source: DamageSource,
        ctx: &mut ResolverContext<'_>,
        out: &mut Resolution,
    ) {
        if !Self::is_alive(state, target) {
            return;
        }
        let tables = ctx.tables;
        let passives = ctx.passives;
        let attacking = attacker.side;
        let defending = target.side;
        let mut amount = amount;

        if !state.side(defending).flags().first_damage_taken {
            state.side_mut(defending).flags.first_damage_taken = true;
            let immunity = tables.active_team_effects(
                TeamEffectKind::FirstDamageImmunity,
                state.side(defending).alive_roster(),
            );
            if let Some(team) = immunity.first() {
                out.push(BattleEvent::TeamEffectTriggered {
                    side: defending,
                    effect: team.id.clone(),
                    kind: team.kind,
                });
                out.push(BattleEvent::DamagePrevented {
                    target,
                    amount,
                    reason: PreventReason::Immunity,
                });
                if source == DamageSource::Card {
                    state.side_mut(attacking).flags.first_damage_dealt = true;
                }
                return;
            }
        }

        if source == DamageSource::Card && !state.side(attacking).flags().first_damage_dealt {
            let bonuses = tables.active_team_effects(
                TeamEffectKind::FirstAttackBonus,
                state.side(attacking).alive_roster(),
            );
            for team in bonuses {
                amount = amount.saturating_add(team.value);
                out.push(BattleEvent::TeamEffectTriggered {
                    side: attacking,
                    effect: team.id.clone(),
                    kind: team.kind,
                });
            }

            for entry in passives.for_holder(attacker, SkillTrigger::FirstDamageDealt) {
                if let SkillEffect::DamageBonus { bonus } = entry.effect {
                    amount = amount.saturating_add(bonus);
                    out.push(BattleEvent::PassiveTriggered {
                        holder: attacker,
                        skill: entry.skill.clone(),
                        trigger: SkillTrigger::FirstDamageDealt,
                    });
                }
            }
            state.side_mut(attacking).flags.first_damage_dealt = true;
        }

        let target = Self::redirect(state, target, passives, out);

        if source == DamageSource::Card {
            for entry in passives.for_holder(target, SkillTrigger::TakeDamage) {
                let SkillEffect::LuckyCounter {
                    dice_low,
                    dice_high,
                    lucky_number,
                    counter_damage,
                } = entry.effect
                else {
                    continue;
                };

                let roll = ctx.judge.roll(dice_low, dice_high);
                out.push(BattleEvent::DiceRolled {
                    fighter: target,
                    low: dice_low,
                    high: dice_high,
                    roll,
                });
                if roll != lucky_number {
                    continue;
                }

                out.push(BattleEvent::PassiveTriggered {
                    holder: target,
                    skill: entry.skill.clone(),
                    trigger: SkillTrigger::TakeDamage,
                });
                out.push(BattleEvent::DamagePrevented {
                    target,
                    amount,
                    reason: PreventReason::LuckyCounter,
                });
                if counter_damage > 0 {
                    Self::resolve_damage(
                        state,
                        target,
                        attacker,
                        counter_damage,
                        DamageSource::Counter,
                        ctx,
                        out,
                    );
                }
                return;
            }
        }

        for entry in passives.for_holder(target, SkillTrigger::TakeDamage) {
            let SkillEffect::DamageReduction {
                max_times,
                reduction,
            } = entry.effect
            else {
                continue;
            };
            let Some(fighter) = state.fighter_mut(target) else {
                return;
            };
            if fighter.reductions_applied >= max_times {
                continue;
            }
            fighter.reductions_applied += 1;
            let reduced = reduction.min(amount);
            amount -= reduced;
            out.push(BattleEvent::PassiveTriggered {
                holder: target,
                skill: entry.skill.clone(),
                trigger: SkillTrigger::TakeDamage,
            });
            out.push(BattleEvent::DamageReduced {
                target,
                amount: reduced,
                reason: ReductionReason::Passive,
            });
        }

        let Some(fighter) = state.fighter_mut(target) else {
            return;
        };
        if fighter.defense > 0 {
            let reduced = fighter.defense.min(amount);
            fighter.defense = 0;
            amount -= reduced;
            out.push(BattleEvent::DamageReduced {
                target,
                amount: reduced,
                reason: ReductionReason::Defense,
            });
        }

        let lost = fighter.take_damage(amount);
        let hp_after = fighter.hp();
        out.push(BattleEvent::DamageDealt {
            attacker,
            target,
            amount: lost,
            hp_after,
        });
        if hp_after == 0 {
            tracing::debug!(fighter = %target, "fighter downed");
            out.push(BattleEvent::FighterDowned { fighter: target });
        }
    }

    /// Pick the fighter that actually takes a hit aimed at `target`.
    fn redirect(
        state: &mut BattleState,
        target: FighterRef,
        passives: &PassiveRegistry,
        out: &mut Resolution,
    ) -> FighterRef {
        let guard = passives
            .on_side(target.side, SkillTrigger::TeammateTakeDamage)
            .filter(|entry| matches!(entry.effect, SkillEffect::DamageRedirect))
            .find(|entry| {
                entry.holder != target
                    && state
                        .fighter(entry.holder)
                        .is_some_and(|f| f.is_alive() && !f.redirect_used())
            });

        let Some(entry) = guard else {
            return target;
        };
        let holder = entry.holder;
        if let Some(fighter) = state.fighter_mut(holder) {
            fighter.redirect_used = true;
        }
        out.push(BattleEvent::PassiveTriggered {
            holder,
            skill: entry.skill.clone(),
            trigger: SkillTrigger::TeammateTakeDamage,
        });
        out.push(BattleEvent::Redirected {
            from: target,
            to: holder,
        });
        holder
    }

    fn resolve_heal(state: &mut BattleState, target: FighterRef, amount: u32, out: &mut Resolution) {
        let Some(fighter) = state.fighter_mut(target).filter(|f| f.is_alive()) else {
            return;
        };
        let restored = fighter.heal(amount);
        out.push(BattleEvent::Healed {
            target,
            amount: restored,
            hp_after: fighter.hp(),
        });
    }

    fn resolve_defense(
        state: &mut BattleState,
        target: FighterRef,
        amount: u32,
        out: &mut Resolution,
    ) {
        let Some(fighter) = state.fighter_mut(target).filter(|f| f.is_alive()) else {
            return;
        };
        fighter.defense = fighter.defense.saturating_add(amount);
        out.push(BattleEvent::DefenseGranted {
            target,
            amount,
            pending: fighter.defense,
        });
    }

    fn resolve_draw(
        state: &mut BattleState,
        side: SideId,
        count: u32,
        reason: DrawReason,
        out: &mut Resolution,
    ) {
        let policy = state.config().deck_policy;
        let pile = state.side_mut(side);
        let mut drawn = 0;

        for _ in 0..count {
            if pile.deck().is_empty() {
                if policy != DeckPolicy::ReshuffleDiscard || pile.discard().is_empty() {
                    break;
                }
                let cards = pile.reshuffle_discard() as u32;
                out.push(BattleEvent::DeckReshuffled { side, cards });
            }
            if pile.draw_one().is_some() {
                drawn += 1;
            }
        }

        out.push(BattleEvent::CardsDrawn {
            side,
            requested: count,
            drawn,
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters::{CharacterDef, CharacterId};
    use crate::core::state::tests::state_with;
    use crate::core::{EngineConfig, ScriptedRolls};

    const ME: FighterRef = FighterRef::new(SideId::FIRST, 0);
    const FOE: FighterRef = FighterRef::new(SideId::SECOND, 0);
    const FOE_MATE: FighterRef = FighterRef::new(SideId::SECOND, 1);

    fn def(tables: &GameTables, id: &str) -> CharacterDef {
        tables.character(&CharacterId::new(id)).unwrap().clone()
    }

    struct Fixture {
        tables: GameTables,
        passives: PassiveRegistry,
        state: BattleState,
    }

    impl Fixture {
        fn new(first: &[&str], second: &[&str], deck: &[&str]) -> Self {
            let tables = GameTables::builtin().unwrap();
            let first: Vec<_> = first.iter().map(|&id| def(&tables, id)).collect();
            let second: Vec<_> = second.iter().map(|&id| def(&tables, id)).collect();

            let mut passives = PassiveRegistry::new();
            for (side, roster) in [(SideId::FIRST, &first), (SideId::SECOND, &second)] {
                for (slot, character) in roster.iter().enumerate() {
                    passives.register_fighter(FighterRef::new(side, slot as u8), character);
                }
            }

            let first: Vec<_> = first.iter().collect();
            let second: Vec<_> = second.iter().collect();
            let state = state_with(&first, &second, deck);
            Self {
                tables,
                passives,
                state,
            }
        }

        fn apply(&mut self, effect: Effect, rolls: &[i32]) -> Resolution {
            let mut judge = ScriptedRolls::new(rolls.iter().copied());
            let mut ctx = ResolverContext::new(&self.tables, &self.passives, &mut judge);
            EffectResolver::resolve(&mut self.state, &effect, &mut ctx).unwrap()
        }

        fn hp(&self, fighter: FighterRef) -> u32 {
            self.state.fighter(fighter).unwrap().hp()
        }
    }

    fn hit(attacker: FighterRef, target: FighterRef, amount: u32) -> Effect {
        Effect::Damage {
            attacker,
            target,
            amount,
            source: DamageSource::Card,
        }
    }

    #[test]
    fn test_damage_bonus_first_hit_only() {
        let mut fx = Fixture::new(&["cafe"], &["cafe"], &[]);

        fx.apply(hit(ME, FOE, 3), &[]);
        assert_eq!(fx.hp(FOE), 11);

        fx.apply(hit(ME, FOE, 3), &[]);
        assert_eq!(fx.hp(FOE), 8);
    }

    #[test]
    fn test_counter_damage_gets_no_bonus() {
        let mut fx = Fixture::new(&["cafe"], &["cafe"], &[]);
        fx.apply(
            Effect::Damage {
                attacker: ME,
                target: FOE,
                amount: 2,
                source: DamageSource::Counter,
            },
            &[],
        );
        assert_eq!(fx.hp(FOE), 13);
        assert!(!fx.state.side(SideId::FIRST).flags().first_damage_dealt);
    }

    #[test]
    fn test_lucky_counter_negates_and_strikes_back() {
        let mut fx = Fixture::new(&["xinhe"], &["liuli"], &[]);
        let res = fx.apply(hit(ME, FOE, 3), &[6]);

        assert_eq!(fx.hp(FOE), 15);
        assert_eq!(fx.hp(ME), 13);
        assert!(res.iter().any(|e| matches!(
            e,
            BattleEvent::DamagePrevented {
                reason: PreventReason::LuckyCounter,
                ..
            }
        )));
    }

    #[test]
    fn test_unlucky_roll_takes_full_damage() {
        let mut fx = Fixture::new(&["xinhe"], &["liuli"], &[]);
        let res = fx.apply(hit(ME, FOE, 3), &[2]);

        assert_eq!(fx.hp(FOE), 12);
        assert_eq!(fx.hp(ME), 15);
        assert_eq!(BattleEvent::dice_rolls(res.events()), vec![2]);
    }

    #[test]
    fn test_counter_is_not_countered() {
        let mut fx = Fixture::new(&["liuli"], &["liuli"], &[]);
        fx.apply(hit(ME, FOE, 3), &[6, 6]);

        assert_eq!(fx.hp(FOE), 15);
        assert_eq!(fx.hp(ME), 13);
    }

    #[test]
    fn test_damage_reduction_limited_per_turn() {
        let mut fx = Fixture::new(&["xinhe"], &["jun"], &[]);
        for _ in 0..3 {
            fx.apply(hit(ME, FOE, 3), &[]);
        }
        // 2 + 2 + 3
        assert_eq!(fx.hp(FOE), 8);

        fx.state.reset_turn_flags();
        fx.apply(hit(ME, FOE, 3), &[]);
        assert_eq!(fx.hp(FOE), 6);
    }

    #[test]
    fn test_redirect_once_per_turn() {
        let mut fx = Fixture::new(&["xinhe"], &["cafe", "jun"], &[]);

        let res = fx.apply(hit(ME, FOE, 3), &[]);
        assert!(res.iter().any(|e| matches!(
            e,
            BattleEvent::Redirected { from, to } if *from == FOE && *to == FOE_MATE
        )));
        // jun takes it, minus tenacity
        assert_eq!(fx.hp(FOE), 15);
        assert_eq!(fx.hp(FOE_MATE), 13);

        fx.apply(hit(ME, FOE, 3), &[]);
        assert_eq!(fx.hp(FOE), 12);
    }

    #[test]
    fn test_no_self_redirect() {
        let mut fx = Fixture::new(&["xinhe"], &["jun", "cafe"], &[]);
        let res = fx.apply(hit(ME, FOE, 3), &[]);
        assert!(!res.iter().any(|e| matches!(e, BattleEvent::Redirected { .. })));
        assert_eq!(fx.hp(FOE), 13);
    }

    #[test]
    fn test_first_attack_bonus_before_passive() {
        let mut fx = Fixture::new(&["jun", "liuli"], &["xinhe"], &[]);
        let res = fx.apply(hit(ME, FOE, 3), &[]);
        assert_eq!(fx.hp(FOE), 11);

        let first_team = res
            .iter()
            .position(|e| matches!(e, BattleEvent::TeamEffectTriggered { .. }));
        assert_eq!(first_team, Some(0));

        fx.apply(hit(ME, FOE, 3), &[]);
        assert_eq!(fx.hp(FOE), 8);
    }

    #[test]
    fn test_first_damage_immunity_consumes_bonus() {
        let mut fx = Fixture::new(&["cafe"], &["yangguang", "liuli"], &[]);
        let res = fx.apply(hit(ME, FOE, 3), &[]);

        assert_eq!(fx.hp(FOE), 15);
        assert!(BattleEvent::dice_rolls(res.events()).is_empty());
        assert!(!res
            .iter()
            .any(|e| matches!(e, BattleEvent::PassiveTriggered { .. })));

        // the bonus slot is gone as well
        fx.apply(hit(ME, FOE, 3), &[]);
        assert_eq!(fx.hp(FOE), 12);
    }

    #[test]
    fn test_defense_consumed_by_next_hit() {
        let mut fx = Fixture::new(&["xinhe"], &["xinhe"], &[]);
        let res = fx.apply(
            Effect::Defense {
                target: FOE,
                amount: 1,
            },
            &[],
        );
        assert!(matches!(
            res.events(),
            [BattleEvent::DefenseGranted { pending: 1, .. }]
        ));

        fx.apply(hit(ME, FOE, 3), &[]);
        assert_eq!(fx.hp(FOE), 13);
        assert_eq!(fx.state.fighter(FOE).unwrap().defense(), 0);

        fx.apply(hit(ME, FOE, 3), &[]);
        assert_eq!(fx.hp(FOE), 10);
    }

    #[test]
    fn test_bonus_on_max_damage_saturates() {
        let mut fx = Fixture::new(&["cafe"], &["xinhe"], &[]);
        let res = fx.apply(hit(ME, FOE, u32::MAX), &[]);

        assert_eq!(fx.hp(FOE), 0);
        assert!(res.iter().any(|e| matches!(
            e,
            BattleEvent::DamageDealt {
                amount: 15,
                hp_after: 0,
                ..
            }
        )));
    }

    #[test]
    fn test_stacked_defense_saturates() {
        let mut fx = Fixture::new(&["xinhe"], &["xinhe"], &[]);
        let defend = Effect::Defense {
            target: ME,
            amount: u32::MAX,
        };
        fx.apply(defend.clone(), &[]);
        let res = fx.apply(defend, &[]);

        assert!(matches!(
            res.events(),
            [BattleEvent::DefenseGranted {
                pending: u32::MAX,
                ..
            }]
        ));
        fx.apply(hit(FOE, ME, 3), &[]);
        assert_eq!(fx.hp(ME), 15);
    }

    #[test]
    fn test_heal_capped_and_skips_downed() {
        let mut fx = Fixture::new(&["xinhe", "cafe"], &["xinhe"], &[]);
        fx.apply(hit(FOE, ME, 3), &[]);

        let res = fx.apply(Effect::Heal { target: ME, amount: 5 }, &[]);
        assert!(matches!(
            res.events(),
            [BattleEvent::Healed {
                amount: 3,
                hp_after: 15,
                ..
            }]
        ));

        fx.apply(hit(FOE, ME, 20), &[]);
        assert_eq!(fx.hp(ME), 0);
        let res = fx.apply(Effect::Heal { target: ME, amount: 5 }, &[]);
        assert!(res.is_empty());
        assert_eq!(fx.hp(ME), 0);
    }

    #[test]
    fn test_downed_event() {
        let mut fx = Fixture::new(&["xinhe"], &["xinhe"], &[]);
        let res = fx.apply(hit(ME, FOE, 40), &[]);
        assert!(res
            .iter()
            .any(|e| matches!(e, BattleEvent::FighterDowned { fighter } if *fighter == FOE)));
        assert!(fx.state.side(SideId::SECOND).is_defeated());
    }

    #[test]
    fn test_draw_stops_at_empty_deck() {
        let deck = vec!["attack"; 10];
        let mut fx = Fixture::new(&["xinhe"], &["xinhe"], &deck);

        let res = fx.apply(Effect::draw(SideId::FIRST, 12, DrawReason::TurnStart), &[]);
        assert!(matches!(
            res.events(),
            [BattleEvent::CardsDrawn {
                requested: 12,
                drawn: 10,
                ..
            }]
        ));
        assert!(fx.state.side(SideId::FIRST).deck().is_empty());
        assert_eq!(fx.state.side(SideId::FIRST).hand().len(), 10);
    }

    #[test]
    fn test_draw_reshuffles_discard_when_configured() {
        let mut fx = Fixture::new(&["xinhe"], &["xinhe"], &["attack", "heal"]);
        *fx.state.config_mut() =
            EngineConfig::default().with_deck_policy(DeckPolicy::ReshuffleDiscard);

        fx.apply(Effect::draw(SideId::FIRST, 2, DrawReason::TurnStart), &[]);
        fx.state.side_mut(SideId::FIRST).spend(&"attack".into());

        let res = fx.apply(Effect::draw(SideId::FIRST, 2, DrawReason::TurnStart), &[]);
        assert!(matches!(
            res.events(),
            [
                BattleEvent::DeckReshuffled { cards: 1, .. },
                BattleEvent::CardsDrawn { drawn: 1, .. }
            ]
        ));
    }
}
