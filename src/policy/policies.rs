use std::cmp::Reverse;

use crate::cards::CardEffectType;
use crate::core::{Action, BattleState, FighterRef, GameRng};
use crate::loader::GameTables;

use super::Policy;

// =============================================================================
// Greedy
// =============================================================================

/// Heuristic opponent.
///
/// In priority order:
/// 1. Attack the enemy with the lowest HP
/// 2. Heal the ally missing the most HP (only if someone is hurt)
/// 3. Defend the ally with the lowest HP
/// 4. End the turn
///
/// Ties go to the first legal action.
#[derive(Clone, Debug, Default)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// The effect type and target of a play.
fn play_shape(tables: &GameTables, action: &Action) -> Option<(CardEffectType, FighterRef)> {
    match action {
        Action::Play { card, target, .. } => tables.card(card).map(|c| (c.effect, *target)),
        Action::EndTurn => None,
    }
}

impl Policy for GreedyPolicy {
    fn choose(&mut self, state: &BattleState, tables: &GameTables, legal: &[Action]) -> Action {
        let hp = |fighter: FighterRef| state.fighter(fighter).map_or(u32::MAX, |f| f.hp());
        let missing = |fighter: FighterRef| state.fighter(fighter).map_or(0, |f| f.missing_hp());
        let of_type = |effect: CardEffectType| {
            legal.iter().filter_map(move |action| match play_shape(tables, action) {
                Some((e, target)) if e == effect => Some((action, target)),
                _ => None,
            })
        };

        let attack = of_type(CardEffectType::Damage).min_by_key(|&(_, target)| hp(target));
        let heal = of_type(CardEffectType::Heal)
            .filter(|&(_, target)| missing(target) > 0)
            .min_by_key(|&(_, target)| Reverse(missing(target)));
        let defend = of_type(CardEffectType::Defense).min_by_key(|&(_, target)| hp(target));

        attack
            .or(heal)
            .or(defend)
            .map_or(Action::EndTurn, |(action, _)| action.clone())
    }
}

// =============================================================================
// Random
// =============================================================================

/// Uniformly random legal play, reproducible from its seed.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    rng: GameRng,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn choose(&mut self, _state: &BattleState, _tables: &GameTables, legal: &[Action]) -> Action {
        self.rng.choose(legal).cloned().unwrap_or(Action::EndTurn)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{EngineConfig, SideId, SideMap};
    use crate::policy::play_out;
    use crate::rules::{Battle, BattleSetup};

    fn tables() -> Arc<GameTables> {
        Arc::new(GameTables::builtin().unwrap())
    }

    #[test]
    fn test_greedy_attacks_weakest() {
        let setup = BattleSetup::new(["cafe"], ["jun", "liuli"])
            .with_stacked_deck(SideId::FIRST, vec!["attack"; 10])
            .with_stacked_deck(SideId::SECOND, vec!["heal"; 10]);
        let mut battle = Battle::new(tables(), setup, 5).unwrap();

        let mut greedy = GreedyPolicy::new();
        let action = greedy.choose(battle.state(), battle.tables(), &battle.legal_actions());
        assert!(matches!(action, Action::Play { .. }));
        battle.submit(action).unwrap();

        // side 2 only holds heals and someone is hurt now
        let action = greedy.choose(battle.state(), battle.tables(), &battle.legal_actions());
        match action {
            Action::Play { card, target, .. } => {
                assert_eq!(card.as_str(), "heal");
                assert!(battle.state().fighter(target).unwrap().missing_hp() > 0);
            }
            Action::EndTurn => panic!("expected a heal"),
        }
    }

    #[test]
    fn test_greedy_passes_with_nothing_useful() {
        let setup = BattleSetup::new(["cafe"], ["jun"]).with_stacked_deck(SideId::FIRST, ["heal"]);
        let battle = Battle::new(tables(), setup, 5).unwrap();

        let action = GreedyPolicy::new().choose(battle.state(), battle.tables(), &battle.legal_actions());
        assert_eq!(action, Action::EndTurn);
    }

    #[test]
    fn test_random_policy_is_reproducible() {
        let setup = BattleSetup::new(["cafe", "xinhe"], ["yangguang", "liuli"]);
        let run = || {
            let mut battle = Battle::new(tables(), setup.clone(), 21).unwrap();
            let mut policies: SideMap<Box<dyn Policy>> =
                SideMap::new(|side| Box::new(RandomPolicy::new(side.index() as u64)) as Box<dyn Policy>);
            play_out(&mut battle, &mut policies, 200).unwrap();
            battle.actions()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_greedy_self_play_finishes() {
        let setup = BattleSetup::new(["cafe", "xinhe"], ["jun", "liuli"])
            .with_config(EngineConfig::new().with_turn_limit(200));
        let mut battle = Battle::new(tables(), setup, 8).unwrap();
        let mut policies: SideMap<Box<dyn Policy>> =
            SideMap::new(|_| Box::new(GreedyPolicy::new()) as Box<dyn Policy>);

        let result = play_out(&mut battle, &mut policies, 1_000).unwrap();
        assert!(result.is_some());
    }
}
