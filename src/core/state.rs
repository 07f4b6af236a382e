//! Battle state: fighters, hands, piles and per-turn flags.
//!
//! ## BattleState
//!
//! Everything that changes during a battle:
//! - Turn number, active side, current phase
//! - Per side: fighters, hand, deck, discard, turn flags, last-turn record
//!
//! Readers are public. Mutation is crate-private and goes through the
//! effect resolver and the turn controller only, so a `&BattleState` handed
//! out by a battle is a faithful, read-only view.
//!
//! Decks and discard piles use `im::Vector` and hands use `im::OrdMap`, so
//! cloning a state for look-ahead is cheap.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::config::EngineConfig;
use super::error::InvariantFailure;
use super::rng::GameRng;
use super::side::{FighterRef, SideId, SideMap};
use crate::cards::CardId;
use crate::characters::{CharacterDef, CharacterId};

/// Where a battle is in its turn cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Turn-start draws are being dealt.
    #[default]
    Draw,
    /// Waiting for the active side to play a card or end its turn.
    Action,
    /// End-of-turn passives are resolving.
    PassiveResolution,
    /// Flags are being reset and the next side prepared.
    EndOfTurn,
    /// A result has been reached.
    BattleOver,
    /// An invariant failed; the battle accepts no more actions.
    Faulted,
}

/// A multiset of held cards.
///
/// Copies of a card are interchangeable, so the hand stores a count per
/// card ID. Iteration is in card ID order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: OrdMap<CardId, u32>,
    len: usize,
}

impl Hand {
    /// Create an empty hand.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of `card` held.
    #[must_use]
    pub fn count(&self, card: &CardId) -> u32 {
        self.cards.get(card).copied().unwrap_or(0)
    }

    /// Is at least one copy of `card` held?
    #[must_use]
    pub fn contains(&self, card: &CardId) -> bool {
        self.count(card) > 0
    }

    /// Total cards held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the hand empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distinct cards held with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&CardId, u32)> {
        self.cards.iter().map(|(card, &count)| (card, count))
    }

    pub(crate) fn add(&mut self, card: CardId) {
        *self.cards.entry(card).or_insert(0) += 1;
        self.len += 1;
    }

    /// Remove one copy. Returns `false` if none was held.
    pub(crate) fn remove(&mut self, card: &CardId) -> bool {
        match self.cards.get(card).copied() {
            Some(1) => {
                self.cards.remove(card);
            }
            Some(count) if count > 1 => {
                self.cards.insert(card.clone(), count - 1);
            }
            _ => return false,
        }
        self.len -= 1;
        true
    }
}

/// A character on the field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    character: CharacterId,
    max_hp: u32,
    hp: u32,
    pub(crate) defense: u32,
    pub(crate) redirect_used: bool,
    pub(crate) reductions_applied: u32,
}

impl Fighter {
    pub(crate) fn new(def: &CharacterDef) -> Self {
        Self {
            character: def.id.clone(),
            max_hp: def.max_hp,
            hp: def.max_hp,
            defense: 0,
            redirect_used: false,
            reductions_applied: 0,
        }
    }

    /// The character definition this fighter was created from.
    #[must_use]
    pub fn character(&self) -> &CharacterId {
        &self.character
    }

    #[must_use]
    pub fn hp(&self) -> u32 {
        self.hp
    }

    #[must_use]
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// HP missing from the maximum.
    #[must_use]
    pub fn missing_hp(&self) -> u32 {
        self.max_hp.saturating_sub(self.hp)
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Pending one-shot reduction for the next incoming damage.
    #[must_use]
    pub fn defense(&self) -> u32 {
        self.defense
    }

    /// Has this fighter already redirected damage this turn?
    #[must_use]
    pub fn redirect_used(&self) -> bool {
        self.redirect_used
    }

    /// Passive reductions applied to this fighter this turn.
    #[must_use]
    pub fn reductions_applied(&self) -> u32 {
        self.reductions_applied
    }

    /// Lose up to `amount` HP, floored at 0. Returns the HP actually lost.
    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Restore up to `amount` HP, capped at max. Returns the HP restored.
    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.missing_hp());
        self.hp += restored;
        restored
    }

    fn reset_turn(&mut self) {
        self.redirect_used = false;
        self.reductions_applied = 0;
    }
}

/// Per-side flags cleared at the end of every turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnFlags {
    /// The side has dealt card damage this turn.
    pub first_damage_dealt: bool,
    /// The side has received a damage instance this turn.
    pub first_damage_taken: bool,
    /// The side has played at least one card this turn.
    pub card_played: bool,
    /// Cards played this turn.
    pub plays: u32,
    /// A damage card was played this turn.
    pub attacked: bool,
}

/// Everything one side owns.
#[derive(Clone, Debug)]
pub struct SideState {
    fighters: SmallVec<[Fighter; 2]>,
    hand: Hand,
    deck: Vector<CardId>,
    discard: Vector<CardId>,
    pub(crate) flags: TurnFlags,
    pub(crate) last_turn_attacked: Option<bool>,
    card_total: usize,
    shuffler: GameRng,
}

impl SideState {
    /// Build a side from its roster and an already ordered deck.
    ///
    /// `shuffler` is only used if the discard pile is ever shuffled back.
    pub(crate) fn new(roster: &[&CharacterDef], deck: Vector<CardId>, shuffler: GameRng) -> Self {
        Self {
            fighters: roster.iter().map(|def| Fighter::new(def)).collect(),
            hand: Hand::new(),
            card_total: deck.len(),
            deck,
            discard: Vector::new(),
            flags: TurnFlags::default(),
            last_turn_attacked: None,
            shuffler,
        }
    }

    /// Fighters in slot order, downed ones included.
    #[must_use]
    pub fn fighters(&self) -> &[Fighter] {
        &self.fighters
    }

    #[must_use]
    pub fn fighter(&self, slot: usize) -> Option<&Fighter> {
        self.fighters.get(slot)
    }

    /// Slots of fighters still standing.
    pub fn alive_slots(&self) -> impl Iterator<Item = u8> + '_ {
        self.fighters
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_alive())
            .map(|(slot, _)| slot as u8)
    }

    /// Characters still standing, in slot order.
    pub fn alive_roster(&self) -> impl Iterator<Item = &CharacterId> + Clone {
        self.fighters
            .iter()
            .filter(|f| f.is_alive())
            .map(|f| &f.character)
    }

    /// Are all of this side's fighters down?
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.fighters.iter().all(|f| !f.is_alive())
    }

    #[must_use]
    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    /// Remaining deck; the front is drawn next.
    #[must_use]
    pub fn deck(&self) -> &Vector<CardId> {
        &self.deck
    }

    #[must_use]
    pub fn discard(&self) -> &Vector<CardId> {
        &self.discard
    }

    #[must_use]
    pub fn flags(&self) -> &TurnFlags {
        &self.flags
    }

    /// Whether this side attacked in its last completed turn.
    /// `None` until it has completed one.
    #[must_use]
    pub fn last_turn_attacked(&self) -> Option<bool> {
        self.last_turn_attacked
    }

    /// Cards this side owns, fixed for the whole battle.
    #[must_use]
    pub fn card_total(&self) -> usize {
        self.card_total
    }

    pub(crate) fn fighter_mut(&mut self, slot: usize) -> Option<&mut Fighter> {
        self.fighters.get_mut(slot)
    }

    /// Move the top card of the deck to the hand.
    pub(crate) fn draw_one(&mut self) -> Option<CardId> {
        let card = self.deck.pop_front()?;
        self.hand.add(card.clone());
        Some(card)
    }

    /// Shuffle the discard pile under the deck. Returns the cards moved.
    pub(crate) fn reshuffle_discard(&mut self) -> usize {
        let mut cards: Vec<CardId> = self.discard.iter().cloned().collect();
        self.shuffler.shuffle(&mut cards);
        self.discard.clear();
        let moved = cards.len();
        self.deck.extend(cards);
        moved
    }

    /// Move one copy of `card` from the hand to the discard pile.
    pub(crate) fn spend(&mut self, card: &CardId) -> bool {
        if !self.hand.remove(card) {
            return false;
        }
        self.discard.push_back(card.clone());
        true
    }

    pub(crate) fn reset_turn(&mut self) {
        self.flags = TurnFlags::default();
        for fighter in &mut self.fighters {
            fighter.reset_turn();
        }
    }

    fn card_count(&self) -> usize {
        self.deck.len() + self.hand.len() + self.discard.len()
    }
}

/// Complete mutable state of one battle.
#[derive(Clone, Debug)]
pub struct BattleState {
    sides: SideMap<SideState>,
    config: EngineConfig,
    active: SideId,
    turn: u32,
    phase: TurnPhase,
}

impl BattleState {
    pub(crate) fn new(sides: SideMap<SideState>, config: EngineConfig, first: SideId) -> Self {
        Self {
            sides,
            config,
            active: first,
            turn: 1,
            phase: TurnPhase::Draw,
        }
    }

    #[must_use]
    pub fn side(&self, side: SideId) -> &SideState {
        &self.sides[side]
    }

    #[must_use]
    pub fn fighter(&self, fighter: FighterRef) -> Option<&Fighter> {
        self.sides[fighter.side].fighter(fighter.slot_index())
    }

    /// The side whose turn it is.
    #[must_use]
    pub fn active_side(&self) -> SideId {
        self.active
    }

    /// Turn number, starting at 1 and counting each side's turn.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub(crate) fn side_mut(&mut self, side: SideId) -> &mut SideState {
        &mut self.sides[side]
    }

    pub(crate) fn fighter_mut(&mut self, fighter: FighterRef) -> Option<&mut Fighter> {
        self.sides[fighter.side].fighter_mut(fighter.slot_index())
    }

    pub(crate) fn set_phase(&mut self, phase: TurnPhase) {
        self.phase = phase;
    }

    /// Clear turn flags on both sides.
    pub(crate) fn reset_turn_flags(&mut self) {
        for (_, side) in self.sides.iter_mut() {
            side.reset_turn();
        }
    }

    /// Hand the turn to the other side.
    pub(crate) fn pass_turn(&mut self) {
        self.active = self.active.opponent();
        self.turn += 1;
    }

    /// Verify HP bounds and card conservation on both sides.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantFailure> {
        for (side_id, side) in self.sides.iter() {
            for (slot, fighter) in side.fighters.iter().enumerate() {
                if fighter.hp > fighter.max_hp {
                    return Err(InvariantFailure::HpAboveMax {
                        fighter: FighterRef::new(side_id, slot as u8),
                        hp: fighter.hp,
                        max_hp: fighter.max_hp,
                    });
                }
            }
            let found = side.card_count();
            if found != side.card_total {
                return Err(InvariantFailure::CardCountChanged {
                    side: side_id,
                    expected: side.card_total,
                    found,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn state_with(
        first: &[&CharacterDef],
        second: &[&CharacterDef],
        deck: &[&str],
    ) -> BattleState {
        let deck: Vector<CardId> = deck.iter().map(|&c| CardId::new(c)).collect();
        let sides = SideMap::from_pair(
            SideState::new(first, deck.clone(), GameRng::new(1)),
            SideState::new(second, deck, GameRng::new(2)),
        );
        BattleState::new(sides, EngineConfig::default(), SideId::FIRST)
    }

    #[test]
    fn test_hand_multiset() {
        let mut hand = Hand::new();
        hand.add(CardId::new("attack"));
        hand.add(CardId::new("attack"));
        hand.add(CardId::new("heal"));

        assert_eq!(hand.len(), 3);
        assert_eq!(hand.count(&CardId::new("attack")), 2);

        assert!(hand.remove(&CardId::new("attack")));
        assert!(hand.remove(&CardId::new("attack")));
        assert!(!hand.remove(&CardId::new("attack")));
        assert!(!hand.contains(&CardId::new("attack")));
        assert_eq!(hand.len(), 1);

        let distinct: Vec<_> = hand.iter().map(|(c, n)| (c.as_str(), n)).collect();
        assert_eq!(distinct, vec![("heal", 1)]);
    }

    #[test]
    fn test_fighter_hp_bounds() {
        let def = CharacterDef::new("cafe", 15);
        let mut fighter = Fighter::new(&def);

        assert_eq!(fighter.take_damage(4), 4);
        assert_eq!(fighter.heal(10), 4);
        assert_eq!(fighter.hp(), 15);

        assert_eq!(fighter.take_damage(40), 15);
        assert!(!fighter.is_alive());
    }

    #[test]
    fn test_draw_and_spend_conserve_cards() {
        let cafe = CharacterDef::new("cafe", 15);
        let mut state = state_with(&[&cafe], &[&cafe], &["attack", "heal"]);
        let side = state.side_mut(SideId::FIRST);

        assert_eq!(side.draw_one(), Some(CardId::new("attack")));
        assert!(side.spend(&CardId::new("attack")));
        assert!(!side.spend(&CardId::new("attack")));
        assert_eq!(side.discard().len(), 1);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_reshuffle_discard() {
        let cafe = CharacterDef::new("cafe", 15);
        let mut state = state_with(&[&cafe], &[&cafe], &["attack"]);
        let side = state.side_mut(SideId::FIRST);

        side.draw_one();
        side.spend(&CardId::new("attack"));
        assert!(side.deck().is_empty());

        assert_eq!(side.reshuffle_discard(), 1);
        assert_eq!(side.deck().len(), 1);
        assert!(side.discard().is_empty());
    }

    #[test]
    fn test_alive_roster_and_defeat() {
        let jun = CharacterDef::new("jun", 15);
        let liuli = CharacterDef::new("liuli", 15);
        let mut state = state_with(&[&jun, &liuli], &[&jun], &[]);

        let slot0 = FighterRef::new(SideId::FIRST, 0);
        state.fighter_mut(slot0).unwrap().take_damage(15);

        let side = state.side(SideId::FIRST);
        let alive: Vec<_> = side.alive_roster().map(|c| c.as_str()).collect();
        assert_eq!(alive, vec!["liuli"]);
        assert_eq!(side.alive_slots().collect::<Vec<_>>(), vec![1]);
        assert!(!side.is_defeated());
    }

    #[test]
    fn test_reset_clears_both_sides() {
        let jun = CharacterDef::new("jun", 15);
        let mut state = state_with(&[&jun], &[&jun], &[]);
        state.side_mut(SideId::FIRST).flags.attacked = true;
        state.side_mut(SideId::SECOND).flags.first_damage_taken = true;
        state.fighter_mut(FighterRef::new(SideId::SECOND, 0)).unwrap().redirect_used = true;

        state.reset_turn_flags();

        assert_eq!(*state.side(SideId::FIRST).flags(), TurnFlags::default());
        assert_eq!(*state.side(SideId::SECOND).flags(), TurnFlags::default());
        assert!(!state.fighter(FighterRef::new(SideId::SECOND, 0)).unwrap().redirect_used());
    }

    #[test]
    fn test_pass_turn() {
        let jun = CharacterDef::new("jun", 15);
        let mut state = state_with(&[&jun], &[&jun], &[]);
        state.pass_turn();
        assert_eq!(state.active_side(), SideId::SECOND);
        assert_eq!(state.turn(), 2);
    }

    #[test]
    fn test_invariant_detects_lost_card() {
        let jun = CharacterDef::new("jun", 15);
        let mut state = state_with(&[&jun], &[&jun], &["attack"]);
        state.side_mut(SideId::SECOND).deck.pop_front();

        match state.check_invariants() {
            Err(InvariantFailure::CardCountChanged { side, expected, found }) => {
                assert_eq!(side, SideId::SECOND);
                assert_eq!(expected, 1);
                assert_eq!(found, 0);
            }
            other => panic!("Expected CardCountChanged, got {other:?}"),
        }
    }

    #[test]
    fn test_invariant_detects_overheal() {
        let jun = CharacterDef::new("jun", 15);
        let mut state = state_with(&[&jun], &[&jun], &[]);
        state.fighter_mut(FighterRef::new(SideId::FIRST, 0)).unwrap().hp = 16;
        assert!(matches!(
            state.check_invariants(),
            Err(InvariantFailure::HpAboveMax { hp: 16, .. })
        ));
    }
}
