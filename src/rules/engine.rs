//! The turn controller.
//!
//! A [`Battle`] owns one battle's state and moves it through the turn cycle:
//!
//! ```text
//! Draw -> Action -> PassiveResolution -> EndOfTurn -> (other side) Draw ...
//!                                                   \-> BattleOver
//! ```
//!
//! The only input is [`Battle::submit`]. Everything else (draws, passive
//! triggers, flag resets, the win check) happens inside the controller.

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::{ActionCard, CardId, TargetType};
use crate::characters::{CharacterDef, SkillEffect, SkillTrigger, TeamEffectKind};
use crate::core::{
    Action, ActionRecord, BattleState, EngineError, FighterRef, GameRng, InvariantFailure, Judge,
    RuleViolation, SideId, SideMap, SideState, TurnPhase,
};
use crate::effects::{Effect, EffectResolver, Resolution, ResolverContext};
use crate::loader::GameTables;
use crate::triggers::{BattleEvent, DrawReason, PassiveRegistry};

use super::setup::BattleSetup;

/// Result of a finished battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    /// One side defeated the other.
    Winner(SideId),
    /// Neither side won (turn limit, or both sides fell together).
    Draw,
}

impl BattleResult {
    /// Check if a side won.
    #[must_use]
    pub fn is_winner(&self, side: SideId) -> bool {
        matches!(self, BattleResult::Winner(s) if *s == side)
    }
}

/// One battle in progress.
///
/// The judge type decides where dice come from; it defaults to a
/// [`GameRng`] derived from the battle seed.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
///
/// use lingcard::core::{Action, TurnPhase};
/// use lingcard::loader::GameTables;
/// use lingcard::rules::{Battle, BattleSetup};
///
/// let tables = Arc::new(GameTables::builtin().unwrap());
/// let mut battle = Battle::new(tables, BattleSetup::new(["cafe"], ["liuli"]), 7).unwrap();
///
/// assert_eq!(battle.phase(), TurnPhase::Action);
/// battle.submit(Action::EndTurn).unwrap();
/// assert_eq!(battle.state().turn(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct Battle<J: Judge = GameRng> {
    tables: Arc<GameTables>,
    setup: BattleSetup,
    seed: u64,
    state: BattleState,
    passives: PassiveRegistry,
    judge: J,
    result: Option<BattleResult>,
    log: Vec<BattleEvent>,
    history: Vec<ActionRecord>,
}

impl Battle<GameRng> {
    /// Start a battle whose dice come from `seed`.
    pub fn new(tables: Arc<GameTables>, setup: BattleSetup, seed: u64) -> Result<Self, EngineError> {
        let judge = GameRng::new(seed).for_context("judge");
        Self::with_judge(tables, setup, seed, judge)
    }

    /// Re-run a battle from its inputs.
    ///
    /// Produces the same state, log and result as the original run.
    pub fn replay(
        tables: Arc<GameTables>,
        setup: BattleSetup,
        seed: u64,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<Self, EngineError> {
        let mut battle = Self::new(tables, setup, seed)?;
        for action in actions {
            battle.submit(action)?;
        }
        Ok(battle)
    }
}

impl<J: Judge> Battle<J> {
    /// Start a battle with an explicit dice source.
    ///
    /// `seed` still drives deck shuffles. Deals opening hands and runs the
    /// first side's draw phase; the battle then waits for an action.
    pub fn with_judge(
        tables: Arc<GameTables>,
        setup: BattleSetup,
        seed: u64,
        judge: J,
    ) -> Result<Self, EngineError> {
        let rng = GameRng::new(seed);
        let mut passives = PassiveRegistry::new();
        let first = Self::build_side(&tables, &setup, SideId::FIRST, &rng, &mut passives)?;
        let second = Self::build_side(&tables, &setup, SideId::SECOND, &rng, &mut passives)?;
        let state = BattleState::new(
            SideMap::from_pair(first, second),
            setup.config.clone(),
            setup.first_side,
        );

        let mut battle = Self {
            tables,
            setup,
            seed,
            state,
            passives,
            judge,
            result: None,
            log: Vec::new(),
            history: Vec::new(),
        };

        let mut out = Resolution::new();
        let started = battle.open(&mut out);
        battle.log.extend(out.into_events());
        started?;

        tracing::debug!(
            seed,
            first = %battle.state.active_side(),
            passives = battle.passives.len(),
            "battle started"
        );
        Ok(battle)
    }

    /// Validate one side's roster, register its passives and build its deck.
    fn build_side(
        tables: &GameTables,
        setup: &BattleSetup,
        side: SideId,
        rng: &GameRng,
        passives: &mut PassiveRegistry,
    ) -> Result<SideState, RuleViolation> {
        let roster = Self::resolve_roster(tables, setup, side)?;
        for (slot, character) in roster.iter().enumerate() {
            passives.register_fighter(FighterRef::new(side, slot as u8), character);
        }

        let mut shuffler = rng.for_context(&format!("deck/{}", side.index()));
        let deck = match &setup.stacked_decks[side] {
            Some(cards) => {
                if let Some(unknown) = cards.iter().find(|&c| !tables.cards().contains(c)) {
                    return Err(RuleViolation::UnknownCard(unknown.clone()));
                }
                cards.clone()
            }
            None => {
                let mut cards = tables.cards().deck_list();
                shuffler.shuffle(&mut cards);
                cards
            }
        };
        Ok(SideState::new(&roster, Vector::from(deck), shuffler))
    }

    fn resolve_roster<'t>(
        tables: &'t GameTables,
        setup: &BattleSetup,
        side: SideId,
    ) -> Result<Vec<&'t CharacterDef>, RuleViolation> {
        let ids = setup.roster(side);
        let max = setup.config.max_roster;
        if ids.is_empty() || ids.len() > max {
            return Err(RuleViolation::RosterSize {
                side,
                found: ids.len(),
                max,
            });
        }

        let mut roster: Vec<&CharacterDef> = Vec::with_capacity(ids.len());
        for id in ids {
            let character = tables
                .character(id)
                .ok_or_else(|| RuleViolation::UnknownCharacter(id.clone()))?;
            if roster.iter().any(|c| c.id == *id) {
                return Err(RuleViolation::DuplicateCharacter {
                    side,
                    character: id.clone(),
                });
            }
            roster.push(character);
        }
        Ok(roster)
    }

    // === Accessors ===

    /// Read-only view of the battle state.
    #[must_use]
    pub fn state(&self) -> &BattleState {
        &self.state
    }

    #[must_use]
    pub fn tables(&self) -> &GameTables {
        &self.tables
    }

    #[must_use]
    pub fn setup(&self) -> &BattleSetup {
        &self.setup
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn judge(&self) -> &J {
        &self.judge
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn active_side(&self) -> SideId {
        self.state.active_side()
    }

    /// The result, once the battle is over.
    #[must_use]
    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    /// Every event since the battle was created.
    #[must_use]
    pub fn log(&self) -> &[BattleEvent] {
        &self.log
    }

    /// Every accepted action, in order.
    #[must_use]
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    /// The accepted actions alone, ready for [`Battle::replay`].
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.history.iter().map(|r| r.action.clone()).collect()
    }

    // === Legal actions ===

    /// Fighters a card played by `side` may target.
    #[must_use]
    pub fn legal_targets(&self, side: SideId, card: &ActionCard) -> Vec<FighterRef> {
        let target_side = match card.target {
            TargetType::Enemy => side.opponent(),
            TargetType::Ally => side,
        };
        self.state
            .side(target_side)
            .alive_slots()
            .map(|slot| FighterRef::new(target_side, slot))
            .collect()
    }

    /// Every action the active side may submit right now.
    ///
    /// Plays come first (by card ID, then actor slot, then target), then
    /// `EndTurn`. Empty when the battle is not waiting for an action.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.state.phase() != TurnPhase::Action {
            return Vec::new();
        }

        let side = self.state.active_side();
        let state = self.state.side(side);
        let mut actions = Vec::new();

        for (card_id, _) in state.hand().iter() {
            let Some(card) = self.tables.card(card_id) else {
                continue;
            };
            let targets = self.legal_targets(side, card);
            for actor in state.alive_slots() {
                for &target in &targets {
                    actions.push(Action::Play {
                        card: card_id.clone(),
                        actor: FighterRef::new(side, actor),
                        target,
                    });
                }
            }
        }

        actions.push(Action::EndTurn);
        actions
    }

    // === Submitting actions ===

    /// Apply an action from the active side.
    ///
    /// A rejected action leaves the battle untouched. An invariant failure
    /// faults the battle; it then rejects everything.
    #[tracing::instrument(skip(self), fields(turn = self.state.turn(), side = %self.state.active_side()))]
    pub fn submit(&mut self, action: Action) -> Result<Resolution, EngineError> {
        if let Err(violation) = self.validate(&action) {
            tracing::warn!(%action, %violation, "action rejected");
            return Err(violation.into());
        }

        let side = self.state.active_side();
        let sequence = self.state.side(side).flags().plays;
        self.history
            .push(ActionRecord::new(side, action.clone(), self.state.turn(), sequence));

        let mut out = Resolution::new();
        let applied = match action {
            Action::Play { card, actor, target } => self.play(side, &card, actor, target, &mut out),
            Action::EndTurn => self.end_turn(&mut out),
        };
        self.log.extend(out.iter().cloned());

        match applied {
            Ok(()) => Ok(out),
            Err(failure) => {
                tracing::error!(%failure, "invariant failure, battle halted");
                self.state.set_phase(TurnPhase::Faulted);
                Err(failure.into())
            }
        }
    }

    fn validate(&self, action: &Action) -> Result<(), RuleViolation> {
        match self.state.phase() {
            TurnPhase::BattleOver => return Err(RuleViolation::BattleOver),
            TurnPhase::Faulted => return Err(RuleViolation::Faulted),
            _ => {}
        }

        let Action::Play { card, actor, target } = action else {
            return Ok(());
        };
        let side = self.state.active_side();

        let definition = self
            .tables
            .card(card)
            .ok_or_else(|| RuleViolation::UnknownCard(card.clone()))?;
        if !self.state.side(side).hand().contains(card) {
            return Err(RuleViolation::CardNotHeld {
                side,
                card: card.clone(),
            });
        }

        let actor_reason = if actor.side != side {
            Some("not on the active side")
        } else {
            match self.state.fighter(*actor) {
                None => Some("no fighter in that slot"),
                Some(f) if !f.is_alive() => Some("fighter is down"),
                Some(_) => None,
            }
        };
        if let Some(reason) = actor_reason {
            return Err(RuleViolation::InvalidActor {
                fighter: *actor,
                reason,
            });
        }

        if !self.legal_targets(side, definition).contains(target) {
            let reason = match (definition.target, self.state.fighter(*target)) {
                (TargetType::Enemy, _) if target.side == side => "card targets an enemy",
                (TargetType::Ally, _) if target.side != side => "card targets an ally",
                (_, None) => "no fighter in that slot",
                _ => "fighter is down",
            };
            return Err(RuleViolation::InvalidTarget {
                fighter: *target,
                card: card.clone(),
                reason,
            });
        }
        Ok(())
    }

    // === Turn cycle ===

    fn apply(&mut self, effect: Effect, out: &mut Resolution) -> Result<(), InvariantFailure> {
        let mut ctx = ResolverContext::new(&self.tables, &self.passives, &mut self.judge);
        let resolution = EffectResolver::resolve(&mut self.state, &effect, &mut ctx)?;
        out.extend(resolution);
        self.check_winner(out);
        Ok(())
    }

    fn check_winner(&mut self, out: &mut Resolution) {
        if self.result.is_some() {
            return;
        }
        let defeated = SideMap::new(|side| self.state.side(side).is_defeated());
        let result = match (defeated[SideId::FIRST], defeated[SideId::SECOND]) {
            (false, false) => return,
            (true, true) => BattleResult::Draw,
            (true, false) => BattleResult::Winner(SideId::SECOND),
            (false, true) => BattleResult::Winner(SideId::FIRST),
        };
        self.finish(result, out);
    }

    fn finish(&mut self, result: BattleResult, out: &mut Resolution) {
        tracing::info!(?result, turn = self.state.turn(), "battle over");
        self.result = Some(result);
        self.state.set_phase(TurnPhase::BattleOver);
        out.push(BattleEvent::BattleOver { result });
    }

    /// Opening hands, then the first draw phase.
    fn open(&mut self, out: &mut Resolution) -> Result<(), InvariantFailure> {
        let opening = self.state.config().opening_hand;
        if opening > 0 {
            for side in SideId::both() {
                self.apply(Effect::draw(side, opening, DrawReason::OpeningHand), out)?;
            }
        }
        self.begin_turn(out)
    }

    fn begin_turn(&mut self, out: &mut Resolution) -> Result<(), InvariantFailure> {
        let side = self.state.active_side();
        let turn = self.state.turn();
        self.state.set_phase(TurnPhase::Draw);
        out.push(BattleEvent::TurnStarted { side, turn });
        tracing::debug!(%side, turn, "turn started");

        let base = self.state.config().base_draw;
        if base > 0 {
            self.apply(Effect::draw(side, base, DrawReason::TurnStart), out)?;
        }

        let extra: Vec<_> = self
            .tables
            .active_team_effects(TeamEffectKind::ExtraDraw, self.state.side(side).alive_roster())
            .into_iter()
            .map(|team| (team.id.clone(), team.kind, team.value))
            .collect();
        for (effect, kind, value) in extra {
            out.push(BattleEvent::TeamEffectTriggered { side, effect, kind });
            self.apply(Effect::draw(side, value, DrawReason::TeamEffect), out)?;
        }

        if self.state.side(side.opponent()).last_turn_attacked() == Some(false) {
            self.fire_draw_passives(side, SkillTrigger::OpponentNoAttack, out)?;
        }

        self.state.set_phase(TurnPhase::Action);
        Ok(())
    }

    /// Fire the `draw_card` passives of `side`'s standing fighters.
    fn fire_draw_passives(
        &mut self,
        side: SideId,
        trigger: SkillTrigger,
        out: &mut Resolution,
    ) -> Result<(), InvariantFailure> {
        let draws: Vec<_> = self
            .passives
            .on_side(side, trigger)
            .filter(|entry| self.state.fighter(entry.holder).is_some_and(|f| f.is_alive()))
            .filter_map(|entry| match entry.effect {
                SkillEffect::DrawCard { count } => Some((entry.holder, entry.skill.clone(), count)),
                _ => None,
            })
            .collect();

        for (holder, skill, count) in draws {
            out.push(BattleEvent::PassiveTriggered {
                holder,
                skill,
                trigger,
            });
            self.apply(Effect::draw(side, count, DrawReason::Passive), out)?;
        }
        Ok(())
    }

    fn play(
        &mut self,
        side: SideId,
        card: &CardId,
        actor: FighterRef,
        target: FighterRef,
        out: &mut Resolution,
    ) -> Result<(), InvariantFailure> {
        // validated: the card exists and is held
        let Some(definition) = self.tables.card(card).cloned() else {
            return Ok(());
        };

        let pile = self.state.side_mut(side);
        if !pile.spend(card) {
            return Err(InvariantFailure::PlayedCardMissing {
                side,
                card: card.clone(),
            });
        }
        pile.flags.card_played = true;
        pile.flags.plays += 1;
        if definition.is_attack() {
            pile.flags.attacked = true;
        }
        out.push(BattleEvent::CardPlayed {
            side,
            card: card.clone(),
            actor,
            target,
        });

        self.apply(Effect::from_card(&definition, actor, target), out)?;
        if self.is_over() {
            return Ok(());
        }

        let plays = self.state.side(side).flags().plays as usize;
        if plays >= self.state.config().max_plays_per_turn {
            self.end_turn(out)?;
        }
        Ok(())
    }

    fn end_turn(&mut self, out: &mut Resolution) -> Result<(), InvariantFailure> {
        let side = self.state.active_side();
        let turn = self.state.turn();

        self.state.set_phase(TurnPhase::PassiveResolution);
        if !self.state.side(side).flags().card_played {
            self.fire_draw_passives(side, SkillTrigger::TurnEndNoSkill, out)?;
        }

        self.state.set_phase(TurnPhase::EndOfTurn);
        let attacked = self.state.side(side).flags().attacked;
        self.state.side_mut(side).last_turn_attacked = Some(attacked);
        out.push(BattleEvent::TurnEnded {
            side,
            turn,
            attacked,
        });
        self.state.reset_turn_flags();

        if self.state.config().turn_limit.is_some_and(|limit| turn >= limit) {
            self.finish(BattleResult::Draw, out);
            return Ok(());
        }

        self.state.pass_turn();
        self.begin_turn(out)
    }
}
