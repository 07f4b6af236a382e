//! Deterministic random number generation and the dice judge.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **Context streams**: Independent sequences for different purposes,
//!   so deck shuffles never shift the dice and vice versa
//! - **Judge seam**: dice passives roll through the [`Judge`] trait, which is
//!   implemented by [`GameRng`] and by [`ScriptedRolls`] for exact replays
//!
//! ## Usage
//!
//! ```
//! use lingcard::core::{GameRng, Judge};
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//!
//! // Same seed, same dice
//! assert_eq!(a.roll(1, 6), b.roll(1, 6));
//!
//! // Context streams are independent of the parent
//! let mut deck_a = a.for_context("deck");
//! let mut deck_b = b.for_context("deck");
//! assert_eq!(deck_a.gen_range_usize(0..100), deck_b.gen_range_usize(0..100));
//! ```

use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// Source of dice judgments for luck-based passives.
///
/// Implementations must be deterministic for a given construction so a
/// battle replays exactly from its seed and action history.
pub trait Judge {
    /// Roll an integer uniformly in `[low, high]`.
    fn roll(&mut self, low: i32, high: i32) -> i32;
}

/// Deterministic RNG backed by ChaCha8.
///
/// Uses ChaCha8 for speed while maintaining high quality randomness.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Create an independent stream for a specific context.
    ///
    /// The same context always produces the same stream from the same seed,
    /// regardless of how far this generator has advanced. FxHash keeps the
    /// derived seed stable across processes.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Save the current position for checkpointing.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore a generator saved with [`GameRng::state`].
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG position.
///
/// Uses the ChaCha8 word position, so the size is constant no matter how
/// many rolls have been made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed.
    pub seed: u64,
    /// ChaCha8 word position.
    pub word_pos: u128,
}

impl Judge for GameRng {
    fn roll(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }
}

/// A judge that replays a fixed sequence of rolls.
///
/// Used to reproduce a recorded battle from its `DiceRolled` events, and to
/// pin dice outcomes in tests. Each scripted value is clamped into the
/// requested range; once the script runs out every roll returns `low`, logs
/// a warning and counts as an overrun.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRolls {
    rolls: VecDeque<i32>,
    overruns: usize,
}

impl ScriptedRolls {
    /// Create a script from the given rolls, consumed front to back.
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            overruns: 0,
        }
    }

    /// Number of scripted rolls not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }

    /// Rolls requested after the script ran out.
    ///
    /// Non-zero means the script is out of step with the battle.
    #[must_use]
    pub fn overruns(&self) -> usize {
        self.overruns
    }
}

impl Judge for ScriptedRolls {
    fn roll(&mut self, low: i32, high: i32) -> i32 {
        match self.rolls.pop_front() {
            Some(value) => value.clamp(low, high.max(low)),
            None => {
                self.overruns += 1;
                tracing::warn!(low, high, overruns = self.overruns, "dice script exhausted");
                low
            }
        }
    }
}

impl<J: Judge + ?Sized> Judge for &mut J {
    fn roll(&mut self, low: i32, high: i32) -> i32 {
        (**self).roll(low, high)
    }
}
