//! Deterministic random number generation carried inside match state.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **State-carried**: Lives in `MatchState`, so replaying the same commands
//!   from the same initial state reproduces every roll and shuffle
//! - **Serializable**: O(1) state capture and restore via the ChaCha word position
//! - **Context streams**: Independent sequences for different purposes
//!
//! Rules must never reach for ambient randomness; dice, shuffles and random
//! picks all come from here.
//!
//! ```
//! use tabletop_engine::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.roll_dice(3, 6), b.roll_dice(3, 6));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

const FOLD_K: u64 = 0x517c_c1b7_2722_0a95;

/// Fx-style multiply-rotate fold over little-endian 64-bit words.
///
/// Same output on every target, unlike `FxHasher`, whose word width
/// follows `usize`. The input length is folded in last.
#[must_use]
pub fn fold64(bytes: &[u8]) -> u64 {
    let mut hash = 0u64;
    for chunk in bytes.chunks(8) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        hash = (hash.rotate_left(5) ^ u64::from_le_bytes(word)).wrapping_mul(FOLD_K);
    }
    (hash.rotate_left(5) ^ bytes.len() as u64).wrapping_mul(FOLD_K)
}

/// Dice rolled by one command. Five dice fit inline.
pub type DiceRoll = SmallVec<[u8; 5]>;

/// Deterministic RNG carried by the match state.
///
/// Uses ChaCha8 for speed while keeping a portable, seed-defined sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "GameRngState", from = "GameRngState")]
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

    /// Seed this generator was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Create an independent stream for a specific context.
    ///
    /// Useful for separating randomness domains (e.g., deck shuffling vs dice).
    /// The same context always produces the same stream from the same seed.
    /// The derived seed is [`fold64`] of the seed bytes and the context, so
    /// it does not depend on the target's word size.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut bytes = self.seed.to_le_bytes().to_vec();
        bytes.extend_from_slice(context.as_bytes());
        Self::new(fold64(&bytes))
    }

    /// Generate a random integer in the given range.
    pub fn gen_range(&mut self, range: std::ops::Range<i32>) -> i32 {
        self.inner.gen_range(range)
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Roll one die with `sides` faces, returning 1..=sides.
    ///
    /// A die with zero sides always shows 0.
    pub fn roll_die(&mut self, sides: u8) -> u8 {
        if sides == 0 {
            return 0;
        }
        self.inner.gen_range(1..=sides)
    }

    /// Roll `count` dice with `sides` faces each, in roll order.
    pub fn roll_dice(&mut self, count: usize, sides: u8) -> DiceRoll {
        (0..count).map(|_| self.roll_die(sides)).collect()
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

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
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

impl PartialEq for GameRng {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state()
    }
}

impl Eq for GameRng {}

impl From<GameRng> for GameRngState {
    fn from(rng: GameRng) -> Self {
        rng.state()
    }
}

impl From<GameRngState> for GameRng {
    fn from(state: GameRngState) -> Self {
        GameRng::from_state(&state)
    }
}

/// Serializable RNG state for snapshots and replay.
///
/// Uses the ChaCha8 word position for O(1) serialization regardless of
/// how many random numbers have been generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}
