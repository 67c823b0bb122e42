//! Pluggable random decisions.
//!
//! Every random branch in the behaviors (AI flee roll, boss roar roll) draws
//! from a [`Chance`] owned by the actor, so tests and replays can inject a
//! fixed or seeded source.

/// Source of uniform draws in `[0, 1)`.
pub trait Chance {
    fn roll(&mut self) -> f32;
}

/// Always returns the same value. Clamped into `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedChance(pub f32);

impl Chance for FixedChance {
    fn roll(&mut self) -> f32 {
        self.0.clamp(0.0, 1.0)
    }
}

/// Seeded PCG-XSH-RR generator.
///
/// Same seed, same sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcgChance {
    state: u64,
}

impl PcgChance {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = Self::step(self.state);
        Self::output(self.state)
    }
}

impl Chance for PcgChance {
    fn roll(&mut self) -> f32 {
        // Top 24 bits map exactly onto the f32 mantissa.
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// Derives an independent seed per actor and per decision stream.
///
/// * `game_seed` - base seed for the whole run
/// * `actor_id` - body of the actor drawing
/// * `stream` - distinguishes several generators owned by the same actor
pub fn compute_seed(game_seed: u64, actor_id: u32, stream: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (stream as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
