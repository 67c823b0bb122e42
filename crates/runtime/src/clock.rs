//! Simulation clock with a fixed-timestep accumulator.
//!
//! Frame time is fed in by the caller, never read from the wall clock, so a
//! run is reproducible from its sequence of frame deltas.

/// Tracks simulated time and hands out whole fixed steps.
#[derive(Clone, Debug)]
pub struct SimClock {
    /// Total simulated time in seconds, including partial steps.
    pub total_time: f64,
    /// Last frame delta after clamping.
    pub delta_time: f64,
    /// Fixed timestep interval in seconds.
    pub fixed_timestep: f64,
    /// Fixed steps consumed so far.
    pub steps: u64,
    accumulator: f64,
}

impl SimClock {
    /// Longest frame the clock will account for. Longer frames are clamped so
    /// a stall cannot queue an unbounded number of fixed steps.
    pub const MAX_FRAME: f64 = 0.25;

    pub fn new(fixed_timestep: f32) -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: f64::from(fixed_timestep),
            steps: 0,
            accumulator: 0.0,
        }
    }

    /// Create a clock ticking at `hz` fixed steps per second.
    pub fn with_rate(hz: f64) -> Self {
        Self {
            fixed_timestep: 1.0 / hz,
            ..Self::new(0.0)
        }
    }

    /// Advance by one frame. Negative and NaN deltas count as zero.
    pub fn advance(&mut self, frame_dt: f64) {
        let dt = if frame_dt.is_nan() {
            0.0
        } else {
            frame_dt.clamp(0.0, Self::MAX_FRAME)
        };
        self.delta_time = dt;
        self.total_time += dt;
        self.accumulator += dt;
    }

    /// Returns true if there's enough accumulated time for a fixed update step.
    pub fn should_fixed_update(&self) -> bool {
        self.accumulator + Self::EPSILON >= self.fixed_timestep
    }

    /// Consume one fixed timestep from the accumulator.
    pub fn consume_fixed_step(&mut self) {
        self.accumulator = (self.accumulator - self.fixed_timestep).max(0.0);
        self.steps += 1;
    }

    /// Simulated time covered by consumed fixed steps.
    pub fn fixed_time(&self) -> f64 {
        self.steps as f64 * self.fixed_timestep
    }

    /// Interpolation alpha for rendering between fixed steps.
    pub fn interpolation_alpha(&self) -> f64 {
        (self.accumulator / self.fixed_timestep).clamp(0.0, 1.0)
    }

    // Absorbs rounding when frame and step durations are equal in theory.
    const EPSILON: f64 = 1e-9;
}
