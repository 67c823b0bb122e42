//! Facing and velocity smoothing.
//!
//! Controllers never set velocity directly. They pick a target velocity and
//! let [`smooth_damp`] ease towards it once per physics tick; the host then
//! integrates position from the resulting velocity.

use glam::Vec2;

/// Which way an actor looks. Mirrors probe and hitbox offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing that looks from `from_x` towards `to_x`. Ties keep `self`.
    pub fn towards(self, from_x: f32, to_x: f32) -> Self {
        if to_x > from_x {
            Facing::Right
        } else if to_x < from_x {
            Facing::Left
        } else {
            self
        }
    }

    /// Mirrors a local offset to world orientation.
    #[inline]
    pub fn mirror(self, offset: Vec2) -> Vec2 {
        Vec2::new(offset.x * self.sign(), offset.y)
    }
}

/// Critically damped spring towards `target`.
///
/// `rate` carries the spring's own velocity between calls and must persist
/// for as long as the same quantity is being smoothed. The result never
/// overshoots `target`.
pub fn smooth_damp(current: Vec2, target: Vec2, rate: &mut Vec2, smooth_time: f32, dt: f32) -> Vec2 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*rate + omega * change) * dt;
    *rate = (*rate - omega * temp) * decay;
    let output = target + (change + temp) * decay;

    if (target - current).dot(output - target) > 0.0 {
        *rate = Vec2::ZERO;
        return target;
    }
    output
}

/// Position, velocity and facing of one body.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    rate: Vec2,
}

impl Kinematics {
    pub fn new(position: Vec2, facing: Facing) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing,
            rate: Vec2::ZERO,
        }
    }

    /// Eases horizontal velocity towards `force` along the facing direction.
    ///
    /// Vertical velocity is held at or above `gravity` so falls cannot
    /// accelerate without bound.
    pub fn drive(&mut self, force: f32, gravity: f32, smooth: f32, dt: f32) {
        self.steer(force * self.facing.sign(), gravity, smooth, dt);
    }

    /// Eases horizontal velocity towards an absolute `vx`.
    pub fn steer(&mut self, vx: f32, gravity: f32, smooth: f32, dt: f32) {
        let target = Vec2::new(vx, self.velocity.y.max(gravity));
        self.velocity = smooth_damp(self.velocity, target, &mut self.rate, smooth, dt);
    }

    /// Eases horizontal velocity to rest.
    pub fn brake(&mut self, gravity: f32, smooth: f32, dt: f32) {
        self.steer(0.0, gravity, smooth, dt);
    }

    pub fn flip(&mut self) {
        self.facing = self.facing.flipped();
    }

    /// Turns to look at `x`. Returns `true` if the facing changed.
    pub fn face_towards(&mut self, x: f32) -> bool {
        let next = self.facing.towards(self.position.x, x);
        let flipped = next != self.facing;
        self.facing = next;
        flipped
    }

    /// Drops any stored smoothing momentum.
    pub fn reset_smoothing(&mut self) {
        self.rate = Vec2::ZERO;
    }
}
