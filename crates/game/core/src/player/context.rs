//! Data the player states act on.

use actor_fsm::Context;
use glam::Vec2;

use crate::config::PlayerTuning;
use crate::geometry::BodyId;
use crate::health::Health;
use crate::intent::{Cue, Intent, Outbox};
use crate::motion::{Facing, Kinematics};
use crate::observer::Observers;
use crate::sensor::QueryBuffer;

use super::{PlayerBehavior, PlayerInput};

/// Everything a [`PlayerController`](super::PlayerController) shares with its
/// states.
pub struct PlayerContext {
    pub(crate) body: BodyId,
    pub(crate) tuning: PlayerTuning,
    pub(crate) gravity: f32,
    pub(crate) health: Health,
    pub(crate) motion: Kinematics,
    /// Buttons pressed this tick; see [`PlayerInput::pressed_since`].
    pub(crate) input: PlayerInput,
    /// Raw input from the last `set_input`.
    pub(crate) held: PlayerInput,
    pub(crate) ground: bool,
    pub(crate) can_stand: bool,
    pub(crate) crouch: bool,
    /// Current velocity smoothing: air or land strafe.
    pub(crate) smooth: f32,
    pub(crate) dashed: bool,
    /// Free distance ahead, measured when a dash is requested.
    pub(crate) dash_reach: f32,
    pub(crate) step: f32,
    pub(crate) outbox: Outbox,
    pub(crate) buffer: QueryBuffer,
    pub(crate) behavior: Observers<PlayerBehavior>,
}

impl PlayerContext {
    pub(crate) const INITIAL_SMOOTH: f32 = 0.05;

    /// Toggles crouching from the vertical axis. A blocked ceiling keeps the
    /// player down.
    fn update_crouch(&mut self) {
        if self.input.axis.y < 0.0 && !self.crouch {
            self.crouch = true;
            self.motion.velocity.y += self.gravity * 0.5;
            self.outbox.push(Intent::Cue(Cue("crouch")));
        } else if self.input.axis.y >= 0.0 && self.crouch && self.can_stand {
            self.crouch = false;
            self.outbox.push(Intent::Cue(Cue("stand")));
        }
    }

    /// Horizontal run with crouch slowdown; turns to face the run direction.
    pub fn locomote(&mut self, allow_crouch: bool) {
        if allow_crouch {
            self.update_crouch();
        }

        let mut run = self.input.axis.x * self.tuning.speed;
        if self.crouch {
            run *= self.tuning.crouch_speed;
        }
        self.motion.steer(run, self.gravity, self.smooth, self.step);

        let facing = self.motion.facing;
        if (facing == Facing::Right && run < 0.0) || (facing == Facing::Left && run > 0.0) {
            self.motion.flip();
        }
    }

    pub fn can_jump(&self) -> bool {
        self.tuning.can_jump && self.ground && !self.crouch
    }

    pub fn jump(&mut self) {
        self.ground = false;
        self.motion.velocity.y = self.tuning.jump_force;
        self.motion.reset_smoothing();
        self.outbox.push(Intent::Cue(Cue("jump")));
    }

    pub fn wants_dash(&self) -> bool {
        self.input.dash && self.tuning.can_dash && !self.dashed
    }

    /// End point of a dash from the current position.
    pub fn dash_target(&self) -> Vec2 {
        let direction = Vec2::new(self.motion.facing.sign(), 0.0);
        self.motion.position + direction * self.dash_reach
    }
}

impl Context for PlayerContext {
    type Tag = PlayerBehavior;

    fn state_changed(&mut self, tag: PlayerBehavior) {
        tracing::debug!(body = %self.body, behavior = %tag, "player behavior changed");
        self.behavior.notify(&tag);
    }
}
