//! Grounded, Airborne, Dashing and Dead.

use actor_fsm::{State, Suspend, Transition};
use glam::Vec2;

use super::PlayerBehavior;
use super::context::PlayerContext;

type Next = Transition<PlayerContext>;

pub struct Grounded;

impl State<PlayerContext> for Grounded {
    fn tag(&self) -> PlayerBehavior {
        PlayerBehavior::Grounded
    }

    fn fixed_execute(&mut self, ctx: &mut PlayerContext, next: &mut Next) {
        if ctx.wants_dash() {
            next.to(Dashing::new());
            return;
        }

        ctx.locomote(true);

        if ctx.input.jump && ctx.can_jump() {
            ctx.jump();
            next.to(Airborne);
        } else if !ctx.ground {
            next.to(Airborne);
        }
    }
}

pub struct Airborne;

impl State<PlayerContext> for Airborne {
    fn tag(&self) -> PlayerBehavior {
        PlayerBehavior::Airborne
    }

    fn fixed_execute(&mut self, ctx: &mut PlayerContext, next: &mut Next) {
        if ctx.wants_dash() {
            next.to(Dashing::new());
            return;
        }

        ctx.locomote(false);

        if ctx.ground {
            next.to(Grounded);
        }
    }
}

/// Slides to a wall-clipped point over `dash_duration`, ignoring input.
pub struct Dashing {
    origin: Vec2,
    target: Vec2,
    progress: f32,
    started: bool,
}

impl Dashing {
    pub fn new() -> Self {
        Self {
            origin: Vec2::ZERO,
            target: Vec2::ZERO,
            progress: 0.0,
            started: false,
        }
    }
}

impl State<PlayerContext> for Dashing {
    fn tag(&self) -> PlayerBehavior {
        PlayerBehavior::Dashing
    }

    fn enter(&mut self, ctx: &mut PlayerContext, next: &mut Next) -> Suspend {
        if !self.started {
            self.started = true;
            ctx.dashed = true;
            self.origin = ctx.motion.position;
            self.target = ctx.dash_target();
            tracing::debug!(from = ?self.origin, to = ?self.target, "dash");
            return Suspend::Seconds(ctx.tuning.dash_duration);
        }

        if ctx.ground {
            next.to(Grounded);
        } else {
            next.to(Airborne);
        }
        Suspend::Done
    }

    fn fixed_execute(&mut self, ctx: &mut PlayerContext, _next: &mut Next) {
        if self.progress >= 1.0 {
            return;
        }
        self.progress = (self.progress + ctx.step / ctx.tuning.dash_duration).min(1.0);
        ctx.motion.position = self.origin.lerp(self.target, self.progress);
        ctx.motion.velocity = Vec2::ZERO;
        ctx.motion.reset_smoothing();
    }
}

pub struct Dead;

impl State<PlayerContext> for Dead {
    fn tag(&self) -> PlayerBehavior {
        PlayerBehavior::Dead
    }

    fn fixed_execute(&mut self, ctx: &mut PlayerContext, _next: &mut Next) {
        ctx.motion.brake(ctx.gravity, ctx.smooth, ctx.step);
    }
}
