//! Intro, Idle, Roar, Attack, Pause, Recover and Dying.
//!
//! Every phase is a timed entry phase; the boss does nothing on per-tick
//! updates.

use actor_fsm::{State, Suspend, Transition};

use crate::intent::Intent;

use super::BossEvent;
use super::context::BossContext;

type Next = Transition<BossContext>;

pub struct Intro {
    waited: bool,
}

impl Intro {
    pub fn new() -> Self {
        Self { waited: false }
    }
}

impl State<BossContext> for Intro {
    fn tag(&self) -> BossEvent {
        BossEvent::Intro
    }

    fn enter(&mut self, ctx: &mut BossContext, next: &mut Next) -> Suspend {
        if !self.waited {
            self.waited = true;
            return Suspend::Seconds(ctx.timings.intro);
        }
        next.to(Idle::new());
        Suspend::Done
    }
}

pub struct Idle {
    waited: bool,
}

impl Idle {
    pub fn new() -> Self {
        Self { waited: false }
    }
}

impl State<BossContext> for Idle {
    fn tag(&self) -> BossEvent {
        BossEvent::Idle
    }

    fn enter(&mut self, ctx: &mut BossContext, next: &mut Next) -> Suspend {
        if !self.waited {
            self.waited = true;
            return Suspend::Seconds(ctx.timings.idle);
        }
        if ctx.wants_roar() {
            next.to(Roar::new());
        } else {
            next.to(Attack::new());
        }
        Suspend::Done
    }
}

pub struct Roar {
    waited: bool,
}

impl Roar {
    pub fn new() -> Self {
        Self { waited: false }
    }
}

impl State<BossContext> for Roar {
    fn tag(&self) -> BossEvent {
        BossEvent::Roar
    }

    fn enter(&mut self, ctx: &mut BossContext, next: &mut Next) -> Suspend {
        if !self.waited {
            self.waited = true;
            return Suspend::Seconds(ctx.timings.roar);
        }
        next.to(Idle::new());
        Suspend::Done
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AttackStep {
    Body,
    Head,
    Done,
}

/// Body hitboxes on, head strike partway through, then pause.
pub struct Attack {
    step: AttackStep,
}

impl Attack {
    pub fn new() -> Self {
        Self {
            step: AttackStep::Body,
        }
    }
}

impl State<BossContext> for Attack {
    fn tag(&self) -> BossEvent {
        BossEvent::Attack
    }

    fn enter(&mut self, ctx: &mut BossContext, next: &mut Next) -> Suspend {
        match self.step {
            AttackStep::Body => {
                self.step = AttackStep::Head;
                ctx.set_hitboxes(true);
                Suspend::Seconds(ctx.timings.head_delay)
            }
            AttackStep::Head => {
                self.step = AttackStep::Done;
                ctx.set_head_hitbox(true);
                Suspend::Seconds((ctx.timings.attack - ctx.timings.head_delay).max(0.0))
            }
            AttackStep::Done => {
                next.to(Pause::new());
                Suspend::Done
            }
        }
    }
}

/// Holds the pose, then drops every hitbox.
pub struct Pause {
    waited: bool,
}

impl Pause {
    pub fn new() -> Self {
        Self { waited: false }
    }
}

impl State<BossContext> for Pause {
    fn tag(&self) -> BossEvent {
        BossEvent::Pause
    }

    fn enter(&mut self, ctx: &mut BossContext, next: &mut Next) -> Suspend {
        if !self.waited {
            self.waited = true;
            return Suspend::Seconds(ctx.timings.pause);
        }
        ctx.set_hitboxes(false);
        ctx.set_head_hitbox(false);
        next.to(Recover::new());
        Suspend::Done
    }
}

pub struct Recover {
    waited: bool,
}

impl Recover {
    pub fn new() -> Self {
        Self { waited: false }
    }
}

impl State<BossContext> for Recover {
    fn tag(&self) -> BossEvent {
        BossEvent::Recover
    }

    fn enter(&mut self, ctx: &mut BossContext, next: &mut Next) -> Suspend {
        if !self.waited {
            self.waited = true;
            ctx.set_head_hitbox(false);
            return Suspend::Seconds(ctx.timings.recover);
        }
        next.to(Idle::new());
        Suspend::Done
    }
}

/// Terminal phase. Pieces go first, the boss finishes after its death clip.
pub struct Dying {
    waited: bool,
}

impl Dying {
    pub fn new() -> Self {
        Self { waited: false }
    }
}

impl State<BossContext> for Dying {
    fn tag(&self) -> BossEvent {
        BossEvent::Dead
    }

    fn enter(&mut self, ctx: &mut BossContext, _next: &mut Next) -> Suspend {
        if !self.waited {
            self.waited = true;
            ctx.set_head_hitbox(false);
            ctx.tear_down_pieces();
            ctx.outbox.push(Intent::Died);
            return Suspend::Seconds(ctx.timings.dying);
        }
        tracing::info!(body = %ctx.body, "boss death sequence complete");
        ctx.finished = true;
        Suspend::Done
    }
}
