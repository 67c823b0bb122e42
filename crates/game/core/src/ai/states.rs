//! Move, Chase, Attack, Flee, Hurt and Stun.

use actor_fsm::{State, Suspend, Transition};
use glam::Vec2;

use super::AiBehavior;
use super::context::AiContext;

type Next = Transition<AiContext>;

/// Patrol: walk forward, turn at walls and ledges, chase anything visible.
pub struct Move {
    speed: f32,
    was_ground: bool,
}

impl Move {
    pub fn new() -> Self {
        Self {
            speed: 0.0,
            was_ground: true,
        }
    }
}

impl State<AiContext> for Move {
    fn tag(&self) -> AiBehavior {
        AiBehavior::Move
    }

    fn enter(&mut self, ctx: &mut AiContext, next: &mut Next) -> Suspend {
        self.speed = ctx.tuning.speed;
        if ctx.target_visible() {
            next.to(Chase::new());
        }
        Suspend::Done
    }

    fn fixed_execute(&mut self, ctx: &mut AiContext, next: &mut Next) {
        if ctx.wall {
            ctx.switch_side();
        }

        if !ctx.ground && self.was_ground {
            ctx.switch_side();
            self.was_ground = false;
        } else if ctx.ground && !self.was_ground {
            self.was_ground = true;
        }

        ctx.move_with(self.speed);

        if ctx.target_visible() {
            next.to(Chase::new());
        }
    }
}

/// Close in on the target until it is in reach or out of sight.
pub struct Chase;

impl Chase {
    pub fn new() -> Self {
        Self
    }
}

impl State<AiContext> for Chase {
    fn tag(&self) -> AiBehavior {
        AiBehavior::Chase
    }

    fn enter(&mut self, ctx: &mut AiContext, next: &mut Next) -> Suspend {
        if ctx.target.is_none() {
            next.to(Move::new());
        }
        Suspend::Done
    }

    fn fixed_execute(&mut self, ctx: &mut AiContext, next: &mut Next) {
        let Some(target) = ctx.target else {
            next.to(Move::new());
            return;
        };

        let distance = ctx.motion.position.distance(target);
        if distance <= ctx.tuning.attack_range {
            next.to(Attack::new());
            return;
        }
        if distance > ctx.tuning.view_distance {
            next.to(Move::new());
            return;
        }

        ctx.motion.face_towards(target.x);
        ctx.move_with(ctx.tuning.chase_speed);
    }
}

/// A single swing: hitbox on, hold for `attack_rate`, hitbox off, chase.
pub struct Attack {
    swung: bool,
}

impl Attack {
    pub fn new() -> Self {
        Self { swung: false }
    }
}

impl State<AiContext> for Attack {
    fn tag(&self) -> AiBehavior {
        AiBehavior::Attack
    }

    fn enter(&mut self, ctx: &mut AiContext, next: &mut Next) -> Suspend {
        if !self.swung {
            self.swung = true;
            ctx.set_attack_hitbox(true);
            return Suspend::Seconds(ctx.tuning.attack_rate);
        }

        ctx.set_attack_hitbox(false);
        next.to(Chase::new());
        Suspend::Done
    }

    fn fixed_execute(&mut self, ctx: &mut AiContext, _next: &mut Next) {
        ctx.brake();
    }

    fn exit(&mut self, ctx: &mut AiContext) {
        ctx.set_attack_hitbox(false);
    }
}

/// Run away from the target until `flee_range` away from where fleeing began.
pub struct Flee {
    origin: Vec2,
}

impl Flee {
    pub fn new() -> Self {
        Self { origin: Vec2::ZERO }
    }
}

impl State<AiContext> for Flee {
    fn tag(&self) -> AiBehavior {
        AiBehavior::Flee
    }

    fn enter(&mut self, ctx: &mut AiContext, _next: &mut Next) -> Suspend {
        let position = ctx.motion.position;
        self.origin = position;

        // Away from the target, or back towards the origin of the level.
        let away = match ctx.target {
            Some(target) if position.x < target.x => -1.0,
            Some(_) => 1.0,
            None if position.x < 0.0 => 1.0,
            None => -1.0,
        };
        ctx.motion.face_towards(position.x + away);
        Suspend::Done
    }

    fn fixed_execute(&mut self, ctx: &mut AiContext, next: &mut Next) {
        if ctx.motion.position.distance(self.origin) >= ctx.tuning.flee_range {
            next.to(Move::new());
            return;
        }
        ctx.move_with(ctx.tuning.flee_speed);
    }
}

/// Decides how to react to a hit. Never stays current past its entry.
pub struct Hurt;

impl Hurt {
    pub fn new() -> Self {
        Self
    }
}

impl State<AiContext> for Hurt {
    fn tag(&self) -> AiBehavior {
        AiBehavior::Hurt
    }

    fn enter(&mut self, ctx: &mut AiContext, next: &mut Next) -> Suspend {
        if ctx.tuning.can_stun {
            next.to(Stun::new());
            return Suspend::Done;
        }
        if ctx.should_flee() {
            next.to(Flee::new());
            return Suspend::Done;
        }

        let distance = ctx.distance_to_target();
        if distance <= ctx.tuning.attack_range {
            next.to(Attack::new());
        } else if distance <= ctx.tuning.view_distance {
            next.to(Chase::new());
        } else {
            next.to(Move::new());
        }
        Suspend::Done
    }
}

/// Stand still for `stun_duration`, then patrol.
pub struct Stun {
    waited: bool,
}

impl Stun {
    pub fn new() -> Self {
        Self { waited: false }
    }
}

impl State<AiContext> for Stun {
    fn tag(&self) -> AiBehavior {
        AiBehavior::Stun
    }

    fn enter(&mut self, ctx: &mut AiContext, next: &mut Next) -> Suspend {
        if !self.waited {
            self.waited = true;
            return Suspend::Seconds(ctx.tuning.stun_duration);
        }
        next.to(Move::new());
        Suspend::Done
    }

    fn fixed_execute(&mut self, ctx: &mut AiContext, _next: &mut Next) {
        ctx.brake();
    }
}
