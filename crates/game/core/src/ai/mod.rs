//! Enemy AI: patrol, chase, attack, flee, hurt and stun.
//!
//! [`AiMachine`] owns the enemy's health, kinematics and state machine.
//! Sensing happens at the start of every physics tick, before the current
//! state's fixed update:
//!
//! - ground: any non-self body under the ground probe
//! - wall: any non-self body under the wall probe (if configured)
//!
//! Incoming damage always interrupts the current behavior with
//! [`AiBehavior::Hurt`], which immediately branches to the reaction.

mod context;
mod states;

pub use context::AiContext;

use actor_fsm::StateMachine;
use glam::Vec2;

use crate::actor::{Actor, ActorKind, BehaviorHandler, BehaviorTag, Collider};
use crate::combat::Damageable;
use crate::config::{AiTuning, GameConfig};
use crate::error::CoreError;
use crate::geometry::{BodyId, Layers};
use crate::health::{Health, HealthReport};
use crate::intent::{Intent, Outbox};
use crate::motion::{Facing, Kinematics};
use crate::observer::{Observers, SubscriptionId};
use crate::rng::Chance;
use crate::sensor::{QueryBuffer, Sensor, touches_other};

use states::{Hurt, Move};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AiBehavior {
    Move,
    Chase,
    Attack,
    Flee,
    Hurt,
    Stun,
}

/// Enemy controller.
pub struct AiMachine {
    machine: StateMachine<AiContext>,
    ctx: AiContext,
    dead: bool,
}

impl AiMachine {
    pub fn new(
        body: BodyId,
        position: Vec2,
        facing: Facing,
        tuning: AiTuning,
        config: &GameConfig,
        chance: Box<dyn Chance>,
    ) -> Result<Self, CoreError> {
        tuning.validate()?;
        config.validate()?;

        let ctx = AiContext {
            body,
            health: Health::new(tuning.initial_health),
            tuning,
            gravity: config.gravity,
            motion: Kinematics::new(position, facing),
            ground: false,
            wall: false,
            target: None,
            step: config.fixed_timestep,
            chance,
            outbox: Outbox::new(),
            buffer: QueryBuffer::new(),
            behavior: Observers::new(),
            attack_enabled: false,
        };

        Ok(Self {
            machine: StateMachine::with_max_chain(config.max_transition_chain),
            ctx,
            dead: false,
        })
    }

    pub fn current(&self) -> Option<AiBehavior> {
        self.machine.current_tag()
    }

    pub fn machine(&self) -> &StateMachine<AiContext> {
        &self.machine
    }

    pub fn tuning(&self) -> &AiTuning {
        &self.ctx.tuning
    }

    pub fn target(&self) -> Option<Vec2> {
        self.ctx.target
    }

    pub fn unassign_target(&mut self) {
        self.ctx.target = None;
    }

    pub fn is_ground(&self) -> bool {
        self.ctx.ground
    }

    pub fn wall_exists(&self) -> bool {
        self.ctx.wall
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Subscribes to behavior changes.
    pub fn subscribe(&mut self, handler: impl FnMut(&AiBehavior) + 'static) -> SubscriptionId {
        self.ctx.behavior.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.ctx.behavior.unsubscribe(id)
    }

    /// Applies damage and interrupts whatever the enemy was doing.
    pub fn on_hurt(&mut self, amount: u32) -> Result<HealthReport, CoreError> {
        if self.dead {
            return Ok(self.ctx.health.apply_damage(amount));
        }

        let report = self.ctx.health.apply_damage(amount);
        if report.depleted {
            self.die();
            return Ok(report);
        }

        self.machine.transition_to(&mut self.ctx, Hurt::new())?;
        Ok(report)
    }

    /// Healing never changes behavior.
    pub fn on_heal(&mut self, amount: u32) -> HealthReport {
        self.ctx.health.apply_heal(amount)
    }

    fn die(&mut self) {
        tracing::info!(body = %self.ctx.body, "enemy died");
        self.dead = true;
        self.machine.stop(&mut self.ctx);
        self.ctx.outbox.push(Intent::Died);
    }

    fn sense(&mut self, sensor: &dyn Sensor) {
        let ctx = &mut self.ctx;
        let position = ctx.motion.position;
        let facing = ctx.motion.facing;

        let probe = ctx.tuning.ground_probe.at(position, facing);
        ctx.ground = touches_other(sensor, &probe, ctx.body, &mut ctx.buffer);

        ctx.wall = match ctx.tuning.wall_probe {
            Some(spec) => {
                let probe = spec.at(position, facing);
                touches_other(sensor, &probe, ctx.body, &mut ctx.buffer)
            }
            None => false,
        };
    }
}

impl Damageable for AiMachine {
    fn health(&self) -> &Health {
        &self.ctx.health
    }

    fn receive_damage(&mut self, amount: u32) -> Result<HealthReport, CoreError> {
        self.on_hurt(amount)
    }

    fn receive_heal(&mut self, amount: u32) -> Result<HealthReport, CoreError> {
        Ok(self.on_heal(amount))
    }
}

impl Actor for AiMachine {
    fn kind(&self) -> ActorKind {
        ActorKind::Enemy
    }

    fn body(&self) -> BodyId {
        self.ctx.body
    }

    fn kinematics(&self) -> &Kinematics {
        &self.ctx.motion
    }

    fn kinematics_mut(&mut self) -> &mut Kinematics {
        &mut self.ctx.motion
    }

    fn behavior(&self) -> Option<BehaviorTag> {
        self.current().map(BehaviorTag::Ai)
    }

    fn colliders(&self, out: &mut Vec<Collider>) {
        out.push(Collider {
            body: self.ctx.body,
            shape: self.ctx.tuning.body,
            position: self.ctx.motion.position,
            layers: Layers::ENEMY,
        });
    }

    fn subscribe_behavior(&mut self, mut handler: BehaviorHandler) -> SubscriptionId {
        self.subscribe(move |tag| handler(&BehaviorTag::Ai(*tag)))
    }

    fn unsubscribe_behavior(&mut self, id: SubscriptionId) -> bool {
        self.unsubscribe(id)
    }

    fn set_target(&mut self, target: Option<Vec2>) {
        self.ctx.target = target;
    }

    fn on_spawn(&mut self) -> Result<(), CoreError> {
        tracing::info!(body = %self.ctx.body, position = ?self.ctx.motion.position, "enemy spawned");
        self.machine.transition_to(&mut self.ctx, Move::new())?;
        Ok(())
    }

    fn on_tick(&mut self, dt: f32) -> Result<(), CoreError> {
        if self.dead {
            return Ok(());
        }
        self.machine.tick(&mut self.ctx, dt)?;
        Ok(())
    }

    fn on_fixed_tick(&mut self, sensor: &dyn Sensor, dt: f32) -> Result<(), CoreError> {
        if self.dead {
            return Ok(());
        }
        self.ctx.step = dt;
        self.sense(sensor);
        self.machine.fixed_tick(&mut self.ctx)?;
        Ok(())
    }

    fn on_destroy(&mut self) {
        self.machine.stop(&mut self.ctx);
        self.ctx.behavior.clear();
        tracing::debug!(body = %self.ctx.body, "enemy destroyed");
    }

    fn drain_intents(&mut self, out: &mut Vec<Intent>) {
        self.ctx.outbox.drain_into(out);
    }

    fn is_finished(&self) -> bool {
        self.dead
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::geometry::Shape;
    use crate::intent::HitboxSlot;
    use crate::rng::FixedChance;
    use crate::sensor::fake::FakeSensor;

    const DT: f32 = 0.02;

    /// Fails the test if a random draw is ever made.
    struct NoDraw;

    impl Chance for NoDraw {
        fn roll(&mut self) -> f32 {
            panic!("unexpected random draw");
        }
    }

    fn floor() -> FakeSensor {
        FakeSensor::default().with(
            100,
            Shape::rect(Vec2::new(50.0, 0.5)),
            Vec2::new(0.0, -1.0),
            Layers::GROUND,
        )
    }

    fn spawn(tuning: AiTuning, chance: Box<dyn Chance>) -> (AiMachine, Rc<RefCell<Vec<AiBehavior>>>) {
        let mut ai = AiMachine::new(
            BodyId(1),
            Vec2::ZERO,
            Facing::Right,
            tuning,
            &GameConfig::default(),
            chance,
        )
        .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ai.subscribe(move |tag| sink.borrow_mut().push(*tag));
        ai.on_spawn().unwrap();
        (ai, seen)
    }

    fn frame(ai: &mut AiMachine, sensor: &FakeSensor) {
        ai.on_fixed_tick(sensor, DT).unwrap();
        ai.on_tick(DT).unwrap();
    }

    #[test]
    fn keeps_patrolling_without_a_target() {
        let (mut ai, seen) = spawn(AiTuning::default(), Box::new(NoDraw));
        let sensor = floor();

        for _ in 0..300 {
            frame(&mut ai, &sensor);
        }

        assert_eq!(ai.current(), Some(AiBehavior::Move));
        assert_eq!(*seen.borrow(), vec![AiBehavior::Move]);
        assert!(ai.is_ground());
    }

    #[test]
    fn hurt_attacks_a_target_in_reach_without_rolling() {
        let tuning = AiTuning {
            can_stun: false,
            attack_rate: 0.5,
            ..AiTuning::default()
        };
        let (mut ai, seen) = spawn(tuning, Box::new(NoDraw));
        ai.set_target(Some(Vec2::new(1.5, 0.0)));

        ai.on_hurt(10).unwrap();

        assert_eq!(ai.current(), Some(AiBehavior::Attack));
        assert_eq!(
            *seen.borrow(),
            vec![AiBehavior::Move, AiBehavior::Hurt, AiBehavior::Attack]
        );
    }

    #[test]
    fn stun_returns_to_move_after_its_duration() {
        let tuning = AiTuning {
            can_stun: true,
            stun_duration: 0.5,
            ..AiTuning::default()
        };
        let (mut ai, seen) = spawn(tuning, Box::new(NoDraw));
        let sensor = floor();

        ai.on_hurt(5).unwrap();
        assert_eq!(ai.current(), Some(AiBehavior::Stun));

        for _ in 0..4 {
            ai.on_fixed_tick(&sensor, DT).unwrap();
            ai.on_tick(0.1).unwrap();
            assert_eq!(ai.current(), Some(AiBehavior::Stun));
        }
        ai.on_tick(0.1).unwrap();

        assert_eq!(ai.current(), Some(AiBehavior::Move));
        assert_eq!(
            *seen.borrow(),
            vec![
                AiBehavior::Move,
                AiBehavior::Hurt,
                AiBehavior::Stun,
                AiBehavior::Move
            ]
        );
    }

    #[test]
    fn stun_is_reentered_when_hit_again() {
        let tuning = AiTuning {
            stun_duration: 1.0,
            ..AiTuning::default()
        };
        let (mut ai, _) = spawn(tuning, Box::new(NoDraw));

        ai.on_hurt(1).unwrap();
        ai.on_tick(0.75).unwrap();
        ai.on_hurt(1).unwrap();
        ai.on_tick(0.75).unwrap();

        assert_eq!(ai.current(), Some(AiBehavior::Stun));
        ai.on_tick(0.25).unwrap();
        assert_eq!(ai.current(), Some(AiBehavior::Move));
    }

    #[test]
    fn scared_enemy_flees_until_out_of_range() {
        let tuning = AiTuning {
            can_stun: false,
            flee_range: 3.0,
            ..AiTuning::default()
        };
        let (mut ai, _) = spawn(tuning, Box::new(FixedChance(0.1)));
        let sensor = floor();
        ai.set_target(Some(Vec2::new(1.0, 0.0)));

        ai.on_hurt(60).unwrap();
        assert_eq!(ai.current(), Some(AiBehavior::Flee));
        assert_eq!(ai.kinematics().facing, Facing::Left);

        ai.on_fixed_tick(&sensor, DT).unwrap();
        assert!(ai.kinematics().velocity.x < 0.0);

        ai.set_target(None);
        ai.kinematics_mut().position = Vec2::new(-3.0, 0.0);
        ai.on_fixed_tick(&sensor, DT).unwrap();
        assert_eq!(ai.current(), Some(AiBehavior::Move));
    }

    #[test]
    fn healthy_enemy_never_flees() {
        let tuning = AiTuning {
            can_stun: false,
            flee_chance: 1.0,
            ..AiTuning::default()
        };
        let (mut ai, _) = spawn(tuning, Box::new(NoDraw));

        ai.on_hurt(10).unwrap();
        assert_eq!(ai.current(), Some(AiBehavior::Move));
    }

    #[test]
    fn move_turns_at_walls_and_ledges() {
        let (mut ai, _) = spawn(AiTuning::default(), Box::new(NoDraw));

        let wall = floor().with(
            200,
            Shape::rect(Vec2::new(0.5, 2.0)),
            Vec2::new(1.0, 0.0),
            Layers::WALL,
        );
        ai.on_fixed_tick(&wall, DT).unwrap();
        assert_eq!(ai.kinematics().facing, Facing::Left);

        // Walking off the floor turns once, not every tick.
        let nothing = FakeSensor::default();
        ai.on_fixed_tick(&nothing, DT).unwrap();
        assert_eq!(ai.kinematics().facing, Facing::Right);
        ai.on_fixed_tick(&nothing, DT).unwrap();
        assert_eq!(ai.kinematics().facing, Facing::Right);
    }

    #[test]
    fn chases_then_attacks_once_then_chases_again() {
        let tuning = AiTuning {
            attack_rate: 0.3,
            ..AiTuning::default()
        };
        let (mut ai, seen) = spawn(tuning, Box::new(NoDraw));
        let sensor = floor();

        ai.set_target(Some(Vec2::new(6.0, 0.0)));
        frame(&mut ai, &sensor);
        assert_eq!(ai.current(), Some(AiBehavior::Chase));

        ai.set_target(Some(Vec2::new(1.0, 0.0)));
        ai.on_fixed_tick(&sensor, DT).unwrap();
        assert_eq!(ai.current(), Some(AiBehavior::Attack));

        let mut intents = Vec::new();
        ai.drain_intents(&mut intents);
        assert!(matches!(
            intents.as_slice(),
            [
                Intent::Hitbox {
                    slot: HitboxSlot::Attack,
                    enabled: true
                },
                Intent::Strike(strike)
            ] if strike.damage == 10 && strike.source == BodyId(1)
        ));

        ai.on_tick(0.3).unwrap();
        assert_eq!(ai.current(), Some(AiBehavior::Chase));
        intents.clear();
        ai.drain_intents(&mut intents);
        assert_eq!(
            intents,
            vec![Intent::Hitbox {
                slot: HitboxSlot::Attack,
                enabled: false
            }]
        );
        assert_eq!(
            *seen.borrow(),
            vec![
                AiBehavior::Move,
                AiBehavior::Chase,
                AiBehavior::Attack,
                AiBehavior::Chase
            ]
        );
    }

    #[test]
    fn interrupted_attack_disables_its_hitbox() {
        let tuning = AiTuning {
            attack_rate: 1.0,
            can_stun: true,
            ..AiTuning::default()
        };
        let (mut ai, _) = spawn(tuning, Box::new(NoDraw));
        ai.set_target(Some(Vec2::new(1.0, 0.0)));
        ai.on_hurt(1).unwrap();
        ai.drain_intents(&mut Vec::new());

        // Stunnable enemies never attack from Hurt; force the swing first.
        ai.machine.transition_to(&mut ai.ctx, states::Attack::new()).unwrap();
        ai.on_hurt(1).unwrap();

        let mut intents = Vec::new();
        ai.drain_intents(&mut intents);
        assert_eq!(
            intents.last(),
            Some(&Intent::Hitbox {
                slot: HitboxSlot::Attack,
                enabled: false
            })
        );
        assert_eq!(ai.current(), Some(AiBehavior::Stun));
    }

    #[test]
    fn depletion_reports_death_and_stops() {
        let (mut ai, _) = spawn(AiTuning::default(), Box::new(NoDraw));

        let report = ai.on_hurt(100).unwrap();
        assert!(report.depleted);
        assert!(ai.is_finished());
        assert_eq!(ai.current(), None);

        let mut intents = Vec::new();
        ai.drain_intents(&mut intents);
        assert_eq!(intents, vec![Intent::Died]);
    }
}
