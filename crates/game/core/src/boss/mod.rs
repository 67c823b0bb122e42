//! Boss: a stationary body with destructible pieces and a timed attack loop.
//!
//! ```text
//! Intro -> Idle -> Attack -> Pause -> Recover -> Idle -> ...
//!           |
//!           +-> Roar -> Idle          (when roar_chance > 0)
//!
//! any phase --(health depleted)--> Dead
//! ```
//!
//! Phase durations come from [`BossTuning::timings`]. Every phase change is
//! broadcast to the pieces (which switch clips) and to subscribers.

mod context;
mod piece;
mod states;

pub use context::BossContext;
pub use piece::BossPiece;

use actor_fsm::StateMachine;
use glam::Vec2;

use crate::actor::{Actor, ActorKind, BehaviorHandler, BehaviorTag, Collider};
use crate::combat::Damageable;
use crate::config::{BossTuning, GameConfig};
use crate::error::{ConfigError, CoreError};
use crate::geometry::{BodyId, Layers};
use crate::health::{Health, HealthReport};
use crate::intent::{Intent, Outbox};
use crate::motion::{Facing, Kinematics};
use crate::observer::{Observers, SubscriptionId};
use crate::rng::Chance;
use crate::sensor::Sensor;

use states::{Dying, Intro};

/// Boss phase, broadcast on every change.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum BossEvent {
    Intro,
    Idle,
    Attack,
    Pause,
    Recover,
    Roar,
    Dead,
}

/// Boss controller.
pub struct BossMachine {
    machine: StateMachine<BossContext>,
    ctx: BossContext,
}

impl BossMachine {
    /// Creates a boss and its pieces. `piece_bodies` assigns one body per
    /// entry of `tuning.pieces`, in order.
    pub fn new(
        body: BodyId,
        position: Vec2,
        facing: Facing,
        tuning: BossTuning,
        piece_bodies: &[BodyId],
        config: &GameConfig,
        chance: Box<dyn Chance>,
    ) -> Result<Self, CoreError> {
        tuning.validate()?;
        config.validate()?;
        if piece_bodies.len() != tuning.pieces.len() || tuning.pieces.len() > usize::from(u8::MAX) {
            return Err(ConfigError::PieceCount {
                expected: tuning.pieces.len(),
                got: piece_bodies.len(),
            }
            .into());
        }

        let pieces = tuning
            .pieces
            .iter()
            .zip(piece_bodies)
            .enumerate()
            .map(|(index, (spec, &piece_body))| BossPiece::new(index as u8, piece_body, spec.clone()))
            .collect();

        let ctx = BossContext {
            body,
            timings: tuning.timings(),
            health: Health::new(tuning.initial_health),
            tuning,
            motion: Kinematics::new(position, facing),
            pieces,
            chance,
            outbox: Outbox::new(),
            events: Observers::new(),
            head_enabled: false,
            finished: false,
        };

        Ok(Self {
            machine: StateMachine::with_max_chain(config.max_transition_chain),
            ctx,
        })
    }

    pub fn current(&self) -> Option<BossEvent> {
        self.machine.current_tag()
    }

    pub fn machine(&self) -> &StateMachine<BossContext> {
        &self.machine
    }

    pub fn pieces(&self) -> &[BossPiece] {
        &self.ctx.pieces
    }

    pub fn is_dying(&self) -> bool {
        self.current() == Some(BossEvent::Dead)
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&BossEvent) + 'static) -> SubscriptionId {
        self.ctx.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.ctx.events.unsubscribe(id)
    }

    /// Damages the boss; depletion starts the death sequence from any phase.
    pub fn on_hurt(&mut self, amount: u32) -> Result<HealthReport, CoreError> {
        let report = self.ctx.health.apply_damage(amount);
        if report.depleted && !self.is_dying() {
            tracing::info!(body = %self.ctx.body, "boss defeated");
            self.machine.transition_to(&mut self.ctx, Dying::new())?;
        }
        Ok(report)
    }

    pub fn on_heal(&mut self, amount: u32) -> HealthReport {
        self.ctx.health.apply_heal(amount)
    }

    /// Damages one piece and forwards the same amount to the boss.
    ///
    /// Returns the boss report. Destroyed pieces take no damage.
    pub fn hurt_piece(&mut self, index: usize, amount: u32) -> Result<HealthReport, CoreError> {
        let Some(piece) = self.ctx.pieces.get_mut(index) else {
            return self.on_hurt(amount);
        };
        if !piece.is_alive() {
            return Ok(HealthReport {
                previous: self.ctx.health.current(),
                current: self.ctx.health.current(),
                max: self.ctx.health.max(),
                depleted: false,
            });
        }
        piece.receive_damage(amount, &mut self.ctx.outbox);
        self.on_hurt(amount)
    }
}

impl Damageable for BossMachine {
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

impl Actor for BossMachine {
    fn kind(&self) -> ActorKind {
        ActorKind::Boss
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

    fn is_mobile(&self) -> bool {
        false
    }

    fn behavior(&self) -> Option<BehaviorTag> {
        self.current().map(BehaviorTag::Boss)
    }

    fn colliders(&self, out: &mut Vec<Collider>) {
        let position = self.ctx.motion.position;
        out.push(Collider {
            body: self.ctx.body,
            shape: self.ctx.tuning.body,
            position,
            layers: Layers::BOSS,
        });
        for piece in self.ctx.pieces.iter().filter(|piece| piece.is_alive()) {
            out.push(Collider {
                body: piece.body(),
                shape: piece.spec().body,
                position: piece.position(position),
                layers: Layers::BOSS,
            });
        }
    }

    fn subscribe_behavior(&mut self, mut handler: BehaviorHandler) -> SubscriptionId {
        self.subscribe(move |event| handler(&BehaviorTag::Boss(*event)))
    }

    fn unsubscribe_behavior(&mut self, id: SubscriptionId) -> bool {
        self.unsubscribe(id)
    }

    fn on_spawn(&mut self) -> Result<(), CoreError> {
        let ctx = &mut self.ctx;
        for piece in &ctx.pieces {
            ctx.health.apply_heal(piece.spec().initial_health);
        }
        tracing::info!(
            body = %ctx.body,
            health = ctx.health.current(),
            pieces = ctx.pieces.len(),
            "boss spawned"
        );
        self.machine.transition_to(&mut self.ctx, Intro::new())?;
        Ok(())
    }

    fn on_tick(&mut self, dt: f32) -> Result<(), CoreError> {
        if self.ctx.finished {
            return Ok(());
        }
        self.machine.tick(&mut self.ctx, dt)?;
        Ok(())
    }

    fn on_fixed_tick(&mut self, _sensor: &dyn Sensor, _dt: f32) -> Result<(), CoreError> {
        if self.ctx.finished {
            return Ok(());
        }
        self.machine.fixed_tick(&mut self.ctx)?;
        Ok(())
    }

    fn on_destroy(&mut self) {
        self.machine.stop(&mut self.ctx);
        self.ctx.events.clear();
        tracing::debug!(body = %self.ctx.body, "boss destroyed");
    }

    fn receive_damage_at(&mut self, body: BodyId, amount: u32) -> Result<HealthReport, CoreError> {
        match self.ctx.pieces.iter().position(|piece| piece.body() == body) {
            Some(index) => self.hurt_piece(index, amount),
            None => self.on_hurt(amount),
        }
    }

    fn receive_part_damage(&mut self, body: BodyId, amount: u32) -> Result<(), CoreError> {
        let ctx = &mut self.ctx;
        if let Some(piece) = ctx
            .pieces
            .iter_mut()
            .find(|piece| piece.is_alive() && piece.body() == body)
        {
            piece.receive_damage(amount, &mut ctx.outbox);
        }
        Ok(())
    }

    fn owns(&self, body: BodyId) -> bool {
        body == self.ctx.body
            || self
                .ctx
                .pieces
                .iter()
                .any(|piece| piece.is_alive() && piece.body() == body)
    }

    fn drain_intents(&mut self, out: &mut Vec<Intent>) {
        self.ctx.outbox.drain_into(out);
    }

    fn is_finished(&self) -> bool {
        self.ctx.finished
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::combat::{DamageTargets, Strike, dispatch_strike};
    use crate::config::{ClipSet, PieceSpec};
    use crate::geometry::{Probe, Shape};
    use crate::health::HealthEvent;
    use crate::intent::HitboxSlot;
    use crate::rng::FixedChance;
    use crate::sensor::QueryBuffer;
    use crate::sensor::fake::FakeSensor;

    fn two_pieces() -> Vec<PieceSpec> {
        vec![
            PieceSpec {
                offset: Vec2::new(-2.0, 0.0),
                ..PieceSpec::default()
            },
            PieceSpec {
                offset: Vec2::new(2.0, 0.0),
                ..PieceSpec::default()
            },
        ]
    }

    fn tuning() -> BossTuning {
        BossTuning {
            body_clips: ClipSet {
                intro: Some(1.5),
                idle: Some(1.0),
                attack: Some(2.0),
                recover: Some(1.0),
                dying: Some(1.0),
            },
            piece_clips: ClipSet {
                intro: Some(2.25),
                ..ClipSet::default()
            },
            pieces: two_pieces(),
            ..BossTuning::default()
        }
    }

    fn spawn(tuning: BossTuning, roll: f32) -> (BossMachine, Rc<RefCell<Vec<BossEvent>>>) {
        let mut boss = BossMachine::new(
            BodyId(10),
            Vec2::ZERO,
            Facing::Left,
            tuning,
            &[BodyId(11), BodyId(12)],
            &GameConfig::default(),
            Box::new(FixedChance(roll)),
        )
        .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        boss.subscribe(move |event| sink.borrow_mut().push(*event));
        boss.on_spawn().unwrap();
        (boss, seen)
    }

    fn run(boss: &mut BossMachine, seconds: f32, dt: f32) {
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            boss.on_tick(dt).unwrap();
        }
    }

    #[test]
    fn pieces_raise_boss_health() {
        let (boss, _) = spawn(tuning(), 0.0);
        assert_eq!(boss.health().current(), 30);
        assert_eq!(boss.health().max(), 30);
    }

    #[test]
    fn mismatched_piece_bodies_are_rejected() {
        let result = BossMachine::new(
            BodyId(1),
            Vec2::ZERO,
            Facing::Left,
            tuning(),
            &[BodyId(2)],
            &GameConfig::default(),
            Box::new(FixedChance(0.0)),
        );
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::PieceCount {
                expected: 2,
                got: 1
            }))
        ));
    }

    #[test]
    fn intro_lasts_as_long_as_the_longest_intro_clip() {
        let (mut boss, _) = spawn(tuning(), 0.0);
        assert_eq!(boss.current(), Some(BossEvent::Intro));

        run(&mut boss, 2.0, 0.25);
        assert_eq!(boss.current(), Some(BossEvent::Intro));

        boss.on_tick(0.25).unwrap();
        assert_eq!(boss.current(), Some(BossEvent::Idle));
        assert_eq!(boss.machine().time_in_state(), 0.0);
        assert_eq!(boss.machine().now(), 2.25);
    }

    #[test]
    fn full_cycle_order() {
        let (mut boss, seen) = spawn(tuning(), 0.0);

        // intro 2.25, idle 1, attack 2, pause 0.5, recover 1
        run(&mut boss, 2.25 + 1.0 + 2.0 + 0.5 + 1.0, 0.25);

        assert_eq!(
            *seen.borrow(),
            vec![
                BossEvent::Intro,
                BossEvent::Idle,
                BossEvent::Attack,
                BossEvent::Pause,
                BossEvent::Recover,
                BossEvent::Idle
            ]
        );
    }

    #[test]
    fn roar_branch_uses_injected_chance() {
        let tuning = BossTuning {
            roar_chance: 0.5,
            ..tuning()
        };
        let (mut boss, seen) = spawn(tuning, 0.1);

        run(&mut boss, 2.25 + 1.0 + 1.0, 0.25);

        assert_eq!(
            *seen.borrow(),
            vec![
                BossEvent::Intro,
                BossEvent::Idle,
                BossEvent::Roar,
                BossEvent::Idle
            ]
        );
    }

    #[test]
    fn attack_pulses_body_then_head() {
        let (mut boss, _) = spawn(tuning(), 0.0);
        run(&mut boss, 3.25, 0.25);
        assert_eq!(boss.current(), Some(BossEvent::Attack));

        let mut intents = Vec::new();
        boss.drain_intents(&mut intents);
        let strikes: Vec<HitboxSlot> = intents
            .iter()
            .filter_map(|intent| match intent {
                Intent::Strike(strike) => Some(strike.slot),
                _ => None,
            })
            .collect();
        assert_eq!(strikes, vec![HitboxSlot::Piece(0), HitboxSlot::Piece(1)]);
        assert!(boss.pieces().iter().all(BossPiece::hitbox_enabled));

        // Head strikes halfway through the attack.
        run(&mut boss, 1.0, 0.25);
        intents.clear();
        boss.drain_intents(&mut intents);
        assert!(intents.iter().any(|intent| matches!(
            intent,
            Intent::Strike(strike) if strike.slot == HitboxSlot::Head && strike.damage == 10
        )));

        // Pause drops everything.
        run(&mut boss, 1.5, 0.25);
        assert_eq!(boss.current(), Some(BossEvent::Recover));
        assert!(boss.pieces().iter().all(|piece| !piece.hitbox_enabled()));
    }

    struct Player {
        body: BodyId,
        health: Health,
    }

    impl DamageTargets for Player {
        fn damage(&mut self, body: BodyId, amount: u32) -> Result<Option<HealthReport>, CoreError> {
            Ok((body == self.body).then(|| self.health.apply_damage(amount)))
        }
    }

    #[test]
    fn head_strike_with_nobody_in_reach_does_nothing() {
        let (mut boss, _) = spawn(tuning(), 0.0);
        run(&mut boss, 4.25, 0.25);

        let mut intents = Vec::new();
        boss.drain_intents(&mut intents);
        let head = intents
            .iter()
            .find_map(|intent| match intent {
                Intent::Strike(strike) if strike.slot == HitboxSlot::Head => Some(*strike),
                _ => None,
            })
            .unwrap();

        let mut player = Player {
            body: BodyId(1),
            health: Health::new(100),
        };
        let events = Rc::new(RefCell::new(Vec::<HealthEvent>::new()));
        let sink = Rc::clone(&events);
        player.health.subscribe(move |event| sink.borrow_mut().push(*event));

        let far_away = FakeSensor::default().with(
            1,
            Shape::rect(Vec2::new(0.4, 0.5)),
            Vec2::new(30.0, 0.0),
            Layers::PLAYER,
        );
        let report =
            dispatch_strike(&far_away, &mut player, &head, &mut QueryBuffer::new()).unwrap();

        assert!(report.is_empty());
        assert_eq!(player.health.current(), 100);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn piece_damage_is_shared_but_piece_loss_is_local() {
        let (mut boss, _) = spawn(tuning(), 0.0);

        boss.receive_damage_at(BodyId(11), 10).unwrap();
        assert!(!boss.pieces()[0].is_alive());
        assert!(boss.pieces()[1].is_alive());
        assert_eq!(boss.health().current(), 20);
        assert_eq!(boss.current(), Some(BossEvent::Intro));
        assert!(!boss.owns(BodyId(11)));

        let mut colliders = Vec::new();
        boss.colliders(&mut colliders);
        assert_eq!(colliders.len(), 2);

        // A destroyed piece shields nothing.
        let report = boss.hurt_piece(0, 5).unwrap();
        assert!(!report.changed());
    }

    /// Routes strike damage into a boss the way a host does.
    struct Lair<'a>(&'a mut BossMachine);

    impl DamageTargets for Lair<'_> {
        fn damage(&mut self, body: BodyId, amount: u32) -> Result<Option<HealthReport>, CoreError> {
            if !self.0.owns(body) {
                return Ok(None);
            }
            self.0.receive_damage_at(body, amount).map(Some)
        }

        fn owner(&self, body: BodyId) -> Option<BodyId> {
            self.0.owns(body).then(|| self.0.body())
        }

        fn damage_part(&mut self, body: BodyId, amount: u32) -> Result<(), CoreError> {
            self.0.receive_part_damage(body, amount)
        }
    }

    fn sensor_over(boss: &BossMachine) -> FakeSensor {
        let mut colliders = Vec::new();
        boss.colliders(&mut colliders);
        colliders.into_iter().fold(FakeSensor::default(), |sensor, collider| {
            sensor.with(collider.body.0, collider.shape, collider.position, collider.layers)
        })
    }

    #[test]
    fn one_swing_over_every_collider_hits_the_pool_once() {
        let (mut boss, _) = spawn(tuning(), 0.0);
        let sensor = sensor_over(&boss);
        let swing = Strike {
            source: BodyId(1),
            slot: HitboxSlot::Melee,
            probe: Probe::circle(Vec2::ZERO, 3.0, Layers::BOSS),
            damage: 4,
        };

        let report =
            dispatch_strike(&sensor, &mut Lair(&mut boss), &swing, &mut QueryBuffer::new()).unwrap();

        assert_eq!(report.hits, 1);
        assert_eq!(report.total, 4);
        assert_eq!(boss.health().current(), 26);
        for piece in boss.pieces() {
            assert_eq!(piece.health().current(), 6, "piece {}", piece.index());
        }
    }

    #[test]
    fn depletion_runs_the_death_sequence() {
        let (mut boss, seen) = spawn(tuning(), 0.0);
        run(&mut boss, 3.5, 0.25);
        boss.drain_intents(&mut Vec::new());

        boss.on_hurt(30).unwrap();
        assert_eq!(boss.current(), Some(BossEvent::Dead));
        assert!(boss.pieces().iter().all(|piece| !piece.is_alive()));
        assert!(!boss.is_finished());

        let mut intents = Vec::new();
        boss.drain_intents(&mut intents);
        assert!(intents.contains(&Intent::Died));

        // Further damage does not restart the sequence.
        boss.on_hurt(5).unwrap();
        run(&mut boss, 1.0, 0.25);
        assert!(boss.is_finished());
        assert_eq!(seen.borrow().last(), Some(&BossEvent::Dead));
        assert_eq!(
            seen.borrow()
                .iter()
                .filter(|event| **event == BossEvent::Dead)
                .count(),
            1
        );
    }

    #[test]
    fn pieces_follow_phase_clips() {
        let (mut boss, _) = spawn(tuning(), 0.0);
        assert_eq!(boss.pieces()[0].animation(), Some("intro"));
        run(&mut boss, 2.25, 0.25);
        assert_eq!(boss.pieces()[1].animation(), Some("idle"));
    }
}
