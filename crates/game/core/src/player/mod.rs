//! Player controller driven by host input.
//!
//! Every physics tick:
//!
//! 1. ceiling check (a blocked ceiling forces a crouch)
//! 2. ground check (landing restores the dash and switches to land strafe)
//! 3. dash clearance, only when a dash was pressed
//! 4. melee pulse, when attack was pressed
//! 5. the current state's fixed update
//!
//! Buttons in [`PlayerInput`] act on the press: a button held across
//! several inputs counts once, and each press is consumed by the first
//! physics tick that sees it.

mod context;
mod states;

pub use context::PlayerContext;

use actor_fsm::StateMachine;
use glam::Vec2;

use crate::actor::{Actor, ActorKind, BehaviorHandler, BehaviorTag, Collider};
use crate::combat::{Damageable, Strike};
use crate::config::{GameConfig, PlayerTuning};
use crate::error::CoreError;
use crate::geometry::{BodyId, Layers, Probe, Shape};
use crate::health::{Health, HealthReport};
use crate::intent::{Cue, HitboxSlot, Intent, Outbox};
use crate::motion::{Facing, Kinematics};
use crate::observer::{Observers, SubscriptionId};
use crate::sensor::{QueryBuffer, Sensor, touches_other};

use states::{Airborne, Dead, Grounded};

/// Distance between wall samples along a dash.
const DASH_SAMPLE: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum PlayerBehavior {
    Grounded,
    Airborne,
    Dashing,
    Dead,
}

/// Controls sampled by the host for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerInput {
    /// Movement stick; `y < 0` crouches.
    pub axis: Vec2,
    pub jump: bool,
    pub dash: bool,
    pub attack: bool,
    pub interact: bool,
}

impl PlayerInput {
    /// Keeps the axis and only the buttons that were up in `before`.
    pub fn pressed_since(self, before: PlayerInput) -> Self {
        Self {
            axis: self.axis,
            jump: self.jump && !before.jump,
            dash: self.dash && !before.dash,
            attack: self.attack && !before.attack,
            interact: self.interact && !before.interact,
        }
    }

    fn clear_presses(&mut self) {
        self.jump = false;
        self.dash = false;
        self.attack = false;
        self.interact = false;
    }
}

pub struct PlayerController {
    machine: StateMachine<PlayerContext>,
    ctx: PlayerContext,
    dead: bool,
}

impl PlayerController {
    pub fn new(
        body: BodyId,
        position: Vec2,
        facing: Facing,
        tuning: PlayerTuning,
        config: &GameConfig,
    ) -> Result<Self, CoreError> {
        tuning.validate()?;
        config.validate()?;

        let ctx = PlayerContext {
            body,
            health: Health::new(tuning.starting_health),
            tuning,
            gravity: config.gravity,
            motion: Kinematics::new(position, facing),
            input: PlayerInput::default(),
            held: PlayerInput::default(),
            ground: false,
            can_stand: true,
            crouch: false,
            smooth: PlayerContext::INITIAL_SMOOTH,
            dashed: false,
            dash_reach: 0.0,
            step: config.fixed_timestep,
            outbox: Outbox::new(),
            buffer: QueryBuffer::new(),
            behavior: Observers::new(),
        };

        Ok(Self {
            machine: StateMachine::with_max_chain(config.max_transition_chain),
            ctx,
            dead: false,
        })
    }

    pub fn current(&self) -> Option<PlayerBehavior> {
        self.machine.current_tag()
    }

    pub fn is_ground(&self) -> bool {
        self.ctx.ground
    }

    pub fn is_crouching(&self) -> bool {
        self.ctx.crouch
    }

    pub fn can_stand(&self) -> bool {
        self.ctx.can_stand
    }

    pub fn has_dashed(&self) -> bool {
        self.ctx.dashed
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&PlayerBehavior) + 'static) -> SubscriptionId {
        self.ctx.behavior.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.ctx.behavior.unsubscribe(id)
    }

    pub fn on_hurt(&mut self, amount: u32) -> Result<HealthReport, CoreError> {
        let report = self.ctx.health.apply_damage(amount);
        if report.depleted && !self.dead {
            tracing::info!(body = %self.ctx.body, "player died");
            self.dead = true;
            self.ctx.outbox.push(Intent::Died);
            self.machine.transition_to(&mut self.ctx, Dead)?;
        }
        Ok(report)
    }

    pub fn on_heal(&mut self, amount: u32) -> HealthReport {
        self.ctx.health.apply_heal(amount)
    }

    fn sense(&mut self, sensor: &dyn Sensor) {
        let ctx = &mut self.ctx;
        let position = ctx.motion.position;
        let facing = ctx.motion.facing;

        let ceiling = ctx.tuning.ceiling_probe.at(position, facing);
        ctx.can_stand = !touches_other(sensor, &ceiling, ctx.body, &mut ctx.buffer);
        if !ctx.can_stand {
            ctx.crouch = true;
        }

        let was_ground = ctx.ground;
        let probe = ctx.tuning.ground_probe.at(position, facing);
        ctx.ground = touches_other(sensor, &probe, ctx.body, &mut ctx.buffer);

        if ctx.ground && !was_ground {
            ctx.dashed = false;
            ctx.smooth = ctx.tuning.land_strafe;
            ctx.outbox.push(Intent::Cue(Cue("land")));
        } else if !ctx.ground && was_ground {
            ctx.smooth = ctx.tuning.air_strafe;
        }

        if ctx.wants_dash() {
            ctx.dash_reach = dash_reach(
                sensor,
                ctx.tuning.body,
                position,
                facing,
                ctx.tuning.dash_distance,
                ctx.body,
                &mut ctx.buffer,
            );
        }
    }

    fn act(&mut self) {
        let ctx = &mut self.ctx;
        if ctx.input.interact {
            ctx.outbox.push(Intent::Cue(Cue("interact")));
        }
        if ctx.input.attack && ctx.tuning.can_attack {
            let origin = ctx.motion.position + ctx.motion.facing.mirror(ctx.tuning.attack_offset);
            ctx.outbox.push(Intent::Strike(Strike {
                source: ctx.body,
                slot: HitboxSlot::Melee,
                probe: Probe::circle(origin, ctx.tuning.attack_radius, Layers::ENEMY | Layers::BOSS),
                damage: ctx.tuning.attack_damage,
            }));
        }
    }
}

/// Farthest distance up to `distance` the body can slide along `facing`
/// without entering a wall.
fn dash_reach(
    sensor: &dyn Sensor,
    body: Shape,
    origin: Vec2,
    facing: Facing,
    distance: f32,
    me: BodyId,
    buffer: &mut QueryBuffer,
) -> f32 {
    let direction = Vec2::new(facing.sign(), 0.0);
    let samples = (distance / DASH_SAMPLE).ceil() as u32;
    let mut reach = 0.0;
    for i in 1..=samples {
        let along = (i as f32 * DASH_SAMPLE).min(distance);
        let probe = Probe::new(body, origin + direction * along, Layers::WALL);
        if touches_other(sensor, &probe, me, buffer) {
            break;
        }
        reach = along;
    }
    reach
}

impl Damageable for PlayerController {
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

impl Actor for PlayerController {
    fn kind(&self) -> ActorKind {
        ActorKind::Player
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
        self.current() != Some(PlayerBehavior::Dashing)
    }

    fn behavior(&self) -> Option<BehaviorTag> {
        self.current().map(BehaviorTag::Player)
    }

    fn colliders(&self, out: &mut Vec<Collider>) {
        out.push(Collider {
            body: self.ctx.body,
            shape: self.ctx.tuning.body,
            position: self.ctx.motion.position,
            layers: Layers::PLAYER,
        });
    }

    fn subscribe_behavior(&mut self, mut handler: BehaviorHandler) -> SubscriptionId {
        self.subscribe(move |tag| handler(&BehaviorTag::Player(*tag)))
    }

    fn unsubscribe_behavior(&mut self, id: SubscriptionId) -> bool {
        self.unsubscribe(id)
    }

    fn set_input(&mut self, input: PlayerInput) {
        self.ctx.input = input.pressed_since(self.ctx.held);
        self.ctx.held = input;
    }

    fn on_spawn(&mut self) -> Result<(), CoreError> {
        tracing::info!(body = %self.ctx.body, position = ?self.ctx.motion.position, "player spawned");
        self.machine.transition_to(&mut self.ctx, Airborne)?;
        Ok(())
    }

    fn on_tick(&mut self, dt: f32) -> Result<(), CoreError> {
        self.machine.tick(&mut self.ctx, dt)?;
        Ok(())
    }

    fn on_fixed_tick(&mut self, sensor: &dyn Sensor, dt: f32) -> Result<(), CoreError> {
        self.ctx.step = dt;
        if self.dead {
            self.machine.fixed_tick(&mut self.ctx)?;
            return Ok(());
        }

        self.sense(sensor);
        if self.current() != Some(PlayerBehavior::Dashing) {
            self.act();
        }
        self.machine.fixed_tick(&mut self.ctx)?;
        self.ctx.input.clear_presses();
        Ok(())
    }

    fn on_destroy(&mut self) {
        self.machine.stop(&mut self.ctx);
        self.ctx.behavior.clear();
        tracing::debug!(body = %self.ctx.body, "player destroyed");
    }

    fn drain_intents(&mut self, out: &mut Vec<Intent>) {
        self.ctx.outbox.drain_into(out);
    }

    fn is_finished(&self) -> bool {
        self.dead
    }
}
