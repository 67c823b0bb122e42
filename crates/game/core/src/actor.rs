//! Host-facing actor lifecycle.
//!
//! Controllers are plain owned objects. A host driver calls the lifecycle
//! hooks in a fixed order:
//!
//! 1. [`Actor::on_spawn`] once
//! 2. per physics tick: [`Actor::on_fixed_tick`] (sensing, movement, state
//!    fixed update), then the host integrates [`Actor::kinematics_mut`]
//! 3. per simulation tick: [`Actor::on_tick`]
//! 4. [`Actor::drain_intents`] after either tick
//! 5. [`Actor::on_destroy`] once [`Actor::is_finished`] reports `true`

use std::fmt;

use glam::Vec2;

use crate::ai::AiBehavior;
use crate::boss::BossEvent;
use crate::combat::Damageable;
use crate::error::CoreError;
use crate::geometry::{BodyId, Layers, Shape};
use crate::health::HealthReport;
use crate::intent::Intent;
use crate::motion::Kinematics;
use crate::observer::SubscriptionId;
use crate::player::{PlayerBehavior, PlayerInput};
use crate::sensor::Sensor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActorKind {
    Player,
    Enemy,
    Boss,
}

/// High-level behavior of any actor, broadcast whenever it changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BehaviorTag {
    Player(PlayerBehavior),
    Ai(AiBehavior),
    Boss(BossEvent),
}

impl fmt::Display for BehaviorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorTag::Player(tag) => write!(f, "player:{tag}"),
            BehaviorTag::Ai(tag) => write!(f, "ai:{tag}"),
            BehaviorTag::Boss(tag) => write!(f, "boss:{tag}"),
        }
    }
}

/// A collider an actor contributes to the host's world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub body: BodyId,
    pub shape: Shape,
    pub position: Vec2,
    pub layers: Layers,
}

pub type BehaviorHandler = Box<dyn FnMut(&BehaviorTag)>;

/// Lifecycle every controller exposes to its host.
pub trait Actor: Damageable {
    fn kind(&self) -> ActorKind;

    /// Primary body; intents and events are attributed to it.
    fn body(&self) -> BodyId;

    fn kinematics(&self) -> &Kinematics;

    fn kinematics_mut(&mut self) -> &mut Kinematics;

    /// Whether the host should apply gravity and integrate this actor.
    fn is_mobile(&self) -> bool {
        true
    }

    fn behavior(&self) -> Option<BehaviorTag>;

    /// Appends every collider this actor currently owns.
    fn colliders(&self, out: &mut Vec<Collider>);

    fn subscribe_behavior(&mut self, handler: BehaviorHandler) -> SubscriptionId;

    fn unsubscribe_behavior(&mut self, id: SubscriptionId) -> bool;

    /// Point of interest, e.g. the player position. `None` clears it.
    fn set_target(&mut self, _target: Option<Vec2>) {}

    /// Controls for this tick. Ignored by actors without input.
    fn set_input(&mut self, _input: PlayerInput) {}

    fn on_spawn(&mut self) -> Result<(), CoreError>;

    fn on_tick(&mut self, dt: f32) -> Result<(), CoreError>;

    fn on_fixed_tick(&mut self, sensor: &dyn Sensor, dt: f32) -> Result<(), CoreError>;

    fn on_destroy(&mut self);

    /// Damage that landed on a specific body of this actor.
    fn receive_damage_at(&mut self, body: BodyId, amount: u32) -> Result<HealthReport, CoreError> {
        debug_assert!(body == self.body(), "{body} is not owned by {}", self.body());
        self.receive_damage(amount)
    }

    /// A strike that already hit this actor also overlaps `body`. Only state
    /// local to that collider may change; the actor's own health is untouched.
    fn receive_part_damage(&mut self, _body: BodyId, _amount: u32) -> Result<(), CoreError> {
        Ok(())
    }

    /// Returns `true` if `body` is one of this actor's colliders.
    fn owns(&self, body: BodyId) -> bool {
        body == self.body()
    }

    fn drain_intents(&mut self, out: &mut Vec<Intent>);

    /// The death transition has completed and the host may despawn.
    fn is_finished(&self) -> bool;
}
