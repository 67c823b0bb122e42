//! Data the AI states act on.

use actor_fsm::Context;
use glam::Vec2;

use crate::combat::Strike;
use crate::config::AiTuning;
use crate::geometry::BodyId;
use crate::health::Health;
use crate::intent::{HitboxSlot, Intent, Outbox};
use crate::motion::Kinematics;
use crate::observer::Observers;
use crate::rng::Chance;
use crate::sensor::QueryBuffer;

use super::AiBehavior;

/// Everything an [`AiMachine`](super::AiMachine) shares with its states.
pub struct AiContext {
    pub(crate) body: BodyId,
    pub(crate) tuning: AiTuning,
    pub(crate) gravity: f32,
    pub(crate) health: Health,
    pub(crate) motion: Kinematics,
    pub(crate) ground: bool,
    pub(crate) wall: bool,
    pub(crate) target: Option<Vec2>,
    /// Length of the physics tick being processed.
    pub(crate) step: f32,
    pub(crate) chance: Box<dyn Chance>,
    pub(crate) outbox: Outbox,
    pub(crate) buffer: QueryBuffer,
    pub(crate) behavior: Observers<AiBehavior>,
    pub(crate) attack_enabled: bool,
}

impl AiContext {
    /// Distance to the target, infinite when there is none.
    pub fn distance_to_target(&self) -> f32 {
        self.target
            .map_or(f32::INFINITY, |target| self.motion.position.distance(target))
    }

    pub fn target_visible(&self) -> bool {
        self.target.is_some() && self.tuning.view_distance > self.distance_to_target()
    }

    /// Eases velocity towards `force` along the current facing.
    pub fn move_with(&mut self, force: f32) {
        self.motion
            .drive(force, self.gravity, self.tuning.move_smooth, self.step);
    }

    pub fn brake(&mut self) {
        self.motion
            .brake(self.gravity, self.tuning.move_smooth, self.step);
    }

    pub fn switch_side(&mut self) {
        self.motion.flip();
        tracing::trace!(body = %self.body, facing = ?self.motion.facing, "switched side");
    }

    /// Enables or disables the attack hitbox. Enabling also pulses damage
    /// through it.
    pub fn set_attack_hitbox(&mut self, enabled: bool) {
        if self.attack_enabled == enabled {
            return;
        }
        self.attack_enabled = enabled;
        self.outbox.push(Intent::Hitbox {
            slot: HitboxSlot::Attack,
            enabled,
        });

        if enabled && let Some(spec) = self.tuning.attack_hitbox {
            self.outbox.push(Intent::Strike(Strike {
                source: self.body,
                slot: HitboxSlot::Attack,
                probe: spec.at(self.motion.position, self.motion.facing),
                damage: self.tuning.damage,
            }));
        }
    }

    /// Whether the actor should run: hurt enough and unlucky enough.
    pub fn should_flee(&mut self) -> bool {
        let threshold = self.health.max() as f32 * self.tuning.scare_factor;
        self.health.current() as f32 <= threshold && self.chance.roll() <= self.tuning.flee_chance
    }
}

impl Context for AiContext {
    type Tag = AiBehavior;

    fn state_changed(&mut self, tag: AiBehavior) {
        tracing::debug!(body = %self.body, behavior = %tag, "ai behavior changed");
        self.behavior.notify(&tag);
    }
}
