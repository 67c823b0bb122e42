//! Destructible boss pieces.

use glam::Vec2;

use crate::combat::Strike;
use crate::config::{BossTuning, PieceSpec};
use crate::geometry::{BodyId, Layers, Probe};
use crate::health::{Health, HealthReport};
use crate::intent::{HitboxSlot, Intent, Outbox};

use super::BossEvent;

/// One piece of the boss: its own hurtbox, health and attack hitbox.
///
/// Damage a piece takes is also forwarded to the boss. A depleted piece is
/// destroyed on its own; the boss fights on without it.
#[derive(Debug)]
pub struct BossPiece {
    index: u8,
    body: BodyId,
    spec: PieceSpec,
    health: Health,
    hitbox_enabled: bool,
    alive: bool,
    animation: Option<&'static str>,
}

impl BossPiece {
    pub(crate) fn new(index: u8, body: BodyId, spec: PieceSpec) -> Self {
        Self {
            index,
            body,
            health: Health::new(spec.initial_health),
            spec,
            hitbox_enabled: false,
            alive: true,
            animation: None,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn spec(&self) -> &PieceSpec {
        &self.spec
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn hitbox_enabled(&self) -> bool {
        self.hitbox_enabled
    }

    /// Clip currently playing on this piece.
    pub fn animation(&self) -> Option<&'static str> {
        self.animation
    }

    pub fn position(&self, boss_position: Vec2) -> Vec2 {
        boss_position + self.spec.offset
    }

    /// Mirrors a boss phase change with the matching clip.
    ///
    /// Returns `true` if a different clip started playing.
    pub(crate) fn on_boss_changed(&mut self, event: BossEvent) -> bool {
        if !self.alive {
            return false;
        }
        let clip = match event {
            BossEvent::Intro => "intro",
            BossEvent::Idle | BossEvent::Roar => "idle",
            BossEvent::Attack | BossEvent::Pause => "attack",
            BossEvent::Recover => "recover",
            BossEvent::Dead => "dying",
        };
        if self.animation == Some(clip) {
            return false;
        }
        tracing::trace!(piece = self.index, clip, "piece animation");
        self.animation = Some(clip);
        true
    }

    /// Toggles the attack hitbox. Enabling pulses damage at the piece.
    pub(crate) fn set_trigger_status(
        &mut self,
        enabled: bool,
        boss_position: Vec2,
        damage_to: Layers,
        outbox: &mut Outbox,
    ) {
        if !self.alive || self.hitbox_enabled == enabled {
            return;
        }
        let Some(shape) = self.spec.hitbox else {
            return;
        };

        self.hitbox_enabled = enabled;
        let slot = HitboxSlot::Piece(self.index);
        outbox.push(Intent::Hitbox { slot, enabled });

        if enabled {
            let probe = Probe::new(
                shape.inflate(BossTuning::PIECE_HITBOX_MARGIN),
                self.position(boss_position),
                damage_to,
            );
            outbox.push(Intent::Strike(Strike {
                source: self.body,
                slot,
                probe,
                damage: self.spec.damage,
            }));
        }
    }

    /// Damages the piece itself, destroying it on depletion.
    pub(crate) fn receive_damage(&mut self, amount: u32, outbox: &mut Outbox) -> HealthReport {
        let report = self.health.apply_damage(amount);
        tracing::debug!(
            piece = self.index,
            damage = amount,
            remaining = report.current,
            "boss piece hit"
        );
        if report.depleted {
            self.destroy(outbox);
        }
        report
    }

    pub(crate) fn destroy(&mut self, outbox: &mut Outbox) {
        if !self.alive {
            return;
        }
        if self.hitbox_enabled {
            self.hitbox_enabled = false;
            outbox.push(Intent::Hitbox {
                slot: HitboxSlot::Piece(self.index),
                enabled: false,
            });
        }
        self.alive = false;
        tracing::info!(piece = self.index, body = %self.body, "boss piece destroyed");
    }
}
