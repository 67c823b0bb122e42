//! Data the boss states act on.

use actor_fsm::Context;

use crate::combat::Strike;
use crate::config::{BossTimings, BossTuning};
use crate::geometry::BodyId;
use crate::health::Health;
use crate::intent::{Cue, HitboxSlot, Intent, Outbox};
use crate::motion::Kinematics;
use crate::observer::Observers;
use crate::rng::Chance;

use super::BossEvent;
use super::piece::BossPiece;

/// Everything a [`BossMachine`](super::BossMachine) shares with its states.
pub struct BossContext {
    pub(crate) body: BodyId,
    pub(crate) tuning: BossTuning,
    pub(crate) timings: BossTimings,
    pub(crate) health: Health,
    pub(crate) motion: Kinematics,
    pub(crate) pieces: Vec<BossPiece>,
    pub(crate) chance: Box<dyn Chance>,
    pub(crate) outbox: Outbox,
    pub(crate) events: Observers<BossEvent>,
    pub(crate) head_enabled: bool,
    pub(crate) finished: bool,
}

impl BossContext {
    /// Toggles every live piece's attack hitbox.
    pub fn set_hitboxes(&mut self, enabled: bool) {
        let position = self.motion.position;
        let damage_to = self.tuning.damage_to;
        for piece in &mut self.pieces {
            piece.set_trigger_status(enabled, position, damage_to, &mut self.outbox);
        }
    }

    /// Toggles the head hitbox. Enabling pulses head damage.
    pub fn set_head_hitbox(&mut self, enabled: bool) {
        if self.head_enabled == enabled {
            return;
        }
        self.head_enabled = enabled;
        self.outbox.push(Intent::Hitbox {
            slot: HitboxSlot::Head,
            enabled,
        });

        if enabled && let Some(spec) = self.tuning.head_hitbox {
            let mut probe = spec.at(self.motion.position, self.motion.facing);
            probe.mask = self.tuning.damage_to;
            self.outbox.push(Intent::Strike(Strike {
                source: self.body,
                slot: HitboxSlot::Head,
                probe,
                damage: self.tuning.head_damage,
            }));
        }
    }

    /// Idle's branch: roar instead of attacking.
    pub fn wants_roar(&mut self) -> bool {
        self.tuning.roar_chance > 0.0 && self.chance.roll() < self.tuning.roar_chance
    }

    /// Destroys every remaining piece.
    pub fn tear_down_pieces(&mut self) {
        for piece in &mut self.pieces {
            piece.destroy(&mut self.outbox);
        }
    }
}

impl Context for BossContext {
    type Tag = BossEvent;

    fn state_changed(&mut self, tag: BossEvent) {
        tracing::debug!(body = %self.body, phase = %tag, "boss phase changed");
        self.outbox.push(Intent::Cue(Cue(tag.into())));
        for piece in &mut self.pieces {
            piece.on_boss_changed(tag);
        }
        self.events.notify(&tag);
    }
}
