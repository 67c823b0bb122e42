//! Event types for different topics.

use game_core::{ActorKind, BehaviorTag, BodyId, HitboxSlot, PickupKind};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum Topic {
    /// Behavior changes and presentation cues
    Behavior,
    /// Damage, healing and hitbox toggles
    Combat,
    /// Spawns, deaths and despawns
    Lifecycle,
}

impl Topic {
    pub const COUNT: usize = 3;
    pub const ALL: [Topic; Self::COUNT] = [Topic::Behavior, Topic::Combat, Topic::Lifecycle];

    pub(crate) const fn index(self) -> usize {
        match self {
            Topic::Behavior => 0,
            Topic::Combat => 1,
            Topic::Lifecycle => 2,
        }
    }
}

/// Everything the runtime reports to observers outside the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An actor's high-level behavior changed.
    BehaviorChanged { body: BodyId, behavior: BehaviorTag },

    /// A named presentation cue (animation, sound) fired.
    Cue { body: BodyId, name: &'static str },

    /// A hitbox was switched on or off.
    HitboxToggled {
        body: BodyId,
        slot: HitboxSlot,
        enabled: bool,
    },

    /// Health was removed from `target`.
    Damaged {
        source: BodyId,
        target: BodyId,
        amount: u32,
        remaining: u32,
    },

    /// Health was restored to `target`.
    Healed {
        target: BodyId,
        amount: u32,
        current: u32,
    },

    /// A health pickup was consumed by `target`.
    PickupUsed {
        pickup: BodyId,
        kind: PickupKind,
        target: BodyId,
    },

    Spawned { body: BodyId, kind: ActorKind },

    /// An actor's health depleted and its death began.
    Died { body: BodyId },

    /// An actor finished dying and left the simulation.
    Despawned { body: BodyId },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::BehaviorChanged { .. } | Event::Cue { .. } => Topic::Behavior,
            Event::HitboxToggled { .. }
            | Event::Damaged { .. }
            | Event::Healed { .. }
            | Event::PickupUsed { .. } => Topic::Combat,
            Event::Spawned { .. } | Event::Died { .. } | Event::Despawned { .. } => {
                Topic::Lifecycle
            }
        }
    }
}
