//! Requests actors emit for their host to carry out.
//!
//! The core never touches colliders, animation or audio. States push
//! [`Intent`]s into their actor's [`Outbox`] and the host drains it after
//! each tick.

use std::fmt;

use crate::combat::Strike;

/// Named attack region on an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitboxSlot {
    /// AI enemy attack region.
    Attack,
    /// Boss head.
    Head,
    /// Attack region of the boss piece at this index.
    Piece(u8),
    /// Player melee swing.
    Melee,
}

impl fmt::Display for HitboxSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitboxSlot::Attack => f.write_str("attack"),
            HitboxSlot::Head => f.write_str("head"),
            HitboxSlot::Piece(index) => write!(f, "piece[{index}]"),
            HitboxSlot::Melee => f.write_str("melee"),
        }
    }
}

/// Presentation cue (animation clip or sound) by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cue(pub &'static str);

#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Run one damage pulse through the shared area query.
    Strike(Strike),
    /// Toggle a hitbox. Informational; damage only flows through strikes.
    Hitbox { slot: HitboxSlot, enabled: bool },
    /// Play a cue.
    Cue(Cue),
    /// The actor's health ran out.
    Died,
}

/// Per-actor queue of pending intents.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<Intent>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intent: Intent) {
        tracing::trace!(?intent, "queued intent");
        self.pending.push(intent);
    }

    /// Moves every pending intent into `out`, oldest first.
    pub fn drain_into(&mut self, out: &mut Vec<Intent>) {
        out.append(&mut self.pending);
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Intent> {
        self.pending.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intent> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
