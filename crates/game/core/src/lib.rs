//! Deterministic combat rules shared by every actor in the game.
//!
//! `game-core` defines the actors (player, AI enemies, boss and its pieces),
//! the state sets that drive them and the narrow contracts they keep with the
//! host: contact queries through [`Sensor`], damage through [`Damageable`] /
//! [`DamageTargets`], time through `on_tick` / `on_fixed_tick`, and outgoing
//! [`Intent`]s the host is free to render, play or resolve.
//!
//! Nothing in here owns a window, a physics solver or a clock; the `runtime`
//! crate adapts those to the [`Actor`] lifecycle.
pub mod actor;
pub mod ai;
pub mod boss;
pub mod combat;
pub mod config;
pub mod error;
pub mod geometry;
pub mod hazard;
pub mod health;
pub mod intent;
pub mod motion;
pub mod observer;
pub mod player;
pub mod rng;
pub mod sensor;

pub use actor::{Actor, ActorKind, BehaviorHandler, BehaviorTag, Collider};
pub use ai::{AiBehavior, AiMachine};
pub use boss::{BossEvent, BossMachine, BossPiece};
pub use combat::{DamageTargets, Damageable, DispatchReport, Strike, dispatch_strike};
pub use config::{
    AiTuning, BossTimings, BossTuning, ClipSet, GameConfig, HazardTuning, PieceSpec, PlayerTuning,
    ProbeSpec,
};
pub use error::{ConfigError, CoreError};
pub use geometry::{BodyId, Layers, Probe, Shape};
pub use hazard::{HealthPickup, HurtZone, PickupKind};
pub use health::{Health, HealthEvent, HealthReport};
pub use intent::{Cue, HitboxSlot, Intent, Outbox};
pub use motion::{Facing, Kinematics, smooth_damp};
pub use observer::{Observers, SubscriptionId};
pub use player::{PlayerBehavior, PlayerController, PlayerInput};
pub use rng::{Chance, FixedChance, PcgChance, compute_seed};
pub use sensor::{QUERY_CAPACITY, QueryBuffer, Sensor, touches_other};
