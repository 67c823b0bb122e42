//! Host driver for the arena simulation.
//!
//! This crate adapts the controllers in `game-core` to a headless world: it
//! owns the actors, answers their overlap queries, moves their bodies,
//! resolves the intents they raise and reports everything on an event bus.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`clock`] turns frame deltas into fixed physics steps
//! - [`world`] holds colliders and implements the `Sensor` contract
//! - [`registry`] owns actors and routes damage to them
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`scenario`] spawns arenas described in `game-content`
pub mod clock;
pub mod error;
pub mod events;
pub mod registry;
pub mod runtime;
pub mod scenario;
pub mod world;

pub use clock::SimClock;
pub use error::{Result, RuntimeError};
pub use events::{Event, EventBus, Topic, drain};
pub use registry::ActorRegistry;
pub use runtime::{ActorRecord, Runtime, RuntimeBuilder, RuntimeConfig};
pub use scenario::populate;
pub use world::CollisionWorld;
