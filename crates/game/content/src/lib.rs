//! Data-driven content definitions and loaders.
//!
//! This crate houses the tunings and arenas the simulation runs on:
//! - Tuning catalogs: named player, enemy, boss and hazard tunings (RON)
//! - Scenarios: terrain colliders, entity placements and scripted input (RON)
//! - Game configuration: gravity, timestep and transition bounds (TOML)
//!
//! Content is consumed by the runtime when it spawns a scenario and never
//! appears in actor state.

pub mod catalog;
pub mod scenario;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{CatalogError, TuningCatalog, TuningKind};
pub use scenario::{EntityKind, EntityPlacement, Scenario, ScriptedInput, TerrainPlacement};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, ScenarioLoader, TuningLoader};
