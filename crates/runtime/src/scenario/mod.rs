//! Scenario spawning.
//!
//! Turns a [`Scenario`] from `game-content` into live actors, terrain,
//! hazards and pickups, resolving every tuning id against a
//! [`TuningCatalog`].

use game_content::{EntityKind, EntityPlacement, Scenario, ScriptedInput, TuningCatalog};
use game_core::{BodyId, PlayerInput};

use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;

/// Spawns everything `scenario` places and installs its input script.
///
/// Returns the id allocated to each placement, in placement order.
pub fn populate(
    runtime: &mut Runtime,
    scenario: &Scenario,
    catalog: &TuningCatalog,
) -> Result<Vec<BodyId>> {
    tracing::info!(
        "Creating arena from scenario '{}' with {} placements",
        scenario.name,
        scenario.placements.len()
    );

    for terrain in &scenario.terrain {
        runtime.add_terrain(*terrain);
    }

    let mut spawned = Vec::with_capacity(scenario.placements.len());
    for placement in &scenario.placements {
        let body = place(runtime, placement, catalog).map_err(|e| RuntimeError::Spawn {
            what: describe(&placement.kind),
            scenario: scenario.name.clone(),
            source: Box::new(e),
        })?;
        spawned.push(body);
    }

    runtime.set_script(scenario.script.clone());
    Ok(spawned)
}

fn place(runtime: &mut Runtime, placement: &EntityPlacement, catalog: &TuningCatalog) -> Result<BodyId> {
    let position = placement.position;
    let facing = placement.facing;
    match &placement.kind {
        EntityKind::Player { tuning } => {
            runtime.spawn_player(position, facing, catalog.player(tuning)?.clone())
        }
        EntityKind::Enemy { tuning } => {
            runtime.spawn_enemy(position, facing, catalog.enemy(tuning)?.clone())
        }
        EntityKind::Boss { tuning } => {
            runtime.spawn_boss(position, facing, catalog.boss(tuning)?.clone())
        }
        EntityKind::HurtZone { tuning, shape } => {
            runtime.add_hurt_zone(position, *shape, catalog.hazard(tuning)?.clone())
        }
        EntityKind::Pickup { kind, shape } => runtime.add_pickup(position, *shape, *kind),
    }
}

fn describe(kind: &EntityKind) -> String {
    match kind {
        EntityKind::Player { tuning } => format!("player '{tuning}'"),
        EntityKind::Enemy { tuning } => format!("enemy '{tuning}'"),
        EntityKind::Boss { tuning } => format!("boss '{tuning}'"),
        EntityKind::HurtZone { tuning, .. } => format!("hurt zone '{tuning}'"),
        EntityKind::Pickup { kind, .. } => format!("{kind} pickup"),
    }
}

/// Scripted input covering `time`; later entries win.
pub(crate) fn input_at(script: &[ScriptedInput], time: f32, step: f32) -> Option<PlayerInput> {
    script
        .iter()
        .rev()
        .find(|scripted| scripted.covers(time, step))
        .map(|scripted| scripted.input)
}
