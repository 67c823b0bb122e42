//! Scenario definitions: terrain plus entity placements.
//!
//! A scenario names tunings by id instead of embedding them, so the same
//! arena can be replayed with different catalogs (easy/hard enemies, a
//! tougher boss) without touching the layout.

use game_core::{Facing, Layers, PickupKind, PlayerInput, Shape};
use glam::Vec2;

/// One static collider: ground, wall or any other terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainPlacement {
    pub position: Vec2,
    pub shape: Shape,
    pub layers: Layers,
}

impl TerrainPlacement {
    pub fn ground(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            shape: Shape::rect(half_extents),
            layers: Layers::GROUND,
        }
    }

    pub fn wall(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            shape: Shape::rect(half_extents),
            layers: Layers::WALL,
        }
    }
}

/// What a placement spawns. Actor and hazard kinds reference a catalog id.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    Player { tuning: String },
    Enemy { tuning: String },
    Boss { tuning: String },
    HurtZone { tuning: String, shape: Shape },
    Pickup { kind: PickupKind, shape: Shape },
}

impl EntityKind {
    /// Catalog id this placement needs, if any.
    pub fn tuning_id(&self) -> Option<&str> {
        match self {
            EntityKind::Player { tuning }
            | EntityKind::Enemy { tuning }
            | EntityKind::Boss { tuning }
            | EntityKind::HurtZone { tuning, .. } => Some(tuning),
            EntityKind::Pickup { .. } => None,
        }
    }
}

/// Entity placement specification. Body ids are allocated at spawn time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityPlacement {
    pub position: Vec2,
    #[cfg_attr(feature = "serde", serde(default))]
    pub facing: Facing,
    pub kind: EntityKind,
}

impl EntityPlacement {
    pub fn new(position: Vec2, kind: EntityKind) -> Self {
        Self {
            position,
            facing: Facing::default(),
            kind,
        }
    }

    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }
}

/// Player controls held over a window of simulated time.
///
/// Lets headless runs exercise the player without a keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptedInput {
    /// Simulated second the input starts.
    pub at: f32,
    /// Seconds the input stays held. Zero holds it for a single step.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hold: f32,
    pub input: PlayerInput,
}

impl ScriptedInput {
    /// Whether this input applies at `time` for a step of `step` seconds.
    pub fn covers(&self, time: f32, step: f32) -> bool {
        time >= self.at && time < self.at + self.hold.max(step)
    }
}

/// Scenario configuration for arena initialization.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Scenario {
    pub name: String,
    /// Seed for every actor's random stream.
    pub seed: u64,
    pub terrain: Vec<TerrainPlacement>,
    pub placements: Vec<EntityPlacement>,
    pub script: Vec<ScriptedInput>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_terrain(mut self, terrain: TerrainPlacement) -> Self {
        self.terrain.push(terrain);
        self
    }

    pub fn with_placement(mut self, placement: EntityPlacement) -> Self {
        self.placements.push(placement);
        self
    }

    pub fn with_input(mut self, input: ScriptedInput) -> Self {
        self.script.push(input);
        self
    }

    /// The scripted input covering `time`, latest entry wins.
    pub fn input_at(&self, time: f32, step: f32) -> Option<PlayerInput> {
        self.script
            .iter()
            .rev()
            .find(|scripted| scripted.covers(time, step))
            .map(|scripted| scripted.input)
    }
}
