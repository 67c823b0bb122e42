//! Scenario loader.

use std::path::Path;

use crate::catalog::TuningCatalog;
use crate::loaders::{LoadResult, read_file};
use crate::scenario::Scenario;

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario from a RON file.
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let mut scenario = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid scenario {}: {}", path.display(), e))?;

        if scenario.name.is_empty()
            && let Some(stem) = path.file_stem()
        {
            scenario.name = stem.to_string_lossy().into_owned();
        }
        Ok(scenario)
    }

    /// Parse a scenario from RON text.
    pub fn parse(content: &str) -> LoadResult<Scenario> {
        let scenario: Scenario = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;

        tracing::debug!(
            name = %scenario.name,
            terrain = scenario.terrain.len(),
            placements = scenario.placements.len(),
            "loaded scenario"
        );
        Ok(scenario)
    }

    /// Checks that every tuning id the scenario references exists.
    pub fn check_references(scenario: &Scenario, catalog: &TuningCatalog) -> LoadResult<()> {
        use crate::scenario::EntityKind;

        for placement in &scenario.placements {
            match &placement.kind {
                EntityKind::Player { tuning } => catalog.player(tuning).map(|_| ())?,
                EntityKind::Enemy { tuning } => catalog.enemy(tuning).map(|_| ())?,
                EntityKind::Boss { tuning } => catalog.boss(tuning).map(|_| ())?,
                EntityKind::HurtZone { tuning, .. } => catalog.hazard(tuning).map(|_| ())?,
                EntityKind::Pickup { .. } => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use game_core::{Facing, Layers, PickupKind, Shape};
    use glam::Vec2;

    use super::*;
    use crate::scenario::EntityKind;

    const ARENA: &str = r#"(
        name: "pit",
        seed: 7,
        terrain: [
            (position: (0.0, -1.0), shape: Rect(half_extents: (20.0, 0.5)), layers: "GROUND"),
            (position: (10.0, 2.0), shape: Rect(half_extents: (0.5, 3.0)), layers: "WALL"),
        ],
        placements: [
            (position: (0.0, 0.0), kind: Player(tuning: "default")),
            (position: (5.0, 0.0), facing: left, kind: Enemy(tuning: "default")),
            (position: (-4.0, 0.0), kind: Pickup(kind: twenty_percent, shape: Circle(radius: 0.5))),
        ],
        script: [
            (at: 0.0, hold: 1.0, input: (axis: (1.0, 0.0))),
            (at: 0.5, input: (jump: true)),
        ],
    )"#;

    #[test]
    fn parses_full_scenario() {
        let scenario = ScenarioLoader::parse(ARENA).unwrap();

        assert_eq!(scenario.name, "pit");
        assert_eq!(scenario.seed, 7);
        assert_eq!(scenario.terrain.len(), 2);
        assert_eq!(scenario.terrain[1].layers, Layers::WALL);
        assert_eq!(scenario.placements.len(), 3);
        assert_eq!(scenario.placements[1].facing, Facing::Left);
        assert_eq!(scenario.placements[0].facing, Facing::Right);
        assert_eq!(
            scenario.placements[2].kind,
            EntityKind::Pickup {
                kind: PickupKind::TwentyPercent,
                shape: Shape::circle(0.5),
            }
        );
        assert_eq!(scenario.script[1].hold, 0.0);
        assert!(scenario.input_at(0.5, 0.02).is_some_and(|input| input.jump));
        assert_eq!(
            scenario.input_at(0.7, 0.02).map(|input| input.axis),
            Some(Vec2::X)
        );
    }

    #[test]
    fn references_are_checked_against_catalog() {
        let scenario = ScenarioLoader::parse(ARENA).unwrap();
        let catalog = TuningCatalog::with_defaults();
        assert!(ScenarioLoader::check_references(&scenario, &catalog).is_ok());

        let lonely = ScenarioLoader::parse(
            r#"(placements: [(position: (0.0, 0.0), kind: Boss(tuning: "kraken"))])"#,
        )
        .unwrap();
        let err = ScenarioLoader::check_references(&lonely, &catalog).unwrap_err();
        assert!(err.to_string().contains("kraken"), "{err}");
    }

    #[test]
    fn file_stem_names_unnamed_scenarios() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gauntlet.ron");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "(seed: 3)").unwrap();

        let scenario = ScenarioLoader::load(&path).unwrap();
        assert_eq!(scenario.name, "gauntlet");
        assert_eq!(scenario.seed, 3);
        assert!(scenario.placements.is_empty());
    }
}
