//! Content factory for loading everything a run needs from a data directory.

use std::path::{Path, PathBuf};

use game_core::GameConfig;

use crate::catalog::TuningCatalog;
use crate::loaders::{ConfigLoader, LoadResult, ScenarioLoader, TuningLoader};
use crate::scenario::Scenario;

/// Content factory that loads game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── tunings.ron
/// └── scenarios/
///     ├── arena.ron
///     └── boss_lair.ron
/// ```
///
/// `config.toml` and `tunings.ron` are optional; defaults are used when they
/// are missing.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!("No config.toml in {}, using defaults", self.data_dir.display());
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the tuning catalog from `tunings.ron`.
    pub fn load_tunings(&self) -> LoadResult<TuningCatalog> {
        let path = self.data_dir.join("tunings.ron");
        if !path.exists() {
            tracing::info!("No tunings.ron in {}, using stock tunings", self.data_dir.display());
            return Ok(TuningCatalog::with_defaults());
        }
        TuningLoader::load(&path)
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.scenario_path(name);
        ScenarioLoader::load(&path)
    }

    pub fn scenario_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("scenarios").join(format!("{}.ron", name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(
            factory.scenario_path("arena"),
            Path::new("/tmp/data/scenarios/arena.ron")
        );
    }

    #[test]
    fn empty_directory_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());

        assert_eq!(factory.load_config().unwrap(), GameConfig::default());
        assert_eq!(factory.load_tunings().unwrap(), TuningCatalog::with_defaults());
        assert!(factory.load_scenario("arena").is_err());
    }

    #[test]
    fn loads_scenario_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("scenarios")).unwrap();
        std::fs::write(
            dir.path().join("scenarios").join("duel.ron"),
            r#"(placements: [(position: (0.0, 0.0), kind: Player(tuning: "default"))])"#,
        )
        .unwrap();

        let scenario = ContentFactory::new(dir.path()).load_scenario("duel").unwrap();
        assert_eq!(scenario.name, "duel");
        assert_eq!(scenario.placements.len(), 1);
    }
}
