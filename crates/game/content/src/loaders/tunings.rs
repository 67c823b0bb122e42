//! Tuning catalog loader.
//!
//! Loads named player, enemy, boss and hazard tunings from a RON file.

use std::path::Path;

use crate::catalog::TuningCatalog;
use crate::loaders::{LoadResult, read_file};

/// Loader for tuning catalogs from RON files.
pub struct TuningLoader;

impl TuningLoader {
    /// Load a tuning catalog from a RON file.
    ///
    /// RON format:
    ///
    /// ```text
    /// (
    ///     players: { "hero": (speed: 6.0) },
    ///     enemies: { "grunt": (initial_health: 30, flee_chance: 0.0) },
    ///     bosses: { "crab": (pieces: [(offset: (2.0, 0.0))]) },
    ///     hazards: { "spikes": (damage: 5, interval: 0.5) },
    /// )
    /// ```
    ///
    /// Fields left out of an entry keep their defaults. The stock tunings are
    /// always available under [`TuningCatalog::DEFAULT_ID`].
    pub fn load(path: &Path) -> LoadResult<TuningCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid tunings {}: {}", path.display(), e))
    }

    /// Parse and validate a catalog from RON text.
    pub fn parse(content: &str) -> LoadResult<TuningCatalog> {
        let mut catalog: TuningCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tuning catalog RON: {}", e))?;
        catalog.merge_defaults();
        catalog.validate()?;

        tracing::debug!(entries = catalog.len(), "loaded tuning catalog");
        Ok(catalog)
    }
}
