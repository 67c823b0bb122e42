//! Content loaders for reading game data from files.
//!
//! RON carries tunings and scenarios, TOML carries the game configuration.
//! Every loader validates what it parsed before handing it out.

pub mod config;
pub mod factory;
pub mod scenario;
pub mod tunings;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use scenario::ScenarioLoader;
pub use tunings::TuningLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
