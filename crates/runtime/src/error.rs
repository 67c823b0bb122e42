//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from controllers, tuning lookups and scenario spawning so
//! clients can bubble them up with consistent context.

use game_content::CatalogError;
use game_core::{BodyId, ConfigError, CoreError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("no actor owns body {0}")]
    UnknownActor(BodyId),

    #[error("scenario already has a player ({existing})")]
    DuplicatePlayer { existing: BodyId },

    #[error("failed to spawn {what} from scenario '{scenario}'")]
    Spawn {
        what: String,
        scenario: String,
        #[source]
        source: Box<RuntimeError>,
    },

    #[error("body ids exhausted")]
    BodyIdsExhausted,
}
