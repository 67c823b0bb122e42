//! Named tuning sets that scenarios refer to by id.

use std::collections::BTreeMap;

use game_core::{AiTuning, BossTuning, ConfigError, HazardTuning, PlayerTuning};
use thiserror::Error;

/// Kind of tuning a catalog entry holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TuningKind {
    Player,
    Enemy,
    Boss,
    Hazard,
}

impl std::fmt::Display for TuningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TuningKind::Player => "player",
            TuningKind::Enemy => "enemy",
            TuningKind::Boss => "boss",
            TuningKind::Hazard => "hazard",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} tuning '{id}' is invalid")]
    Invalid {
        kind: TuningKind,
        id: String,
        #[source]
        source: ConfigError,
    },

    #[error("{kind} tuning '{id}' not found")]
    Missing { kind: TuningKind, id: String },
}

/// Every tuning available to a scenario, keyed by id.
///
/// Ordered maps keep iteration (and therefore spawn order) stable across runs.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TuningCatalog {
    pub players: BTreeMap<String, PlayerTuning>,
    pub enemies: BTreeMap<String, AiTuning>,
    pub bosses: BTreeMap<String, BossTuning>,
    pub hazards: BTreeMap<String, HazardTuning>,
}

impl TuningCatalog {
    /// Id the stock tunings are registered under.
    pub const DEFAULT_ID: &'static str = "default";

    /// A catalog holding only the stock tuning of each kind.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::default();
        catalog.merge_defaults();
        catalog
    }

    /// Adds the stock tunings under [`Self::DEFAULT_ID`] unless already present.
    pub fn merge_defaults(&mut self) {
        let id = Self::DEFAULT_ID.to_string();
        self.players.entry(id.clone()).or_default();
        self.enemies.entry(id.clone()).or_default();
        self.bosses.entry(id.clone()).or_default();
        self.hazards.entry(id).or_default();
    }

    pub fn player(&self, id: &str) -> Result<&PlayerTuning, CatalogError> {
        self.players.get(id).ok_or_else(|| missing(TuningKind::Player, id))
    }

    pub fn enemy(&self, id: &str) -> Result<&AiTuning, CatalogError> {
        self.enemies.get(id).ok_or_else(|| missing(TuningKind::Enemy, id))
    }

    pub fn boss(&self, id: &str) -> Result<&BossTuning, CatalogError> {
        self.bosses.get(id).ok_or_else(|| missing(TuningKind::Boss, id))
    }

    pub fn hazard(&self, id: &str) -> Result<&HazardTuning, CatalogError> {
        self.hazards.get(id).ok_or_else(|| missing(TuningKind::Hazard, id))
    }

    pub fn len(&self) -> usize {
        self.players.len() + self.enemies.len() + self.bosses.len() + self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates every entry, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), CatalogError> {
        fn check<T>(
            kind: TuningKind,
            entries: &BTreeMap<String, T>,
            validate: impl Fn(&T) -> Result<(), ConfigError>,
        ) -> Result<(), CatalogError> {
            for (id, tuning) in entries {
                validate(tuning).map_err(|source| CatalogError::Invalid {
                    kind,
                    id: id.clone(),
                    source,
                })?;
            }
            Ok(())
        }

        check(TuningKind::Player, &self.players, PlayerTuning::validate)?;
        check(TuningKind::Enemy, &self.enemies, AiTuning::validate)?;
        check(TuningKind::Boss, &self.bosses, BossTuning::validate)?;
        check(TuningKind::Hazard, &self.hazards, HazardTuning::validate)
    }
}

fn missing(kind: TuningKind, id: &str) -> CatalogError {
    tracing::debug!(%kind, id, "tuning lookup failed");
    CatalogError::Missing {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_kind() {
        let catalog = TuningCatalog::with_defaults();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.player(TuningCatalog::DEFAULT_ID).is_ok());
        assert!(catalog.enemy(TuningCatalog::DEFAULT_ID).is_ok());
        assert!(catalog.boss(TuningCatalog::DEFAULT_ID).is_ok());
        assert!(catalog.hazard(TuningCatalog::DEFAULT_ID).is_ok());
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn merge_keeps_existing_entries() {
        let mut catalog = TuningCatalog::default();
        catalog.enemies.insert(
            TuningCatalog::DEFAULT_ID.to_string(),
            AiTuning {
                initial_health: 7,
                ..AiTuning::default()
            },
        );
        catalog.merge_defaults();

        assert_eq!(catalog.enemy("default").map(|t| t.initial_health).ok(), Some(7));
    }

    #[test]
    fn missing_lookup_names_kind_and_id() {
        let catalog = TuningCatalog::default();
        let err = catalog.boss("crab").unwrap_err();
        assert_eq!(err.to_string(), "boss tuning 'crab' not found");
    }

    #[test]
    fn validate_reports_offending_entry() {
        let mut catalog = TuningCatalog::with_defaults();
        catalog.enemies.insert(
            "coward".to_string(),
            AiTuning {
                flee_chance: 1.5,
                ..AiTuning::default()
            },
        );

        match catalog.validate() {
            Err(CatalogError::Invalid { kind, id, .. }) => {
                assert_eq!(kind, TuningKind::Enemy);
                assert_eq!(id, "coward");
            }
            other => panic!("expected invalid enemy tuning, got {other:?}"),
        }
    }
}
