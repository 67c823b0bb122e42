//! Error types for game-core.
//!
//! Gameplay itself has no recoverable failures: damage and healing are
//! total, and missing collaborators short-circuit the dependent behavior.
//! What can fail is configuration (rejected at spawn) and the state-machine
//! engine (a runaway transition chain).

use actor_fsm::FsmError;

/// A tuning value outside the range the behavior can work with.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("`{field}` must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { field: &'static str, value: f32 },

    #[error("`{field}` must be within [0, 1] (got {value})")]
    ProbabilityOutOfRange { field: &'static str, value: f32 },

    #[error("`{field}` must be finite and positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    #[error("`{field}` must be finite (got {value})")]
    NotFinite { field: &'static str, value: f32 },

    #[error("expected {expected} piece bodies, got {got}")]
    PieceCount { expected: usize, got: usize },
}

impl ConfigError {
    /// Checks a duration field.
    pub fn check_duration(field: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidDuration { field, value })
        }
    }

    /// Checks a probability or ratio field.
    pub fn check_probability(field: &'static str, value: f32) -> Result<(), Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::ProbabilityOutOfRange { field, value })
        }
    }

    /// Checks a strictly positive field such as a radius or timestep.
    pub fn check_positive(field: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::NotPositive { field, value })
        }
    }

    pub fn check_finite(field: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::NotFinite { field, value })
        }
    }
}

/// Errors surfaced by actor controllers.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fsm(#[from] FsmError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks() {
        assert!(ConfigError::check_duration("stun_duration", 0.0).is_ok());
        assert!(ConfigError::check_duration("stun_duration", -0.1).is_err());
        assert!(ConfigError::check_duration("stun_duration", f32::NAN).is_err());
        assert!(ConfigError::check_probability("flee_chance", 1.0).is_ok());
        assert!(ConfigError::check_probability("flee_chance", 1.5).is_err());
        assert!(ConfigError::check_positive("radius", 0.0).is_err());
        assert!(ConfigError::check_finite("gravity", f32::INFINITY).is_err());
    }

    #[test]
    fn messages_name_the_field() {
        let err = ConfigError::check_probability("scare_factor", 2.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`scare_factor` must be within [0, 1] (got 2)"
        );

        let err: CoreError = err.into();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
