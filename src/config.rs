//! Verification options and the fixed numeric bounds of the symbolic model.

use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

/// Symbolic integers live in this range; `varchar` values are interned above
/// it so the two value spaces never collide.
pub const INT_LOWER_BOUND: i64 = -1_000_000;
pub const INT_UPPER_BOUND: i64 = 1_000_000;

/// Dates are integer days since 1970-01-01.
pub const DATE_LOWER_BOUND: i64 = 0;
pub const DATE_UPPER_BOUND: i64 = 40_000;

/// Result-equality flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semantics {
    #[default]
    Bag,
    List,
    Set,
}

/// Which verifier backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Symbolic,
    Normalize,
}

fn default_solver_command() -> String {
    env::var("GRAPHEQ_SOLVER").unwrap_or_else(|_| "z3 -in".to_string())
}

/// Options for one verification request.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// Largest database bound the search ladder climbs to.
    #[validate(range(min = 1, max = 32, message = "bound_max must be between 1 and 32"))]
    #[serde(default = "VerifyOptions::default_bound_max")]
    pub bound_max: u32,

    /// Wall-clock budget for the whole ladder, in seconds.
    #[validate(range(min = 1, max = 86400, message = "timeout must be between 1s and 24h"))]
    #[serde(default = "VerifyOptions::default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub semantics: Semantics,

    #[serde(default)]
    pub backend: Backend,

    /// External solver command line, e.g. `z3 -in`. Overridable with the
    /// `GRAPHEQ_SOLVER` environment variable.
    #[serde(default = "default_solver_command")]
    pub solver_command: String,

    /// Assert PK/FK integrity constraints over the base database.
    #[serde(default = "VerifyOptions::default_true")]
    pub integrity_constraints: bool,
}

impl VerifyOptions {
    fn default_bound_max() -> u32 {
        3
    }

    fn default_timeout_secs() -> u64 {
        60
    }

    fn default_true() -> bool {
        true
    }
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions {
            bound_max: Self::default_bound_max(),
            timeout_secs: Self::default_timeout_secs(),
            semantics: Semantics::default(),
            backend: Backend::default(),
            solver_command: default_solver_command(),
            integrity_constraints: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let options = VerifyOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.bound_max, 3);
        assert_eq!(options.semantics, Semantics::Bag);
        assert_eq!(options.backend, Backend::Symbolic);
    }

    #[test]
    fn test_out_of_range_bound_rejected() {
        let options = VerifyOptions {
            bound_max: 0,
            ..VerifyOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let options: VerifyOptions = serde_json::from_str(r#"{"semantics": "list"}"#).unwrap();
        assert_eq!(options.semantics, Semantics::List);
        assert_eq!(options.bound_max, 3);
        assert!(options.integrity_constraints);
    }
}
