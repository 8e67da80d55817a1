//! Top-level error types for the Pipemind domain.
//!
//! [`PipemindError`] covers conditions raised while turning raw user input
//! (widget strings, CLI flags, configuration files) into domain values.
//! Node-level failures (a missing text file, a failed map export) are defined
//! next to the node that produces them in the `nodes` crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Domain-level errors
// ---------------------------------------------------------------------------

/// Errors produced while parsing or validating node inputs and configuration.
///
/// None of these are retried; every node invocation is a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PipemindError {
    /// A string did not name any variant of an enumerated input.
    ///
    /// Produced by: the `FromStr` impls of [`crate::SelectionMode`],
    /// [`crate::Direction`], [`crate::Delimiter`] and friends.
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant {
        /// Human-readable name of the enumerated input (e.g. `"selection mode"`).
        kind: String,
        /// The rejected input value.
        value: String,
    },

    /// A node input was present but could not be used.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// Name of the offending input.
        field: String,
        /// Description of the problem.
        message: String,
    },

    /// The runtime configuration is invalid.
    ///
    /// Produced at load time; the CLI never dispatches a command with an
    /// invalid configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl PipemindError {
    /// Shorthand for [`PipemindError::UnknownVariant`].
    pub fn unknown(kind: &str, value: &str) -> Self {
        Self::UnknownVariant {
            kind: kind.to_string(),
            value: value.to_string(),
        }
    }
}
