//! services/generation/src/error.rs
//!
//! Defines the primary error type for the generation service.

use crate::config::ConfigError;
use courseforge_core::ports::PortError;

/// The primary error type for the `generation` service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// The user's balance does not cover the cost of the requested generation.
    /// Raised before any external call is made; the pipeline short-circuits
    /// with no partial side effects.
    #[error("Insufficient credits: required {required}, available {available}")]
    InsufficientCredits { required: u32, available: u32 },
}
