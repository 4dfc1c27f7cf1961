//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a core
//! validation failure can surface through them.

use thiserror::Error;

/// The top-level error type for `sf-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f64),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `sf-core`.
pub type CoreResult<T> = Result<T, CoreError>;
