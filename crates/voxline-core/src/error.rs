//! Voxline error taxonomy.

use thiserror::Error;

/// Convenience alias used across all Voxline crates.
pub type Result<T> = std::result::Result<T, VoxlineError>;

/// Everything that can go wrong between the webhook boundary and the
/// calendar collaborator. The HTTP boundary never surfaces these as a
/// non-200 response; it maps them to acknowledgement-shaped bodies.
#[derive(Debug, Error)]
pub enum VoxlineError {
    /// A scheduling request carried a field the calendar cannot use,
    /// such as an unparseable date or time.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The downstream calendar call failed (auth, network, API error).
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Configuration file missing, unreadable, or invalid.
    #[error("Config error: {0}")]
    Config(String),
}
