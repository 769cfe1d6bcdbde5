//! Error types for GearForge

use thiserror::Error;

/// Main error type for GearForge operations
#[derive(Debug, Error)]
pub enum GearForgeError {
    /// The request failed a pre-run check; the message is user-facing.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Error in search configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// An item name was not found in the catalog
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// A stat name did not match any known stat
    #[error("Unknown stat: {0}")]
    UnknownStat(String),

    /// The search snapshot violates a precondition of the search core
    #[error("Invalid search snapshot: {0}")]
    InvalidSnapshot(String),

    /// Search was cancelled before completion
    #[error("Search was cancelled")]
    Cancelled,

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Pre-run validation failures reported to the user instead of starting workers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A weapon must be selected before searching")]
    NoWeapon,

    #[error("The combo has no damaging rows to score")]
    NoDamagingComboRows,

    #[error("Invalid item level range {min}..={max}")]
    InvalidLevelRange { min: u32, max: u32 },

    #[error("Unknown boost token '{0}' in combo")]
    UnknownBoostToken(String),
}

/// Result type alias for GearForge operations
pub type Result<T> = std::result::Result<T, GearForgeError>;
