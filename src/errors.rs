//! Unified error type for `TourDesk`.
//!
//! Every core operation returns [`Result`]; the HTTP layer maps the variants onto
//! status codes in [`crate::api::error`].

use thiserror::Error;

/// All failures surfaced by the core and configuration layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A referenced tour, booking or backup does not exist (or is soft-deleted)
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// Caller-supplied fields failed shape constraints
    #[error("Validation failed: {message}")]
    Validation {
        /// Which constraint failed
        message: String,
    },

    /// The backup was restored before; restoring is allowed once
    #[error("Backup {id} has already been restored")]
    AlreadyRestored {
        /// Backup identifier
        id: i64,
    },

    /// The backup carries no payload that could be restored
    #[error("Backup {id} has no data available to restore")]
    MissingSnapshotData {
        /// Backup identifier
        id: i64,
    },

    /// Storage failure propagated from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A snapshot payload could not be encoded or decoded
    #[error("Snapshot payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Outbound notification could not be delivered
    #[error("Notification error: {message}")]
    Notification {
        /// Transport-level reason
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
