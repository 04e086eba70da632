//! Unified error types for `Mealflow`.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants map
//! one-to-one onto the failure categories the surface layer translates to
//! responses: missing entities, rejected input, business-rule conflicts, and
//! missing permissions. Variants carry enough context to produce a useful
//! message without the caller re-deriving it.

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity that was looked up (e.g. "source ingredient")
        entity: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// The request payload is malformed or out of range
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable description of the rejected input
        message: String,
    },

    /// The operation is valid in general but not in the entity's current state
    #[error("conflict: {message}")]
    Conflict {
        /// Why the current state refuses the operation
        message: String,
    },

    /// The caller is authenticated but lacks the required role or ownership
    #[error("forbidden: {message}")]
    Forbidden {
        /// Which role or ownership check failed
        message: String,
    },

    /// Configuration could not be read or parsed
    #[error("configuration error: {message}")]
    Config {
        /// What went wrong while loading or parsing configuration
        message: String,
    },

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored configuration document failed to (de)serialize
    #[error("config document error: {0}")]
    ConfigDocument(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::NotFound`] with a numeric id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`Error::InvalidArgument`].
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Conflict`].
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Forbidden`].
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
