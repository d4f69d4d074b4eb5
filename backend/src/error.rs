//! Domain error taxonomy.
//!
//! Every service failure is one of these variants. The REST boundary converts
//! them into a structured `CommandResult`; they are never allowed to escape
//! to a generic top-level handler.

use thiserror::Error;

pub type DomainResult<T> = std::result::Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Natural-key collision on insert.
    #[error("{entity} already exists: {detail}")]
    Duplicate {
        entity: &'static str,
        detail: String,
    },

    /// A named foreign entity does not exist.
    #[error("{entity} not found: '{name}'")]
    UnresolvedReference {
        entity: &'static str,
        name: String,
    },

    /// Malformed or missing required field.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// The underlying store cannot be read or written.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl DomainError {
    pub fn duplicate(entity: &'static str, detail: impl Into<String>) -> Self {
        Self::Duplicate {
            entity,
            detail: detail.into(),
        }
    }

    pub fn unresolved(entity: &'static str, name: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            entity,
            name: name.into(),
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// True if the store rejected an insert because of a UNIQUE constraint.
///
/// Services pre-check natural keys inside their transaction, but the
/// constraint remains the authority: a conflict that slips past the check is
/// reported as the same duplicate failure, not as a store error.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
