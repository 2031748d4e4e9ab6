//! Error taxonomy for catalog operations.
//!
//! Every variant is recoverable: callers get it back as a value and decide
//! how to present it. Nothing in the engine terminates the process.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ResourceState;
use crate::store::RecordError;

/// Which registry an id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Resource,
    User,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resource => f.write_str("resource"),
            Self::User => f.write_str("user"),
        }
    }
}

/// Errors returned by the catalog engine and its persistence
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("A {kind} with id '{id}' already exists")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("The {field} of {kind} {id:?} contains a line break")]
    LineBreak {
        kind: EntityKind,
        id: String,
        field: &'static str,
    },

    #[error("No {kind} found with id '{id}'")]
    NotFound { kind: EntityKind, id: String },

    #[error("Resource '{id}' is not available (state: {state})")]
    NotAvailable { id: String, state: ResourceState },

    #[error("Resource '{id}' is not on loan (state: {state})")]
    NotLoaned { id: String, state: ResourceState },

    #[error("Resource '{id}' is not reserved (state: {state})")]
    NotReserved { id: String, state: ResourceState },

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: RecordError },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LibraryError {
    pub(crate) fn resource_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: EntityKind::Resource,
            id: id.to_string(),
        }
    }

    pub(crate) fn user_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: EntityKind::User,
            id: id.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for lookup misses
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LibraryError::NotAvailable {
            id: "b1".to_string(),
            state: ResourceState::Loaned,
        };
        assert_eq!(err.to_string(), "Resource 'b1' is not available (state: LOANED)");

        let err = LibraryError::user_not_found("u9");
        assert_eq!(err.to_string(), "No user found with id 'u9'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_record_message() {
        let err = LibraryError::MalformedRecord {
            line: 3,
            reason: RecordError::InvalidNumber("notanumber".to_string()),
        };
        assert!(err.to_string().starts_with("Malformed record at line 3"));
    }
}
