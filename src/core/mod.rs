//! Core catalog logic.
//!
//! This module contains:
//! - Registry: Id-keyed, insertion-ordered entity storage
//! - CatalogEngine: Registries, loan state machine and history
//! - LibraryError: Recoverable error taxonomy

pub mod engine;
pub mod error;
pub mod registry;

// Re-export commonly used types
pub use engine::{CatalogEngine, HistoryEntry, LoanReceipt};
pub use error::{EntityKind, LibraryError};
pub use registry::{Keyed, Registry};
