//! biblioteca - Library catalog and loan manager
//!
//! Tracks books, magazines and DVDs, registered users, and the loans
//! between them, persisted as flat comma-delimited text files.
//!
//! # Architecture
//!
//! The [`CatalogEngine`] is the single owner of all state:
//! - Resources and users live in id-keyed registries
//! - Every successful loan appends to an ordered history
//! - Loans reference resources and users by id only
//!
//! # Modules
//!
//! - `domain`: Data structures (Resource, User, Loan)
//! - `core`: Registries, loan state machine, errors
//! - `store`: Text file formats and snapshot load/save
//! - `config`: Data file locations
//! - `cli`: Command-line interface and interactive menu
//!
//! # Usage
//!
//! ```bash
//! biblioteca user add u1 Ada Lovelace
//! biblioteca resource add book b1 Dune "Frank Herbert"
//! biblioteca loan b1 u1
//! biblioteca return b1
//! biblioteca history
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod store;

// Re-export main types at crate root for convenience
pub use crate::core::{CatalogEngine, LibraryError, LoanReceipt};
pub use crate::domain::{Loan, Resource, ResourceKind, ResourceState, ResourceType, User};
pub use crate::store::{DataFiles, LoadReport, RecordError};
