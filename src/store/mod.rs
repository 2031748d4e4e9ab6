//! Flat-file persistence for the catalog.
//!
//! # Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── usuarios.txt     # <id>,<name>
//! ├── recursos.txt     # <TYPE>,<id>,<title>,<extra>
//! └── prestamos.txt    # <resource_id>,<user_id>,<loaned_at>,<returned_at>
//! ```

pub mod files;
pub mod format;

pub use files::{DataFiles, LoadReport, SkippedLine};
pub use format::RecordError;
