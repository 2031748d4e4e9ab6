//! Domain types for the library catalog.
//!
//! This module contains the core data structures:
//! - Resource: Catalog items (books, magazines, DVDs) and their loan state
//! - User: Registered borrowers
//! - Loan: History entries linking a resource to a user

pub mod loan;
pub mod resource;
pub mod user;

// Re-export commonly used types
pub use loan::Loan;
pub use resource::{Resource, ResourceKind, ResourceState, ResourceType};
pub use user::User;
