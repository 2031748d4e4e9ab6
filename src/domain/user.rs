//! Registered library users.

use serde::{Deserialize, Serialize};

/// A registered user who can borrow resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier within the user registry
    pub id: String,

    /// Display name
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
