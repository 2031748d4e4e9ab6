//! Loan history entries.
//!
//! A loan references its resource and user by id. The registries own the
//! records; ids are resolved to titles and names only for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single loan event in the history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Id of the loaned resource
    pub resource_id: String,

    /// Id of the borrowing user
    pub user_id: String,

    /// When the loan was made
    pub loaned_at: DateTime<Utc>,

    /// When the resource came back (None while the loan is open)
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// Create a new open loan stamped with the current time
    pub fn new(resource_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::at(resource_id, user_id, Utc::now())
    }

    /// Create an open loan with an explicit timestamp (used when loading history)
    pub fn at(
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
        loaned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            user_id: user_id.into(),
            loaned_at,
            returned_at: None,
        }
    }

    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }

    /// Close the loan. Repeated calls keep the first return time.
    pub fn mark_returned(&mut self) {
        self.mark_returned_at(Utc::now());
    }

    pub fn mark_returned_at(&mut self, when: DateTime<Utc>) {
        if self.returned_at.is_none() {
            self.returned_at = Some(when);
        }
    }

    /// Summary line given the resolved resource title and user name
    pub fn summary(&self, title: &str, user_name: &str) -> String {
        let status = if self.is_returned() {
            "(returned)"
        } else {
            "(pending)"
        };
        format!(
            "{} loaned to {} on {} {}",
            title,
            user_name,
            self.loaned_at.format("%Y-%m-%d"),
            status
        )
    }
}
