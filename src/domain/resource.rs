//! Catalog resources and their availability state.
//!
//! A resource is one of a closed set of variants. The variant carries the
//! type-specific field; everything else (id, title, state) is shared.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Availability state of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    /// On the shelf, can be loaned or reserved
    #[default]
    Available,

    /// Lent to a user
    Loaned,

    /// Held back from lending until released
    Reserved,
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Available => "AVAILABLE",
            Self::Loaned => "LOANED",
            Self::Reserved => "RESERVED",
        };
        f.write_str(label)
    }
}

/// Discriminant of a resource variant, without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Book,
    Magazine,
    Dvd,
}

/// Type-specific part of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceKind {
    Book { author: String },
    Magazine { issue_number: i32 },
    Dvd { duration_minutes: i32 },
}

impl ResourceKind {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Book { .. } => ResourceType::Book,
            Self::Magazine { .. } => ResourceType::Magazine,
            Self::Dvd { .. } => ResourceType::Dvd,
        }
    }

    /// Short human-readable type name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Book { .. } => "Book",
            Self::Magazine { .. } => "Magazine",
            Self::Dvd { .. } => "DVD",
        }
    }

    /// Display text for the type-specific field
    pub fn detail(&self) -> String {
        match self {
            Self::Book { author } => format!("Author: {}", author),
            Self::Magazine { issue_number } => format!("Issue: {}", issue_number),
            Self::Dvd { duration_minutes } => format!("Duration: {} min", duration_minutes),
        }
    }
}

/// A catalog item that can be loaned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    id: String,
    title: String,
    #[serde(default)]
    state: ResourceState,
    #[serde(flatten)]
    kind: ResourceKind,
}

impl Resource {
    /// Create a new resource in the `Available` state
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            state: ResourceState::Available,
            kind,
        }
    }

    pub fn book(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            title,
            ResourceKind::Book {
                author: author.into(),
            },
        )
    }

    pub fn magazine(id: impl Into<String>, title: impl Into<String>, issue_number: i32) -> Self {
        Self::new(id, title, ResourceKind::Magazine { issue_number })
    }

    pub fn dvd(id: impl Into<String>, title: impl Into<String>, duration_minutes: i32) -> Self {
        Self::new(id, title, ResourceKind::Dvd { duration_minutes })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub fn resource_type(&self) -> ResourceType {
        self.kind.resource_type()
    }

    pub fn is_available(&self) -> bool {
        self.state == ResourceState::Available
    }

    /// Only the catalog engine drives state transitions
    pub(crate) fn set_state(&mut self, state: ResourceState) {
        self.state = state;
    }

    /// One-line description including the variant field and current state
    pub fn describe(&self) -> String {
        match &self.kind {
            ResourceKind::Book { author } => format!(
                "BOOK - ID: {}, Title: {}, Author: {}, State: {}",
                self.id, self.title, author, self.state
            ),
            ResourceKind::Magazine { issue_number } => format!(
                "MAGAZINE - ID: {}, Title: {}, Issue: {}, State: {}",
                self.id, self.title, issue_number, self.state
            ),
            ResourceKind::Dvd { duration_minutes } => format!(
                "DVD - ID: {}, Title: {}, Duration: {} min, State: {}",
                self.id, self.title, duration_minutes, self.state
            ),
        }
    }
}
