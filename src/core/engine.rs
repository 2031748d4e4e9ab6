//! The catalog engine: registries, loan state machine and loan history.
//!
//! State transitions per resource:
//!
//! ```text
//! AVAILABLE --loan--> LOANED --return--> AVAILABLE
//! AVAILABLE --reserve--> RESERVED --release--> AVAILABLE
//! ```
//!
//! Every failed operation leaves registries and history untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::error::{EntityKind, LibraryError};
use super::registry::Registry;
use crate::domain::{Loan, Resource, ResourceKind, ResourceState, ResourceType, User};

/// Confirmation data for a successful loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanReceipt {
    pub resource_id: String,
    pub title: String,
    pub user_name: String,
    pub loaned_at: DateTime<Utc>,
}

/// A history entry with its ids resolved for display
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry<'a> {
    #[serde(flatten)]
    pub loan: &'a Loan,
    pub title: &'a str,
    pub user_name: &'a str,
}

impl HistoryEntry<'_> {
    pub fn summary(&self) -> String {
        self.loan.summary(self.title, self.user_name)
    }
}

/// Owner of all catalog state
#[derive(Debug, Default)]
pub struct CatalogEngine {
    resources: Registry<Resource>,
    users: Registry<User>,
    history: Vec<Loan>,
}

impl CatalogEngine {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Registries
    // ------------------------------------------------------------------

    /// Register a user. Returns false if the id is taken.
    pub fn add_user(&mut self, user: User) -> bool {
        self.try_add_user(user).is_ok()
    }

    pub fn try_add_user(&mut self, user: User) -> Result<(), LibraryError> {
        let fields = [("id", user.id.as_str()), ("name", user.name.as_str())];
        reject_line_breaks(EntityKind::User, &user.id, &fields)?;

        let id = user.id.clone();
        if !self.users.add(user) {
            return Err(LibraryError::DuplicateId {
                kind: EntityKind::User,
                id,
            });
        }
        debug!(user_id = %id, "User added");
        Ok(())
    }

    /// Register a resource. Returns false if the id is taken.
    pub fn add_resource(&mut self, resource: Resource) -> bool {
        self.try_add_resource(resource).is_ok()
    }

    pub fn try_add_resource(&mut self, resource: Resource) -> Result<(), LibraryError> {
        let author = match resource.kind() {
            ResourceKind::Book { author } => author.as_str(),
            _ => "",
        };
        let fields = [
            ("id", resource.id()),
            ("title", resource.title()),
            ("author", author),
        ];
        reject_line_breaks(EntityKind::Resource, resource.id(), &fields)?;

        let id = resource.id().to_string();
        if !self.resources.add(resource) {
            return Err(LibraryError::DuplicateId {
                kind: EntityKind::Resource,
                id,
            });
        }
        debug!(resource_id = %id, "Resource added");
        Ok(())
    }

    pub fn get_resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    /// All resources in insertion order
    pub fn resources(&self) -> &[Resource] {
        self.resources.all()
    }

    /// Resources of one variant, in insertion order
    pub fn resources_of_type(&self, resource_type: ResourceType) -> Vec<&Resource> {
        self.resources
            .all()
            .iter()
            .filter(|r| r.resource_type() == resource_type)
            .collect()
    }

    pub fn users(&self) -> &[User] {
        self.users.all()
    }

    /// Loan history in chronological order
    pub fn history(&self) -> &[Loan] {
        &self.history
    }

    /// History with resource titles and user names resolved
    pub fn history_entries(&self) -> Vec<HistoryEntry<'_>> {
        self.history
            .iter()
            .map(|loan| HistoryEntry {
                loan,
                title: self
                    .resources
                    .get(&loan.resource_id)
                    .map(|r| r.title())
                    .unwrap_or(loan.resource_id.as_str()),
                user_name: self
                    .users
                    .get(&loan.user_id)
                    .map(|u| u.name.as_str())
                    .unwrap_or(loan.user_id.as_str()),
            })
            .collect()
    }

    /// The most recent loan of a resource that has not been returned
    pub fn open_loan(&self, resource_id: &str) -> Option<&Loan> {
        self.history
            .iter()
            .rev()
            .find(|l| l.resource_id == resource_id && !l.is_returned())
    }

    // ------------------------------------------------------------------
    // Loan state machine
    // ------------------------------------------------------------------

    /// Lend an available resource to a registered user
    #[instrument(skip(self))]
    pub fn loan(&mut self, resource_id: &str, user_id: &str) -> Result<LoanReceipt, LibraryError> {
        let user_name = self
            .users
            .get(user_id)
            .map(|u| u.name.clone())
            .ok_or_else(|| LibraryError::user_not_found(user_id))?;

        let resource = self
            .resources
            .get_mut(resource_id)
            .ok_or_else(|| LibraryError::resource_not_found(resource_id))?;

        if resource.state() != ResourceState::Available {
            return Err(LibraryError::NotAvailable {
                id: resource_id.to_string(),
                state: resource.state(),
            });
        }

        resource.set_state(ResourceState::Loaned);
        let title = resource.title().to_string();

        let loan = Loan::new(resource_id, user_id);
        let loaned_at = loan.loaned_at;
        self.history.push(loan);

        info!(user = %user_name, "Resource loaned");

        Ok(LoanReceipt {
            resource_id: resource_id.to_string(),
            title,
            user_name,
            loaned_at,
        })
    }

    /// Take back a loaned resource and close its open loan
    #[instrument(skip(self))]
    pub fn return_resource(&mut self, resource_id: &str) -> Result<(), LibraryError> {
        let resource = self
            .resources
            .get_mut(resource_id)
            .ok_or_else(|| LibraryError::resource_not_found(resource_id))?;

        if resource.state() != ResourceState::Loaned {
            return Err(LibraryError::NotLoaned {
                id: resource_id.to_string(),
                state: resource.state(),
            });
        }

        resource.set_state(ResourceState::Available);

        if let Some(loan) = self
            .history
            .iter_mut()
            .rev()
            .find(|l| l.resource_id == resource_id && !l.is_returned())
        {
            loan.mark_returned();
        }

        info!("Resource returned");
        Ok(())
    }

    /// Hold an available resource so it cannot be loaned
    #[instrument(skip(self))]
    pub fn reserve(&mut self, resource_id: &str) -> Result<(), LibraryError> {
        let resource = self
            .resources
            .get_mut(resource_id)
            .ok_or_else(|| LibraryError::resource_not_found(resource_id))?;

        if resource.state() != ResourceState::Available {
            return Err(LibraryError::NotAvailable {
                id: resource_id.to_string(),
                state: resource.state(),
            });
        }

        resource.set_state(ResourceState::Reserved);
        info!("Resource reserved");
        Ok(())
    }

    /// Put a reserved resource back on the shelf
    #[instrument(skip(self))]
    pub fn release(&mut self, resource_id: &str) -> Result<(), LibraryError> {
        let resource = self
            .resources
            .get_mut(resource_id)
            .ok_or_else(|| LibraryError::resource_not_found(resource_id))?;

        if resource.state() != ResourceState::Reserved {
            return Err(LibraryError::NotReserved {
                id: resource_id.to_string(),
                state: resource.state(),
            });
        }

        resource.set_state(ResourceState::Available);
        info!("Reservation released");
        Ok(())
    }

    /// Re-insert a persisted loan, re-deriving the resource state.
    ///
    /// An open loan requires its resource to be available and flips it to
    /// loaned; a returned loan is appended as-is.
    pub(crate) fn restore_loan(&mut self, loan: Loan) -> Result<(), LibraryError> {
        if !self.users.contains(&loan.user_id) {
            return Err(LibraryError::user_not_found(&loan.user_id));
        }

        let resource = self
            .resources
            .get_mut(&loan.resource_id)
            .ok_or_else(|| LibraryError::resource_not_found(&loan.resource_id))?;

        if !loan.is_returned() {
            if resource.state() != ResourceState::Available {
                return Err(LibraryError::NotAvailable {
                    id: loan.resource_id.clone(),
                    state: resource.state(),
                });
            }
            resource.set_state(ResourceState::Loaned);
        }

        self.history.push(loan);
        Ok(())
    }
}

/// Data files hold one record per line, so no text field may break one
fn reject_line_breaks(
    kind: EntityKind,
    id: &str,
    fields: &[(&'static str, &str)],
) -> Result<(), LibraryError> {
    match fields.iter().find(|(_, text)| text.contains(['\n', '\r'])) {
        Some(&(field, _)) => Err(LibraryError::LineBreak {
            kind,
            id: id.to_string(),
            field,
        }),
        None => Ok(()),
    }
}
