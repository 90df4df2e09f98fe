//! Contact CRUD plus the audit trail around it.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error};

use crate::common::{AppError, ContactId, Page, PageRequest, UserId};
use crate::domains::contacts::models::{
    ActivityAction, ActivityLogEntry, Contact, ContactFilter, ContactInput, ContactPatch,
};
use crate::kernel::{ActivityLogStore, ContactStore};

pub const CONTACT_PAGE_SIZE: i64 = 10;
pub const ACTIVITY_PAGE_SIZE: i64 = 20;

/// Listing parameters as they arrive over the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactListQuery {
    pub page: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// All contact reads and writes, always scoped to the acting user.
///
/// Every successful mutation appends one activity-log entry before the call
/// returns. The append happens after the mutation commits: if it fails, the
/// mutation stands and the error propagates to the caller.
#[derive(Clone)]
pub struct ContactService {
    contacts: Arc<dyn ContactStore>,
    activity: Arc<dyn ActivityLogStore>,
}

impl ContactService {
    pub fn new(contacts: Arc<dyn ContactStore>, activity: Arc<dyn ActivityLogStore>) -> Self {
        Self { contacts, activity }
    }

    /// Lists the user's contacts, most recently updated first.
    ///
    /// A status filter that names no known status cannot match any stored
    /// contact, so it yields an empty page rather than an error.
    pub async fn list(
        &self,
        owner: UserId,
        query: ContactListQuery,
    ) -> Result<Page<Contact>, AppError> {
        let request = PageRequest::new(query.page, CONTACT_PAGE_SIZE);

        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse() {
                Ok(status) => Some(status),
                Err(_) => return Ok(Page::empty(&request)),
            },
        };
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let filter = ContactFilter { status, search };
        let (items, total) = self.contacts.search_contacts(owner, &filter, &request).await?;
        Ok(Page::new(items, &request, total))
    }

    pub async fn get(&self, owner: UserId, id: ContactId) -> Result<Contact, AppError> {
        self.contacts
            .find_contact(owner, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, owner: UserId, input: ContactInput) -> Result<Contact, AppError> {
        let draft = input.validate()?;
        let contact = self.contacts.insert_contact(Contact::new(owner, draft)).await?;

        debug!(contact_id = %contact.id, "contact created");
        self.record(
            owner,
            ActivityAction::Add,
            contact.id,
            format!("Added contact: {}", contact.name),
        )
        .await?;
        Ok(contact)
    }

    pub async fn update(
        &self,
        owner: UserId,
        id: ContactId,
        patch: ContactPatch,
    ) -> Result<Contact, AppError> {
        let changes = patch.validate()?;
        let contact = self
            .contacts
            .update_contact(owner, id, changes)
            .await?
            .ok_or(AppError::NotFound)?;

        debug!(contact_id = %contact.id, "contact updated");
        self.record(
            owner,
            ActivityAction::Edit,
            contact.id,
            format!("Updated contact: {}", contact.name),
        )
        .await?;
        Ok(contact)
    }

    pub async fn delete(&self, owner: UserId, id: ContactId) -> Result<(), AppError> {
        let contact = self
            .contacts
            .delete_contact(owner, id)
            .await?
            .ok_or(AppError::NotFound)?;

        debug!(contact_id = %contact.id, "contact deleted");
        self.record(
            owner,
            ActivityAction::Delete,
            contact.id,
            format!("Deleted contact: {}", contact.name),
        )
        .await?;
        Ok(())
    }

    /// Lists the user's own activity entries, newest first.
    pub async fn activity(
        &self,
        user: UserId,
        page: Option<i64>,
    ) -> Result<Page<ActivityLogEntry>, AppError> {
        let request = PageRequest::new(page, ACTIVITY_PAGE_SIZE);
        let (items, total) = self.activity.entries_for_user(user, &request).await?;
        Ok(Page::new(items, &request, total))
    }

    async fn record(
        &self,
        user: UserId,
        action: ActivityAction,
        contact_id: ContactId,
        details: String,
    ) -> Result<(), AppError> {
        let entry = ActivityLogEntry::contact(user, action, contact_id, details);
        if let Err(err) = self.activity.append_entry(entry).await {
            error!(%action, %contact_id, "activity log append failed: {err:#}");
            return Err(err.into());
        }
        Ok(())
    }
}
