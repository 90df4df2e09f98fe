//! Storage traits the services depend on.
//!
//! Handlers and services only ever see these traits; whether the data lives
//! in Postgres or in memory is wired up at startup.

use async_trait::async_trait;
use thiserror::Error;

use crate::common::{ContactId, PageRequest, UserId};
use crate::domains::auth::models::{NewUser, User};
use crate::domains::contacts::models::{
    ActivityLogEntry, Contact, ContactChanges, ContactFilter,
};

/// Failures surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict;
            }
        }
        StoreError::Other(err.into())
    }
}

/// Account storage. Callers pass emails already normalized to lowercase.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
}

/// Contact storage. Every operation is scoped to an owner; a contact another
/// user owns behaves exactly like one that does not exist.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_contact(&self, contact: Contact) -> Result<Contact, StoreError>;
    async fn find_contact(
        &self,
        owner: UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, StoreError>;
    async fn update_contact(
        &self,
        owner: UserId,
        id: ContactId,
        changes: ContactChanges,
    ) -> Result<Option<Contact>, StoreError>;
    async fn delete_contact(
        &self,
        owner: UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, StoreError>;
    async fn search_contacts(
        &self,
        owner: UserId,
        filter: &ContactFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Contact>, i64), StoreError>;
}

/// Append-only activity trail, newest first on reads.
#[async_trait]
pub trait ActivityLogStore: Send + Sync {
    async fn append_entry(&self, entry: ActivityLogEntry) -> Result<(), StoreError>;
    async fn entries_for_user(
        &self,
        user: UserId,
        page: &PageRequest,
    ) -> Result<(Vec<ActivityLogEntry>, i64), StoreError>;
}
