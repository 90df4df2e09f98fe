//! Postgres storage backend.
//!
//! Thin adapter from the store traits to the query functions on the models.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::{ContactId, PageRequest, UserId};
use crate::domains::auth::models::{NewUser, User};
use crate::domains::contacts::models::{
    ActivityLogEntry, Contact, ContactChanges, ContactFilter,
};
use crate::kernel::traits::{
    ActivityLogStore, ContactStore, CredentialStore, StoreError,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        User::insert(User::new(new_user), &self.pool).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        User::find_by_email(email, &self.pool).await
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        User::find_by_id(id, &self.pool).await
    }
}

#[async_trait]
impl ContactStore for PgStore {
    async fn insert_contact(&self, contact: Contact) -> Result<Contact, StoreError> {
        Contact::insert(contact, &self.pool).await
    }

    async fn find_contact(
        &self,
        owner: UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, StoreError> {
        Contact::find_for_owner(owner, id, &self.pool).await
    }

    async fn update_contact(
        &self,
        owner: UserId,
        id: ContactId,
        changes: ContactChanges,
    ) -> Result<Option<Contact>, StoreError> {
        Contact::update_for_owner(owner, id, changes, &self.pool).await
    }

    async fn delete_contact(
        &self,
        owner: UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, StoreError> {
        Contact::delete_for_owner(owner, id, &self.pool).await
    }

    async fn search_contacts(
        &self,
        owner: UserId,
        filter: &ContactFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Contact>, i64), StoreError> {
        Contact::search(owner, filter, page, &self.pool).await
    }
}

#[async_trait]
impl ActivityLogStore for PgStore {
    async fn append_entry(&self, entry: ActivityLogEntry) -> Result<(), StoreError> {
        ActivityLogEntry::insert(entry, &self.pool).await
    }

    async fn entries_for_user(
        &self,
        user: UserId,
        page: &PageRequest,
    ) -> Result<(Vec<ActivityLogEntry>, i64), StoreError> {
        ActivityLogEntry::list_for_user(user, page, &self.pool).await
    }
}
