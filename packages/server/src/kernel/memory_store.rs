//! In-memory storage backend.
//!
//! Backs the full store surface with plain maps behind one lock, so the
//! whole stack can run without Postgres. Integration tests build on this;
//! it is also what `ServerDeps::in_memory` wires up.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::common::{ContactId, PageRequest, UserId};
use crate::domains::auth::models::{NewUser, User};
use crate::domains::contacts::models::{
    ActivityLogEntry, Contact, ContactChanges, ContactFilter,
};
use crate::kernel::traits::{
    ActivityLogStore, ContactStore, CredentialStore, StoreError,
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    contacts: HashMap<ContactId, Contact>,
    log: Vec<ActivityLogEntry>,
}

/// All three stores over shared in-process state.
///
/// Everything lives behind a single lock, which keeps filtered mutations
/// atomic the same way a single SQL statement is.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::Conflict);
        }
        let user = User::new(new_user);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert_contact(&self, contact: Contact) -> Result<Contact, StoreError> {
        let mut state = self.state.write().await;
        state.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn find_contact(
        &self,
        owner: UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .contacts
            .get(&id)
            .filter(|c| c.owner_user_id == owner)
            .cloned())
    }

    async fn update_contact(
        &self,
        owner: UserId,
        id: ContactId,
        changes: ContactChanges,
    ) -> Result<Option<Contact>, StoreError> {
        let mut state = self.state.write().await;
        match state.contacts.get_mut(&id) {
            Some(contact) if contact.owner_user_id == owner => {
                contact.apply(changes);
                Ok(Some(contact.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_contact(
        &self,
        owner: UserId,
        id: ContactId,
    ) -> Result<Option<Contact>, StoreError> {
        let mut state = self.state.write().await;
        if state
            .contacts
            .get(&id)
            .is_some_and(|c| c.owner_user_id == owner)
        {
            Ok(state.contacts.remove(&id))
        } else {
            Ok(None)
        }
    }

    async fn search_contacts(
        &self,
        owner: UserId,
        filter: &ContactFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Contact>, i64), StoreError> {
        let state = self.state.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);

        let mut matches: Vec<Contact> = state
            .contacts
            .values()
            .filter(|c| c.owner_user_id == owner)
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| {
                needle.as_deref().map_or(true, |q| {
                    c.name.to_lowercase().contains(q) || c.email.to_lowercase().contains(q)
                })
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }
}

#[async_trait]
impl ActivityLogStore for MemoryStore {
    async fn append_entry(&self, entry: ActivityLogEntry) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.log.push(entry);
        Ok(())
    }

    async fn entries_for_user(
        &self,
        user: UserId,
        page: &PageRequest,
    ) -> Result<(Vec<ActivityLogEntry>, i64), StoreError> {
        let state = self.state.read().await;

        let mut matches: Vec<ActivityLogEntry> = state
            .log
            .iter()
            .filter(|e| e.user_id == user)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::contacts::models::{ContactDraft, ContactStatus};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Test".to_string(),
        }
    }

    fn new_contact(owner: UserId, name: &str) -> Contact {
        Contact::new(
            owner,
            ContactDraft {
                name: name.to_string(),
                email: format!("{}@x.com", name.to_lowercase()),
                phone: None,
                company: None,
                status: ContactStatus::Lead,
                notes: None,
            },
        )
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a@x.com")).await.unwrap();

        let err = store.insert_user(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_contact_ops_are_owner_scoped() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let stranger = UserId::new();

        let contact = store.insert_contact(new_contact(owner, "Bob")).await.unwrap();

        assert!(store.find_contact(stranger, contact.id).await.unwrap().is_none());
        assert!(store
            .update_contact(stranger, contact.id, ContactChanges::default())
            .await
            .unwrap()
            .is_none());
        assert!(store.delete_contact(stranger, contact.id).await.unwrap().is_none());

        // The owner still sees it untouched.
        assert!(store.find_contact(owner, contact.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_search_paginates_newest_update_first() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        for i in 0..5 {
            store
                .insert_contact(new_contact(owner, &format!("C{i}")))
                .await
                .unwrap();
        }

        let page = PageRequest::new(Some(2), 2);
        let (items, total) = store
            .search_contacts(owner, &ContactFilter::default(), &page)
            .await
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);
        // Page 1 holds C4 and C3; page 2 starts at C2.
        assert_eq!(items[0].name, "C2");
        assert_eq!(items[1].name, "C1");
    }
}
