//! Central dependency container (using traits for testability)
//!
//! Services and handlers reach storage only through the trait objects held
//! here, so a test can swap Postgres for the in-memory backend without
//! touching anything above this layer.

use std::sync::Arc;

use crate::domains::auth::TokenService;
use crate::kernel::memory_store::MemoryStore;
use crate::kernel::traits::{ActivityLogStore, ContactStore, CredentialStore};

#[derive(Clone)]
pub struct ServerDeps {
    pub credentials: Arc<dyn CredentialStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub activity: Arc<dyn ActivityLogStore>,
    /// Signs and verifies every token pair the API hands out.
    pub tokens: Arc<TokenService>,
    pub bcrypt_cost: u32,
}

impl ServerDeps {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        contacts: Arc<dyn ContactStore>,
        activity: Arc<dyn ActivityLogStore>,
        tokens: TokenService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            credentials,
            contacts,
            activity,
            tokens: Arc::new(tokens),
            bcrypt_cost,
        }
    }

    /// Dependencies over a fresh in-memory store. One `MemoryStore` backs
    /// all three trait handles, so they see the same data.
    pub fn in_memory(tokens: TokenService, bcrypt_cost: u32) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store, tokens, bcrypt_cost)
    }
}
