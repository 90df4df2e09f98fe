// Kernel - storage backends and the dependency container behind the services

pub mod deps;
pub mod memory_store;
pub mod pg_store;
pub mod traits;

pub use deps::ServerDeps;
pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use traits::{ActivityLogStore, ContactStore, CredentialStore, StoreError};
