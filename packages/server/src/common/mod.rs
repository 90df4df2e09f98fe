// Common types and utilities shared across the application

pub mod entity_ids;
pub mod errors;
pub mod id;
pub mod pagination;
pub mod validate;

pub use entity_ids::{ActivityLogId, ContactId, UserId};
pub use errors::AppError;
pub use id::Id;
pub use pagination::{Page, PageRequest};
