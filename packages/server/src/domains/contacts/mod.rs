//! Contact list management.
//!
//! Each user owns a private list of contacts. This domain covers:
//! - Creating, reading, updating, and deleting contacts
//! - Search, status filters, and pagination over the list
//! - The append-only activity log of every mutation

pub mod models;
pub mod service;

pub use service::{ContactListQuery, ContactService, ACTIVITY_PAGE_SIZE, CONTACT_PAGE_SIZE};
