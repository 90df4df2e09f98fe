//! Typed id aliases for the domain entities.

pub use super::id::Id;

/// Marker for account entities.
pub struct User;

/// Marker for contact entities.
pub struct Contact;

/// Marker for activity log entries.
pub struct ActivityLogEntry;

pub type UserId = Id<User>;
pub type ContactId = Id<Contact>;
pub type ActivityLogId = Id<ActivityLogEntry>;
