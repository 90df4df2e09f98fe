pub mod activity_log;
pub mod contact;

pub use activity_log::{ActivityAction, ActivityLogEntry};
pub use contact::{
    Contact, ContactChanges, ContactDraft, ContactFilter, ContactInput, ContactPatch,
    ContactStatus,
};
