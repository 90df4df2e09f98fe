pub mod auth;
pub mod contacts;
pub mod health;

pub use auth::{me_handler, refresh_handler, sign_in_handler, sign_up_handler};
pub use contacts::{
    create_contact_handler, delete_contact_handler, get_contact_handler, list_contacts_handler,
    list_logs_handler, update_contact_handler,
};
pub use health::health_handler;
