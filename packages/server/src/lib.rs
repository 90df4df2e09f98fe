// Rolodex - API Core
//
// This crate provides the backend API for the Rolodex contact manager.
// Architecture follows domain-driven design: auth and contacts domains
// over pluggable stores, with the HTTP surface under server/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::Config;
