// HTTP surface: router, middleware, handlers, error rendering

pub mod app;
pub mod error;
pub mod middleware;
pub mod routes;

pub use app::{build_app, AxumAppState};
pub use error::success;
