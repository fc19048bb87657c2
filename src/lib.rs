//! Route registry: CRUD management of reverse-proxy route definitions
//! persisted to a flat file.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routes;

pub use config::RegistryConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routes::{RouteItem, RouteService};
