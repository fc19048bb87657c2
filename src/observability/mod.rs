//! Observability subsystem.
//!
//! Every layer logs through `tracing` with structured fields; HTTP requests
//! get a span carrying method, URI and request ID (see `http::server`).

pub mod logging;

pub use logging::init_logging;
