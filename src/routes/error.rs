//! Error types for the route lifecycle.

use thiserror::Error;

use crate::routes::validation::ValidationErrors;

/// Status class attached to every domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// The request itself is wrong (400).
    BadRequest,
    /// The targeted route does not exist (404).
    NotFound,
    /// The request body exceeds the configured limit (413).
    PayloadTooLarge,
    /// Storage or other server-side failure (500).
    Internal,
}

impl StatusClass {
    /// Numeric HTTP-style status code.
    pub fn code(self) -> u16 {
        match self {
            StatusClass::BadRequest => 400,
            StatusClass::NotFound => 404,
            StatusClass::PayloadTooLarge => 413,
            StatusClass::Internal => 500,
        }
    }
}

/// Failures raised by a [`RouteRepository`](crate::routes::RouteRepository).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No record with the given name.
    #[error("route `{0}` not found in store")]
    NotFound(String),

    /// Reading, writing or renaming the routes file failed.
    #[error("routes file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The routes file exists but is not a valid collection.
    #[error("routes file is corrupt: {0}")]
    Decode(#[from] toml::de::Error),

    /// The collection could not be serialized.
    #[error("failed to encode routes: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Errors returned by [`RouteService`](crate::routes::RouteService) operations.
#[derive(Debug, Error)]
pub enum RouteError {
    /// One or more fields failed their structural check.
    #[error("invalid route: {0}")]
    Validation(#[from] ValidationErrors),

    /// The request body could not be decoded at all.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// The request body is larger than the server accepts.
    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    /// An update tried to change the route name.
    #[error("route name cannot be changed (target `{target}`, body `{name}`)")]
    NameMismatch { target: String, name: String },

    /// Create targeted a name that is already taken.
    #[error("route `{0}` already exists")]
    Conflict(String),

    /// The targeted route does not exist.
    #[error("route `{0}` not found")]
    NotFound(String),

    /// The routes store failed.
    #[error("route storage failure")]
    Storage(#[source] RepositoryError),
}

impl RouteError {
    /// Status class reported at the API boundary.
    pub fn status(&self) -> StatusClass {
        match self {
            RouteError::Validation(_)
            | RouteError::MalformedBody(_)
            | RouteError::NameMismatch { .. }
            | RouteError::Conflict(_) => StatusClass::BadRequest,
            RouteError::NotFound(_) => StatusClass::NotFound,
            RouteError::PayloadTooLarge(_) => StatusClass::PayloadTooLarge,
            RouteError::Storage(_) => StatusClass::Internal,
        }
    }
}

/// Result type for route operations.
pub type RouteResult<T> = Result<T, RouteError>;
