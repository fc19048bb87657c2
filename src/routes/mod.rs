//! Route definition lifecycle.
//!
//! # Data Flow
//! ```text
//! RouteDraft (untrusted JSON body)
//!     → validation.rs (structural checks, all fields at once)
//!     → RouteItem (validated)
//!     → service.rs (uniqueness / existence rules, mutation lock)
//!     → repository.rs (whole-collection read-modify-write)
//!     → routes file on disk
//! ```
//!
//! # Design Decisions
//! - The persisted collection is the only source of truth; nothing is cached
//! - The repository is naive: business rules live in the service alone
//! - Route names are immutable once created

pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod validation;

pub use error::{RepositoryError, RouteError, StatusClass};
pub use model::{RouteDraft, RouteItem};
pub use repository::{FileRouteRepository, RouteRepository};
pub use service::RouteService;
pub use validation::{validate_route, FieldError, RouteField, ValidationErrors};
