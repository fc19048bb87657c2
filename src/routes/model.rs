//! Route record types.

use serde::{Deserialize, Serialize};

/// A validated route definition.
///
/// Only [`validate_route`](crate::routes::validate_route) produces these from
/// untrusted input; the repository stores them as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteItem {
    /// Unique slug identifying the route. Never changes after creation.
    pub name: String,

    /// Inbound host the route answers for.
    pub host: String,

    /// Inbound absolute path.
    pub path: String,

    /// Upstream URL requests are forwarded to.
    pub backend: String,

    /// Whether the route is active.
    pub enabled: bool,
}

/// Raw route payload as received from a client.
///
/// Every field is optional so that a missing value is reported by the
/// validator instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteDraft {
    pub name: Option<String>,
    pub host: Option<String>,
    pub path: Option<String>,
    pub backend: Option<String>,
    pub enabled: Option<bool>,
}
