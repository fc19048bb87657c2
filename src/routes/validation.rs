//! Structural validation of route records.
//!
//! # Responsibilities
//! - One pure predicate per field
//! - Compose predicates into a record-level check
//! - Report every failing field, never just the first
//!
//! # Design Decisions
//! - Patterns are compiled once and shared read-only
//! - Lengths are counted in characters, not bytes
//! - Missing and empty values are reported as "required"

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::routes::model::{RouteDraft, RouteItem};

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 32;
pub const HOST_MIN_LEN: usize = 5;
pub const BACKEND_MIN_LEN: usize = 5;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid name regex"));

// Doubled slashes and a trailing slash both pass this pattern; segments are
// not checked for emptiness.
static PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[A-Za-z0-9/_-]*$").expect("valid path regex"));

static HOST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)*([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)$",
    )
    .expect("valid host regex")
});

static BACKEND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://([a-zA-Z0-9\-._~%]+|\[[a-fA-F0-9:]+\])(:[0-9]+)?(/\S*)?$")
        .expect("valid backend regex")
});

/// Field of a route record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteField {
    Name,
    Host,
    Path,
    Backend,
    Enabled,
}

impl fmt::Display for RouteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RouteField::Name => "name",
            RouteField::Host => "host",
            RouteField::Path => "path",
            RouteField::Backend => "backend",
            RouteField::Enabled => "enabled",
        };
        f.write_str(s)
    }
}

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: RouteField,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field check that failed for one record. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns true if the given field failed.
    pub fn has(&self, field: RouteField) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Slug of 3 to 32 lowercase alphanumerics with internal hyphens.
fn check_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(format!(
            "must be between {} and {} characters",
            NAME_MIN_LEN, NAME_MAX_LEN
        ));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(
            "must be lowercase letters, digits and internal hyphens".to_string(),
        );
    }
    Ok(())
}

/// RFC 1123 hostname of at least 5 characters.
fn check_host(host: &str) -> Result<(), String> {
    if host.chars().count() < HOST_MIN_LEN {
        return Err(format!("must be at least {} characters", HOST_MIN_LEN));
    }
    if !HOST_PATTERN.is_match(host) {
        return Err("must be a valid hostname".to_string());
    }
    Ok(())
}

/// Absolute path made of letters, digits, `_`, `-` and `/`.
fn check_path(path: &str) -> Result<(), String> {
    if !PATH_PATTERN.is_match(path) {
        return Err(
            "must start with `/` and contain only letters, digits, `_`, `-` or `/`"
                .to_string(),
        );
    }
    Ok(())
}

/// Absolute `http`/`https` URL with an optional ASCII port and path.
fn check_backend(backend: &str) -> Result<(), String> {
    if backend.chars().count() < BACKEND_MIN_LEN {
        return Err(format!("must be at least {} characters", BACKEND_MIN_LEN));
    }
    if !BACKEND_PATTERN.is_match(backend) {
        return Err("must be an http:// or https:// URL".to_string());
    }
    Ok(())
}

/// Runs `check` on a required string field, recording any failure.
fn required(
    value: Option<String>,
    field: RouteField,
    check: fn(&str) -> Result<(), String>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => match check(&v) {
            Ok(()) => Some(v),
            Err(message) => {
                errors.push(FieldError { field, message });
                None
            }
        },
        _ => {
            errors.push(FieldError {
                field,
                message: "is required".to_string(),
            });
            None
        }
    }
}

/// Validates a draft as a whole, returning the record or every failure.
pub fn validate_route(draft: RouteDraft) -> Result<RouteItem, ValidationErrors> {
    let mut errors = Vec::new();

    let name = required(draft.name, RouteField::Name, check_name, &mut errors);
    let host = required(draft.host, RouteField::Host, check_host, &mut errors);
    let path = required(draft.path, RouteField::Path, check_path, &mut errors);
    let backend = required(draft.backend, RouteField::Backend, check_backend, &mut errors);

    if draft.enabled.is_none() {
        errors.push(FieldError {
            field: RouteField::Enabled,
            message: "is required".to_string(),
        });
    }

    match (name, host, path, backend, draft.enabled) {
        (Some(name), Some(host), Some(path), Some(backend), Some(enabled)) if errors.is_empty() => {
            Ok(RouteItem {
                name,
                host,
                path,
                backend,
                enabled,
            })
        }
        _ => Err(ValidationErrors(errors)),
    }
}
