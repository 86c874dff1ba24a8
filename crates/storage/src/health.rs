//! Health check types for revocation event stores.
//!
//! [`RevocationEventStore::health_check`](crate::RevocationEventStore::health_check)
//! reports a [`HealthStatus`] rather than a bare boolean so the API layer can
//! surface the reason and check metadata alongside the verdict.
//!
//! | `HealthStatus` | HTTP status |
//! |----------------|-------------|
//! | `Healthy`      | 200 OK      |
//! | `Unhealthy`    | 503         |

use std::{collections::BTreeMap, fmt, time::Duration};

/// The type of health probe to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthProbe {
    /// Process is alive and the store is not deadlocked.
    Liveness,
    /// Store can serve listings and token checks.
    Readiness,
}

impl fmt::Display for HealthProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Liveness => write!(f, "liveness"),
            Self::Readiness => write!(f, "readiness"),
        }
    }
}

/// Health status of a store.
#[derive(Debug, Clone)]
pub enum HealthStatus {
    /// Store is fully operational.
    Healthy(HealthMetadata),
    /// Store cannot serve traffic; the `String` says why.
    Unhealthy(HealthMetadata, String),
}

impl HealthStatus {
    /// Creates a `Healthy` status.
    #[must_use = "creating a status has no side effects"]
    pub fn healthy(metadata: HealthMetadata) -> Self {
        Self::Healthy(metadata)
    }

    /// Creates an `Unhealthy` status with a reason.
    #[must_use = "creating a status has no side effects"]
    pub fn unhealthy(metadata: HealthMetadata, reason: impl Into<String>) -> Self {
        Self::Unhealthy(metadata, reason.into())
    }

    /// Returns `true` if the store is healthy.
    #[must_use = "health status predicates should be checked"]
    pub fn is_serving(&self) -> bool {
        matches!(self, Self::Healthy(_))
    }

    /// Short lowercase label: `healthy` or `unhealthy`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy(_) => "healthy",
            Self::Unhealthy(..) => "unhealthy",
        }
    }

    /// Returns the metadata associated with this health status.
    #[must_use]
    pub fn metadata(&self) -> &HealthMetadata {
        match self {
            Self::Healthy(m) | Self::Unhealthy(m, _) => m,
        }
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Healthy(_) => None,
            Self::Unhealthy(_, reason) => Some(reason),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.metadata().check_duration.as_millis();
        match self.reason() {
            Some(reason) => write!(f, "{}: {} ({}ms)", self.label(), reason, millis),
            None => write!(f, "{} ({}ms)", self.label(), millis),
        }
    }
}

/// Timing, backend name and backend-specific details of a health check.
#[derive(Debug, Clone)]
pub struct HealthMetadata {
    /// How long the health check itself took.
    pub check_duration: Duration,
    /// Identifier for the store type (e.g. "memory").
    pub backend: String,
    /// Store-specific details such as `event_count` or `watermark`.
    pub details: BTreeMap<String, String>,
}

impl HealthMetadata {
    /// Creates metadata with no details.
    #[must_use = "constructing metadata has no side effects"]
    pub fn new(check_duration: Duration, backend: impl Into<String>) -> Self {
        Self { check_duration, backend: backend.into(), details: BTreeMap::new() }
    }

    /// Adds a detail entry, returning `self` for chaining.
    #[must_use = "returns the modified metadata for chaining"]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_status() {
        let status = HealthStatus::healthy(HealthMetadata::new(Duration::from_millis(2), "memory"));

        assert!(status.is_serving());
        assert_eq!(status.label(), "healthy");
        assert!(status.reason().is_none());
        assert_eq!(status.to_string(), "healthy (2ms)");
    }

    #[test]
    fn test_unhealthy_does_not_serve() {
        let meta = HealthMetadata::new(Duration::from_secs(5), "memory");
        let status = HealthStatus::unhealthy(meta, "timeout");

        assert!(!status.is_serving());
        assert_eq!(status.reason(), Some("timeout"));
        assert_eq!(status.to_string(), "unhealthy: timeout (5000ms)");
    }

    #[test]
    fn test_metadata_details_are_ordered() {
        let meta = HealthMetadata::new(Duration::ZERO, "memory")
            .with_detail("watermark", "2024-05-01T10:00:00Z")
            .with_detail("event_count", "42");

        let keys: Vec<_> = meta.details.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["event_count", "watermark"]);
    }

    #[test]
    fn test_probe_display() {
        assert_eq!(HealthProbe::Liveness.to_string(), "liveness");
        assert_eq!(HealthProbe::Readiness.to_string(), "readiness");
    }
}
