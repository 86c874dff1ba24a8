//! Retention policy for revocation events.
//!
//! A revocation event only matters while some unexpired token could match it.
//! Once every token it could revoke has expired on its own, the event is
//! prunable. The policy derives that point from the event itself:
//!
//! | Event carries        | Relevant until                                   |
//! |----------------------|--------------------------------------------------|
//! | `expires_at`         | `expires_at + expiration_buffer`                 |
//! | `issued_before`      | `issued_before + max_token_lifetime + buffer`    |
//! | neither              | `created_at + max_token_lifetime + buffer`       |
//!
//! The last row bounds events scoped only by `audit_id` / `audit_chain_id`
//! (and wildcard events) which would otherwise live forever.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use os_revoke_storage::RetentionPolicy;
//!
//! let policy = RetentionPolicy::builder()
//!     .max_token_lifetime(Duration::from_secs(8 * 3600))
//!     .expiration_buffer(Duration::from_secs(600))
//!     .build();
//!
//! assert_eq!(policy.max_token_lifetime, Duration::from_secs(8 * 3600));
//! assert!(policy.enabled);
//! ```

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::event::RevocationEvent;

/// Default maximum token lifetime (1 hour).
pub const DEFAULT_MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(3_600);

/// Default grace period added on top of the derived expiry (30 minutes).
///
/// Covers clock skew between the token issuer and this store.
pub const DEFAULT_EXPIRATION_BUFFER: Duration = Duration::from_secs(1_800);

/// Default interval between background prune passes (1 minute).
pub const DEFAULT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Controls how long revocation events are retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct RetentionPolicy {
    /// Longest lifetime any token can be issued with.
    #[serde(with = "humantime_serde", default = "default_max_token_lifetime")]
    #[builder(default = DEFAULT_MAX_TOKEN_LIFETIME)]
    pub max_token_lifetime: Duration,

    /// Grace period added to every derived expiry.
    #[serde(with = "humantime_serde", default = "default_expiration_buffer")]
    #[builder(default = DEFAULT_EXPIRATION_BUFFER)]
    pub expiration_buffer: Duration,

    /// Interval between background prune passes.
    #[serde(with = "humantime_serde", default = "default_prune_interval")]
    #[builder(default = DEFAULT_PRUNE_INTERVAL)]
    pub prune_interval: Duration,

    /// Also prune inside every append.
    #[serde(default)]
    #[builder(default)]
    pub prune_on_append: bool,

    /// When `false`, events are retained forever.
    #[serde(default = "default_enabled")]
    #[builder(default = true)]
    pub enabled: bool,
}

fn default_max_token_lifetime() -> Duration {
    DEFAULT_MAX_TOKEN_LIFETIME
}

fn default_expiration_buffer() -> Duration {
    DEFAULT_EXPIRATION_BUFFER
}

fn default_prune_interval() -> Duration {
    DEFAULT_PRUNE_INTERVAL
}

fn default_enabled() -> bool {
    true
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetentionPolicy {
    /// A policy that never prunes.
    #[must_use]
    pub fn retain_forever() -> Self {
        Self::builder().enabled(false).build()
    }

    /// The instant after which `event` can no longer affect any token.
    ///
    /// Saturates at the maximum representable time instead of overflowing.
    #[must_use]
    pub fn retain_until(&self, event: &RevocationEvent) -> DateTime<Utc> {
        let criteria = event.criteria();
        let anchor = match (criteria.expires_at, criteria.issued_before) {
            (Some(expires_at), _) => expires_at,
            (None, Some(issued_before)) => add(issued_before, self.max_token_lifetime),
            (None, None) => add(event.created_at(), self.max_token_lifetime),
        };
        add(anchor, self.expiration_buffer)
    }

    /// Returns `true` if `event` may be removed at `now`.
    #[must_use]
    pub fn is_prunable(&self, event: &RevocationEvent, now: DateTime<Utc>) -> bool {
        self.enabled && self.retain_until(event) < now
    }
}

fn add(at: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(duration)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
