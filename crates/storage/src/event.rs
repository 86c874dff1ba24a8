//! Revocation event types.
//!
//! A revocation event is a set of match criteria. Any token matching every
//! criterion the event carries is revoked. Absent criteria are wildcards, so an
//! event with no criteria at all revokes every token.
//!
//! Two types model the lifecycle:
//!
//! - [`RevocationCriteria`]: what the identity system asks to revoke.
//! - [`RevocationEvent`]: the stored, immutable form, stamped with the
//!   server-assigned `created_at`.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use os_revoke_storage::RevocationCriteria;
//!
//! // A password change revokes every token the user holds today.
//! let criteria = RevocationCriteria::for_user("u-1", Utc::now());
//! assert_eq!(criteria.user_id.as_deref(), Some("u-1"));
//! assert!(criteria.issued_before.is_some());
//!
//! // Logging out of a single token.
//! let criteria = RevocationCriteria::for_audit_id("Zx8_aW7cRLW1y-bK9Q0ybA");
//! assert!(criteria.issued_before.is_none());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Match criteria for a revocation.
///
/// Every field is optional. String criteria match exactly; `role_id` matches
/// when the token's role set contains it; `issued_before` matches tokens issued
/// strictly before the boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct RevocationCriteria {
    /// Only tokens issued strictly before this instant can match.
    pub issued_before: Option<DateTime<Utc>>,

    /// Deprecated. Only tokens expiring at exactly this instant can match.
    pub expires_at: Option<DateTime<Utc>>,

    /// Token owner.
    #[builder(into)]
    pub user_id: Option<String>,

    /// Single token revocation.
    #[builder(into)]
    pub audit_id: Option<String>,

    /// Revokes a token and every token rescoped from it.
    #[builder(into)]
    pub audit_chain_id: Option<String>,

    /// Domain scope.
    #[builder(into)]
    pub domain_id: Option<String>,

    /// Project scope.
    #[builder(into)]
    pub project_id: Option<String>,

    /// Role that must be among the token's roles.
    #[builder(into)]
    pub role_id: Option<String>,

    /// Trust the token was issued through.
    #[builder(into)]
    pub trust_id: Option<String>,

    /// OAuth consumer the token was issued to.
    #[builder(into)]
    pub consumer_id: Option<String>,
}

impl RevocationCriteria {
    /// Revokes the single token with `audit_id`.
    #[must_use]
    pub fn for_audit_id(audit_id: impl Into<String>) -> Self {
        Self { audit_id: Some(audit_id.into()), ..Self::default() }
    }

    /// Revokes every token in the chain rooted at `audit_chain_id`.
    #[must_use]
    pub fn for_audit_chain(audit_chain_id: impl Into<String>) -> Self {
        Self { audit_chain_id: Some(audit_chain_id.into()), ..Self::default() }
    }

    /// Revokes the tokens of an audit chain that are scoped to `project_id`.
    #[must_use]
    pub fn for_audit_chain_in_project(
        audit_chain_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            audit_chain_id: Some(audit_chain_id.into()),
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }

    /// Revokes the tokens of an audit chain that are scoped to `domain_id`.
    #[must_use]
    pub fn for_audit_chain_in_domain(
        audit_chain_id: impl Into<String>,
        domain_id: impl Into<String>,
    ) -> Self {
        Self {
            audit_chain_id: Some(audit_chain_id.into()),
            domain_id: Some(domain_id.into()),
            ..Self::default()
        }
    }

    /// Revokes every token of `user_id` issued before `issued_before`.
    ///
    /// Used on password change, user disable and logout-everywhere.
    #[must_use]
    pub fn for_user(user_id: impl Into<String>, issued_before: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            issued_before: Some(issued_before),
            ..Self::default()
        }
    }

    /// Revokes the tokens of `user_id` scoped to `project_id`.
    #[must_use]
    pub fn for_user_and_project(
        user_id: impl Into<String>,
        project_id: impl Into<String>,
        issued_before: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            project_id: Some(project_id.into()),
            issued_before: Some(issued_before),
            ..Self::default()
        }
    }

    /// Revokes tokens carrying `role_id` on `project_id`, after a role
    /// assignment is removed.
    #[must_use]
    pub fn for_project_role(
        project_id: impl Into<String>,
        role_id: impl Into<String>,
        issued_before: DateTime<Utc>,
    ) -> Self {
        Self {
            project_id: Some(project_id.into()),
            role_id: Some(role_id.into()),
            issued_before: Some(issued_before),
            ..Self::default()
        }
    }

    /// Revokes tokens carrying `role_id` on `domain_id`.
    #[must_use]
    pub fn for_domain_role(
        domain_id: impl Into<String>,
        role_id: impl Into<String>,
        issued_before: DateTime<Utc>,
    ) -> Self {
        Self {
            domain_id: Some(domain_id.into()),
            role_id: Some(role_id.into()),
            issued_before: Some(issued_before),
            ..Self::default()
        }
    }

    /// Revokes every token scoped to `domain_id`, e.g. when it is disabled.
    #[must_use]
    pub fn for_domain(domain_id: impl Into<String>, issued_before: DateTime<Utc>) -> Self {
        Self {
            domain_id: Some(domain_id.into()),
            issued_before: Some(issued_before),
            ..Self::default()
        }
    }

    /// Revokes every token scoped to `project_id`.
    #[must_use]
    pub fn for_project(project_id: impl Into<String>, issued_before: DateTime<Utc>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            issued_before: Some(issued_before),
            ..Self::default()
        }
    }

    /// Revokes every token issued through `trust_id`.
    #[must_use]
    pub fn for_trust(trust_id: impl Into<String>, issued_before: DateTime<Utc>) -> Self {
        Self {
            trust_id: Some(trust_id.into()),
            issued_before: Some(issued_before),
            ..Self::default()
        }
    }

    /// Revokes every token issued to the OAuth consumer `consumer_id`.
    #[must_use]
    pub fn for_consumer(consumer_id: impl Into<String>, issued_before: DateTime<Utc>) -> Self {
        Self {
            consumer_id: Some(consumer_id.into()),
            issued_before: Some(issued_before),
            ..Self::default()
        }
    }

    /// Returns `true` when no criterion is set. Such an event revokes every token.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self == &Self::default()
    }
}

/// A stored revocation event.
///
/// Immutable once created: events are appended and eventually pruned, never
/// updated. The store-internal sequence number orders events with equal
/// timestamps and is never exposed outside this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevocationEvent {
    pub(crate) seq: u64,
    created_at: DateTime<Utc>,
    criteria: RevocationCriteria,
}

impl RevocationEvent {
    pub(crate) fn new(seq: u64, created_at: DateTime<Utc>, criteria: RevocationCriteria) -> Self {
        Self { seq, created_at, criteria }
    }

    /// Server-assigned insertion time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The match criteria this event was created with.
    #[must_use]
    pub fn criteria(&self) -> &RevocationCriteria {
        &self.criteria
    }
}
