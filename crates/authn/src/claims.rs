//! Claims of a token under validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attributes of a token that revocation events are matched against.
///
/// Extracted by the token validator; never stored. Every attribute except
/// `issued_at` is optional because tokens differ in scope: an unscoped token
/// has no project or domain, a token without a trust has no `trust_id`.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use os_revoke_authn::TokenClaims;
///
/// let claims = TokenClaims::builder()
///     .issued_at(Utc::now())
///     .audit_id("Zx8_aW7cRLW1y-bK9Q0ybA")
///     .user_id("u-1")
///     .project_id("p-1")
///     .role_ids(vec!["member".to_owned()])
///     .build();
///
/// assert!(claims.has_role("member"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct TokenClaims {
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,

    /// When the token expires.
    pub expires_at: Option<DateTime<Utc>>,

    /// Identifier of this token.
    #[builder(into)]
    pub audit_id: Option<String>,

    /// Identifier shared with the token this one was rescoped from.
    #[builder(into)]
    pub audit_chain_id: Option<String>,

    /// Token owner.
    #[builder(into)]
    pub user_id: Option<String>,

    /// Domain scope.
    #[builder(into)]
    pub domain_id: Option<String>,

    /// Project scope.
    #[builder(into)]
    pub project_id: Option<String>,

    /// Roles granted on the token's scope.
    #[serde(default)]
    #[builder(default)]
    pub role_ids: Vec<String>,

    /// Trust the token was issued through.
    #[builder(into)]
    pub trust_id: Option<String>,

    /// OAuth consumer the token was issued to.
    #[builder(into)]
    pub consumer_id: Option<String>,
}

impl TokenClaims {
    /// Returns `true` if `role_id` is among the token's roles.
    #[must_use]
    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.iter().any(|r| r == role_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let claims = TokenClaims::builder().issued_at(Utc::now()).build();
        assert!(claims.audit_id.is_none());
        assert!(claims.role_ids.is_empty());
        assert!(!claims.has_role("admin"));
    }

    #[test]
    fn test_deserialize_without_roles() {
        let claims: TokenClaims = serde_json::from_str(
            r#"{"issued_at": "2024-05-01T10:00:00Z", "audit_id": "a", "user_id": "u"}"#,
        )
        .unwrap();

        assert_eq!(claims.audit_id.as_deref(), Some("a"));
        assert!(claims.role_ids.is_empty());
        assert!(claims.expires_at.is_none());
    }
}
