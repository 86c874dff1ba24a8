//! Revocation check error types.
//!
//! Evaluating a token against an event never fails; a missing claim does not
//! match the criterion it would be compared with.

use os_revoke_storage::StorageError;
use thiserror::Error;

/// Errors returned by revocation checks.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`; new variants may be added in
/// future minor releases. Downstream match expressions must include a
/// wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// A revocation event matches the token.
    #[error("Token revoked (audit_id: {})", .audit_id.as_deref().unwrap_or("none"))]
    TokenRevoked {
        /// Audit id of the revoked token, if it carried one.
        audit_id: Option<String>,
    },

    /// The revocation store could not be read and no usable fallback exists.
    ///
    /// Wraps the original [`StorageError`] to preserve the source chain.
    #[error("Revocation store unavailable: {0}")]
    StoreUnavailable(
        /// The underlying storage error.
        #[source]
        StorageError,
    ),
}

impl AuthError {
    /// Creates a `TokenRevoked` error.
    #[must_use]
    pub fn token_revoked(audit_id: Option<String>) -> Self {
        Self::TokenRevoked { audit_id }
    }

    /// Creates a `StoreUnavailable` error.
    #[must_use]
    pub fn store_unavailable(err: StorageError) -> Self {
        Self::StoreUnavailable(err)
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::StoreUnavailable(err)
    }
}

/// Result type alias for revocation checks.
pub type Result<T> = std::result::Result<T, AuthError>;
