use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use os_revoke_storage::StorageError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Revocation store unavailable: {0}")]
    StoreUnavailable(#[source] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        if e.is_transient() { ApiError::StoreUnavailable(e) } else { ApiError::Internal(e.to_string()) }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::InvalidParameter(s) => s.clone(),
            ApiError::StoreUnavailable(e) => {
                tracing::warn!(error = %e, "revocation store unavailable");
                "The revocation event store is temporarily unavailable.".to_owned()
            },
            ApiError::Internal(s) => {
                tracing::error!(error = %s, "internal error");
                "An unexpected error occurred.".to_owned()
            },
        };

        let body = json!({
            "error": {
                "code": status.as_u16(),
                "title": status.canonical_reason().unwrap_or_default(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_by_kind() {
        assert!(matches!(
            ApiError::from(StorageError::timeout()),
            ApiError::StoreUnavailable(StorageError::Timeout)
        ));
        assert!(matches!(
            ApiError::from(StorageError::connection("refused")),
            ApiError::StoreUnavailable(_)
        ));
        assert!(matches!(ApiError::from(StorageError::internal("corrupt")), ApiError::Internal(_)));
    }

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::InvalidParameter("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::StoreUnavailable(StorageError::timeout()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::Internal("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
