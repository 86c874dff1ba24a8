use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use os_revoke_storage::HealthProbe;
use serde::Deserialize;
use serde_json::json;

use crate::{errors::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct HealthQuery {
    pub probe: Option<String>,
}

/// `liveness` or `readiness`; readiness when absent.
fn parse_probe(raw: Option<&str>) -> Result<HealthProbe, ApiError> {
    match raw.map(str::trim) {
        None | Some("" | "readiness") => Ok(HealthProbe::Readiness),
        Some("liveness") => Ok(HealthProbe::Liveness),
        Some(other) => Err(ApiError::InvalidParameter(format!(
            "Invalid value for 'probe': {other:?}; expected \"liveness\" or \"readiness\"."
        ))),
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

pub async fn healthz(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HealthQuery>,
) -> Result<Response, ApiError> {
    let probe = parse_probe(query.probe.as_deref())?;
    let health = state.health(probe).await?;
    let meta = health.metadata();

    let status = if health.is_serving() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = json!({
        "status": health.label(),
        "probe": probe.to_string(),
        "reason": health.reason(),
        "backend": meta.backend,
        "check_duration_ms": duration_millis(meta.check_duration),
        "details": meta.details,
    });
    Ok((status, Json(body)).into_response())
}
