use std::sync::Arc;

use axum::{
    Json,
    extract::{OriginalUri, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, header::LAST_MODIFIED},
    response::{IntoResponse, Response},
};

use crate::{
    dto::events::{EventsQuery, EventsResponse, format_timestamp, http_date},
    errors::ApiError,
    since::parse_since,
    state::AppState,
};

/// Full-precision watermark; clients pass it back verbatim as `since`.
pub const WATERMARK_HEADER: &str = "x-revocation-watermark";

/// `GET /v3/OS-REVOKE/events[?since=...]`
#[tracing::instrument(skip_all, fields(since = query.since.as_deref()))]
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<EventsQuery>,
) -> Result<Response, ApiError> {
    let since = parse_since(query.since.as_deref())?;
    let listing = state.list_events(since).await?;

    let mut headers = HeaderMap::new();
    if let Some(watermark) = listing.watermark {
        headers.insert(LAST_MODIFIED, header_value(&http_date(watermark))?);
        headers.insert(
            HeaderName::from_static(WATERMARK_HEADER),
            header_value(&format_timestamp(watermark))?,
        );
    }
    tracing::debug!(events = listing.events.len(), "listed revocation events");

    Ok((headers, Json(EventsResponse::new(&listing, uri.to_string()))).into_response())
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::Internal(e.to_string()))
}
