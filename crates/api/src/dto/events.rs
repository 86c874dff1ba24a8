use chrono::{DateTime, SecondsFormat, Utc};
use os_revoke_storage::{EventListing, RevocationEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub since: Option<String>,
}

/// Public form of a revocation event. Absent criteria are omitted and there
/// is no identifier.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EventView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_chain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
}

impl From<&RevocationEvent> for EventView {
    fn from(event: &RevocationEvent) -> Self {
        let c = event.criteria().clone();
        Self {
            issued_before: c.issued_before.map(format_timestamp),
            expires_at: c.expires_at.map(format_timestamp),
            user_id: c.user_id,
            audit_id: c.audit_id,
            audit_chain_id: c.audit_chain_id,
            domain_id: c.domain_id,
            project_id: c.project_id,
            role_id: c.role_id,
            trust_id: c.trust_id,
            consumer_id: c.consumer_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<EventView>,
    pub links: Links,
}

impl EventsResponse {
    pub fn new(listing: &EventListing, self_link: String) -> Self {
        Self {
            events: listing.events.iter().map(|e| EventView::from(e.as_ref())).collect(),
            links: Links { self_link, next: None, previous: None },
        }
    }
}

/// RFC 3339 in UTC with microseconds; the form clients echo back as `since`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// IMF-fixdate as used by `Last-Modified`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
