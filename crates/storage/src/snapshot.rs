//! Point-in-time views of the revocation event store.
//!
//! An [`EventSnapshot`] holds every retained event in creation order together
//! with lookup indexes used by token matching:
//!
//! ```text
//! by_audit_id        audit_id       → events carrying that audit_id
//! by_audit_chain_id  audit_chain_id → events carrying that chain (and no audit_id)
//! unindexed          events with neither; scanned for every token
//! ```
//!
//! Snapshots are shared behind [`Arc`] and never mutated while a reader holds
//! them: the store applies appends and pruning copy-on-write, so a listing or
//! a match in flight keeps seeing the events it started with.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};

use crate::event::RevocationEvent;

/// Events returned by a listing together with the store watermark.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventListing {
    /// Matching events in creation order.
    pub events: Vec<Arc<RevocationEvent>>,
    /// `created_at` of the most recent event ever stored, independent of the
    /// `since` filter. `None` only while the store has never held an event.
    pub watermark: Option<DateTime<Utc>>,
}

/// An immutable, indexed view of the retained revocation events.
#[derive(Clone, Debug, Default)]
pub struct EventSnapshot {
    events: Vec<Arc<RevocationEvent>>,
    by_audit_id: HashMap<String, Vec<Arc<RevocationEvent>>>,
    by_audit_chain_id: HashMap<String, Vec<Arc<RevocationEvent>>>,
    unindexed: Vec<Arc<RevocationEvent>>,
    watermark: Option<DateTime<Utc>>,
    next_seq: u64,
}

impl EventSnapshot {
    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no event is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All retained events in creation order.
    #[must_use]
    pub fn events(&self) -> &[Arc<RevocationEvent>] {
        &self.events
    }

    /// `created_at` of the most recent event ever appended.
    ///
    /// Pruning does not lower the watermark, so it never moves backwards.
    #[must_use]
    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        self.watermark
    }

    /// Events with `created_at >= since`, or all events when `since` is `None`.
    #[must_use]
    pub fn since(&self, since: Option<DateTime<Utc>>) -> &[Arc<RevocationEvent>] {
        match since {
            Some(since) => {
                let start = self.events.partition_point(|e| e.created_at() < since);
                &self.events[start..]
            },
            None => &self.events,
        }
    }

    /// Builds the listing response for `since`.
    #[must_use]
    pub fn listing(&self, since: Option<DateTime<Utc>>) -> EventListing {
        EventListing { events: self.since(since).to_vec(), watermark: self.watermark }
    }

    /// Events that could match a token with the given audit identifiers.
    ///
    /// Events scoped to some other `audit_id` or `audit_chain_id` are skipped
    /// without being inspected; every event without audit scoping is yielded.
    pub fn candidates<'a>(
        &'a self,
        audit_id: Option<&str>,
        audit_chain_id: Option<&str>,
    ) -> impl Iterator<Item = &'a RevocationEvent> + 'a {
        let by_audit = audit_id.and_then(|id| self.by_audit_id.get(id));
        let by_chain = audit_chain_id.and_then(|id| self.by_audit_chain_id.get(id));

        by_audit
            .into_iter()
            .flatten()
            .chain(by_chain.into_iter().flatten())
            .chain(self.unindexed.iter())
            .map(AsRef::as_ref)
    }

    /// Sequence number the next appended event receives.
    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Appends an event. Callers guarantee `created_at` is greater than the
    /// current watermark.
    pub(crate) fn push(&mut self, event: RevocationEvent) -> Arc<RevocationEvent> {
        let event = Arc::new(event);
        self.next_seq = self.next_seq.max(event.seq + 1);
        let created_at = event.created_at();
        self.watermark = Some(self.watermark.map_or(created_at, |w| w.max(created_at)));
        self.index(&event);
        self.events.push(Arc::clone(&event));
        event
    }

    /// Drops every event for which `keep` returns `false` and rebuilds the
    /// indexes. Returns the number of events removed.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&RevocationEvent) -> bool) -> usize {
        let before = self.events.len();
        self.events.retain(|e| keep(e));
        let removed = before - self.events.len();

        if removed > 0 {
            self.by_audit_id.clear();
            self.by_audit_chain_id.clear();
            self.unindexed.clear();
            let events = std::mem::take(&mut self.events);
            for event in &events {
                self.index(event);
            }
            self.events = events;
        }

        removed
    }

    fn index(&mut self, event: &Arc<RevocationEvent>) {
        let criteria = event.criteria();
        if let Some(audit_id) = &criteria.audit_id {
            self.by_audit_id.entry(audit_id.clone()).or_default().push(Arc::clone(event));
        } else if let Some(chain) = &criteria.audit_chain_id {
            self.by_audit_chain_id.entry(chain.clone()).or_default().push(Arc::clone(event));
        } else {
            self.unindexed.push(Arc::clone(event));
        }
    }
}
