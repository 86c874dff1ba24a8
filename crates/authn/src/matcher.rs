//! Matching token claims against revocation events.
//!
//! An event revokes a token when every criterion the event carries matches:
//!
//! | Criterion        | Token matches when                                   |
//! |------------------|------------------------------------------------------|
//! | `issued_before`  | `issued_at < issued_before`                          |
//! | `audit_id`       | `audit_id` equal; `audit_chain_id` is then ignored   |
//! | `audit_chain_id` | `audit_chain_id` equal                               |
//! | `role_id`        | `role_ids` contains it                               |
//! | `expires_at`     | `expires_at` equal                                   |
//! | any other field  | equal                                                |
//!
//! Absent criteria are wildcards; absent claims never satisfy a present
//! criterion. An event with no criteria therefore revokes every token.
//!
//! [`is_revoked`] does not scan every event. It asks the snapshot for
//! candidates: events indexed under the token's own `audit_id` or
//! `audit_chain_id` plus the residual events carrying neither.

use os_revoke_storage::{EventSnapshot, RevocationCriteria, RevocationEvent};

use crate::claims::TokenClaims;

/// Returns `true` if `event` revokes the token described by `claims`.
#[must_use]
pub fn event_matches(event: &RevocationEvent, claims: &TokenClaims) -> bool {
    criteria_match(event.criteria(), claims)
}

/// Returns `true` if every criterion set in `criteria` matches `claims`.
#[must_use]
pub fn criteria_match(criteria: &RevocationCriteria, claims: &TokenClaims) -> bool {
    if let Some(boundary) = criteria.issued_before
        && claims.issued_at >= boundary
    {
        return false;
    }

    let audit_matches = match (&criteria.audit_id, &criteria.audit_chain_id) {
        (Some(audit_id), _) => exact(Some(audit_id), &claims.audit_id),
        (None, chain) => exact(chain.as_ref(), &claims.audit_chain_id),
    };
    if !audit_matches {
        return false;
    }

    exact(criteria.user_id.as_ref(), &claims.user_id)
        && exact(criteria.domain_id.as_ref(), &claims.domain_id)
        && exact(criteria.project_id.as_ref(), &claims.project_id)
        && exact(criteria.trust_id.as_ref(), &claims.trust_id)
        && exact(criteria.consumer_id.as_ref(), &claims.consumer_id)
        && criteria.role_id.as_deref().is_none_or(|role| claims.has_role(role))
        && criteria.expires_at.is_none_or(|at| claims.expires_at == Some(at))
}

fn exact(criterion: Option<&String>, claim: &Option<String>) -> bool {
    criterion.is_none_or(|wanted| claim.as_ref() == Some(wanted))
}

/// An event in `snapshot` that revokes `claims`, if any.
///
/// Candidates are visited index by index, not in creation order, so when
/// several events match, which one is returned is unspecified.
#[must_use]
pub fn matching_event<'a>(
    snapshot: &'a EventSnapshot,
    claims: &TokenClaims,
) -> Option<&'a RevocationEvent> {
    snapshot
        .candidates(claims.audit_id.as_deref(), claims.audit_chain_id.as_deref())
        .find(|event| event_matches(event, claims))
}

/// Returns `true` if any event in `snapshot` revokes `claims`.
#[must_use]
pub fn is_revoked(snapshot: &EventSnapshot, claims: &TokenClaims) -> bool {
    matching_event(snapshot, claims).is_some()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn claims() -> TokenClaims {
        TokenClaims::builder()
            .issued_at(t(0))
            .expires_at(t(3_600))
            .audit_id("tok")
            .audit_chain_id("chain")
            .user_id("u-1")
            .domain_id("d-1")
            .project_id("p-1")
            .role_ids(vec!["member".to_owned(), "reader".to_owned()])
            .build()
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        assert!(criteria_match(&RevocationCriteria::default(), &claims()));

        let bare = TokenClaims::builder().issued_at(t(0)).build();
        assert!(criteria_match(&RevocationCriteria::default(), &bare));
    }

    #[test]
    fn test_issued_before_is_strict() {
        let criteria = RevocationCriteria::for_user("u-1", t(0));
        assert!(!criteria_match(&criteria, &claims()));

        let criteria = RevocationCriteria::for_user("u-1", t(1));
        assert!(criteria_match(&criteria, &claims()));
    }

    #[test]
    fn test_audit_id_ignores_chain() {
        let criteria = RevocationCriteria::builder().audit_id("tok").audit_chain_id("other").build();
        assert!(criteria_match(&criteria, &claims()));

        let criteria = RevocationCriteria::for_audit_id("not-tok");
        assert!(!criteria_match(&criteria, &claims()));
    }

    #[test]
    fn test_audit_chain() {
        assert!(criteria_match(&RevocationCriteria::for_audit_chain("chain"), &claims()));
        assert!(!criteria_match(&RevocationCriteria::for_audit_chain("xyz"), &claims()));
    }

    #[test]
    fn test_absent_claim_does_not_match() {
        let unscoped = TokenClaims::builder().issued_at(t(0)).user_id("u-1").build();
        assert!(!criteria_match(&RevocationCriteria::for_project("p-1", t(10)), &unscoped));
        assert!(!criteria_match(&RevocationCriteria::for_audit_id("tok"), &unscoped));
        assert!(!criteria_match(&RevocationCriteria::for_trust("tr", t(10)), &unscoped));
    }

    #[test]
    fn test_role_must_be_in_set() {
        assert!(criteria_match(&RevocationCriteria::for_project_role("p-1", "reader", t(10)), &claims()));
        assert!(!criteria_match(&RevocationCriteria::for_project_role("p-1", "admin", t(10)), &claims()));
        assert!(!criteria_match(&RevocationCriteria::for_project_role("p-2", "reader", t(10)), &claims()));
    }

    #[test]
    fn test_expires_at_is_exact() {
        let criteria = RevocationCriteria::builder().user_id("u-1").expires_at(t(3_600)).build();
        assert!(criteria_match(&criteria, &claims()));

        let criteria = RevocationCriteria::builder().user_id("u-1").expires_at(t(3_601)).build();
        assert!(!criteria_match(&criteria, &claims()));
    }

    #[test]
    fn test_all_present_fields_must_match() {
        let criteria = RevocationCriteria::for_user_and_project("u-1", "p-2", t(10));
        assert!(!criteria_match(&criteria, &claims()));

        let criteria = RevocationCriteria::for_user_and_project("u-1", "p-1", t(10));
        assert!(criteria_match(&criteria, &claims()));
    }

    mod proptests {
        use std::sync::Arc;

        use os_revoke_storage::{MemoryEventStore, RevocationEventStore};
        use proptest::{collection, option, prelude::*, sample::select};

        use super::*;

        const IDS: [&str; 3] = ["a", "b", "c"];

        /// Drawn from a small alphabet so events and claims often share values.
        fn arb_id() -> impl Strategy<Value = Option<String>> {
            option::of(select(IDS.to_vec()).prop_map(str::to_owned))
        }

        fn arb_time() -> impl Strategy<Value = Option<DateTime<Utc>>> {
            option::of((-5i64..5).prop_map(t))
        }

        fn arb_criteria() -> impl Strategy<Value = RevocationCriteria> {
            (
                arb_time(),
                arb_time(),
                arb_id(),
                arb_id(),
                arb_id(),
                arb_id(),
                arb_id(),
                arb_id(),
                arb_id(),
                arb_id(),
            )
                .prop_map(
                    |(
                        issued_before,
                        expires_at,
                        user_id,
                        audit_id,
                        audit_chain_id,
                        domain_id,
                        project_id,
                        role_id,
                        trust_id,
                        consumer_id,
                    )| RevocationCriteria {
                        issued_before,
                        expires_at,
                        user_id,
                        audit_id,
                        audit_chain_id,
                        domain_id,
                        project_id,
                        role_id,
                        trust_id,
                        consumer_id,
                    },
                )
        }

        fn arb_claims() -> impl Strategy<Value = TokenClaims> {
            (
                (-5i64..5).prop_map(t),
                arb_time(),
                arb_id(),
                arb_id(),
                arb_id(),
                arb_id(),
                arb_id(),
                collection::vec(select(IDS.to_vec()).prop_map(str::to_owned), 0..3),
                arb_id(),
                arb_id(),
            )
                .prop_map(
                    |(
                        issued_at,
                        expires_at,
                        audit_id,
                        audit_chain_id,
                        user_id,
                        domain_id,
                        project_id,
                        role_ids,
                        trust_id,
                        consumer_id,
                    )| TokenClaims {
                        issued_at,
                        expires_at,
                        audit_id,
                        audit_chain_id,
                        user_id,
                        domain_id,
                        project_id,
                        role_ids,
                        trust_id,
                        consumer_id,
                    },
                )
        }

        /// Snapshot of a memory store holding `events` in order.
        fn snapshot_of(events: Vec<RevocationCriteria>) -> Arc<EventSnapshot> {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async {
                let store = MemoryEventStore::new();
                for criteria in events {
                    store.append(criteria).await.unwrap();
                }
                store.snapshot().await.unwrap()
            })
        }

        proptest! {
            /// An event without criteria revokes every token, whatever else
            /// the snapshot holds.
            #[test]
            fn global_event_revokes_every_token(
                claims in arb_claims(),
                others in collection::vec(arb_criteria(), 0..8),
                position in 0..8usize,
            ) {
                prop_assert!(criteria_match(&RevocationCriteria::default(), &claims));

                let mut events = others;
                let position = position.min(events.len());
                events.insert(position, RevocationCriteria::default());
                prop_assert!(is_revoked(&snapshot_of(events), &claims));
            }

            /// An event naming another token's `audit_id` never revokes,
            /// whatever its other criteria.
            #[test]
            fn foreign_audit_id_never_revokes(
                claims in arb_claims(),
                events in collection::vec(arb_criteria(), 1..8),
            ) {
                let events: Vec<_> = events
                    .into_iter()
                    .enumerate()
                    .map(|(i, criteria)| RevocationCriteria {
                        audit_id: Some(format!("foreign-{i}")),
                        ..criteria
                    })
                    .collect();

                for criteria in &events {
                    prop_assert!(!criteria_match(criteria, &claims));
                }
                prop_assert!(!is_revoked(&snapshot_of(events), &claims));
            }

            /// The indexed lookup agrees with checking every event in turn.
            #[test]
            fn candidates_agree_with_full_scan(
                claims in arb_claims(),
                events in collection::vec(arb_criteria(), 0..12),
            ) {
                let expected = events.iter().any(|criteria| criteria_match(criteria, &claims));
                prop_assert_eq!(is_revoked(&snapshot_of(events), &claims), expected);
            }
        }
    }
}
