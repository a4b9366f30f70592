//! Property tests: the mirror always shows the last delivered document, and
//! the access predicate agrees with the snapshot booleans.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{wait_for_state, ManualSource};
use nichiboku_core::types::{
    Entitlement, EntitlementDoc, EntitlementSnapshot, EntitlementState, Plan, PlanStatus, Session,
};
use nichiboku_sync::{has_access, EntitlementMirror, Requirement};
use proptest::prelude::*;

fn plan_strategy() -> impl Strategy<Value = Plan> {
    prop::sample::select(Plan::ALL.to_vec())
}

fn status_strategy() -> impl Strategy<Value = PlanStatus> {
    prop::sample::select(PlanStatus::ALL.to_vec())
}

/// `None` stands for a deleted document.
fn doc_strategy() -> impl Strategy<Value = Option<(Plan, PlanStatus)>> {
    prop::option::of((plan_strategy(), status_strategy()))
}

fn expected_state(last: Option<(Plan, PlanStatus)>) -> EntitlementState {
    let entitlement = last
        .map(|(plan, status)| Entitlement::new(plan, status))
        .unwrap_or_default();
    EntitlementState::Loaded(EntitlementSnapshot::from(entitlement))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn mirror_shows_last_delivered_document(docs in prop::collection::vec(doc_strategy(), 1..12)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let final_state = runtime.block_on(async {
            let source = Arc::new(ManualSource::new());
            let mirror = EntitlementMirror::new(Arc::clone(&source));
            let mut rx = mirror.subscribe();
            mirror.attach(&Session::new("u1", None));
            source.wait_for_subscriptions(1).await;

            for doc in &docs {
                let update = doc.map(|(plan, status)| EntitlementDoc::new(plan, status));
                source.push("u1", Ok(update));
            }
            let target = expected_state(*docs.last().unwrap());
            wait_for_state(&mut rx, |s| *s == target).await;
            common::settle().await;
            mirror.state()
        });
        prop_assert_eq!(final_state, expected_state(*docs.last().unwrap()));
    }

    #[test]
    fn predicate_matches_snapshot_booleans(plan in plan_strategy(), status in status_strategy()) {
        let snapshot = EntitlementSnapshot::from(Entitlement::new(plan, status));
        prop_assert_eq!(has_access(&snapshot, Requirement::Premium), snapshot.is_premium_active());
        prop_assert_eq!(has_access(&snapshot, Requirement::Student), snapshot.is_student_active());
        prop_assert_eq!(has_access(&snapshot, Requirement::AnyPaid), snapshot.has_any_paid_plan());
        // Nothing but an active status ever opens a gate.
        if status != PlanStatus::Active {
            for required in Requirement::ALL {
                prop_assert!(!has_access(&snapshot, required));
            }
        }
    }
}
