//! Property tests for lifecycle history invariants.
//!
//! Whatever sequence of transition requests a caller makes, the audit trail
//! starts with `created`, ends with the current status, and only grows.

use chrono::{Duration, TimeZone, Utc};
use contractflow_lifecycle::{ContractStatus, Lifecycle, TransitionCheck, TransitionOutcome};
use proptest::prelude::*;

fn any_status() -> impl Strategy<Value = ContractStatus> {
    prop::sample::select(ContractStatus::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn test_history_bookends_hold(requests in prop::collection::vec((any_status(), -50i64..500), 0..40)) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut lc = Lifecycle::begin(start);

        for (target, offset) in requests {
            let before = lc.clone();
            let result = lc.transition(target, start + Duration::minutes(offset), None);

            match result {
                Ok(TransitionOutcome::Applied { from, to }) => {
                    prop_assert_eq!(from, before.status());
                    prop_assert_eq!(to, target);
                    prop_assert_eq!(lc.history().len(), before.history().len() + 1);
                    prop_assert_eq!(&lc.history()[..before.history().len()], before.history());
                }
                Ok(TransitionOutcome::Unchanged { status }) => {
                    prop_assert!(status.is_terminal());
                    prop_assert_eq!(&lc, &before);
                }
                Err(_) => prop_assert_eq!(&lc, &before),
            }

            prop_assert_eq!(lc.history()[0].status, ContractStatus::Created);
            prop_assert_eq!(lc.history().last().unwrap().status, lc.status());
            prop_assert!(lc.last_changed_at() >= lc.created_at());
        }
    }

    #[test]
    fn test_terminal_states_reject_everything(target in any_status(), terminal in prop::sample::select(vec![ContractStatus::Locked, ContractStatus::Revoked])) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut lc = Lifecycle::begin(start);
        if terminal == ContractStatus::Locked {
            for step in [ContractStatus::Approved, ContractStatus::Sent, ContractStatus::Signed, ContractStatus::Locked] {
                lc.transition(step, start, None).unwrap();
            }
        } else {
            lc.transition(ContractStatus::Revoked, start, None).unwrap();
        }

        prop_assert_eq!(lc.check(target), Ok(TransitionCheck::Frozen));
        let before = lc.clone();
        let outcome = lc.transition(target, start + Duration::days(1), None);
        prop_assert_eq!(outcome, Ok(TransitionOutcome::Unchanged { status: terminal }));
        prop_assert_eq!(lc, before);
    }
}

#[test]
fn test_rebuilt_history_matches_original() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut lc = Lifecycle::begin(start);
    for (i, step) in [ContractStatus::Approved, ContractStatus::Sent]
        .into_iter()
        .enumerate()
    {
        lc.transition(step, start + Duration::hours(i as i64 + 1), None)
            .unwrap();
    }

    let rebuilt = Lifecycle::from_history(lc.history().to_vec()).unwrap();
    assert_eq!(rebuilt, lc);
    assert_eq!(rebuilt.status(), ContractStatus::Sent);
}
