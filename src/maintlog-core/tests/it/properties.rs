//! Property-based tests for the workflow invariants.

use maintlog_core::{MaintenanceError, Outcome, Participant};
use maintlog_crypto::Ed25519Signer;
use proptest::prelude::*;

use crate::common::{flags, Ledger};

/// Strategy for a sequence of check indices.
fn check_sequence() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..3, 0..8)
}

/// Strategy for ledger identifiers.
fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,12}"
}

fn snapshot(ledger: &Ledger) -> (Vec<u8>, Vec<u8>) {
    (
        ledger.runtime.query("devices", Vec::<String>::new()).unwrap(),
        ledger
            .runtime
            .query("allServiceRecords", Vec::<String>::new())
            .unwrap(),
    )
}

proptest! {
    // Every case deploys a fresh ledger and signs several invocations.
    #![proptest_config(ProptestConfig {
        cases: 24,
        max_shrink_iters: 100,
        ..ProptestConfig::default()
    })]

    /// Marked checks are exactly the ones set, and signoff succeeds iff all
    /// three are set.
    #[test]
    fn signoff_requires_every_check(sequence in check_sequence()) {
        let ledger = Ledger::with_cycle("D1", "S1");
        for &check in &sequence {
            prop_assert_eq!(ledger.mark(check, "D1", "S1"), Outcome::Applied);
        }

        let marked = |i: usize| sequence.contains(&i);
        prop_assert_eq!(
            ledger.flags("D1", "S1"),
            flags(marked(0), marked(1), marked(2), false)
        );

        let result = ledger.owner.invoke(&ledger.runtime, "signoff", ["D1", "S1"]);
        if (0..3).all(marked) {
            prop_assert_eq!(result.unwrap(), Outcome::Applied);
            prop_assert!(ledger.flags("D1", "S1").signoff);
        } else {
            let is_precondition = matches!(result, Err(MaintenanceError::Precondition { .. }));
            prop_assert!(is_precondition);
            prop_assert!(!ledger.flags("D1", "S1").signoff);
        }
    }

    /// An outsider cannot change any state through any gated call.
    #[test]
    fn outsider_never_mutates(seed in any::<[u8; 32]>(), sequence in check_sequence()) {
        let ledger = Ledger::with_cycle("D1", "S1");
        for &check in &sequence {
            ledger.mark(check, "D1", "S1");
        }
        let outsider = Participant::new("outsider", Box::new(Ed25519Signer::from_seed(&seed).unwrap()));
        let before = snapshot(&ledger);

        let calls: [(&str, Vec<String>); 5] = [
            ("enroll", ledger.enroll_args("D2")),
            ("startServiceCycle", vec!["D1".into(), "S2".into()]),
            ("markCheckComplete", vec!["D1".into(), "S1".into(), "check1".into()]),
            ("markCheckComplete", vec!["D1".into(), "S1".into(), "check3".into()]),
            ("signoff", vec!["D1".into(), "S1".into()]),
        ];
        for (function, args) in calls {
            let outcome = outsider.invoke(&ledger.runtime, function, args);
            match outcome {
                Ok(outcome) => prop_assert!(!outcome.is_applied(), "{} applied", function),
                Err(e) => prop_assert!(false, "{} failed: {}", function, e),
            }
        }
        prop_assert_eq!(snapshot(&ledger), before);
    }

    /// Enrolled devices and started cycles read back under their own ids.
    #[test]
    fn identifiers_round_trip(device_id in identifier(), service_id in identifier()) {
        let ledger = Ledger::new();
        ledger.enroll(&device_id);
        ledger.start(&device_id, &service_id);

        prop_assert_eq!(ledger.device(&device_id).id, device_id.clone());
        let record = ledger.record(&device_id, &service_id);
        prop_assert_eq!(record.device_id, device_id);
        prop_assert_eq!(record.service_id, service_id);
    }
}
