//! Service cycle transitions driven through the runtime.

use maintlog_core::{CycleState, LedgerConfig, MaintenanceError, Outcome};

use crate::common::{flags, Ledger};

#[test]
fn test_end_to_end_scenario() {
    let ledger = Ledger::new();
    ledger.enroll("D1");

    let device = ledger.device("D1");
    assert_eq!(device.id, "D1");
    assert_eq!(device.owner, ledger.owner.certificate().unwrap());
    assert_eq!(device.check1_owner, ledger.checks[0].certificate().unwrap());
    assert_eq!(device.check2_owner, ledger.checks[1].certificate().unwrap());
    assert_eq!(device.check3_owner, ledger.checks[2].certificate().unwrap());

    ledger.start("D1", "S1");
    assert_eq!(ledger.flags("D1", "S1"), flags(false, false, false, false));

    assert_eq!(ledger.mark(0, "D1", "S1"), Outcome::Applied);
    assert_eq!(ledger.flags("D1", "S1"), flags(true, false, false, false));

    ledger.mark(1, "D1", "S1");
    ledger.mark(2, "D1", "S1");
    assert_eq!(ledger.flags("D1", "S1"), flags(true, true, true, false));

    let outcome = ledger
        .owner
        .invoke(&ledger.runtime, "signoff", ["D1", "S1"])
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(ledger.flags("D1", "S1"), flags(true, true, true, true));
}

#[test]
fn test_signoff_with_two_checks_is_precondition() {
    let ledger = Ledger::with_cycle("D1", "S1");
    ledger.mark(0, "D1", "S1");
    ledger.mark(2, "D1", "S1");

    let err = ledger
        .owner
        .invoke(&ledger.runtime, "signoff", ["D1", "S1"])
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Precondition { .. }));
    assert_eq!(ledger.flags("D1", "S1"), flags(true, false, true, false));
}

#[test]
fn test_mark_is_idempotent() {
    let ledger = Ledger::with_cycle("D1", "S1");
    ledger.mark(1, "D1", "S1");
    let after_first = ledger.flags("D1", "S1");
    assert_eq!(ledger.mark(1, "D1", "S1"), Outcome::Applied);
    assert_eq!(ledger.flags("D1", "S1"), after_first);
    assert_eq!(after_first, flags(false, true, false, false));
}

#[test]
fn test_checks_complete_in_any_order() {
    let ledger = Ledger::with_cycle("D1", "S1");
    let cycle = ledger.runtime.chaincode().service_cycle();
    assert_eq!(cycle.state("D1", "S1").unwrap(), CycleState::Started);

    ledger.mark(2, "D1", "S1");
    assert_eq!(cycle.state("D1", "S1").unwrap(), CycleState::ChecksInProgress);
    ledger.mark(0, "D1", "S1");
    ledger.mark(1, "D1", "S1");
    assert_eq!(cycle.state("D1", "S1").unwrap(), CycleState::AllChecksComplete);

    ledger
        .owner
        .invoke(&ledger.runtime, "signoff", ["D1", "S1"])
        .unwrap();
    assert_eq!(cycle.state("D1", "S1").unwrap(), CycleState::SignedOff);
    assert_eq!(cycle.state("D1", "S9").unwrap(), CycleState::NotStarted);
}

#[test]
fn test_start_twice_is_persistence_error() {
    let ledger = Ledger::with_cycle("D1", "S1");
    ledger.mark(0, "D1", "S1");

    let err = ledger
        .owner
        .invoke(&ledger.runtime, "startServiceCycle", ["D1", "S1"])
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Persistence(_)));
    // The existing cycle is untouched.
    assert_eq!(ledger.flags("D1", "S1"), flags(true, false, false, false));
}

#[test]
fn test_cycles_are_independent() {
    let ledger = Ledger::with_cycle("D1", "S1");
    ledger.start("D1", "S2");
    ledger.mark(0, "D1", "S2");

    assert_eq!(ledger.flags("D1", "S1"), flags(false, false, false, false));
    assert_eq!(ledger.flags("D1", "S2"), flags(true, false, false, false));
}

#[test]
fn test_start_on_unknown_device_not_found() {
    let ledger = Ledger::new();
    let err = ledger
        .owner
        .invoke(&ledger.runtime, "startServiceCycle", ["D404", "S1"])
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::NotFound { entity: "device", .. }));
    assert!(err.to_string().contains("D404"));
}

#[test]
fn test_mark_on_unstarted_cycle_not_found() {
    let ledger = Ledger::new();
    ledger.enroll("D1");
    let err = ledger.checks[0]
        .invoke(&ledger.runtime, "markCheckComplete", ["D1", "S7", "check1"])
        .unwrap_err();
    assert!(matches!(
        err,
        MaintenanceError::NotFound {
            entity: "service record",
            ..
        }
    ));
    assert!(err.to_string().contains("D1/S7"));
}

#[test]
fn test_unknown_check_is_argument_error() {
    let ledger = Ledger::with_cycle("D1", "S1");
    let err = ledger.checks[0]
        .invoke(&ledger.runtime, "markCheckComplete", ["D1", "S1", "check4"])
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::InvalidArgument { .. }));
    assert_eq!(ledger.flags("D1", "S1"), flags(false, false, false, false));
}

#[test]
fn test_wrong_arity_is_argument_error() {
    let ledger = Ledger::with_cycle("D1", "S1");
    for (function, args) in [
        ("startServiceCycle", vec!["D1"]),
        ("markCheckComplete", vec!["D1", "S1"]),
        ("signoff", vec!["D1", "S1", "extra"]),
        ("delete", vec![]),
    ] {
        let err = ledger
            .owner
            .invoke(&ledger.runtime, function, args)
            .unwrap_err();
        assert!(
            err.to_string().contains("Incorrect number of arguments"),
            "{function}: {err}"
        );
    }
}

#[test]
fn test_one_principal_may_hold_several_roles() {
    let ledger = Ledger::new();
    let owner_cert = ledger.owner.encoded_certificate().unwrap();
    let mut args = ledger.enroll_args("D1");
    args[3] = owner_cert.clone();
    args[4] = owner_cert.clone();
    args[5] = owner_cert;
    ledger
        .admin
        .invoke(&ledger.runtime, "enroll", args)
        .unwrap();
    ledger.start("D1", "S1");

    for check in ["check1", "check2", "check3"] {
        let outcome = ledger
            .owner
            .invoke(&ledger.runtime, "markCheckComplete", ["D1", "S1", check])
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
    }
    ledger
        .owner
        .invoke(&ledger.runtime, "signoff", ["D1", "S1"])
        .unwrap();
    assert_eq!(ledger.flags("D1", "S1"), flags(true, true, true, true));
}

#[test]
fn test_signed_off_cycle_accepts_repeat_calls_by_default() {
    let ledger = Ledger::with_cycle("D1", "S1");
    for check in 0..3 {
        ledger.mark(check, "D1", "S1");
    }
    ledger
        .owner
        .invoke(&ledger.runtime, "signoff", ["D1", "S1"])
        .unwrap();

    assert_eq!(ledger.mark(0, "D1", "S1"), Outcome::Applied);
    let again = ledger
        .owner
        .invoke(&ledger.runtime, "signoff", ["D1", "S1"])
        .unwrap();
    assert_eq!(again, Outcome::Applied);
    assert_eq!(ledger.flags("D1", "S1"), flags(true, true, true, true));
}

#[test]
fn test_frozen_signed_off_cycle_rejects_repeat_calls() {
    let ledger = Ledger::with_config(LedgerConfig::default().with_freeze_signed_off(true));
    ledger.enroll("D1");
    ledger.start("D1", "S1");
    for check in 0..3 {
        ledger.mark(check, "D1", "S1");
    }
    ledger
        .owner
        .invoke(&ledger.runtime, "signoff", ["D1", "S1"])
        .unwrap();

    let err = ledger.checks[0]
        .invoke(&ledger.runtime, "markCheckComplete", ["D1", "S1", "check1"])
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Precondition { .. }));
    let err = ledger
        .owner
        .invoke(&ledger.runtime, "signoff", ["D1", "S1"])
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Precondition { .. }));
}
