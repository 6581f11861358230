//! JSON projections.

use std::sync::Arc;

use base64::Engine;
use maintlog_core::{ErrorKind, LedgerConfig, LedgerRuntime, MaintenanceError, Participant};
use serde_json::{json, Value};

use crate::common::{FaultyStore, Ledger};

fn query(ledger: &Ledger, function: &str, args: &[&str]) -> Value {
    let bytes = ledger
        .runtime
        .query(function, args.iter().copied())
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_service_record_wire_format() {
    let ledger = Ledger::with_cycle("D1", "S1");
    ledger.mark(1, "D1", "S1");
    assert_eq!(
        query(&ledger, "deviceServiceRecord", &["D1", "S1"]),
        json!({
            "device_id": "D1",
            "service_id": "S1",
            "check1": false,
            "check2": true,
            "check3": false,
            "signoff": false
        })
    );
}

#[test]
fn test_device_wire_format() {
    let ledger = Ledger::new();
    ledger.enroll("D1");
    let device = query(&ledger, "device", &["D1"]);

    let keys: Vec<&str> = device
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    let mut expected = vec!["Check1", "Check2", "Check3", "Owner", "PublicKey", "id"];
    expected.sort_unstable();
    let mut keys = keys;
    keys.sort_unstable();
    assert_eq!(keys, expected);
    assert_eq!(device["id"], "D1");
    assert_eq!(device["PublicKey"], "RDEtcHVia2V5");
    assert_eq!(
        device["Owner"],
        Value::String(ledger.owner.encoded_certificate().unwrap())
    );
}

#[test]
fn test_devices_lists_every_device() {
    let ledger = Ledger::new();
    assert_eq!(query(&ledger, "devices", &[]), json!([]));

    ledger.enroll("D2");
    ledger.enroll("D1");
    ledger.start("D1", "S1");

    let devices = query(&ledger, "devices", &[]);
    let ids: Vec<&str> = devices
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["D1", "D2"]);
}

#[test]
fn test_device_service_records_filters_by_device() {
    let ledger = Ledger::new();
    ledger.enroll("D1");
    ledger.enroll("D2");
    ledger.start("D1", "S1");
    ledger.start("D1", "S2");
    ledger.start("D2", "S1");

    let d1 = query(&ledger, "deviceServiceRecords", &["D1"]);
    assert_eq!(d1.as_array().unwrap().len(), 2);
    assert!(d1
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["device_id"] == "D1"));

    assert_eq!(query(&ledger, "deviceServiceRecords", &["D9"]), json!([]));
}

#[test]
fn test_empty_device_id_selects_all_records() {
    let ledger = Ledger::new();
    ledger.enroll("D1");
    ledger.enroll("D2");
    ledger.start("D1", "S1");
    ledger.start("D2", "S1");
    ledger.start("D2", "S2");

    let all = query(&ledger, "deviceServiceRecords", &[""]);
    assert_eq!(all.as_array().unwrap().len(), 3);
    assert_eq!(all, query(&ledger, "allServiceRecords", &[]));
}

#[test]
fn test_missing_entities_not_found() {
    let ledger = Ledger::new();
    ledger.enroll("D1");

    let err = ledger.runtime.query("device", ["D2"]).unwrap_err();
    assert_eq!(err.to_string(), "device not found: D2");

    let err = ledger
        .runtime
        .query("deviceServiceRecord", ["D1", "S1"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("D1/S1"));
}

#[test]
fn test_query_arity_and_unknown_function() {
    let ledger = Ledger::new();
    let cases: [(&str, &[&str]); 5] = [
        ("device", &[]),
        ("devices", &["x"]),
        ("deviceServiceRecord", &["D1"]),
        ("deviceServiceRecords", &[]),
        ("allServiceRecords", &["x"]),
    ];
    for (function, args) in cases {
        let err = ledger
            .runtime
            .query(function, args.iter().copied())
            .unwrap_err();
        assert!(
            matches!(err, MaintenanceError::InvalidArgument { .. }),
            "{function}: {err}"
        );
    }

    let err = ledger.runtime.query("enroll", Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, MaintenanceError::UnknownFunction { .. }));
}

#[test]
fn test_failed_scan_is_error_not_short_list() {
    let store = Arc::new(FaultyStore::new());
    let admin = Participant::ed25519("admin");
    let owner = Participant::p256("OA");
    let runtime =
        LedgerRuntime::deploy(store.clone(), LedgerConfig::default(), admin.signer()).unwrap();

    let cert = owner.encoded_certificate().unwrap();
    for device in ["D1", "D2"] {
        let args = [
            device.to_string(),
            base64::engine::general_purpose::STANDARD.encode(b"key"),
            cert.clone(),
            cert.clone(),
            cert.clone(),
            cert.clone(),
        ];
        admin.invoke(&runtime, "enroll", args).unwrap();
        owner
            .invoke(&runtime, "startServiceCycle", [device, "S1"])
            .unwrap();
    }

    store.break_scans();
    for (function, args) in [
        ("devices", vec![]),
        ("deviceServiceRecords", vec![""]),
        ("allServiceRecords", vec![]),
    ] {
        let err = runtime.query(function, args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence, "{function}: {err}");
    }

    let err = owner.invoke(&runtime, "delete", ["D1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(store.inner.row_count("DeviceChecksOwnerMap").unwrap(), 2);

    store.heal();
    let devices = runtime.query("devices", Vec::<String>::new()).unwrap();
    let devices: Value = serde_json::from_slice(&devices).unwrap();
    assert_eq!(devices.as_array().unwrap().len(), 2);
}
