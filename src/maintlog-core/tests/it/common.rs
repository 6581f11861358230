//! Shared fixtures: a deployed ledger with a cast of participants.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use base64::Engine;
use maintlog_core::{
    Device, LedgerConfig, LedgerRuntime, Outcome, Participant, ServiceRecord, ServiceRecordFlags,
};
use maintlog_store::{Column, LedgerStore, MemoryStore, Row, Rows, StoreError, TableSchema};

/// A deployed ledger with an administrator, a device owner, three check
/// owners and an outsider.
pub struct Ledger {
    pub runtime: LedgerRuntime,
    pub store: Arc<MemoryStore>,
    pub admin: Participant,
    pub owner: Participant,
    pub checks: [Participant; 3],
    pub intruder: Participant,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let admin = Participant::ed25519("admin");
        let runtime = LedgerRuntime::deploy(store.clone(), config, admin.signer()).unwrap();
        Self {
            runtime,
            store,
            admin,
            owner: Participant::p256("OA"),
            checks: [
                Participant::ed25519("C1"),
                Participant::p256("C2"),
                Participant::ed25519("C3"),
            ],
            intruder: Participant::ed25519("mallory"),
        }
    }

    /// Everyone who is not the administrator.
    pub fn non_admins(&self) -> Vec<&Participant> {
        let mut all = vec![&self.owner, &self.intruder];
        all.extend(self.checks.iter());
        all
    }

    pub fn enroll_args(&self, device_id: &str) -> Vec<String> {
        vec![
            device_id.to_string(),
            base64::engine::general_purpose::STANDARD.encode(format!("{device_id}-pubkey")),
            self.owner.encoded_certificate().unwrap(),
            self.checks[0].encoded_certificate().unwrap(),
            self.checks[1].encoded_certificate().unwrap(),
            self.checks[2].encoded_certificate().unwrap(),
        ]
    }

    pub fn enroll(&self, device_id: &str) {
        let outcome = self
            .admin
            .invoke(&self.runtime, "enroll", self.enroll_args(device_id))
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
    }

    pub fn start(&self, device_id: &str, service_id: &str) {
        let outcome = self
            .owner
            .invoke(&self.runtime, "startServiceCycle", [device_id, service_id])
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
    }

    /// Enrolled device with one open cycle.
    pub fn with_cycle(device_id: &str, service_id: &str) -> Self {
        let ledger = Self::new();
        ledger.enroll(device_id);
        ledger.start(device_id, service_id);
        ledger
    }

    pub fn mark(&self, check: usize, device_id: &str, service_id: &str) -> Outcome {
        let name = format!("check{}", check + 1);
        self.checks[check]
            .invoke(
                &self.runtime,
                "markCheckComplete",
                [device_id, service_id, name.as_str()],
            )
            .unwrap()
    }

    pub fn device(&self, device_id: &str) -> Device {
        serde_json::from_slice(&self.runtime.query("device", [device_id]).unwrap()).unwrap()
    }

    pub fn record(&self, device_id: &str, service_id: &str) -> ServiceRecord {
        let bytes = self
            .runtime
            .query("deviceServiceRecord", [device_id, service_id])
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub fn flags(&self, device_id: &str, service_id: &str) -> ServiceRecordFlags {
        self.record(device_id, service_id).flags()
    }

    pub fn device_rows(&self) -> usize {
        self.store.row_count("DeviceChecksOwnerMap").unwrap()
    }

    pub fn service_rows(&self) -> usize {
        self.store.row_count("DeviceService").unwrap()
    }
}

pub fn flags(check1: bool, check2: bool, check3: bool, signoff: bool) -> ServiceRecordFlags {
    ServiceRecordFlags {
        check1,
        check2,
        check3,
        signoff,
    }
}

/// Memory store with injectable faults: row deletes in one table that fail
/// after a number of successes, and table scans that break after their
/// first row.
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub delete_table: Option<String>,
    pub deletes_left: AtomicUsize,
    pub broken_scans: AtomicBool,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            delete_table: None,
            deletes_left: AtomicUsize::new(usize::MAX),
            broken_scans: AtomicBool::new(false),
        }
    }

    pub fn failing_deletes(mut self, table: &str, allowed: usize) -> Self {
        self.delete_table = Some(table.to_string());
        self.deletes_left = AtomicUsize::new(allowed);
        self
    }

    pub fn break_scans(&self) {
        self.broken_scans.store(true, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.deletes_left.store(usize::MAX, Ordering::SeqCst);
        self.broken_scans.store(false, Ordering::SeqCst);
    }
}

impl LedgerStore for FaultyStore {
    fn create_table_if_absent(&self, schema: TableSchema) -> Result<bool, StoreError> {
        self.inner.create_table_if_absent(schema)
    }

    fn has_table(&self, table: &str) -> Result<bool, StoreError> {
        self.inner.has_table(table)
    }

    fn insert_row(&self, table: &str, row: Row) -> Result<(), StoreError> {
        self.inner.insert_row(table, row)
    }

    fn replace_row(&self, table: &str, row: Row) -> Result<(), StoreError> {
        self.inner.replace_row(table, row)
    }

    fn delete_row(&self, table: &str, key: &[Column]) -> Result<bool, StoreError> {
        if self.delete_table.as_deref() == Some(table) {
            let left = self.deletes_left.load(Ordering::SeqCst);
            if left == 0 {
                return Err(StoreError::backend("connection reset"));
            }
            self.deletes_left
                .store(left.saturating_sub(1), Ordering::SeqCst);
        }
        self.inner.delete_row(table, key)
    }

    fn get_row(&self, table: &str, key: &[Column]) -> Result<Row, StoreError> {
        self.inner.get_row(table, key)
    }

    fn get_rows<'a>(
        &'a self,
        table: &str,
        partial_key: &[Column],
    ) -> Result<Rows<'a>, StoreError> {
        let rows = self.inner.get_rows(table, partial_key)?;
        if !self.broken_scans.load(Ordering::SeqCst) {
            return Ok(rows);
        }
        Ok(Rows::new(
            rows.take(1)
                .chain(std::iter::once(Err(StoreError::LockPoisoned))),
        ))
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get_state(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.inner.put_state(key, value)
    }
}
