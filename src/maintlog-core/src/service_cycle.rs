//! Service cycle state machine.
//!
//! ```text
//! NotStarted --start(owner)--> Started --mark(check owner)--> ChecksInProgress
//!     --mark x3--> AllChecksComplete --signoff(owner)--> SignedOff
//! ```
//!
//! State is never stored as such; it is read off the four booleans of the
//! record. Every write replaces the full row.

use maintlog_store::{Column, LedgerStore};
use tracing::{info, instrument};

use crate::authority::{CallerAuthority, PrincipalRole};
use crate::config::LedgerConfig;
use crate::context::InvocationContext;
use crate::error::MaintenanceError;
use crate::tables::{load_device, load_record};
use crate::types::{CheckSlot, CycleState, Outcome, ServiceRecord};

/// Service cycle transitions over a ledger store.
///
/// Transitions read a record and write it back. They must not run
/// concurrently for the same (device, service) pair; see
/// [`LedgerRuntime`](crate::LedgerRuntime).
#[derive(Clone, Copy)]
pub struct ServiceCycle<'a> {
    store: &'a dyn LedgerStore,
    config: &'a LedgerConfig,
    authority: CallerAuthority,
}

impl<'a> ServiceCycle<'a> {
    /// State machine over `store`.
    pub fn new(store: &'a dyn LedgerStore, config: &'a LedgerConfig) -> Self {
        Self {
            store,
            config,
            authority: CallerAuthority::new(),
        }
    }

    /// Open a new cycle. Only the device owner may do this.
    ///
    /// Not idempotent: a second start for the same pair fails with
    /// [`MaintenanceError::Persistence`].
    #[instrument(skip(self, ctx), fields(tx_id = ctx.tx_id()))]
    pub fn start(
        &self,
        ctx: &dyn InvocationContext,
        device_id: &str,
        service_id: &str,
    ) -> Result<Outcome, MaintenanceError> {
        let device = load_device(self.store, &self.config.device_table, device_id)?;

        let role = PrincipalRole::DeviceOwner;
        if !self.authority.authorize_on_device(ctx, role, &device)? {
            return self.config.denial_policy.deny(role);
        }

        let record = ServiceRecord::started(device_id, service_id);
        self.store
            .insert_row(&self.config.service_table, record.to_row())?;
        info!("Service cycle started");
        Ok(Outcome::Applied)
    }

    /// Mark one check complete. Only that check's owner may do this.
    ///
    /// Idempotent: marking a completed check rewrites the same row.
    #[instrument(skip(self, ctx), fields(tx_id = ctx.tx_id()))]
    pub fn mark_check_complete(
        &self,
        ctx: &dyn InvocationContext,
        device_id: &str,
        service_id: &str,
        slot: CheckSlot,
    ) -> Result<Outcome, MaintenanceError> {
        let device = load_device(self.store, &self.config.device_table, device_id)?;
        let mut record = self.record(device_id, service_id)?;

        let role = PrincipalRole::CheckOwner(slot);
        if !self.authority.authorize_on_device(ctx, role, &device)? {
            return self.config.denial_policy.deny(role);
        }
        self.ensure_open(&record)?;

        record.mark(slot);
        self.store
            .replace_row(&self.config.service_table, record.to_row())?;
        info!(state = ?record.state(), "Check marked complete");
        Ok(Outcome::Applied)
    }

    /// Sign off a cycle whose checks are all complete. Only the device owner
    /// may do this.
    ///
    /// Identity is checked before completeness, so a non-owner is denied
    /// even on an incomplete cycle and the owner gets
    /// [`MaintenanceError::Precondition`].
    #[instrument(skip(self, ctx), fields(tx_id = ctx.tx_id()))]
    pub fn signoff(
        &self,
        ctx: &dyn InvocationContext,
        device_id: &str,
        service_id: &str,
    ) -> Result<Outcome, MaintenanceError> {
        let device = load_device(self.store, &self.config.device_table, device_id)?;
        let mut record = self.record(device_id, service_id)?;

        let role = PrincipalRole::DeviceOwner;
        if !self.authority.authorize_on_device(ctx, role, &device)? {
            return self.config.denial_policy.deny(role);
        }
        self.ensure_open(&record)?;
        if !record.all_checks_complete() {
            return Err(MaintenanceError::precondition(format!(
                "Not all checks complete for {device_id}/{service_id}"
            )));
        }

        record.signoff = true;
        self.store
            .replace_row(&self.config.service_table, record.to_row())?;
        info!("Service cycle signed off");
        Ok(Outcome::Applied)
    }

    /// Fetch one record.
    pub fn record(
        &self,
        device_id: &str,
        service_id: &str,
    ) -> Result<ServiceRecord, MaintenanceError> {
        load_record(self.store, &self.config.service_table, device_id, service_id)
    }

    /// Workflow state of a pair; [`CycleState::NotStarted`] when no record
    /// exists.
    pub fn state(&self, device_id: &str, service_id: &str) -> Result<CycleState, MaintenanceError> {
        match self.record(device_id, service_id) {
            Ok(record) => Ok(record.state()),
            Err(MaintenanceError::NotFound { .. }) => Ok(CycleState::NotStarted),
            Err(e) => Err(e),
        }
    }

    /// Records of one device, or of every device when `device_id` is `None`,
    /// in key order.
    pub fn records(
        &self,
        device_id: Option<&str>,
    ) -> Result<impl Iterator<Item = Result<ServiceRecord, MaintenanceError>> + 'a, MaintenanceError>
    {
        let store = self.store;
        let table = self.config.service_table.clone();
        let prefix: Vec<Column> = device_id.map(Column::string).into_iter().collect();
        let rows = store.get_rows(&table, &prefix)?;
        Ok(rows.map(move |row| Ok(ServiceRecord::from_row(&table, &row?)?)))
    }

    fn ensure_open(&self, record: &ServiceRecord) -> Result<(), MaintenanceError> {
        if self.config.freeze_signed_off && record.signoff {
            return Err(MaintenanceError::precondition(format!(
                "Service cycle {}/{} is signed off",
                record.device_id, record.service_id
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ServiceCycle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCycle")
            .field("service_table", &self.config.service_table)
            .finish_non_exhaustive()
    }
}
