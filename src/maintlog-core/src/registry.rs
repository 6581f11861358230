//! Device registry.
//!
//! Devices are created by the administrator, readable by anyone, never
//! updated, and deleted together with their service records.

use base64::Engine;
use maintlog_crypto::Certificate;
use maintlog_store::{Column, LedgerStore};
use tracing::{info, instrument};

use crate::authority::{short_fingerprint, CallerAuthority, PrincipalRole};
use crate::config::LedgerConfig;
use crate::context::InvocationContext;
use crate::error::MaintenanceError;
use crate::tables::{device_key, load_device, service_key};
use crate::types::{Device, Outcome, ServiceRecord};

/// Decode the positional arguments of `enroll` into a [`Device`].
///
/// Arguments beyond the sixth are ignored. Every certificate must decode to
/// a key its algorithm accepts; the device public key is kept as given.
pub fn parse_enroll_args(args: &[String]) -> Result<Device, MaintenanceError> {
    if args.len() < 6 {
        return Err(MaintenanceError::invalid_argument(
            "Incorrect number of arguments. Specify device id, public key, owner, \
             owner for check1, check2 and check3.",
        ));
    }

    let decode = |name: &str, value: &str| {
        base64::engine::general_purpose::STANDARD
            .decode(value)
            .map_err(|e| MaintenanceError::invalid_argument(format!("Failed decoding {name}: {e}")))
    };
    let certificate = |name: &str, value: &str| {
        let bytes = decode(name, value)?;
        Certificate::from_bytes(&bytes).map_err(|e| {
            MaintenanceError::invalid_argument(format!("Invalid {name} certificate: {e}"))
        })?;
        Ok::<_, MaintenanceError>(bytes)
    };

    Ok(Device {
        id: args[0].clone(),
        public_key: decode("public key", &args[1])?,
        owner: certificate("owner", &args[2])?,
        check1_owner: certificate("check1", &args[3])?,
        check2_owner: certificate("check2", &args[4])?,
        check3_owner: certificate("check3", &args[5])?,
    })
}

/// Device operations over a ledger store.
#[derive(Clone, Copy)]
pub struct DeviceRegistry<'a> {
    store: &'a dyn LedgerStore,
    config: &'a LedgerConfig,
    authority: CallerAuthority,
}

impl<'a> DeviceRegistry<'a> {
    /// Registry over `store`.
    pub fn new(store: &'a dyn LedgerStore, config: &'a LedgerConfig) -> Self {
        Self {
            store,
            config,
            authority: CallerAuthority::new(),
        }
    }

    /// Stored administrator certificate.
    pub fn admin_certificate(&self) -> Result<Vec<u8>, MaintenanceError> {
        self.store
            .get_state(&self.config.admin_key)?
            .ok_or_else(|| MaintenanceError::precondition("ledger has not been initialized"))
    }

    /// Register `device`. Only the administrator may do this.
    ///
    /// Fails with [`MaintenanceError::Persistence`] if the id is taken.
    #[instrument(skip(self, ctx, device), fields(tx_id = ctx.tx_id(), device_id = %device.id))]
    pub fn enroll(
        &self,
        ctx: &dyn InvocationContext,
        device: Device,
    ) -> Result<Outcome, MaintenanceError> {
        let admin = self.admin_certificate()?;
        if !self.authority.authorize(ctx, PrincipalRole::Admin, &admin)? {
            return self.config.denial_policy.deny(PrincipalRole::Admin);
        }

        self.store
            .insert_row(&self.config.device_table, device.to_row())?;
        info!(
            owner = %short_fingerprint(&device.owner),
            "Device enrolled"
        );
        Ok(Outcome::Applied)
    }

    /// Fetch a device.
    pub fn get(&self, device_id: &str) -> Result<Device, MaintenanceError> {
        load_device(self.store, &self.config.device_table, device_id)
    }

    /// All devices in id order, as a single-pass sequence.
    pub fn get_all(
        &self,
    ) -> Result<impl Iterator<Item = Result<Device, MaintenanceError>> + 'a, MaintenanceError> {
        let store = self.store;
        let table = self.config.device_table.clone();
        let rows = store.get_rows(&table, &[])?;
        Ok(rows.map(move |row| Ok(Device::from_row(&table, &row?)?)))
    }

    /// Delete a device and every service record keyed by it.
    ///
    /// Service records go first so a failure part way never leaves orphans;
    /// re-invoking finishes the job. Deleting an unknown device succeeds.
    #[instrument(skip(self))]
    pub fn delete(&self, device_id: &str) -> Result<Outcome, MaintenanceError> {
        let service_table = &self.config.service_table;
        let mut removed = 0usize;
        for row in self
            .store
            .get_rows(service_table, &[Column::string(device_id)])?
        {
            let record = ServiceRecord::from_row(service_table, &row?)?;
            if self
                .store
                .delete_row(service_table, &service_key(&record.device_id, &record.service_id))?
            {
                removed += 1;
            }
        }

        let existed = self
            .store
            .delete_row(&self.config.device_table, &device_key(device_id))?;
        info!(existed, service_records = removed, "Device deleted");
        Ok(Outcome::Applied)
    }
}

impl std::fmt::Debug for DeviceRegistry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("device_table", &self.config.device_table)
            .finish_non_exhaustive()
    }
}
