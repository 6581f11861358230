//! Chaincode entry points.
//!
//! A ledger runtime drives the contract through three calls:
//!
//! | entry | evidence | effect |
//! |-------|----------|--------|
//! | [`init`](DeviceMaintenanceChaincode::init) | deployer certificate | create tables, record admin |
//! | [`invoke`](DeviceMaintenanceChaincode::invoke) | signature over payload and binding | one state transition |
//! | [`query`](DeviceMaintenanceChaincode::query) | none | JSON projection |
//!
//! Arguments arrive as strings; binary values are standard base64.

use std::sync::Arc;

use maintlog_crypto::{constant_time_eq, Certificate};
use maintlog_store::LedgerStore;
use tracing::{error, info, instrument, warn};

use crate::authority::short_fingerprint;
use crate::config::LedgerConfig;
use crate::context::InvocationContext;
use crate::error::MaintenanceError;
use crate::query::QueryFacade;
use crate::registry::{parse_enroll_args, DeviceRegistry};
use crate::service_cycle::ServiceCycle;
use crate::tables::{device_schema, service_schema};
use crate::types::{CheckSlot, Outcome};

/// Mutating functions accepted by [`DeviceMaintenanceChaincode::invoke`].
pub const INVOKE_FUNCTIONS: [&str; 5] = [
    "enroll",
    "startServiceCycle",
    "markCheckComplete",
    "signoff",
    "delete",
];

/// Read functions accepted by [`DeviceMaintenanceChaincode::query`].
pub const QUERY_FUNCTIONS: [&str; 5] = [
    "device",
    "devices",
    "deviceServiceRecord",
    "deviceServiceRecords",
    "allServiceRecords",
];

/// The device-maintenance contract bound to a store.
pub struct DeviceMaintenanceChaincode {
    store: Arc<dyn LedgerStore>,
    config: LedgerConfig,
}

impl DeviceMaintenanceChaincode {
    /// Contract over `store` with `config`.
    pub fn new(store: Arc<dyn LedgerStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Contract over `store` with default configuration.
    pub fn with_defaults(store: Arc<dyn LedgerStore>) -> Self {
        Self::new(store, LedgerConfig::default())
    }

    /// Active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Backing store.
    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    /// Device operations.
    pub fn registry(&self) -> DeviceRegistry<'_> {
        DeviceRegistry::new(self.store.as_ref(), &self.config)
    }

    /// Service cycle operations.
    pub fn service_cycle(&self) -> ServiceCycle<'_> {
        ServiceCycle::new(self.store.as_ref(), &self.config)
    }

    /// Read-only projections.
    pub fn queries(&self) -> QueryFacade<'_> {
        QueryFacade::new(self.registry(), self.service_cycle())
    }

    /// Deploy: create both tables if absent and record the caller's
    /// certificate as administrator.
    ///
    /// The administrator is written once. A later `init` keeps the stored
    /// value and returns it.
    #[instrument(skip(self, ctx, args), fields(tx_id = ctx.tx_id()))]
    pub fn init(
        &self,
        ctx: &dyn InvocationContext,
        args: &[String],
    ) -> Result<Vec<u8>, MaintenanceError> {
        MaintenanceError::check_arity(args, 0, "No arguments required.")?;

        for schema in [
            device_schema(&self.config.device_table),
            service_schema(&self.config.service_table),
        ] {
            let name = schema.name.clone();
            if !self.store.create_table_if_absent(schema)? {
                info!(table = %name, "Table already exists");
            }
        }

        let admin = ctx.caller_metadata()?;
        if admin.is_empty() {
            return Err(MaintenanceError::invalid_argument(
                "Invalid admin certificate. Empty.",
            ));
        }
        Certificate::from_bytes(&admin).map_err(|e| {
            MaintenanceError::invalid_argument(format!("Invalid admin certificate: {e}"))
        })?;

        if let Some(existing) = self.store.get_state(&self.config.admin_key)? {
            warn!(
                same_deployer = constant_time_eq(&existing, &admin),
                admin = %short_fingerprint(&existing),
                "Administrator already recorded, keeping it"
            );
            return Ok(existing);
        }

        self.store.put_state(&self.config.admin_key, &admin)?;
        info!(admin = %short_fingerprint(&admin), "Successfully deployed chaincode");
        Ok(admin)
    }

    /// Run a mutating function. Returns empty bytes on success and on a
    /// silent denial.
    pub fn invoke(
        &self,
        ctx: &dyn InvocationContext,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, MaintenanceError> {
        self.execute(ctx, function, args).map(|_| Vec::new())
    }

    /// [`Self::invoke`], reporting whether state was written.
    #[instrument(skip(self, ctx, args), fields(tx_id = ctx.tx_id()))]
    pub fn execute(
        &self,
        ctx: &dyn InvocationContext,
        function: &str,
        args: &[String],
    ) -> Result<Outcome, MaintenanceError> {
        let result = match function {
            "enroll" => {
                let device = parse_enroll_args(args)?;
                self.registry().enroll(ctx, device)
            },
            "startServiceCycle" => {
                MaintenanceError::check_arity(args, 2, "Specify device id and service id.")?;
                self.service_cycle().start(ctx, &args[0], &args[1])
            },
            "markCheckComplete" => {
                MaintenanceError::check_arity(
                    args,
                    3,
                    "Specify device id, service id and the check being performed.",
                )?;
                let slot: CheckSlot = args[2].parse()?;
                self.service_cycle()
                    .mark_check_complete(ctx, &args[0], &args[1], slot)
            },
            "signoff" => {
                MaintenanceError::check_arity(args, 2, "Specify device id and service id.")?;
                self.service_cycle().signoff(ctx, &args[0], &args[1])
            },
            "delete" => {
                MaintenanceError::check_arity(args, 1, "Specify device ID to be deleted")?;
                self.registry().delete(&args[0])
            },
            other => {
                error!(function = other, "Unimplemented method called");
                return Err(MaintenanceError::UnknownFunction {
                    function: other.to_string(),
                });
            },
        };

        if let Err(e) = &result {
            warn!(function, error = %e, "Invocation failed");
        }
        result
    }

    /// Run a read function. No caller evidence is consulted.
    #[instrument(skip(self, args))]
    pub fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>, MaintenanceError> {
        let queries = self.queries();
        match function {
            "device" => {
                MaintenanceError::check_arity(args, 1, "Specify device id.")?;
                queries.device(&args[0])
            },
            "devices" => {
                MaintenanceError::check_arity(args, 0, "No arguments required")?;
                queries.devices()
            },
            "deviceServiceRecord" => {
                MaintenanceError::check_arity(args, 2, "Specify device id and service id.")?;
                queries.device_service_record(&args[0], &args[1])
            },
            "deviceServiceRecords" => {
                MaintenanceError::check_arity(args, 1, "Specify device id.")?;
                queries.device_service_records(&args[0])
            },
            "allServiceRecords" => {
                MaintenanceError::check_arity(args, 0, "No arguments required")?;
                queries.all_service_records()
            },
            other => {
                error!(function = other, "Invalid query function name");
                Err(MaintenanceError::UnknownFunction {
                    function: other.to_string(),
                })
            },
        }
    }
}

impl std::fmt::Debug for DeviceMaintenanceChaincode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceMaintenanceChaincode")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
