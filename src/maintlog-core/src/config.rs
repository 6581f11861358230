//! Configuration for the maintenance ledger.

use tracing::warn;

use crate::authority::PrincipalRole;
use crate::error::MaintenanceError;
use crate::types::Outcome;

/// What a mutating call does when the caller is not the required principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenialPolicy {
    /// Return an empty success and leave state untouched.
    #[default]
    Silent,
    /// Return [`MaintenanceError::AuthorizationDenied`](crate::MaintenanceError::AuthorizationDenied).
    Reject,
}

impl DenialPolicy {
    /// Outcome of a call whose caller is not `role`.
    pub fn deny(self, role: PrincipalRole) -> Result<Outcome, MaintenanceError> {
        warn!(%role, policy = ?self, "Caller is not the required principal");
        match self {
            Self::Silent => Ok(Outcome::Denied { role }),
            Self::Reject => Err(MaintenanceError::AuthorizationDenied { role }),
        }
    }
}

/// Configuration for the device-maintenance chaincode.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Table holding one row per enrolled device.
    pub device_table: String,
    /// Table holding one row per (device, service cycle).
    pub service_table: String,
    /// State key under which the administrator certificate is stored.
    pub admin_key: String,
    /// Outcome of a failed identity check.
    pub denial_policy: DenialPolicy,
    /// Refuse further check marks and sign-offs once a cycle is signed off.
    pub freeze_signed_off: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            device_table: "DeviceChecksOwnerMap".into(),
            service_table: "DeviceService".into(),
            admin_key: "admin".into(),
            denial_policy: DenialPolicy::Silent,
            freeze_signed_off: false,
        }
    }
}

impl LedgerConfig {
    /// Set the denial policy.
    #[must_use]
    pub fn with_denial_policy(mut self, policy: DenialPolicy) -> Self {
        self.denial_policy = policy;
        self
    }

    /// Set whether signed-off cycles are frozen.
    #[must_use]
    pub fn with_freeze_signed_off(mut self, freeze: bool) -> Self {
        self.freeze_signed_off = freeze;
        self
    }

    /// Override the table names.
    #[must_use]
    pub fn with_tables(mut self, device_table: impl Into<String>, service_table: impl Into<String>) -> Self {
        self.device_table = device_table.into();
        self.service_table = service_table.into();
        self
    }
}
