//! Ledger entities and workflow states.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::authority::PrincipalRole;
use crate::error::MaintenanceError;

/// Serde adapter writing byte fields as standard base64 strings.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

/// One of the three independently owned maintenance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckSlot {
    /// `check1`
    Check1,
    /// `check2`
    Check2,
    /// `check3`
    Check3,
}

impl CheckSlot {
    /// All slots in order.
    pub const ALL: [CheckSlot; 3] = [CheckSlot::Check1, CheckSlot::Check2, CheckSlot::Check3];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Check1 => "check1",
            Self::Check2 => "check2",
            Self::Check3 => "check3",
        }
    }
}

impl fmt::Display for CheckSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckSlot {
    type Err = MaintenanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check1" => Ok(Self::Check1),
            "check2" => Ok(Self::Check2),
            "check3" => Ok(Self::Check3),
            other => Err(MaintenanceError::invalid_argument(format!(
                "Invalid check specified {other}"
            ))),
        }
    }
}

/// A registered asset with one owner and three check owners.
///
/// Certificate fields hold the encoded [`maintlog_crypto::Certificate`] of
/// each principal. No uniqueness is required across them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Device identifier.
    pub id: String,
    /// Device public key.
    #[serde(rename = "PublicKey", with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// Owner certificate.
    #[serde(rename = "Owner", with = "base64_bytes")]
    pub owner: Vec<u8>,
    /// Certificate of the `check1` owner.
    #[serde(rename = "Check1", with = "base64_bytes")]
    pub check1_owner: Vec<u8>,
    /// Certificate of the `check2` owner.
    #[serde(rename = "Check2", with = "base64_bytes")]
    pub check2_owner: Vec<u8>,
    /// Certificate of the `check3` owner.
    #[serde(rename = "Check3", with = "base64_bytes")]
    pub check3_owner: Vec<u8>,
}

impl Device {
    /// Certificate of the owner of `slot`.
    pub fn check_owner(&self, slot: CheckSlot) -> &[u8] {
        match slot {
            CheckSlot::Check1 => &self.check1_owner,
            CheckSlot::Check2 => &self.check2_owner,
            CheckSlot::Check3 => &self.check3_owner,
        }
    }
}

/// The four flags of a service record, without its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceRecordFlags {
    /// `check1` completed.
    pub check1: bool,
    /// `check2` completed.
    pub check2: bool,
    /// `check3` completed.
    pub check3: bool,
    /// Owner signed off.
    pub signoff: bool,
}

/// One maintenance episode of a device, as stored and as returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Device the cycle belongs to.
    pub device_id: String,
    /// Service cycle identifier, unique per device.
    pub service_id: String,
    /// `check1` completed.
    pub check1: bool,
    /// `check2` completed.
    pub check2: bool,
    /// `check3` completed.
    pub check3: bool,
    /// Owner signed off.
    pub signoff: bool,
}

impl ServiceRecord {
    /// A freshly started cycle: every flag false.
    pub fn started(device_id: impl Into<String>, service_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            service_id: service_id.into(),
            check1: false,
            check2: false,
            check3: false,
            signoff: false,
        }
    }

    /// Whether `slot` is complete.
    pub fn check(&self, slot: CheckSlot) -> bool {
        match slot {
            CheckSlot::Check1 => self.check1,
            CheckSlot::Check2 => self.check2,
            CheckSlot::Check3 => self.check3,
        }
    }

    /// Set `slot` complete, leaving every other flag untouched.
    pub fn mark(&mut self, slot: CheckSlot) {
        match slot {
            CheckSlot::Check1 => self.check1 = true,
            CheckSlot::Check2 => self.check2 = true,
            CheckSlot::Check3 => self.check3 = true,
        }
    }

    /// Whether all three checks are complete.
    pub fn all_checks_complete(&self) -> bool {
        self.check1 && self.check2 && self.check3
    }

    /// The four booleans without the key.
    pub fn flags(&self) -> ServiceRecordFlags {
        ServiceRecordFlags {
            check1: self.check1,
            check2: self.check2,
            check3: self.check3,
            signoff: self.signoff,
        }
    }

    /// Workflow state of this record.
    pub fn state(&self) -> CycleState {
        if self.signoff {
            CycleState::SignedOff
        } else if self.all_checks_complete() {
            CycleState::AllChecksComplete
        } else if self.check1 || self.check2 || self.check3 {
            CycleState::ChecksInProgress
        } else {
            CycleState::Started
        }
    }
}

/// Workflow state of a (device, service) pair, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleState {
    /// No record exists.
    NotStarted,
    /// Record exists, every flag false.
    Started,
    /// Some but not all checks complete.
    ChecksInProgress,
    /// All checks complete, not signed off.
    AllChecksComplete,
    /// Signed off by the device owner.
    SignedOff,
}

impl CycleState {
    /// State of an optional record.
    pub fn of(record: Option<&ServiceRecord>) -> Self {
        record.map_or(Self::NotStarted, ServiceRecord::state)
    }
}

/// Result of a mutating call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State was written.
    Applied,
    /// Caller was not the required principal; nothing was written.
    Denied {
        /// Principal the call required.
        role: PrincipalRole,
    },
}

impl Outcome {
    /// Whether state was written.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
