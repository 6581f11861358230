//! Caller authority.
//!
//! Every mutating call names the one principal allowed to make it. The
//! caller proves it is that principal by signing `payload || binding` with
//! the private key behind the principal's stored certificate.
//!
//! Outcomes are three-way:
//! - `Ok(true)`: the signature verifies under the certificate
//! - `Ok(false)`: it does not, or it is not a well-formed signature at all
//! - `Err(_)`: the check could not be carried out (unusable stored
//!   certificate, evidence could not be fetched)

use std::fmt;

use maintlog_crypto::Certificate;
use tracing::{debug, instrument};

use crate::context::{signing_message, InvocationContext};
use crate::error::MaintenanceError;
use crate::types::{CheckSlot, Device};

/// The closed set of principals a transition can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrincipalRole {
    /// The deployer recorded at initialization. Gates `enroll`.
    Admin,
    /// `Device.Owner`. Gates `startServiceCycle` and `signoff`.
    DeviceOwner,
    /// Owner of one check. Gates `markCheckComplete` for that check.
    CheckOwner(CheckSlot),
}

impl PrincipalRole {
    /// Certificate of this principal on `device`. `None` for [`Self::Admin`],
    /// which is not stored on devices.
    pub fn certificate_in<'d>(&self, device: &'d Device) -> Option<&'d [u8]> {
        match self {
            Self::Admin => None,
            Self::DeviceOwner => Some(&device.owner),
            Self::CheckOwner(slot) => Some(device.check_owner(*slot)),
        }
    }
}

impl fmt::Display for PrincipalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "administrator"),
            Self::DeviceOwner => write!(f, "device owner"),
            Self::CheckOwner(slot) => write!(f, "owner of {slot}"),
        }
    }
}

/// Short hex fingerprint for logs.
pub(crate) fn short_fingerprint(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(&Sha256::digest(bytes)[..8])
}

/// Checks invocation evidence against principal certificates.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerAuthority;

impl CallerAuthority {
    /// Create a caller authority.
    pub fn new() -> Self {
        Self
    }

    /// Whether the caller of `ctx` holds the key behind `certificate`.
    ///
    /// # Errors
    ///
    /// [`MaintenanceError::Context`] when evidence cannot be fetched, and
    /// [`MaintenanceError::Crypto`] when `certificate` cannot be decoded or
    /// its key cannot be parsed.
    #[instrument(skip(self, ctx, role, certificate), fields(tx_id = ctx.tx_id(), role = %role))]
    pub fn authorize(
        &self,
        ctx: &dyn InvocationContext,
        role: PrincipalRole,
        certificate: &[u8],
    ) -> Result<bool, MaintenanceError> {
        let signature = ctx.caller_metadata()?;
        let payload = ctx.payload()?;
        let binding = ctx.binding()?;

        debug!(
            certificate = %short_fingerprint(certificate),
            signature = %short_fingerprint(&signature),
            payload_len = payload.len(),
            binding = %short_fingerprint(&binding),
            "Checking caller"
        );

        let certificate = Certificate::from_bytes(certificate)?;
        let message = signing_message(&payload, &binding);
        match certificate.verify(&message, &signature) {
            Ok(ok) => {
                debug!(ok, algorithm = %certificate.algorithm(), "Signature checked");
                Ok(ok)
            },
            // A caller-supplied blob that is not even a signature proves nothing.
            Err(e) if e.is_signature_format() => {
                debug!(error = %e, "Malformed caller signature");
                Ok(false)
            },
            Err(e) => Err(e.into()),
        }
    }

    /// [`Self::authorize`] against the certificate `role` resolves to on
    /// `device`.
    pub fn authorize_on_device(
        &self,
        ctx: &dyn InvocationContext,
        role: PrincipalRole,
        device: &Device,
    ) -> Result<bool, MaintenanceError> {
        let certificate = role.certificate_in(device).ok_or_else(|| {
            MaintenanceError::invalid_argument(format!("{role} is not a device principal"))
        })?;
        self.authorize(ctx, role, certificate)
    }
}
