//! In-process ledger runtime.
//!
//! Stands in for the ledger that normally delivers invocations: it assigns
//! transaction ids, derives a fresh binding for every invocation, and runs
//! mutating invocations one at a time so that read-then-replace transitions
//! never interleave. Queries bypass the write lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use base64::Engine;
use maintlog_crypto::{ClassicalSigner, Ed25519Signer, P256Signer};
use maintlog_store::{LedgerStore, StoreError};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use crate::chaincode::DeviceMaintenanceChaincode;
use crate::config::LedgerConfig;
use crate::context::{Invocation, SignedInvocation};
use crate::error::MaintenanceError;
use crate::types::Outcome;

/// Binding for one invocation: `SHA-256(nonce || tx_id)` over a 32-byte
/// random nonce.
pub fn derive_binding(tx_id: &str) -> Vec<u8> {
    let mut nonce = [0u8; 32];
    OsRng.fill_bytes(&mut nonce);
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(tx_id.as_bytes());
    hasher.finalize().to_vec()
}

/// Serializing runtime around a deployed chaincode.
pub struct LedgerRuntime {
    chaincode: DeviceMaintenanceChaincode,
    write_lock: Mutex<()>,
    next_tx: AtomicU64,
}

impl LedgerRuntime {
    /// Deploy the chaincode on `store`, recording `deployer` as administrator.
    #[instrument(skip_all)]
    pub fn deploy(
        store: Arc<dyn LedgerStore>,
        config: LedgerConfig,
        deployer: &dyn ClassicalSigner,
    ) -> Result<Self, MaintenanceError> {
        let runtime = Self {
            chaincode: DeviceMaintenanceChaincode::new(store, config),
            write_lock: Mutex::new(()),
            next_tx: AtomicU64::new(1),
        };

        let certificate = deployer.certificate()?.to_bytes();
        let ctx = runtime
            .prepare("init", Vec::<String>::new())
            .attach(certificate)?;
        runtime.chaincode.init(&ctx, ctx.args())?;
        info!("Ledger deployed");
        Ok(runtime)
    }

    /// Deployed chaincode.
    pub fn chaincode(&self) -> &DeviceMaintenanceChaincode {
        &self.chaincode
    }

    /// Unsigned invocation with a fresh transaction id and binding.
    pub fn prepare<I, S>(&self, function: &str, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tx_id = format!("tx-{}", self.next_tx.fetch_add(1, Ordering::Relaxed));
        let binding = derive_binding(&tx_id);
        debug!(%tx_id, function, "Prepared invocation");
        Invocation::new(function, args)
            .with_binding(binding)
            .with_tx_id(tx_id)
    }

    /// Execute a signed invocation under the write lock.
    pub fn submit(&self, invocation: &SignedInvocation) -> Result<Outcome, MaintenanceError> {
        let _guard = self.write_lock.lock().map_err(StoreError::from)?;
        self.chaincode
            .execute(invocation, invocation.function(), invocation.args())
    }

    /// Run a query.
    pub fn query<I, S>(&self, function: &str, args: I) -> Result<Vec<u8>, MaintenanceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.chaincode.query(function, &args)
    }
}

impl std::fmt::Debug for LedgerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerRuntime")
            .field("chaincode", &self.chaincode)
            .field("next_tx", &self.next_tx.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// A named key holder that signs invocations.
pub struct Participant {
    name: String,
    signer: Box<dyn ClassicalSigner + Send + Sync>,
}

impl Participant {
    /// Participant backed by `signer`.
    pub fn new(name: impl Into<String>, signer: Box<dyn ClassicalSigner + Send + Sync>) -> Self {
        Self {
            name: name.into(),
            signer,
        }
    }

    /// Participant with a fresh Ed25519 key.
    pub fn ed25519(name: impl Into<String>) -> Self {
        Self::new(name, Box::new(Ed25519Signer::random()))
    }

    /// Participant with a fresh P-256 key.
    pub fn p256(name: impl Into<String>) -> Self {
        Self::new(name, Box::new(P256Signer::random()))
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying signer.
    pub fn signer(&self) -> &dyn ClassicalSigner {
        self.signer.as_ref()
    }

    /// Encoded certificate.
    pub fn certificate(&self) -> Result<Vec<u8>, MaintenanceError> {
        Ok(self.signer.certificate()?.to_bytes())
    }

    /// Certificate in transport encoding, as `enroll` expects it.
    pub fn encoded_certificate(&self) -> Result<String, MaintenanceError> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.certificate()?))
    }

    /// Sign a prepared invocation.
    pub fn sign(&self, invocation: Invocation) -> Result<SignedInvocation, MaintenanceError> {
        invocation.sign(self.signer.as_ref())
    }

    /// Prepare, sign and submit in one step.
    pub fn invoke<I, S>(
        &self,
        runtime: &LedgerRuntime,
        function: &str,
        args: I,
    ) -> Result<Outcome, MaintenanceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let signed = self.sign(runtime.prepare(function, args))?;
        debug!(participant = %self.name, function, "Submitting");
        runtime.submit(&signed)
    }
}

impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("name", &self.name)
            .field("algorithm", &self.signer.algorithm())
            .finish_non_exhaustive()
    }
}
