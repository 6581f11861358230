//! Invocation context.
//!
//! Every call into the ledger carries three pieces of caller evidence:
//!
//! ```text
//! caller_metadata = signature over (payload || binding)   (invoke)
//!                 = deployer certificate                  (init)
//! payload         = {"function": <name>, "args": [...]}   (canonical JSON)
//! binding         = per-invocation nonce
//! ```
//!
//! The binding changes on every invocation, so a signature captured from one
//! call cannot authorize another.

use maintlog_crypto::ClassicalSigner;
use serde::Serialize;

use crate::error::MaintenanceError;

/// Source of caller evidence for the invocation being executed.
///
/// Fetches are fallible: a ledger runtime may fail to deliver any of them,
/// and such failures are reported as errors rather than as a mismatch.
pub trait InvocationContext {
    /// Signature submitted with the invocation, or the deployer's
    /// certificate during initialization.
    fn caller_metadata(&self) -> Result<Vec<u8>, MaintenanceError>;

    /// Canonical serialized call payload.
    fn payload(&self) -> Result<Vec<u8>, MaintenanceError>;

    /// Transaction-binding nonce unique to this invocation.
    fn binding(&self) -> Result<Vec<u8>, MaintenanceError>;

    /// Transaction identifier, for logs.
    fn tx_id(&self) -> &str;
}

#[derive(Serialize)]
struct PayloadDocument<'a> {
    function: &'a str,
    args: &'a [String],
}

/// Canonical payload for a call: `{"function": .., "args": [..]}`.
pub fn canonical_payload(function: &str, args: &[String]) -> Result<Vec<u8>, MaintenanceError> {
    Ok(serde_json::to_vec(&PayloadDocument { function, args })?)
}

/// The message a caller signs: `payload || binding`.
pub fn signing_message(payload: &[u8], binding: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(payload.len() + binding.len());
    message.extend_from_slice(payload);
    message.extend_from_slice(binding);
    message
}

/// In-process invocation carrying its evidence by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInvocation {
    tx_id: String,
    function: String,
    args: Vec<String>,
    payload: Vec<u8>,
    binding: Vec<u8>,
    metadata: Vec<u8>,
}

impl SignedInvocation {
    /// Called function.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Positional arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Replace the caller metadata, keeping payload and binding.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Vec<u8>) -> Self {
        self.metadata = metadata;
        self
    }
}

impl InvocationContext for SignedInvocation {
    fn caller_metadata(&self) -> Result<Vec<u8>, MaintenanceError> {
        Ok(self.metadata.clone())
    }

    fn payload(&self) -> Result<Vec<u8>, MaintenanceError> {
        Ok(self.payload.clone())
    }

    fn binding(&self) -> Result<Vec<u8>, MaintenanceError> {
        Ok(self.binding.clone())
    }

    fn tx_id(&self) -> &str {
        &self.tx_id
    }
}

/// Builder for a [`SignedInvocation`].
#[derive(Debug, Clone)]
pub struct Invocation {
    function: String,
    args: Vec<String>,
    binding: Vec<u8>,
    tx_id: String,
}

impl Invocation {
    /// New invocation of `function` with positional `args`.
    pub fn new<I, S>(function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
            binding: Vec::new(),
            tx_id: String::new(),
        }
    }

    /// Set the transaction-binding nonce.
    #[must_use]
    pub fn with_binding(mut self, binding: impl Into<Vec<u8>>) -> Self {
        self.binding = binding.into();
        self
    }

    /// Set the transaction id.
    #[must_use]
    pub fn with_tx_id(mut self, tx_id: impl Into<String>) -> Self {
        self.tx_id = tx_id.into();
        self
    }

    /// Bytes the caller must sign for this invocation.
    pub fn message(&self) -> Result<Vec<u8>, MaintenanceError> {
        let payload = canonical_payload(&self.function, &self.args)?;
        Ok(signing_message(&payload, &self.binding))
    }

    /// Sign with `signer` and attach the signature as caller metadata.
    pub fn sign(self, signer: &dyn ClassicalSigner) -> Result<SignedInvocation, MaintenanceError> {
        let signature = signer.sign(&self.message()?)?;
        self.attach(signature)
    }

    /// Attach arbitrary caller metadata: a signature produced elsewhere, or
    /// the deployer certificate for initialization.
    pub fn attach(self, metadata: Vec<u8>) -> Result<SignedInvocation, MaintenanceError> {
        let payload = canonical_payload(&self.function, &self.args)?;
        Ok(SignedInvocation {
            tx_id: self.tx_id,
            function: self.function,
            args: self.args,
            payload,
            binding: self.binding,
            metadata,
        })
    }
}
