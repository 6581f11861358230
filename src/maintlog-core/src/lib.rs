//! # maintlog-core
//!
//! Multi-party device maintenance workflow on a shared ledger.
//!
//! An administrator enrolls devices. Each device names an owner and three
//! check owners. The owner opens a service cycle, each check owner marks
//! their check complete, and the owner signs the cycle off once all three
//! checks are done. Every step is gated by a signature from the principal
//! the step requires; there are no sessions and no role tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │               DeviceMaintenanceChaincode                 │
//! │           init / invoke / query dispatch                 │
//! │                                                          │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────┐  │
//! │  │ DeviceRegistry │  │  ServiceCycle  │  │QueryFacade │  │
//! │  │ enroll/delete  │  │ start/mark/    │  │ JSON reads │  │
//! │  │                │  │ signoff        │  │ (no gate)  │  │
//! │  └───────┬────────┘  └───────┬────────┘  └─────┬──────┘  │
//! │          └─────────┬─────────┘                 │         │
//! │                    ▼                           │         │
//! │          ┌──────────────────┐                  │         │
//! │          │ CallerAuthority  │                  │         │
//! │          │ sig(payload‖bind)│                  │         │
//! │          └──────────────────┘                  │         │
//! └────────────────────┬───────────────────────────┼─────────┘
//!                      ▼                           ▼
//!              ┌──────────────────────────────────────┐
//!              │      LedgerStore (maintlog-store)    │
//!              └──────────────────────────────────────┘
//! ```
//!
//! ## Authorization Contract
//!
//! - A caller that is not the required principal gets an empty success and
//!   no state change, unless [`DenialPolicy::Reject`] is configured.
//! - Queries are open to everyone.
//! - `delete` is not gated.
//!
//! ## Concurrency
//!
//! Transitions read a row and write it back without locking. Run them
//! behind something that serializes invocations, such as [`LedgerRuntime`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::doc_markdown)] // Allow product names without backticks
#![allow(clippy::missing_errors_doc)] // Error documentation not required
#![allow(clippy::module_name_repetitions)] // Allow Type in module::Type
#![allow(clippy::must_use_candidate)] // Not all functions need must_use

pub mod authority;
pub mod chaincode;
pub mod config;
pub mod context;
pub mod error;
pub mod query;
pub mod registry;
pub mod runtime;
pub mod service_cycle;
pub mod tables;
pub mod types;

pub use authority::{CallerAuthority, PrincipalRole};
pub use chaincode::{DeviceMaintenanceChaincode, INVOKE_FUNCTIONS, QUERY_FUNCTIONS};
pub use config::{DenialPolicy, LedgerConfig};
pub use context::{canonical_payload, signing_message, Invocation, InvocationContext, SignedInvocation};
pub use error::{ErrorKind, MaintenanceError};
pub use query::QueryFacade;
pub use registry::{parse_enroll_args, DeviceRegistry};
pub use runtime::{derive_binding, LedgerRuntime, Participant};
pub use service_cycle::ServiceCycle;
pub use types::{CheckSlot, CycleState, Device, Outcome, ServiceRecord, ServiceRecordFlags};
