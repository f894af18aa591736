//! Tidecloud control-plane client library.
//!
//! A client for the Tidecloud REST control plane with:
//! - **Transport**: signed JSON requests with bounded connection retries
//! - **Reconciliation**: one polling engine for every asynchronous
//!   provisioning operation (submit, then poll until a terminal phase
//!   or a deadline)
//! - **Resource services**: filesystems, compute instances, IKS
//!   clusters/node groups/load balancers, object storage
//!
//! ## Quick start
//!
//! Configuration is loaded from environment variables (a local `.env`
//! is honored):
//!
//! ```text
//! TIDECLOUD_CLOUDACCOUNT=acct-00112233
//! TIDECLOUD_API_TOKEN=...
//! TIDECLOUD_REGION=us-region-1
//! ```
//!
//! Then create resources and let the engine wait for readiness:
//!
//! ```ignore
//! use tidecloud::{CloudClient, CloudClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CloudClient::new(CloudClientConfig::from_env()?)?;
//!     for fs in client.list_filesystems().await? {
//!         println!("{}: {}", fs.metadata.name, fs.status.phase);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Every create (and the reconciling updates) blocks until the backend
//! reports the resource ready, fails fast on an authoritative failure
//! phase, and gives up with a timeout error once the per-kind budget
//! elapses. Budgets are overridable per call with duration strings
//! like `"45s"` or `"15m"`.

// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy for strict discipline
#![deny(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Strict Clippy lints
#![deny(clippy::unwrap_used)]         // unwrap() is forbidden
#![deny(clippy::expect_used)]         // expect() is forbidden
#![deny(clippy::panic)]               // panic!() is forbidden
#![deny(clippy::print_stdout)]        // println!() is forbidden in the library
#![deny(clippy::todo)]                // TODO is forbidden
#![deny(clippy::unimplemented)]       // unimplemented!() is forbidden

// ============================================================================
// Modules
// ============================================================================

/// Client configuration and shared request plumbing.
pub mod client;

/// Error taxonomy and HTTP error classification.
pub mod errors;

/// Filesystem lifecycle operations.
pub mod filesystems;

/// Compute instance lifecycle operations.
pub mod instances;

/// IKS cluster, node group, storage and load balancer operations.
pub mod kubernetes;

/// Object storage bucket and user operations.
pub mod object_storage;

/// Resource phase model: kinds, vocabularies, poll outcomes.
pub mod phase;

/// The provisioning reconciliation engine.
pub mod reconciler;

/// Operation timeout defaults and overrides.
pub mod timeouts;

/// HTTP transport with bounded connection retries.
pub mod transport;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use client::{CloudClient, CloudClientConfig};
pub use errors::{ApiErrorBody, CloudError, classify_http_error};
pub use phase::{PollOutcome, ResourceHandle, ResourceKind};
pub use reconciler::{ObservedPhase, ReconcileConfig, wait_for_ready};
pub use timeouts::{DEFAULT_POLL_INTERVAL, default_timeout, resolve};
pub use transport::{ApiResponse, HttpTransport, Transport, TransportConfig};
