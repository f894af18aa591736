//! Provisioning reconciliation engine.
//!
//! Unique responsibility: after a mutating call has been accepted,
//! poll the resource's read endpoint at a fixed interval until it
//! reaches a terminal phase or the operation deadline elapses.
//!
//! One loop serves every resource kind. The caller supplies an async
//! fetch closure (the same "get by id" call backing normal reads) and
//! the kind whose phase vocabulary classifies each observation:
//!
//! - `Ready`: return the final payload immediately, no further polls.
//! - `Failed`: return [`CloudError::PhaseFailed`] immediately - an
//!   authoritative terminal signal is never retried.
//! - `Pending`: sleep the poll interval and fetch again, unless the
//!   deadline has passed, in which case [`CloudError::Timeout`].
//!
//! Transient fetch errors (connection failures, 5xx, garbled bodies)
//! keep the loop polling; authoritative rejections abort it. Polling
//! is fixed-interval with no jitter or backoff, never faster than the
//! interval and never past the deadline. The sleep is a cancellation
//! point: dropping the returned future stops the loop at once.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::CloudError;
use crate::phase::{PollOutcome, ResourceKind};
use crate::timeouts::DEFAULT_POLL_INTERVAL;

/// Access to the backend-reported phase of a fetched payload.
///
/// Implemented by every resource response type that participates in
/// reconciliation.
pub trait ObservedPhase {
    /// The raw phase string as reported by the control plane.
    fn phase(&self) -> &str;
}

/// Per-call reconciliation parameters. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    kind: ResourceKind,
    poll_interval: Duration,
    overall_timeout: Duration,
}

impl ReconcileConfig {
    /// Create a config with the default poll interval.
    ///
    /// `overall_timeout` comes from [`crate::timeouts::resolve`] and
    /// bounds the whole reconciliation.
    #[must_use]
    pub const fn new(kind: ResourceKind, overall_timeout: Duration) -> Self {
        Self {
            kind,
            poll_interval: DEFAULT_POLL_INTERVAL,
            overall_timeout,
        }
    }

    /// Override the poll interval (primarily for tests).
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// The resource kind being reconciled.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The fixed interval between polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The overall deadline budget.
    #[must_use]
    pub const fn overall_timeout(&self) -> Duration {
        self.overall_timeout
    }
}

/// Poll `fetch` until the observed phase is terminal or the deadline
/// elapses, returning the final observed payload on success.
///
/// # Errors
///
/// - [`CloudError::PhaseFailed`] when the backend reports the kind's
///   failed phase.
/// - [`CloudError::Timeout`] when the deadline elapses while still
///   pending; no fetch is issued after the deadline instant.
/// - Any non-transient fetch error (see
///   [`CloudError::is_poll_transient`]) is propagated as-is.
pub async fn wait_for_ready<T, F, Fut>(cfg: &ReconcileConfig, mut fetch: F) -> Result<T, CloudError>
where
    T: ObservedPhase,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CloudError>>,
{
    let start = Instant::now();
    let deadline = start + cfg.overall_timeout;

    loop {
        match fetch().await {
            Ok(observed) => match cfg.kind.classify(observed.phase()) {
                PollOutcome::Ready => {
                    debug!(kind = %cfg.kind, phase = observed.phase(), "resource ready");
                    return Ok(observed);
                }
                PollOutcome::Failed => {
                    return Err(CloudError::PhaseFailed {
                        kind: cfg.kind,
                        phase: observed.phase().to_string(),
                    });
                }
                PollOutcome::Pending => {
                    debug!(kind = %cfg.kind, phase = observed.phase(), "resource not ready yet");
                }
            },
            Err(e) if e.is_poll_transient() => {
                warn!(kind = %cfg.kind, error = %e, "transient error while polling, will retry");
            }
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(timeout_error(cfg.kind, start));
        }
        tokio::time::sleep(cfg.poll_interval.min(deadline - now)).await;
        if Instant::now() >= deadline {
            return Err(timeout_error(cfg.kind, start));
        }
    }
}

fn timeout_error(kind: ResourceKind, start: Instant) -> CloudError {
    CloudError::Timeout {
        kind,
        elapsed: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Debug)]
    struct Observed {
        phase: String,
    }

    impl Observed {
        fn new(phase: &str) -> Self {
            Self {
                phase: phase.to_string(),
            }
        }
    }

    impl ObservedPhase for Observed {
        fn phase(&self) -> &str {
            &self.phase
        }
    }

    fn config(kind: ResourceKind, timeout: Duration) -> ReconcileConfig {
        ReconcileConfig::new(kind, timeout)
    }

    #[tokio::test(start_paused = true)]
    async fn ready_on_first_poll_returns_without_sleeping() {
        let cfg = config(ResourceKind::Instance, Duration::from_secs(900));
        let calls = Cell::new(0_u32);
        let start = Instant::now();

        let observed = wait_for_ready(&cfg, || {
            calls.set(calls.get() + 1);
            async { Ok(Observed::new("Ready")) }
        })
        .await
        .unwrap();

        assert_eq!(observed.phase(), "Ready");
        assert_eq!(calls.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_until_deadline_times_out_without_late_fetch() {
        let cfg = config(ResourceKind::Filesystem, Duration::from_secs(12));
        let calls = Cell::new(0_u32);
        let start = Instant::now();

        let err = wait_for_ready(&cfg, || {
            calls.set(calls.get() + 1);
            async { Ok(Observed::new("FSProvisioning")) }
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            CloudError::Timeout {
                kind: ResourceKind::Filesystem,
                ..
            }
        ));
        // Fetches at t=0, 5, 10; the deadline at t=12 is hit before a
        // fourth fetch can happen.
        assert_eq!(calls.get(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_phase_aborts_immediately() {
        let cfg = config(ResourceKind::IksCluster, Duration::from_secs(1800));
        let calls = Cell::new(0_u32);
        let start = Instant::now();

        let err = wait_for_ready(&cfg, || {
            calls.set(calls.get() + 1);
            async { Ok(Observed::new("Failed")) }
        })
        .await
        .unwrap_err();

        match err {
            CloudError::PhaseFailed { kind, phase } => {
                assert_eq!(kind, ResourceKind::IksCluster);
                assert_eq!(phase, "Failed");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_fetch_errors_keep_polling() {
        let cfg = config(ResourceKind::Instance, Duration::from_secs(900));
        let script = RefCell::new(vec![
            Err(CloudError::Transport("connection reset".into())),
            Err(CloudError::InternalServer("flaky backend".into())),
            Ok(Observed::new("Ready")),
        ]);

        let observed = wait_for_ready(&cfg, || {
            let next = script.borrow_mut().remove(0);
            async move { next }
        })
        .await
        .unwrap();

        assert_eq!(observed.phase(), "Ready");
        assert!(script.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_fetch_error_aborts() {
        let cfg = config(ResourceKind::Instance, Duration::from_secs(900));
        let calls = Cell::new(0_u32);

        let err = wait_for_ready::<Observed, _, _>(&cfg, || {
            calls.set(calls.get() + 1);
            async { Err(CloudError::NotFound("instance gone".into())) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CloudError::NotFound(_)));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_then_ready_takes_one_interval_per_pending_poll() {
        let cfg = config(ResourceKind::Filesystem, Duration::from_secs(300));
        let script = RefCell::new(vec!["FSProvisioning", "FSProvisioning", "FSReady"]);
        let start = Instant::now();

        let observed = wait_for_ready(&cfg, || {
            let phase = script.borrow_mut().remove(0);
            async move { Ok(Observed::new(phase)) }
        })
        .await
        .unwrap();

        assert_eq!(observed.phase(), "FSReady");
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn last_sleep_is_clamped_to_the_deadline() {
        // 7s budget with a 5s interval: fetch at t=0 and t=5, then the
        // clamped sleep ends exactly at t=7.
        let cfg = config(ResourceKind::Filesystem, Duration::from_secs(7));
        let calls = Cell::new(0_u32);
        let start = Instant::now();

        let err = wait_for_ready(&cfg, || {
            calls.set(calls.get() + 1);
            async { Ok(Observed::new("FSProvisioning")) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CloudError::Timeout { .. }));
        assert_eq!(calls.get(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }
}
