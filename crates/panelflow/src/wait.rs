//! Condition Waiting
//!
//! Every synchronization point in Panelflow funnels through
//! [`ConditionWaiter::until`]: evaluate a probe, and if it has not produced a
//! value yet, sleep a fixed interval and try again until a deadline.
//!
//! ## Deadline contract
//!
//! - The probe is evaluated at least once, even with a zero timeout.
//! - After each `None`, the deadline is checked; if it has passed the wait
//!   fails with [`FlowError::Timeout`].
//! - Otherwise the waiter sleeps `min(poll_interval, remaining)`, so the last
//!   evaluation lands on the deadline itself.
//! - A probe that returns `Err` ends the wait with [`FlowError::ProbeFailed`].
//!   Expected absence is the probe's job to express as `None`.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: Faulty probes stop the line instead of being retried
//! - **Muda**: Fixed cadence, no busy-spin, no backoff to tune

use crate::driver::DriverResult;
use crate::result::{FlowError, FlowResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Smallest sleep between evaluations
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// =============================================================================
// WAIT SPEC
// =============================================================================

/// Parameters of a single wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    /// Total budget
    pub timeout: Duration,
    /// Sleep between evaluations
    pub poll_interval: Duration,
    /// Initial pause before the first evaluation
    pub grace: Option<Duration>,
    /// What is being waited for (used in errors and logs)
    pub described_by: String,
}

impl WaitSpec {
    /// Create a wait spec with default timeout and interval
    #[must_use]
    pub fn new(described_by: impl Into<String>) -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            grace: None,
            described_by: described_by.into(),
        }
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout_ms))
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Pause before the first evaluation (bounded by the timeout)
    #[must_use]
    pub const fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = Some(grace);
        self
    }

    /// Replace the description
    #[must_use]
    pub fn described_as(mut self, described_by: impl Into<String>) -> Self {
        self.described_by = described_by.into();
        self
    }

    /// Timeout in whole milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    fn timeout_error(&self) -> FlowError {
        FlowError::Timeout {
            waited_for: self.described_by.clone(),
            ms: self.timeout_ms(),
        }
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Value produced by a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waited<T> {
    /// Value the probe produced
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of probe evaluations
    pub polls: u32,
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Cooperative, cancellable poll loop
#[derive(Debug, Clone, Default)]
pub struct ConditionWaiter {
    cancel: CancellationToken,
}

impl ConditionWaiter {
    /// Create a waiter with its own cancellation token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a waiter that stops when `cancel` fires
    #[must_use]
    pub const fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Token that aborts this waiter's loops
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Poll `probe` until it yields `Some`
    ///
    /// # Errors
    ///
    /// - [`FlowError::Timeout`] when the deadline passes
    /// - [`FlowError::ProbeFailed`] when the probe returns an error
    /// - [`FlowError::Cancelled`] when the token fires
    pub async fn until<T, F, Fut>(&self, spec: &WaitSpec, mut probe: F) -> FlowResult<Waited<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DriverResult<Option<T>>>,
    {
        let start = Instant::now();
        let deadline = start + spec.timeout;

        if let Some(grace) = spec.grace {
            self.pause(spec, grace.min(spec.timeout)).await?;
        }

        let mut polls = 0_u32;
        loop {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(spec));
            }

            polls = polls.saturating_add(1);
            match probe().await {
                Ok(Some(value)) => {
                    let elapsed = start.elapsed();
                    debug!(
                        waited_for = %spec.described_by,
                        polls,
                        elapsed_ms = elapsed.as_millis(),
                        "condition met"
                    );
                    return Ok(Waited {
                        value,
                        elapsed,
                        polls,
                    });
                }
                Ok(None) => {}
                Err(source) => {
                    debug!(waited_for = %spec.described_by, error = %source, "probe failed");
                    return Err(FlowError::ProbeFailed {
                        waited_for: spec.described_by.clone(),
                        source,
                    });
                }
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(
                    waited_for = %spec.described_by,
                    polls,
                    timeout_ms = spec.timeout_ms(),
                    "wait timed out"
                );
                return Err(spec.timeout_error());
            }
            let nap = spec
                .poll_interval
                .max(MIN_POLL_INTERVAL)
                .min(deadline - now);
            self.pause(spec, nap).await?;
        }
    }

    /// Poll a boolean probe until it returns `true`
    ///
    /// # Errors
    ///
    /// Same as [`ConditionWaiter::until`]
    pub async fn until_true<F, Fut>(&self, spec: &WaitSpec, mut probe: F) -> FlowResult<Waited<()>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DriverResult<bool>>,
    {
        self.until(spec, move || {
            let check = probe();
            async move { check.await.map(|met| met.then_some(())) }
        })
        .await
    }

    async fn pause(&self, spec: &WaitSpec, duration: Duration) -> FlowResult<()> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(self.cancelled(spec)),
            () = tokio::time::sleep(duration) => Ok(()),
        }
    }

    fn cancelled(&self, spec: &WaitSpec) -> FlowError {
        debug!(waited_for = %spec.described_by, "wait cancelled");
        FlowError::Cancelled {
            waited_for: spec.described_by.clone(),
        }
    }
}
