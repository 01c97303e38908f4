//! Loading convergence.
//!
//! Busy indicators are tracked by element identity: once an indicator is
//! seen, the screen counts as settled when *that* element is detached from
//! the rendered tree. Hiding it is not enough, and a fresh indicator that
//! replaces it does not restart the wait.

use crate::config::TimeoutConfig;
use crate::driver::{DriverError, ElementHandle, UiDriver};
use crate::locator::Selector;
use crate::probe::{self, absent_as_none};
use crate::result::{FlowError, FlowResult};
use crate::wait::ConditionWaiter;
use std::time::Duration;
use tracing::debug;

/// How a screen reached the idle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// No indicator was present
    AlreadyIdle,
    /// An indicator was present and detached
    Cleared {
        /// Time from first sighting to detachment
        elapsed: Duration,
    },
}

impl Settled {
    /// Whether a busy indicator was actually waited out
    #[must_use]
    pub const fn was_busy(&self) -> bool {
        matches!(self, Self::Cleared { .. })
    }
}

/// Waits for busy indicators to go away
pub struct LoadingTracker<'a, D: UiDriver + ?Sized> {
    driver: &'a D,
    waiter: &'a ConditionWaiter,
    timeouts: &'a TimeoutConfig,
}

impl<D: UiDriver + ?Sized> std::fmt::Debug for LoadingTracker<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingTracker")
            .field("timeouts", self.timeouts)
            .finish_non_exhaustive()
    }
}

impl<'a, D: UiDriver + ?Sized> LoadingTracker<'a, D> {
    /// Create a tracker
    #[must_use]
    pub const fn new(
        driver: &'a D,
        waiter: &'a ConditionWaiter,
        timeouts: &'a TimeoutConfig,
    ) -> Self {
        Self {
            driver,
            waiter,
            timeouts,
        }
    }

    fn check_selector(busy: &Selector) -> FlowResult<()> {
        busy.validate().map_err(|message| FlowError::ProbeFailed {
            waited_for: format!("{busy} to settle"),
            source: DriverError::invalid_selector(busy, message),
        })
    }

    /// Wait for the current busy indicator, if any, to detach
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Timeout`] if the indicator outlives `timeout`
    pub async fn await_settled(&self, busy: &Selector, timeout: Duration) -> FlowResult<Settled> {
        Self::check_selector(busy)?;
        match absent_as_none(self.driver.locate(busy).await)?.flatten() {
            None => {
                debug!(indicator = %busy, "no busy indicator present");
                Ok(Settled::AlreadyIdle)
            }
            Some(handle) => self.settle(&handle, timeout).await,
        }
    }

    /// Wait for an indicator to appear within `appear_within`, then settle it
    ///
    /// Used right after a triggering click: an indicator that never shows up
    /// means the operation completed without one.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Timeout`] if the indicator outlives the remaining
    /// budget
    pub async fn await_cycle(
        &self,
        busy: &Selector,
        appear_within: Duration,
        timeout: Duration,
    ) -> FlowResult<Settled> {
        Self::check_selector(busy)?;
        let spec = self
            .timeouts
            .spec_for(format!("{busy} to appear"), appear_within);
        let driver = self.driver;
        let appeared = self
            .waiter
            .until(&spec, move || async move {
                absent_as_none(driver.locate(busy).await).map(Option::flatten)
            })
            .await;

        match appeared {
            Ok(found) => {
                let remaining = timeout.saturating_sub(found.elapsed);
                self.settle(&found.value, remaining).await
            }
            Err(FlowError::Timeout { .. }) => {
                debug!(indicator = %busy, "busy indicator never appeared");
                Ok(Settled::AlreadyIdle)
            }
            Err(err) => Err(err),
        }
    }

    /// Whether a busy indicator is displayed right now
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn is_busy(&self, busy: &Selector) -> FlowResult<bool> {
        Self::check_selector(busy)?;
        Ok(probe::displayed(self.driver, busy).await?)
    }

    async fn settle(&self, handle: &ElementHandle, timeout: Duration) -> FlowResult<Settled> {
        let spec = self
            .timeouts
            .spec_for(format!("{} to settle", handle.selector), timeout);
        let driver = self.driver;
        let waited = self
            .waiter
            .until_true(&spec, move || probe::detached(driver, handle))
            .await?;
        debug!(
            indicator = %handle.selector,
            elapsed_ms = waited.elapsed.as_millis(),
            "busy indicator cleared"
        );
        Ok(Settled::Cleared {
            elapsed: waited.elapsed,
        })
    }
}
