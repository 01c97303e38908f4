//! Driver session.
//!
//! A [`Session`] owns one driver, the configuration and a cancellable
//! waiter. Guards, trackers and workflows borrow it for the duration of a
//! call; nothing else is shared between workflow invocations.

use crate::config::{FlowConfig, TimeoutConfig, TimeoutTier};
use crate::driver::UiDriver;
use crate::envelope::{OutcomeEnvelope, Payload, ResponseBuilder};
use crate::interaction::InteractionGuard;
use crate::result::{FlowError, FlowResult};
use crate::screen::{ScreenDescriptor, LOADING_SPINNER};
use crate::settle::LoadingTracker;
use crate::wait::{ConditionWaiter, WaitSpec};
use crate::workflows::{DashboardFlow, LoginFlow, LogoutFlow, RenderFlow, SettingsFlow};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// One automation session
#[derive(Debug)]
pub struct Session<D: UiDriver> {
    driver: D,
    config: FlowConfig,
    waiter: ConditionWaiter,
}

impl<D: UiDriver> Session<D> {
    /// Create a session
    #[must_use]
    pub fn new(driver: D, config: FlowConfig) -> Self {
        Self {
            driver,
            config,
            waiter: ConditionWaiter::new(),
        }
    }

    /// Create a session whose waits stop when `cancel` fires
    #[must_use]
    pub fn with_cancellation(driver: D, config: FlowConfig, cancel: CancellationToken) -> Self {
        Self {
            driver,
            config,
            waiter: ConditionWaiter::with_cancellation(cancel),
        }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Configuration
    #[must_use]
    pub const fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Timeout tiers
    #[must_use]
    pub const fn timeouts(&self) -> &TimeoutConfig {
        &self.config.timeouts
    }

    /// Shared waiter
    #[must_use]
    pub const fn waiter(&self) -> &ConditionWaiter {
        &self.waiter
    }

    /// Token that aborts every wait in this session
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        self.waiter.cancel_token()
    }

    /// Interaction guard over this session
    #[must_use]
    pub const fn guard(&self) -> InteractionGuard<'_, D> {
        InteractionGuard::new(&self.driver, &self.waiter, &self.config.timeouts)
    }

    /// Loading tracker over this session
    #[must_use]
    pub const fn loading(&self) -> LoadingTracker<'_, D> {
        LoadingTracker::new(&self.driver, &self.waiter, &self.config.timeouts)
    }

    /// Wait spec for a tier
    #[must_use]
    pub fn wait_spec(&self, described_by: impl Into<String>, tier: TimeoutTier) -> WaitSpec {
        self.config.timeouts.spec(described_by, tier)
    }

    /// Screen by id (configured override or built-in)
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] for an unknown id
    pub fn screen(&self, id: &str) -> FlowResult<ScreenDescriptor> {
        self.config.screen(id)
    }

    /// Current URL
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn current_url(&self) -> FlowResult<String> {
        Ok(self.driver.current_url().await?)
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Navigate to a screen and wait until it is usable
    ///
    /// # Errors
    ///
    /// Returns navigation faults, or a timeout if a ready element never shows
    pub async fn open(&self, screen: &ScreenDescriptor) -> FlowResult<OutcomeEnvelope> {
        debug!(screen = %screen.name, url = %screen.base_url, "navigating");
        self.driver.navigate(&screen.base_url).await?;
        self.wait_until_ready(screen).await?;
        info!(screen = %screen.name, "screen ready");
        Ok(ResponseBuilder::new(&screen.name).success(
            format!("Successfully navigated to {}", screen.name),
            Payload::new(),
        ))
    }

    /// Wait for ready elements (medium tier), then for the busy indicator
    ///
    /// # Errors
    ///
    /// Returns a timeout or probe fault
    pub async fn wait_until_ready(&self, screen: &ScreenDescriptor) -> FlowResult<()> {
        let guard = self.guard();
        let medium = self.config.timeouts.tier(TimeoutTier::Medium);
        for key in &screen.ready_elements {
            let _ = guard.wait_visible(screen.locator(key)?, key, medium).await?;
        }
        if let Some(spinner) = screen.locators.get(LOADING_SPINNER) {
            let long = self.config.timeouts.tier(TimeoutTier::Long);
            let _ = self.loading().await_settled(spinner, long).await?;
        }
        Ok(())
    }

    /// Check that every required element is displayed (short tier each)
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::MissingElements`] listing every missing element,
    /// or a probe fault for a malformed locator
    pub async fn validate_required_elements(&self, screen: &ScreenDescriptor) -> FlowResult<()> {
        let guard = self.guard();
        let short = self.config.timeouts.tier(TimeoutTier::Short);
        let mut missing = Vec::new();
        for required in &screen.required_elements {
            let selector = screen.locator(&required.locator)?;
            match guard.wait_visible(selector, &required.name, short).await {
                Ok(_) => {}
                Err(FlowError::Timeout { .. }) => missing.push(required.name.clone()),
                Err(err) => return Err(err),
            }
        }
        if missing.is_empty() {
            debug!(screen = %screen.name, "all required elements present");
            return Ok(());
        }
        Err(FlowError::MissingElements {
            screen: screen.name.clone(),
            names: missing,
        })
    }

    // =========================================================================
    // WORKFLOWS
    // =========================================================================

    /// Login workflow on the configured login screen
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] if the screen is unknown
    pub fn login(&self) -> FlowResult<LoginFlow<'_, D>> {
        Ok(LoginFlow::new(self, self.screen("login")?))
    }

    /// Logout workflow on the configured logout screen
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] if the screen is unknown
    pub fn logout(&self) -> FlowResult<LogoutFlow<'_, D>> {
        Ok(LogoutFlow::new(self, self.screen("logout")?))
    }

    /// Settings workflow on the configured settings screen
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] if the screen is unknown
    pub fn settings(&self) -> FlowResult<SettingsFlow<'_, D>> {
        Ok(SettingsFlow::new(self, self.screen("settings")?))
    }

    /// Render workflow on the configured render screen
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] if the screen is unknown
    pub fn render(&self) -> FlowResult<RenderFlow<'_, D>> {
        Ok(RenderFlow::new(self, self.screen("render")?))
    }

    /// Dashboard workflow on the configured dashboard screen
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] if the screen is unknown
    pub fn dashboard(&self) -> FlowResult<DashboardFlow<'_, D>> {
        Ok(DashboardFlow::new(self, self.screen("dashboard")?))
    }
}
