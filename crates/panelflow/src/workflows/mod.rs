//! Workflow orchestrators.
//!
//! Each workflow composes the guard, the loading tracker and the waiter over
//! one screen descriptor, and reports through one [`OutcomeEnvelope`].
//! Terminal races are a single wait whose probe checks the competing
//! signals in precedence order on every tick, so when two signals show up
//! together the higher-precedence one always wins.
//!
//! [`OutcomeEnvelope`]: crate::OutcomeEnvelope

mod dashboard;
mod login;
mod logout;
mod render;
mod settings;

pub use dashboard::{Activity, DashboardFlow};
pub use login::LoginFlow;
pub use logout::{LogoutFlow, UserInfo};
pub use render::{RenderFlow, RenderOptions};
pub use settings::{ProfileUpdate, SettingsFlow};

use crate::config::TimeoutTier;
use crate::driver::{DriverResult, UiDriver};
use crate::envelope::ResponseBuilder;
use crate::interaction::{InteractionGuard, Verify};
use crate::locator::Selector;
use crate::probe;
use crate::result::{FlowError, FlowResult};
use crate::screen::{ScreenDescriptor, LOADING_SPINNER};
use crate::session::Session;
use crate::settle::Settled;
use std::future::Future;
use std::time::Duration;

/// Locator keys shared by the built-in screens
pub(crate) const ERROR_MESSAGE: &str = "error_message";
pub(crate) const SUCCESS_MESSAGE: &str = "success_message";

/// One screen bound to a session
pub(crate) struct ScreenContext<'a, D: UiDriver> {
    session: &'a Session<D>,
    screen: ScreenDescriptor,
    responses: ResponseBuilder,
}

impl<'a, D: UiDriver> ScreenContext<'a, D> {
    pub(crate) fn new(session: &'a Session<D>, screen: ScreenDescriptor) -> Self {
        let responses = ResponseBuilder::new(&screen.name);
        Self {
            session,
            screen,
            responses,
        }
    }

    pub(crate) const fn session(&self) -> &'a Session<D> {
        self.session
    }

    pub(crate) const fn driver(&self) -> &'a D {
        self.session.driver()
    }

    pub(crate) const fn screen(&self) -> &ScreenDescriptor {
        &self.screen
    }

    pub(crate) const fn respond(&self) -> &ResponseBuilder {
        &self.responses
    }

    pub(crate) const fn guard(&self) -> InteractionGuard<'a, D> {
        self.session.guard()
    }

    pub(crate) fn tier(&self, tier: TimeoutTier) -> Duration {
        self.session.timeouts().tier(tier)
    }

    pub(crate) fn selector(&self, key: &str) -> FlowResult<&Selector> {
        self.screen.locator(key)
    }

    pub(crate) async fn click(&self, key: &str, name: &str) -> FlowResult<()> {
        self.guard().click(self.selector(key)?, name).await
    }

    pub(crate) async fn enter(&self, key: &str, name: &str, text: &str, verify: Verify) -> FlowResult<()> {
        self.guard()
            .enter_text(self.selector(key)?, name, text, verify)
            .await
    }

    /// Text of a displayed element right now, without waiting
    pub(crate) async fn visible_text(&self, key: &str) -> FlowResult<Option<String>> {
        Ok(probe::visible_text(self.driver(), self.selector(key)?).await?)
    }

    /// Text of an element once displayed (short tier), `None` if it never is
    pub(crate) async fn message(&self, key: &str) -> FlowResult<Option<String>> {
        self.guard()
            .read_optional_text(self.selector(key)?, self.tier(TimeoutTier::Short))
            .await
    }

    /// Text of an element that must become visible (medium tier)
    pub(crate) async fn required_text(&self, key: &str, name: &str) -> FlowResult<String> {
        let guard = self.guard();
        let handle = guard
            .wait_visible(self.selector(key)?, name, self.tier(TimeoutTier::Medium))
            .await?;
        Ok(self.driver().read_text(&handle).await?)
    }

    pub(crate) async fn current_url(&self) -> FlowResult<String> {
        self.session.current_url().await
    }

    /// Loading cycle after a triggering click
    pub(crate) async fn settle_after_action(&self, timeout: Duration) -> FlowResult<Settled> {
        let Some(spinner) = self.screen.locators.get(LOADING_SPINNER) else {
            return Ok(Settled::AlreadyIdle);
        };
        self.session
            .loading()
            .await_cycle(spinner, self.tier(TimeoutTier::Short), timeout)
            .await
    }

    /// Wait out a busy indicator that may already be present
    pub(crate) async fn settle(&self) -> FlowResult<Settled> {
        let Some(spinner) = self.screen.locators.get(LOADING_SPINNER) else {
            return Ok(Settled::AlreadyIdle);
        };
        self.session
            .loading()
            .await_settled(spinner, self.tier(TimeoutTier::Long))
            .await
    }

    /// Terminal race: `Some(signal)` for the first signal seen, `None` when
    /// nothing showed up before `timeout`
    pub(crate) async fn race<T, F, Fut>(
        &self,
        described_by: &str,
        timeout: Duration,
        probe: F,
    ) -> FlowResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DriverResult<Option<T>>>,
    {
        let spec = self.session.timeouts().spec_for(described_by, timeout);
        match self.session.waiter().until(&spec, probe).await {
            Ok(waited) => Ok(Some(waited.value)),
            Err(FlowError::Timeout { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Wait for a condition that must hold, faulting on timeout
    pub(crate) async fn confirm<F, Fut>(
        &self,
        described_by: &str,
        tier: TimeoutTier,
        probe: F,
    ) -> FlowResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DriverResult<bool>>,
    {
        let spec = self.session.wait_spec(described_by, tier);
        let _ = self.session.waiter().until_true(&spec, probe).await?;
        Ok(())
    }
}
