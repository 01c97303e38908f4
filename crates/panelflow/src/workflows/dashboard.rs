//! Dashboard workflow.
//!
//! Reads the stats and activity lists, refreshes, triggers quick actions by
//! label and hands off to settings or logout.

use super::{ScreenContext, ERROR_MESSAGE, SUCCESS_MESSAGE};
use crate::config::TimeoutTier;
use crate::driver::{DriverError, ElementHandle, UiDriver};
use crate::envelope::{OutcomeEnvelope, Payload};
use crate::probe::{self, absent_as_none};
use crate::result::FlowResult;
use crate::screen::ScreenDescriptor;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const WELCOME_MESSAGE: &str = "welcome_message";
const STATS_CONTAINER: &str = "stats_container";
const RECENT_ACTIVITY: &str = "recent_activity";
const QUICK_ACTIONS: &str = "quick_actions";
const REFRESH_BUTTON: &str = "refresh_button";
const SETTINGS_BUTTON: &str = "settings_button";
const LOGOUT_BUTTON: &str = "logout_button";
const STAT_ITEMS: &str = "stat_items";
const ACTIVITY_ITEMS: &str = "activity_items";
const ACTION_BUTTONS: &str = "action_buttons";

/// URL fragments that mean the logout hand-off happened
const LOGOUT_DESTINATIONS: [&str; 2] = ["/login", "/logout"];

/// One entry of the recent activity list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Displayed text
    pub text: String,
    /// `data-timestamp` of the entry, when present
    pub timestamp: Option<String>,
}

#[derive(Debug)]
enum RefreshSignal {
    Error(String),
    SuccessShown(String),
}

/// Dashboard workflow
pub struct DashboardFlow<'a, D: UiDriver> {
    ctx: ScreenContext<'a, D>,
}

impl<D: UiDriver> std::fmt::Debug for DashboardFlow<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardFlow")
            .field("screen", &self.ctx.screen().name)
            .finish_non_exhaustive()
    }
}

impl<'a, D: UiDriver> DashboardFlow<'a, D> {
    /// Bind the workflow to a screen
    #[must_use]
    pub fn new(session: &'a Session<D>, screen: ScreenDescriptor) -> Self {
        Self {
            ctx: ScreenContext::new(session, screen),
        }
    }

    /// Screen this workflow drives
    #[must_use]
    pub const fn screen(&self) -> &ScreenDescriptor {
        self.ctx.screen()
    }

    /// Navigate to the dashboard and wait until it is usable
    ///
    /// # Errors
    ///
    /// Returns navigation faults or timeouts
    pub async fn open(&self) -> FlowResult<OutcomeEnvelope> {
        self.ctx.session().open(self.ctx.screen()).await
    }

    /// Welcome banner text (medium tier)
    ///
    /// # Errors
    ///
    /// Returns a timeout if the banner never shows
    pub async fn welcome_message(&self) -> FlowResult<String> {
        self.ctx.required_text(WELCOME_MESSAGE, "welcome message").await
    }

    /// Displayed stats keyed by each item's `data-testid`
    ///
    /// # Errors
    ///
    /// Returns a timeout if the stats container never shows
    pub async fn stats(&self) -> FlowResult<BTreeMap<String, String>> {
        let guard = self.ctx.guard();
        let _ = guard
            .wait_visible(
                self.ctx.selector(STATS_CONTAINER)?,
                "stats container",
                self.ctx.tier(TimeoutTier::Medium),
            )
            .await?;

        let driver = self.ctx.driver();
        let mut stats = BTreeMap::new();
        for handle in guard.visible_elements(self.ctx.selector(STAT_ITEMS)?).await? {
            let Some(key) = absent_as_none(driver.read_attribute(&handle, "data-testid").await)?
                .flatten()
            else {
                continue;
            };
            if let Some(text) = absent_as_none(driver.read_text(&handle).await)? {
                let _ = stats.insert(key, text);
            }
        }
        debug!(count = stats.len(), "read dashboard stats");
        Ok(stats)
    }

    /// Displayed recent activity entries, in order
    ///
    /// # Errors
    ///
    /// Returns a timeout if the activity list never shows
    pub async fn recent_activities(&self) -> FlowResult<Vec<Activity>> {
        let guard = self.ctx.guard();
        let _ = guard
            .wait_visible(
                self.ctx.selector(RECENT_ACTIVITY)?,
                "recent activity",
                self.ctx.tier(TimeoutTier::Medium),
            )
            .await?;

        let driver = self.ctx.driver();
        let mut activities = Vec::new();
        for handle in guard.visible_elements(self.ctx.selector(ACTIVITY_ITEMS)?).await? {
            let Some(text) = absent_as_none(driver.read_text(&handle).await)? else {
                continue;
            };
            let timestamp =
                absent_as_none(driver.read_attribute(&handle, "data-timestamp").await)?.flatten();
            activities.push(Activity { text, timestamp });
        }
        Ok(activities)
    }

    /// Number of displayed activity entries
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn activity_count(&self) -> FlowResult<usize> {
        Ok(self
            .ctx
            .guard()
            .visible_elements(self.ctx.selector(ACTIVITY_ITEMS)?)
            .await?
            .len())
    }

    /// Refresh the dashboard
    ///
    /// No message within the short tier after loading is treated as success.
    ///
    /// # Errors
    ///
    /// Returns action failures, probe faults, or a settle timeout
    pub async fn refresh(&self) -> FlowResult<OutcomeEnvelope> {
        self.ctx.click(REFRESH_BUTTON, "refresh button").await?;
        let _ = self
            .ctx
            .settle_after_action(self.ctx.tier(TimeoutTier::Long))
            .await?;

        let driver = self.ctx.driver();
        let error = self.ctx.selector(ERROR_MESSAGE)?;
        let success = self.ctx.selector(SUCCESS_MESSAGE)?;
        let signal = self
            .ctx
            .race("refresh result", self.ctx.tier(TimeoutTier::Short), move || async move {
                if let Some(text) = probe::visible_text(driver, error).await? {
                    return Ok(Some(RefreshSignal::Error(text)));
                }
                let shown = probe::visible_text(driver, success).await?;
                Ok::<_, DriverError>(shown.map(RefreshSignal::SuccessShown))
            })
            .await?;

        let respond = self.ctx.respond();
        let envelope = match signal {
            Some(RefreshSignal::Error(text)) => {
                respond.failure(format!("Dashboard refresh failed: {text}"), Payload::new())
            }
            Some(RefreshSignal::SuccessShown(text)) => respond.success(text, Payload::new()),
            None => respond.success("Dashboard refreshed successfully", Payload::new()),
        };
        info!(
            screen = %envelope.screen(),
            success = envelope.success(),
            "dashboard refreshed"
        );
        Ok(envelope)
    }

    /// Click the quick action whose label contains `label` (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns a timeout if the quick actions never show, or an action failure
    pub async fn click_quick_action(&self, label: &str) -> FlowResult<OutcomeEnvelope> {
        let guard = self.ctx.guard();
        let _ = guard
            .wait_visible(
                self.ctx.selector(QUICK_ACTIONS)?,
                "quick actions",
                self.ctx.tier(TimeoutTier::Medium),
            )
            .await?;

        let buttons = guard.visible_elements(self.ctx.selector(ACTION_BUTTONS)?).await?;
        let respond = self.ctx.respond();
        match self.find_labelled(&buttons, label).await? {
            Some(handle) => {
                guard.click_element(handle, label).await?;
                info!(label, "quick action clicked");
                Ok(respond.success(
                    format!("Quick action '{label}' clicked successfully"),
                    Payload::new(),
                ))
            }
            None => {
                warn!(label, candidates = buttons.len(), "quick action not found");
                Ok(respond.failure(
                    format!("Quick action button with text '{label}' not found"),
                    Payload::new(),
                ))
            }
        }
    }

    async fn find_labelled<'h>(
        &self,
        buttons: &'h [ElementHandle],
        label: &str,
    ) -> FlowResult<Option<&'h ElementHandle>> {
        let wanted = label.to_lowercase();
        let driver = self.ctx.driver();
        for handle in buttons {
            if let Some(text) = absent_as_none(driver.read_text(handle).await)? {
                if text.to_lowercase().contains(&wanted) {
                    return Ok(Some(handle));
                }
            }
        }
        Ok(None)
    }

    /// Click the settings button
    ///
    /// # Errors
    ///
    /// Returns an action failure
    pub async fn open_settings(&self) -> FlowResult<()> {
        self.ctx.click(SETTINGS_BUTTON, "settings button").await
    }

    /// Click logout and wait (long tier) until the URL reaches login or logout
    ///
    /// # Errors
    ///
    /// Returns an action failure or a timeout
    pub async fn logout(&self) -> FlowResult<OutcomeEnvelope> {
        self.ctx.click(LOGOUT_BUTTON, "logout button").await?;

        let driver = self.ctx.driver();
        self.ctx
            .confirm("logout redirect", TimeoutTier::Long, move || async move {
                let url = driver.current_url().await?;
                Ok::<_, DriverError>(LOGOUT_DESTINATIONS.iter().any(|d| url.contains(d)))
            })
            .await?;

        let url = self.ctx.current_url().await?;
        info!(url = %url, "logged out from dashboard");
        Ok(self
            .ctx
            .respond()
            .success("Logout successful", Payload::new().with("redirectedTo", url)))
    }
}
