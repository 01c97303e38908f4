//! Logout workflow.
//!
//! Confirming: collect whatever user info is shown, click confirm, wait out
//! the loading cycle, then race error message > redirect to an auth page >
//! success message. Leaving for any other page does not end the race; only a
//! success message (or the deadline) does. Cancelling is its own small state
//! machine with no error/success race: it is done once the browser has left
//! the logout screen or both logout buttons are present and disabled.

use super::{ScreenContext, ERROR_MESSAGE, SUCCESS_MESSAGE};
use crate::config::TimeoutTier;
use crate::driver::{DriverError, UiDriver};
use crate::envelope::{OutcomeEnvelope, Payload};
use crate::probe;
use crate::result::FlowResult;
use crate::screen::ScreenDescriptor;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const CONFIRM_BUTTON: &str = "confirm_logout_button";
const CANCEL_BUTTON: &str = "cancel_logout_button";
const LOGOUT_MESSAGE: &str = "logout_message";
const USER_NAME: &str = "user_name";
const LAST_LOGIN_INFO: &str = "last_login_info";
const SESSION_TIME_INFO: &str = "session_time_info";

/// URL fragments that mean "back at authentication"
const AUTH_PATHS: [&str; 3] = ["/login", "/auth", "/signin"];

/// Session details shown on the logout screen; each one is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Displayed user name
    pub user_name: Option<String>,
    /// Last login line
    pub last_login: Option<String>,
    /// Session duration line
    pub session_time: Option<String>,
}

#[derive(Debug)]
enum LogoutSignal {
    Error(String),
    AuthRedirect(String),
    SuccessShown(String),
}

/// Logout screen workflow
pub struct LogoutFlow<'a, D: UiDriver> {
    ctx: ScreenContext<'a, D>,
}

impl<D: UiDriver> std::fmt::Debug for LogoutFlow<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoutFlow")
            .field("screen", &self.ctx.screen().name)
            .finish_non_exhaustive()
    }
}

impl<'a, D: UiDriver> LogoutFlow<'a, D> {
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

    /// Navigate to the logout screen and wait until it is usable
    ///
    /// # Errors
    ///
    /// Returns navigation faults or timeouts
    pub async fn open(&self) -> FlowResult<OutcomeEnvelope> {
        self.ctx.session().open(self.ctx.screen()).await
    }

    /// The logout prompt text (medium tier)
    ///
    /// # Errors
    ///
    /// Returns a timeout if the prompt never shows
    pub async fn logout_message(&self) -> FlowResult<String> {
        self.ctx.required_text(LOGOUT_MESSAGE, "logout message").await
    }

    /// Collect user info; fields that do not show within the short tier are `None`
    ///
    /// # Errors
    ///
    /// Returns probe faults
    pub async fn user_info(&self) -> FlowResult<UserInfo> {
        Ok(UserInfo {
            user_name: self.ctx.message(USER_NAME).await?,
            last_login: self.ctx.message(LAST_LOGIN_INFO).await?,
            session_time: self.ctx.message(SESSION_TIME_INFO).await?,
        })
    }

    /// Whether the confirm button is displayed and enabled
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn is_confirm_enabled(&self) -> FlowResult<bool> {
        self.ctx
            .guard()
            .is_enabled_now(self.ctx.selector(CONFIRM_BUTTON)?)
            .await
    }

    /// Whether the cancel button is displayed and enabled
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn is_cancel_enabled(&self) -> FlowResult<bool> {
        self.ctx
            .guard()
            .is_enabled_now(self.ctx.selector(CANCEL_BUTTON)?)
            .await
    }

    /// Confirm the logout and report the outcome
    ///
    /// # Errors
    ///
    /// Returns action failures, probe faults, or a timeout while the loading
    /// indicator is up
    pub async fn perform_logout(&self) -> FlowResult<OutcomeEnvelope> {
        let user_info = self.user_info().await?;

        self.ctx.click(CONFIRM_BUTTON, "confirm logout button").await?;
        let _ = self
            .ctx
            .settle_after_action(self.ctx.tier(TimeoutTier::Long))
            .await?;

        let driver = self.ctx.driver();
        let error = self.ctx.selector(ERROR_MESSAGE)?;
        let success = self.ctx.selector(SUCCESS_MESSAGE)?;
        let logout_path = self.ctx.screen().path();

        let signal = self
            .ctx
            .race("logout result", self.ctx.tier(TimeoutTier::Long), move || async move {
                if let Some(text) = probe::visible_text(driver, error).await? {
                    return Ok(Some(LogoutSignal::Error(text)));
                }
                let url = driver.current_url().await?;
                if !url.contains(logout_path) && is_auth_url(&url) {
                    return Ok(Some(LogoutSignal::AuthRedirect(url)));
                }
                let shown = probe::visible_text(driver, success).await?;
                Ok::<_, DriverError>(shown.map(LogoutSignal::SuccessShown))
            })
            .await?;

        let respond = self.ctx.respond();
        let envelope = match signal {
            Some(LogoutSignal::Error(text)) => {
                respond.failure(text, Payload::new().with("userInfo", &user_info))
            }
            Some(LogoutSignal::AuthRedirect(url)) => respond.success(
                "Logout successful - redirected to login",
                payload(&url, &user_info),
            ),
            Some(LogoutSignal::SuccessShown(text)) => {
                let url = self.ctx.current_url().await?;
                respond.success(text, payload(&url, &user_info))
            }
            None => {
                let url = self.ctx.current_url().await?;
                warn!(screen = %respond.screen(), url = %url, "logout result unclear");
                respond.failure(
                    "Logout result unclear - no redirect or success message",
                    payload(&url, &user_info),
                )
            }
        };
        info!(
            screen = %envelope.screen(),
            success = envelope.success(),
            message = %envelope.message(),
            "logout finished"
        );
        Ok(envelope)
    }

    /// Cancel the logout
    ///
    /// Done when the URL leaves the logout path or both buttons are present
    /// and disabled (medium tier). A button missing mid re-render does not
    /// count as disabled.
    ///
    /// # Errors
    ///
    /// Returns a timeout if neither happens
    pub async fn cancel_logout(&self) -> FlowResult<OutcomeEnvelope> {
        let original_url = self.ctx.current_url().await?;
        self.ctx.click(CANCEL_BUTTON, "cancel logout button").await?;

        let driver = self.ctx.driver();
        let confirm = self.ctx.selector(CONFIRM_BUTTON)?;
        let cancel = self.ctx.selector(CANCEL_BUTTON)?;
        let logout_path = self.ctx.screen().path();
        self.ctx
            .confirm("logout cancellation", TimeoutTier::Medium, move || async move {
                if !driver.current_url().await?.contains(logout_path) {
                    return Ok(true);
                }
                let confirm_disabled = probe::disabled(driver, confirm).await?;
                let cancel_disabled = probe::disabled(driver, cancel).await?;
                Ok::<_, DriverError>(confirm_disabled && cancel_disabled)
            })
            .await?;

        let url = self.ctx.current_url().await?;
        info!(screen = %self.ctx.screen().name, url = %url, "logout cancelled");
        Ok(self.ctx.respond().success(
            "Logout cancelled successfully",
            Payload::new()
                .with("redirectedTo", url)
                .with("originalUrl", original_url),
        ))
    }
}

fn is_auth_url(url: &str) -> bool {
    AUTH_PATHS.iter().any(|path| url.contains(path))
}

fn payload(url: &str, user_info: &UserInfo) -> Payload {
    Payload::new()
        .with("redirectedTo", url)
        .with("userInfo", user_info)
}
