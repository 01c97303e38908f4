//! Login workflow.
//!
//! `Idle → FieldsFilled → Submitted → {ErrorShown | Redirected | SuccessShown
//! | Ambiguous}`. The result race checks, on every tick: a visible error
//! message, then the URL having left the login path, then a visible success
//! message.

use super::{ScreenContext, ERROR_MESSAGE, SUCCESS_MESSAGE};
use crate::config::TimeoutTier;
use crate::driver::{DriverError, UiDriver};
use crate::envelope::{OutcomeEnvelope, Payload};
use crate::interaction::Verify;
use crate::probe;
use crate::result::FlowResult;
use crate::screen::ScreenDescriptor;
use crate::session::Session;
use tracing::{info, warn};

const EMAIL_INPUT: &str = "email_input";
const PASSWORD_INPUT: &str = "password_input";
const LOGIN_BUTTON: &str = "login_button";
const FORGOT_PASSWORD_LINK: &str = "forgot_password_link";

#[derive(Debug)]
enum LoginSignal {
    Error(String),
    Redirected(String),
    SuccessShown(String),
}

/// Login screen workflow
pub struct LoginFlow<'a, D: UiDriver> {
    ctx: ScreenContext<'a, D>,
}

impl<D: UiDriver> std::fmt::Debug for LoginFlow<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFlow")
            .field("screen", &self.ctx.screen().name)
            .finish_non_exhaustive()
    }
}

impl<'a, D: UiDriver> LoginFlow<'a, D> {
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

    /// Navigate to the login screen and wait until it is usable
    ///
    /// # Errors
    ///
    /// Returns navigation faults or timeouts
    pub async fn open(&self) -> FlowResult<OutcomeEnvelope> {
        self.ctx.session().open(self.ctx.screen()).await
    }

    /// Type the email address (read back)
    ///
    /// # Errors
    ///
    /// Returns an action failure
    pub async fn enter_email(&self, email: &str) -> FlowResult<()> {
        self.ctx.enter(EMAIL_INPUT, "email input", email, Verify::ReadBack).await
    }

    /// Type the password (never read back or logged)
    ///
    /// # Errors
    ///
    /// Returns an action failure
    pub async fn enter_password(&self, password: &str) -> FlowResult<()> {
        self.ctx
            .enter(PASSWORD_INPUT, "password input", password, Verify::Skip)
            .await
    }

    /// Click the login button
    ///
    /// # Errors
    ///
    /// Returns an action failure
    pub async fn submit(&self) -> FlowResult<()> {
        self.ctx.click(LOGIN_BUTTON, "login button").await
    }

    /// Click the forgot-password link
    ///
    /// # Errors
    ///
    /// Returns an action failure
    pub async fn click_forgot_password(&self) -> FlowResult<()> {
        self.ctx
            .click(FORGOT_PASSWORD_LINK, "forgot password link")
            .await
    }

    /// Whether the login button is displayed and enabled right now
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn is_login_button_enabled(&self) -> FlowResult<bool> {
        self.ctx
            .guard()
            .is_enabled_now(self.ctx.selector(LOGIN_BUTTON)?)
            .await
    }

    /// Error message, if one shows up within the short tier
    ///
    /// # Errors
    ///
    /// Returns probe faults
    pub async fn error_message(&self) -> FlowResult<Option<String>> {
        self.ctx.message(ERROR_MESSAGE).await
    }

    /// Success message, if one shows up within the short tier
    ///
    /// # Errors
    ///
    /// Returns probe faults
    pub async fn success_message(&self) -> FlowResult<Option<String>> {
        self.ctx.message(SUCCESS_MESSAGE).await
    }

    /// Fill in credentials, submit, and report the outcome
    ///
    /// A visible error message yields `success = false` with that message;
    /// no signal within the long tier yields "Login result unclear".
    ///
    /// # Errors
    ///
    /// Returns action failures and probe faults
    pub async fn perform_login(&self, email: &str, password: &str) -> FlowResult<OutcomeEnvelope> {
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.submit().await?;

        let driver = self.ctx.driver();
        let error = self.ctx.selector(ERROR_MESSAGE)?;
        let success = self.ctx.selector(SUCCESS_MESSAGE)?;
        let login_path = self.ctx.screen().path();

        let signal = self
            .ctx
            .race("login result", self.ctx.tier(TimeoutTier::Long), move || async move {
                if let Some(text) = probe::visible_text(driver, error).await? {
                    return Ok(Some(LoginSignal::Error(text)));
                }
                let url = driver.current_url().await?;
                if !url.contains(login_path) {
                    return Ok(Some(LoginSignal::Redirected(url)));
                }
                let shown = probe::visible_text(driver, success).await?;
                Ok::<_, DriverError>(shown.map(LoginSignal::SuccessShown))
            })
            .await?;

        let respond = self.ctx.respond();
        let envelope = match signal {
            Some(LoginSignal::Error(text)) => respond.failure(text, Payload::new()),
            Some(LoginSignal::Redirected(url)) => {
                let message = self
                    .ctx
                    .visible_text(SUCCESS_MESSAGE)
                    .await?
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| "Login successful".to_string());
                respond.success(message, Payload::new().with("redirectedTo", url))
            }
            Some(LoginSignal::SuccessShown(text)) => {
                let url = self.ctx.current_url().await?;
                respond.success(text, Payload::new().with("redirectedTo", url))
            }
            None => {
                let url = self.ctx.current_url().await?;
                warn!(screen = %respond.screen(), url = %url, "login result unclear");
                respond.failure("Login result unclear", Payload::new().with("redirectedTo", url))
            }
        };
        info!(
            screen = %envelope.screen(),
            success = envelope.success(),
            message = %envelope.message(),
            "login finished"
        );
        Ok(envelope)
    }
}
