//! Settings workflow.
//!
//! Profile updates touch only the supplied fields, bring the notification
//! toggle to the requested state without double-toggling, save, and race
//! validation errors > error message > success message. Reset applies a
//! fixed default profile through the same path.

use super::{ScreenContext, ERROR_MESSAGE, SUCCESS_MESSAGE};
use crate::config::TimeoutTier;
use crate::driver::{DriverError, ElementHandle, UiDriver};
use crate::envelope::{OutcomeEnvelope, Payload, ValidationError};
use crate::interaction::{InteractionGuard, Verify};
use crate::locator::Selector;
use crate::probe::{self, absent_as_none};
use crate::result::FlowResult;
use crate::screen::ScreenDescriptor;
use crate::session::Session;
use crate::settle::Settled;
use crate::validation::{check_email, check_phone, FieldCheck};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const NAME_INPUT: &str = "name_input";
const EMAIL_INPUT: &str = "email_input";
const PHONE_INPUT: &str = "phone_input";
const SAVE_BUTTON: &str = "save_button";
const CANCEL_BUTTON: &str = "cancel_button";
const RESET_BUTTON: &str = "reset_button";
const NOTIFICATION_TOGGLE: &str = "notification_toggle";
const THEME_SELECTOR: &str = "theme_selector";
const LANGUAGE_SELECTOR: &str = "language_selector";
const VALIDATION_ERRORS: &str = "validation_errors";

/// Fields to change; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Theme label
    pub theme: Option<String>,
    /// Language label
    pub language: Option<String>,
    /// Notification toggle state
    pub notifications: Option<bool>,
}

impl ProfileUpdate {
    /// Update nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The profile "reset to defaults" applies
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            name: Some("Default User".to_string()),
            email: Some("user@example.com".to_string()),
            phone: Some("555-0000".to_string()),
            theme: Some("light".to_string()),
            language: Some("English".to_string()),
            notifications: Some(true),
        }
    }

    /// Set name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set phone
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set theme
    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Set language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set notification state
    #[must_use]
    pub const fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications = Some(enabled);
        self
    }
}

#[derive(Debug)]
enum SaveSignal {
    Validation(Vec<ValidationError>),
    Error(String),
    SuccessShown(String),
}

#[derive(Debug, Default)]
struct Applied {
    fields: Vec<&'static str>,
    warnings: Vec<String>,
}

/// Settings screen workflow
pub struct SettingsFlow<'a, D: UiDriver> {
    ctx: ScreenContext<'a, D>,
}

impl<D: UiDriver> std::fmt::Debug for SettingsFlow<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsFlow")
            .field("screen", &self.ctx.screen().name)
            .finish_non_exhaustive()
    }
}

impl<'a, D: UiDriver> SettingsFlow<'a, D> {
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

    /// Navigate to the settings screen and wait until it is usable
    ///
    /// # Errors
    ///
    /// Returns navigation faults or timeouts
    pub async fn open(&self) -> FlowResult<OutcomeEnvelope> {
        self.ctx.session().open(self.ctx.screen()).await
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Current name field value
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn current_name(&self) -> FlowResult<Option<String>> {
        self.ctx.guard().read_value(self.ctx.selector(NAME_INPUT)?).await
    }

    /// Current email field value
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn current_email(&self) -> FlowResult<Option<String>> {
        self.ctx.guard().read_value(self.ctx.selector(EMAIL_INPUT)?).await
    }

    /// Current phone field value
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn current_phone(&self) -> FlowResult<Option<String>> {
        self.ctx.guard().read_value(self.ctx.selector(PHONE_INPUT)?).await
    }

    /// Notification toggle state (absent reads as off)
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn notifications_enabled(&self) -> FlowResult<bool> {
        self.ctx
            .guard()
            .is_toggled(self.ctx.selector(NOTIFICATION_TOGGLE)?)
            .await
    }

    /// Selected theme label
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn selected_theme(&self) -> FlowResult<Option<String>> {
        self.ctx
            .guard()
            .selected_label(self.ctx.selector(THEME_SELECTOR)?)
            .await
    }

    /// Selected language label
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn selected_language(&self) -> FlowResult<Option<String>> {
        self.ctx
            .guard()
            .selected_label(self.ctx.selector(LANGUAGE_SELECTOR)?)
            .await
    }

    /// Validation errors displayed right now
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn validation_errors(&self) -> FlowResult<Vec<ValidationError>> {
        Ok(read_validation_errors(self.ctx.driver(), self.ctx.selector(VALIDATION_ERRORS)?).await?)
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Click the reset button and wait out the loading indicator
    ///
    /// # Errors
    ///
    /// Returns action failures or a settle timeout
    pub async fn click_reset(&self) -> FlowResult<Settled> {
        self.ctx.click(RESET_BUTTON, "reset button").await?;
        self.ctx.settle().await
    }

    async fn apply(&self, update: &ProfileUpdate) -> FlowResult<Applied> {
        let guard = self.ctx.guard();
        let mut applied = Applied::default();

        if let Some(name) = &update.name {
            self.ctx.enter(NAME_INPUT, "name input", name, Verify::ReadBack).await?;
            applied.fields.push("name");
        }
        if let Some(email) = &update.email {
            note_format(&mut applied, "email", check_email(email));
            self.ctx.enter(EMAIL_INPUT, "email input", email, Verify::ReadBack).await?;
            applied.fields.push("email");
        }
        if let Some(phone) = &update.phone {
            note_format(&mut applied, "phone", check_phone(phone));
            self.ctx.enter(PHONE_INPUT, "phone input", phone, Verify::ReadBack).await?;
            applied.fields.push("phone");
        }
        if let Some(theme) = &update.theme {
            self.select(&guard, THEME_SELECTOR, "theme selector", theme).await?;
            applied.fields.push("theme");
        }
        if let Some(language) = &update.language {
            self.select(&guard, LANGUAGE_SELECTOR, "language selector", language)
                .await?;
            applied.fields.push("language");
        }
        if let Some(enabled) = update.notifications {
            let _ = guard
                .set_toggle(
                    self.ctx.selector(NOTIFICATION_TOGGLE)?,
                    "notification toggle",
                    enabled,
                )
                .await?;
            applied.fields.push("notifications");
        }
        Ok(applied)
    }

    async fn select(
        &self,
        guard: &InteractionGuard<'a, D>,
        key: &str,
        name: &str,
        label: &str,
    ) -> FlowResult<()> {
        guard.select_option(self.ctx.selector(key)?, name, label).await
    }

    async fn save_and_race(&self) -> FlowResult<Option<SaveSignal>> {
        self.ctx.click(SAVE_BUTTON, "save button").await?;
        let _ = self
            .ctx
            .settle_after_action(self.ctx.tier(TimeoutTier::Long))
            .await?;

        let driver = self.ctx.driver();
        let validation = self.ctx.selector(VALIDATION_ERRORS)?;
        let error = self.ctx.selector(ERROR_MESSAGE)?;
        let success = self.ctx.selector(SUCCESS_MESSAGE)?;

        self.ctx
            .race("save result", self.ctx.tier(TimeoutTier::Long), move || async move {
                let errors = read_validation_errors(driver, validation).await?;
                if !errors.is_empty() {
                    return Ok(Some(SaveSignal::Validation(errors)));
                }
                if let Some(text) = probe::visible_text(driver, error).await? {
                    return Ok(Some(SaveSignal::Error(text)));
                }
                let shown = probe::visible_text(driver, success).await?;
                Ok::<_, DriverError>(shown.map(SaveSignal::SuccessShown))
            })
            .await
    }

    /// Apply the supplied fields, save, and report the outcome
    ///
    /// # Errors
    ///
    /// Returns action failures and probe faults; validation errors and error
    /// messages are reported in the envelope
    pub async fn update_profile(&self, update: &ProfileUpdate) -> FlowResult<OutcomeEnvelope> {
        let applied = self.apply(update).await?;
        let signal = self.save_and_race().await?;

        let respond = self.ctx.respond();
        let warnings = warnings_payload(&applied);
        let envelope = match signal {
            Some(SaveSignal::Validation(errors)) => respond.failure(
                "Validation errors occurred",
                warnings.with("validationErrors", &errors),
            ),
            Some(SaveSignal::Error(text)) => respond.failure(text, warnings),
            Some(SaveSignal::SuccessShown(text)) => {
                let message = if text.trim().is_empty() {
                    "Profile updated successfully".to_string()
                } else {
                    text
                };
                respond.success(message, warnings.with("updatedFields", &applied.fields))
            }
            None => {
                warn!(screen = %respond.screen(), "save result unclear");
                respond.failure("Save result unclear", warnings)
            }
        };
        info!(
            screen = %envelope.screen(),
            success = envelope.success(),
            message = %envelope.message(),
            "profile update finished"
        );
        Ok(envelope)
    }

    /// Apply the default profile and save
    ///
    /// # Errors
    ///
    /// Same as [`SettingsFlow::update_profile`]
    pub async fn reset_to_defaults(&self) -> FlowResult<OutcomeEnvelope> {
        let _ = self.apply(&ProfileUpdate::defaults()).await?;
        let signal = self.save_and_race().await?;

        let respond = self.ctx.respond();
        let envelope = match signal {
            Some(SaveSignal::Validation(errors)) => respond.failure(
                "Reset failed: Validation errors occurred",
                Payload::new().with("validationErrors", &errors),
            ),
            Some(SaveSignal::Error(text)) => respond.failure(format!("Reset failed: {text}"), Payload::new()),
            Some(SaveSignal::SuccessShown(_)) => {
                respond.success("Settings reset to defaults successfully", Payload::new())
            }
            None => {
                warn!(screen = %respond.screen(), "reset result unclear");
                respond.failure("Save result unclear", Payload::new())
            }
        };
        info!(
            screen = %envelope.screen(),
            success = envelope.success(),
            "reset to defaults finished"
        );
        Ok(envelope)
    }

    /// Cancel pending changes
    ///
    /// Done when the URL leaves the settings path or the save button is
    /// present and disabled (medium tier).
    ///
    /// # Errors
    ///
    /// Returns a timeout if neither happens
    pub async fn cancel_changes(&self) -> FlowResult<OutcomeEnvelope> {
        self.ctx.click(CANCEL_BUTTON, "cancel button").await?;

        let driver = self.ctx.driver();
        let save = self.ctx.selector(SAVE_BUTTON)?;
        let settings_path = self.ctx.screen().path();
        self.ctx
            .confirm("settings cancellation", TimeoutTier::Medium, move || async move {
                if !driver.current_url().await?.contains(settings_path) {
                    return Ok(true);
                }
                Ok::<_, DriverError>(probe::disabled(driver, save).await?)
            })
            .await?;

        info!(screen = %self.ctx.screen().name, "changes cancelled");
        Ok(self
            .ctx
            .respond()
            .success("Changes cancelled successfully", Payload::new()))
    }
}

fn note_format(applied: &mut Applied, field: &str, check: FieldCheck) {
    if let Some(warning) = check.warning() {
        warn!(field, "{warning}");
        applied.warnings.push(warning.to_string());
    }
}

fn warnings_payload(applied: &Applied) -> Payload {
    if applied.warnings.is_empty() {
        Payload::new()
    } else {
        Payload::new().with("formatWarnings", &applied.warnings)
    }
}

async fn read_validation_errors<D: UiDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
) -> Result<Vec<ValidationError>, DriverError> {
    let mut errors = Vec::new();
    for handle in driver.locate_all(selector).await? {
        if let Some(error) = read_validation_error(driver, &handle).await? {
            errors.push(error);
        }
    }
    Ok(errors)
}

async fn read_validation_error<D: UiDriver + ?Sized>(
    driver: &D,
    handle: &ElementHandle,
) -> Result<Option<ValidationError>, DriverError> {
    if absent_as_none(driver.is_visible(handle).await)? != Some(true) {
        return Ok(None);
    }
    let Some(message) = absent_as_none(driver.read_text(handle).await)? else {
        return Ok(None);
    };
    let field = absent_as_none(driver.read_attribute(handle, "data-field").await)?.flatten();
    Ok(Some(ValidationError { field, message }))
}
