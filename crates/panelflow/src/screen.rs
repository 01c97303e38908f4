//! Screen descriptors.
//!
//! A screen is plain data: a name, a base URL, a table of named selectors,
//! the elements that must be present for the screen to count as complete,
//! and the elements that must be visible before the screen is usable.
//! Workflows look selectors up by key, so a deployment with different markup
//! overrides the table in configuration instead of touching code.

use crate::locator::Selector;
use crate::result::{FlowError, FlowResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locator key of the busy indicator shared by most screens
pub const LOADING_SPINNER: &str = "loading_spinner";

/// An element a screen cannot do without
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredElement {
    /// Human-readable name (reported when missing)
    pub name: String,
    /// Key into the screen's locator table
    pub locator: String,
}

impl RequiredElement {
    /// Create a required element entry
    #[must_use]
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }
}

/// Static description of one screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenDescriptor {
    /// Display name, used in envelopes
    pub name: String,
    /// Absolute URL the screen lives at
    pub base_url: String,
    /// Named selectors
    pub locators: BTreeMap<String, Selector>,
    /// Elements checked by presence validation
    #[serde(default)]
    pub required_elements: Vec<RequiredElement>,
    /// Locator keys that must be visible after navigation
    #[serde(default)]
    pub ready_elements: Vec<String>,
}

impl ScreenDescriptor {
    /// Create an empty descriptor
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            locators: BTreeMap::new(),
            required_elements: Vec::new(),
            ready_elements: Vec::new(),
        }
    }

    /// Add a locator
    #[must_use]
    pub fn with_locator(mut self, key: impl Into<String>, selector: Selector) -> Self {
        let _ = self.locators.insert(key.into(), selector);
        self
    }

    /// Add a required element
    #[must_use]
    pub fn with_required(mut self, name: impl Into<String>, locator: impl Into<String>) -> Self {
        self.required_elements.push(RequiredElement::new(name, locator));
        self
    }

    /// Add a ready element
    #[must_use]
    pub fn with_ready(mut self, locator: impl Into<String>) -> Self {
        self.ready_elements.push(locator.into());
        self
    }

    /// Look up a selector by key
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownLocator`] if the key is not defined
    pub fn locator(&self, key: &str) -> FlowResult<&Selector> {
        self.locators
            .get(key)
            .ok_or_else(|| FlowError::UnknownLocator {
                screen: self.name.clone(),
                name: key.to_string(),
            })
    }

    /// Whether the screen defines `key`
    #[must_use]
    pub fn has_locator(&self, key: &str) -> bool {
        self.locators.contains_key(key)
    }

    /// Path component of the base URL (`/` when there is none)
    #[must_use]
    pub fn path(&self) -> &str {
        let after_scheme = self
            .base_url
            .find("://")
            .map_or(0, |i| i + "://".len());
        self.base_url[after_scheme..]
            .find('/')
            .map_or("/", |i| &self.base_url[after_scheme + i..])
    }

    /// Check selectors and key references
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] for malformed data and
    /// [`FlowError::UnknownLocator`] for dangling keys
    pub fn validate(&self) -> FlowResult<()> {
        if self.name.trim().is_empty() {
            return Err(FlowError::config("screen name is empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(FlowError::config(format!(
                "{}: base_url must be an http(s) URL: {}",
                self.name, self.base_url
            )));
        }
        for (key, selector) in &self.locators {
            selector.validate().map_err(|message| {
                FlowError::config(format!("{}: locator '{key}': {message}", self.name))
            })?;
        }
        for key in self
            .required_elements
            .iter()
            .map(|r| r.locator.as_str())
            .chain(self.ready_elements.iter().map(String::as_str))
        {
            let _ = self.locator(key)?;
        }
        Ok(())
    }
}

/// Built-in screen descriptors
pub mod catalog {
    use super::{ScreenDescriptor, LOADING_SPINNER};
    use crate::locator::Selector;

    /// Ids understood by [`by_id`]
    pub const SCREEN_IDS: [&str; 5] = ["login", "logout", "settings", "render", "dashboard"];

    fn url(origin: &str, path: &str) -> String {
        format!("{}{path}", origin.trim_end_matches('/'))
    }

    fn messages(screen: ScreenDescriptor) -> ScreenDescriptor {
        screen
            .with_locator("error_message", Selector::test_id("error-message"))
            .with_locator("success_message", Selector::test_id("success-message"))
            .with_locator(LOADING_SPINNER, Selector::test_id("loading-spinner"))
    }

    /// Descriptor by id
    #[must_use]
    pub fn by_id(id: &str, origin: &str) -> Option<ScreenDescriptor> {
        match id {
            "login" => Some(login(origin)),
            "logout" => Some(logout(origin)),
            "settings" => Some(settings(origin)),
            "render" => Some(render(origin)),
            "dashboard" => Some(dashboard(origin)),
            _ => None,
        }
    }

    /// Login screen
    #[must_use]
    pub fn login(origin: &str) -> ScreenDescriptor {
        messages(ScreenDescriptor::new("Login Panel", url(origin, "/login")))
            .with_locator("panel", Selector::test_id("login-panel"))
            .with_locator("email_input", Selector::test_id("email-input"))
            .with_locator("password_input", Selector::test_id("password-input"))
            .with_locator("login_button", Selector::test_id("login-button"))
            .with_locator(
                "forgot_password_link",
                Selector::test_id("forgot-password-link"),
            )
            .with_required("Email Input", "email_input")
            .with_required("Password Input", "password_input")
            .with_required("Login Button", "login_button")
            .with_required("Forgot Password Link", "forgot_password_link")
            .with_ready("panel")
            .with_ready("email_input")
            .with_ready("password_input")
            .with_ready("login_button")
    }

    /// Logout confirmation screen
    #[must_use]
    pub fn logout(origin: &str) -> ScreenDescriptor {
        messages(ScreenDescriptor::new("Log Out Panel", url(origin, "/logout")))
            .with_locator("panel", Selector::test_id("logout-panel"))
            .with_locator(
                "confirm_logout_button",
                Selector::test_id("confirm-logout-button"),
            )
            .with_locator(
                "cancel_logout_button",
                Selector::test_id("cancel-logout-button"),
            )
            .with_locator("logout_message", Selector::test_id("logout-message"))
            .with_locator("user_info_section", Selector::test_id("user-info-section"))
            .with_locator("user_name", Selector::test_id("user-name"))
            .with_locator("last_login_info", Selector::test_id("last-login-info"))
            .with_locator("session_time_info", Selector::test_id("session-time-info"))
            .with_required("Logout Message", "logout_message")
            .with_required("Confirm Logout Button", "confirm_logout_button")
            .with_required("Cancel Logout Button", "cancel_logout_button")
            .with_ready("panel")
            .with_ready("logout_message")
            .with_ready("confirm_logout_button")
            .with_ready("cancel_logout_button")
    }

    /// Profile and preferences screen
    #[must_use]
    pub fn settings(origin: &str) -> ScreenDescriptor {
        messages(ScreenDescriptor::new("Settings Panel", url(origin, "/settings")))
            .with_locator("panel", Selector::test_id("settings-panel"))
            .with_locator("profile_section", Selector::test_id("profile-section"))
            .with_locator("name_input", Selector::test_id("name-input"))
            .with_locator("email_input", Selector::test_id("email-input"))
            .with_locator("phone_input", Selector::test_id("phone-input"))
            .with_locator("save_button", Selector::test_id("save-button"))
            .with_locator("cancel_button", Selector::test_id("cancel-button"))
            .with_locator("reset_button", Selector::test_id("reset-button"))
            .with_locator(
                "notification_toggle",
                Selector::test_id("notification-toggle"),
            )
            .with_locator("theme_selector", Selector::test_id("theme-selector"))
            .with_locator("language_selector", Selector::test_id("language-selector"))
            .with_locator(
                "validation_errors",
                Selector::test_id_contains("validation-error"),
            )
            .with_required("Profile Section", "profile_section")
            .with_required("Name Input", "name_input")
            .with_required("Email Input", "email_input")
            .with_required("Save Button", "save_button")
            .with_required("Cancel Button", "cancel_button")
            .with_required("Notification Toggle", "notification_toggle")
            .with_ready("panel")
            .with_ready("profile_section")
            .with_ready("name_input")
            .with_ready("email_input")
            .with_ready("save_button")
    }

    /// Render job screen
    #[must_use]
    pub fn render(origin: &str) -> ScreenDescriptor {
        messages(ScreenDescriptor::new(
            "Render Settings Panel",
            url(origin, "/render-settings"),
        ))
        .with_locator("panel", Selector::test_id("render-settings-panel"))
        .with_locator(
            "resolution_dropdown",
            Selector::test_id("resolution-dropdown"),
        )
        .with_locator("frame_rate_input", Selector::test_id("frame-rate-input"))
        .with_locator("render_button", Selector::test_id("render-button"))
        .with_locator("cancel_button", Selector::test_id("cancel-button"))
        .with_required("Render Settings Panel", "panel")
        .with_required("Resolution Dropdown", "resolution_dropdown")
        .with_required("Frame Rate Input", "frame_rate_input")
        .with_required("Render Button", "render_button")
        .with_required("Cancel Button", "cancel_button")
        .with_ready("panel")
    }

    /// Dashboard screen
    #[must_use]
    pub fn dashboard(origin: &str) -> ScreenDescriptor {
        messages(ScreenDescriptor::new(
            "Dashboard Panel",
            url(origin, "/dashboard"),
        ))
        .with_locator("panel", Selector::test_id("dashboard-panel"))
        .with_locator("welcome_message", Selector::test_id("welcome-message"))
        .with_locator("stats_container", Selector::test_id("stats-container"))
        .with_locator("recent_activity", Selector::test_id("recent-activity"))
        .with_locator("quick_actions", Selector::test_id("quick-actions"))
        .with_locator("refresh_button", Selector::test_id("refresh-button"))
        .with_locator("settings_button", Selector::test_id("settings-button"))
        .with_locator("logout_button", Selector::test_id("logout-button"))
        .with_locator("stat_items", Selector::test_id_contains("stat-"))
        .with_locator("activity_items", Selector::test_id_contains("activity-item"))
        .with_locator("action_buttons", Selector::test_id_contains("action-button"))
        .with_required("Welcome Message", "welcome_message")
        .with_required("Stats Container", "stats_container")
        .with_required("Recent Activity", "recent_activity")
        .with_required("Quick Actions", "quick_actions")
        .with_required("Refresh Button", "refresh_button")
        .with_ready("panel")
        .with_ready("welcome_message")
        .with_ready("stats_container")
        .with_ready("refresh_button")
    }
}
