//! End-to-end workflow scenarios against the scripted mock driver.
//!
//! Every test runs on paused tokio time, so multi-second waits complete
//! instantly and element reactions land at deterministic instants.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use panelflow::{
    FlowConfig, FlowError, MockDriver, MockElement, Mutation, ProfileUpdate, RenderOptions,
    Selector, Session,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const ORIGIN: &str = "https://app.example.com";

fn id(name: &str) -> Selector {
    Selector::test_id(name)
}

fn at(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

fn session(driver: MockDriver) -> Session<MockDriver> {
    Session::new(driver, FlowConfig::default())
}

// =============================================================================
// LOGIN
// =============================================================================

fn login_page() -> MockDriver {
    MockDriver::new(at("/login"))
        .with_element(MockElement::new(id("login-panel")))
        .with_element(MockElement::new(id("email-input")))
        .with_element(MockElement::new(id("password-input")))
        .with_element(MockElement::new(id("login-button")))
}

mod login_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_successful_login_redirects() {
        let driver = login_page()
            .with_element(MockElement::new(id("success-message")).with_text("Login successful").hidden())
            .with_reaction(
                id("login-button"),
                Duration::from_millis(500),
                Mutation::Show(id("success-message")),
            )
            .with_reaction(
                id("login-button"),
                Duration::from_millis(500),
                Mutation::Navigate(at("/dashboard")),
            );
        let session = session(driver);
        let login = session.login().unwrap();

        let outcome = login.perform_login("ada@example.com", "s3cret").await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Login successful");
        assert_eq!(outcome.screen(), "Login Panel");
        assert_eq!(outcome.get_str("redirectedTo"), Some(at("/dashboard").as_str()));
        let driver = session.driver();
        assert_eq!(
            driver.element(&id("email-input")).unwrap().value,
            "ada@example.com"
        );
        assert_eq!(driver.click_count(&id("login-button")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_wins_over_simultaneous_redirect() {
        let driver = login_page()
            .with_reaction(
                id("login-button"),
                Duration::from_millis(300),
                Mutation::Insert(MockElement::new(id("error-message")).with_text("Invalid credentials")),
            )
            .with_reaction(
                id("login-button"),
                Duration::from_millis(300),
                Mutation::Navigate(at("/dashboard")),
            );
        let session = session(driver);

        let outcome = session
            .login()
            .unwrap()
            .perform_login("ada@example.com", "wrong")
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Invalid credentials");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_signal_is_unclear_failure() {
        let session = session(login_page());
        let started = tokio::time::Instant::now();

        let outcome = session
            .login()
            .unwrap()
            .perform_login("ada@example.com", "s3cret")
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Login result unclear");
        assert_eq!(outcome.get_str("redirectedTo"), Some(at("/login").as_str()));
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_login_button_is_action_failure() {
        let driver = MockDriver::new(at("/login"))
            .with_element(MockElement::new(id("email-input")))
            .with_element(MockElement::new(id("password-input")))
            .with_element(MockElement::new(id("login-button")).disabled());
        let session = session(driver);

        let err = session
            .login()
            .unwrap()
            .perform_login("ada@example.com", "s3cret")
            .await
            .unwrap_err();

        let failure = err.action_failure().expect("action failure");
        assert_eq!(failure.target, "login button");
        assert_eq!(session.driver().click_count(&id("login-button")), 0);
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

fn settings_page() -> MockDriver {
    MockDriver::new(at("/settings"))
        .with_element(MockElement::new(id("name-input")).with_value("Ada"))
        .with_element(MockElement::new(id("email-input")).with_value("ada@example.com"))
        .with_element(MockElement::new(id("phone-input")))
        .with_element(MockElement::new(id("notification-toggle")).checkbox(false))
        .with_element(
            MockElement::new(id("theme-selector")).with_options(&["light", "dark"], Some("dark")),
        )
        .with_element(
            MockElement::new(id("language-selector"))
                .with_options(&["English", "Deutsch"], Some("Deutsch")),
        )
        .with_element(MockElement::new(id("save-button")))
        .with_element(MockElement::new(id("cancel-button")))
}

mod settings_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_toggle_already_in_state_is_not_clicked() {
        let driver = settings_page().with_reaction(
            id("save-button"),
            Duration::from_millis(200),
            Mutation::Insert(MockElement::new(id("success-message")).with_text("Settings saved")),
        );
        let session = session(driver);

        let outcome = session
            .settings()
            .unwrap()
            .update_profile(&ProfileUpdate::new().with_notifications(false))
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Settings saved");
        assert_eq!(
            outcome.get("updatedFields"),
            Some(&serde_json::json!(["notifications"]))
        );
        let driver = session.driver();
        assert_eq!(driver.click_count(&id("notification-toggle")), 0);
        assert_eq!(driver.click_count(&id("save-button")), 1);
        assert!(!driver.was_called("type:"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_supplied_fields_are_touched() {
        let driver = settings_page().with_reaction(
            id("save-button"),
            Duration::from_millis(200),
            Mutation::Insert(MockElement::new(id("success-message")).with_text("   ")),
        );
        let session = session(driver);

        let outcome = session
            .settings()
            .unwrap()
            .update_profile(
                &ProfileUpdate::new()
                    .with_phone("+1 (555) 010-2030")
                    .with_notifications(true),
            )
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Profile updated successfully");
        assert!(outcome.get("formatWarnings").is_none());
        let driver = session.driver();
        assert_eq!(driver.click_count(&id("notification-toggle")), 1);
        assert!(driver.element(&id("notification-toggle")).unwrap().selected);
        assert_eq!(driver.element(&id("name-input")).unwrap().value, "Ada");
        assert_eq!(
            driver.element(&id("phone-input")).unwrap().value,
            "+1 (555) 010-2030"
        );
        assert!(!driver.was_called("select:"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_errors_take_precedence() {
        let field_error = |field: &str, text: &str| {
            MockElement::new(Selector::test_id_contains("validation-error"))
                .with_text(text)
                .with_attribute("data-field", field)
                .hidden()
        };
        let driver = settings_page()
            .with_element(field_error("name", "Name is required"))
            .with_element(field_error("email", "Email is invalid"))
            .with_reaction(
                id("save-button"),
                Duration::ZERO,
                Mutation::Show(Selector::test_id_contains("validation-error")),
            );
        driver.mark_invalid(id("error-message"));
        let session = session(driver);

        let outcome = session
            .settings()
            .unwrap()
            .update_profile(&ProfileUpdate::new().with_name("").with_email("not-an-email"))
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Validation errors occurred");
        let errors = outcome.validation_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field.as_deref(), Some("name"));
        assert_eq!(errors[0].message, "Name is required");
        assert_eq!(errors[1].field.as_deref(), Some("email"));
        assert!(outcome.get("formatWarnings").is_some());
        assert!(!session
            .driver()
            .history()
            .iter()
            .any(|call| call == "locate:[data-testid=\"error-message\"]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_errors_win_tie_with_error_message() {
        let driver = settings_page()
            .with_element(
                MockElement::new(Selector::test_id_contains("validation-error"))
                    .with_text("Phone is required")
                    .with_attribute("data-field", "phone")
                    .hidden(),
            )
            .with_element(
                MockElement::new(Selector::test_id_contains("validation-error"))
                    .with_text("Please fix the form")
                    .hidden(),
            )
            .with_element(MockElement::new(id("error-message")).with_text("Save failed").hidden())
            .with_reaction(
                id("save-button"),
                Duration::from_millis(400),
                Mutation::Show(Selector::test_id_contains("validation-error")),
            )
            .with_reaction(
                id("save-button"),
                Duration::from_millis(400),
                Mutation::Show(id("error-message")),
            );
        let session = session(driver);

        let outcome = session
            .settings()
            .unwrap()
            .update_profile(&ProfileUpdate::new().with_notifications(false))
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Validation errors occurred");
        let errors = outcome.validation_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field.as_deref(), Some("phone"));
        assert_eq!(errors[1].field, None);
        assert_eq!(errors[1].message, "Please fix the form");
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_message_is_failure() {
        let driver = settings_page().with_reaction(
            id("save-button"),
            Duration::from_millis(300),
            Mutation::Insert(
                MockElement::new(id("error-message")).with_text("Server rejected the update"),
            ),
        );
        let session = session(driver);

        let outcome = session
            .settings()
            .unwrap()
            .update_profile(&ProfileUpdate::new().with_theme("light"))
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Server rejected the update");
        assert!(outcome.get("updatedFields").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_save_signal_is_unclear_failure() {
        let session = session(settings_page());
        let started = tokio::time::Instant::now();

        let outcome = session
            .settings()
            .unwrap()
            .update_profile(&ProfileUpdate::new().with_language("English"))
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Save result unclear");
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert_eq!(session.driver().click_count(&id("save-button")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_to_defaults_applies_default_profile() {
        let driver = settings_page().with_reaction(
            id("save-button"),
            Duration::from_millis(100),
            Mutation::Insert(MockElement::new(id("success-message")).with_text("Saved")),
        );
        let session = session(driver);

        let outcome = session.settings().unwrap().reset_to_defaults().await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Settings reset to defaults successfully");
        let driver = session.driver();
        assert_eq!(driver.element(&id("name-input")).unwrap().value, "Default User");
        assert_eq!(
            driver.element(&id("theme-selector")).unwrap().selected_option.as_deref(),
            Some("light")
        );
        assert!(driver.element(&id("notification-toggle")).unwrap().selected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_changes_ignores_save_button_mid_rerender() {
        let driver = settings_page()
            .with_reaction(
                id("cancel-button"),
                Duration::from_millis(100),
                Mutation::Remove(id("save-button")),
            )
            .with_reaction(
                id("cancel-button"),
                Duration::from_secs(2),
                Mutation::Insert(MockElement::new(id("save-button")).disabled()),
            );
        let session = session(driver);
        let started = tokio::time::Instant::now();

        let outcome = session.settings().unwrap().cancel_changes().await.unwrap();

        assert!(outcome.success());
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_changes_times_out_when_save_button_vanishes() {
        let driver = settings_page().with_reaction(
            id("cancel-button"),
            Duration::from_millis(100),
            Mutation::Remove(id("save-button")),
        );
        let session = session(driver);

        let err = session.settings().unwrap().cancel_changes().await.unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_changes_waits_for_navigation() {
        let driver = settings_page().with_reaction(
            id("cancel-button"),
            Duration::from_millis(150),
            Mutation::Navigate(at("/dashboard")),
        );
        let session = session(driver);

        let outcome = session.settings().unwrap().cancel_changes().await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Changes cancelled successfully");
    }
}

// =============================================================================
// LOGOUT
// =============================================================================

fn logout_page() -> MockDriver {
    MockDriver::new(at("/logout"))
        .with_element(MockElement::new(id("logout-message")).with_text("Log out of your account?"))
        .with_element(MockElement::new(id("user-name")).with_text("Ada Lovelace"))
        .with_element(MockElement::new(id("confirm-logout-button")))
        .with_element(MockElement::new(id("cancel-logout-button")))
}

mod logout_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_logout_redirects_to_login() {
        let driver = logout_page().with_reaction(
            id("confirm-logout-button"),
            Duration::from_millis(200),
            Mutation::Navigate(at("/login")),
        );
        let session = session(driver);

        let outcome = session.logout().unwrap().perform_logout().await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Logout successful - redirected to login");
        assert_eq!(outcome.screen(), "Log Out Panel");
        assert_eq!(outcome.get_str("redirectedTo"), Some(at("/login").as_str()));
        assert_eq!(
            outcome.get("userInfo"),
            Some(&serde_json::json!({
                "userName": "Ada Lovelace",
                "lastLogin": null,
                "sessionTime": null
            }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_wins_over_simultaneous_auth_redirect() {
        let driver = logout_page()
            .with_reaction(
                id("confirm-logout-button"),
                Duration::from_millis(200),
                Mutation::Insert(MockElement::new(id("error-message")).with_text("Session error")),
            )
            .with_reaction(
                id("confirm-logout-button"),
                Duration::from_millis(200),
                Mutation::Navigate(at("/login")),
            );
        let session = session(driver);

        let outcome = session.logout().unwrap().perform_logout().await.unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Session error");
        assert!(outcome.get("userInfo").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_message_is_failure() {
        let driver = logout_page().with_reaction(
            id("confirm-logout-button"),
            Duration::from_millis(500),
            Mutation::Insert(MockElement::new(id("error-message")).with_text("Logout failed")),
        );
        let session = session(driver);

        let outcome = session.logout().unwrap().perform_logout().await.unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Logout failed");
        assert!(outcome.get("redirectedTo").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_auth_redirect_keeps_waiting_for_success_message() {
        let driver = logout_page()
            .with_reaction(
                id("confirm-logout-button"),
                Duration::from_millis(200),
                Mutation::Navigate(at("/goodbye")),
            )
            .with_reaction(
                id("confirm-logout-button"),
                Duration::from_secs(15),
                Mutation::Insert(MockElement::new(id("success-message")).with_text("Signed out")),
            );
        let session = session(driver);

        let outcome = session.logout().unwrap().perform_logout().await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Signed out");
        assert_eq!(outcome.get_str("redirectedTo"), Some(at("/goodbye").as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_auth_redirect_without_message_is_unclear_at_deadline() {
        let driver = logout_page().with_reaction(
            id("confirm-logout-button"),
            Duration::from_millis(200),
            Mutation::Navigate(at("/goodbye")),
        );
        let session = session(driver);
        let started = tokio::time::Instant::now();

        let outcome = session.logout().unwrap().perform_logout().await.unwrap();

        assert!(!outcome.success());
        assert_eq!(
            outcome.message(),
            "Logout result unclear - no redirect or success message"
        );
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_waits_out_loading_indicator() {
        let driver = logout_page()
            .with_reaction(
                id("confirm-logout-button"),
                Duration::from_millis(100),
                Mutation::Insert(MockElement::new(id("loading-spinner"))),
            )
            .with_reaction(
                id("confirm-logout-button"),
                Duration::from_secs(5),
                Mutation::Remove(id("loading-spinner")),
            )
            .with_reaction(
                id("confirm-logout-button"),
                Duration::from_secs(5),
                Mutation::Insert(MockElement::new(id("success-message")).with_text("Signed out")),
            );
        let session = session(driver);

        let outcome = session.logout().unwrap().perform_logout().await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Signed out");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_logout_returns_to_previous_page() {
        let driver = logout_page().with_reaction(
            id("cancel-logout-button"),
            Duration::from_millis(100),
            Mutation::Navigate(at("/dashboard")),
        );
        let session = session(driver);

        let outcome = session.logout().unwrap().cancel_logout().await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Logout cancelled successfully");
        assert_eq!(outcome.get_str("originalUrl"), Some(at("/logout").as_str()));
        assert_eq!(outcome.get_str("redirectedTo"), Some(at("/dashboard").as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_logout_ignores_buttons_mid_rerender() {
        let driver = logout_page()
            .with_reaction(
                id("cancel-logout-button"),
                Duration::from_millis(100),
                Mutation::Remove(id("confirm-logout-button")),
            )
            .with_reaction(
                id("cancel-logout-button"),
                Duration::from_millis(100),
                Mutation::Remove(id("cancel-logout-button")),
            )
            .with_reaction(
                id("cancel-logout-button"),
                Duration::from_secs(3),
                Mutation::Insert(MockElement::new(id("confirm-logout-button")).disabled()),
            )
            .with_reaction(
                id("cancel-logout-button"),
                Duration::from_secs(3),
                Mutation::Insert(MockElement::new(id("cancel-logout-button")).disabled()),
            );
        let session = session(driver);
        let started = tokio::time::Instant::now();

        let outcome = session.logout().unwrap().cancel_logout().await.unwrap();

        assert!(outcome.success());
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(outcome.get_str("redirectedTo"), Some(at("/logout").as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_logout_times_out_when_nothing_changes() {
        let session = session(logout_page());

        let err = session.logout().unwrap().cancel_logout().await.unwrap_err();

        assert!(err.is_timeout());
    }
}

// =============================================================================
// RENDER
// =============================================================================

fn render_page() -> MockDriver {
    render_page_with(
        Duration::from_secs(45),
        MockElement::new(id("success-message")).with_text("Render complete"),
        Duration::from_secs(45),
    )
}

fn render_page_with(busy_for: Duration, result: MockElement, result_at: Duration) -> MockDriver {
    MockDriver::new(at("/render-settings"))
        .with_element(
            MockElement::new(id("resolution-dropdown"))
                .with_options(&["1280x720", "1920x1080"], Some("1280x720")),
        )
        .with_element(MockElement::new(id("frame-rate-input")))
        .with_element(MockElement::new(id("render-button")))
        .with_element(MockElement::new(id("cancel-button")))
        .with_reaction(
            id("render-button"),
            Duration::from_millis(50),
            Mutation::Insert(MockElement::new(id("loading-spinner"))),
        )
        .with_reaction(
            id("render-button"),
            busy_for,
            Mutation::Remove(id("loading-spinner")),
        )
        .with_reaction(id("render-button"), result_at, Mutation::Insert(result))
}

mod render_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_render_outlasts_long_tier() {
        let session = session(render_page());
        let render = session.render().unwrap();
        assert_eq!(render.render_timeout(), Duration::from_secs(120));

        let outcome = render
            .render(&RenderOptions::new("1920x1080", 60))
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Render complete");
        assert_eq!(outcome.get_str("resolution"), Some("1920x1080"));
        assert_eq!(outcome.get("frameRate"), Some(&serde_json::json!(60)));
        let driver = session.driver();
        assert_eq!(driver.element(&id("frame-rate-input")).unwrap().value, "60");
        assert!(driver.was_called("select:[data-testid=\"resolution-dropdown\"]:1920x1080"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_timeout_override_applies() {
        let session = session(render_page());
        let render = session
            .render()
            .unwrap()
            .with_render_timeout(Duration::from_secs(10));

        let err = render
            .render(&RenderOptions::new("1920x1080", 30))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_error_message_is_failure() {
        let driver = render_page_with(
            Duration::from_secs(20),
            MockElement::new(id("error-message")).with_text("Out of GPU memory"),
            Duration::from_secs(20),
        );
        let session = session(driver);

        let outcome = session
            .render()
            .unwrap()
            .render(&RenderOptions::new("1920x1080", 24))
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Out of GPU memory");
        assert_eq!(outcome.get("frameRate"), Some(&serde_json::json!(24)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_and_race_share_one_budget() {
        let driver = render_page_with(
            Duration::from_secs(45),
            MockElement::new(id("success-message")).with_text("Render complete"),
            Duration::from_secs(100),
        );
        let session = session(driver);
        let render = session
            .render()
            .unwrap()
            .with_render_timeout(Duration::from_secs(60));
        let started = tokio::time::Instant::now();

        let outcome = render
            .render(&RenderOptions::new("1920x1080", 30))
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Render result unclear");
        assert!(started.elapsed() <= Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_resolution_is_selection_failure() {
        let session = session(render_page());

        let err = session
            .render()
            .unwrap()
            .render(&RenderOptions::new("8K", 30))
            .await
            .unwrap_err();

        assert!(err.action_failure().is_some());
        assert_eq!(session.driver().click_count(&id("render-button")), 0);
    }
}

// =============================================================================
// DASHBOARD
// =============================================================================

fn dashboard_page() -> MockDriver {
    let action = |text: &str| MockElement::new(Selector::test_id_contains("action-button")).with_text(text);
    MockDriver::new(at("/dashboard"))
        .with_element(MockElement::new(id("welcome-message")).with_text("Welcome back, Ada"))
        .with_element(MockElement::new(id("stats-container")))
        .with_element(
            MockElement::new(Selector::test_id_contains("stat-"))
                .with_attribute("data-testid", "stat-projects")
                .with_text("12"),
        )
        .with_element(
            MockElement::new(Selector::test_id_contains("stat-"))
                .with_attribute("data-testid", "stat-renders")
                .with_text("3"),
        )
        .with_element(
            MockElement::new(Selector::test_id_contains("activity-item"))
                .with_attribute("data-timestamp", "2026-10-15T09:00:00Z")
                .with_text("Rendered intro.mp4"),
        )
        .with_element(MockElement::new(Selector::test_id_contains("activity-item")).with_text("Logged in"))
        .with_element(MockElement::new(id("recent-activity")))
        .with_element(MockElement::new(id("quick-actions")))
        .with_element(action("New Report"))
        .with_element(action("Export Data"))
        .with_element(MockElement::new(id("refresh-button")))
        .with_element(MockElement::new(id("logout-button")))
}

mod dashboard_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_reads_stats_and_activities() {
        let session = session(dashboard_page());
        let dashboard = session.dashboard().unwrap();

        assert_eq!(dashboard.welcome_message().await.unwrap(), "Welcome back, Ada");
        let stats = dashboard.stats().await.unwrap();
        assert_eq!(stats.get("stat-projects").map(String::as_str), Some("12"));
        assert_eq!(stats.get("stat-renders").map(String::as_str), Some("3"));
        let activities = dashboard.recent_activities().await.unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].timestamp.as_deref(), Some("2026-10-15T09:00:00Z"));
        assert_eq!(activities[1].timestamp, None);
        assert_eq!(dashboard.activity_count().await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_without_message_is_success() {
        let session = session(dashboard_page());

        let outcome = session.dashboard().unwrap().refresh().await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.message(), "Dashboard refreshed successfully");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_error_is_reported() {
        let driver = dashboard_page().with_reaction(
            id("refresh-button"),
            Duration::from_millis(100),
            Mutation::Insert(MockElement::new(id("error-message")).with_text("Service unavailable")),
        );
        let session = session(driver);

        let outcome = session.dashboard().unwrap().refresh().await.unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.message(), "Dashboard refresh failed: Service unavailable");
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_action_matches_label_case_insensitively() {
        let session = session(dashboard_page());
        let dashboard = session.dashboard().unwrap();

        let outcome = dashboard.click_quick_action("export").await.unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.message(), "Quick action 'export' clicked successfully");
        assert_eq!(
            session
                .driver()
                .click_count(&Selector::test_id_contains("action-button")),
            1
        );

        let missing = dashboard.click_quick_action("Import").await.unwrap();
        assert!(!missing.success());
        assert_eq!(
            missing.message(),
            "Quick action button with text 'Import' not found"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_hand_off() {
        let driver = dashboard_page().with_reaction(
            id("logout-button"),
            Duration::from_millis(250),
            Mutation::Navigate(at("/logout")),
        );
        let session = session(driver);

        let outcome = session.dashboard().unwrap().logout().await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.get_str("redirectedTo"), Some(at("/logout").as_str()));
    }
}

// =============================================================================
// DEBUG OUTPUT
// =============================================================================

mod debug_tests {
    use super::*;

    #[test]
    fn test_flows_debug_name_their_screen() {
        let session = session(MockDriver::default());
        assert!(format!("{:?}", session.login().unwrap()).contains("Login Panel"));
        assert!(format!("{:?}", session.logout().unwrap()).contains("Log Out Panel"));
        assert!(format!("{:?}", session.settings().unwrap()).contains("Settings Panel"));
        assert!(format!("{:?}", session.dashboard().unwrap()).contains("Dashboard Panel"));
        let render = format!("{:?}", session.render().unwrap());
        assert!(render.contains("Render Settings Panel"));
        assert!(render.contains("render_timeout"));
    }
}

// =============================================================================
// CANCELLATION
// =============================================================================

mod cancellation_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_pending_race() {
        let token = CancellationToken::new();
        let session = Session::with_cancellation(login_page(), FlowConfig::default(), token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            token.cancel();
        });

        let err = session
            .login()
            .unwrap()
            .perform_login("ada@example.com", "s3cret")
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, FlowError::Cancelled { .. }));
    }
}
