//! Guarded element interaction.
//!
//! Every act on the page goes through [`InteractionGuard`]: wait until the
//! element can take input, act, then verify the act had the intended effect.
//! A failure at any step becomes an [`ActionFailure`] naming the action, the
//! target and what diverged.
//!
//! ## Toyota Way Application
//!
//! - **Poka-Yoke**: Read-back verification catches input masks and
//!   re-renders that swallow what was typed
//! - **Jidoka**: Divergence stops the workflow instead of being ignored

use crate::config::{TimeoutConfig, TimeoutTier};
use crate::driver::{DriverError, ElementHandle, UiDriver};
use crate::locator::Selector;
use crate::probe::{self, absent_as_none};
use crate::result::{ActionFailure, ActionKind, FlowError, FlowResult};
use crate::wait::ConditionWaiter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// Whether typed text is read back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verify {
    /// Re-read the field value and compare
    #[default]
    ReadBack,
    /// Do not read back (secrets); the text is never logged
    Skip,
}

/// An action together with its verification rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionIntent {
    /// Click; no post-condition
    Click,
    /// Clear and type
    EnterText {
        /// Text to type
        text: String,
        /// Verification rule
        verify: Verify,
    },
    /// Pick a dropdown option by visible label
    SelectOption {
        /// Option label
        label: String,
    },
    /// Flip a toggle; the state must change
    Toggle,
    /// Bring a toggle to a state; no click when already there
    EnsureToggled {
        /// Desired state
        desired: bool,
    },
}

/// What an intent ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The page was acted on
    Acted,
    /// The page already matched the intent
    AlreadySatisfied,
}

/// Wait-act-verify wrapper around a driver
pub struct InteractionGuard<'a, D: UiDriver + ?Sized> {
    driver: &'a D,
    waiter: &'a ConditionWaiter,
    timeouts: &'a TimeoutConfig,
}

impl<D: UiDriver + ?Sized> std::fmt::Debug for InteractionGuard<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionGuard")
            .field("timeouts", self.timeouts)
            .finish_non_exhaustive()
    }
}

impl<'a, D: UiDriver + ?Sized> InteractionGuard<'a, D> {
    /// Create a guard
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

    fn check_selector(selector: &Selector, waited_for: &str) -> FlowResult<()> {
        selector
            .validate()
            .map_err(|message| FlowError::ProbeFailed {
                waited_for: waited_for.to_string(),
                source: DriverError::invalid_selector(selector, message),
            })
    }

    // =========================================================================
    // WAITS
    // =========================================================================

    /// Wait until `selector` matches a displayed element
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Timeout`] or a probe fault
    pub async fn wait_visible(
        &self,
        selector: &Selector,
        name: &str,
        timeout: Duration,
    ) -> FlowResult<ElementHandle> {
        let waited_for = format!("{name} to be visible");
        Self::check_selector(selector, &waited_for)?;
        let spec = self.timeouts.spec_for(waited_for, timeout);
        let driver = self.driver;
        let waited = self
            .waiter
            .until(&spec, move || async move {
                Ok::<_, DriverError>(probe::presence(driver, selector).await?.into_visible())
            })
            .await?;
        Ok(waited.value)
    }

    /// Wait (medium tier) until `selector` is located, displayed and enabled
    ///
    /// # Errors
    ///
    /// - `ElementDisabled` if the element was seen displayed but never enabled
    /// - `ElementNotInteractable` if it was never displayed
    /// - probe faults
    pub async fn wait_interactable(
        &self,
        action: ActionKind,
        selector: &Selector,
        name: &str,
    ) -> FlowResult<ElementHandle> {
        let waited_for = format!("{name} to be interactable");
        Self::check_selector(selector, &waited_for)?;
        let spec = self.timeouts.spec(waited_for, TimeoutTier::Medium);
        let seen_visible = AtomicBool::new(false);
        let seen = &seen_visible;
        let driver = self.driver;

        let result = self
            .waiter
            .until(&spec, move || async move {
                let Some(handle) = probe::presence(driver, selector).await?.into_visible() else {
                    return Ok(None);
                };
                seen.store(true, Ordering::Relaxed);
                let enabled = absent_as_none(driver.is_enabled(&handle).await)?;
                Ok::<_, DriverError>(enabled.filter(|e| *e).map(|_| handle))
            })
            .await;

        match result {
            Ok(waited) => Ok(waited.value),
            Err(FlowError::Timeout { .. }) if seen_visible.load(Ordering::Relaxed) => {
                Err(ActionFailure::disabled(action, name).into())
            }
            Err(err @ FlowError::Timeout { .. }) => {
                Err(ActionFailure::not_interactable(action, name, err.to_string()).into())
            }
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Click a control
    ///
    /// # Errors
    ///
    /// Returns an [`ActionFailure`] or probe fault
    pub async fn click(&self, selector: &Selector, name: &str) -> FlowResult<()> {
        let handle = self
            .wait_interactable(ActionKind::Click, selector, name)
            .await?;
        self.click_element(&handle, name).await
    }

    /// Click an already-located element, re-checking that it is enabled
    ///
    /// # Errors
    ///
    /// Returns `ElementDisabled` or `DriverRejected`
    pub async fn click_element(&self, handle: &ElementHandle, name: &str) -> FlowResult<()> {
        let enabled = self
            .driver
            .is_enabled(handle)
            .await
            .map_err(|e| ActionFailure::rejected(ActionKind::Click, name, &e))?;
        if !enabled {
            return Err(ActionFailure::disabled(ActionKind::Click, name).into());
        }
        self.driver
            .click(handle)
            .await
            .map_err(|e| ActionFailure::rejected(ActionKind::Click, name, &e))?;
        debug!(target_name = name, selector = %handle.selector, "clicked");
        Ok(())
    }

    /// Clear a field and type into it
    ///
    /// # Errors
    ///
    /// Returns `VerificationMismatch` when the read-back value differs
    pub async fn enter_text(
        &self,
        selector: &Selector,
        name: &str,
        text: &str,
        verify: Verify,
    ) -> FlowResult<()> {
        let handle = self
            .wait_interactable(ActionKind::EnterText, selector, name)
            .await?;
        self.driver
            .clear_and_type(&handle, text)
            .await
            .map_err(|e| ActionFailure::rejected(ActionKind::EnterText, name, &e))?;

        if verify == Verify::Skip {
            debug!(target_name = name, text_length = text.len(), "typed (unverified)");
            return Ok(());
        }

        let actual = self
            .driver
            .read_attribute(&handle, "value")
            .await
            .map_err(|e| ActionFailure::rejected(ActionKind::EnterText, name, &e))?
            .unwrap_or_default();
        if actual != text {
            return Err(ActionFailure::verification_mismatch(name, text, actual).into());
        }
        debug!(target_name = name, text, "typed and verified");
        Ok(())
    }

    /// Pick a dropdown option by its visible label
    ///
    /// # Errors
    ///
    /// Returns `SelectionMismatch` when another option ends up selected
    pub async fn select_option(&self, selector: &Selector, name: &str, label: &str) -> FlowResult<()> {
        let handle = self
            .wait_interactable(ActionKind::SelectOption, selector, name)
            .await?;
        let reject = |e: DriverError| ActionFailure::rejected(ActionKind::SelectOption, name, &e);
        self.driver
            .select_by_visible_label(&handle, label)
            .await
            .map_err(reject)?;
        let actual = self
            .driver
            .selected_label(&handle)
            .await
            .map_err(reject)?
            .unwrap_or_default();
        if actual != label {
            return Err(ActionFailure::selection_mismatch(name, label, actual).into());
        }
        debug!(target_name = name, label, "option selected");
        Ok(())
    }

    /// Flip a toggle and wait (short tier) for the new state to show
    ///
    /// Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `ToggleDidNotChange` when the state never flips
    pub async fn toggle(&self, selector: &Selector, name: &str) -> FlowResult<bool> {
        let handle = self
            .wait_interactable(ActionKind::Toggle, selector, name)
            .await?;
        let before = self.read_toggle(&handle, name).await?;
        self.flip(&handle, name, before).await
    }

    /// Bring a toggle to `desired`; zero clicks when it is already there
    ///
    /// # Errors
    ///
    /// Same as [`InteractionGuard::toggle`]
    pub async fn set_toggle(&self, selector: &Selector, name: &str, desired: bool) -> FlowResult<Applied> {
        let handle = self
            .wait_interactable(ActionKind::Toggle, selector, name)
            .await?;
        let current = self.read_toggle(&handle, name).await?;
        if current == desired {
            debug!(target_name = name, state = current, "toggle already in desired state");
            return Ok(Applied::AlreadySatisfied);
        }
        let _ = self.flip(&handle, name, current).await?;
        Ok(Applied::Acted)
    }

    async fn read_toggle(&self, handle: &ElementHandle, name: &str) -> FlowResult<bool> {
        self.driver
            .is_selected(handle)
            .await
            .map_err(|e| ActionFailure::rejected(ActionKind::Toggle, name, &e).into())
    }

    async fn flip(&self, handle: &ElementHandle, name: &str, before: bool) -> FlowResult<bool> {
        self.click_element(handle, name).await.map_err(|err| match err {
            FlowError::Action(mut failure) => {
                failure.action = ActionKind::Toggle;
                FlowError::Action(failure)
            }
            other => other,
        })?;

        let spec = self
            .timeouts
            .spec(format!("{name} to change state"), TimeoutTier::Short);
        let driver = self.driver;
        let changed = self
            .waiter
            .until_true(&spec, move || async move {
                let now = absent_as_none(driver.is_selected(handle).await)?;
                Ok::<_, DriverError>(now.is_some_and(|now| now != before))
            })
            .await;

        match changed {
            Ok(_) => {
                debug!(target_name = name, state = !before, "toggled");
                Ok(!before)
            }
            Err(FlowError::Timeout { .. }) => {
                Err(ActionFailure::toggle_unchanged(name, before).into())
            }
            Err(err) => Err(err),
        }
    }

    /// Dispatch an intent
    ///
    /// # Errors
    ///
    /// Returns the failure of the underlying action
    pub async fn perform(
        &self,
        selector: &Selector,
        name: &str,
        intent: &ActionIntent,
    ) -> FlowResult<Applied> {
        match intent {
            ActionIntent::Click => self.click(selector, name).await?,
            ActionIntent::EnterText { text, verify } => {
                self.enter_text(selector, name, text, *verify).await?;
            }
            ActionIntent::SelectOption { label } => {
                self.select_option(selector, name, label).await?;
            }
            ActionIntent::Toggle => {
                let _ = self.toggle(selector, name).await?;
            }
            ActionIntent::EnsureToggled { desired } => {
                return self.set_toggle(selector, name, *desired).await;
            }
        }
        Ok(Applied::Acted)
    }

    // =========================================================================
    // OPPORTUNISTIC READS
    // =========================================================================

    /// Text of `selector` once displayed, or `None` if it never shows
    ///
    /// # Errors
    ///
    /// Returns probe faults (never a timeout)
    pub async fn read_optional_text(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> FlowResult<Option<String>> {
        let waited_for = format!("text of {selector}");
        Self::check_selector(selector, &waited_for)?;
        let spec = self.timeouts.spec_for(waited_for, timeout);
        let driver = self.driver;
        match self
            .waiter
            .until(&spec, move || probe::visible_text(driver, selector))
            .await
        {
            Ok(waited) => Ok(Some(waited.value)),
            Err(FlowError::Timeout { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Current value of a field, if the field exists
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn read_value(&self, selector: &Selector) -> FlowResult<Option<String>> {
        let Some(handle) = self.driver.locate(selector).await? else {
            return Ok(None);
        };
        Ok(absent_as_none(self.driver.read_attribute(&handle, "value").await)?.flatten())
    }

    /// Toggle state; an absent toggle reads as off
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn is_toggled(&self, selector: &Selector) -> FlowResult<bool> {
        let Some(handle) = self.driver.locate(selector).await? else {
            return Ok(false);
        };
        Ok(absent_as_none(self.driver.is_selected(&handle).await)?.unwrap_or(false))
    }

    /// Selected dropdown label, if the dropdown exists
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn selected_label(&self, selector: &Selector) -> FlowResult<Option<String>> {
        let Some(handle) = self.driver.locate(selector).await? else {
            return Ok(None);
        };
        Ok(absent_as_none(self.driver.selected_label(&handle).await)?.flatten())
    }

    /// Whether `selector` is displayed and enabled right now
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn is_enabled_now(&self, selector: &Selector) -> FlowResult<bool> {
        Ok(probe::enabled(self.driver, selector).await?)
    }

    /// Displayed elements matching `selector`, in document order
    ///
    /// # Errors
    ///
    /// Returns driver faults
    pub async fn visible_elements(&self, selector: &Selector) -> FlowResult<Vec<ElementHandle>> {
        let mut visible = Vec::new();
        for handle in self.driver.locate_all(selector).await? {
            if absent_as_none(self.driver.is_visible(&handle).await)? == Some(true) {
                visible.push(handle);
            }
        }
        Ok(visible)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement, Mutation};
    use crate::result::ActionFailureKind;

    fn field() -> Selector {
        Selector::test_id("phone-input")
    }

    fn toggle() -> Selector {
        Selector::test_id("notification-toggle")
    }

    fn kind(err: &FlowError) -> ActionFailureKind {
        err.action_kind().expect("action failure")
    }

    mod wait_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_disabled_after_visible() {
            let driver = MockDriver::default().with_element(MockElement::new(field()).disabled());
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let err = guard.click(&field(), "phone").await.unwrap_err();
            assert_eq!(kind(&err), ActionFailureKind::ElementDisabled);
        }

        #[tokio::test(start_paused = true)]
        async fn test_never_visible_is_not_interactable() {
            let driver = MockDriver::default().with_element(MockElement::new(field()).hidden());
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let err = guard.click(&field(), "phone").await.unwrap_err();
            assert_eq!(kind(&err), ActionFailureKind::ElementNotInteractable);
            assert!(err.to_string().contains("Timed out after 10000ms"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_malformed_selector_fails_fast() {
            let driver = MockDriver::default();
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let start = tokio::time::Instant::now();
            let err = guard
                .click(&Selector::css("button[type=submit"), "submit")
                .await
                .unwrap_err();
            assert!(matches!(err, FlowError::ProbeFailed { .. }));
            assert_eq!(start.elapsed(), Duration::ZERO);
            assert!(driver.history().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_element_appearing_late_is_clicked() {
            let driver = MockDriver::default();
            driver.schedule(
                Duration::from_millis(700),
                Mutation::Insert(MockElement::new(field())),
            );
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            guard.click(&field(), "phone").await.unwrap();
            assert_eq!(driver.click_count(&field()), 1);
        }
    }

    mod enter_text_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_mask_truncation_is_mismatch() {
            let driver = MockDriver::default()
                .with_element(MockElement::new(field()).with_max_length(6));
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let err = guard
                .enter_text(&field(), "phone", "555-01234", Verify::ReadBack)
                .await
                .unwrap_err();
            let failure = err.action_failure().unwrap();
            assert_eq!(failure.kind, ActionFailureKind::VerificationMismatch);
            assert_eq!(failure.expected.as_deref(), Some("555-01234"));
            assert_eq!(failure.actual.as_deref(), Some("555-01"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_skip_verification() {
            let driver = MockDriver::default()
                .with_element(MockElement::new(field()).with_max_length(3));
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            guard
                .enter_text(&field(), "password", "hunter22", Verify::Skip)
                .await
                .unwrap();
            assert_eq!(guard.read_value(&field()).await.unwrap().as_deref(), Some("hun"));
        }
    }

    mod select_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_locked_dropdown_is_mismatch() {
            let theme = Selector::test_id("theme-selector");
            let driver = MockDriver::default().with_element(
                MockElement::new(theme.clone())
                    .with_options(&["light", "dark"], Some("light"))
                    .locked_selection(),
            );
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let err = guard.select_option(&theme, "theme", "dark").await.unwrap_err();
            let failure = err.action_failure().unwrap();
            assert_eq!(failure.kind, ActionFailureKind::SelectionMismatch);
            assert_eq!(failure.actual.as_deref(), Some("light"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_unknown_option_is_rejected() {
            let theme = Selector::test_id("theme-selector");
            let driver = MockDriver::default()
                .with_element(MockElement::new(theme.clone()).with_options(&["light"], None));
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let err = guard.select_option(&theme, "theme", "sepia").await.unwrap_err();
            assert_eq!(kind(&err), ActionFailureKind::DriverRejected);
        }
    }

    mod toggle_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_set_toggle_is_idempotent() {
            let driver =
                MockDriver::default().with_element(MockElement::new(toggle()).checkbox(false));
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);

            assert_eq!(
                guard.set_toggle(&toggle(), "notifications", true).await.unwrap(),
                Applied::Acted
            );
            assert_eq!(
                guard.set_toggle(&toggle(), "notifications", true).await.unwrap(),
                Applied::AlreadySatisfied
            );
            assert_eq!(driver.click_count(&toggle()), 1);
            assert!(guard.is_toggled(&toggle()).await.unwrap());
        }

        #[tokio::test(start_paused = true)]
        async fn test_stuck_toggle() {
            let stuck = Selector::test_id("stuck-toggle");
            let mut element = MockElement::new(stuck.clone()).checkbox(true);
            element.checkable = false;
            let driver = MockDriver::default().with_element(element);
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let err = guard.toggle(&stuck, "notifications").await.unwrap_err();
            let failure = err.action_failure().unwrap();
            assert_eq!(failure.kind, ActionFailureKind::ToggleDidNotChange);
            assert_eq!(failure.actual.as_deref(), Some("true"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_slow_toggle_within_short_tier() {
            let slow = Selector::test_id("slow-toggle");
            let mut element = MockElement::new(slow.clone()).checkbox(false);
            element.checkable = false;
            let driver = MockDriver::default().with_element(element).with_reaction(
                slow.clone(),
                Duration::from_millis(600),
                Mutation::SetSelected(slow.clone(), true),
            );
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            assert!(guard.toggle(&slow, "notifications").await.unwrap());
        }

        #[tokio::test(start_paused = true)]
        async fn test_perform_dispatch() {
            let driver =
                MockDriver::default().with_element(MockElement::new(toggle()).checkbox(true));
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let applied = guard
                .perform(&toggle(), "notifications", &ActionIntent::EnsureToggled { desired: true })
                .await
                .unwrap();
            assert_eq!(applied, Applied::AlreadySatisfied);
            let applied = guard
                .perform(&toggle(), "notifications", &ActionIntent::Toggle)
                .await
                .unwrap();
            assert_eq!(applied, Applied::Acted);
            assert!(!guard.is_toggled(&toggle()).await.unwrap());
        }
    }

    mod read_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_read_optional_text_absent_is_none() {
            let driver = MockDriver::default();
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let text = guard
                .read_optional_text(&Selector::test_id("user-name"), Duration::from_secs(3))
                .await
                .unwrap();
            assert!(text.is_none());
        }

        #[tokio::test(start_paused = true)]
        async fn test_read_optional_text_invalid_selector_is_fault() {
            let driver = MockDriver::default();
            let name = Selector::test_id("user-name");
            driver.mark_invalid(name.clone());
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let err = guard
                .read_optional_text(&name, Duration::from_secs(3))
                .await
                .unwrap_err();
            assert!(matches!(err, FlowError::ProbeFailed { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_visible_elements_filters_hidden() {
            let item = Selector::test_id_contains("activity-item");
            let driver = MockDriver::default()
                .with_element(MockElement::new(item.clone()).with_text("a"))
                .with_element(MockElement::new(item.clone()).with_text("b").hidden());
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            assert_eq!(guard.visible_elements(&item).await.unwrap().len(), 1);
            assert!(!guard.is_enabled_now(&Selector::test_id("none")).await.unwrap());
        }

        #[test]
        fn test_guard_debug_shows_timeouts() {
            let driver = MockDriver::default();
            let (waiter, timeouts) = (ConditionWaiter::new(), TimeoutConfig::default());
            let guard = InteractionGuard::new(&driver, &waiter, &timeouts);
            let debug = format!("{guard:?}");
            assert!(debug.starts_with("InteractionGuard"));
            assert!(debug.contains("short_ms"));
        }
    }
}
