//! Result and error types for Panelflow.
//!
//! Two families live here:
//!
//! - [`FlowError`]: faults. The automation itself broke (a wait expired, a
//!   probe raised, an action did not take effect) and the caller gets an `Err`.
//! - Business outcomes (validation errors, a visible error message, an
//!   ambiguous terminal race) are *not* errors; workflows return them inside an
//!   [`OutcomeEnvelope`](crate::OutcomeEnvelope) with `success = false`.

use crate::driver::DriverError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for Panelflow operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors that can occur while driving a workflow
#[derive(Debug, Error)]
pub enum FlowError {
    /// Deadline passed without the condition ever becoming true
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// What the wait was for
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The probe itself raised instead of answering
    #[error("Probe failed while waiting for {waited_for}: {source}")]
    ProbeFailed {
        /// What the wait was for
        waited_for: String,
        /// Underlying driver error
        #[source]
        source: DriverError,
    },

    /// The wait was aborted through its cancellation token
    #[error("Wait for {waited_for} was cancelled")]
    Cancelled {
        /// What the wait was for
        waited_for: String,
    },

    /// A guarded action failed its pre- or post-condition
    #[error(transparent)]
    Action(#[from] ActionFailure),

    /// Required elements were not displayed on a screen
    #[error("Missing elements in {screen}: {}", .names.join(", "))]
    MissingElements {
        /// Screen name
        screen: String,
        /// Names of the missing elements
        names: Vec<String>,
    },

    /// A workflow asked a screen for a locator it does not define
    #[error("Screen {screen} has no locator named '{name}'")]
    UnknownLocator {
        /// Screen name
        screen: String,
        /// Locator key
        name: String,
    },

    /// Driver call failed outside of a wait or action
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FlowError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Timeouts are retryable by re-invoking the workflow; nothing else is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.is_timeout()
    }

    /// Get the action failure, if this error is one
    #[must_use]
    pub const fn action_failure(&self) -> Option<&ActionFailure> {
        match self {
            Self::Action(failure) => Some(failure),
            _ => None,
        }
    }

    /// Get the action failure kind, if this error is one
    #[must_use]
    pub fn action_kind(&self) -> Option<ActionFailureKind> {
        self.action_failure().map(|f| f.kind)
    }
}

// =============================================================================
// ACTION FAILURES
// =============================================================================

/// The guarded action that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Click a control
    Click,
    /// Clear a field and type into it
    EnterText,
    /// Pick a dropdown option by its visible label
    SelectOption,
    /// Flip a boolean control
    Toggle,
}

impl ActionKind {
    /// Get the action name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::EnterText => "enter_text",
            Self::SelectOption => "select_option",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a guarded action failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionFailureKind {
    /// Element became visible but never enabled
    ElementDisabled,
    /// Element never became located and visible
    ElementNotInteractable,
    /// Field value read back differs from the typed text
    VerificationMismatch,
    /// Selected label read back differs from the requested one
    SelectionMismatch,
    /// Toggle state identical before and after the click
    ToggleDidNotChange,
    /// The driver refused the act itself
    DriverRejected,
}

impl ActionFailureKind {
    /// Get the kind name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ElementDisabled => "element disabled",
            Self::ElementNotInteractable => "element not interactable",
            Self::VerificationMismatch => "verification mismatch",
            Self::SelectionMismatch => "selection mismatch",
            Self::ToggleDidNotChange => "toggle did not change",
            Self::DriverRejected => "driver rejected action",
        }
    }
}

impl fmt::Display for ActionFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform failure shape shared by every guarded action
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Failed to {action} '{target}' ({kind}): {cause}")]
pub struct ActionFailure {
    /// Action that was attempted
    pub action: ActionKind,
    /// Human-readable target name
    pub target: String,
    /// Failure classification
    pub kind: ActionFailureKind,
    /// Intended value, when the action has one
    pub expected: Option<String>,
    /// Observed value, when one was read back
    pub actual: Option<String>,
    /// Underlying cause
    pub cause: String,
}

impl ActionFailure {
    fn new(
        action: ActionKind,
        target: impl Into<String>,
        kind: ActionFailureKind,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            action,
            target: target.into(),
            kind,
            expected: None,
            actual: None,
            cause: cause.into(),
        }
    }

    fn with_values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Element is disabled
    #[must_use]
    pub fn disabled(action: ActionKind, target: impl Into<String>) -> Self {
        let target = target.into();
        let cause = format!("{target} is disabled");
        Self::new(action, target, ActionFailureKind::ElementDisabled, cause)
    }

    /// Interactable wait timed out before the element was displayed
    #[must_use]
    pub fn not_interactable(
        action: ActionKind,
        target: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self::new(
            action,
            target,
            ActionFailureKind::ElementNotInteractable,
            cause,
        )
    }

    /// Typed text was altered by the field
    #[must_use]
    pub fn verification_mismatch(
        target: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let (expected, actual) = (expected.into(), actual.into());
        let cause = format!("Input verification failed. Expected: {expected}, Actual: {actual}");
        Self::new(
            ActionKind::EnterText,
            target,
            ActionFailureKind::VerificationMismatch,
            cause,
        )
        .with_values(expected, actual)
    }

    /// Dropdown ended up on a different option
    #[must_use]
    pub fn selection_mismatch(
        target: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let (expected, actual) = (expected.into(), actual.into());
        let cause = format!("Selection failed. Expected: {expected}, Selected: {actual}");
        Self::new(
            ActionKind::SelectOption,
            target,
            ActionFailureKind::SelectionMismatch,
            cause,
        )
        .with_values(expected, actual)
    }

    /// Toggle reads the same state after the click
    #[must_use]
    pub fn toggle_unchanged(target: impl Into<String>, state: bool) -> Self {
        Self::new(
            ActionKind::Toggle,
            target,
            ActionFailureKind::ToggleDidNotChange,
            format!("state stayed {state} after click"),
        )
        .with_values((!state).to_string(), state.to_string())
    }

    /// Driver refused the act
    #[must_use]
    pub fn rejected(action: ActionKind, target: impl Into<String>, error: &DriverError) -> Self {
        Self::new(action, target, ActionFailureKind::DriverRejected, error.to_string())
    }
}
