//! UiDriver - Abstract Automation Driver Trait
//!
//! Panelflow never talks to a browser directly. Everything it needs from the
//! automation session is expressed by [`UiDriver`], so a WebDriver client, a
//! CDP client, or the scripted [`MockDriver`] can sit underneath the same
//! workflows.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Workflows ─► InteractionGuard ─► ConditionWaiter ─► UiDriver │
//! │                                                      │        │
//! │                  ┌──────────────┬────────────────────┤        │
//! │                  │ WebDriver    │ CDP client │ MockDriver     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Absence is not an error
//!
//! [`UiDriver::locate`] answers `Ok(None)` when nothing matches. Errors are
//! reserved for things going wrong: a handle whose element was removed
//! ([`DriverError::StaleElement`]), a malformed selector
//! ([`DriverError::InvalidSelector`]), or a broken session.

mod mock;

pub use mock::{MockDriver, MockElement, Mutation};

use crate::locator::Selector;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for driver calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Element handle for DOM interactions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned identifier
    pub id: String,
    /// Selector the element was located with
    pub selector: Selector,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, selector: Selector) -> Self {
        Self {
            id: id.into(),
            selector,
        }
    }
}

/// Errors raised by a driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Nothing matches the selector (for calls that require a match)
    #[error("No element matches {selector}")]
    NoSuchElement {
        /// Selector that matched nothing
        selector: String,
    },

    /// The handle's element has been removed from the page
    #[error("Element {id} is no longer attached to the page")]
    StaleElement {
        /// Handle identifier
        id: String,
    },

    /// The selector can never match anything
    #[error("Invalid selector {selector}: {message}")]
    InvalidSelector {
        /// Offending selector
        selector: String,
        /// Error message
        message: String,
    },

    /// Element cannot receive input right now
    #[error("Element {id} is not interactable: {message}")]
    NotInteractable {
        /// Handle identifier
        id: String,
        /// Error message
        message: String,
    },

    /// Dropdown has no option with the given label
    #[error("Option '{label}' not found")]
    OptionNotFound {
        /// Requested label
        label: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL
        url: String,
        /// Error message
        message: String,
    },

    /// Session or transport failure
    #[error("Driver protocol error: {message}")]
    Protocol {
        /// Error message
        message: String,
    },
}

impl DriverError {
    /// The element is momentarily not there (not yet rendered, or re-rendered).
    ///
    /// Probes turn these into "not yet"; every other error is a fault.
    #[must_use]
    pub const fn is_absence(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. } | Self::StaleElement { .. })
    }

    /// Create an invalid selector error
    #[must_use]
    pub fn invalid_selector(selector: &Selector, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            message: message.into(),
        }
    }
}

/// Capability surface of an automation session
///
/// # Implementations
///
/// - [`MockDriver`] - scripted in-memory page for tests
/// - Adapters over WebDriver or CDP clients live with the caller
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Get current URL
    async fn current_url(&self) -> DriverResult<String>;

    /// Find the first element matching the selector
    async fn locate(&self, selector: &Selector) -> DriverResult<Option<ElementHandle>>;

    /// Find all elements matching the selector
    async fn locate_all(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>>;

    /// Whether the handle's element is still part of the rendered tree
    async fn is_attached(&self, element: &ElementHandle) -> DriverResult<bool>;

    /// Read visible text
    async fn read_text(&self, element: &ElementHandle) -> DriverResult<String>;

    /// Read an attribute (`value` reads the current field value)
    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>>;

    /// Whether the element is displayed
    async fn is_visible(&self, element: &ElementHandle) -> DriverResult<bool>;

    /// Whether the element accepts input
    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool>;

    /// Whether a checkbox/toggle is on
    async fn is_selected(&self, element: &ElementHandle) -> DriverResult<bool>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Clear the field, then type text into it
    async fn clear_and_type(&self, element: &ElementHandle, text: &str) -> DriverResult<()>;

    /// Select a dropdown option by its visible label
    async fn select_by_visible_label(&self, element: &ElementHandle, label: &str)
        -> DriverResult<()>;

    /// Visible label of the selected dropdown option
    async fn selected_label(&self, element: &ElementHandle) -> DriverResult<Option<String>>;
}
