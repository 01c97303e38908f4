//! Presence probes.
//!
//! These are the one place where "the element is not there" is decided. A
//! selector matching nothing, or a handle whose element was re-rendered away,
//! is absence and comes back as [`Presence::Absent`] or `false`. Everything
//! else the driver raises (an invalid selector, a dead session) stays an
//! error and fails the surrounding wait as a fault.

use crate::driver::{DriverError, DriverResult, ElementHandle, UiDriver};
use crate::locator::Selector;

/// Tri-state answer to "is it there?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// Nothing matches
    Absent,
    /// Attached but not displayed
    Hidden(ElementHandle),
    /// Attached and displayed
    Visible(ElementHandle),
}

impl Presence {
    /// Whether the element is displayed
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self, Self::Visible(_))
    }

    /// Handle of a displayed element
    #[must_use]
    pub fn into_visible(self) -> Option<ElementHandle> {
        match self {
            Self::Visible(handle) => Some(handle),
            Self::Absent | Self::Hidden(_) => None,
        }
    }
}

/// Turn absence errors into `Ok(None)`
pub(crate) fn absent_as_none<T>(result: DriverResult<T>) -> DriverResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_absence() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Locate `selector` and report whether it is displayed
///
/// # Errors
///
/// Returns driver errors other than absence
pub async fn presence<D: UiDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
) -> DriverResult<Presence> {
    let Some(handle) = absent_as_none(driver.locate(selector).await)?.flatten() else {
        return Ok(Presence::Absent);
    };
    match absent_as_none(driver.is_visible(&handle).await)? {
        None => Ok(Presence::Absent),
        Some(true) => Ok(Presence::Visible(handle)),
        Some(false) => Ok(Presence::Hidden(handle)),
    }
}

/// Whether `selector` matches a displayed element
///
/// # Errors
///
/// Returns driver errors other than absence
pub async fn displayed<D: UiDriver + ?Sized>(driver: &D, selector: &Selector) -> DriverResult<bool> {
    Ok(presence(driver, selector).await?.is_visible())
}

/// Whether `selector` matches a displayed, enabled element
///
/// # Errors
///
/// Returns driver errors other than absence
pub async fn enabled<D: UiDriver + ?Sized>(driver: &D, selector: &Selector) -> DriverResult<bool> {
    let Some(handle) = presence(driver, selector).await?.into_visible() else {
        return Ok(false);
    };
    Ok(absent_as_none(driver.is_enabled(&handle).await)?.unwrap_or(false))
}

/// Whether `selector` matches an element that is present and disabled
///
/// An absent element is not disabled: it may be mid re-render.
///
/// # Errors
///
/// Returns driver errors other than absence
pub async fn disabled<D: UiDriver + ?Sized>(driver: &D, selector: &Selector) -> DriverResult<bool> {
    let Some(handle) = absent_as_none(driver.locate(selector).await)?.flatten() else {
        return Ok(false);
    };
    Ok(absent_as_none(driver.is_enabled(&handle).await)? == Some(false))
}

/// Text of the displayed element matching `selector`, if any
///
/// # Errors
///
/// Returns driver errors other than absence
pub async fn visible_text<D: UiDriver + ?Sized>(
    driver: &D,
    selector: &Selector,
) -> DriverResult<Option<String>> {
    let Some(handle) = presence(driver, selector).await?.into_visible() else {
        return Ok(None);
    };
    absent_as_none(driver.read_text(&handle).await)
}

/// Whether the handle's element is gone from the rendered tree
///
/// # Errors
///
/// Returns driver errors other than absence
pub async fn detached<D: UiDriver + ?Sized>(
    driver: &D,
    handle: &ElementHandle,
) -> DriverResult<bool> {
    match driver.is_attached(handle).await {
        Ok(attached) => Ok(!attached),
        Err(DriverError::StaleElement { .. }) => Ok(true),
        Err(e) => Err(e),
    }
}

/// Whether the current URL contains `fragment`
///
/// # Errors
///
/// Returns driver errors
pub async fn url_contains<D: UiDriver + ?Sized>(driver: &D, fragment: &str) -> DriverResult<bool> {
    Ok(driver.current_url().await?.contains(fragment))
}
