//! Scripted in-memory driver for tests.
//!
//! A [`MockDriver`] holds a flat list of [`MockElement`]s and a URL. Clicks can
//! trigger [`Mutation`]s after a delay, and mutations can be scheduled up
//! front, so asynchronous UI behaviour (a spinner that disappears after 800ms,
//! a toast that appears after a save) is reproduced on tokio's clock. Tests
//! that run with paused time get fully deterministic timing.

use super::{DriverError, DriverResult, ElementHandle, UiDriver};
use crate::locator::Selector;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// A scripted element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Selector this element answers to
    pub selector: Selector,
    /// Visible text
    pub text: String,
    /// Field value
    pub value: String,
    /// Displayed
    pub visible: bool,
    /// Accepts input
    pub enabled: bool,
    /// Checkbox/toggle state
    pub selected: bool,
    /// Clicking flips `selected`
    pub checkable: bool,
    /// Extra attributes
    pub attributes: BTreeMap<String, String>,
    /// Dropdown option labels
    pub options: Vec<String>,
    /// Selected dropdown label
    pub selected_option: Option<String>,
    /// Input mask: typed text is truncated to this many characters
    pub max_length: Option<usize>,
    /// Dropdown ignores selection attempts
    pub locks_selection: bool,
}

impl MockElement {
    /// Create a visible, enabled element
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            text: String::new(),
            value: String::new(),
            visible: true,
            enabled: true,
            selected: false,
            checkable: false,
            attributes: BTreeMap::new(),
            options: Vec::new(),
            selected_option: None,
            max_length: None,
            locks_selection: false,
        }
    }

    /// Set visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set field value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Start hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Start disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Make this a checkbox with the given state
    #[must_use]
    pub const fn checkbox(mut self, selected: bool) -> Self {
        self.checkable = true;
        self.selected = selected;
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Make this a dropdown
    #[must_use]
    pub fn with_options(mut self, options: &[&str], selected: Option<&str>) -> Self {
        self.options = options.iter().map(|o| (*o).to_string()).collect();
        self.selected_option = selected.map(str::to_string);
        self
    }

    /// Truncate typed input
    #[must_use]
    pub const fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Ignore selection attempts
    #[must_use]
    pub const fn locked_selection(mut self) -> Self {
        self.locks_selection = true;
        self
    }
}

/// A change applied to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Display every element matching the selector
    Show(Selector),
    /// Hide every element matching the selector
    Hide(Selector),
    /// Detach every element matching the selector
    Remove(Selector),
    /// Attach a new element
    Insert(MockElement),
    /// Replace the text of matching elements
    SetText(Selector, String),
    /// Enable or disable matching elements
    SetEnabled(Selector, bool),
    /// Set checkbox state of matching elements
    SetSelected(Selector, bool),
    /// Change the current URL
    Navigate(String),
}

#[derive(Debug)]
struct Reaction {
    trigger: Selector,
    delay: Duration,
    mutation: Mutation,
}

#[derive(Debug)]
struct PageState {
    url: String,
    elements: Vec<(String, MockElement)>,
    next_id: u64,
    reactions: Vec<Reaction>,
    pending: Vec<(Instant, Mutation)>,
    invalid: HashSet<Selector>,
    clicks: HashMap<Selector, usize>,
    history: Vec<String>,
}

impl PageState {
    fn new(url: String) -> Self {
        Self {
            url,
            elements: Vec::new(),
            next_id: 0,
            reactions: Vec::new(),
            pending: Vec::new(),
            invalid: HashSet::new(),
            clicks: HashMap::new(),
            history: Vec::new(),
        }
    }

    fn insert(&mut self, element: MockElement) -> String {
        self.next_id += 1;
        let id = format!("mock-{}", self.next_id);
        self.elements.push((id.clone(), element));
        id
    }

    fn apply_due(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let now = Instant::now();
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(at, _)| *at <= now);
        self.pending = rest;
        due.sort_by_key(|(at, _)| *at);
        for (_, mutation) in due {
            self.apply(mutation);
        }
    }

    fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::Show(sel) => self.each_matching(&sel, |el| el.visible = true),
            Mutation::Hide(sel) => self.each_matching(&sel, |el| el.visible = false),
            Mutation::Remove(sel) => self.elements.retain(|(_, el)| el.selector != sel),
            Mutation::Insert(element) => {
                let _ = self.insert(element);
            }
            Mutation::SetText(sel, text) => self.each_matching(&sel, |el| el.text.clone_from(&text)),
            Mutation::SetEnabled(sel, enabled) => {
                self.each_matching(&sel, |el| el.enabled = enabled);
            }
            Mutation::SetSelected(sel, selected) => {
                self.each_matching(&sel, |el| el.selected = selected);
            }
            Mutation::Navigate(url) => self.url = url,
        }
    }

    fn each_matching(&mut self, selector: &Selector, mut f: impl FnMut(&mut MockElement)) {
        for (_, el) in self.elements.iter_mut().filter(|(_, el)| el.selector == *selector) {
            f(el);
        }
    }

    fn check_selector(&self, selector: &Selector) -> DriverResult<()> {
        if self.invalid.contains(selector) {
            return Err(DriverError::invalid_selector(selector, "rejected by driver"));
        }
        selector
            .validate()
            .map_err(|message| DriverError::invalid_selector(selector, message))
    }

    fn get(&self, handle: &ElementHandle) -> DriverResult<&MockElement> {
        self.elements
            .iter()
            .find(|(id, _)| *id == handle.id)
            .map(|(_, el)| el)
            .ok_or_else(|| DriverError::StaleElement {
                id: handle.id.clone(),
            })
    }

    fn get_mut(&mut self, handle: &ElementHandle) -> DriverResult<&mut MockElement> {
        self.elements
            .iter_mut()
            .find(|(id, _)| *id == handle.id)
            .map(|(_, el)| el)
            .ok_or_else(|| DriverError::StaleElement {
                id: handle.id.clone(),
            })
    }

    fn interactable(&mut self, handle: &ElementHandle) -> DriverResult<&mut MockElement> {
        let el = self.get_mut(handle)?;
        if !el.visible || !el.enabled {
            return Err(DriverError::NotInteractable {
                id: handle.id.clone(),
                message: format!("visible={}, enabled={}", el.visible, el.enabled),
            });
        }
        Ok(el)
    }
}

/// Mock driver for unit testing
#[derive(Debug)]
pub struct MockDriver {
    state: Mutex<PageState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl MockDriver {
    /// Create new mock driver at the given URL
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(PageState::new(url.into())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.apply_due();
        state
    }

    /// Add an element (builder form)
    #[must_use]
    pub fn with_element(self, element: MockElement) -> Self {
        let _ = self.add_element(element);
        self
    }

    /// Add an element, returning its handle id
    pub fn add_element(&self, element: MockElement) -> String {
        self.lock().insert(element)
    }

    /// Apply `mutation` `delay` after every click on `trigger` (builder form)
    #[must_use]
    pub fn with_reaction(self, trigger: Selector, delay: Duration, mutation: Mutation) -> Self {
        self.on_click(trigger, delay, mutation);
        self
    }

    /// Apply `mutation` `delay` after every click on `trigger`
    pub fn on_click(&self, trigger: Selector, delay: Duration, mutation: Mutation) {
        self.lock().reactions.push(Reaction {
            trigger,
            delay,
            mutation,
        });
    }

    /// Apply `mutation` once, `delay` from now
    pub fn schedule(&self, delay: Duration, mutation: Mutation) {
        self.lock().pending.push((Instant::now() + delay, mutation));
    }

    /// Apply `mutation` immediately
    pub fn apply(&self, mutation: Mutation) {
        self.lock().apply(mutation);
    }

    /// Make every query with `selector` fail as invalid
    pub fn mark_invalid(&self, selector: Selector) {
        let _ = self.lock().invalid.insert(selector);
    }

    /// Number of clicks delivered to elements matching `selector`
    #[must_use]
    pub fn click_count(&self, selector: &Selector) -> usize {
        self.lock().clicks.get(selector).copied().unwrap_or(0)
    }

    /// First element matching `selector`
    #[must_use]
    pub fn element(&self, selector: &Selector) -> Option<MockElement> {
        self.lock()
            .elements
            .iter()
            .find(|(_, el)| el.selector == *selector)
            .map(|(_, el)| el.clone())
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(prefix))
    }
}

#[async_trait]
impl UiDriver for MockDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.lock();
        state.history.push(format!("navigate:{url}"));
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn locate(&self, selector: &Selector) -> DriverResult<Option<ElementHandle>> {
        let mut state = self.lock();
        state.history.push(format!("locate:{selector}"));
        state.check_selector(selector)?;
        Ok(state
            .elements
            .iter()
            .find(|(_, el)| el.selector == *selector)
            .map(|(id, _)| ElementHandle::new(id.clone(), selector.clone())))
    }

    async fn locate_all(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>> {
        let mut state = self.lock();
        state.history.push(format!("locate_all:{selector}"));
        state.check_selector(selector)?;
        Ok(state
            .elements
            .iter()
            .filter(|(_, el)| el.selector == *selector)
            .map(|(id, _)| ElementHandle::new(id.clone(), selector.clone()))
            .collect())
    }

    async fn is_attached(&self, element: &ElementHandle) -> DriverResult<bool> {
        Ok(self.lock().get(element).is_ok())
    }

    async fn read_text(&self, element: &ElementHandle) -> DriverResult<String> {
        Ok(self.lock().get(element)?.text.clone())
    }

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let state = self.lock();
        let el = state.get(element)?;
        if name == "value" {
            return Ok(Some(el.value.clone()));
        }
        Ok(el.attributes.get(name).cloned())
    }

    async fn is_visible(&self, element: &ElementHandle) -> DriverResult<bool> {
        Ok(self.lock().get(element)?.visible)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        Ok(self.lock().get(element)?.enabled)
    }

    async fn is_selected(&self, element: &ElementHandle) -> DriverResult<bool> {
        Ok(self.lock().get(element)?.selected)
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        let mut state = self.lock();
        let el = state.interactable(element)?;
        if el.checkable {
            el.selected = !el.selected;
        }
        let selector = el.selector.clone();
        state.history.push(format!("click:{selector}"));
        *state.clicks.entry(selector.clone()).or_insert(0) += 1;

        let now = Instant::now();
        let triggered: Vec<_> = state
            .reactions
            .iter()
            .filter(|r| r.trigger == selector)
            .map(|r| (now + r.delay, r.mutation.clone()))
            .collect();
        state.pending.extend(triggered);
        state.apply_due();
        Ok(())
    }

    async fn clear_and_type(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let mut state = self.lock();
        let el = state.interactable(element)?;
        el.value = match el.max_length {
            Some(max) => text.chars().take(max).collect(),
            None => text.to_string(),
        };
        let selector = el.selector.clone();
        state.history.push(format!("type:{selector}"));
        Ok(())
    }

    async fn select_by_visible_label(
        &self,
        element: &ElementHandle,
        label: &str,
    ) -> DriverResult<()> {
        let mut state = self.lock();
        let el = state.interactable(element)?;
        if !el.options.iter().any(|o| o == label) {
            return Err(DriverError::OptionNotFound {
                label: label.to_string(),
            });
        }
        if !el.locks_selection {
            el.selected_option = Some(label.to_string());
        }
        let selector = el.selector.clone();
        state.history.push(format!("select:{selector}:{label}"));
        Ok(())
    }

    async fn selected_label(&self, element: &ElementHandle) -> DriverResult<Option<String>> {
        Ok(self.lock().get(element)?.selected_option.clone())
    }
}
