//! Flow configuration
//!
//! Loaded from YAML; every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```yaml
//! origin: https://staging.example.com
//! timeouts:
//!   short_ms: 2000
//!   render_ms: 300000
//! log_filter: panelflow=debug
//! ```

use crate::result::{FlowError, FlowResult};
use crate::screen::{catalog, ScreenDescriptor};
use crate::wait::{WaitSpec, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Default application origin
pub const DEFAULT_ORIGIN: &str = "https://app.example.com";

/// Named timeout budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeoutTier {
    /// Opportunistic reads and quick confirmations
    Short,
    /// Element interactability and screen readiness
    Medium,
    /// Outcome races after a submit
    Long,
    /// Render job outcome races
    Render,
}

/// Timeout tiers in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Short tier (default 3s)
    pub short_ms: u64,
    /// Medium tier (default 10s)
    pub medium_ms: u64,
    /// Long tier (default 30s)
    pub long_ms: u64,
    /// Render tier (default 120s)
    pub render_ms: u64,
    /// Interval between probe evaluations (default 250ms)
    pub poll_interval_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            short_ms: 3_000,
            medium_ms: 10_000,
            long_ms: 30_000,
            render_ms: 120_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl TimeoutConfig {
    /// Budget of a tier
    #[must_use]
    pub const fn tier(&self, tier: TimeoutTier) -> Duration {
        Duration::from_millis(match tier {
            TimeoutTier::Short => self.short_ms,
            TimeoutTier::Medium => self.medium_ms,
            TimeoutTier::Long => self.long_ms,
            TimeoutTier::Render => self.render_ms,
        })
    }

    /// Polling interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Wait spec for a tier
    #[must_use]
    pub fn spec(&self, described_by: impl Into<String>, tier: TimeoutTier) -> WaitSpec {
        self.spec_for(described_by, self.tier(tier))
    }

    /// Wait spec with an explicit budget
    #[must_use]
    pub fn spec_for(&self, described_by: impl Into<String>, timeout: Duration) -> WaitSpec {
        WaitSpec::new(described_by)
            .with_timeout(timeout)
            .with_poll_interval(self.poll_interval())
    }

    /// Check tier ordering and interval
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] on a zero interval or misordered tiers
    pub fn validate(&self) -> FlowResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(FlowError::config("poll_interval_ms must be greater than 0"));
        }
        let ordered = self.short_ms <= self.medium_ms
            && self.medium_ms <= self.long_ms
            && self.long_ms <= self.render_ms;
        if !ordered {
            return Err(FlowError::config(format!(
                "timeouts must satisfy short <= medium <= long <= render \
                 (got {} / {} / {} / {})",
                self.short_ms, self.medium_ms, self.long_ms, self.render_ms
            )));
        }
        Ok(())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Scheme and host the built-in screens are rooted at
    pub origin: String,
    /// Timeout tiers
    pub timeouts: TimeoutConfig,
    /// Default `tracing` filter directive
    pub log_filter: String,
    /// Screen descriptors overriding the built-in catalog, by id
    pub screens: BTreeMap<String, ScreenDescriptor>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            timeouts: TimeoutConfig::default(),
            log_filter: "panelflow=info".to_string(),
            screens: BTreeMap::new(),
        }
    }
}

impl FlowConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set origin
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set timeout tiers
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Parse and validate YAML
    ///
    /// # Errors
    ///
    /// Returns YAML or validation errors
    pub fn from_yaml_str(yaml: &str) -> FlowResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    ///
    /// # Errors
    ///
    /// Returns I/O, YAML or validation errors
    pub fn from_yaml_file(path: impl AsRef<Path>) -> FlowResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Validate timeouts, origin and screen overrides
    ///
    /// # Errors
    ///
    /// Returns the first problem found
    pub fn validate(&self) -> FlowResult<()> {
        if !(self.origin.starts_with("http://") || self.origin.starts_with("https://")) {
            return Err(FlowError::config(format!(
                "origin must be an http(s) URL: {}",
                self.origin
            )));
        }
        self.timeouts.validate()?;
        for screen in self.screens.values() {
            screen.validate()?;
        }
        Ok(())
    }

    /// Screen by id: a configured override, else the built-in descriptor
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] for an unknown id
    pub fn screen(&self, id: &str) -> FlowResult<ScreenDescriptor> {
        if let Some(screen) = self.screens.get(id) {
            return Ok(screen.clone());
        }
        catalog::by_id(id, &self.origin)
            .ok_or_else(|| FlowError::config(format!("unknown screen '{id}'")))
    }
}
