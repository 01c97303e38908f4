//! Outcome envelopes.
//!
//! Every workflow returns exactly one [`OutcomeEnvelope`], built through a
//! [`ResponseBuilder`], so callers can assert on one shape no matter which
//! workflow produced it.
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Login successful",
//!   "screen": "Login Panel",
//!   "timestamp": "2025-01-01T12:00:00Z",
//!   "payload": { "redirectedTo": "https://app.example.com/dashboard" }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// A field-level rejection reported by the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field the error belongs to, from the `data-field` attribute; `None`
    /// when the error element carries no such attribute
    pub field: Option<String>,
    /// Error text
    pub message: String,
}

/// Free-form, workflow-specific envelope data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Create an empty payload
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "payload value not serializable");
            Value::Null
        });
        let _ = self.0.insert(key, value);
        self
    }

    /// Get an entry
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the payload has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Uniform workflow result
///
/// Serializes as `{ success, message, screen, timestamp, payload }`. Extra
/// data such as `redirectedTo` or `validationErrors` sits inside the nested
/// `payload` object (omitted when empty), not spread into the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEnvelope {
    success: bool,
    message: String,
    screen: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Payload::is_empty")]
    payload: Payload,
}

impl OutcomeEnvelope {
    /// Whether the workflow reached its goal
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Outcome message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Originating screen name
    #[must_use]
    pub fn screen(&self) -> &str {
        &self.screen
    }

    /// Construction time
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Workflow-specific data
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Payload entry by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// String payload entry by key
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Validation errors carried in the payload
    #[must_use]
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        self.get("validationErrors")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// Serialize to JSON
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Builds envelopes for one screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBuilder {
    screen: String,
}

impl ResponseBuilder {
    /// Create a builder for `screen`
    #[must_use]
    pub fn new(screen: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
        }
    }

    /// Screen name
    #[must_use]
    pub fn screen(&self) -> &str {
        &self.screen
    }

    /// Build an envelope stamped with the current time
    #[must_use]
    pub fn build(&self, success: bool, message: impl Into<String>, payload: Payload) -> OutcomeEnvelope {
        self.build_at(success, message, payload, Utc::now())
    }

    /// Build an envelope with an explicit timestamp
    #[must_use]
    pub fn build_at(
        &self,
        success: bool,
        message: impl Into<String>,
        payload: Payload,
        timestamp: DateTime<Utc>,
    ) -> OutcomeEnvelope {
        OutcomeEnvelope {
            success,
            message: message.into(),
            screen: self.screen.clone(),
            timestamp,
            payload,
        }
    }

    /// Successful envelope
    #[must_use]
    pub fn success(&self, message: impl Into<String>, payload: Payload) -> OutcomeEnvelope {
        self.build(true, message, payload)
    }

    /// Failed envelope
    #[must_use]
    pub fn failure(&self, message: impl Into<String>, payload: Payload) -> OutcomeEnvelope {
        self.build(false, message, payload)
    }
}

/// Build an envelope for `screen`
#[must_use]
pub fn build(
    success: bool,
    message: impl Into<String>,
    screen: impl Into<String>,
    payload: Payload,
) -> OutcomeEnvelope {
    ResponseBuilder::new(screen).build(success, message, payload)
}
