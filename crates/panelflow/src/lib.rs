//! Panelflow: synchronization and workflow outcomes for asynchronously-rendering UIs
//!
//! Panelflow drives screens whose elements appear, enable and disappear on
//! their own schedule. Every interaction waits for its precondition, every
//! asynchronous action waits out its loading indicator, and every workflow
//! ends in one [`OutcomeEnvelope`] that tells success from failure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PANELFLOW Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Workflows  │    │ Guard +    │    │ UiDriver   │            │
//! │   │ (login,    │───►│ Loading    │───►│ (browser   │            │
//! │   │ settings…) │    │ Tracker    │    │ or mock)   │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │          │                 │                                    │
//! │          ▼                 ▼                                    │
//! │   ┌────────────┐    ┌────────────┐                              │
//! │   │ Outcome    │    │ Condition  │                              │
//! │   │ Envelope   │    │ Waiter     │                              │
//! │   └────────────┘    └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use panelflow::{FlowConfig, MockDriver, Session};
//!
//! # async fn run() -> panelflow::FlowResult<()> {
//! let session = Session::new(MockDriver::default(), FlowConfig::default());
//! let login = session.login()?;
//! login.open().await?;
//! let outcome = login.perform_login("ada@example.com", "hunter2").await?;
//! println!("{}", outcome.to_json());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod config;
pub mod driver;
pub mod envelope;
pub mod interaction;
pub mod locator;
pub mod probe;
pub mod result;
pub mod screen;
pub mod session;
pub mod settle;
pub mod telemetry;
pub mod validation;
pub mod wait;
pub mod workflows;

pub use config::{FlowConfig, TimeoutConfig, TimeoutTier};
pub use driver::{
    DriverError, DriverResult, ElementHandle, MockDriver, MockElement, Mutation, UiDriver,
};
pub use envelope::{OutcomeEnvelope, Payload, ResponseBuilder, ValidationError};
pub use interaction::{ActionIntent, Applied, InteractionGuard, Verify};
pub use locator::Selector;
pub use result::{ActionFailure, ActionFailureKind, ActionKind, FlowError, FlowResult};
pub use screen::{RequiredElement, ScreenDescriptor};
pub use session::Session;
pub use settle::{LoadingTracker, Settled};
pub use validation::{check_email, check_phone, FieldCheck};
pub use wait::{ConditionWaiter, WaitSpec, Waited};
pub use workflows::{
    Activity, DashboardFlow, LoginFlow, LogoutFlow, ProfileUpdate, RenderFlow, RenderOptions,
    SettingsFlow, UserInfo,
};
