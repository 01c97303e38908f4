//! Render workflow.
//!
//! Rendering is the one long-running action: the loading cycle and the
//! error/success race share one render budget, measured from the click. The
//! budget defaults to the render tier and can be overridden per flow.

use super::{ScreenContext, ERROR_MESSAGE, SUCCESS_MESSAGE};
use crate::config::TimeoutTier;
use crate::driver::{DriverError, UiDriver};
use crate::envelope::{OutcomeEnvelope, Payload};
use crate::interaction::Verify;
use crate::probe;
use crate::result::FlowResult;
use crate::screen::ScreenDescriptor;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const RESOLUTION_DROPDOWN: &str = "resolution_dropdown";
const FRAME_RATE_INPUT: &str = "frame_rate_input";
const RENDER_BUTTON: &str = "render_button";
const CANCEL_BUTTON: &str = "cancel_button";

/// Render parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Resolution label as shown in the dropdown
    pub resolution: String,
    /// Frames per second
    pub frame_rate: u32,
}

impl RenderOptions {
    /// Create render options
    #[must_use]
    pub fn new(resolution: impl Into<String>, frame_rate: u32) -> Self {
        Self {
            resolution: resolution.into(),
            frame_rate,
        }
    }
}

#[derive(Debug)]
enum RenderSignal {
    Error(String),
    SuccessShown(String),
}

/// Render settings workflow
pub struct RenderFlow<'a, D: UiDriver> {
    ctx: ScreenContext<'a, D>,
    render_timeout: Duration,
}

impl<D: UiDriver> std::fmt::Debug for RenderFlow<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderFlow")
            .field("screen", &self.ctx.screen().name)
            .field("render_timeout", &self.render_timeout)
            .finish_non_exhaustive()
    }
}

impl<'a, D: UiDriver> RenderFlow<'a, D> {
    /// Bind the workflow to a screen
    #[must_use]
    pub fn new(session: &'a Session<D>, screen: ScreenDescriptor) -> Self {
        let render_timeout = session.timeouts().tier(TimeoutTier::Render);
        Self {
            ctx: ScreenContext::new(session, screen),
            render_timeout,
        }
    }

    /// Override the render timeout
    #[must_use]
    pub const fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Effective render timeout
    #[must_use]
    pub const fn render_timeout(&self) -> Duration {
        self.render_timeout
    }

    /// Screen this workflow drives
    #[must_use]
    pub const fn screen(&self) -> &ScreenDescriptor {
        self.ctx.screen()
    }

    /// Navigate to the render screen and wait until it is usable
    ///
    /// # Errors
    ///
    /// Returns navigation faults or timeouts
    pub async fn open(&self) -> FlowResult<OutcomeEnvelope> {
        self.ctx.session().open(self.ctx.screen()).await
    }

    /// Set options, start the render, and report the outcome
    ///
    /// The loading cycle and the result race together get at most the render
    /// timeout, counted from the render click.
    ///
    /// # Errors
    ///
    /// Returns action failures, probe faults, or a timeout while the loading
    /// indicator is still up at the render timeout
    pub async fn render(&self, options: &RenderOptions) -> FlowResult<OutcomeEnvelope> {
        let guard = self.ctx.guard();
        guard
            .select_option(
                self.ctx.selector(RESOLUTION_DROPDOWN)?,
                "resolution dropdown",
                &options.resolution,
            )
            .await?;
        self.ctx
            .enter(
                FRAME_RATE_INPUT,
                "frame rate input",
                &options.frame_rate.to_string(),
                Verify::ReadBack,
            )
            .await?;

        debug!(
            resolution = %options.resolution,
            frame_rate = options.frame_rate,
            timeout_ms = u64::try_from(self.render_timeout.as_millis()).unwrap_or(u64::MAX),
            "starting render"
        );
        let started = Instant::now();
        self.ctx.click(RENDER_BUTTON, "render button").await?;
        let settled = self.ctx.settle_after_action(self.render_timeout).await?;
        let remaining = self.render_timeout.saturating_sub(started.elapsed());
        debug!(
            busy = settled.was_busy(),
            remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            "render loading cycle finished"
        );

        let driver = self.ctx.driver();
        let error = self.ctx.selector(ERROR_MESSAGE)?;
        let success = self.ctx.selector(SUCCESS_MESSAGE)?;
        let signal = self
            .ctx
            .race("render result", remaining, move || async move {
                if let Some(text) = probe::visible_text(driver, error).await? {
                    return Ok(Some(RenderSignal::Error(text)));
                }
                let shown = probe::visible_text(driver, success).await?;
                Ok::<_, DriverError>(shown.map(RenderSignal::SuccessShown))
            })
            .await?;

        let respond = self.ctx.respond();
        let payload = Payload::new()
            .with("resolution", &options.resolution)
            .with("frameRate", options.frame_rate);
        let envelope = match signal {
            Some(RenderSignal::Error(text)) => respond.failure(text, payload),
            Some(RenderSignal::SuccessShown(text)) => respond.success(text, payload),
            None => {
                warn!(screen = %respond.screen(), "render result unclear");
                respond.failure("Render result unclear", payload)
            }
        };
        info!(
            screen = %envelope.screen(),
            success = envelope.success(),
            message = %envelope.message(),
            "render finished"
        );
        Ok(envelope)
    }

    /// Cancel a running render
    ///
    /// # Errors
    ///
    /// Returns an action failure, or a timeout if the loading indicator stays up
    pub async fn cancel_render(&self) -> FlowResult<OutcomeEnvelope> {
        self.ctx.click(CANCEL_BUTTON, "cancel button").await?;
        let _ = self.ctx.settle().await?;
        info!(screen = %self.ctx.screen().name, "render cancelled");
        Ok(self
            .ctx
            .respond()
            .success("Render cancelled successfully.", Payload::new()))
    }
}
