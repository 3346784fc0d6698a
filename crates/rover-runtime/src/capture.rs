//! Continuous camera capture into the shared frame buffer.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use rover_hal::HardwareGateway;
use rover_middleware::ServerContext;

/// Default capture cadence.
pub const CAPTURE_PERIOD: Duration = Duration::from_millis(200);

/// Captures one frame per tick into the [`FrameBuffer`], forever.
///
/// The worker never waits for a viewer: an unread frame is simply replaced
/// by the next one.  A capture fault skips the tick and is retried on the
/// next period; it is never fatal to the worker.
///
/// [`FrameBuffer`]: rover_middleware::FrameBuffer
pub struct CaptureWorker {
    gateway: Arc<dyn HardwareGateway>,
    period: Duration,
}

impl CaptureWorker {
    pub fn new(gateway: Arc<dyn HardwareGateway>) -> Self {
        Self {
            gateway,
            period: CAPTURE_PERIOD,
        }
    }

    /// Override the capture cadence (builder-style).
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Capture frames for the lifetime of the process.
    pub async fn run(self, ctx: Arc<ServerContext>) {
        info!(period_ms = self.period.as_millis() as u64, "camera capture loop started");
        ctx.logs.push("Server is capturing camera".to_string());

        let mut ticks = tokio::time::interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            match self.gateway.capture_frame().await {
                Ok(frame) => ctx.frames.put(frame),
                Err(e) => {
                    warn!(error = %e, "camera capture failed; retrying next tick");
                }
            }
        }
    }
}
