//! The process-wide server context.

use crate::frame::FrameBuffer;
use crate::queue::{CommandQueue, LogQueue};

/// Owner of every process-wide shared resource.
///
/// One `ServerContext` exists per process, wrapped in an `Arc` and injected
/// into each worker and session constructor.  Nothing reaches these queues
/// through global lookup; internal synchronization is confined to each queue
/// object.
#[derive(Debug, Default)]
pub struct ServerContext {
    /// Pending command batches, drained by the single dispatch loop.
    pub commands: CommandQueue,
    /// The most recent captured JPEG frame, served by the video handler.
    pub frames: FrameBuffer,
    /// Log lines destined for connected clients.
    pub logs: LogQueue,
}

impl ServerContext {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_types::CommandBatch;
    use serde_json::json;

    #[tokio::test]
    async fn context_owns_independent_queues() {
        let ctx = ServerContext::new();

        let mut batch = CommandBatch::new();
        batch.push("buzzer", json!(true));
        ctx.commands.push(batch.clone());
        ctx.logs.push("hello".to_string());
        ctx.frames.put(vec![0xFF, 0xD8]);

        assert_eq!(ctx.commands.pop().await, batch);
        assert_eq!(ctx.logs.pop().await, "hello");
        assert!(ctx.frames.has_frame());
    }
}
