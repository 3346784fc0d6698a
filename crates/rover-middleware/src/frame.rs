//! Single-slot, overwrite-on-full frame buffer.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};

/// Holds zero or one JPEG frames; a new frame always replaces any unread one.
///
/// This is the video path's backpressure policy in type form: the producer
/// never blocks and never queues more than one frame, so a slow or absent
/// viewer costs bounded memory and a fast viewer always gets the freshest
/// frame.  `take` hands each frame to exactly one reader; this is not a
/// broadcast primitive, so concurrent readers split the frame sequence
/// between them.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    slot: Mutex<Option<Vec<u8>>>,
    fresh: Notify,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame`, discarding any unread previous frame.  Non-blocking.
    pub fn put(&self, frame: Vec<u8>) {
        *self.slot.lock().expect("frame slot poisoned") = Some(frame);
        self.fresh.notify_one();
    }

    /// Take the resident frame, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` when the wait times out.
    pub async fn take(&self, timeout: Duration) -> Option<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.fresh.notified();
            if let Some(frame) = self.slot.lock().expect("frame slot poisoned").take() {
                return Some(frame);
            }
            timeout_at(deadline, notified).await.ok()?;
        }
    }

    /// Whether a frame is currently resident.
    pub fn has_frame(&self) -> bool {
        self.slot.lock().expect("frame slot poisoned").is_some()
    }
}
