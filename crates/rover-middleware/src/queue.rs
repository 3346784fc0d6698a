//! Unbounded async FIFO shared between producers and consumers.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;
use tracing::warn;

use rover_types::CommandBatch;

/// Backlog depth at which a push logs a warning.  The queue is deliberately
/// unbounded, so a sustained backlog means the consumer has stalled.
const DEPTH_WARN: usize = 1024;

/// The process-wide queue of pending command batches.  Sessions push,
/// the dispatcher's drain loop pops.
pub type CommandQueue = SharedQueue<CommandBatch>;

/// The process-wide queue of log lines destined for connected clients.
/// Workers push, one log broadcaster per session pops.
pub type LogQueue = SharedQueue<String>;

/// An unbounded multi-producer, multi-consumer FIFO.
///
/// `push` never blocks and never drops: bursts queue rather than being
/// rejected, trading bounded memory for command integrity.  `pop` waits until
/// an item is available; each item is delivered to exactly one popper.
#[derive(Debug, Default)]
pub struct SharedQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Notify,
}

impl<T> SharedQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
        }
    }

    /// Append one item.  Non-blocking; wakes one waiting popper.
    pub fn push(&self, item: T) {
        let depth = {
            let mut items = self.items.lock().expect("queue poisoned");
            items.push_back(item);
            items.len()
        };
        if depth == DEPTH_WARN {
            warn!(depth, "shared queue backlog reached warning threshold");
        }
        self.available.notify_one();
    }

    /// Remove and return the oldest item, waiting for one if the queue is
    /// empty.  The wait has no timeout: a popper whose consumer has already
    /// gone away parks here until the next item arrives.
    pub async fn pop(&self) -> T {
        loop {
            // Register interest before checking, so a push that lands between
            // the check and the await still wakes us.
            let notified = self.available.notified();
            if let Some(item) = self.items.lock().expect("queue poisoned").pop_front() {
                return item;
            }
            notified.await;
        }
    }

    /// Remove and return the oldest item without waiting.
    pub fn try_pop(&self) -> Option<T> {
        self.items.lock().expect("queue poisoned").pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("queue poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().expect("queue poisoned").is_empty()
    }
}
