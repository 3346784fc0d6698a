//! `rover-middleware` – The plumbing between sessions, workers, and hardware.
//!
//! Routes bytes and batches between producers and consumers without caring
//! about their meaning.
//!
//! # Modules
//!
//! - [`queue`] – [`SharedQueue`], the unbounded FIFO behind the process-wide
//!   command and log queues.
//! - [`frame`] – [`FrameBuffer`], the single-slot overwrite-on-full buffer
//!   the video path uses for "keep only the latest frame" backpressure.
//! - [`context`] – [`ServerContext`], the owner of every process-wide queue,
//!   injected by reference into each worker constructor.
//!
//! [`SharedQueue`]: queue::SharedQueue
//! [`FrameBuffer`]: frame::FrameBuffer
//! [`ServerContext`]: context::ServerContext

pub mod context;
pub mod frame;
pub mod queue;

pub use context::ServerContext;
pub use frame::FrameBuffer;
pub use queue::{CommandQueue, LogQueue, SharedQueue};
