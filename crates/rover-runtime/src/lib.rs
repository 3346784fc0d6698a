//! `rover-runtime` – The process-lifetime workers.
//!
//! Two loops run for as long as the process does, neither individually
//! cancellable:
//!
//! - [`dispatcher`] – [`CommandDispatcher`][dispatcher::CommandDispatcher]:
//!   drains the shared command queue one batch at a time, routes each entry
//!   to its typed [`Command`][rover_types::Command] variant, and applies it
//!   through the [`HardwareGateway`][rover_hal::HardwareGateway].  Slow
//!   actuator moves are spawned as tracked background tasks so the drain
//!   loop never blocks on hardware.
//! - [`capture`] – [`CaptureWorker`][capture::CaptureWorker]: captures a
//!   camera frame every tick into the shared
//!   [`FrameBuffer`][rover_middleware::FrameBuffer], overwriting any unread
//!   frame.

pub mod capture;
pub mod dispatcher;

pub use capture::{CaptureWorker, CAPTURE_PERIOD};
pub use dispatcher::CommandDispatcher;
