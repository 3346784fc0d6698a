//! `rover-hal` – The hardware capability layer.
//!
//! The rest of the stack never touches a GPIO pin or an I2C bus; it talks to
//! one [`HardwareGateway`] trait object and nothing else.  Device-level
//! timing, pin toggling, and camera pixel capture live behind that boundary.
//!
//! # Modules
//!
//! - [`gateway`] – the [`HardwareGateway`] capability trait: execute one
//!   command, read one status snapshot, capture one JPEG frame.
//! - [`camera`] – the pan/tilt servo pulse model with its clamped range and
//!   center positions.
//! - [`distance`] – ultrasonic echo time → distance conversion and the echo
//!   timeout sentinel.
//! - [`sim`] – [`SimGateway`], a fully simulated gateway with fault injection
//!   so the whole stack and its degradation paths run headless in CI.
//!
//! [`HardwareGateway`]: gateway::HardwareGateway
//! [`SimGateway`]: sim::SimGateway

pub mod camera;
pub mod distance;
pub mod gateway;
pub mod sim;

pub use camera::CameraPosition;
pub use distance::{distance_from_echo, ECHO_TIMEOUT, SPEED_OF_SOUND};
pub use gateway::HardwareGateway;
pub use sim::SimGateway;
