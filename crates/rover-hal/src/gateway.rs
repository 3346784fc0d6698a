//! The [`HardwareGateway`] capability trait.

use async_trait::async_trait;
use rover_types::{Command, RoverError, StatusSnapshot};

/// Capability interface between the realtime core and physical hardware.
///
/// Implementations own every blocking device access and confine it to the
/// runtime's blocking pool, so callers can await these methods from any
/// server task without stalling the others.
#[async_trait]
pub trait HardwareGateway: Send + Sync {
    /// Apply one command to the hardware.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] when the actuator cannot apply
    /// the command.  Callers log and contain the fault; it never aborts a
    /// batch or a session.
    async fn execute(&self, command: Command) -> Result<(), RoverError>;

    /// Read one fresh [`StatusSnapshot`].
    ///
    /// Never fails: the constituent sensor reads are issued concurrently and
    /// any read that faults or times out degrades to its sentinel value, so
    /// the snapshot always has every field populated.
    async fn snapshot(&self) -> StatusSnapshot;

    /// Capture one JPEG-encoded camera frame.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] when the capture fails.  The
    /// capture worker skips the tick and retries next period.
    async fn capture_frame(&self) -> Result<Vec<u8>, RoverError>;
}
