//! `rover-types` – Shared vocabulary of the Rover stack.
//!
//! Every other crate speaks in the types defined here:
//!
//! - [`command`] – the closed [`Command`] sum type, one variant per hardware
//!   command the frontend may submit, plus [`CommandBatch`], the ordered
//!   decoding of one client message.
//! - [`rgb`] – RGB triples, the named colour palette, and the boundary
//!   normalization of every accepted LED colour spelling into `[Rgb; 4]`.
//! - [`status`] – the [`StatusSnapshot`] telemetry value with its fault
//!   sentinels, and the [`ServerMessage`] wire envelope.
//!
//! [`Command`]: command::Command
//! [`CommandBatch`]: command::CommandBatch
//! [`StatusSnapshot`]: status::StatusSnapshot
//! [`ServerMessage`]: status::ServerMessage

use thiserror::Error;

pub mod command;
pub mod rgb;
pub mod status;

pub use command::{Command, CommandBatch, CommandParseError, MotorAction, PanDirection, TiltDirection};
pub use rgb::{NamedColor, Rgb, RgbInput, LED_COUNT};
pub use status::{ServerMessage, StatusSnapshot, CPU_LOAD_FAULT, DISTANCE_FAULT};

/// Global error type spanning hardware faults, transport failures, and
/// authorization rejections.
///
/// Faults are contained at the component boundary where they occur; none of
/// these variants is fatal to the process or to any other client session.
#[derive(Error, Debug)]
pub enum RoverError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Permission Denied for scope {scope:?}")]
    Unauthorized { scope: String },

    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}
