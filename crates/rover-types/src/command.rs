//! The closed set of hardware commands and the [`CommandBatch`] decoding of
//! one client message.
//!
//! The frontend submits commands as one JSON object mapping command names to
//! parameters, e.g. `{"motors": "move_forward", "buzzer": true}`.  Document
//! key order is meaningful: it defines processing order within the batch, so
//! `serde_json` is built with `preserve_order` and [`CommandBatch::from_value`]
//! keeps entries exactly as they appeared on the wire.
//!
//! Routing is a two-step affair: a batch entry stays an untyped
//! `(name, parameters)` pair until the dispatcher calls [`Command::parse`],
//! which either produces a fully typed [`Command`] variant, reports the name
//! as unknown (the entry goes to the *unconsumed* set), or rejects the
//! parameters (the entry is faulted and logged, but the batch continues).

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::rgb::{Rgb, RgbInput, LED_COUNT};

// ---------------------------------------------------------------------------
// Command variants
// ---------------------------------------------------------------------------

/// Camera pan step direction.  Greater pulse value is more left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanDirection {
    Left,
    Right,
}

/// Camera tilt step direction.  Greater pulse value is more down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltDirection {
    Up,
    Down,
}

/// Drive-base motion primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorAction {
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
    Stop,
}

/// One fully typed hardware command.
///
/// This is the complete, fixed set of commands the frontend may issue; there
/// is no dynamic or reflective dispatch anywhere behind it.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Step the camera pan servo by one increment.
    CameraPan(PanDirection),
    /// Step the camera tilt servo by one increment.
    CameraTilt(TiltDirection),
    /// Return both camera servos to their center pulse values.
    CameraCenter,
    /// Reboot the host board.
    Reboot,
    /// Drive-base motion.
    Motors(MotorAction),
    /// Buzzer on/off.
    Buzzer(bool),
    /// Set the colour of every LED (already normalized to one value per LED).
    LedRgb([Rgb; LED_COUNT]),
    /// Set the shared LED brightness, `0..=255`.
    LedBrightness(u8),
}

/// Why a `(name, parameters)` entry could not be routed to a handler.
#[derive(Error, Debug)]
pub enum CommandParseError {
    /// The name matches no known command variant.  Such entries are collected
    /// into the dispatcher's unconsumed set rather than treated as failures.
    #[error("unknown command {0:?}")]
    UnknownName(String),

    /// The name is known but the parameters have the wrong shape.  This
    /// faults the single command without aborting its batch.
    #[error("invalid parameters for {name:?}: {details}")]
    InvalidParameters { name: String, details: String },
}

impl Command {
    /// Route one batch entry to its typed variant.
    pub fn parse(name: &str, parameters: &Value) -> Result<Command, CommandParseError> {
        let invalid = |details: String| CommandParseError::InvalidParameters {
            name: name.to_string(),
            details,
        };

        match name {
            "camera_pan" => {
                let direction: PanDirection =
                    serde_json::from_value(parameters.clone()).map_err(|e| invalid(e.to_string()))?;
                Ok(Command::CameraPan(direction))
            }
            "camera_tilt" => {
                let direction: TiltDirection =
                    serde_json::from_value(parameters.clone()).map_err(|e| invalid(e.to_string()))?;
                Ok(Command::CameraTilt(direction))
            }
            // Center and reboot carry no meaningful parameters; whatever the
            // frontend sent alongside them is ignored.
            "camera_center" => Ok(Command::CameraCenter),
            "reboot" => Ok(Command::Reboot),
            "motors" => {
                let action: MotorAction =
                    serde_json::from_value(parameters.clone()).map_err(|e| invalid(e.to_string()))?;
                Ok(Command::Motors(action))
            }
            "buzzer" => {
                let on = parameters
                    .as_bool()
                    .ok_or_else(|| invalid(format!("expected a bool, got {parameters}")))?;
                Ok(Command::Buzzer(on))
            }
            "led_rgb" => {
                let input: RgbInput =
                    serde_json::from_value(parameters.clone()).map_err(|e| invalid(e.to_string()))?;
                let leds = input.normalize().map_err(invalid)?;
                Ok(Command::LedRgb(leds))
            }
            "led_brightness" => {
                let brightness: u8 =
                    serde_json::from_value(parameters.clone()).map_err(|e| invalid(e.to_string()))?;
                Ok(Command::LedBrightness(brightness))
            }
            _ => Err(CommandParseError::UnknownName(name.to_string())),
        }
    }

    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::CameraPan(_) => "camera_pan",
            Command::CameraTilt(_) => "camera_tilt",
            Command::CameraCenter => "camera_center",
            Command::Reboot => "reboot",
            Command::Motors(_) => "motors",
            Command::Buzzer(_) => "buzzer",
            Command::LedRgb(_) => "led_rgb",
            Command::LedBrightness(_) => "led_brightness",
        }
    }

    /// Whether this command drives a slow actuator move that the dispatcher
    /// runs as a tracked background task instead of awaiting inline.
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            Command::CameraPan(_)
                | Command::CameraTilt(_)
                | Command::CameraCenter
                | Command::LedRgb(_)
                | Command::LedBrightness(_)
        )
    }
}

// ---------------------------------------------------------------------------
// CommandBatch
// ---------------------------------------------------------------------------

/// One client-submitted ordered mapping of command name to raw parameters.
///
/// Entries keep the document order of the JSON object they were decoded from;
/// the dispatcher processes them in exactly that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandBatch {
    entries: Vec<(String, Value)>,
}

impl CommandBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a batch from the value of a message's `command` field.
    pub fn from_value(value: &Value) -> Result<Self, crate::RoverError> {
        let object = value.as_object().ok_or_else(|| {
            crate::RoverError::Serialization(format!("command payload is not an object: {value}"))
        })?;
        Ok(Self {
            entries: object
                .iter()
                .map(|(name, parameters)| (name.clone(), parameters.clone()))
                .collect(),
        })
    }

    /// Append one `(name, parameters)` entry.
    pub fn push(&mut self, name: impl Into<String>, parameters: Value) {
        self.entries.push((name.into(), parameters));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.entries.iter()
    }

    /// The entry names in batch order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl IntoIterator for CommandBatch {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
