//! Telemetry snapshot and the outbound WebSocket wire envelope.

use serde::{Deserialize, Serialize};

/// In-band sentinel reported when the distance sensor times out waiting for
/// the echo to return.
pub const DISTANCE_FAULT: f64 = -1.0;

/// In-band sentinel reported when the CPU load cannot be read.
pub const CPU_LOAD_FAULT: f64 = -1.0;

/// One immutable reading of everything the frontend's status panel shows.
///
/// Built fresh on each telemetry tick; it has no identity beyond that tick.
/// A hardware read that cannot complete degrades to its sentinel value, so a
/// snapshot always has every field populated and is never partially missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Host CPU load average, or [`CPU_LOAD_FAULT`].
    pub cpu_load: f64,
    /// Ultrasonic distance in meters, or [`DISTANCE_FAULT`].
    pub distance_sensor_value: f64,
    /// Left obstacle sensor; `false` when the read faults.
    pub left_proximity_value: bool,
    /// Right obstacle sensor; `false` when the read faults.
    pub right_proximity_value: bool,
    /// Line-tracker intensities left to right, 10-bit each; empty when the
    /// read faults.
    pub line_tracker_values: Vec<u16>,
    /// Current LED brightness, `0..=255`.
    pub led_brightness: u8,
    /// Whether the buzzer is sounding.
    pub buzzer_on: bool,
    /// Camera exposure time in microseconds; `0` when unavailable.
    pub camera_exposure: u32,
}

impl StatusSnapshot {
    /// The all-faults snapshot: every sensor field at its sentinel.
    pub fn sentinel() -> Self {
        Self {
            cpu_load: CPU_LOAD_FAULT,
            distance_sensor_value: DISTANCE_FAULT,
            left_proximity_value: false,
            right_proximity_value: false,
            line_tracker_values: Vec::new(),
            led_brightness: 0,
            buzzer_on: false,
            camera_exposure: 0,
        }
    }
}

/// One outbound WebSocket text message.
///
/// External tagging gives exactly the wire shape the frontend expects:
/// `{"status": {...}}` and `{"log": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMessage {
    Status(StatusSnapshot),
    Log(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_wire_shape() {
        let msg = ServerMessage::Status(StatusSnapshot::sentinel());
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert!(json.get("status").is_some());
        assert_eq!(json["status"]["distance_sensor_value"], DISTANCE_FAULT);
        assert_eq!(json["status"]["cpu_load"], CPU_LOAD_FAULT);
    }

    #[test]
    fn log_message_wire_shape() {
        let msg = ServerMessage::Log("Server is capturing camera".to_string());
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"log":"Server is capturing camera"}"#);
    }

    #[test]
    fn snapshot_roundtrip() {
        let snapshot = StatusSnapshot {
            cpu_load: 0.42,
            distance_sensor_value: 1.715,
            left_proximity_value: true,
            right_proximity_value: false,
            line_tracker_values: vec![12, 440, 1023, 3, 800],
            led_brightness: 50,
            buzzer_on: true,
            camera_exposure: 33000,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: StatusSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn sentinel_snapshot_has_every_field_populated() {
        let snapshot = StatusSnapshot::sentinel();
        assert_eq!(snapshot.distance_sensor_value, DISTANCE_FAULT);
        assert!(!snapshot.left_proximity_value);
        assert!(snapshot.line_tracker_values.is_empty());
        assert_eq!(snapshot.camera_exposure, 0);
    }
}
