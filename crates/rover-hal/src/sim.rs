//! In-process simulated hardware gateway for CI/CD testing without a robot.
//!
//! [`SimGateway`] records every actuator command and returns plausible sensor
//! values, so the full Rover stack and its failure-degradation paths run in
//! headless tests.  Faults are injected builder-style:
//!
//! ```rust
//! use std::time::Duration;
//! use rover_hal::SimGateway;
//!
//! let gateway = SimGateway::new()
//!     .with_capture_fault()                       // capture_frame() errors
//!     .with_sensor_delay(Duration::from_secs(2)); // sensor reads time out
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use rover_types::{
    Command, MotorAction, Rgb, RoverError, StatusSnapshot, CPU_LOAD_FAULT, LED_COUNT,
};

use crate::camera::CameraPosition;
use crate::distance::distance_from_echo;
use crate::gateway::HardwareGateway;

/// How long a single sensor read may take before it degrades to its sentinel.
pub const SENSOR_TIMEOUT: Duration = Duration::from_secs(1);

/// Brightness applied when a colour command arrives while the strip is dark.
pub const DEFAULT_ON_BRIGHTNESS: u8 = 50;

/// Exposure time the simulated camera reports, microseconds.
const SIM_EXPOSURE_US: u32 = 33_000;

/// Mutable actuator state recorded by the simulation.
#[derive(Debug, Clone)]
struct SimState {
    motor_action: MotorAction,
    buzzer_on: bool,
    leds: [Rgb; LED_COUNT],
    led_brightness: u8,
    camera: CameraPosition,
    reboot_requests: u32,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            motor_action: MotorAction::Stop,
            buzzer_on: false,
            leds: [Rgb::BLACK; LED_COUNT],
            led_brightness: 0,
            camera: CameraPosition::centered(),
            reboot_requests: 0,
        }
    }
}

/// A fully simulated [`HardwareGateway`].
///
/// Sensor values are deterministic so tests can assert on them; the actuator
/// side records the most recent command per device.  Configure fault
/// injection with the `with_*` methods, then share the gateway behind an
/// `Arc<dyn HardwareGateway>`.
pub struct SimGateway {
    state: Mutex<SimState>,
    frame_counter: AtomicU64,
    capture_fault: bool,
    /// Simulated ultrasonic echo round trip.  At or beyond the echo timeout
    /// the distance read degrades to its sentinel.
    echo_round_trip: Duration,
    /// Extra latency added to every sensor read.
    sensor_delay: Duration,
    cpu_load: f64,
    left_proximity: bool,
    right_proximity: bool,
    line_trackers: Vec<u16>,
}

impl SimGateway {
    /// A healthy simulated robot: 10 ms echo, no sensor latency, no faults.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState::default()),
            frame_counter: AtomicU64::new(0),
            capture_fault: false,
            echo_round_trip: Duration::from_millis(10),
            sensor_delay: Duration::ZERO,
            cpu_load: 0.25,
            left_proximity: false,
            right_proximity: false,
            line_trackers: vec![120, 440, 980, 445, 118],
        }
    }

    /// Make every [`capture_frame`][HardwareGateway::capture_frame] call fail.
    pub fn with_capture_fault(mut self) -> Self {
        self.capture_fault = true;
        self
    }

    /// Set the simulated echo round-trip time.
    pub fn with_echo_round_trip(mut self, round_trip: Duration) -> Self {
        self.echo_round_trip = round_trip;
        self
    }

    /// Add latency to every sensor read.  A delay beyond [`SENSOR_TIMEOUT`]
    /// makes each reading degrade to its sentinel.
    pub fn with_sensor_delay(mut self, delay: Duration) -> Self {
        self.sensor_delay = delay;
        self
    }

    /// Set the simulated proximity sensor states.
    pub fn with_proximity(mut self, left: bool, right: bool) -> Self {
        self.left_proximity = left;
        self.right_proximity = right;
        self
    }

    // -----------------------------------------------------------------------
    // Recorded actuator state, for test assertions
    // -----------------------------------------------------------------------

    pub fn motor_action(&self) -> MotorAction {
        self.state.lock().expect("sim state poisoned").motor_action
    }

    pub fn buzzer_on(&self) -> bool {
        self.state.lock().expect("sim state poisoned").buzzer_on
    }

    pub fn leds(&self) -> [Rgb; LED_COUNT] {
        self.state.lock().expect("sim state poisoned").leds
    }

    pub fn led_brightness(&self) -> u8 {
        self.state.lock().expect("sim state poisoned").led_brightness
    }

    pub fn camera_position(&self) -> CameraPosition {
        self.state.lock().expect("sim state poisoned").camera
    }

    pub fn reboot_requests(&self) -> u32 {
        self.state.lock().expect("sim state poisoned").reboot_requests
    }

    // -----------------------------------------------------------------------
    // Simulated sensor reads (the fan-out side of snapshot)
    // -----------------------------------------------------------------------

    /// Read one sensor value, honouring the injected latency and degrading to
    /// `sentinel` when the read exceeds [`SENSOR_TIMEOUT`].
    async fn read_sensor<T>(&self, value: T, sentinel: T) -> T {
        let delay = self.sensor_delay;
        let read = async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            value
        };
        match tokio::time::timeout(SENSOR_TIMEOUT, read).await {
            Ok(v) => v,
            Err(_) => sentinel,
        }
    }

    async fn read_cpu_load(&self) -> f64 {
        if !self.sensor_delay.is_zero() {
            return self.read_sensor(self.cpu_load, CPU_LOAD_FAULT).await;
        }
        // Real gateways run sensor I/O on the blocking pool; the sim keeps
        // the same shape for the one read that touches the host OS.
        let load = self.cpu_load;
        tokio::task::spawn_blocking(move || load)
            .await
            .unwrap_or(CPU_LOAD_FAULT)
    }

    async fn read_distance(&self) -> f64 {
        // The echo timeout is part of the distance model itself, so the
        // sentinel falls out of the conversion.
        let distance = distance_from_echo(self.echo_round_trip);
        self.read_sensor(distance, rover_types::DISTANCE_FAULT).await
    }
}

impl Default for SimGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HardwareGateway for SimGateway {
    async fn execute(&self, command: Command) -> Result<(), RoverError> {
        debug!(command = ?command, "sim gateway applying command");
        let mut state = self
            .state
            .lock()
            .map_err(|_| RoverError::HardwareFault {
                component: "sim".to_string(),
                details: "state poisoned".to_string(),
            })?;

        match command {
            Command::CameraPan(direction) => state.camera.step_pan(direction),
            Command::CameraTilt(direction) => state.camera.step_tilt(direction),
            Command::CameraCenter => state.camera.center(),
            Command::Reboot => {
                state.reboot_requests += 1;
                info!("sim gateway: reboot requested");
            }
            Command::Motors(action) => state.motor_action = action,
            Command::Buzzer(on) => state.buzzer_on = on,
            Command::LedRgb(leds) => {
                state.leds = leds;
                // A colour change while the strip is dark turns it on.
                if state.led_brightness == 0 {
                    state.led_brightness = DEFAULT_ON_BRIGHTNESS;
                }
            }
            Command::LedBrightness(brightness) => state.led_brightness = brightness,
        }
        Ok(())
    }

    async fn snapshot(&self) -> StatusSnapshot {
        // Fan out every sensor read concurrently, fan the results back into
        // one snapshot.  Each read degrades independently to its sentinel.
        let (cpu_load, distance, left, right, line_trackers) = tokio::join!(
            self.read_cpu_load(),
            self.read_distance(),
            self.read_sensor(self.left_proximity, false),
            self.read_sensor(self.right_proximity, false),
            self.read_sensor(self.line_trackers.clone(), Vec::new()),
        );

        let state = self.state.lock().expect("sim state poisoned");
        StatusSnapshot {
            cpu_load,
            distance_sensor_value: distance,
            left_proximity_value: left,
            right_proximity_value: right,
            line_tracker_values: line_trackers,
            led_brightness: state.led_brightness,
            buzzer_on: state.buzzer_on,
            camera_exposure: SIM_EXPOSURE_US,
        }
    }

    async fn capture_frame(&self) -> Result<Vec<u8>, RoverError> {
        if self.capture_fault {
            return Err(RoverError::HardwareFault {
                component: "camera".to_string(),
                details: "simulated capture fault".to_string(),
            });
        }

        // A minimal JPEG envelope with the frame number embedded in a COM
        // segment, so consecutive frames are distinguishable in tests.
        let n = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        let comment = format!("sim frame {n}");
        let mut jpg = vec![0xFF, 0xD8]; // SOI
        jpg.extend_from_slice(&[0xFF, 0xFE]); // COM marker
        let len = (comment.len() + 2) as u16;
        jpg.extend_from_slice(&len.to_be_bytes());
        jpg.extend_from_slice(comment.as_bytes());
        jpg.extend_from_slice(&[0xFF, 0xD9]); // EOI
        Ok(jpg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_types::{PanDirection, TiltDirection, DISTANCE_FAULT};

    #[tokio::test]
    async fn buzzer_command_is_recorded_and_reported() {
        let gateway = SimGateway::new();
        gateway.execute(Command::Buzzer(true)).await.unwrap();
        assert!(gateway.buzzer_on());
        assert!(gateway.snapshot().await.buzzer_on);
    }

    #[tokio::test]
    async fn motor_command_replaces_previous_action() {
        let gateway = SimGateway::new();
        gateway
            .execute(Command::Motors(MotorAction::MoveForward))
            .await
            .unwrap();
        assert_eq!(gateway.motor_action(), MotorAction::MoveForward);
        gateway.execute(Command::Motors(MotorAction::Stop)).await.unwrap();
        assert_eq!(gateway.motor_action(), MotorAction::Stop);
    }

    #[tokio::test]
    async fn camera_steps_move_the_recorded_position() {
        let gateway = SimGateway::new();
        gateway
            .execute(Command::CameraPan(PanDirection::Left))
            .await
            .unwrap();
        gateway
            .execute(Command::CameraTilt(TiltDirection::Down))
            .await
            .unwrap();
        let pos = gateway.camera_position();
        assert_eq!(pos.pan(), 1600);
        assert_eq!(pos.tilt(), 1700);

        gateway.execute(Command::CameraCenter).await.unwrap();
        assert_eq!(gateway.camera_position(), CameraPosition::centered());
    }

    #[tokio::test]
    async fn led_rgb_on_dark_strip_applies_default_brightness() {
        let gateway = SimGateway::new();
        assert_eq!(gateway.led_brightness(), 0);
        gateway
            .execute(Command::LedRgb([Rgb::new(255, 0, 0); LED_COUNT]))
            .await
            .unwrap();
        assert_eq!(gateway.leds(), [Rgb::new(255, 0, 0); LED_COUNT]);
        assert_eq!(gateway.led_brightness(), DEFAULT_ON_BRIGHTNESS);
    }

    #[tokio::test]
    async fn led_brightness_command_is_explicit() {
        let gateway = SimGateway::new();
        gateway.execute(Command::LedBrightness(200)).await.unwrap();
        assert_eq!(gateway.led_brightness(), 200);
        assert_eq!(gateway.snapshot().await.led_brightness, 200);
    }

    #[tokio::test]
    async fn snapshot_reports_distance_from_echo() {
        let gateway = SimGateway::new().with_echo_round_trip(Duration::from_millis(10));
        let snapshot = gateway.snapshot().await;
        assert!((snapshot.distance_sensor_value - 1.715).abs() < 1e-9);
        assert_eq!(snapshot.line_tracker_values.len(), 5);
        assert!(snapshot.line_tracker_values.iter().all(|&v| v < 1024));
    }

    #[tokio::test]
    async fn echo_timeout_degrades_distance_to_sentinel() {
        let gateway = SimGateway::new().with_echo_round_trip(Duration::from_secs(1));
        let snapshot = gateway.snapshot().await;
        assert_eq!(snapshot.distance_sensor_value, DISTANCE_FAULT);
        // Every other field is still populated.
        assert!(snapshot.cpu_load >= 0.0);
        assert_eq!(snapshot.line_tracker_values.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_sensors_degrade_every_reading_to_its_sentinel() {
        let gateway = SimGateway::new()
            .with_proximity(true, true)
            .with_sensor_delay(Duration::from_secs(5));
        let snapshot = gateway.snapshot().await;
        assert_eq!(snapshot.cpu_load, CPU_LOAD_FAULT);
        assert_eq!(snapshot.distance_sensor_value, DISTANCE_FAULT);
        assert!(!snapshot.left_proximity_value);
        assert!(!snapshot.right_proximity_value);
        assert!(snapshot.line_tracker_values.is_empty());
        // Actuator-side fields do not depend on sensors.
        assert_eq!(snapshot.camera_exposure, SIM_EXPOSURE_US);
    }

    #[tokio::test]
    async fn capture_fault_is_an_error_not_a_panic() {
        let gateway = SimGateway::new().with_capture_fault();
        let err = gateway.capture_frame().await.unwrap_err();
        assert!(err.to_string().contains("camera"));
    }

    #[tokio::test]
    async fn captured_frames_are_jpeg_and_distinct() {
        let gateway = SimGateway::new();
        let a = gateway.capture_frame().await.unwrap();
        let b = gateway.capture_frame().await.unwrap();
        assert_eq!(&a[..2], &[0xFF, 0xD8]);
        assert_eq!(&a[a.len() - 2..], &[0xFF, 0xD9]);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn reboot_is_counted() {
        let gateway = SimGateway::new();
        gateway.execute(Command::Reboot).await.unwrap();
        gateway.execute(Command::Reboot).await.unwrap();
        assert_eq!(gateway.reboot_requests(), 2);
    }
}
