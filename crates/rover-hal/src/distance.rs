//! Ultrasonic distance sensor math.

use std::time::Duration;

use rover_types::DISTANCE_FAULT;

/// Speed of sound in air, meters per second.
pub const SPEED_OF_SOUND: f64 = 343.0;

/// How long the sensor waits for the reflected pulse before giving up and
/// reporting [`DISTANCE_FAULT`].
pub const ECHO_TIMEOUT: Duration = Duration::from_secs(1);

/// Convert an echo round-trip time into a distance in meters.
///
/// The pulse travels to the obstacle and back, so the one-way distance is
/// `round_trip * SPEED_OF_SOUND / 2`.  A round trip at or beyond
/// [`ECHO_TIMEOUT`] means the echo was never detected; the sentinel is
/// returned instead.
pub fn distance_from_echo(round_trip: Duration) -> f64 {
    if round_trip >= ECHO_TIMEOUT {
        return DISTANCE_FAULT;
    }
    round_trip.as_secs_f64() * SPEED_OF_SOUND / 2.0
}
