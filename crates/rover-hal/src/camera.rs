//! Camera pan/tilt servo pulse model.
//!
//! Both servos are positioned by a pulse value clamped to
//! [`PULSE_MIN`]..=[`PULSE_MAX`].  Greater pan value is more left; greater
//! tilt value is more down.  Directional steps move by [`STEP`] per command.

use rover_types::{PanDirection, TiltDirection};

/// Lowest servo pulse either axis accepts.
pub const PULSE_MIN: u16 = 1000;
/// Highest servo pulse either axis accepts.
pub const PULSE_MAX: u16 = 2000;
/// Pan center pulse.
pub const PAN_CENTER: u16 = 1500;
/// Tilt center pulse.
pub const TILT_CENTER: u16 = 1600;
/// Pulse delta applied by one directional step command.
pub const STEP: u16 = 100;

/// Current pan/tilt pulse values of the camera mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraPosition {
    pan: u16,
    tilt: u16,
}

impl CameraPosition {
    /// Both axes at center.
    pub fn centered() -> Self {
        Self {
            pan: PAN_CENTER,
            tilt: TILT_CENTER,
        }
    }

    pub fn pan(&self) -> u16 {
        self.pan
    }

    pub fn tilt(&self) -> u16 {
        self.tilt
    }

    /// Step the pan axis one increment, clamped to the pulse range.
    pub fn step_pan(&mut self, direction: PanDirection) {
        self.pan = clamp(match direction {
            PanDirection::Left => self.pan.saturating_add(STEP),
            PanDirection::Right => self.pan.saturating_sub(STEP),
        });
    }

    /// Step the tilt axis one increment, clamped to the pulse range.
    pub fn step_tilt(&mut self, direction: TiltDirection) {
        self.tilt = clamp(match direction {
            TiltDirection::Up => self.tilt.saturating_sub(STEP),
            TiltDirection::Down => self.tilt.saturating_add(STEP),
        });
    }

    /// Return both axes to center.
    pub fn center(&mut self) {
        *self = Self::centered();
    }
}

impl Default for CameraPosition {
    fn default() -> Self {
        Self::centered()
    }
}

fn clamp(pulse: u16) -> u16 {
    pulse.clamp(PULSE_MIN, PULSE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_position() {
        let pos = CameraPosition::centered();
        assert_eq!(pos.pan(), 1500);
        assert_eq!(pos.tilt(), 1600);
    }

    #[test]
    fn pan_left_increases_and_right_decreases() {
        let mut pos = CameraPosition::centered();
        pos.step_pan(PanDirection::Left);
        assert_eq!(pos.pan(), 1600);
        pos.step_pan(PanDirection::Right);
        pos.step_pan(PanDirection::Right);
        assert_eq!(pos.pan(), 1400);
    }

    #[test]
    fn tilt_up_decreases_and_down_increases() {
        let mut pos = CameraPosition::centered();
        pos.step_tilt(TiltDirection::Up);
        assert_eq!(pos.tilt(), 1500);
        pos.step_tilt(TiltDirection::Down);
        pos.step_tilt(TiltDirection::Down);
        assert_eq!(pos.tilt(), 1700);
    }

    #[test]
    fn steps_clamp_to_pulse_range() {
        let mut pos = CameraPosition::centered();
        for _ in 0..20 {
            pos.step_pan(PanDirection::Left);
            pos.step_tilt(TiltDirection::Up);
        }
        assert_eq!(pos.pan(), PULSE_MAX);
        assert_eq!(pos.tilt(), PULSE_MIN);

        for _ in 0..20 {
            pos.step_pan(PanDirection::Right);
            pos.step_tilt(TiltDirection::Down);
        }
        assert_eq!(pos.pan(), PULSE_MIN);
        assert_eq!(pos.tilt(), PULSE_MAX);
    }

    #[test]
    fn center_resets_both_axes() {
        let mut pos = CameraPosition::centered();
        pos.step_pan(PanDirection::Left);
        pos.step_tilt(TiltDirection::Down);
        pos.center();
        assert_eq!(pos, CameraPosition::centered());
    }
}
