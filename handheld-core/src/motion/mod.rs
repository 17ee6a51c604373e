//! Threshold gate applied to accelerometer readings.

use crate::hal::Acceleration;

/// Magnitude (g) the X or Y axis must strictly exceed to start a roll.
pub const DEFAULT_MOTION_THRESHOLD: f32 = 2.0;

/// Axis that crossed its threshold.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Per-axis thresholds; `None` leaves an axis unmonitored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotionTrigger {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl MotionTrigger {
    /// Monitors the X and Y axes against the same threshold.
    pub const fn planar(threshold: f32) -> Self {
        Self {
            x: Some(threshold),
            y: Some(threshold),
            z: None,
        }
    }

    /// Returns the first monitored axis whose magnitude strictly exceeds its
    /// threshold.
    pub fn exceeded_axis(&self, reading: Acceleration) -> Option<Axis> {
        [
            (Axis::X, self.x, reading.x),
            (Axis::Y, self.y, reading.y),
            (Axis::Z, self.z, reading.z),
        ]
        .into_iter()
        .find_map(|(axis, threshold, value)| {
            threshold
                .filter(|threshold| value.abs() > *threshold)
                .map(|_| axis)
        })
    }

    pub fn fires(&self, reading: Acceleration) -> bool {
        self.exceeded_axis(reading).is_some()
    }
}

impl Default for MotionTrigger {
    fn default() -> Self {
        Self::planar(DEFAULT_MOTION_THRESHOLD)
    }
}
