//! Collaborator interfaces consumed by the control core.
//!
//! Every peripheral the control loop touches is reached through one of the
//! traits below so firmware adapters, the host emulator, and unit tests can
//! each supply their own implementation. None of these operations can fail
//! from the core's point of view: adapters that hit a bus error are expected
//! to swallow it and return a neutral reading.

use core::time::Duration;

use crate::animation::{DieFace, ScreenPoint};

/// Monotonic timestamp that supports interval arithmetic.
pub trait MonotonicInstant: Copy {
    /// Returns the saturating duration from `earlier` to `self`.
    fn saturating_duration_since(&self, earlier: Self) -> Duration;
}

/// Source of monotonic timestamps.
pub trait Clock {
    type Instant: MonotonicInstant;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;
}

/// Electrical level that corresponds to a logical "pressed" state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Polarity {
    /// Pressed pulls the line low (pull-up wiring).
    ActiveLow,
    /// Pressed drives the line high (pull-down wiring).
    ActiveHigh,
}

impl Polarity {
    /// Converts a raw electrical level into the logical pressed state.
    pub const fn is_pressed(self, level_high: bool) -> bool {
        match self {
            Polarity::ActiveLow => !level_high,
            Polarity::ActiveHigh => level_high,
        }
    }
}

/// Raw digital input line.
pub trait DigitalInput {
    /// Configures the line for input with the requested polarity.
    ///
    /// Implementations must tolerate repeated calls.
    fn configure(&mut self, polarity: Polarity);

    /// Samples the electrical level of the line.
    fn is_high(&mut self) -> bool;
}

/// Output channel driven by the idle dimmer, typically a display backlight.
pub trait PowerOutput {
    /// Drives the output to `level` (0 = off, 255 = full).
    fn set_level(&mut self, level: u8);
}

/// Three-axis acceleration in device-relative units (g).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Acceleration {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Accelerometer that can be sampled once per tick.
pub trait MotionSensor {
    fn read(&mut self) -> Acceleration;
}

/// Noisy analog input used as an entropy source.
pub trait AnalogNoise {
    fn sample(&mut self) -> u16;
}

/// Display surface that draws die faces.
pub trait Renderer {
    /// Clears the whole display.
    fn clear(&mut self);

    /// Draws `face` with its top-left corner at `origin`.
    fn draw_value_at(&mut self, face: DieFace, origin: ScreenPoint);
}

/// 24-bit colour used by the decorative output.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const PURPLE: Self = Self::new(0x80, 0x00, 0x80);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns `true` when every channel is off.
    pub const fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Decorative light output such as an LED strip.
pub trait DecorativeOutput {
    /// Fills every pixel with `color`.
    fn set_all(&mut self, color: Rgb);
}

/// Bundle of collaborator types that make up one device.
pub trait Board {
    type Clock: Clock;
    type Input: DigitalInput;
    type Backlight: PowerOutput;
    type Motion: MotionSensor;
    type Noise: AnalogNoise;
    type Renderer: Renderer;
    type Decoration: DecorativeOutput;
}

/// Timestamp type produced by a board's clock.
pub type BoardInstant<B> = <<B as Board>::Clock as Clock>::Instant;
