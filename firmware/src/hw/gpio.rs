//! GPIO-backed buttons, backlight and status LED.

use embassy_stm32::gpio::{Flex, Level, Output, Pull};
use handheld_core::hal::{DecorativeOutput, DigitalInput, Polarity, PowerOutput, Rgb};

/// Front-panel button line. Pull direction follows the requested polarity.
pub struct ButtonPin<'d> {
    pin: Flex<'d>,
}

impl<'d> ButtonPin<'d> {
    pub fn new(pin: Flex<'d>) -> Self {
        Self { pin }
    }
}

impl DigitalInput for ButtonPin<'_> {
    fn configure(&mut self, polarity: Polarity) {
        let pull = match polarity {
            Polarity::ActiveLow => Pull::Up,
            Polarity::ActiveHigh => Pull::Down,
        };
        self.pin.set_as_input(pull);
    }

    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}

/// Backlight enable line: lit for any non-zero level.
pub struct Backlight<'d> {
    enable: Output<'d>,
}

impl<'d> Backlight<'d> {
    pub fn new(enable: Output<'d>) -> Self {
        Self { enable }
    }
}

impl PowerOutput for Backlight<'_> {
    fn set_level(&mut self, level: u8) {
        self.enable.set_level(Level::from(level > 0));
    }
}

/// Single status LED standing in for the decorative strip.
pub struct StatusLed<'d> {
    led: Output<'d>,
}

impl<'d> StatusLed<'d> {
    pub fn new(led: Output<'d>) -> Self {
        Self { led }
    }
}

impl DecorativeOutput for StatusLed<'_> {
    fn set_all(&mut self, color: Rgb) {
        self.led.set_level(Level::from(!color.is_black()));
    }
}
