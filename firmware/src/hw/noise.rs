//! Floating ADC input used as the dice entropy source.

use embassy_stm32::adc::{Adc, AnyAdcChannel, SampleTime};
use embassy_stm32::peripherals::ADC1;
use handheld_core::hal::AnalogNoise;

/// Samples an unconnected analog pin.
pub struct NoiseAdc<'d> {
    adc: Adc<'d, ADC1>,
    channel: AnyAdcChannel<ADC1>,
}

impl<'d> NoiseAdc<'d> {
    /// The shortest sample time keeps the most thermal noise in the low bits.
    pub fn new(mut adc: Adc<'d, ADC1>, channel: AnyAdcChannel<ADC1>) -> Self {
        adc.set_sample_time(SampleTime::CYCLES1_5);
        Self { adc, channel }
    }
}

impl AnalogNoise for NoiseAdc<'_> {
    fn sample(&mut self) -> u16 {
        self.adc.blocking_read(&mut self.channel)
    }
}
