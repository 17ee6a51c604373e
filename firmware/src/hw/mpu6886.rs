//! MPU6886 six-axis IMU, accelerometer half only.

use core::fmt;

use embedded_hal::i2c::I2c;
use handheld_core::hal::{Acceleration, MotionSensor};

pub const DEFAULT_ADDRESS: u8 = 0x68;

const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;

/// ACCEL_CONFIG value selecting the ±8 g range.
const ACCEL_FS_8G: u8 = 0x10;
/// Counts per g at ±8 g full scale.
const LSB_PER_G: f32 = 4096.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mpu6886Error {
    Wake,
    Configure,
    Read,
}

impl fmt::Display for Mpu6886Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mpu6886Error::Wake => f.write_str("failed to clear PWR_MGMT_1 sleep bit"),
            Mpu6886Error::Configure => f.write_str("failed to set accelerometer range"),
            Mpu6886Error::Read => f.write_str("failed to read accelerometer registers"),
        }
    }
}

/// Converts the big-endian `ACCEL_[XYZ]OUT` block into g.
pub fn decode_acceleration(raw: [u8; 6]) -> Acceleration {
    let axis = |hi: u8, lo: u8| f32::from(i16::from_be_bytes([hi, lo])) / LSB_PER_G;
    Acceleration::new(
        axis(raw[0], raw[1]),
        axis(raw[2], raw[3]),
        axis(raw[4], raw[5]),
    )
}

pub struct Mpu6886<I: I2c> {
    i2c: I,
    address: u8,
    last_error: Option<Mpu6886Error>,
}

impl<I: I2c> Mpu6886<I> {
    /// Wakes the part and selects the ±8 g range.
    pub fn new(i2c: I, address: u8) -> Result<Self, Mpu6886Error> {
        let mut sensor = Self {
            i2c,
            address,
            last_error: None,
        };
        sensor
            .write_register(REG_PWR_MGMT_1, 0x00)
            .map_err(|_| Mpu6886Error::Wake)?;
        sensor
            .write_register(REG_ACCEL_CONFIG, ACCEL_FS_8G)
            .map_err(|_| Mpu6886Error::Configure)?;
        Ok(sensor)
    }

    pub fn new_with_default_address(i2c: I) -> Result<Self, Mpu6886Error> {
        Self::new(i2c, DEFAULT_ADDRESS)
    }

    pub fn acceleration(&mut self) -> Result<Acceleration, Mpu6886Error> {
        let mut raw = [0_u8; 6];
        self.i2c
            .write_read(self.address, &[REG_ACCEL_XOUT_H], &mut raw)
            .map_err(|_| Mpu6886Error::Read)?;
        Ok(decode_acceleration(raw))
    }

    /// Error raised by the most recent [`MotionSensor::read`], cleared on success.
    pub fn last_error(&self) -> Option<Mpu6886Error> {
        self.last_error
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), I::Error> {
        self.i2c.write(self.address, &[register, value])
    }
}

impl<I: I2c> MotionSensor for Mpu6886<I> {
    /// A failed bus transfer reads as rest so a flaky sensor never rolls.
    fn read(&mut self) -> Acceleration {
        match self.acceleration() {
            Ok(reading) => {
                self.last_error = None;
                reading
            }
            Err(error) => {
                self.last_error = Some(error);
                Acceleration::default()
            }
        }
    }
}
