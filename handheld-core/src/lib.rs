#![no_std]

// Input, power and motion logic for the handheld dice device.
//
// Everything here stays portable across the MCU firmware and the host
// emulator: hardware is reached only through the traits in `hal`.

pub mod animation;
pub mod control;
pub mod hal;
pub mod input;
pub mod motion;
pub mod power;
pub mod sampler;
pub mod telemetry;
