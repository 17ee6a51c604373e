//! Board adapters that implement the `handheld-core` collaborator traits.
//!
//! Register maps and timestamp conversions build on the host so they can be
//! unit tested; everything that owns an Embassy peripheral is target-only.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

pub mod clock;
pub mod mpu6886;

#[cfg(target_os = "none")]
pub mod gpio;
#[cfg(target_os = "none")]
pub mod noise;

#[cfg(target_os = "none")]
pub mod display;

pub use clock::FirmwareInstant;
