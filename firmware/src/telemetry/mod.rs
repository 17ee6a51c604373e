//! Log mirror for control-loop activity.
//!
//! The core keeps its own telemetry ring; this module only turns each tick's
//! report into defmt lines on the target and stdout lines on the host.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use handheld_core::control::{ControlError, TickReport};
use handheld_core::input::{ButtonEdge, ButtonId};
use handheld_core::motion::Axis;
use handheld_core::power::PowerTransition;

use crate::hw::FirmwareInstant;

const fn edge_label(edge: ButtonEdge) -> &'static str {
    match edge {
        ButtonEdge::Pressed => "pressed",
        ButtonEdge::Released => "released",
    }
}

const fn power_label(transition: PowerTransition) -> &'static str {
    match transition {
        PowerTransition::Dimmed { .. } => "dimmed",
        PowerTransition::Woken { .. } => "woken",
    }
}

const fn axis_label(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x",
        Axis::Y => "y",
        Axis::Z => "z",
    }
}

fn idle_ms(transition: PowerTransition) -> u64 {
    let (PowerTransition::Dimmed { idle_for } | PowerTransition::Woken { idle_for }) = transition;
    u64::try_from(idle_for.as_millis()).unwrap_or(u64::MAX)
}

/// Edge callback registered for every front-panel button.
pub fn button_changed(pressed: bool, id: &mut ButtonId) {
    emit_button(id.name(), edge_label(ButtonEdge::from_pressed(pressed)));
}

/// Mirrors the observable parts of a tick report.
pub fn log_report(report: &TickReport, timestamp: FirmwareInstant) {
    let t = timestamp.as_micros();
    for transition in &report.power {
        emit_power(power_label(*transition), idle_ms(*transition), t);
    }
    if let Some(axis) = report.motion {
        emit_motion(axis_label(axis), t);
    }
    if !report.roll.is_empty() {
        let mut faces = [0_u8; handheld_core::animation::ANIMATION_DRAWS];
        for (slot, face) in faces.iter_mut().zip(report.roll.iter()) {
            *slot = face.value();
        }
        emit_roll(&faces[..report.roll.len()], t);
    }
}

#[cfg(target_os = "none")]
fn emit_button(name: &'static str, edge: &'static str) {
    defmt::info!("button {=str} {=str}", name, edge);
}

#[cfg(not(target_os = "none"))]
fn emit_button(name: &'static str, edge: &'static str) {
    println!("button {name} {edge}");
}

#[cfg(target_os = "none")]
fn emit_power(label: &'static str, idle_ms: u64, timestamp_us: u64) {
    defmt::info!(
        "backlight: {=str} after {=u64}ms idle t={=u64}us",
        label,
        idle_ms,
        timestamp_us
    );
}

#[cfg(not(target_os = "none"))]
fn emit_power(label: &'static str, idle_ms: u64, timestamp_us: u64) {
    println!("backlight: {label} after {idle_ms}ms idle t={timestamp_us}us");
}

#[cfg(target_os = "none")]
fn emit_motion(axis: &'static str, timestamp_us: u64) {
    defmt::info!("motion: {=str}-axis over threshold t={=u64}us", axis, timestamp_us);
}

#[cfg(not(target_os = "none"))]
fn emit_motion(axis: &'static str, timestamp_us: u64) {
    println!("motion: {axis}-axis over threshold t={timestamp_us}us");
}

#[cfg(target_os = "none")]
fn emit_roll(faces: &[u8], timestamp_us: u64) {
    defmt::info!("dice: rolled {=[u8]} t={=u64}us", faces, timestamp_us);
}

#[cfg(not(target_os = "none"))]
fn emit_roll(faces: &[u8], timestamp_us: u64) {
    println!("dice: rolled {faces:?} t={timestamp_us}us");
}

#[cfg(target_os = "none")]
pub fn log_control_error(error: ControlError) {
    defmt::warn!("control: {}", defmt::Display2Format(&error));
}

#[cfg(not(target_os = "none"))]
pub fn log_control_error(error: ControlError) {
    println!("control: {error}");
}

#[cfg(target_os = "none")]
pub fn log_sensor_fault(error: crate::hw::mpu6886::Mpu6886Error) {
    defmt::warn!("motion: {}", defmt::Display2Format(&error));
}

#[cfg(not(target_os = "none"))]
pub fn log_sensor_fault(error: crate::hw::mpu6886::Mpu6886Error) {
    println!("motion: {error}");
}
