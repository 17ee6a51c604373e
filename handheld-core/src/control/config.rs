//! Tunables for the control loop.

use core::time::Duration;

use crate::hal::Rgb;
use crate::motion::MotionTrigger;
use crate::power::{DEFAULT_IDLE_TIMEOUT, DimmerLevels};
use crate::sampler::DEFAULT_SAMPLE_ATTEMPTS;

/// Nominal period between control-loop ticks.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(10);

/// Runtime configuration applied when the control loop is built.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ControlConfig {
    pub idle_timeout: Duration,
    pub levels: DimmerLevels,
    /// Overrides the per-button debounce window from the catalog.
    pub debounce: Option<Duration>,
    pub trigger: MotionTrigger,
    pub sample_attempts: u8,
    /// Decorative colour shown from startup until the backlight dims.
    pub idle_color: Rgb,
    pub dimmed_color: Rgb,
}

impl ControlConfig {
    pub const fn new() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            levels: DimmerLevels::DEFAULT,
            debounce: None,
            trigger: MotionTrigger::planar(crate::motion::DEFAULT_MOTION_THRESHOLD),
            sample_attempts: DEFAULT_SAMPLE_ATTEMPTS,
            idle_color: Rgb::PURPLE,
            dimmed_color: Rgb::BLACK,
        }
    }

    #[must_use]
    pub const fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_levels(mut self, levels: DimmerLevels) -> Self {
        self.levels = levels;
        self
    }

    #[must_use]
    pub const fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = Some(window);
        self
    }

    #[must_use]
    pub const fn with_trigger(mut self, trigger: MotionTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    #[must_use]
    pub const fn with_sample_attempts(mut self, attempts: u8) -> Self {
        self.sample_attempts = attempts;
        self
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_constants() {
        let config = ControlConfig::default();
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.sample_attempts, 32);
        assert_eq!(config.trigger, MotionTrigger::planar(2.0));
        assert!(config.debounce.is_none());
        assert_eq!(config.dimmed_color, Rgb::BLACK);
    }

    #[test]
    fn builders_override_single_fields() {
        let config = ControlConfig::new()
            .with_idle_timeout(Duration::from_millis(250))
            .with_debounce(Duration::from_millis(3))
            .with_sample_attempts(4);
        assert_eq!(config.idle_timeout, Duration::from_millis(250));
        assert_eq!(config.debounce, Some(Duration::from_millis(3)));
        assert_eq!(config.sample_attempts, 4);
        assert_eq!(config.levels, DimmerLevels::DEFAULT);
    }
}
