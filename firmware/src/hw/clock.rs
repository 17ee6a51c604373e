//! Embassy time source exposed through the core `Clock` trait.

use core::time::Duration;

use embassy_time::Instant;
use handheld_core::hal::MonotonicInstant;

/// Embassy instant wrapped so it satisfies [`MonotonicInstant`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct FirmwareInstant(Instant);

impl FirmwareInstant {
    pub fn as_micros(self) -> u64 {
        self.0.as_micros()
    }
}

impl From<Instant> for FirmwareInstant {
    fn from(value: Instant) -> Self {
        Self(value)
    }
}

impl MonotonicInstant for FirmwareInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        let elapsed = self.0.saturating_duration_since(earlier.0);
        Duration::from_micros(elapsed.as_micros())
    }
}

/// Reads the Embassy time driver.
#[cfg(target_os = "none")]
pub struct EmbassyClock;

#[cfg(target_os = "none")]
impl handheld_core::hal::Clock for EmbassyClock {
    type Instant = FirmwareInstant;

    fn now(&self) -> FirmwareInstant {
        FirmwareInstant::from(Instant::now())
    }
}

/// Converts a core duration into the Embassy representation, saturating on
/// overflow.
pub fn to_embassy(duration: Duration) -> embassy_time::Duration {
    let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
    embassy_time::Duration::from_micros(micros)
}
