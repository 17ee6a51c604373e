//! Bounded random draws from a noisy analog input.
//!
//! A raw sample is folded modulo `high + 1` and rejected when the folded value
//! lands below `low`. Rejections are retried up to a fixed attempt budget so a
//! stuck source surfaces as [`SampleExhausted`] instead of spinning forever.

use core::fmt;

use crate::hal::AnalogNoise;

/// Attempt budget used by the control loop for each draw.
pub const DEFAULT_SAMPLE_ATTEMPTS: u8 = 32;

/// Inclusive range a draw must land in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DrawRange {
    low: u8,
    high: u8,
}

impl DrawRange {
    /// Faces of a six-sided die.
    pub const DIE: Self = Self { low: 1, high: 6 };

    /// Builds `[low, high]`, returning `None` when the range is empty.
    pub const fn new(low: u8, high: u8) -> Option<Self> {
        if low > high {
            None
        } else {
            Some(Self { low, high })
        }
    }

    pub const fn low(&self) -> u8 {
        self.low
    }

    pub const fn high(&self) -> u8 {
        self.high
    }

    /// Modulus used to fold raw samples: one past the upper bound.
    pub const fn modulus(&self) -> u16 {
        self.high as u16 + 1
    }

    /// Folds a raw sample and returns it when it lies inside the range.
    pub fn fold(&self, raw: u16) -> Option<u8> {
        let folded = u8::try_from(raw % self.modulus()).ok()?;
        (self.low..=self.high).contains(&folded).then_some(folded)
    }
}

/// Every attempt in the budget was rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SampleExhausted {
    pub attempts: u8,
}

impl fmt::Display for SampleExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "analog source produced no in-range sample after {} attempts",
            self.attempts
        )
    }
}

/// Draws one value in `range`, reading at most `max_attempts` raw samples.
pub fn draw<N>(noise: &mut N, range: DrawRange, max_attempts: u8) -> Result<u8, SampleExhausted>
where
    N: AnalogNoise + ?Sized,
{
    (0..max_attempts)
        .find_map(|_| range.fold(noise.sample()))
        .ok_or(SampleExhausted {
            attempts: max_attempts,
        })
}
