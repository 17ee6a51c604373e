//! Idle-timeout power controller for the display backlight.
//!
//! The dimmer is a two-state machine advanced cooperatively: the control loop
//! calls [`IdleDimmer::update`] once per tick and anything that observes user
//! activity calls [`IdleDimmer::wake`]. There are no timers or interrupts, so
//! the dim transition has one-tick resolution.

use core::time::Duration;

use crate::hal::{MonotonicInstant, PowerOutput};

/// Inactivity period after which the backlight dims.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Backlight power state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PowerState {
    Active,
    Dimmed,
}

/// Output levels applied in each [`PowerState`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DimmerLevels {
    pub active: u8,
    pub dimmed: u8,
}

impl DimmerLevels {
    /// Full brightness while active, off while dimmed.
    pub const DEFAULT: Self = Self::new(u8::MAX, 0);

    pub const fn new(active: u8, dimmed: u8) -> Self {
        Self { active, dimmed }
    }

    pub const fn level_for(&self, state: PowerState) -> u8 {
        match state {
            PowerState::Active => self.active,
            PowerState::Dimmed => self.dimmed,
        }
    }
}

impl Default for DimmerLevels {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// State change reported by [`IdleDimmer::update`] or [`IdleDimmer::wake`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PowerTransition {
    /// The timeout elapsed; `idle_for` is the inactivity observed on that tick.
    Dimmed { idle_for: Duration },
    /// Activity restored full power after `idle_for` of inactivity.
    Woken { idle_for: Duration },
}

/// Drives a [`PowerOutput`] between full and reduced power based on activity.
pub struct IdleDimmer<O, I> {
    output: O,
    levels: DimmerLevels,
    timeout: Duration,
    state: PowerState,
    last_activity: Option<I>,
}

impl<O, I> IdleDimmer<O, I>
where
    O: PowerOutput,
    I: MonotonicInstant,
{
    /// Creates an uninitialised dimmer. The output is not touched until
    /// [`initialize`](Self::initialize) runs.
    pub const fn new(output: O, timeout: Duration) -> Self {
        Self {
            output,
            levels: DimmerLevels::DEFAULT,
            timeout,
            state: PowerState::Active,
            last_activity: None,
        }
    }

    /// Overrides the output levels used for each state.
    #[must_use]
    pub fn with_levels(mut self, levels: DimmerLevels) -> Self {
        self.levels = levels;
        self
    }

    /// Forces the active state, drives full output and stamps `now` as the
    /// last activity.
    pub fn initialize(&mut self, now: I) {
        self.state = PowerState::Active;
        self.output.set_level(self.levels.active);
        self.last_activity = Some(now);
    }

    /// Reconfigures the timeout. Takes effect on the next [`update`](Self::update).
    pub fn timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub const fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    pub const fn levels(&self) -> DimmerLevels {
        self.levels
    }

    pub const fn state(&self) -> PowerState {
        self.state
    }

    /// Returns `true` while the output is held at the dimmed level.
    pub const fn dimmed(&self) -> bool {
        matches!(self.state, PowerState::Dimmed)
    }

    pub fn last_activity(&self) -> Option<I> {
        self.last_activity
    }

    /// Inactivity measured at `now`, or `None` before the first activity stamp.
    pub fn idle_for(&self, now: I) -> Option<Duration> {
        self.last_activity
            .map(|last| now.saturating_duration_since(last))
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Dims the output once the timeout has elapsed. A dimmed controller stays
    /// dimmed until [`wake`](Self::wake).
    pub fn update(&mut self, now: I) -> Option<PowerTransition> {
        if self.dimmed() {
            return None;
        }

        let idle_for = self.idle_for(now)?;
        if idle_for < self.timeout {
            return None;
        }

        self.enter(PowerState::Dimmed);
        Some(PowerTransition::Dimmed { idle_for })
    }

    /// Records activity at `now` and restores full power immediately if the
    /// output was dimmed.
    pub fn wake(&mut self, now: I) -> Option<PowerTransition> {
        let idle_for = self.idle_for(now).unwrap_or(Duration::ZERO);
        self.last_activity = Some(now);

        if !self.dimmed() {
            return None;
        }

        self.enter(PowerState::Active);
        Some(PowerTransition::Woken { idle_for })
    }

    fn enter(&mut self, state: PowerState) {
        self.state = state;
        self.output.set_level(self.levels.level_for(state));
    }
}
