//! Software debounce for digital button inputs.
//!
//! Each [`DebouncedInput`] owns one raw input line and is polled once per
//! control-loop tick. A raw level has to hold steady for the whole debounce
//! window before it is promoted to the stable state, so any burst of flips
//! shorter than the window collapses into at most one stable transition.

use core::time::Duration;

use crate::hal::{DigitalInput, MonotonicInstant, Polarity};

pub mod catalog;

pub use catalog::{ALL_BUTTONS, BUTTON_COUNT, ButtonId, ButtonLine, CatalogError, button_by_id};

/// Debounce window used by the front-panel buttons.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10);

/// Verified stable-state transition reported by [`DebouncedInput::update`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonEdge {
    Pressed,
    Released,
}

impl ButtonEdge {
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed {
            ButtonEdge::Pressed
        } else {
            ButtonEdge::Released
        }
    }

    pub const fn is_pressed(self) -> bool {
        matches!(self, ButtonEdge::Pressed)
    }
}

/// Edge handler paired with the per-input context it receives.
///
/// The handler runs synchronously inside [`DebouncedInput::update`] and must
/// neither block nor poll the input again.
pub struct InputCallback<C> {
    handler: fn(bool, &mut C),
    context: C,
}

impl<C> InputCallback<C> {
    pub const fn new(handler: fn(bool, &mut C), context: C) -> Self {
        Self { handler, context }
    }

    fn invoke(&mut self, pressed: bool) {
        (self.handler)(pressed, &mut self.context);
    }
}

/// Debounced view over a raw [`DigitalInput`].
pub struct DebouncedInput<P, I, C = ()> {
    pin: P,
    polarity: Polarity,
    window: Duration,
    last_raw: bool,
    stable: bool,
    last_change_at: Option<I>,
    callback: Option<InputCallback<C>>,
}

impl<P, I, C> DebouncedInput<P, I, C>
where
    P: DigitalInput,
    I: MonotonicInstant,
{
    /// Wraps `pin`; the stable state starts released.
    pub const fn new(pin: P, polarity: Polarity, window: Duration) -> Self {
        Self {
            pin,
            polarity,
            window,
            last_raw: false,
            stable: false,
            last_change_at: None,
            callback: None,
        }
    }

    /// Configures the underlying line. Safe to call more than once.
    pub fn initialize(&mut self) {
        self.pin.configure(self.polarity);
    }

    /// Registers `handler`, replacing any previous callback. Nothing fires
    /// until the next verified transition.
    pub fn callback(&mut self, handler: fn(bool, &mut C), context: C) {
        self.callback = Some(InputCallback::new(handler, context));
    }

    /// Removes the callback and hands back its context.
    pub fn clear_callback(&mut self) -> Option<C> {
        self.callback.take().map(|callback| callback.context)
    }

    /// Returns the context of the registered callback, if any.
    pub fn context(&self) -> Option<&C> {
        self.callback.as_ref().map(|callback| &callback.context)
    }

    /// Current stable (debounced) state.
    pub const fn is_pressed(&self) -> bool {
        self.stable
    }

    /// Most recent raw sample, after polarity has been applied.
    pub const fn raw_pressed(&self) -> bool {
        self.last_raw
    }

    pub const fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }

    /// Samples the line and promotes the raw level once it has held for the
    /// full debounce window.
    pub fn update(&mut self, now: I) -> Option<ButtonEdge> {
        let raw = self.polarity.is_pressed(self.pin.is_high());
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change_at = Some(now);
        }

        if raw == self.stable {
            return None;
        }

        let changed_at = self.last_change_at?;
        if now.saturating_duration_since(changed_at) < self.window {
            return None;
        }

        self.stable = raw;
        if let Some(callback) = self.callback.as_mut() {
            callback.invoke(raw);
        }
        Some(ButtonEdge::from_pressed(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    struct MockInstant(u64);

    impl MonotonicInstant for MockInstant {
        fn saturating_duration_since(&self, earlier: Self) -> Duration {
            Duration::from_millis(self.0.saturating_sub(earlier.0))
        }
    }

    #[derive(Default)]
    struct MockPin {
        high: bool,
        configured: u8,
        last_polarity: Option<Polarity>,
    }

    impl DigitalInput for MockPin {
        fn configure(&mut self, polarity: Polarity) {
            self.configured += 1;
            self.last_polarity = Some(polarity);
        }

        fn is_high(&mut self) -> bool {
            self.high
        }
    }

    fn active_high(window_ms: u64) -> DebouncedInput<MockPin, MockInstant, u32> {
        DebouncedInput::new(
            MockPin::default(),
            Polarity::ActiveHigh,
            Duration::from_millis(window_ms),
        )
    }

    fn count_edges(pressed: bool, count: &mut u32) {
        if pressed {
            *count += 1;
        } else {
            *count += 100;
        }
    }

    #[test]
    fn initialize_configures_pin_with_polarity() {
        let mut input: DebouncedInput<_, MockInstant> =
            DebouncedInput::new(MockPin::default(), Polarity::ActiveLow, DEFAULT_DEBOUNCE);
        input.initialize();
        input.initialize();
        assert_eq!(input.pin().configured, 2);
        assert_eq!(input.pin().last_polarity, Some(Polarity::ActiveLow));
    }

    #[test]
    fn level_must_hold_for_window_before_promotion() {
        let mut input = active_high(10);
        input.pin_mut().high = true;

        assert_eq!(input.update(MockInstant(0)), None);
        assert_eq!(input.update(MockInstant(9)), None);
        assert!(!input.is_pressed());
        assert!(input.raw_pressed());

        assert_eq!(input.update(MockInstant(10)), Some(ButtonEdge::Pressed));
        assert!(input.is_pressed());
        assert_eq!(input.update(MockInstant(30)), None);
    }

    #[test]
    fn active_low_input_reports_press_on_low_level() {
        let mut input: DebouncedInput<_, MockInstant> = DebouncedInput::new(
            MockPin {
                high: true,
                ..MockPin::default()
            },
            Polarity::ActiveLow,
            Duration::from_millis(5),
        );

        assert_eq!(input.update(MockInstant(0)), None);
        assert_eq!(input.update(MockInstant(50)), None);

        input.pin_mut().high = false;
        assert_eq!(input.update(MockInstant(60)), None);
        assert_eq!(input.update(MockInstant(65)), Some(ButtonEdge::Pressed));
    }

    #[test]
    fn callback_receives_state_and_context_once_per_edge() {
        let mut input = active_high(10);
        input.callback(count_edges, 0);

        input.pin_mut().high = true;
        input.update(MockInstant(0));
        input.update(MockInstant(10));
        input.update(MockInstant(11));
        input.update(MockInstant(12));
        assert_eq!(input.context(), Some(&1));

        input.pin_mut().high = false;
        input.update(MockInstant(20));
        input.update(MockInstant(35));
        assert_eq!(input.context(), Some(&101));
    }

    #[test]
    fn registering_callback_does_not_fire_it() {
        let mut input = active_high(10);
        input.pin_mut().high = true;
        input.update(MockInstant(0));
        input.update(MockInstant(10));

        input.callback(count_edges, 0);
        input.update(MockInstant(20));
        assert_eq!(input.context(), Some(&0));
    }

    #[test]
    fn replacing_callback_swaps_context() {
        let mut input = active_high(0);
        input.callback(count_edges, 7);
        input.callback(count_edges, 0);

        input.pin_mut().high = true;
        assert_eq!(input.update(MockInstant(0)), Some(ButtonEdge::Pressed));
        assert_eq!(input.clear_callback(), Some(1));
        assert!(input.context().is_none());
    }

    #[test]
    fn missing_callback_is_silent() {
        let mut input = active_high(1);
        input.pin_mut().high = true;
        input.update(MockInstant(0));
        assert_eq!(input.update(MockInstant(1)), Some(ButtonEdge::Pressed));
    }

    #[test]
    fn glitch_back_to_stable_level_is_ignored() {
        let mut input = active_high(10);
        input.pin_mut().high = true;
        input.update(MockInstant(0));
        input.pin_mut().high = false;
        input.update(MockInstant(3));

        assert_eq!(input.update(MockInstant(100)), None);
        assert!(!input.is_pressed());
    }
}
