mod common;

use std::time::Duration;

use handheld_core::hal::Polarity;
use handheld_core::input::{ButtonEdge, DebouncedInput};

use common::{FakePin, Millis};

fn record(pressed: bool, log: &mut Vec<bool>) {
    log.push(pressed);
}

fn button() -> DebouncedInput<FakePin, Millis, Vec<bool>> {
    let mut input = DebouncedInput::new(
        FakePin::default(),
        Polarity::ActiveLow,
        Duration::from_millis(10),
    );
    input.initialize();
    input.callback(record, Vec::new());
    input
}

fn sample(input: &mut DebouncedInput<FakePin, Millis, Vec<bool>>, at: u64, pressed: bool) {
    input.pin_mut().high = !pressed;
    input.update(Millis(at));
}

#[test]
fn bouncing_press_settles_into_single_callback() {
    let mut input = button();

    // Contact bounce for the first 6 ms, then held low.
    for (at, pressed) in [(0, true), (2, false), (4, true), (6, true), (9, true)] {
        sample(&mut input, at, pressed);
    }
    assert!(!input.is_pressed());
    assert_eq!(input.context().map(Vec::len), Some(0));

    input.pin_mut().high = false;
    assert_eq!(input.update(Millis(14)), Some(ButtonEdge::Pressed));
    assert!(input.is_pressed());
    assert_eq!(input.context(), Some(&vec![true]));

    for at in [16, 20, 40] {
        sample(&mut input, at, true);
    }
    assert_eq!(input.context(), Some(&vec![true]));
}

#[test]
fn release_is_debounced_the_same_way() {
    let mut input = button();
    sample(&mut input, 0, true);
    sample(&mut input, 10, true);
    assert!(input.is_pressed());

    sample(&mut input, 20, false);
    sample(&mut input, 25, true);
    sample(&mut input, 29, false);
    sample(&mut input, 38, false);
    assert!(input.is_pressed());

    input.pin_mut().high = true;
    assert_eq!(input.update(Millis(39)), Some(ButtonEdge::Released));
    assert_eq!(input.context(), Some(&vec![true, false]));
}

#[test]
fn flips_faster_than_the_window_never_change_state() {
    let mut input = button();
    let mut pressed = false;
    for at in (0..200).step_by(3) {
        pressed = !pressed;
        sample(&mut input, at, pressed);
    }

    assert!(!input.is_pressed());
    assert_eq!(input.context().map(Vec::len), Some(0));
}

#[test]
fn bursts_collapse_to_at_most_one_change_each() {
    let mut input = button();
    let mut at = 0;

    for _ in 0..4 {
        let before = input.context().map_or(0, Vec::len);
        for step in 0..5 {
            sample(&mut input, at, step % 2 == 0);
            at += 2;
        }
        // Hold the final level of the burst long enough to settle.
        let settled = input.raw_pressed();
        for _ in 0..8 {
            sample(&mut input, at, settled);
            at += 2;
        }
        let after = input.context().map_or(0, Vec::len);
        assert!(after - before <= 1);
        assert_eq!(input.is_pressed(), settled);
    }
}

#[test]
fn replacing_the_callback_swaps_context() {
    let mut input = button();
    sample(&mut input, 0, true);
    sample(&mut input, 10, true);

    assert_eq!(input.clear_callback(), Some(vec![true]));
    sample(&mut input, 20, false);
    sample(&mut input, 30, false);
    assert!(!input.is_pressed());
    assert!(input.context().is_none());

    input.callback(record, vec![false, false]);
    sample(&mut input, 40, true);
    sample(&mut input, 50, true);
    assert_eq!(input.context(), Some(&vec![false, false, true]));
}
