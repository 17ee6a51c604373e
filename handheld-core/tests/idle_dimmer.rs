mod common;

use std::time::Duration;

use handheld_core::power::{DimmerLevels, IdleDimmer, PowerState, PowerTransition};

use common::{FakeBacklight, Millis};

fn dimmer(timeout_ms: u64) -> IdleDimmer<FakeBacklight, Millis> {
    let mut dimmer = IdleDimmer::new(
        FakeBacklight::default(),
        Duration::from_millis(timeout_ms),
    );
    dimmer.initialize(Millis(0));
    dimmer
}

#[test]
fn five_second_timeout_dims_on_the_boundary() {
    let mut dimmer = dimmer(5_000);
    assert_eq!(dimmer.output().levels, vec![255]);

    assert_eq!(dimmer.update(Millis(4_999)), None);
    assert!(!dimmer.dimmed());

    assert_eq!(
        dimmer.update(Millis(5_000)),
        Some(PowerTransition::Dimmed {
            idle_for: Duration::from_secs(5)
        })
    );
    assert!(dimmer.dimmed());
    assert_eq!(dimmer.output().levels, vec![255, 0]);

    assert_eq!(dimmer.update(Millis(9_000)), None);
    assert_eq!(dimmer.output().levels, vec![255, 0]);
}

#[test]
fn dimmed_exactly_when_idle_reaches_timeout() {
    for timeout in [0_u64, 1, 40, 5_000] {
        for elapsed in [0_u64, 1, 39, 40, 41, 4_999, 5_000, 7_500] {
            let mut dimmer = dimmer(timeout);
            dimmer.update(Millis(elapsed));
            assert_eq!(
                dimmer.dimmed(),
                elapsed >= timeout,
                "timeout={timeout} elapsed={elapsed}"
            );
        }
    }
}

#[test]
fn wake_restarts_the_idle_window() {
    let mut dimmer = dimmer(100);
    assert_eq!(dimmer.wake(Millis(80)), None);
    assert_eq!(dimmer.update(Millis(150)), None);
    assert!(dimmer.update(Millis(180)).is_some());

    assert_eq!(
        dimmer.wake(Millis(200)),
        Some(PowerTransition::Woken {
            idle_for: Duration::from_millis(120)
        })
    );
    assert_eq!(dimmer.state(), PowerState::Active);
    assert_eq!(dimmer.output().levels, vec![255, 0, 255]);
    assert_eq!(dimmer.idle_for(Millis(250)), Some(Duration::from_millis(50)));
}

#[test]
fn shorter_timeout_applies_on_next_update() {
    let mut dimmer = dimmer(5_000);
    assert_eq!(dimmer.update(Millis(1_000)), None);

    dimmer.timeout(Duration::from_millis(500));
    assert!(!dimmer.dimmed());
    assert!(dimmer.update(Millis(1_000)).is_some());
}

#[test]
fn custom_levels_drive_partial_brightness() {
    let mut dimmer = IdleDimmer::new(FakeBacklight::default(), Duration::from_millis(10))
        .with_levels(DimmerLevels::new(200, 40));
    dimmer.initialize(Millis(0));
    dimmer.update(Millis(10));
    dimmer.wake(Millis(11));

    assert_eq!(dimmer.output().levels, vec![200, 40, 200]);
}
