#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use handheld_core::animation::{DieFace, ScreenPoint};
use handheld_core::control::{ControlConfig, ControlLoop, Peripherals, TickReport};
use handheld_core::hal::{
    Acceleration, AnalogNoise, Board, Clock, DecorativeOutput, DigitalInput, MonotonicInstant,
    MotionSensor, Polarity, PowerOutput, Renderer, Rgb,
};
use handheld_core::input::ButtonId;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Millis(pub u64);

impl MonotonicInstant for Millis {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

#[derive(Default)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn set(&mut self, millis: u64) {
        self.now = millis;
    }

    pub fn advance(&mut self, millis: u64) {
        self.now += millis;
    }
}

impl Clock for ManualClock {
    type Instant = Millis;

    fn now(&self) -> Millis {
        Millis(self.now)
    }
}

/// Pull-up wired line: idles high, pressed pulls it low.
pub struct FakePin {
    pub high: bool,
    pub configured: Option<Polarity>,
}

impl Default for FakePin {
    fn default() -> Self {
        Self {
            high: true,
            configured: None,
        }
    }
}

impl DigitalInput for FakePin {
    fn configure(&mut self, polarity: Polarity) {
        self.configured = Some(polarity);
    }

    fn is_high(&mut self) -> bool {
        self.high
    }
}

/// Ordered log shared between fakes and callbacks.
pub type Journal = Rc<RefCell<Vec<String>>>;

#[derive(Default)]
pub struct FakeBacklight {
    pub levels: Vec<u8>,
    pub journal: Option<Journal>,
}

impl PowerOutput for FakeBacklight {
    fn set_level(&mut self, level: u8) {
        self.levels.push(level);
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(format!("backlight {level}"));
        }
    }
}

#[derive(Default)]
pub struct FakeMotion {
    pub reading: Acceleration,
    pub journal: Option<Journal>,
}

impl MotionSensor for FakeMotion {
    fn read(&mut self) -> Acceleration {
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push("motion".to_string());
        }
        self.reading
    }
}

/// Replays queued samples, then repeats `fallback`.
pub struct ScriptedNoise {
    pub queued: VecDeque<u16>,
    pub fallback: u16,
    pub reads: usize,
}

impl Default for ScriptedNoise {
    fn default() -> Self {
        Self {
            queued: VecDeque::new(),
            fallback: 1,
            reads: 0,
        }
    }
}

impl ScriptedNoise {
    pub fn queue(&mut self, samples: &[u16]) {
        self.queued.extend(samples.iter().copied());
    }
}

impl AnalogNoise for ScriptedNoise {
    fn sample(&mut self) -> u16 {
        self.reads += 1;
        self.queued.pop_front().unwrap_or(self.fallback)
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    pub clears: usize,
    pub drawn: Vec<(DieFace, ScreenPoint)>,
}

impl Renderer for FakeRenderer {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn draw_value_at(&mut self, face: DieFace, origin: ScreenPoint) {
        self.drawn.push((face, origin));
    }
}

#[derive(Default)]
pub struct FakeLeds {
    pub fills: Vec<Rgb>,
}

impl DecorativeOutput for FakeLeds {
    fn set_all(&mut self, color: Rgb) {
        self.fills.push(color);
    }
}

pub struct TestBoard;

impl Board for TestBoard {
    type Clock = ManualClock;
    type Input = FakePin;
    type Backlight = FakeBacklight;
    type Motion = FakeMotion;
    type Noise = ScriptedNoise;
    type Renderer = FakeRenderer;
    type Decoration = FakeLeds;
}

fn peripherals() -> Peripherals<TestBoard> {
    Peripherals::<TestBoard> {
        clock: ManualClock::default(),
        buttons: [FakePin::default(), FakePin::default(), FakePin::default()],
        backlight: FakeBacklight::default(),
        motion: FakeMotion::default(),
        noise: ScriptedNoise::default(),
        renderer: FakeRenderer::default(),
        decoration: FakeLeds::default(),
    }
}

pub fn build<C>(config: ControlConfig) -> ControlLoop<TestBoard, C> {
    let mut control = ControlLoop::new(peripherals(), config);
    control.initialize();
    control
}

/// Builds a loop whose backlight and accelerometer write into `journal`.
pub fn build_journaled<C>(
    config: ControlConfig,
    journal: &Journal,
) -> ControlLoop<TestBoard, C> {
    let mut peripherals = peripherals();
    peripherals.backlight.journal = Some(Rc::clone(journal));
    peripherals.motion.journal = Some(Rc::clone(journal));
    let mut control = ControlLoop::new(peripherals, config);
    control.initialize();
    control
}

pub fn set_pressed<C>(control: &mut ControlLoop<TestBoard, C>, id: ButtonId, pressed: bool) {
    control.button_mut(id).pin_mut().high = !pressed;
}

pub fn tick_at<C>(control: &mut ControlLoop<TestBoard, C>, millis: u64) -> TickReport {
    control.clock_mut().set(millis);
    control.tick()
}
