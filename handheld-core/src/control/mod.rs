//! Cooperative control loop that sequences every component once per tick.
//!
//! A tick runs strictly in this order:
//!
//! 1. advance the idle dimmer,
//! 2. poll each debounced button (callbacks fire inside this step),
//! 3. read the accelerometer and, when the trigger fires, wake the backlight
//!    and draw one die per animation slot,
//! 4. while the backlight is dimmed, blank the decorative output.
//!
//! The loop owns every collaborator, so there is exactly one execution
//! context and no locking.

use core::fmt;

use heapless::Vec;

use crate::animation::{ANIMATION_DRAWS, DIE_POSITIONS, DieFace};
use crate::hal::{Board, BoardInstant, Clock, DecorativeOutput, MotionSensor, Renderer};
use crate::input::{ALL_BUTTONS, BUTTON_COUNT, ButtonEdge, ButtonId, DebouncedInput};
use crate::motion::Axis;
use crate::power::{IdleDimmer, PowerTransition};
use crate::sampler::{self, DrawRange};
use crate::telemetry::TelemetryRecorder;

pub mod config;

pub use config::{ControlConfig, DEFAULT_TICK_PERIOD};

/// Collaborator instances handed to [`ControlLoop::new`].
pub struct Peripherals<B: Board> {
    pub clock: B::Clock,
    /// Raw button lines, ordered like [`ALL_BUTTONS`].
    pub buttons: [B::Input; BUTTON_COUNT],
    pub backlight: B::Backlight,
    pub motion: B::Motion,
    pub noise: B::Noise,
    pub renderer: B::Renderer,
    pub decoration: B::Decoration,
}

/// Failure surfaced from a tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ControlError {
    /// The analog source never produced an in-range value for `slot`; the
    /// remaining slots of that roll were skipped.
    SampleExhausted { slot: u8, attempts: u8 },
    /// The sampler returned a value that is not a die face.
    FaceOutOfRange { slot: u8, value: u8 },
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::SampleExhausted { slot, attempts } => write!(
                f,
                "die {slot} not drawn: no in-range sample after {attempts} attempts"
            ),
            ControlError::FaceOutOfRange { slot, value } => {
                write!(f, "die {slot} not drawn: {value} is not a face")
            }
        }
    }
}

/// Everything observable that happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Backlight transitions in the order they happened.
    pub power: Vec<PowerTransition, 2>,
    pub edges: Vec<(ButtonId, ButtonEdge), BUTTON_COUNT>,
    /// Axis that fired the motion trigger, if any.
    pub motion: Option<Axis>,
    pub roll: Vec<DieFace, ANIMATION_DRAWS>,
    /// Backlight state at the end of the tick.
    pub dimmed: bool,
    /// Set when the roll stopped early; `roll` holds the faces drawn before it.
    pub fault: Option<ControlError>,
}

type Button<B, C> = DebouncedInput<<B as Board>::Input, BoardInstant<B>, C>;

/// Application context: owns the collaborators and runs the per-tick schedule.
pub struct ControlLoop<B: Board, C = ButtonId> {
    config: ControlConfig,
    clock: B::Clock,
    buttons: [Button<B, C>; BUTTON_COUNT],
    dimmer: IdleDimmer<B::Backlight, BoardInstant<B>>,
    motion: B::Motion,
    noise: B::Noise,
    renderer: B::Renderer,
    decoration: B::Decoration,
    telemetry: TelemetryRecorder<BoardInstant<B>>,
}

impl<B: Board, C> ControlLoop<B, C> {
    /// Assembles the loop. No hardware is touched until
    /// [`initialize`](Self::initialize).
    pub fn new(peripherals: Peripherals<B>, config: ControlConfig) -> Self {
        let Peripherals {
            clock,
            buttons,
            backlight,
            motion,
            noise,
            renderer,
            decoration,
        } = peripherals;

        let mut index = 0;
        let buttons = buttons.map(|pin| {
            let line = ALL_BUTTONS[index];
            index += 1;
            DebouncedInput::new(
                pin,
                line.polarity,
                config.debounce.unwrap_or(line.debounce),
            )
        });

        Self {
            config,
            clock,
            buttons,
            dimmer: IdleDimmer::new(backlight, config.idle_timeout).with_levels(config.levels),
            motion,
            noise,
            renderer,
            decoration,
            telemetry: TelemetryRecorder::new(),
        }
    }

    /// Startup sequence: configure buttons, clear the screen, light the
    /// decoration and start the idle timer at full power.
    pub fn initialize(&mut self) {
        for button in &mut self.buttons {
            button.initialize();
        }
        self.renderer.clear();
        self.decoration.set_all(self.config.idle_color);
        let now = self.clock.now();
        self.dimmer.initialize(now);
    }

    /// Registers the edge callback for `id`, replacing any previous one.
    pub fn on_button(&mut self, id: ButtonId, handler: fn(bool, &mut C), context: C) {
        self.buttons[id.as_index()].callback(handler, context);
    }

    /// Runs one pass of the schedule.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let now = self.clock.now();

        if let Some(transition) = self.dimmer.update(now) {
            self.note_power(transition, now, &mut report);
        }

        for (line, button) in ALL_BUTTONS.iter().zip(self.buttons.iter_mut()) {
            if let Some(edge) = button.update(now) {
                self.telemetry.record_button(line.id, edge, now);
                let _ = report.edges.push((line.id, edge));
            }
        }

        let reading = self.motion.read();
        if let Some(axis) = self.config.trigger.exceeded_axis(reading) {
            self.telemetry.record_motion(axis, reading, now);
            report.motion = Some(axis);
            report.fault = self.roll(&mut report).err();
        }

        if self.dimmer.dimmed() {
            self.decoration.set_all(self.config.dimmed_color);
        }
        report.dimmed = self.dimmer.dimmed();
        report
    }

    fn roll(&mut self, report: &mut TickReport) -> Result<(), ControlError> {
        let attempts = self.config.sample_attempts;
        for (slot, origin) in DIE_POSITIONS.iter().enumerate() {
            let now = self.clock.now();
            if let Some(transition) = self.dimmer.wake(now) {
                self.note_power(transition, now, report);
            }

            let slot_id = u8::try_from(slot).unwrap_or(u8::MAX);
            let value = match sampler::draw(&mut self.noise, DrawRange::DIE, attempts) {
                Ok(value) => value,
                Err(exhausted) => {
                    self.telemetry.record_exhausted(slot, exhausted.attempts, now);
                    return Err(ControlError::SampleExhausted {
                        slot: slot_id,
                        attempts: exhausted.attempts,
                    });
                }
            };
            let face = DieFace::new(value).ok_or(ControlError::FaceOutOfRange {
                slot: slot_id,
                value,
            })?;

            self.renderer.draw_value_at(face, *origin);
            self.telemetry.record_roll(slot, face, now);
            let _ = report.roll.push(face);
        }
        Ok(())
    }

    fn note_power(
        &mut self,
        transition: PowerTransition,
        now: BoardInstant<B>,
        report: &mut TickReport,
    ) {
        self.telemetry.record_power(transition, now);
        let _ = report.power.push(transition);
    }

    /// Reports activity from outside the loop.
    pub fn wake(&mut self) -> Option<PowerTransition> {
        let now = self.clock.now();
        let transition = self.dimmer.wake(now)?;
        self.telemetry.record_power(transition, now);
        Some(transition)
    }

    pub fn dimmed(&self) -> bool {
        self.dimmer.dimmed()
    }

    /// Reconfigures the idle timeout; applied on the next tick.
    pub fn set_idle_timeout(&mut self, timeout: core::time::Duration) {
        self.config.idle_timeout = timeout;
        self.dimmer.timeout(timeout);
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn dimmer(&self) -> &IdleDimmer<B::Backlight, BoardInstant<B>> {
        &self.dimmer
    }

    pub fn button(&self, id: ButtonId) -> &Button<B, C> {
        &self.buttons[id.as_index()]
    }

    pub fn button_mut(&mut self, id: ButtonId) -> &mut Button<B, C> {
        &mut self.buttons[id.as_index()]
    }

    pub fn telemetry(&self) -> &TelemetryRecorder<BoardInstant<B>> {
        &self.telemetry
    }

    pub fn clock(&self) -> &B::Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut B::Clock {
        &mut self.clock
    }

    pub fn motion_mut(&mut self) -> &mut B::Motion {
        &mut self.motion
    }

    pub fn noise_mut(&mut self) -> &mut B::Noise {
        &mut self.noise
    }

    pub fn renderer(&self) -> &B::Renderer {
        &self.renderer
    }

    pub fn decoration(&self) -> &B::Decoration {
        &self.decoration
    }
}
