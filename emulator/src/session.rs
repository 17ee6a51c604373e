use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use handheld_core::animation::{
    ANIMATION_DRAWS, DIE_POSITIONS, DieFace, PIP_MID, PIP_NEAR, ScreenPoint,
};
use handheld_core::control::{ControlConfig, ControlLoop, DEFAULT_TICK_PERIOD, Peripherals};
use handheld_core::hal::{
    Acceleration, AnalogNoise, Board, Clock, DecorativeOutput, DigitalInput, MonotonicInstant,
    MotionSensor, Polarity, PowerOutput, Renderer, Rgb,
};
use handheld_core::input::{ALL_BUTTONS, BUTTON_COUNT, ButtonId};
use handheld_core::telemetry::{TelemetryEventKind, TelemetryPayload, TelemetryRecord};

const DEFAULT_EVENT_COUNT: usize = 10;
/// Width of the simulated ADC.
const NOISE_MASK: u16 = 0x0FFF;

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("press", "press <a|b|c>        - hold a button down"),
    ("release", "release <a|b|c>      - let a button go"),
    ("tilt", "tilt <x> <y> <z>     - set the accelerometer reading (g)"),
    ("tick", "tick [count]         - run control ticks 10ms apart"),
    ("run", "run <ms>             - keep ticking for a span of time"),
    ("advance", "advance <ms>         - move the clock without ticking"),
    ("noise", "noise <raw>...       - queue raw analog samples for the next draws"),
    ("timeout", "timeout <ms>         - change the backlight idle timeout"),
    ("wake", "wake                 - report activity to the backlight"),
    ("status", "status               - show clock, backlight, LEDs and buttons"),
    ("dice", "dice                 - draw the dice currently on screen"),
    ("events", "events [count]       - list recent telemetry"),
    ("help", "help [topic]         - show help for a command"),
];

/// Millisecond timestamp on the emulator's virtual clock.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct SimInstant(u64);

impl SimInstant {
    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

impl MonotonicInstant for SimInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Simulated device state shared by every collaborator.
struct Hardware {
    now_ms: u64,
    pins_high: [bool; BUTTON_COUNT],
    configured: [Option<Polarity>; BUTTON_COUNT],
    backlight: u8,
    reading: Acceleration,
    noise: VecDeque<u16>,
    jitter: u32,
    screen: [Option<DieFace>; ANIMATION_DRAWS],
    leds: Rgb,
    notices: Vec<String>,
}

impl Hardware {
    fn new(seed: u32) -> Self {
        Self {
            now_ms: 0,
            pins_high: [true; BUTTON_COUNT],
            configured: [None; BUTTON_COUNT],
            backlight: 0,
            reading: Acceleration::default(),
            noise: VecDeque::new(),
            jitter: seed.max(1),
            screen: [None; ANIMATION_DRAWS],
            leds: Rgb::BLACK,
            notices: Vec::new(),
        }
    }

    /// Xorshift stand-in for a floating ADC pin.
    fn next_jitter(&mut self) -> u16 {
        let mut state = self.jitter;
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        self.jitter = state;
        u16::try_from(state >> 16).unwrap_or_default() & NOISE_MASK
    }
}

type Shared = Rc<RefCell<Hardware>>;

pub struct SimClock(Shared);

impl Clock for SimClock {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.0.borrow().now_ms)
    }
}

pub struct SimPin {
    hardware: Shared,
    index: usize,
}

impl DigitalInput for SimPin {
    fn configure(&mut self, polarity: Polarity) {
        self.hardware.borrow_mut().configured[self.index] = Some(polarity);
    }

    fn is_high(&mut self) -> bool {
        self.hardware.borrow().pins_high[self.index]
    }
}

pub struct SimBacklight(Shared);

impl PowerOutput for SimBacklight {
    fn set_level(&mut self, level: u8) {
        self.0.borrow_mut().backlight = level;
    }
}

pub struct SimMotion(Shared);

impl MotionSensor for SimMotion {
    fn read(&mut self) -> Acceleration {
        self.0.borrow().reading
    }
}

pub struct SimNoise(Shared);

impl AnalogNoise for SimNoise {
    fn sample(&mut self) -> u16 {
        let mut hardware = self.0.borrow_mut();
        match hardware.noise.pop_front() {
            Some(raw) => raw,
            None => hardware.next_jitter(),
        }
    }
}

pub struct SimDisplay(Shared);

impl Renderer for SimDisplay {
    fn clear(&mut self) {
        self.0.borrow_mut().screen = [None; ANIMATION_DRAWS];
    }

    fn draw_value_at(&mut self, face: DieFace, origin: ScreenPoint) {
        if let Some(slot) = DIE_POSITIONS.iter().position(|point| *point == origin) {
            self.0.borrow_mut().screen[slot] = Some(face);
        }
    }
}

pub struct SimLeds(Shared);

impl DecorativeOutput for SimLeds {
    fn set_all(&mut self, color: Rgb) {
        self.0.borrow_mut().leds = color;
    }
}

pub struct EmulatorBoard;

impl Board for EmulatorBoard {
    type Clock = SimClock;
    type Input = SimPin;
    type Backlight = SimBacklight;
    type Motion = SimMotion;
    type Noise = SimNoise;
    type Renderer = SimDisplay;
    type Decoration = SimLeds;
}

/// Context handed to every button callback.
pub struct ButtonNotice {
    id: ButtonId,
    hardware: Shared,
}

fn announce(pressed: bool, notice: &mut ButtonNotice) {
    let edge = if pressed { "pressed" } else { "released" };
    let name = notice.id.name().to_ascii_uppercase();
    notice
        .hardware
        .borrow_mut()
        .notices
        .push(format!("Button {name} {edge}"));
}

/// Settings applied when a [`Session`] starts.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub config: ControlConfig,
    pub transcript: Option<PathBuf>,
    pub seed: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            config: ControlConfig::default(),
            transcript: None,
            seed: 0x2545_F491,
        }
    }
}

pub struct Session {
    control: ControlLoop<EmulatorBoard, ButtonNotice>,
    hardware: Shared,
    transcript: Option<TranscriptLogger>,
}

impl Session {
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        let hardware: Shared = Rc::new(RefCell::new(Hardware::new(options.seed)));
        let pin = |index| SimPin {
            hardware: Rc::clone(&hardware),
            index,
        };
        let peripherals = Peripherals::<EmulatorBoard> {
            clock: SimClock(Rc::clone(&hardware)),
            buttons: [pin(0), pin(1), pin(2)],
            backlight: SimBacklight(Rc::clone(&hardware)),
            motion: SimMotion(Rc::clone(&hardware)),
            noise: SimNoise(Rc::clone(&hardware)),
            renderer: SimDisplay(Rc::clone(&hardware)),
            decoration: SimLeds(Rc::clone(&hardware)),
        };

        let mut control = ControlLoop::new(peripherals, options.config);
        for line in ALL_BUTTONS {
            let notice = ButtonNotice {
                id: line.id,
                hardware: Rc::clone(&hardware),
            };
            control.on_button(line.id, announce, notice);
        }
        control.initialize();

        let transcript = match options.transcript.as_deref() {
            Some(path) => Some(TranscriptLogger::new(path)?),
            None => None,
        };

        Ok(Self {
            control,
            hardware,
            transcript,
        })
    }

    /// Current reading of the virtual clock.
    pub fn now(&self) -> SimInstant {
        self.control.clock().now()
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let at = self.now().as_millis();
        self.record(at, TranscriptRole::Host, &[trimmed.to_string()])?;

        let lines = match self.dispatch(trimmed) {
            Ok(lines) => lines,
            Err(message) => vec![format!("ERR {message}")],
        };

        let at = self.now().as_millis();
        self.record(at, TranscriptRole::Emulator, &lines)?;
        Ok(lines)
    }

    fn dispatch(&mut self, line: &str) -> Result<Vec<String>, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Vec::new());
        };
        let args: Vec<&str> = words.collect();

        match command.to_ascii_lowercase().as_str() {
            "help" => Ok(help_lines(args.first().copied())),
            "press" => self.set_button(&args, true),
            "release" => self.set_button(&args, false),
            "tilt" => self.tilt(&args),
            "tick" => {
                let count = match args.first() {
                    Some(raw) => parse_arg::<u64>(raw, "tick count")?,
                    None => 1,
                };
                Ok(self.run_ticks(count))
            }
            "run" => {
                let span = parse_arg::<u64>(required(&args, "run <ms>")?, "run span")?;
                Ok(self.run_ticks(span / tick_ms()))
            }
            "advance" => {
                let span = parse_arg::<u64>(required(&args, "advance <ms>")?, "advance span")?;
                let mut hardware = self.hardware.borrow_mut();
                hardware.now_ms = hardware.now_ms.saturating_add(span);
                Ok(vec![format!("OK clock t={}ms", hardware.now_ms)])
            }
            "noise" => self.queue_noise(&args),
            "timeout" => {
                let ms = parse_arg::<u64>(required(&args, "timeout <ms>")?, "timeout")?;
                self.control.set_idle_timeout(Duration::from_millis(ms));
                Ok(vec![format!("OK idle timeout {ms}ms")])
            }
            "wake" => Ok(self.wake()),
            "status" => Ok(self.status_lines()),
            "dice" => Ok(render_screen(&self.hardware.borrow().screen)),
            "events" => {
                let count = match args.first() {
                    Some(raw) => parse_arg::<usize>(raw, "event count")?,
                    None => DEFAULT_EVENT_COUNT,
                };
                Ok(self.event_lines(count))
            }
            other => Err(format!("unknown command `{other}` (try `help`)")),
        }
    }

    fn set_button(&mut self, args: &[&str], pressed: bool) -> Result<Vec<String>, String> {
        let name = required(args, "press|release <a|b|c>")?;
        let id = ButtonId::from_name(name).map_err(|err| format!("{err} `{name}`"))?;
        let polarity = ALL_BUTTONS[id.as_index()].polarity;
        let level_high = polarity.is_pressed(true) == pressed;
        self.hardware.borrow_mut().pins_high[id.as_index()] = level_high;

        let level = if level_high { "high" } else { "low" };
        Ok(vec![format!("OK button {id} line {level}")])
    }

    fn tilt(&mut self, args: &[&str]) -> Result<Vec<String>, String> {
        let [x, y, z] = args else {
            return Err("usage tilt <x> <y> <z>".to_string());
        };
        let reading = Acceleration::new(
            parse_arg::<f32>(x, "x")?,
            parse_arg::<f32>(y, "y")?,
            parse_arg::<f32>(z, "z")?,
        );
        self.hardware.borrow_mut().reading = reading;
        Ok(vec![format!(
            "OK motion x={:.2} y={:.2} z={:.2}",
            reading.x, reading.y, reading.z
        )])
    }

    fn queue_noise(&mut self, args: &[&str]) -> Result<Vec<String>, String> {
        if args.is_empty() {
            return Err("usage noise <raw>...".to_string());
        }
        let samples = args
            .iter()
            .map(|raw| parse_arg::<u16>(raw, "sample"))
            .collect::<Result<Vec<_>, _>>()?;

        let mut hardware = self.hardware.borrow_mut();
        hardware.noise.extend(samples);
        Ok(vec![format!("OK noise queued={}", hardware.noise.len())])
    }

    fn run_ticks(&mut self, count: u64) -> Vec<String> {
        let mut lines = Vec::new();
        for _ in 0..count {
            self.tick_once(&mut lines);
        }
        lines.push(format!("OK ticks={count} t={}ms", self.now().as_millis()));
        lines
    }

    fn tick_once(&mut self, lines: &mut Vec<String>) {
        {
            let mut hardware = self.hardware.borrow_mut();
            hardware.now_ms = hardware.now_ms.saturating_add(tick_ms());
        }

        let first_event = self.control.telemetry().next_event_id();
        let report = self.control.tick();
        let at = self.now().as_millis();

        let mut rolled = Vec::new();
        for record in self.control.telemetry().oldest_first() {
            if record.id < first_event {
                continue;
            }
            match record.event {
                TelemetryEventKind::DieRolled { face, .. } => rolled.push(face.to_string()),
                TelemetryEventKind::SampleExhausted { .. } => {}
                _ => lines.push(format!("t={at}ms {}", describe_record(record))),
            }
        }
        if !rolled.is_empty() {
            lines.push(format!("t={at}ms rolled {}", rolled.join(" ")));
        }

        let notices = std::mem::take(&mut self.hardware.borrow_mut().notices);
        lines.extend(notices.into_iter().map(|notice| format!("t={at}ms {notice}")));

        if let Some(error) = report.fault {
            lines.push(format!("ERR t={at}ms {error}"));
        }
    }

    fn wake(&mut self) -> Vec<String> {
        match self.control.wake() {
            Some(transition) => vec![format!("OK backlight woken {transition:?}")],
            None => vec!["OK activity noted".to_string()],
        }
    }

    fn status_lines(&self) -> Vec<String> {
        let hardware = self.hardware.borrow();
        let dimmer = self.control.dimmer();
        let now = self.now();
        let idle = dimmer
            .idle_for(now)
            .map_or_else(|| "unknown".to_string(), |idle| format!("{}ms", idle.as_millis()));
        let state = if dimmer.dimmed() { "dimmed" } else { "active" };

        let buttons = ALL_BUTTONS
            .iter()
            .map(|line| {
                let button = self.control.button(line.id);
                let stable = if button.is_pressed() { "pressed" } else { "released" };
                format!("{}={stable}", line.name)
            })
            .collect::<Vec<_>>()
            .join(" ");
        let configured = hardware.configured.iter().all(Option::is_some);

        vec![
            format!("clock t={}ms", now.as_millis()),
            format!(
                "backlight {state} level={} timeout={}ms idle={idle}",
                hardware.backlight,
                dimmer.timeout_duration().as_millis()
            ),
            format!(
                "leds #{:02x}{:02x}{:02x}",
                hardware.leds.r, hardware.leds.g, hardware.leds.b
            ),
            format!("buttons {buttons} configured={configured}"),
            format!(
                "motion x={:.2} y={:.2} z={:.2}",
                hardware.reading.x, hardware.reading.y, hardware.reading.z
            ),
            format!("noise queued={}", hardware.noise.len()),
        ]
    }

    fn event_lines(&self, count: usize) -> Vec<String> {
        let telemetry = self.control.telemetry();
        let skip = telemetry.len().saturating_sub(count);
        let lines: Vec<String> = telemetry
            .oldest_first()
            .skip(skip)
            .map(|record| {
                format!(
                    "#{} t={}ms {}",
                    record.id,
                    record.timestamp.as_millis(),
                    describe_record(record)
                )
            })
            .collect();
        if lines.is_empty() {
            vec!["no telemetry recorded".to_string()]
        } else {
            lines
        }
    }

    fn record(&mut self, at: u64, role: TranscriptRole, lines: &[String]) -> io::Result<()> {
        if let Some(transcript) = self.transcript.as_mut() {
            for line in lines {
                transcript.append_line(at, &role, line)?;
            }
        }
        Ok(())
    }
}

fn describe_record(record: &TelemetryRecord<SimInstant>) -> String {
    match record.details {
        TelemetryPayload::None => record.event.to_string(),
        TelemetryPayload::Power { idle_for } => {
            format!("{} idle={}ms", record.event, idle_for.as_millis())
        }
        TelemetryPayload::Motion { axis, reading } => format!(
            "{} axis={axis:?} x={:.2} y={:.2} z={:.2}",
            record.event, reading.x, reading.y, reading.z
        ),
        TelemetryPayload::Sampler { attempts } => {
            format!("{} attempts={attempts}", record.event)
        }
    }
}

fn tick_ms() -> u64 {
    u64::try_from(DEFAULT_TICK_PERIOD.as_millis()).unwrap_or(u64::MAX)
}

fn required<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, String> {
    args.first().copied().ok_or_else(|| format!("usage {usage}"))
}

fn parse_arg<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("syntax invalid {what} `{raw}`"))
}

fn help_lines(topic: Option<&str>) -> Vec<String> {
    match topic {
        Some(target) => match HELP_TOPICS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(target))
        {
            Some((_, detail)) => vec![(*detail).to_string()],
            None => vec![
                format!("No help available for `{target}`."),
                format!("Available topics: {}", help_topic_list()),
            ],
        },
        None => {
            let mut lines = vec!["Available commands:".to_string()];
            lines.extend(HELP_TOPICS.iter().map(|(_, detail)| format!("  {detail}")));
            lines.push("Type `help <topic>` for a specific command.".to_string());
            lines
        }
    }
}

fn help_topic_list() -> String {
    HELP_TOPICS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Draws the dice slots as ASCII, two rows of three.
pub fn render_screen(screen: &[Option<DieFace>; ANIMATION_DRAWS]) -> Vec<String> {
    const BORDER: &str = "+-----+";
    let step = PIP_MID - PIP_NEAR;
    let mut lines = Vec::new();

    for row in screen.chunks(3) {
        let mut grids = Vec::new();
        for slot in row {
            let mut grid = [[' '; 5]; 3];
            for &(x, y) in slot.map(DieFace::pips).unwrap_or_default() {
                let column = usize::from((x - PIP_NEAR) / step) * 2;
                let line = usize::from((y - PIP_NEAR) / step);
                grid[line][column] = 'o';
            }
            grids.push(grid);
        }

        lines.push(vec![BORDER; grids.len()].join(" "));
        for line in 0..3 {
            let cells: Vec<String> = grids
                .iter()
                .map(|grid| format!("|{}|", grid[line].iter().collect::<String>()))
                .collect();
            lines.push(cells.join(" "));
        }
        lines.push(vec![BORDER; grids.len()].join(" "));
    }
    lines
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };
        logger.write_header()?;
        Ok(logger)
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.writer, "# Handheld dice emulator transcript")?;
        writeln!(
            self.writer,
            "# Timestamps are milliseconds on the virtual clock"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(&mut self, at_ms: u64, role: &TranscriptRole, line: &str) -> io::Result<()> {
        writeln!(self.writer, "[+{at_ms:>6} ms] {} {line}", role.prefix())?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}
