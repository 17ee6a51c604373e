use std::io;
use std::path::PathBuf;

use handheld_core::control::ControlConfig;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use session::{Session, SessionOptions};

const TRANSCRIPT_DIR: &str = "transcripts";

fn main() -> io::Result<()> {
    let defaults = ControlConfig::default();

    record(
        "idle-dimmer",
        defaults,
        &["status", "run 4990", "tick", "status", "wake", "status"],
    )?;
    record(
        "debounce",
        defaults,
        &[
            "press a", "tick", "release a", "tick", "press a", "tick 2", "release a", "tick 2",
            "events",
        ],
    )?;
    record(
        "roll",
        defaults,
        &[
            "noise 0 0 3 9 4 13 7 1 6",
            "tilt 2.5 0.1 0",
            "tick",
            "tilt 0 0 1",
            "tick",
            "dice",
        ],
    )?;
    record(
        "exhaustion",
        defaults.with_sample_attempts(4),
        &["noise 5 0 0 0 0", "tilt 0 3 0", "tick", "dice", "events 3"],
    )?;
    Ok(())
}

fn record(name: &str, config: ControlConfig, commands: &[&str]) -> io::Result<()> {
    let options = SessionOptions {
        config,
        transcript: Some(PathBuf::from(TRANSCRIPT_DIR).join(format!("emulator-{name}.log"))),
        ..SessionOptions::default()
    };
    let mut session = Session::new(options)?;
    for command in commands {
        let _ = session.handle_command(command)?;
    }
    Ok(())
}
