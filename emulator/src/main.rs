mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use crossterm::style::Stylize;
use handheld_core::motion::MotionTrigger;

use session::{Session, SessionOptions};

const USAGE: &str = "Usage: handheld-emulator [--timeout <ms>] [--debounce <ms>] \
[--threshold <g>] [--attempts <n>] [--seed <n>] [--transcript <path>]";

fn main() -> io::Result<()> {
    let options = parse_options(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(options)?;
    let mut line = String::new();

    writeln!(
        writer,
        "Handheld dice emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "{}", "> ".dark_grey())?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed)? {
            if response.starts_with("ERR") {
                writeln!(writer, "{}", response.red())?;
            } else if response.contains(" rolled ") {
                writeln!(writer, "{}", response.green())?;
            } else if response.starts_with("t=") {
                writeln!(writer, "{}", response.yellow())?;
            } else {
                writeln!(writer, "{response}")?;
            }
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_options(args: impl Iterator<Item = String>) -> Result<SessionOptions, String> {
    let mut options = SessionOptions::default();
    let mut args = args;

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg.clone(), None),
        };
        let mut value = || {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| format!("Expected value after {flag}"))
        };

        let config = options.config;
        options.config = match flag.as_str() {
            "--timeout" => config.with_idle_timeout(Duration::from_millis(number(&value()?)?)),
            "--debounce" => config.with_debounce(Duration::from_millis(number(&value()?)?)),
            "--threshold" => {
                let threshold = value()?
                    .parse::<f32>()
                    .map_err(|_| "Threshold must be a number of g".to_string())?;
                config.with_trigger(MotionTrigger::planar(threshold))
            }
            "--attempts" => {
                let attempts = u8::try_from(number(&value()?)?)
                    .ok()
                    .filter(|attempts| *attempts > 0)
                    .ok_or_else(|| "Attempts must be between 1 and 255".to_string())?;
                config.with_sample_attempts(attempts)
            }
            "--seed" => {
                options.seed = u32::try_from(number(&value()?)?)
                    .map_err(|_| "Seed must fit in 32 bits".to_string())?;
                config
            }
            "--transcript" => {
                options.transcript = Some(PathBuf::from(value()?));
                config
            }
            other => return Err(format!("Unknown option `{other}`")),
        };
    }

    Ok(options)
}

fn number(raw: &str) -> Result<u64, String> {
    raw.parse::<u64>()
        .map_err(|_| format!("Expected a whole number, got `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<SessionOptions, String> {
        parse_options(args.iter().map(|arg| (*arg).to_string()))
    }

    #[test]
    fn flags_override_config() {
        let options = parse(&[
            "--timeout",
            "250",
            "--debounce=3",
            "--threshold",
            "1.5",
            "--attempts",
            "4",
            "--transcript",
            "out/log.txt",
        ])
        .unwrap();

        assert_eq!(options.config.idle_timeout, Duration::from_millis(250));
        assert_eq!(options.config.debounce, Some(Duration::from_millis(3)));
        assert_eq!(options.config.trigger, MotionTrigger::planar(1.5));
        assert_eq!(options.config.sample_attempts, 4);
        assert_eq!(options.transcript, Some(PathBuf::from("out/log.txt")));
    }

    #[test]
    fn bad_flags_are_rejected() {
        assert!(parse(&["--timeout"]).is_err());
        assert!(parse(&["--attempts", "300"]).is_err());
        assert!(parse(&["--attempts=0"]).is_err());
        assert!(parse(&["--colour"]).is_err());
    }
}
