//! Interactive control surface.
//!
//! This file parses the line-oriented commands of the interactive
//! shell and applies them to the scenario settings. The commands
//! mirror the operations the emulation operator needs mid-run: debug
//! verbosity, multi-stream toggling, scenario duration, and scenario
//! selection.

use crate::config::MIN_SCENARIO_SECS;
use crate::scenario::{ScenarioKind, ScenarioSettings};

/// One parsed control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Debug(bool),
    Multistream(bool),
    ScenarioTime(u64),
    RunScenario(ScenarioKind),
    Quit,
}

/// Errors raised by the command parser.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("Unknown command '{0}'. Available: debug, multistream, scenario_time, scenario, quit")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Scenario should run for at least {MIN_SCENARIO_SECS} sec")]
    DurationTooShort,
}

/// Parse one input line into a control command.
pub fn parse_command(line: &str) -> Result<ControlCommand, ControlError> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or("");
    let arg = parts.next();

    match verb {
        "debug" => parse_toggle(arg, "debug 1 (enable) / debug 0 (disable)").map(ControlCommand::Debug),
        "multistream" => parse_toggle(arg, "multistream 1 (enable) / multistream 0 (disable)")
            .map(ControlCommand::Multistream),
        "scenario_time" => {
            let secs: u64 = arg
                .and_then(|a| a.parse().ok())
                .ok_or(ControlError::Usage("scenario_time [sec]"))?;
            if secs < MIN_SCENARIO_SECS {
                return Err(ControlError::DurationTooShort);
            }
            Ok(ControlCommand::ScenarioTime(secs))
        }
        "scenario" => {
            let kind = arg
                .and_then(|a| a.parse::<u8>().ok())
                .and_then(ScenarioKind::from_number)
                .ok_or(ControlError::Usage("scenario [1|2|3]"))?;
            Ok(ControlCommand::RunScenario(kind))
        }
        "quit" | "exit" => Ok(ControlCommand::Quit),
        other => Err(ControlError::Unknown(other.to_string())),
    }
}

fn parse_toggle(arg: Option<&str>, usage: &'static str) -> Result<bool, ControlError> {
    match arg {
        Some("1") => Ok(true),
        Some("0") => Ok(false),
        _ => Err(ControlError::Usage(usage)),
    }
}

/// Apply a command to the settings. Returns the scenario to run, if
/// the command selected one.
pub fn apply_command(
    settings: &mut ScenarioSettings,
    command: ControlCommand,
) -> Option<ScenarioKind> {
    match command {
        ControlCommand::Debug(on) => {
            settings.debug = on;
            log::info!("Debug mode {}", if on { "enabled" } else { "disabled" });
            None
        }
        ControlCommand::Multistream(on) => {
            settings.multistream = on;
            log::info!("Multistream {}", if on { "enabled" } else { "disabled" });
            None
        }
        ControlCommand::ScenarioTime(secs) => {
            settings.duration_secs = secs;
            log::info!("Scenario will run for {} sec", secs);
            None
        }
        ControlCommand::RunScenario(kind) => Some(kind),
        ControlCommand::Quit => None,
    }
}
