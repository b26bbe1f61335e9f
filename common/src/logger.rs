//! Console logger setup.

use std::fmt;
use std::str::FromStr;

use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default format used for the timestamp of each log line.
pub const DEFAULT_LOGS_DATETIME_FORMAT: &str = "[%Y-%m-%d] (%H:%M:%S%.3f)";

pub fn default_logs_datetime_format() -> String {
    DEFAULT_LOGS_DATETIME_FORMAT.to_owned()
}

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "off" => LogLevel::Off,
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => return Err(LoggerError::InvalidLevel(s.to_owned())),
        })
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        write!(f, "{}", s)
    }
}

/// Install the global console logger.
///
/// Can only succeed once per process.
pub fn setup_logger(
    level: LogLevel,
    disable_colors: bool,
    datetime_format: &str,
) -> Result<(), LoggerError> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Magenta)
        .trace(Color::Cyan);

    let datetime_format = datetime_format.to_owned();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            let now = chrono::Local::now().format(&datetime_format);
            if disable_colors {
                out.finish(format_args!(
                    "{} {} [{}] {}",
                    now,
                    record.level(),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "{} {} [{}] {}",
                    now,
                    colors.color(record.level()),
                    record.target(),
                    message
                ))
            }
        })
        .level(level.into())
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("off").unwrap(), LogLevel::Off);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_log_level_display_round_trip() {
        for level in [
            LogLevel::Off,
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(LogLevel::from_str(&level.to_string()).unwrap(), level);
        }
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::Warn);
        assert_eq!(LevelFilter::from(LogLevel::default()), LevelFilter::Info);
    }

    #[test]
    fn test_setup_logger_once() {
        let first = setup_logger(LogLevel::Warn, true, DEFAULT_LOGS_DATETIME_FORMAT);
        let second = setup_logger(LogLevel::Warn, true, DEFAULT_LOGS_DATETIME_FORMAT);
        // Another test binary may already own the logger, but two successes are impossible
        assert!(!(first.is_ok() && second.is_ok()));
        assert!(matches!(second, Err(LoggerError::AlreadyInitialized(_))));
    }
}
