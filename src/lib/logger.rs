use std::{fmt::Display, str::FromStr};

use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_colored_string(&self) -> ColoredString {
        match self {
            LogLevel::Debug => "DBG".bright_cyan(),
            LogLevel::Info => "INF".bright_green(),
            LogLevel::Warn => "WAR".yellow(),
            LogLevel::Error => "ERR".bright_red(),
        }
    }

    pub fn show(&self, other: &LogLevel) -> bool {
        match self {
            LogLevel::Debug => *other == LogLevel::Debug,
            LogLevel::Info => *other == LogLevel::Debug || *other == LogLevel::Info,
            LogLevel::Warn => *other != LogLevel::Error,
            LogLevel::Error => true,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "info" | "inf" => Ok(LogLevel::Info),
            "warn" | "warning" | "war" => Ok(LogLevel::Warn),
            "error" | "err" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "Debug"),
            LogLevel::Info => write!(f, "Info"),
            LogLevel::Warn => write!(f, "Warn"),
            LogLevel::Error => write!(f, "Error"),
        }
    }
}

/// A named console logger with colored level prefixes. Cheap to share between
/// threads; the decision loop takes one to trace grants and cancellations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    level: LogLevel,
    debug_prefix: String,
    info_prefix: String,
    warn_prefix: String,
    error_prefix: String,
}

impl Logger {
    pub fn new(level: LogLevel, name: String) -> Self {
        let n = format!("{name}:").dimmed();

        Logger {
            level,
            debug_prefix: format!("[{}] {}", LogLevel::Debug.to_colored_string(), n),
            info_prefix: format!("[{}] {}", LogLevel::Info.to_colored_string(), n),
            warn_prefix: format!("[{}] {}", LogLevel::Warn.to_colored_string(), n),
            error_prefix: format!("[{}] {}", LogLevel::Error.to_colored_string(), n),
        }
    }

    pub fn get_prefix(&self, level: &LogLevel) -> &str {
        match level {
            LogLevel::Debug => &self.debug_prefix,
            LogLevel::Info => &self.info_prefix,
            LogLevel::Warn => &self.warn_prefix,
            LogLevel::Error => &self.error_prefix,
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if level.show(&self.level) {
            eprintln!("{} {}", self.get_prefix(&level), message);
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn empty(&self, level: LogLevel) {
        if level.show(&self.level) {
            eprintln!();
        }
    }
}
