//! Internal logging system for OSP Common
//!
//! This module provides the library's own diagnostics, separate from the
//! device-facing status channel:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - File and line information for detailed ERROR logs

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// Implement this trait to redirect the library diagnostics (file logging,
/// test capture, etc.)
///
/// # Example
///
/// ```no_run
/// use osp_common::osp::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "osp::module", "osp::command_line")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Very verbose debug information
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Warning messages (ignored input, fallbacks)
    Warn,

    /// Error messages (hard failures with file:line details)
    Error,
}

/// Default logger implementation using colored console output on stderr
///
/// Entries below `min_severity` are dropped; the floor defaults to `Warn`.
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultLogger {
    min_severity: LogSeverity,
}

impl DefaultLogger {
    pub fn new() -> Self {
        Self::with_min_severity(LogSeverity::Warn)
    }

    /// Logger printing `min_severity` and above
    pub fn with_min_severity(min_severity: LogSeverity) -> Self {
        Self { min_severity }
    }

    pub fn min_severity(&self) -> LogSeverity {
        self.min_severity
    }

    /// Whether entries of `severity` pass the floor
    pub fn enabled(&self, severity: LogSeverity) -> bool {
        severity >= self.min_severity
    }

    /// Console line for `entry`, `None` if it is below the floor
    pub fn format_entry(&self, entry: &LogEntry) -> Option<String> {
        if !self.enabled(entry.severity) {
            return None;
        }

        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };
        let source = entry.source.bright_blue();

        let line = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            ),
            _ => format!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message),
        };
        Some(line)
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if let Some(line) = self.format_entry(entry) {
            eprintln!("{}", line);
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! osp_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::osp::Context::log(
            $crate::osp::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! osp_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::osp::Context::log(
            $crate::osp::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
///
/// # Example
///
/// ```ignore
/// osp_info!("osp::module", "Loaded module {}", name);
/// ```
#[macro_export]
macro_rules! osp_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::osp::Context::log(
            $crate::osp::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! osp_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::osp::Context::log(
            $crate::osp::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```ignore
/// osp_error!("osp::data_type", "Unknown data type {}", raw);
/// ```
#[macro_export]
macro_rules! osp_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::osp::Context::log_detailed(
            $crate::osp::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
