//! Device configuration
//!
//! `DeviceConfig` is layered: defaults, then `OSPRAY_*` environment
//! variables, then command-line flags.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Console stream a device sink writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    /// Write `text` without adding a newline, ignoring I/O failures
    pub fn write(self, text: &str) {
        let _ = match self {
            OutputStream::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(text.as_bytes()).and_then(|_| out.flush())
            }
            OutputStream::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(text.as_bytes()).and_then(|_| err.flush())
            }
        };
    }
}

impl FromStr for OutputStream {
    type Err = ();

    /// Only the literals `cout` and `cerr` are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cout" => Ok(OutputStream::Stdout),
            "cerr" => Ok(OutputStream::Stderr),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("cout"),
            OutputStream::Stderr => f.write_str("cerr"),
        }
    }
}

/// Device parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Debug mode; enables stdout logging when no log output is set
    pub debug: bool,
    /// Status messages posted at a level above this are dropped
    pub log_level: u32,
    /// Target of the informational sink, `None` discards status messages
    pub log_output: Option<OutputStream>,
    /// Target of the error sink, `None` discards error messages
    pub error_output: Option<OutputStream>,
    /// Worker thread count, `None` lets the engine decide
    pub num_threads: Option<u32>,
    /// Pin worker threads to cores
    pub set_affinity: Option<bool>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: 0,
            log_output: None,
            error_output: Some(OutputStream::Stderr),
            num_threads: None,
            set_affinity: None,
        }
    }
}

impl DeviceConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `OSPRAY_*` environment variables
    ///
    /// Unset variables leave the field untouched; unparsable values are
    /// ignored with a warning.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overlay variables from an arbitrary lookup (environment, test maps)
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(debug) = parse_var::<i64>(&lookup, "OSPRAY_DEBUG") {
            self.debug = debug != 0;
        }
        if let Some(level) = parse_var::<u32>(&lookup, "OSPRAY_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(output) = parse_output(&lookup, "OSPRAY_LOG_OUTPUT") {
            self.log_output = Some(output);
        }
        if let Some(output) = parse_output(&lookup, "OSPRAY_ERROR_OUTPUT") {
            self.error_output = Some(output);
        }
        if let Some(threads) = parse_var::<u32>(&lookup, "OSPRAY_THREADS") {
            self.num_threads = Some(threads);
        }
        if let Some(affinity) = parse_var::<i64>(&lookup, "OSPRAY_SET_AFFINITY") {
            self.set_affinity = Some(affinity != 0);
        }
    }

    /// Informational sink target after applying debug mode
    pub fn effective_log_output(&self) -> Option<OutputStream> {
        match self.log_output {
            Some(output) => Some(output),
            None if self.debug => Some(OutputStream::Stdout),
            None => None,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = lookup(key)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            crate::osp_warn!("osp::config", "Ignoring {}={:?}: not a number", key, value);
            None
        }
    }
}

fn parse_output(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<OutputStream> {
    let value = lookup(key)?;
    match value.parse() {
        Ok(output) => Some(output),
        Err(()) => {
            crate::osp_warn!("osp::config", "Ignoring {}={:?}: use 'cout' or 'cerr'", key, value);
            None
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
