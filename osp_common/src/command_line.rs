//! `--osp:*` command-line flags
//!
//! The scanner walks the argument list once, left to right, starting after
//! the program name. Every recognised flag consumes a fixed number of value
//! arguments, whatever they look like. Unrecognised arguments keep their
//! relative order for the next consumer.

use crate::config::{DeviceConfig, OutputStream};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::status::post_status_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Debug,
    Verbose,
    VeryVerbose,
    LogLevel,
    LogOutput,
    ErrorOutput,
    NumThreads,
    SetAffinity,
}

impl Flag {
    fn parse(arg: &str) -> Option<Flag> {
        match arg {
            "--osp:debug" => Some(Flag::Debug),
            "--osp:verbose" => Some(Flag::Verbose),
            "--osp:vv" => Some(Flag::VeryVerbose),
            "--osp:loglevel" => Some(Flag::LogLevel),
            "--osp:logoutput" => Some(Flag::LogOutput),
            "--osp:erroroutput" => Some(Flag::ErrorOutput),
            "--osp:numthreads" | "--osp:num-threads" => Some(Flag::NumThreads),
            "--osp:setaffinity" | "--osp:affinity" => Some(Flag::SetAffinity),
            _ => None,
        }
    }
}

/// Settings extracted from the command line
///
/// `None` fields were not given and leave the device configuration alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLineOverrides {
    pub debug: Option<bool>,
    pub log_level: Option<u32>,
    pub log_output: Option<OutputStream>,
    pub error_output: Option<OutputStream>,
    pub num_threads: Option<u32>,
    pub set_affinity: Option<bool>,
    /// Soft failures (bad output literals) to report once a device exists
    pub warnings: Vec<String>,
}

impl CommandLineOverrides {
    /// Whether no setting was given
    pub fn is_empty(&self) -> bool {
        self.debug.is_none()
            && self.log_level.is_none()
            && self.log_output.is_none()
            && self.error_output.is_none()
            && self.num_threads.is_none()
            && self.set_affinity.is_none()
    }

    /// Overlay the given settings onto `config`
    pub fn apply_to(&self, config: &mut DeviceConfig) {
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(output) = self.log_output {
            config.log_output = Some(output);
        }
        if let Some(output) = self.error_output {
            config.error_output = Some(output);
        }
        if let Some(threads) = self.num_threads {
            config.num_threads = Some(threads);
        }
        if let Some(affinity) = self.set_affinity {
            config.set_affinity = Some(affinity);
        }
    }
}

/// Command-line scanner
pub struct CommandLine;

impl CommandLine {
    /// Extract `--osp:*` flags from `args`, removing them in place
    ///
    /// `args[0]` is the program name and is never inspected.
    ///
    /// # Errors
    ///
    /// - `Error::MissingArgument` if a value-taking flag is the last argument
    /// - `Error::InvalidArgument` if a numeric value does not parse
    ///
    /// On error `args` is left untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use osp_common::osp::CommandLine;
    ///
    /// let mut args: Vec<String> = ["prog", "--osp:loglevel", "2", "--foo"]
    ///     .iter().map(|s| s.to_string()).collect();
    /// let overrides = CommandLine::parse(&mut args)?;
    /// assert_eq!(args, ["prog", "--foo"]);
    /// assert_eq!(overrides.log_level, Some(2));
    /// # Ok::<(), osp_common::osp::Error>(())
    /// ```
    pub fn parse(args: &mut Vec<String>) -> Result<CommandLineOverrides> {
        let mut overrides = CommandLineOverrides::default();
        let mut remaining = Vec::with_capacity(args.len());
        let mut iter = args.iter();

        if let Some(program) = iter.next() {
            remaining.push(program.clone());
        }

        while let Some(arg) = iter.next() {
            let Some(flag) = Flag::parse(arg) else {
                remaining.push(arg.clone());
                continue;
            };

            match flag {
                Flag::Debug => overrides.debug = Some(true),
                Flag::Verbose => overrides.log_level = Some(1),
                Flag::VeryVerbose => overrides.log_level = Some(2),
                Flag::LogLevel => {
                    let value = next_value(&mut iter, arg)?;
                    overrides.log_level = Some(parse_number(arg, value)?);
                }
                Flag::LogOutput => match next_value(&mut iter, arg)?.parse() {
                    Ok(output) => overrides.log_output = Some(output),
                    Err(()) => overrides.warnings.push(
                        "You must use 'cout' or 'cerr' for --osp:logoutput!".to_string()
                    ),
                },
                Flag::ErrorOutput => match next_value(&mut iter, arg)?.parse() {
                    Ok(output) => overrides.error_output = Some(output),
                    Err(()) => overrides.warnings.push(
                        "You must use 'cout' or 'cerr' for --osp:erroroutput!".to_string()
                    ),
                },
                Flag::NumThreads => {
                    let value = next_value(&mut iter, arg)?;
                    overrides.num_threads = Some(parse_number(arg, value)?);
                }
                Flag::SetAffinity => {
                    let value = next_value(&mut iter, arg)?;
                    overrides.set_affinity = Some(parse_number::<i64>(arg, value)? != 0);
                }
            }
        }

        *args = remaining;
        Ok(overrides)
    }
}

fn next_value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a str> {
    match iter.next() {
        Some(value) => Ok(value.as_str()),
        None => {
            crate::osp_error!("osp::command_line", "{} expects a value", flag);
            Err(Error::MissingArgument(flag.to_string()))
        }
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        crate::osp_error!("osp::command_line", "{} expects a number, got {:?}", flag, value);
        Error::InvalidArgument(format!("{} expects a number, got '{}'", flag, value))
    })
}

/// Extract `--osp:*` flags from `args` and apply them to `device`
///
/// The device configuration is committed afterwards, and warnings for
/// rejected output literals are posted to the device at level 0.
pub fn init_from_command_line(args: &mut Vec<String>, device: &Device) -> Result<()> {
    let overrides = CommandLine::parse(args)?;

    if !overrides.is_empty() {
        device.update_config(|config| overrides.apply_to(config));
        crate::osp_debug!("osp::command_line", "Applied {:?}", device.config());
    }

    for warning in &overrides.warnings {
        post_status_to(Some(device), warning, 0);
    }
    Ok(())
}

#[cfg(test)]
#[path = "command_line_tests.rs"]
mod tests;
