//! Status/error channel
//!
//! Messages are routed through a device: informational messages are gated by
//! the device log level, errors are recorded as the device's last error, and
//! traces are forwarded as-is. Without a device, status and trace messages
//! are dropped while errors go straight to stderr, so initialization failures
//! stay visible.
//!
//! The `*_to` functions take the device explicitly; the plain functions use
//! the current device from `Context`. None of them fail.

use std::sync::{Mutex, OnceLock, PoisonError};
use rustc_hash::FxHashSet;
use crate::config::OutputStream;
use crate::context::Context;
use crate::device::Device;
use crate::error::ErrorCode;

/// Messages already reported by `warn_once`
static WARNED: OnceLock<Mutex<FxHashSet<String>>> = OnceLock::new();

/// Post a status message to `device` if its log level is at least `at_level`
pub fn post_status_to(device: Option<&Device>, message: &str, at_level: u32) {
    if let Some(device) = device {
        if device.log_level() >= at_level {
            device.emit_status(message);
        }
    }
}

/// Post a status message to the current device
pub fn post_status(message: &str, at_level: u32) {
    post_status_to(Context::current_device().as_deref(), message, at_level);
}

/// Record and report an error on `device`, or write it to stderr
pub fn post_error_to(device: Option<&Device>, code: ErrorCode, message: &str) {
    match device {
        Some(device) => device.emit_error(code, message),
        None => OutputStream::Stderr.write(&format!("#osp: INITIALIZATION ERROR --> {}\n", message)),
    }
}

/// Record and report an error on the current device
pub fn post_error(code: ErrorCode, message: &str) {
    post_error_to(Context::current_device().as_deref(), code, message);
}

/// Forward a trace message to `device`
pub fn post_trace_to(device: Option<&Device>, message: &str) {
    if let Some(device) = device {
        device.emit_trace(message);
    }
}

/// Forward a trace message to the current device
pub fn post_trace(message: &str) {
    post_trace_to(Context::current_device().as_deref(), message);
}

/// Log level of the current device, 0 without a device
pub fn log_level() -> u32 {
    Context::current_device().map_or(0, |device| device.log_level())
}

/// Post a warning only the first time `message` is seen in this process
///
/// Returns `true` on the first occurrence.
pub fn warn_once(message: &str, at_level: u32) -> bool {
    let first = WARNED
        .get_or_init(|| Mutex::new(FxHashSet::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(message.to_string());

    if first {
        post_status(
            &format!("Warning: {} (only reporting first occurrence)", message),
            at_level,
        );
    }
    first
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
