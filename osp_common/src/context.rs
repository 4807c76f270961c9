/// OSP Context - process-wide current device and diagnostics logger
///
/// The current device is installed once at initialization and read by every
/// status/error report. Storage is a `OnceLock` holding an `RwLock`, so the
/// install is a single swap and readers only take a shared lock.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::SystemTime;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};

// ===== INTERNAL STATE =====

/// Current device slot
static CURRENT_DEVICE: OnceLock<RwLock<Option<Arc<Device>>>> = OnceLock::new();

/// Global logger (initialized with a Warn-floored DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn device_slot() -> &'static RwLock<Option<Arc<Device>>> {
    CURRENT_DEVICE.get_or_init(|| RwLock::new(None))
}

fn logger_slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

// ===== PUBLIC API =====

/// Process-wide context manager
///
/// # Example
///
/// ```no_run
/// use osp_common::osp::{Context, Device};
///
/// // Install the device before any reporting
/// let device = Context::install_device(Device::new())?;
///
/// // Access it anywhere
/// assert!(Context::device_is_set());
///
/// // Teardown
/// Context::release_device();
/// # Ok::<(), osp_common::osp::Error>(())
/// ```
pub struct Context;

impl Context {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        crate::osp_error!("osp::Context", "{}", error);
        error
    }

    /// Install the current device
    ///
    /// # Returns
    ///
    /// The shared handle to the installed device
    ///
    /// # Errors
    ///
    /// - `Error::AlreadyInitialized` if a device is already installed
    /// - `Error::LockPoisoned` if the device slot is poisoned
    pub fn install_device(device: Device) -> Result<Arc<Device>> {
        let device = Arc::new(device);
        Self::install_shared_device(Arc::clone(&device))?;
        Ok(device)
    }

    /// Install an already shared device as the current device
    pub fn install_shared_device(device: Arc<Device>) -> Result<()> {
        let mut slot = device_slot().write()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("current device".to_string())
            ))?;

        if slot.is_some() {
            return Err(Self::log_and_return_error(
                Error::AlreadyInitialized(
                    "current device already set. Call Context::release_device() first.".to_string()
                )
            ));
        }

        *slot = Some(device);
        crate::osp_debug!("osp::Context", "Current device installed");
        Ok(())
    }

    /// The current device, if one is installed
    pub fn current_device() -> Option<Arc<Device>> {
        device_slot().read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn device_is_set() -> bool {
        device_slot().read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Remove the current device
    ///
    /// Existing handles stay valid until dropped.
    pub fn release_device() -> Option<Arc<Device>> {
        let released = device_slot().write().unwrap_or_else(PoisonError::into_inner).take();
        if released.is_some() {
            crate::osp_debug!("osp::Context", "Current device released");
        }
        released
    }

    // ===== LOGGING API =====

    /// Set a custom logger for library diagnostics
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        *logger_slot().write().unwrap_or_else(PoisonError::into_inner) = Box::new(logger);
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        *logger_slot().write().unwrap_or_else(PoisonError::into_inner) = Box::new(DefaultLogger::default());
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like osp_info!, osp_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(logger) = logger_slot().read() {
            logger.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by osp_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(logger) = logger_slot().read() {
            logger.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
