/// Device - rendering context owning configuration, sinks and last error
///
/// A device is shared as `Arc<Device>`. Every field sits behind its own lock
/// so reporting from several threads is safe; poisoned locks are recovered
/// because reporting must never fail.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use crate::config::DeviceConfig;
use crate::error::ErrorCode;

/// Informational or trace sink
pub type MessageFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Error sink
pub type ErrorFn = Arc<dyn Fn(ErrorCode, &str) + Send + Sync>;

struct Sinks {
    message: MessageFn,
    error: ErrorFn,
    trace: MessageFn,
    /// Set by `set_message_sink`; commit no longer replaces the sink
    custom_message: bool,
    /// Set by `set_error_sink`; commit no longer replaces the sink
    custom_error: bool,
}

struct LastError {
    code: ErrorCode,
    message: String,
}

/// Rendering context
///
/// # Example
///
/// ```no_run
/// use osp_common::osp::{Context, Device, DeviceConfig};
///
/// let device = Device::with_config(DeviceConfig::from_env());
/// device.set_message_sink(|msg| print!("[engine] {}", msg));
/// Context::install_device(device)?;
/// # Ok::<(), osp_common::osp::Error>(())
/// ```
pub struct Device {
    config: RwLock<DeviceConfig>,
    sinks: RwLock<Sinks>,
    last_error: Mutex<LastError>,
}

impl Device {
    /// Create a device with the default configuration
    pub fn new() -> Self {
        Self::with_config(DeviceConfig::default())
    }

    /// Create a device and commit `config`
    pub fn with_config(config: DeviceConfig) -> Self {
        let device = Self {
            config: RwLock::new(config),
            sinks: RwLock::new(Sinks {
                message: Arc::new(|_: &str| {}),
                error: Arc::new(|_: ErrorCode, _: &str| {}),
                trace: Arc::new(|_: &str| {}),
                custom_message: false,
                custom_error: false,
            }),
            last_error: Mutex::new(LastError {
                code: ErrorCode::NoError,
                message: String::new(),
            }),
        };
        device.commit();
        device
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> DeviceConfig {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn log_level(&self) -> u32 {
        self.config.read().unwrap_or_else(PoisonError::into_inner).log_level
    }

    pub fn is_debug(&self) -> bool {
        self.config.read().unwrap_or_else(PoisonError::into_inner).debug
    }

    /// Modify the configuration and commit it
    pub fn update_config<F>(&self, update: F)
    where
        F: FnOnce(&mut DeviceConfig),
    {
        {
            let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
            update(&mut config);
        }
        self.commit();
    }

    /// Rebuild the console sinks from the configured outputs
    ///
    /// Sinks installed with `set_message_sink` / `set_error_sink` are kept.
    pub fn commit(&self) {
        let config = self.config();
        let mut sinks = self.sinks.write().unwrap_or_else(PoisonError::into_inner);

        if !sinks.custom_message {
            sinks.message = match config.effective_log_output() {
                Some(stream) => Arc::new(move |msg: &str| stream.write(msg)) as MessageFn,
                None => Arc::new(|_: &str| {}) as MessageFn,
            };
        }

        if !sinks.custom_error {
            sinks.error = match config.error_output {
                Some(stream) => Arc::new(move |code: ErrorCode, msg: &str| {
                    stream.write(&format!("#osp: {} ({}): {}\n", code, i32::from(code), msg))
                }) as ErrorFn,
                None => Arc::new(|_: ErrorCode, _: &str| {}) as ErrorFn,
            };
        }
    }

    /// Replace the informational sink
    pub fn set_message_sink<F>(&self, sink: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut sinks = self.sinks.write().unwrap_or_else(PoisonError::into_inner);
        sinks.message = Arc::new(sink);
        sinks.custom_message = true;
    }

    /// Replace the error sink
    pub fn set_error_sink<F>(&self, sink: F)
    where
        F: Fn(ErrorCode, &str) + Send + Sync + 'static,
    {
        let mut sinks = self.sinks.write().unwrap_or_else(PoisonError::into_inner);
        sinks.error = Arc::new(sink);
        sinks.custom_error = true;
    }

    /// Replace the trace sink
    pub fn set_trace_sink<F>(&self, sink: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.sinks.write().unwrap_or_else(PoisonError::into_inner).trace = Arc::new(sink);
    }

    /// Code of the most recently posted error
    pub fn last_error_code(&self) -> ErrorCode {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner).code
    }

    /// Message of the most recently posted error
    pub fn last_error_message(&self) -> String {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner).message.clone()
    }

    // Sinks are cloned out of the lock so they may report re-entrantly.

    pub(crate) fn emit_status(&self, message: &str) {
        let sink = self.sinks.read().unwrap_or_else(PoisonError::into_inner).message.clone();
        sink(&format!("{}\n", message));
    }

    pub(crate) fn emit_error(&self, code: ErrorCode, message: &str) {
        {
            let mut last = self.last_error.lock().unwrap_or_else(PoisonError::into_inner);
            last.code = code;
            last.message = message.to_string();
        }
        let sink = self.sinks.read().unwrap_or_else(PoisonError::into_inner).error.clone();
        sink(code, message);
    }

    pub(crate) fn emit_trace(&self, message: &str) {
        let sink = self.sinks.read().unwrap_or_else(PoisonError::into_inner).trace.clone();
        sink(message);
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("config", &self.config())
            .field("last_error_code", &self.last_error_code())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
