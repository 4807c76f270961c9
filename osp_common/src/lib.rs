/*!
# OSP Common

Shared foundation of the OSP rendering engine API.

This crate holds what every part of the engine agrees on before any rendering
happens: the data type and texture format tables, typed data arrays, the
device-facing status/error channel, `--osp:*` command-line handling and
runtime loading of renderer modules.

## Architecture

- **DataType / TextureFormat**: stable wire tags with byte sizes and names
- **DataArray**: typed view over caller memory, shared or copied
- **Device**: configuration, output sinks and last error of a rendering context
- **Context**: process-wide current device and diagnostics logger
- **status**: `post_status`, `post_error`, `post_trace`, `warn_once`
- **ModuleLoader**: `ospray_module_<name>` libraries and built-in modules
- **translated_hash**: dense indices for sparse IDs
*/

// Internal modules
mod error;
mod context;
mod config;
mod device;
mod data_type;
mod texture_format;
mod data;
mod status;
mod command_line;
mod module;
mod id_translation;
pub mod log;

// Main osp namespace module
pub mod osp {
    // Error types
    pub use crate::error::{Error, ErrorCode, Result};

    // Process-wide context
    pub use crate::context::Context;

    // Devices and their configuration
    pub use crate::device::{Device, ErrorFn, MessageFn};
    pub use crate::config::{DeviceConfig, OutputStream};

    // Type tables
    pub use crate::data_type::{DataType, name_of_raw, size_of_raw};
    pub use crate::texture_format::{TextureFormat, texture_size_of_raw};

    // Data arrays
    pub use crate::data::{DataArray, DataElement, DataFlags, compute_checksum};

    // Status/error channel
    pub use crate::status::{
        log_level, post_error, post_error_to, post_status, post_status_to,
        post_trace, post_trace_to, warn_once,
    };

    // Command line
    pub use crate::command_line::{CommandLine, CommandLineOverrides, init_from_command_line};

    // Modules
    pub use crate::module::{
        ModuleInitFn, ModuleInitSymbol, ModuleLoader, init_symbol_name, is_module_loaded,
        library_name, load_local_module, loaded_modules, register_builtin_module,
    };

    // ID renumbering
    pub use crate::id_translation::{IdTranslation, translated_hash};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }
}

// Re-export math library at crate root
pub use glam;
