//! Integration tests for device setup and the status/error channel
//!
//! These tests drive the public API end to end: configure a device from
//! variables and command-line flags, install it, then report through it.
//!
//! Run with: cargo test --test status_integration_tests

use osp_common::osp::{
    self, CommandLine, Context, DataArray, DataFlags, DataType, Device, DeviceConfig, Error,
    ErrorCode, OutputStream,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

struct Capture {
    messages: Arc<Mutex<Vec<String>>>,
    errors: Arc<Mutex<Vec<(ErrorCode, String)>>>,
}

fn install_capturing_device(config: DeviceConfig) -> (Arc<Device>, Capture) {
    Context::release_device();
    let device = Device::with_config(config);

    let messages = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    device.set_message_sink(move |msg| sink.lock().unwrap().push(msg.to_string()));
    let sink = Arc::clone(&errors);
    device.set_error_sink(move |code, msg| sink.lock().unwrap().push((code, msg.to_string())));

    let device = Context::install_device(device).unwrap();
    (device, Capture { messages, errors })
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// DEVICE SETUP
// ============================================================================

#[test]
#[serial]
fn test_integration_env_then_command_line() {
    let vars: HashMap<&str, &str> = [
        ("OSPRAY_LOG_LEVEL", "1"),
        ("OSPRAY_THREADS", "4"),
        ("OSPRAY_ERROR_OUTPUT", "cout"),
    ]
    .into_iter()
    .collect();

    let mut config = DeviceConfig::default();
    config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(config.log_level, 1);
    assert_eq!(config.num_threads, Some(4));

    let (device, _) = install_capturing_device(config);

    // Flags take precedence over the environment
    let mut argv = args(&["viewer", "--osp:loglevel", "2", "scene.obj"]);
    osp::init_from_command_line(&mut argv, &device).unwrap();

    assert_eq!(argv, args(&["viewer", "scene.obj"]));
    assert_eq!(osp::log_level(), 2);
    assert_eq!(device.config().num_threads, Some(4));
    assert_eq!(device.config().error_output, Some(OutputStream::Stdout));

    Context::release_device();
}

#[test]
#[serial]
fn test_integration_command_line_errors() {
    let mut argv = args(&["viewer", "--osp:loglevel"]);
    assert_eq!(
        CommandLine::parse(&mut argv),
        Err(Error::MissingArgument("--osp:loglevel".to_string()))
    );
    assert_eq!(argv.len(), 2);

    let mut argv = args(&["viewer", "--osp:loglevel", "loud"]);
    let error = CommandLine::parse(&mut argv).unwrap_err();
    assert_eq!(error.code(), ErrorCode::InvalidArgument);
}

// ============================================================================
// REPORTING
// ============================================================================

#[test]
#[serial]
fn test_integration_status_levels() {
    let (_device, capture) = install_capturing_device(DeviceConfig {
        log_level: 1,
        ..DeviceConfig::default()
    });

    osp::post_status("loading scene", 0);
    osp::post_status("parsed 12 meshes", 1);
    osp::post_status("mesh 3 has 1024 triangles", 2);

    assert_eq!(
        *capture.messages.lock().unwrap(),
        vec!["loading scene\n".to_string(), "parsed 12 meshes\n".to_string()]
    );

    Context::release_device();
}

#[test]
#[serial]
fn test_integration_error_from_library_result() {
    let (device, capture) = install_capturing_device(DeviceConfig::default());

    let bytes = [0u8; 10];
    let error = DataArray::new(3, DataType::Float, &bytes, DataFlags::SHARED_BUFFER).unwrap_err();
    osp::post_error(error.code(), &error.to_string());

    assert_eq!(device.last_error_code(), ErrorCode::InvalidArgument);
    assert_eq!(device.last_error_message(), error.to_string());
    assert_eq!(capture.errors.lock().unwrap().len(), 1);

    Context::release_device();
}

#[test]
#[serial]
fn test_integration_warn_once() {
    let (_device, capture) = install_capturing_device(DeviceConfig::default());

    for _ in 0..3 {
        osp::warn_once("integration: 'radius' is deprecated", 0);
    }

    assert_eq!(
        *capture.messages.lock().unwrap(),
        vec!["Warning: integration: 'radius' is deprecated (only reporting first occurrence)\n".to_string()]
    );

    Context::release_device();
}

#[test]
#[serial]
fn test_integration_reporting_without_device() {
    Context::release_device();

    // None of these may fail or panic
    osp::post_status("dropped", 0);
    osp::post_trace("dropped");
    osp::post_error(ErrorCode::UnsupportedCpu, "reported on stderr");
    assert_eq!(osp::log_level(), 0);
}

#[test]
#[serial]
fn test_integration_module_failure_reported() {
    let (device, _capture) = install_capturing_device(DeviceConfig::default());

    osp::register_builtin_module("integration_broken", || panic!("no backend")).unwrap();
    let code = osp::load_local_module("integration_broken").unwrap();
    if code != ErrorCode::NoError {
        osp::post_error(code, "could not load module 'integration_broken'");
    }

    assert_eq!(device.last_error_code(), ErrorCode::UnknownError);
    assert!(!osp::is_module_loaded("integration_broken"));

    Context::release_device();
}
