//! Unit tests for module loading
//!
//! The registry is process-wide; every test uses its own module names.

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_library_and_symbol_names() {
    let file = library_name("cpu");
    let file = file.to_string_lossy();
    assert!(file.contains("ospray_module_cpu"));
    assert_eq!(init_symbol_name("cpu"), "ospray_init_module_cpu");
}

#[test]
fn test_missing_library() {
    let result = load_local_module("module_tests_does_not_exist");
    assert!(matches!(result, Err(Error::LibraryNotFound(_))));
    assert!(!is_module_loaded("module_tests_does_not_exist"));
}

#[test]
fn test_missing_library_with_search_paths() {
    let loader = ModuleLoader::with_search_paths(["/nonexistent/a", "/nonexistent/b"]);
    assert_eq!(loader.search_paths().len(), 2);

    let result = loader.load("module_tests_nowhere");
    assert!(matches!(result, Err(Error::LibraryNotFound(_))));
}

#[test]
fn test_builtin_runs_once() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    register_builtin_module("module_tests_once", || {
        CALLS.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    assert_eq!(load_local_module("module_tests_once"), Ok(ErrorCode::NoError));
    assert_eq!(load_local_module("module_tests_once"), Ok(ErrorCode::NoError));

    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    assert!(is_module_loaded("module_tests_once"));
    assert!(loaded_modules().contains(&"module_tests_once".to_string()));
}

#[test]
fn test_panicking_initializer_is_unknown_error() {
    register_builtin_module("module_tests_panics", || panic!("init failed")).unwrap();

    assert_eq!(load_local_module("module_tests_panics"), Ok(ErrorCode::UnknownError));
    assert!(!is_module_loaded("module_tests_panics"));
}

#[test]
fn test_failed_initializer_may_be_retried() {
    static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);
    register_builtin_module("module_tests_retry", || {
        if ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("first attempt");
        }
    })
    .unwrap();

    assert_eq!(load_local_module("module_tests_retry"), Ok(ErrorCode::UnknownError));
    assert_eq!(load_local_module("module_tests_retry"), Ok(ErrorCode::NoError));
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 2);
}

#[test]
fn test_initializer_may_load_dependencies() {
    register_builtin_module("module_tests_dependency", || {}).unwrap();
    register_builtin_module("module_tests_dependent", || {
        assert_eq!(load_local_module("module_tests_dependency"), Ok(ErrorCode::NoError));
    })
    .unwrap();

    assert_eq!(load_local_module("module_tests_dependent"), Ok(ErrorCode::NoError));
    assert!(is_module_loaded("module_tests_dependency"));
}

#[test]
fn test_loaded_modules_sorted() {
    register_builtin_module("module_tests_sort_b", || {}).unwrap();
    register_builtin_module("module_tests_sort_a", || {}).unwrap();
    load_local_module("module_tests_sort_b").unwrap();
    load_local_module("module_tests_sort_a").unwrap();

    let names: Vec<String> = loaded_modules()
        .into_iter()
        .filter(|name| name.starts_with("module_tests_sort_"))
        .collect();
    assert_eq!(names, vec!["module_tests_sort_a".to_string(), "module_tests_sort_b".to_string()]);
}

// ============================================================================
// CONCURRENT LOADS
// ============================================================================

#[test]
fn test_concurrent_loads_initialize_once() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    register_builtin_module("module_tests_concurrent", || {
        CALLS.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(100));
    })
    .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| load_local_module("module_tests_concurrent")))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(ErrorCode::NoError));
    }

    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    assert!(is_module_loaded("module_tests_concurrent"));
}

#[test]
fn test_concurrent_loads_of_different_modules() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    let names = ["module_tests_parallel_a", "module_tests_parallel_b", "module_tests_parallel_c"];
    for name in names {
        register_builtin_module(name, || {
            CALLS.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
        })
        .unwrap();
    }

    let handles: Vec<_> = names
        .iter()
        .chain(names.iter())
        .map(|&name| std::thread::spawn(move || load_local_module(name)))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(ErrorCode::NoError));
    }

    assert_eq!(CALLS.load(Ordering::SeqCst), 3);
}

#[test]
fn test_initializer_loading_itself_is_invalid() {
    static INNER: Mutex<Option<Result<ErrorCode>>> = Mutex::new(None);
    register_builtin_module("module_tests_self", || {
        *INNER.lock().unwrap() = Some(load_local_module("module_tests_self"));
    })
    .unwrap();

    assert_eq!(load_local_module("module_tests_self"), Ok(ErrorCode::NoError));
    assert_eq!(*INNER.lock().unwrap(), Some(Ok(ErrorCode::InvalidOperation)));
}

#[test]
fn test_failed_library_load_clears_in_progress_mark() {
    // A second attempt must fail the same way rather than wait forever
    for _ in 0..2 {
        let result = load_local_module("module_tests_missing_twice");
        assert!(matches!(result, Err(Error::LibraryNotFound(_))));
    }
}

// ============================================================================
// SHARED LIBRARIES
// ============================================================================

/// A system library with no module initializer, if one can be found
#[cfg(target_os = "linux")]
fn system_library() -> Option<std::path::PathBuf> {
    [
        "/lib/x86_64-linux-gnu/libm.so.6",
        "/usr/lib/x86_64-linux-gnu/libm.so.6",
        "/lib/aarch64-linux-gnu/libm.so.6",
        "/usr/lib/aarch64-linux-gnu/libm.so.6",
        "/lib64/libm.so.6",
        "/usr/lib64/libm.so.6",
        "/usr/lib/libm.so.6",
        "/lib/libm.so.6",
    ]
    .iter()
    .map(std::path::PathBuf::from)
    .find(|path| path.exists())
}

#[cfg(target_os = "linux")]
#[test]
fn test_library_without_initializer() {
    let Some(source) = system_library() else {
        eprintln!("no system libm found, skipping");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(&source, dir.path().join(library_name("module_tests_nosym"))).unwrap();

    let loader = ModuleLoader::with_search_paths([dir.path()]);
    let result = loader.load("module_tests_nosym");

    assert_eq!(
        result,
        Err(Error::SymbolNotFound("ospray_init_module_module_tests_nosym".to_string()))
    );
    assert!(!is_module_loaded("module_tests_nosym"));

    // The opened library is kept; a retry resolves against it again
    assert!(matches!(loader.load("module_tests_nosym"), Err(Error::SymbolNotFound(_))));
}

#[test]
fn test_search_path_that_is_not_a_library() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(library_name("module_tests_garbage")), b"not a library").unwrap();

    let loader = ModuleLoader::with_search_paths([dir.path()]);
    assert!(matches!(loader.load("module_tests_garbage"), Err(Error::LibraryNotFound(_))));
}

// ============================================================================
// FOREIGN INITIALIZERS
// ============================================================================

unsafe extern "C-unwind" fn initializer_that_panics() {
    panic!("foreign initializer failed");
}

unsafe extern "C-unwind" fn initializer_that_counts() {
    FOREIGN_CALLS.fetch_add(1, Ordering::SeqCst);
}

static FOREIGN_CALLS: AtomicUsize = AtomicUsize::new(0);

#[test]
fn test_foreign_initializer_panic_is_trapped() {
    let init: ModuleInitSymbol = initializer_that_panics;
    assert_eq!(run_initializer("module_tests_foreign", || unsafe { init() }), ErrorCode::UnknownError);
}

#[test]
fn test_foreign_initializer_runs() {
    let init: ModuleInitSymbol = initializer_that_counts;
    assert_eq!(run_initializer("module_tests_foreign_ok", || unsafe { init() }), ErrorCode::NoError);
    assert_eq!(FOREIGN_CALLS.load(Ordering::SeqCst), 1);
}
