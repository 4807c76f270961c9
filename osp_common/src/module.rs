//! Renderer plugin modules
//!
//! A module named `foo` lives in the shared library `ospray_module_foo`
//! (platform naming applied) and exports `ospray_init_module_foo`, an
//! `extern "C-unwind" fn()` initializer. Statically linked modules can
//! register the same initializer in-process with `register_builtin_module`.
//!
//! Missing libraries and symbols are hard errors. A panic inside an
//! initializer is trapped and reported as `ErrorCode::UnknownError`.

use std::ffi::OsString;
use std::os::raw::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, ThreadId};
use libloading::Library;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::{Error, ErrorCode, Result};

/// Initializer exported by a module library
pub type ModuleInitSymbol = unsafe extern "C-unwind" fn();

/// Initializer of a statically linked module
pub type ModuleInitFn = Arc<dyn Fn() + Send + Sync>;

/// Registry of built-in modules and opened libraries
#[derive(Default)]
struct ModuleRegistry {
    builtins: FxHashMap<String, ModuleInitFn>,
    /// Opened libraries stay loaded for the life of the process
    libraries: FxHashMap<String, Library>,
    /// Modules whose initializer completed
    initialized: FxHashSet<String>,
    /// Modules whose initializer is running, with the thread running it
    initializing: FxHashMap<String, ThreadId>,
}

struct SharedRegistry {
    state: Mutex<ModuleRegistry>,
    /// Signalled whenever an initializer finishes
    ready: Condvar,
}

static MODULE_REGISTRY: OnceLock<SharedRegistry> = OnceLock::new();

fn shared() -> &'static SharedRegistry {
    MODULE_REGISTRY.get_or_init(|| SharedRegistry {
        state: Mutex::new(ModuleRegistry::default()),
        ready: Condvar::new(),
    })
}

fn registry() -> Result<MutexGuard<'static, ModuleRegistry>> {
    shared()
        .state
        .lock()
        .map_err(|_| Error::LockPoisoned("module registry".to_string()))
}

/// Clears the in-progress mark of a module and wakes waiting loaders
struct InitializingGuard<'a> {
    name: &'a str,
}

impl Drop for InitializingGuard<'_> {
    fn drop(&mut self) {
        let shared = shared();
        shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .initializing
            .remove(self.name);
        shared.ready.notify_all();
    }
}

/// Platform file name of a module's library, e.g. `libospray_module_foo.so`
pub fn library_name(module: &str) -> OsString {
    libloading::library_filename(format!("ospray_module_{}", module))
}

/// Name of a module's initializer symbol
pub fn init_symbol_name(module: &str) -> String {
    format!("ospray_init_module_{}", module)
}

/// Register the initializer of a statically linked module
///
/// Replaces any earlier registration under the same name.
pub fn register_builtin_module<F>(name: &str, init: F) -> Result<()>
where
    F: Fn() + Send + Sync + 'static,
{
    registry()?.builtins.insert(name.to_string(), Arc::new(init));
    crate::osp_debug!("osp::module", "Registered builtin module '{}'", name);
    Ok(())
}

/// Whether `name` has been initialized successfully
pub fn is_module_loaded(name: &str) -> bool {
    registry().map(|r| r.initialized.contains(name)).unwrap_or(false)
}

/// Names of all initialized modules, sorted
pub fn loaded_modules() -> Vec<String> {
    let mut names: Vec<String> = registry()
        .map(|r| r.initialized.iter().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}

/// Module loader
///
/// Looks for module libraries in its search paths first, then through the
/// system loader path.
#[derive(Debug, Clone, Default)]
pub struct ModuleLoader {
    search_paths: Vec<PathBuf>,
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that tries `paths` in order before the system loader path
    pub fn with_search_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Load and initialize the module `name`
    ///
    /// # Returns
    ///
    /// - `ErrorCode::NoError` once initialized (repeat loads do not re-run
    ///   the initializer)
    /// - `ErrorCode::UnknownError` if the initializer panicked
    /// - `ErrorCode::InvalidArgument` if the initializer symbol is null
    /// - `ErrorCode::InvalidOperation` if an initializer loads its own module
    ///
    /// Concurrent loads of one module run its initializer once; the other
    /// callers block until it finishes and then see its outcome.
    ///
    /// # Errors
    ///
    /// - `Error::LibraryNotFound` if no library could be opened
    /// - `Error::SymbolNotFound` if the library lacks the initializer
    pub fn load(&self, name: &str) -> Result<ErrorCode> {
        let builtin = {
            let mut registry = registry()?;
            loop {
                if registry.initialized.contains(name) {
                    return Ok(ErrorCode::NoError);
                }
                let owner = registry.initializing.get(name).copied();
                match owner {
                    None => break,
                    Some(owner) if owner == thread::current().id() => {
                        crate::osp_error!("osp::module", "Module '{}' loads itself during initialization", name);
                        return Ok(ErrorCode::InvalidOperation);
                    }
                    // Another thread is initializing it; wait for the outcome
                    Some(_) => {
                        registry = shared()
                            .ready
                            .wait(registry)
                            .map_err(|_| Error::LockPoisoned("module registry".to_string()))?;
                    }
                }
            }
            registry.initializing.insert(name.to_string(), thread::current().id());
            registry.builtins.get(name).cloned()
        };
        let _initializing = InitializingGuard { name };

        // Initializers run without the registry lock; they may register or
        // load further modules.
        let code = match builtin {
            Some(init) => run_initializer(name, || init()),
            None => {
                let init = self.open_library(name)?;
                match init {
                    Some(init) => run_initializer(name, || unsafe { init() }),
                    None => ErrorCode::InvalidArgument,
                }
            }
        };

        if code == ErrorCode::NoError {
            registry()?.initialized.insert(name.to_string());
            crate::osp_info!("osp::module", "Loaded module '{}'", name);
        }
        Ok(code)
    }

    /// Open the module library and resolve its initializer
    ///
    /// Returns `None` for a null initializer symbol.
    fn open_library(&self, name: &str) -> Result<Option<ModuleInitSymbol>> {
        let file_name = library_name(name);
        let symbol_name = init_symbol_name(name);

        let mut registry = registry()?;
        if !registry.libraries.contains_key(name) {
            let library = self.search_library(&file_name)?;
            registry.libraries.insert(name.to_string(), library);
        }
        let library = &registry.libraries[name];

        // SAFETY: the symbol is only read as an address here; the library
        // stays loaded in the registry for the rest of the process.
        let address = unsafe { library.get::<*const c_void>(symbol_name.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|err| {
                crate::osp_error!("osp::module", "Could not find module initializer {}: {}", symbol_name, err);
                Error::SymbolNotFound(symbol_name.clone())
            })?;

        if address.is_null() {
            crate::osp_error!("osp::module", "Module initializer {} is null", symbol_name);
            return Ok(None);
        }

        // SAFETY: modules export their initializer with this signature.
        let init = unsafe { std::mem::transmute::<*const c_void, ModuleInitSymbol>(address) };
        Ok(Some(init))
    }

    fn search_library(&self, file_name: &OsString) -> Result<Library> {
        let candidates = self
            .search_paths
            .iter()
            .map(|dir| dir.join(file_name).into_os_string())
            .chain(std::iter::once(file_name.clone()));

        let mut last_error = None;
        for candidate in candidates {
            // SAFETY: loading a module runs its static constructors; module
            // libraries are trusted engine plugins.
            match unsafe { Library::new(&candidate) } {
                Ok(library) => return Ok(library),
                Err(err) => last_error = Some(err),
            }
        }

        let name = file_name.to_string_lossy().into_owned();
        match last_error {
            Some(err) => crate::osp_error!("osp::module", "Could not open {}: {}", name, err),
            None => crate::osp_error!("osp::module", "Could not open {}", name),
        }
        Err(Error::LibraryNotFound(name))
    }
}

/// Run an initializer, converting a panic into `ErrorCode::UnknownError`
fn run_initializer<F: FnOnce()>(name: &str, init: F) -> ErrorCode {
    match panic::catch_unwind(AssertUnwindSafe(init)) {
        Ok(()) => ErrorCode::NoError,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            crate::osp_error!("osp::module", "Initializer of module '{}' failed: {}", name, reason);
            ErrorCode::UnknownError
        }
    }
}

/// Load and initialize the module `name` with the default loader
pub fn load_local_module(name: &str) -> Result<ErrorCode> {
    ModuleLoader::new().load(name)
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
