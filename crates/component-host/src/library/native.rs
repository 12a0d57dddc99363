//! Native module backend built on `libloading`.
//!
//! Unix targets open modules with `dlopen(RTLD_LAZY | RTLD_LOCAL)`, Windows
//! targets with `LoadLibraryExW`. Either way the result is erased to
//! [`libloading::Library`] so the raw OS handle never escapes this module.

use std::ffi::c_void;
use std::fmt;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use super::{ModuleLoader, SymbolAddress};
use crate::error::{Error, Result};

/// Loader backed by the platform's dynamic linker.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLoader;

impl NativeLoader {
    /// Create a new native loader.
    pub fn new() -> Self {
        Self
    }
}

/// A module opened by [`NativeLoader`].
pub struct NativeModule {
    library: Library,
    path: PathBuf,
}

impl NativeModule {
    /// Path the module was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(unix)]
fn open_library(path: &Path) -> std::result::Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_LAZY, RTLD_LOCAL};

    // Safety: module initializers run with full trust.
    unsafe { UnixLibrary::open(Some(path), RTLD_LAZY | RTLD_LOCAL) }.map(Into::into)
}

#[cfg(windows)]
fn open_library(path: &Path) -> std::result::Result<Library, libloading::Error> {
    use libloading::os::windows::Library as WindowsLibrary;

    // Safety: module initializers run with full trust.
    unsafe { WindowsLibrary::new(path) }.map(Into::into)
}

impl ModuleLoader for NativeLoader {
    type Handle = NativeModule;

    fn open(&self, path: &Path) -> Result<NativeModule> {
        let library = open_library(path).map_err(|e| Error::ModuleLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(NativeModule {
            library,
            path: path.to_path_buf(),
        })
    }

    fn resolve(&self, module: &NativeModule, symbol: &str) -> Result<SymbolAddress> {
        let not_found = |reason: String| {
            tracing::warn!(
                path = %module.path.display(),
                symbol,
                reason = %reason,
                "Failed to resolve symbol"
            );
            Error::SymbolNotFound {
                path: module.path.clone(),
                symbol: symbol.to_string(),
                reason,
            }
        };

        // Safety: the address is only reinterpreted by callers that know the
        // symbol's type.
        let resolved: std::result::Result<Symbol<'_, *mut c_void>, _> =
            unsafe { module.library.get(symbol.as_bytes()) };

        match resolved {
            Ok(address) => {
                SymbolAddress::new(*address).ok_or_else(|| not_found("symbol is null".to_string()))
            }
            Err(e) => Err(not_found(e.to_string())),
        }
    }

    fn unload(&self, module: NativeModule) -> Result<()> {
        let NativeModule { library, path } = module;
        match library.close() {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Module unloaded");
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to unload module");
                Err(Error::ModuleUnloadFailed {
                    path,
                    reason: e.to_string(),
                })
            }
        }
    }
}
