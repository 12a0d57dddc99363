//! Loading native code modules.
//!
//! [`ModuleLoader`] is the seam between the component holder and the
//! platform's dynamic linker. [`NativeLoader`] is the production backend; the
//! concrete OS API behind it is picked at compile time.

pub mod naming;
pub mod native;

use std::ffi::c_void;
use std::path::Path;
use std::ptr::NonNull;

pub use naming::{canonical_filename, Platform};
pub use native::{NativeLoader, NativeModule};

use crate::error::Result;

/// Non-null address of an exported symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolAddress(NonNull<c_void>);

impl SymbolAddress {
    /// Wrap a raw address, rejecting null.
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// The raw address.
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    /// Reinterpret the address as a function pointer.
    ///
    /// # Safety
    /// `F` must be a function pointer type matching the exported symbol's
    /// actual signature, and the owning module must stay loaded while the
    /// result is in use.
    pub unsafe fn cast_fn<F: Copy>(self) -> F {
        debug_assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<*mut c_void>()
        );
        std::mem::transmute_copy(&self.0.as_ptr())
    }
}

/// Platform primitives for loading modules, resolving symbols and unloading.
///
/// Handles are move-only: [`ModuleLoader::unload`] consumes the handle, so a
/// module cannot be released twice through the same handle.
pub trait ModuleLoader: Send + Sync + 'static {
    /// Opaque handle to one successful load.
    type Handle: Send + Sync + 'static;

    /// Naming convention applied by [`ModuleLoader::load`].
    fn platform(&self) -> Platform {
        Platform::current()
    }

    /// Open the module at exactly `path`.
    fn open(&self, path: &Path) -> Result<Self::Handle>;

    /// Look up an exported symbol by exact name.
    ///
    /// Failure leaves the module loaded; unloading is up to the caller.
    fn resolve(&self, handle: &Self::Handle, symbol: &str) -> Result<SymbolAddress>;

    /// Release one load of the module, reporting what the platform reports.
    ///
    /// The module can stay mapped if other code in the process still holds it.
    fn unload(&self, handle: Self::Handle) -> Result<()>;

    /// Canonicalize `path` for [`ModuleLoader::platform`] and open it.
    fn load(&self, path: &Path) -> Result<Self::Handle> {
        let canonical = canonical_filename(path, self.platform());
        match self.open(&canonical) {
            Ok(handle) => {
                tracing::debug!(path = %canonical.display(), "Module loaded");
                Ok(handle)
            }
            Err(e) => {
                tracing::warn!(path = %canonical.display(), error = %e, "Failed to load module");
                Err(e)
            }
        }
    }
}
