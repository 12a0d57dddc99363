//! Ownership of one loaded module and the component it produced.
//!
//! A component's code and vtable live in the module that created it, so the
//! module must stay mapped until the component is gone. [`ComponentHolder`]
//! and [`ComponentRef`] share a single reference-counted allocation whose
//! drop destroys the component first and unloads the module last.

use std::ffi::c_void;
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Arc;

use component_sdk::{Component, ComponentDestroyFn, ComponentFactoryFn, DESTROY_SYMBOL};

use crate::error::{Error, Result};
use crate::library::{canonical_filename, ModuleLoader};

/// A loaded module erased from its loader type.
trait ModuleGuard: Send + Sync {
    fn path(&self) -> &Path;

    fn release(self: Box<Self>) -> Result<()>;
}

/// One successful load through a particular loader.
struct LoadedModule<L: ModuleLoader> {
    loader: Arc<L>,
    handle: L::Handle,
    path: PathBuf,
}

impl<L: ModuleLoader> LoadedModule<L> {
    fn unload(self) -> Result<()> {
        self.loader.unload(self.handle)
    }

    /// Unload while unwinding a failed construction.
    fn discard(self) {
        let path = self.path.clone();
        if let Err(e) = self.unload() {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Failed to unload module after construction failure"
            );
        }
    }
}

impl<L: ModuleLoader> ModuleGuard for LoadedModule<L> {
    fn path(&self) -> &Path {
        &self.path
    }

    fn release(self: Box<Self>) -> Result<()> {
        (*self).unload()
    }
}

/// The component instance together with the module that must outlive it.
struct SharedComponent {
    instance: NonNull<Box<dyn Component>>,
    destroy: ComponentDestroyFn,
    module: Option<Box<dyn ModuleGuard>>,
    factory_name: String,
}

// SAFETY: `Component` requires `Send + Sync`, and the pointer is owned
// exclusively by this struct until `Drop` hands it back to the module.
unsafe impl Send for SharedComponent {}
unsafe impl Sync for SharedComponent {}

impl SharedComponent {
    fn module_path(&self) -> &Path {
        self.module
            .as_ref()
            .map(|module| module.path())
            .unwrap_or_else(|| Path::new(""))
    }

    fn component(&self) -> &(dyn Component + 'static) {
        // SAFETY: the instance stays valid until `drop` runs.
        unsafe { &**self.instance.as_ptr() }
    }
}

impl Drop for SharedComponent {
    fn drop(&mut self) {
        // Destroy before unload: the destructor itself runs module code.
        unsafe { (self.destroy)(self.instance.as_ptr() as *mut c_void) };

        let Some(module) = self.module.take() else {
            return;
        };
        let path = module.path().to_path_buf();
        tracing::debug!(
            path = %path.display(),
            factory = %self.factory_name,
            "Component destroyed"
        );

        if let Err(e) = module.release() {
            tracing::error!(path = %path.display(), error = %e, "Failed to release module");
        }
    }
}

/// Shared handle to a live component.
///
/// Cloning is cheap. The component and its module stay alive while any
/// `ComponentRef` or the owning [`ComponentHolder`] exists; the last one
/// dropped destroys the component and unloads the module, exactly once.
#[derive(Clone)]
pub struct ComponentRef {
    shared: Arc<SharedComponent>,
}

impl ComponentRef {
    /// Canonical path of the module that produced the component.
    pub fn module_path(&self) -> &Path {
        self.shared.module_path()
    }

    /// Name of the factory that produced the component.
    pub fn factory_name(&self) -> &str {
        &self.shared.factory_name
    }

    /// Number of live references, the owning holder included.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.shared)
    }

    /// Whether both references point at the same component instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.shared, &b.shared)
    }
}

impl Deref for ComponentRef {
    type Target = dyn Component;

    fn deref(&self) -> &Self::Target {
        self.shared.component()
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef")
            .field("module_path", &self.module_path())
            .field("factory_name", &self.factory_name())
            .field("type_name", &self.type_name())
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

/// Binds a module path, factory name and configuration string to the module
/// loaded from that path and the component its factory produced.
///
/// A holder only exists in the fully constructed state: every failure during
/// [`ComponentHolder::load`] unloads the module before the error is returned.
/// Holders cannot be cloned; share the component through
/// [`ComponentHolder::component`] instead.
pub struct ComponentHolder {
    module_path: PathBuf,
    factory_name: String,
    config: String,
    component: ComponentRef,
}

impl ComponentHolder {
    /// Load `module_path`, call `factory_name` with `config` and take
    /// ownership of the result.
    ///
    /// # Errors
    /// - [`Error::ModuleLoadFailed`] if the module cannot be loaded.
    /// - [`Error::SymbolNotFound`] if the factory or the module's destroy
    ///   function is missing.
    /// - [`Error::FactoryReturnedNull`] if the factory produced nothing.
    pub fn load<L: ModuleLoader>(
        loader: &Arc<L>,
        module_path: impl AsRef<Path>,
        factory_name: &str,
        config: &str,
    ) -> Result<Self> {
        let module_path = module_path.as_ref();
        let canonical = canonical_filename(module_path, loader.platform());

        let handle = loader.load(module_path)?;
        let module = LoadedModule {
            loader: Arc::clone(loader),
            handle,
            path: canonical.clone(),
        };

        let factory = match loader.resolve(&module.handle, factory_name) {
            Ok(address) => address,
            Err(e) => {
                module.discard();
                return Err(e);
            }
        };
        let destroy = match loader.resolve(&module.handle, DESTROY_SYMBOL) {
            Ok(address) => address,
            Err(e) => {
                module.discard();
                return Err(e);
            }
        };

        // SAFETY: the module ABI fixes both signatures, and the module stays
        // loaded for as long as the function pointers are reachable.
        let factory: ComponentFactoryFn = unsafe { factory.cast_fn() };
        let destroy: ComponentDestroyFn = unsafe { destroy.cast_fn() };

        let raw = unsafe { factory(config.as_ptr(), config.len()) };
        let Some(instance) = NonNull::new(raw as *mut Box<dyn Component>) else {
            tracing::warn!(
                path = %canonical.display(),
                factory = factory_name,
                "Factory returned null"
            );
            module.discard();
            return Err(Error::FactoryReturnedNull {
                path: canonical,
                factory: factory_name.to_string(),
            });
        };

        let shared = SharedComponent {
            instance,
            destroy,
            module: Some(Box::new(module)),
            factory_name: factory_name.to_string(),
        };

        tracing::debug!(
            path = %canonical.display(),
            factory = factory_name,
            "Component created"
        );

        Ok(Self {
            module_path: module_path.to_path_buf(),
            factory_name: factory_name.to_string(),
            config: config.to_string(),
            component: ComponentRef {
                shared: Arc::new(shared),
            },
        })
    }

    /// Module path as requested, before canonicalization.
    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    /// Name of the factory function.
    pub fn factory_name(&self) -> &str {
        &self.factory_name
    }

    /// Configuration string passed to the factory.
    pub fn config(&self) -> &str {
        &self.config
    }

    /// Take a shared reference to the component.
    pub fn component(&self) -> ComponentRef {
        self.component.clone()
    }

    /// Number of references held outside this holder.
    pub fn external_references(&self) -> usize {
        self.component.strong_count() - 1
    }
}

impl fmt::Debug for ComponentHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHolder")
            .field("module_path", &self.module_path)
            .field("factory_name", &self.factory_name)
            .field("config", &self.config)
            .field("external_references", &self.external_references())
            .finish()
    }
}

impl Drop for ComponentHolder {
    fn drop(&mut self) {
        let outstanding = self.external_references();
        if outstanding > 0 {
            tracing::debug!(
                path = %self.component.module_path().display(),
                outstanding,
                "Holder released; unload deferred to the last component reference"
            );
        }
    }
}
