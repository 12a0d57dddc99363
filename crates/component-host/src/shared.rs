//! Thread-safe wrapper around [`ComponentRegistry`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::config::{ComponentSpec, RegistryConfig};
use crate::error::Result;
use crate::holder::ComponentRef;
use crate::library::{ModuleLoader, NativeLoader};
use crate::registry::{ComponentRegistry, LoadReport};

/// A [`ComponentRegistry`] behind an internal lock, for callers that load and
/// unload from several threads.
///
/// Every operation holds the lock for its whole duration, including the
/// module load and the factory call, so concurrent callers observe the same
/// key uniqueness guarantees as single-threaded use. Clones share the same
/// registry.
pub struct SharedComponentRegistry<L: ModuleLoader = NativeLoader> {
    inner: Arc<Mutex<ComponentRegistry<L>>>,
}

impl SharedComponentRegistry<NativeLoader> {
    /// Create an empty shared registry using the platform's dynamic linker.
    pub fn new() -> Self {
        Self::from_registry(ComponentRegistry::new())
    }
}

impl Default for SharedComponentRegistry<NativeLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ModuleLoader> SharedComponentRegistry<L> {
    /// Create an empty shared registry using `loader`.
    pub fn with_loader(loader: L) -> Self {
        Self::from_registry(ComponentRegistry::with_loader(loader))
    }

    /// Wrap an existing registry.
    pub fn from_registry(registry: ComponentRegistry<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// See [`ComponentRegistry::load_component`].
    pub fn load_component(
        &self,
        key: &str,
        module_path: impl AsRef<Path>,
        factory_name: &str,
        config: &str,
    ) -> Result<()> {
        self.inner
            .lock()
            .load_component(key, module_path, factory_name, config)
    }

    /// See [`ComponentRegistry::load`].
    pub fn load(&self, spec: &ComponentSpec) -> Result<()> {
        self.inner.lock().load(spec)
    }

    /// See [`ComponentRegistry::load_all`].
    pub fn load_all(&self, config: &RegistryConfig) -> LoadReport {
        self.inner.lock().load_all(config)
    }

    /// See [`ComponentRegistry::unload_component`].
    pub fn unload_component(&self, key: &str) -> Result<()> {
        self.inner.lock().unload_component(key)
    }

    /// See [`ComponentRegistry::get`].
    pub fn get(&self, key: &str) -> Option<ComponentRef> {
        self.inner.lock().get(key)
    }

    /// See [`ComponentRegistry::contains`].
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    /// See [`ComponentRegistry::len`].
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// See [`ComponentRegistry::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Snapshot of the bound keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().keys().map(str::to_string).collect()
    }

    /// Lock the registry for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, ComponentRegistry<L>> {
        self.inner.lock()
    }
}

impl<L: ModuleLoader> Clone for SharedComponentRegistry<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: ModuleLoader> fmt::Debug for SharedComponentRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("SharedComponentRegistry");
        match self.inner.try_lock() {
            Some(registry) => {
                let keys: Vec<&str> = registry.keys().collect();
                debug.field("components", &keys);
            }
            None => {
                debug.field("components", &format_args!("<locked>"));
            }
        }
        debug.finish()
    }
}
