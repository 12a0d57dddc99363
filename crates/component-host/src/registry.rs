//! Keyed registry of loaded components.
//!
//! Each key moves through `absent → loaded → absent`. Loading under a key
//! that is already bound is always rejected; nothing is ever overwritten.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::{ComponentSpec, RegistryConfig};
use crate::error::{Error, Result};
use crate::holder::{ComponentHolder, ComponentRef};
use crate::library::{ModuleLoader, NativeLoader};

/// Outcome of [`ComponentRegistry::load_all`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Keys that were loaded, in configuration order.
    pub loaded: Vec<String>,

    /// Keys that failed, with the reason.
    pub failed: Vec<(String, Error)>,
}

impl LoadReport {
    /// Whether every requested component was loaded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Components indexed by a caller-chosen unique key.
///
/// The registry is not internally synchronized. Wrap it in a lock, or use
/// [`SharedComponentRegistry`](crate::SharedComponentRegistry), when several
/// threads load and unload through the same instance.
///
/// Dropping the registry releases every remaining holder. Components still
/// referenced through a [`ComponentRef`] are destroyed, and their modules
/// unloaded, when that last reference goes away.
pub struct ComponentRegistry<L: ModuleLoader = NativeLoader> {
    loader: Arc<L>,
    components: BTreeMap<String, ComponentHolder>,
}

impl ComponentRegistry<NativeLoader> {
    /// Create an empty registry using the platform's dynamic linker.
    pub fn new() -> Self {
        Self::with_loader(NativeLoader::new())
    }
}

impl Default for ComponentRegistry<NativeLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ModuleLoader> ComponentRegistry<L> {
    /// Create an empty registry that loads modules through `loader`.
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            components: BTreeMap::new(),
        }
    }

    /// The loader used for every module.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Load `module_path`, build a component with `factory_name` and `config`,
    /// and bind it to `key`.
    ///
    /// # Errors
    /// - [`Error::KeyAlreadyInUse`] if `key` is bound; the existing entry is
    ///   left untouched and no module is loaded.
    /// - Any holder construction error, in which case nothing is inserted.
    /// - [`Error::InsertionFailed`] if the key was taken between the check
    ///   and the insert; the new component is torn down.
    pub fn load_component(
        &mut self,
        key: &str,
        module_path: impl AsRef<Path>,
        factory_name: &str,
        config: &str,
    ) -> Result<()> {
        let module_path = module_path.as_ref();

        if self.components.contains_key(key) {
            tracing::warn!(key, path = %module_path.display(), "Key already in use");
            return Err(Error::KeyAlreadyInUse(key.to_string()));
        }

        let holder = ComponentHolder::load(&self.loader, module_path, factory_name, config)
            .map_err(|e| {
                tracing::warn!(
                    key,
                    path = %module_path.display(),
                    factory = factory_name,
                    error = %e,
                    "Failed to load component"
                );
                e
            })?;

        match self.components.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(holder);
            }
            Entry::Occupied(_) => {
                tracing::error!(key, "Insertion failed; releasing the new component");
                drop(holder);
                return Err(Error::InsertionFailed(key.to_string()));
            }
        }

        tracing::info!(
            key,
            path = %module_path.display(),
            factory = factory_name,
            "Component loaded"
        );
        Ok(())
    }

    /// Load the component described by `spec`.
    pub fn load(&mut self, spec: &ComponentSpec) -> Result<()> {
        self.load_component(&spec.key, &spec.library, &spec.factory, &spec.config)
    }

    /// Load every component in `config`, continuing past failures.
    ///
    /// Relative library paths are resolved with
    /// [`RegistryConfig::resolve_library`].
    pub fn load_all(&mut self, config: &RegistryConfig) -> LoadReport {
        let mut report = LoadReport::default();

        for spec in &config.components {
            let library = config.resolve_library(&spec.library);
            match self.load_component(&spec.key, &library, &spec.factory, &spec.config) {
                Ok(()) => report.loaded.push(spec.key.clone()),
                Err(e) => report.failed.push((spec.key.clone(), e)),
            }
        }

        if !report.is_complete() {
            tracing::warn!(
                loaded = report.loaded.len(),
                failed = report.failed.len(),
                "Some components failed to load"
            );
        }

        report
    }

    /// Remove the component bound to `key`.
    ///
    /// The component is destroyed and its module unloaded right away unless a
    /// [`ComponentRef`] to it is still alive elsewhere.
    ///
    /// # Errors
    /// [`Error::KeyNotFound`] if nothing is bound to `key`.
    pub fn unload_component(&mut self, key: &str) -> Result<()> {
        match self.components.remove(key) {
            Some(holder) => {
                drop(holder);
                tracing::info!(key, "Component unloaded");
                Ok(())
            }
            None => {
                tracing::warn!(key, "Key not found");
                Err(Error::KeyNotFound(key.to_string()))
            }
        }
    }

    /// Shared reference to the component bound to `key`.
    pub fn get(&self, key: &str) -> Option<ComponentRef> {
        self.components.get(key).map(ComponentHolder::component)
    }

    /// The holder bound to `key`.
    pub fn holder(&self, key: &str) -> Option<&ComponentHolder> {
        self.components.get(key)
    }

    /// Whether `key` is bound.
    pub fn contains(&self, key: &str) -> bool {
        self.components.contains_key(key)
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no key is bound.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Bound keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Release every holder.
    pub fn clear(&mut self) {
        if !self.components.is_empty() {
            tracing::debug!(count = self.components.len(), "Releasing all components");
        }
        self.components.clear();
    }
}

impl<L: ModuleLoader> fmt::Debug for ComponentRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.components)
            .finish()
    }
}

impl<L: ModuleLoader> Drop for ComponentRegistry<L> {
    fn drop(&mut self) {
        self.clear();
    }
}
