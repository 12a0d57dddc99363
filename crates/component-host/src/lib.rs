//! Native component host.
//!
//! Loads shared libraries, calls an exported factory to build a
//! [`Component`], and keeps each component under a unique key until it is
//! unloaded.
//!
//! ## Pieces
//!
//! - [`library`]: the [`ModuleLoader`] seam and the native backend, including
//!   filename canonicalization (`Test_Component` → `libTest_Component.so` or
//!   `Test_Component.dll`).
//! - [`holder`]: [`ComponentHolder`] ties a component to the module it came
//!   from and guarantees the component is destroyed before the module is
//!   unloaded.
//! - [`registry`]: [`ComponentRegistry`] maps keys to holders with typed
//!   load/unload results; [`SharedComponentRegistry`] adds a lock.
//!
//! ## Example
//!
//! ```no_run
//! use component_host::{ComponentRegistry, Error};
//!
//! let mut registry = ComponentRegistry::new();
//! registry.load_component("A", "Test_Component", "Test_Component_Factory", "")?;
//!
//! assert!(matches!(
//!     registry.load_component("A", "Test_Component", "Test_Component_Factory", ""),
//!     Err(Error::KeyAlreadyInUse(_))
//! ));
//!
//! registry.unload_component("A")?;
//! # Ok::<(), component_host::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod holder;
pub mod library;
pub mod logging;
pub mod registry;
pub mod shared;

pub use component_sdk::{Component, DESTROY_SYMBOL};
pub use config::{ComponentSpec, RegistryConfig};
pub use error::{Error, Result};
pub use holder::{ComponentHolder, ComponentRef};
pub use library::{canonical_filename, ModuleLoader, NativeLoader, Platform, SymbolAddress};
pub use registry::{ComponentRegistry, LoadReport};
pub use shared::SharedComponentRegistry;

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::config::{ComponentSpec, RegistryConfig};
    pub use crate::error::{Error, Result};
    pub use crate::holder::{ComponentHolder, ComponentRef};
    pub use crate::library::{ModuleLoader, NativeLoader, Platform};
    pub use crate::registry::ComponentRegistry;
    pub use crate::shared::SharedComponentRegistry;
    pub use component_sdk::Component;
}
