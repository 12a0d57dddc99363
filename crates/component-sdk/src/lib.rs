//! SDK for native components loaded by `component-host`.
//!
//! A component module is a shared library (`cdylib`) that exports one C-linkage
//! factory function per entry point plus a single destroy function. The host
//! loads the module, calls a factory with a configuration string and keeps the
//! module mapped until the component it produced has been destroyed.
//!
//! ## Module ABI rules
//!
//! - Every factory has the signature of [`abi::ComponentFactoryFn`] and returns
//!   either a pointer produced by [`abi::into_raw`] or null.
//! - The module exports [`DESTROY_SYMBOL`] with the signature of
//!   [`abi::ComponentDestroyFn`]. The host never frees a component itself; it
//!   hands the pointer back to the module that allocated it.
//! - Host and module must be built with the same compiler release, since the
//!   component crosses the boundary as a Rust trait object.
//!
//! ## Example
//!
//! ```ignore
//! use component_sdk::prelude::*;
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! impl Component for Greeter {}
//!
//! fn create(config: &str) -> Option<Greeter> {
//!     Some(Greeter { greeting: config.to_string() })
//! }
//!
//! export_components! {
//!     Greeter_Factory => create,
//! }
//! ```

pub mod abi;
pub mod component;
pub mod macros;

pub use abi::{ComponentDestroyFn, ComponentFactoryFn};
pub use component::Component;

/// Name of the destroy function every component module must export.
pub const DESTROY_SYMBOL: &str = "component_destroy";

/// Re-exports commonly used by component modules.
pub mod prelude {
    pub use crate::abi::{ComponentDestroyFn, ComponentFactoryFn};
    pub use crate::component::Component;
    pub use crate::export_components;
    pub use crate::DESTROY_SYMBOL;
}
