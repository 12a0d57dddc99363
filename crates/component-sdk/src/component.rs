//! The capability surface shared by every loadable component.

/// A component produced by a module's factory function.
///
/// The host treats components as opaque: it only constructs them through a
/// factory and later destroys them. Implementors add whatever behavior the
/// application needs on top.
pub trait Component: Send + Sync {
    /// Fully qualified name of the concrete component type.
    ///
    /// Resolved inside the module that defines the component, so it names the
    /// plugin's type rather than anything in the host.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
