//! Error types for module loading and component registration.

use std::path::PathBuf;

/// Errors reported by the loader, holder and registry.
///
/// Every variant is recoverable: when one is returned no module loaded during
/// the failed operation is left mapped and the registry is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The module could not be loaded from the (canonicalized) path.
    #[error("Failed to load module {}: {reason}", .path.display())]
    ModuleLoadFailed { path: PathBuf, reason: String },

    /// A required symbol is missing from a loaded module.
    #[error("Symbol '{symbol}' not found in {}: {reason}", .path.display())]
    SymbolNotFound {
        path: PathBuf,
        symbol: String,
        reason: String,
    },

    /// The factory ran but produced no component.
    #[error("Factory '{factory}' in {} returned null", .path.display())]
    FactoryReturnedNull { path: PathBuf, factory: String },

    /// The platform refused to unload a module.
    #[error("Failed to unload module {}: {reason}", .path.display())]
    ModuleUnloadFailed { path: PathBuf, reason: String },

    /// The key is already bound to a component.
    #[error("Key already in use: {0}")]
    KeyAlreadyInUse(String),

    /// No component is registered under the key.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The registry rejected an insert after the key was found free.
    #[error("Insertion failed for key: {0}")]
    InsertionFailed(String),

    /// Registry configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error was raised while constructing a component holder.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Error::ModuleLoadFailed { .. }
                | Error::SymbolNotFound { .. }
                | Error::FactoryReturnedNull { .. }
        )
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
