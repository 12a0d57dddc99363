//! Registry configuration.
//!
//! A registry can be populated from a TOML document listing the components to
//! load:
//!
//! ```toml
//! search_dir = "/opt/host/components"
//!
//! [[component]]
//! key = "A"
//! library = "Test_Component"
//! factory = "Test_Component_Factory"
//! config = "verbose=true"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable names.
pub mod env_vars {
    /// Directory used to resolve relative library paths when the
    /// configuration does not set `search_dir`.
    pub const SEARCH_DIR: &str = "COMPONENT_HOST_PATH";
    /// Log filter directives, in `EnvFilter` syntax.
    pub const LOG_FILTER: &str = "COMPONENT_HOST_LOG";
    /// Emit JSON log lines when set to `true`.
    pub const LOG_JSON: &str = "COMPONENT_HOST_LOG_JSON";
}

/// One component to load: the registry key, the module, the factory and the
/// configuration string handed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Registry key.
    pub key: String,

    /// Module path; canonicalized by the loader.
    pub library: PathBuf,

    /// Exported factory name.
    pub factory: String,

    /// Configuration string passed to the factory.
    #[serde(default)]
    pub config: String,
}

impl ComponentSpec {
    /// Create a spec with an empty configuration string.
    pub fn new(
        key: impl Into<String>,
        library: impl Into<PathBuf>,
        factory: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            library: library.into(),
            factory: factory.into(),
            config: String::new(),
        }
    }

    /// Set the configuration string.
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = config.into();
        self
    }
}

/// A set of components to load into a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base directory for relative library paths.
    #[serde(default)]
    pub search_dir: Option<PathBuf>,

    /// Components, loaded in order.
    #[serde(default, rename = "component")]
    pub components: Vec<ComponentSpec>,
}

impl RegistryConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Add a component.
    pub fn with_component(mut self, spec: ComponentSpec) -> Self {
        self.components.push(spec);
        self
    }

    /// Effective search directory: the configured one, else
    /// [`env_vars::SEARCH_DIR`].
    pub fn search_dir(&self) -> Option<PathBuf> {
        self.search_dir
            .clone()
            .or_else(|| std::env::var_os(env_vars::SEARCH_DIR).map(PathBuf::from))
    }

    /// Resolve a library path against the search directory. Absolute paths
    /// are returned unchanged.
    pub fn resolve_library(&self, library: &Path) -> PathBuf {
        if library.is_absolute() {
            return library.to_path_buf();
        }
        match self.search_dir() {
            Some(dir) => dir.join(library),
            None => library.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components() {
        let config = RegistryConfig::from_toml_str(
            r#"
            search_dir = "/opt/components"

            [[component]]
            key = "A"
            library = "Test_Component"
            factory = "Test_Component_Factory"
            config = "verbose=true"

            [[component]]
            key = "B"
            library = "/usr/lib/libMixer.so"
            factory = "Mixer_Factory"
            "#,
        )
        .unwrap();

        assert_eq!(config.search_dir, Some(PathBuf::from("/opt/components")));
        assert_eq!(config.components.len(), 2);
        assert_eq!(
            config.components[0],
            ComponentSpec::new("A", "Test_Component", "Test_Component_Factory")
                .with_config("verbose=true")
        );
        assert_eq!(config.components[1].config, "");
    }

    #[test]
    fn test_empty_document() {
        let config = RegistryConfig::from_toml_str("").unwrap();
        assert!(config.components.is_empty());
        assert!(config.search_dir.is_none());
    }

    #[test]
    fn test_missing_field_is_config_error() {
        let result = RegistryConfig::from_toml_str(
            r#"
            [[component]]
            key = "A"
            library = "Test_Component"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_library() {
        let config = RegistryConfig {
            search_dir: Some(PathBuf::from("/opt/components")),
            components: Vec::new(),
        };

        assert_eq!(
            config.resolve_library(Path::new("Test_Component")),
            PathBuf::from("/opt/components/Test_Component")
        );

        #[cfg(unix)]
        assert_eq!(
            config.resolve_library(Path::new("/usr/lib/libMixer.so")),
            PathBuf::from("/usr/lib/libMixer.so")
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("components.toml");
        std::fs::write(
            &path,
            "[[component]]\nkey = \"A\"\nlibrary = \"Test_Component\"\nfactory = \"Test_Component_Factory\"\n",
        )
        .unwrap();

        let config = RegistryConfig::from_file(&path).unwrap();
        assert_eq!(config.components[0].key, "A");

        let missing = RegistryConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
