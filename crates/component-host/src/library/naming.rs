//! Shared-library filename conventions.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Naming convention family for shared libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Unix-like systems: `lib<name>.so`.
    Posix,
    /// Windows: `<name>.dll`.
    Windows,
}

impl Platform {
    /// The platform this crate was compiled for.
    pub const fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Canonical shared-library extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Platform::Posix => "so",
            Platform::Windows => "dll",
        }
    }

    /// Filename prefix expected on library basenames, if any.
    pub const fn prefix(self) -> Option<&'static str> {
        match self {
            Platform::Posix => Some("lib"),
            Platform::Windows => None,
        }
    }
}

/// Rewrite `path` to the platform's shared-library filename.
///
/// A missing or different extension is replaced with the canonical one, and
/// on POSIX the basename gains a `lib` prefix unless it already starts with
/// one. Directories are left untouched.
///
/// ```
/// use component_host::library::{canonical_filename, Platform};
/// use std::path::Path;
///
/// let path = Path::new("Test_Component");
/// assert_eq!(
///     canonical_filename(path, Platform::Posix),
///     Path::new("libTest_Component.so")
/// );
/// assert_eq!(
///     canonical_filename(path, Platform::Windows),
///     Path::new("Test_Component.dll")
/// );
/// ```
pub fn canonical_filename(path: &Path, platform: Platform) -> PathBuf {
    let mut canonical = path.to_path_buf();
    if canonical.file_name().is_none() {
        return canonical;
    }

    let extension = platform.extension();
    if canonical.extension().and_then(|e| e.to_str()) != Some(extension) {
        canonical.set_extension(extension);
    }

    if let Some(prefix) = platform.prefix() {
        if let Some(file_name) = canonical.file_name() {
            if !file_name.as_encoded_bytes().starts_with(prefix.as_bytes()) {
                let mut prefixed = OsString::from(prefix);
                prefixed.push(file_name);
                canonical.set_file_name(prefixed);
            }
        }
    }

    canonical
}
