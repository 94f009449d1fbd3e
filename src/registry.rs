// SPDX-FileCopyrightText: 2025 SOTAOI <dev@sotaoi.io>
// SPDX-License-Identifier: MIT

//! Version registry management.
//!
//! Packed SOTAOI versions are grouped together in one place called the
//! __base directory__. Each immediate subdirectory of the base directory is
//! one version: the subdirectory name is the version name, and the
//! subdirectory itself is the version's content root. A directory named
//! `1.1` under the base directory means that version `1.1` is available for
//! unpacking.
//!
//! Only the top level of the base directory is evaluated. Stray files in
//! the base directory are not versions, so they are skipped during the
//! scan. Nothing about the scan imposes an ordering on versions; names are
//! sorted only when presented to the user.

use crate::path;

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Registry of available SOTAOI versions.
///
/// Maps every version name found in the base directory to the version's
/// content root. The registry is read once at command startup and never
/// written back; versions are immutable snapshots.
#[derive(Debug)]
pub struct VersionRegistry {
    base_dir: PathBuf,
    versions: HashMap<String, PathBuf>,
}

impl VersionRegistry {
    /// Scan base directory for available versions.
    ///
    /// Every immediate child of the base directory that is itself a
    /// directory becomes a version entry. Non-directory entries are
    /// silently skipped.
    ///
    /// # Errors
    ///
    /// - Return [`Error::Resolve`] if the base directory path cannot be
    ///   resolved to absolute form.
    /// - Return [`Error::ReadBaseDir`] if the base directory does not exist
    ///   or cannot be read.
    #[instrument(skip(base_dir), level = "debug")]
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = path::absolutize(base_dir.as_ref())?;
        debug!("scan version registry at {:?}", base_dir.display());

        let mut versions = HashMap::new();
        let entries = fs::read_dir(&base_dir).map_err(|err| Error::ReadBaseDir {
            source: err,
            base_dir: base_dir.clone(),
        })?;

        for entry in entries {
            let entry = entry.map_err(|err| Error::ReadBaseDir {
                source: err,
                base_dir: base_dir.clone(),
            })?;

            let version_root = entry.path();
            if !version_root.is_dir() {
                debug!("skip non-directory entry {:?}", version_root.display());
                continue;
            }

            versions.insert(entry.file_name().to_string_lossy().into_owned(), version_root);
        }

        Ok(Self { base_dir, versions })
    }

    /// Look up the content root of target version.
    ///
    /// No fuzzy matching, and no default version. Absence means the version
    /// does not exist.
    pub fn lookup(&self, version: impl AsRef<str>) -> Option<&Path> {
        self.versions.get(version.as_ref()).map(PathBuf::as_path)
    }

    /// List available version names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.versions.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Path to base directory the registry was opened from.
    pub fn base_dir(&self) -> &Path {
        self.base_dir.as_path()
    }

    /// Number of available versions.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Check if registry contains no versions at all.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Version registry error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Base directory path cannot be resolved.
    #[error(transparent)]
    Resolve(#[from] crate::path::Error),

    /// Base directory cannot be read.
    #[error("failed to read version base directory at {:?}", base_dir.display())]
    ReadBaseDir {
        #[source]
        source: std::io::Error,
        base_dir: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn open_collects_only_directories() -> anyhow::Result<()> {
        let base_dir = tempfile::tempdir()?;
        fs::create_dir(base_dir.path().join("1.0"))?;
        fs::create_dir(base_dir.path().join("1.1"))?;
        fs::write(base_dir.path().join("README"), "not a version\n")?;

        let registry = VersionRegistry::open(base_dir.path())?;

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["1.0", "1.1"]);

        Ok(())
    }

    #[test]
    fn lookup_returns_version_content_root() -> anyhow::Result<()> {
        let base_dir = tempfile::tempdir()?;
        fs::create_dir(base_dir.path().join("1.0"))?;

        let registry = VersionRegistry::open(base_dir.path())?;

        let root = registry.lookup("1.0").expect("version 1.0 should exist");
        assert!(root.is_dir());
        assert_eq!(registry.lookup("9.9"), None);

        Ok(())
    }

    #[test]
    fn open_missing_base_directory_fails() {
        let result = VersionRegistry::open("/nonexistent/sotaoi");

        assert!(matches!(result, Err(Error::ReadBaseDir { .. })));
    }

    #[test]
    fn open_empty_base_directory_is_empty_registry() -> anyhow::Result<()> {
        let base_dir = tempfile::tempdir()?;

        let registry = VersionRegistry::open(base_dir.path())?;

        assert!(registry.is_empty());
        assert_eq!(registry.base_dir(), base_dir.path());

        Ok(())
    }
}
