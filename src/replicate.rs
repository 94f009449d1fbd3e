// SPDX-FileCopyrightText: 2025 SOTAOI <dev@sotaoi.io>
// SPDX-License-Identifier: MIT

//! Recursive directory replication.
//!
//! Reproduce a version's content tree at a deployment path. Directories are
//! created as needed, files are copied byte-for-byte, and the source tree is
//! never modified. Nothing beyond whatever [`std::fs::copy`] preserves by
//! default is guaranteed for permission bits or timestamps.
//!
//! # Exclusions
//!
//! The replicator accepts a set of source paths that must never be
//! traversed into or copied. Membership is checked by exact resolved-path
//! match at every recursion step, so excluding a directory also excludes
//! every one of its descendants.
//!
//! # Missing Source Tolerance
//!
//! A source node that vanishes during recursion is skipped instead of
//! failing the whole copy. This is intentional: packed version trees may
//! carry dangling symlinks or entries with stray permission problems, and a
//! broken entry should not abort an otherwise healthy unpack. The
//! destination simply lacks the broken entry.

use crate::path;

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Set of source paths the replicator must never copy.
///
/// Holds resolved absolute paths. An excluded directory prunes its whole
/// subtree from replication.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<PathBuf>);

impl ExclusionSet {
    /// Construct empty exclusion set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct exclusion set from listing of source paths.
    ///
    /// Each path is resolved to absolute form before insertion.
    ///
    /// # Errors
    ///
    /// - Return [`Error::Resolve`] if a path cannot be resolved to absolute
    ///   form.
    pub fn from_paths(paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Result<Self> {
        let mut set = HashSet::new();
        for entry in paths {
            set.insert(path::absolutize(entry.as_ref())?);
        }

        Ok(Self(set))
    }

    /// Check if resolved path is excluded.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.0.contains(path.as_ref())
    }

    /// Check if exclusion set contains no paths at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Replicate source tree at destination with no exclusions.
///
/// # Errors
///
/// - Return [`Error::Resolve`] if a source path cannot be resolved.
/// - Return [`Error::CreateDir`], [`Error::ReadDir`], or
///   [`Error::CopyFile`] if filesystem operations fail at the named path.
pub fn replicate(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    replicate_with_exclusions(src, dest, &ExclusionSet::new())
}

/// Replicate source tree at destination, skipping excluded source paths.
///
/// Depth-first: an excluded or missing source node produces nothing at the
/// destination, a directory node is created (with any missing intermediate
/// destination directories) before recursing into its entries, and any
/// other node has its bytes copied over, overwriting an existing
/// destination file.
///
/// # Errors
///
/// - Return [`Error::Resolve`] if a source path cannot be resolved.
/// - Return [`Error::CreateDir`], [`Error::ReadDir`], or
///   [`Error::CopyFile`] if filesystem operations fail at the named path.
#[instrument(skip(src, dest, exclude), level = "debug")]
pub fn replicate_with_exclusions(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    exclude: &ExclusionSet,
) -> Result<()> {
    copy_node(src.as_ref(), dest.as_ref(), exclude)
}

fn copy_node(src: &Path, dest: &Path, exclude: &ExclusionSet) -> Result<()> {
    let resolved = path::absolutize(src)?;
    if exclude.contains(&resolved) {
        debug!("exclude {:?} and its descendants", resolved.display());
        return Ok(());
    }

    // INVARIANT: A missing source node is skipped, never an error.
    //   - Version trees may contain dangling symlinks or broken entries.
    if !src.exists() {
        debug!("skip missing source node {:?}", src.display());
        return Ok(());
    }

    if src.is_dir() {
        fs::create_dir_all(dest).map_err(|err| Error::CreateDir {
            source: err,
            dest: dest.to_path_buf(),
        })?;

        let entries = fs::read_dir(src).map_err(|err| Error::ReadDir {
            source: err,
            src: src.to_path_buf(),
        })?;

        for entry in entries {
            let entry = entry.map_err(|err| Error::ReadDir {
                source: err,
                src: src.to_path_buf(),
            })?;
            copy_node(&entry.path(), &dest.join(entry.file_name()), exclude)?;
        }
    } else {
        fs::copy(src, dest).map_err(|err| Error::CopyFile {
            source: err,
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
        })?;
    }

    Ok(())
}

/// Directory replication error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source path cannot be resolved to absolute form.
    #[error(transparent)]
    Resolve(#[from] crate::path::Error),

    /// Destination directory cannot be created.
    #[error("failed to create destination directory at {:?}", dest.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        dest: PathBuf,
    },

    /// Source directory cannot be read.
    #[error("failed to read source directory at {:?}", src.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        src: PathBuf,
    },

    /// File bytes cannot be copied to destination.
    #[error("failed to copy {:?} to {:?}", src.display(), dest.display())]
    CopyFile {
        #[source]
        source: std::io::Error,
        src: PathBuf,
        dest: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
