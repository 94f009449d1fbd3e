// SPDX-FileCopyrightText: 2025 SOTAOI <dev@sotaoi.io>
// SPDX-License-Identifier: MIT

//! Deployment target validation.
//!
//! Both the unpack and create commands materialize content into a target
//! directory, and both share the exact same precondition: at the moment of
//! use the target must be an existing empty directory. A missing target is
//! created on the fly when its parent already exists, but only one level
//! deep. Requiring the parent to exist is a deliberate guard against
//! silently creating deep nonexistent trees out of a typo'd path.
//!
//! Validation happens before any bulk copy or clone begins. The single
//! directory level that may get created here is the only filesystem side
//! effect a failed command leaves behind; it is benign and never rolled
//! back.

use crate::path;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Validated deployment target.
///
/// On successful construction the wrapped path is guaranteed to reference
/// an existing empty directory, resolved to absolute form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget(PathBuf);

impl DeployTarget {
    /// Resolve and validate a deployment target.
    ///
    /// Resolves the given path, or the current working directory when no
    /// path is given, to absolute form. When the resolved path is missing
    /// and its parent is an existing directory, the missing level is
    /// created as a new empty directory. The resolved path must then exist,
    /// be a directory, and contain zero entries.
    ///
    /// # Errors
    ///
    /// - Return [`Error::Resolve`] if the path cannot be resolved to
    ///   absolute form.
    /// - Return [`Error::CreateDir`] if the missing level cannot be
    ///   created.
    /// - Return [`Error::NotADirectory`] if the resolved path does not
    ///   reference an existing directory.
    /// - Return [`Error::NotEmpty`] if the resolved path references a
    ///   directory that already contains entries.
    #[instrument(skip(input), level = "debug")]
    pub fn resolve(input: Option<impl AsRef<Path>>) -> Result<Self> {
        let target = match input {
            Some(path) => path::absolutize(path.as_ref())?,
            None => path::absolutize(".")?,
        };

        // INVARIANT: Create at most one missing level. The parent must
        // already exist as a directory.
        if let Some(parent) = target.parent() {
            if parent.is_dir() && !target.exists() {
                debug!("create deployment directory {:?}", target.display());
                fs::create_dir(&target).map_err(|err| Error::CreateDir {
                    source: err,
                    target: target.clone(),
                })?;
            }
        }

        if !target.is_dir() {
            return Err(Error::NotADirectory(target));
        }

        let mut entries = fs::read_dir(&target).map_err(|err| Error::ReadDir {
            source: err,
            target: target.clone(),
        })?;
        if entries.next().is_some() {
            return Err(Error::NotEmpty(target));
        }

        Ok(Self(target))
    }

    /// Treat deployment target as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }
}

impl Display for DeployTarget {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_path().to_string_lossy().as_ref())
    }
}

/// Deployment target error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Target path cannot be resolved to absolute form.
    #[error(transparent)]
    Resolve(#[from] crate::path::Error),

    /// Missing deployment directory cannot be created.
    #[error("invalid deployment path: cannot create directory at {:?}", target.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        target: PathBuf,
    },

    /// Deployment directory cannot be read.
    #[error("invalid deployment path: cannot read directory at {:?}", target.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        target: PathBuf,
    },

    /// Target path is not an existing directory.
    #[error("invalid deployment path: {:?} is not an existing directory", .0.display())]
    NotADirectory(PathBuf),

    /// Target directory already contains entries.
    #[error("invalid deployment path: {:?} is not empty", .0.display())]
    NotEmpty(PathBuf),
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
