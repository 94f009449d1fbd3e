// SPDX-FileCopyrightText: 2025 SOTAOI <dev@sotaoi.io>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevant path information for the SOTAOI base directory, the
//! optional configuration file, and caller-supplied paths that need to be
//! normalized before use.

use std::{
    env,
    path::{Component, Path, PathBuf},
};

/// Resolve a path to lexically normalized absolute form.
///
/// Relative paths are joined onto the current working directory. `.` and
/// `..` components are folded without consulting the filesystem, so symlinks
/// are never resolved and the path does not need to exist.
///
/// # Errors
///
/// - Return [`Error::NoCwd`] if the current working directory cannot be
///   determined.
pub fn absolutize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut resolved = if path.is_absolute() {
        PathBuf::new()
    } else {
        env::current_dir().map_err(Error::NoCwd)?
    };

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            component => resolved.push(component),
        }
    }

    Ok(resolved)
}

/// Determine absolute path to the SOTAOI base directory.
///
/// The base directory is the directory whose immediate subdirectories are
/// the available SOTAOI versions. By default it ships next to the installed
/// executable at `<exe dir>/../sotaoi-signal/sotaoi`. The `SOTAOI_DIR`
/// environment variable overrides the default when set.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`Error::NoExePath`] if the executable path cannot be
///   determined.
/// - Return [`Error::NoCwd`] if a relative override cannot be resolved.
pub fn sotaoi_base_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("SOTAOI_DIR") {
        return absolutize(dir);
    }

    Ok(package_dir()?.join("sotaoi"))
}

/// Determine absolute path to the optional configuration file.
///
/// Lives next to the SOTAOI base directory at
/// `<exe dir>/../sotaoi-signal/signal.toml`. The `SIGNAL_CONFIG` environment
/// variable overrides the default when set.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`Error::NoExePath`] if the executable path cannot be
///   determined.
/// - Return [`Error::NoCwd`] if a relative override cannot be resolved.
pub fn config_file() -> Result<PathBuf> {
    if let Some(file) = env::var_os("SIGNAL_CONFIG") {
        return absolutize(file);
    }

    Ok(package_dir()?.join("signal.toml"))
}

fn package_dir() -> Result<PathBuf> {
    let exe = env::current_exe().map_err(Error::NoExePath)?;
    let exe_dir = exe.parent().ok_or(Error::NoBaseDir)?;
    absolutize(exe_dir.join("..").join(env!("CARGO_PKG_NAME")))
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Current working directory cannot be determined.
    #[error("cannot determine current working directory")]
    NoCwd(#[source] std::io::Error),

    /// Current executable path cannot be determined.
    #[error("cannot determine path to current executable")]
    NoExePath(#[source] std::io::Error),

    /// Executable path has no parent directory to resolve against.
    #[error("cannot determine SOTAOI base directory from executable path")]
    NoBaseDir,
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
