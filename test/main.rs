// SPDX-FileCopyrightText: 2025 SOTAOI <dev@sotaoi.io>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use simple_txtar::Archive;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// Scratch directory tree described by a txtar archive.
pub(crate) struct TreeFixture {
    root: TempDir,
}

impl TreeFixture {
    /// Build fixture tree from txtar archive text.
    pub(crate) fn new(archive: impl AsRef<str>) -> Result<Self> {
        let root = TempDir::new()?;
        let archive = Archive::from(archive.as_ref());
        for file in archive.iter() {
            let path = root.path().join(&file.name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &file.content)?;
        }

        Ok(Self { root })
    }

    /// Construct fixture with an empty root.
    pub(crate) fn empty() -> Result<Self> {
        Ok(Self {
            root: TempDir::new()?,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        self.root.path()
    }

    /// Create an empty directory below the fixture root.
    pub(crate) fn mkdir(&self, rel: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.root.path().join(rel.as_ref());
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// Collect relative path to byte content mapping for every file below root.
///
/// Directories themselves are not recorded, only the files they contain.
pub(crate) fn snapshot(root: impl AsRef<Path>) -> Result<BTreeMap<PathBuf, Vec<u8>>> {
    let mut files = BTreeMap::new();
    collect(root.as_ref(), root.as_ref(), &mut files)?;
    Ok(files)
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, files)?;
        } else {
            files.insert(path.strip_prefix(root)?.to_path_buf(), fs::read(&path)?);
        }
    }

    Ok(())
}
