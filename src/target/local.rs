// src/target/local.rs

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::ArtifactStore;

/// Store backed by the local filesystem, rooted at a directory.
///
/// Relative artifact paths are resolved against `root`; absolute paths are
/// used as-is.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ArtifactStore for LocalStore {
    fn exists(&self, path: &Path) -> Result<bool> {
        let full = self.resolve(path);
        full.try_exists()
            .with_context(|| format!("checking existence of {:?}", full))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let full = self.resolve(path);
        let file = fs::File::open(&full).with_context(|| format!("opening file {:?}", full))?;
        Ok(Box::new(file))
    }

    /// Writes to a sibling temp file and renames it into place.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
        }

        let mut tmp_name = full.as_os_str().to_owned();
        tmp_name.push(".lazydag-tmp");
        let tmp = PathBuf::from(tmp_name);

        let mut file = fs::File::create(&tmp).with_context(|| format!("creating file {:?}", tmp))?;
        file.write_all(contents)
            .with_context(|| format!("writing to file {:?}", tmp))?;
        fs::rename(&tmp, &full).with_context(|| format!("moving {:?} to {:?}", tmp, full))?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let full = self.resolve(path);
        if full.is_dir() {
            fs::remove_dir_all(&full).with_context(|| format!("removing dir {:?}", full))
        } else if full.exists() {
            fs::remove_file(&full).with_context(|| format!("removing file {:?}", full))
        } else {
            Ok(())
        }
    }
}
