// src/target/mod.rs

//! Artifact handles.
//!
//! A [`Target`] is a path inside an [`ArtifactStore`]. Tasks use it both for
//! their completion check (`exists`) and to read inputs / write outputs.
//!
//! Writes are atomic from the point of view of other tasks: data written
//! through a [`TargetWriter`] only becomes visible on [`TargetWriter::finish`].
//! A writer dropped without finishing discards its data, so a task body
//! that fails half-way never leaves a partial artifact behind.

pub mod local;
pub mod memory;

use std::fmt::{self, Debug};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

pub use local::LocalStore;
pub use memory::MemoryStore;

/// Storage backend for task artifacts.
pub trait ArtifactStore: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> Result<bool>;
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn remove(&self, path: &Path) -> Result<()>;
}

/// Handle to a single artifact.
#[derive(Clone)]
pub struct Target {
    store: Arc<dyn ArtifactStore>,
    path: PathBuf,
}

impl Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Target {
    pub fn new(store: Arc<dyn ArtifactStore>, path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> Result<bool> {
        self.store.exists(&self.path)
    }

    pub fn open_read(&self) -> Result<Box<dyn Read + Send>> {
        self.store.open_read(&self.path)
    }

    /// Read the whole artifact as UTF-8.
    pub fn read_to_string(&self) -> Result<String> {
        let mut reader = self.open_read()?;
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Ok(buf)
    }

    pub fn open_write(&self) -> TargetWriter {
        TargetWriter {
            target: self.clone(),
            buf: Vec::new(),
            finished: false,
        }
    }

    /// Scoped write: the artifact is committed only if `f` succeeds.
    pub fn write_with<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut TargetWriter) -> Result<()>,
    {
        let mut writer = self.open_write();
        f(&mut writer)?;
        writer.finish()
    }

    pub fn remove(&self) -> Result<()> {
        self.store.remove(&self.path)
    }
}

/// Buffered writer that commits to the store on [`finish`](Self::finish).
pub struct TargetWriter {
    target: Target,
    buf: Vec<u8>,
    finished: bool,
}

impl TargetWriter {
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        let contents = std::mem::take(&mut self.buf);
        self.target.store.write(&self.target.path, &contents)?;
        debug!(path = ?self.target.path, bytes = contents.len(), "committed artifact");
        Ok(())
    }
}

impl Write for TargetWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for TargetWriter {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                path = ?self.target.path,
                "artifact writer dropped without finish; discarding output"
            );
        }
    }
}
