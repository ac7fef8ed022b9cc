//! Artifact delivery: turn a payload into a saved file.
//!
//! Bytes are staged in a temporary file beside the destination and renamed
//! into place. The staging file is owned by a `NamedTempFile`, so it is
//! removed on every path that does not end in a successful rename.
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A saved artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    pub filename: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Destination for extraction payloads.
pub trait ArtifactSink {
    /// Save `bytes` under `filename`, reporting whether the save completed.
    fn deliver(&self, bytes: &[u8], filename: &str) -> Result<ArtifactDescriptor>;
}

/// Saves artifacts into a directory, replacing same-named files.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&self, bytes: &[u8], filename: &str) -> Result<ArtifactDescriptor> {
        validate_filename(filename)?;
        fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;
        let dest = self.dir.join(filename);

        let mut staged = tempfile::Builder::new()
            .prefix(".tagx-")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .with_context(|| format!("stage {}", dest.display()))?;
        staged
            .write_all(bytes)
            .with_context(|| format!("write {}", dest.display()))?;
        staged
            .as_file()
            .sync_all()
            .with_context(|| format!("flush {}", dest.display()))?;
        staged
            .persist(&dest)
            .with_context(|| format!("save {}", dest.display()))?;

        tracing::info!(path = %dest.display(), bytes = bytes.len(), "artifact saved");
        Ok(ArtifactDescriptor {
            filename: filename.to_string(),
            path: dest,
            bytes: bytes.len(),
        })
    }
}

/// Artifact names are bare file names; anything path-like is refused.
fn validate_filename(filename: &str) -> Result<()> {
    let path = Path::new(filename);
    let is_bare = path.file_name().and_then(|name| name.to_str()) == Some(filename);
    if filename.is_empty() || !is_bare || filename == "." || filename == ".." {
        return Err(anyhow!("artifact filename must be a bare file name (got {filename:?})"));
    }
    Ok(())
}
