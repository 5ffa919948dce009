//! Local zip archive reader.
//!
//! The archive is unpacked into a private temporary directory that lives as
//! long as the [`ExtractedArchive`]. Renames during a run happen inside that
//! directory, never in the operator's source tree.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

use crate::error::CurateError;

pub struct ExtractedArchive {
    dir: TempDir,
    filenames: Vec<String>,
}

impl ExtractedArchive {
    /// Unpack every regular file in the zip at `path`, flattened to its
    /// file name.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CurateError::MissingInput {
                path: path.to_path_buf(),
            }
            .into());
        }
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut zip = zip::ZipArchive::new(file)
            .with_context(|| format!("read zip archive {}", path.display()))?;
        let dir = tempfile::Builder::new().prefix("smoke-batch-").tempdir()?;
        log::debug!("extracting {} into {}", path.display(), dir.path().display());

        let mut filenames = Vec::with_capacity(zip.len());
        let mut seen = HashSet::new();
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let Some(name) = entry
                .enclosed_name()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
            else {
                log::warn!("ignoring archive entry with unsafe path: {}", entry.name());
                continue;
            };
            if !seen.insert(name.clone()) {
                return Err(CurateError::DuplicateArchiveEntry { name }.into());
            }
            let target = dir.path().join(&name);
            let mut out =
                File::create(&target).with_context(|| format!("create {}", target.display()))?;
            std::io::copy(&mut entry, &mut out)
                .with_context(|| format!("extract {}", entry.name()))?;
            filenames.push(name);
        }

        log::info!(
            "extracted {} files from {}",
            filenames.len(),
            path.display()
        );
        Ok(Self { dir, filenames })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// File names in archive order; no chronological guarantee.
    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }
}
