//! Filing frames into per-class dataset destinations.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CurateError;
use crate::phase::Destination;

pub trait Uploader {
    /// Persist `path` under `destination`, inside the camera's directory when
    /// a camera is given. Returns where the file landed.
    fn upload(
        &mut self,
        path: &Path,
        camera: Option<&str>,
        destination: Destination,
    ) -> Result<PathBuf>;
}

/// Root directory of each dataset class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRoots {
    pub non_smoke: PathBuf,
    pub motion: PathBuf,
    pub smoke: PathBuf,
    pub crop_smoke: PathBuf,
}

impl DestinationRoots {
    /// `<base>/nonSmoke`, `<base>/motion`, `<base>/smoke`, `<base>/cropSmoke`
    pub fn under(base: &Path) -> Self {
        Self {
            non_smoke: base.join(Destination::NonSmoke.as_str()),
            motion: base.join(Destination::Motion.as_str()),
            smoke: base.join(Destination::Smoke.as_str()),
            crop_smoke: base.join(Destination::CropSmoke.as_str()),
        }
    }

    pub fn root(&self, destination: Destination) -> &Path {
        match destination {
            Destination::NonSmoke => &self.non_smoke,
            Destination::Motion => &self.motion,
            Destination::Smoke => &self.smoke,
            Destination::CropSmoke => &self.crop_smoke,
        }
    }
}

/// Handle on a local dataset tree, opened once per run.
///
/// Camera directories are matched case-insensitively, so `Axis-BaldCA` and
/// `axis-baldca` side by side make the camera unresolvable.
#[derive(Debug)]
pub struct LocalDestinationTree {
    roots: DestinationRoots,
}

impl LocalDestinationTree {
    pub fn open(roots: DestinationRoots) -> Result<Self> {
        for destination in [
            Destination::NonSmoke,
            Destination::Motion,
            Destination::Smoke,
            Destination::CropSmoke,
        ] {
            let root = roots.root(destination);
            if !root.is_dir() {
                return Err(anyhow::anyhow!(
                    "{} destination {} is not a directory",
                    destination.as_str(),
                    root.display()
                ));
            }
        }
        Ok(Self { roots })
    }

    fn resolve(&self, destination: Destination, camera: Option<&str>) -> Result<PathBuf> {
        let root = self.roots.root(destination);
        let Some(camera) = camera else {
            return Ok(root.to_path_buf());
        };
        let mut matches = Vec::new();
        for entry in std::fs::read_dir(root).with_context(|| format!("list {}", root.display()))? {
            let entry = entry?;
            if entry.file_type()?.is_dir()
                && entry.file_name().to_string_lossy().eq_ignore_ascii_case(camera)
            {
                matches.push(entry.path());
            }
        }
        if matches.len() != 1 {
            log::error!(
                "expected 1 {} directory for {} but found {}: {:?}",
                destination.as_str(),
                camera,
                matches.len(),
                matches
            );
            return Err(CurateError::DestinationResolution {
                destination: destination.as_str(),
                camera: camera.to_string(),
                found: matches.len(),
            }
            .into());
        }
        Ok(matches.remove(0))
    }
}

impl Uploader for LocalDestinationTree {
    fn upload(
        &mut self,
        path: &Path,
        camera: Option<&str>,
        destination: Destination,
    ) -> Result<PathBuf> {
        let dir = self.resolve(destination, camera)?;
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("not a file path: {}", path.display()))?;
        let target = dir.join(file_name);
        std::fs::copy(path, &target)
            .with_context(|| format!("copy {} -> {}", path.display(), target.display()))?;
        log::info!(
            "uploaded {} to {} {}",
            path.display(),
            destination.as_str(),
            camera.unwrap_or("")
        );
        Ok(target)
    }
}
