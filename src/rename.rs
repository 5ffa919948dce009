use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::timestamp::CaptureTime;

/// Gives a frame its canonical on-disk name.
pub trait Renamer {
    fn rename(
        &mut self,
        dir: &Path,
        name: &str,
        time: &CaptureTime,
        camera: &str,
    ) -> Result<PathBuf>;
}

/// `<camera>__<YYYY-MM-DDTHH;MM;SS><ext>`, where `ext` keeps its dot.
pub fn canonical_name(camera: &str, time: &CaptureTime, ext: &str) -> String {
    format!("{}__{}{}", camera, time.filesystem_safe(), ext)
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Renames in place. Colliding targets get a `-N` suffix instead of being
/// overwritten.
#[derive(Debug, Default)]
pub struct FsRenamer;

impl Renamer for FsRenamer {
    fn rename(
        &mut self,
        dir: &Path,
        name: &str,
        time: &CaptureTime,
        camera: &str,
    ) -> Result<PathBuf> {
        let ext = extension_of(name);
        let stem = canonical_name(camera, time, "");
        let old_path = dir.join(name);
        let mut new_path = dir.join(format!("{stem}{ext}"));
        let mut attempt = 0u32;
        while new_path != old_path && new_path.exists() {
            attempt += 1;
            new_path = dir.join(format!("{stem}-{attempt}{ext}"));
        }
        if attempt > 0 {
            log::warn!(
                "{} already exists; renaming {} to {}",
                canonical_name(camera, time, &ext),
                name,
                new_path.display()
            );
        }
        std::fs::rename(&old_path, &new_path).with_context(|| {
            format!("rename {} -> {}", old_path.display(), new_path.display())
        })?;
        log::debug!("{} -> {}", old_path.display(), new_path.display());
        Ok(new_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::extract_capture_time;

    #[test]
    fn canonical_name_replaces_colons() {
        let time = extract_capture_time("Axis-BaldCA_2018-05-29T16_02_30_129496.jpg").unwrap();
        assert_eq!(
            canonical_name("Axis-BaldCA", &time, ".jpg"),
            "Axis-BaldCA__2018-05-29T16;02;30.jpg"
        );
    }

    #[test]
    fn fs_renamer_moves_file_and_avoids_collisions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let time = extract_capture_time("1500000000.jpg")?;
        std::fs::write(dir.path().join("1500000000.jpg"), b"a")?;
        std::fs::write(dir.path().join("x-1500000000.jpg"), b"b")?;

        let mut renamer = FsRenamer;
        let first = renamer.rename(dir.path(), "1500000000.jpg", &time, "cam")?;
        let second = renamer.rename(dir.path(), "x-1500000000.jpg", &time, "cam")?;

        let expected = canonical_name("cam", &time, ".jpg");
        assert_eq!(first, dir.path().join(&expected));
        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first)?, b"a");
        assert_eq!(std::fs::read(&second)?, b"b");
        assert!(!dir.path().join("1500000000.jpg").exists());
        Ok(())
    }
}
