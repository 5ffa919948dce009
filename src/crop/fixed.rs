use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{CropRegion, CropSelection, CropSelections, Cropper};

/// Cuts the same operator-configured regions out of every selected frame.
#[derive(Clone, Debug, Default)]
pub struct FixedRegionCropper {
    regions: Vec<CropRegion>,
}

impl FixedRegionCropper {
    pub fn new(regions: Vec<CropRegion>) -> Result<Self> {
        for region in &regions {
            region.validate()?;
        }
        Ok(Self { regions })
    }
}

/// `<stem>_Crop_<x0>x<y0>x<x1>x<y1>.jpg`
pub fn crop_file_name(source: &Path, region: &CropRegion) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{}_Crop_{}x{}x{}x{}.jpg",
        stem, region.x0, region.y0, region.x1, region.y1
    )
}

impl Cropper for FixedRegionCropper {
    fn crop<'a>(&'a mut self, path: &Path, out_dir: &Path) -> Result<CropSelections<'a>> {
        if self.regions.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        let image = image::open(path).with_context(|| format!("decode {}", path.display()))?;
        let (width, height) = (image.width(), image.height());
        let source = path.to_path_buf();
        let out_dir = out_dir.to_path_buf();

        let crops = self.regions.iter().filter_map(move |region| {
            let Some(clamped) = region.clamp_to(width, height) else {
                log::debug!(
                    "region {:?} lies outside {} ({}x{})",
                    region,
                    source.display(),
                    width,
                    height
                );
                return None;
            };
            let output: PathBuf = out_dir.join(crop_file_name(&source, &clamped));
            let written = image
                .crop_imm(clamped.x0, clamped.y0, clamped.width(), clamped.height())
                .to_rgb8()
                .save(&output)
                .with_context(|| format!("write crop {}", output.display()))
                .map(|()| CropSelection {
                    source: source.clone(),
                    output,
                    region: clamped,
                });
            Some(written)
        });
        Ok(Box::new(crops))
    }
}
