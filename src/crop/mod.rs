//! Crop extraction for frames picked by the sampling gate.
//!
//! The pipeline treats croppers as opaque: it hands over a frame path and an
//! output directory and forwards whatever selections come back.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod fixed;

pub use fixed::FixedRegionCropper;

/// Rectangle in pixel coordinates, `x0,y0` inclusive and `x1,y1` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropRegion {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Result<Self> {
        let region = Self { x0, y0, x1, y1 };
        region.validate()?;
        Ok(region)
    }

    pub fn validate(&self) -> Result<()> {
        if self.x0 >= self.x1 || self.y0 >= self.y1 {
            return Err(anyhow!(
                "crop region {}x{}x{}x{} is empty (need x0 < x1 and y0 < y1)",
                self.x0,
                self.y0,
                self.x1,
                self.y1
            ));
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Intersection with a `width` x `height` image, if any.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let clamped = Self {
            x0: self.x0.min(width),
            y0: self.y0.min(height),
            x1: self.x1.min(width),
            y1: self.y1.min(height),
        };
        (clamped.x0 < clamped.x1 && clamped.y0 < clamped.y1).then_some(clamped)
    }
}

/// One crop written by a cropper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CropSelection {
    pub source: PathBuf,
    pub output: PathBuf,
    pub region: CropRegion,
}

/// Lazily produced crops; single pass.
pub type CropSelections<'a> = Box<dyn Iterator<Item = Result<CropSelection>> + 'a>;

pub trait Cropper {
    fn crop<'a>(&'a mut self, path: &Path, out_dir: &Path) -> Result<CropSelections<'a>>;
}
