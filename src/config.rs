use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crop::CropRegion;
use crate::sequence::FilenamePolicy;
use crate::upload::DestinationRoots;

const DEFAULT_DB_PATH: &str = "curation.db";
const DEFAULT_CROP_EVERY_MINUTES: u64 = 5;
const DEFAULT_CROP_DIR: &str = "crops";
const DEFAULT_DEST_ROOT: &str = "dataset";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CurateConfigFile {
    db_path: Option<String>,
    crop: Option<CropConfigFile>,
    destinations: Option<DestinationsConfigFile>,
    filenames: Option<FilenamesConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CropConfigFile {
    every_minutes: Option<u64>,
    output_dir: Option<PathBuf>,
    regions: Option<Vec<CropRegion>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DestinationsConfigFile {
    non_smoke: Option<PathBuf>,
    motion: Option<PathBuf>,
    smoke: Option<PathBuf>,
    crop_smoke: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FilenamesConfigFile {
    on_unrecognized: Option<FilenamePolicy>,
}

/// Settings shared by every run on a host.
#[derive(Debug, Clone)]
pub struct CurateConfig {
    pub db_path: String,
    pub crop: CropSettings,
    pub destinations: DestinationRoots,
    pub on_unrecognized: FilenamePolicy,
}

#[derive(Debug, Clone)]
pub struct CropSettings {
    pub every: Duration,
    pub output_dir: PathBuf,
    pub regions: Vec<CropRegion>,
}

impl CurateConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CURATE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: CurateConfigFile) -> Result<Self> {
        let db_path = file.db_path.unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let every_minutes = file
            .crop
            .as_ref()
            .and_then(|crop| crop.every_minutes)
            .unwrap_or(DEFAULT_CROP_EVERY_MINUTES);
        let crop = CropSettings {
            every: minutes_to_duration(every_minutes)
                .ok_or_else(|| anyhow!("crop.every_minutes {every_minutes} is out of range"))?,
            output_dir: file
                .crop
                .as_ref()
                .and_then(|crop| crop.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CROP_DIR)),
            regions: file
                .crop
                .and_then(|crop| crop.regions)
                .unwrap_or_default(),
        };
        let defaults = DestinationRoots::under(Path::new(DEFAULT_DEST_ROOT));
        let dest = file.destinations.unwrap_or_default();
        let destinations = DestinationRoots {
            non_smoke: dest.non_smoke.unwrap_or(defaults.non_smoke),
            motion: dest.motion.unwrap_or(defaults.motion),
            smoke: dest.smoke.unwrap_or(defaults.smoke),
            crop_smoke: dest.crop_smoke.unwrap_or(defaults.crop_smoke),
        };
        let on_unrecognized = file
            .filenames
            .and_then(|filenames| filenames.on_unrecognized)
            .unwrap_or_default();
        Ok(Self {
            db_path,
            crop,
            destinations,
            on_unrecognized,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("CURATE_DB_PATH") {
            if !path.trim().is_empty() {
                self.db_path = path;
            }
        }
        if let Ok(minutes) = std::env::var("CURATE_CROP_EVERY_MINUTES") {
            let minutes: u64 = minutes.trim().parse().map_err(|_| {
                anyhow!("CURATE_CROP_EVERY_MINUTES must be an integer number of minutes")
            })?;
            self.crop.every = minutes_to_duration(minutes)
                .ok_or_else(|| anyhow!("CURATE_CROP_EVERY_MINUTES {minutes} is out of range"))?;
        }
        if let Ok(dir) = std::env::var("CURATE_CROP_DIR") {
            if !dir.trim().is_empty() {
                self.crop.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(root) = std::env::var("CURATE_DEST_ROOT") {
            if !root.trim().is_empty() {
                self.destinations = DestinationRoots::under(Path::new(&root));
            }
        }
        if let Ok(policy) = std::env::var("CURATE_ON_UNRECOGNIZED") {
            if !policy.trim().is_empty() {
                self.on_unrecognized = policy.parse()?;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.crop.every.is_zero() {
            return Err(anyhow!("crop interval must be greater than zero"));
        }
        for region in &self.crop.regions {
            region.validate()?;
        }
        Ok(())
    }
}

/// `None` when the minute count overflows whole seconds.
pub fn minutes_to_duration(minutes: u64) -> Option<Duration> {
    minutes.checked_mul(60).map(Duration::from_secs)
}

fn read_config_file(path: &Path) -> Result<CurateConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
