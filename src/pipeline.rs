//! Per-batch orchestration.
//!
//! For each frame, in chronological order:
//! 1. rename to the canonical name
//! 2. classify against the run thresholds
//! 3. upload to the phase destination
//! 4. append the image record
//! 5. for confirmed smoke, ask the sampling gate; if due, crop and upload and
//!    record every crop
//!
//! Side effects never move between frames. The first collaborator error ends
//! the run.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crop::Cropper;
use crate::phase::{Destination, PhaseLabel, Thresholds};
use crate::records::{CropRecord, ImageRecord, RecordKeeper};
use crate::rename::Renamer;
use crate::sampling::SamplingGate;
use crate::sequence::{Frame, OrderedBatch};
use crate::timestamp::CaptureTime;
use crate::upload::Uploader;

/// Values fixed for the duration of one run.
#[derive(Clone, Debug)]
pub struct RunSettings {
    pub camera_id: String,
    pub fire_id: String,
    pub thresholds: Thresholds,
    pub crop_every: Duration,
    pub crop_dir: PathBuf,
}

/// External effects used by the pipeline, borrowed for one run.
pub struct Collaborators<'a> {
    pub renamer: &'a mut dyn Renamer,
    pub uploader: &'a mut dyn Uploader,
    pub records: &'a mut dyn RecordKeeper,
    pub cropper: &'a mut dyn Cropper,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub before_smoke: usize,
    pub developing_smoke: usize,
    pub confirmed_smoke: usize,
    /// Confirmed-smoke frames the sampling gate let through.
    pub sampled: usize,
    pub crops: usize,
    pub skipped: Vec<String>,
}

impl RunSummary {
    fn count(&mut self, phase: PhaseLabel) {
        match phase {
            PhaseLabel::BeforeSmoke => self.before_smoke += 1,
            PhaseLabel::DevelopingSmoke => self.developing_smoke += 1,
            PhaseLabel::ConfirmedSmoke => self.confirmed_smoke += 1,
        }
    }

    pub fn frames(&self) -> usize {
        self.before_smoke + self.developing_smoke + self.confirmed_smoke
    }
}

pub struct IngestionPipeline<'a> {
    settings: &'a RunSettings,
    collab: Collaborators<'a>,
    on_frame: Option<&'a mut dyn FnMut(&Path, PhaseLabel)>,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(settings: &'a RunSettings, collab: Collaborators<'a>) -> Self {
        Self {
            settings,
            collab,
            on_frame: None,
        }
    }

    /// Called once per frame with its renamed path and phase.
    pub fn on_frame(mut self, observer: &'a mut dyn FnMut(&Path, PhaseLabel)) -> Self {
        self.on_frame = Some(observer);
        self
    }

    /// Process `batch`, whose files live in `dir`.
    pub fn run(&mut self, dir: &Path, batch: &OrderedBatch) -> Result<RunSummary> {
        let mut gate = SamplingGate::new(self.settings.crop_every);
        let mut summary = RunSummary {
            skipped: batch.skipped().to_vec(),
            ..RunSummary::default()
        };
        for frame in batch {
            self.process_frame(dir, frame, &mut gate, &mut summary)?;
        }
        log::info!(
            "processed {} frames ({} before, {} developing, {} confirmed); {} sampled, {} crops",
            summary.frames(),
            summary.before_smoke,
            summary.developing_smoke,
            summary.confirmed_smoke,
            summary.sampled,
            summary.crops
        );
        Ok(summary)
    }

    fn process_frame(
        &mut self,
        dir: &Path,
        frame: &Frame,
        gate: &mut SamplingGate,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let settings = self.settings;
        let path = self
            .collab
            .renamer
            .rename(dir, &frame.name, &frame.time, &settings.camera_id)?;
        let phase = settings.thresholds.classify(&frame.time);
        log::info!("{} {}", phase, path.display());
        summary.count(phase);
        if let Some(observer) = self.on_frame.as_mut() {
            observer(&path, phase);
        }

        self.collab
            .uploader
            .upload(&path, Some(&settings.camera_id), phase.destination())?;
        self.collab.records.append_image(&ImageRecord::new(
            &path,
            &frame.time,
            &settings.camera_id,
            phase,
            &settings.fire_id,
        ))?;

        if phase != PhaseLabel::ConfirmedSmoke {
            return Ok(());
        }
        if !gate.admit(frame.time.epoch) {
            log::debug!("crop not due for {}", path.display());
            return Ok(());
        }
        summary.sampled += 1;
        self.crop_frame(&path, summary)
    }

    fn crop_frame(&mut self, path: &Path, summary: &mut RunSummary) -> Result<()> {
        let settings = self.settings;
        let crop_dir = settings.crop_dir.as_path();
        let Collaborators {
            uploader,
            records,
            cropper,
            ..
        } = &mut self.collab;
        for selection in cropper.crop(path, crop_dir)? {
            let selection = selection?;
            log::info!(
                "crop {} {:?}",
                selection.output.display(),
                selection.region
            );
            uploader.upload(&selection.output, None, Destination::CropSmoke)?;
            records.append_crop(&CropRecord::new(&selection, path))?;
            summary.crops += 1;
        }
        Ok(())
    }
}

/// A frame's fate, computed without touching any collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedFrame {
    pub name: String,
    pub time: CaptureTime,
    pub phase: PhaseLabel,
    pub crop_due: bool,
}

/// Phase and crop decision for every frame of `batch`.
pub fn plan(batch: &OrderedBatch, thresholds: Thresholds, crop_every: Duration) -> Vec<PlannedFrame> {
    batch
        .iter()
        .scan(SamplingGate::new(crop_every), |gate, frame| {
            let phase = thresholds.classify(&frame.time);
            let crop_due = phase == PhaseLabel::ConfirmedSmoke && gate.admit(frame.time.epoch);
            Some(PlannedFrame {
                name: frame.name.clone(),
                time: frame.time,
                phase,
                crop_due,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{sequence, FilenamePolicy};

    #[test]
    fn plan_samples_confirmed_frames_only() {
        let batch = sequence(
            [
                "1500000400.jpg",
                "1500000000.jpg",
                "1500000100.jpg",
                "1500000430.jpg",
                "1500000500.jpg",
            ],
            FilenamePolicy::Abort,
        )
        .unwrap();
        let planned = plan(
            &batch,
            Thresholds::new(1_500_000_050, 1_500_000_400),
            Duration::from_secs(60),
        );
        let decisions: Vec<(PhaseLabel, bool)> =
            planned.iter().map(|p| (p.phase, p.crop_due)).collect();
        assert_eq!(
            decisions,
            vec![
                (PhaseLabel::BeforeSmoke, false),
                (PhaseLabel::DevelopingSmoke, false),
                (PhaseLabel::ConfirmedSmoke, true),
                (PhaseLabel::ConfirmedSmoke, false),
                (PhaseLabel::ConfirmedSmoke, true),
            ]
        );
    }
}
