//! Chronological ordering of an archive listing.
//!
//! Every downstream decision (classification, crop sampling) walks the batch
//! in this order, so the sort is stable and keyed only on epoch seconds.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CurateError;
use crate::timestamp::{extract_capture_time, CaptureTime};

/// What to do with a filename whose capture time cannot be extracted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenamePolicy {
    /// Fail the whole batch before any frame is processed.
    #[default]
    Abort,
    /// Log a warning, leave the file out and report it in the run summary.
    Skip,
}

impl FromStr for FilenamePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FilenamePolicy::Abort),
            "skip" => Ok(FilenamePolicy::Skip),
            other => Err(anyhow::anyhow!(
                "unknown filename policy {other:?} (expected abort|skip)"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    pub time: CaptureTime,
}

/// One archive's frames sorted ascending by capture time.
#[derive(Clone, Debug, Default)]
pub struct OrderedBatch {
    frames: Vec<Frame>,
    skipped: Vec<String>,
}

impl OrderedBatch {
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Filenames left out under [`FilenamePolicy::Skip`], in listing order.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a OrderedBatch {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Extract capture times for `names` and sort them chronologically.
///
/// Frames sharing a timestamp keep their listing order.
pub fn sequence<I, S>(names: I, policy: FilenamePolicy) -> Result<OrderedBatch>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut frames = Vec::new();
    let mut skipped = Vec::new();
    for name in names {
        let name = name.as_ref();
        match extract_capture_time(name) {
            Ok(time) => frames.push(Frame {
                name: name.to_string(),
                time,
            }),
            Err(e) => {
                let skippable = e
                    .downcast_ref::<CurateError>()
                    .is_some_and(CurateError::is_filename_error);
                if policy == FilenamePolicy::Skip && skippable {
                    log::warn!("skipping {}: {}", name, e);
                    skipped.push(name.to_string());
                } else {
                    return Err(e);
                }
            }
        }
    }
    // sort_by_key is stable
    frames.sort_by_key(|frame| frame.time.epoch);
    Ok(OrderedBatch { frames, skipped })
}
