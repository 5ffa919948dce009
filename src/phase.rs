use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timestamp::CaptureTime;

/// Temporal phase of smoke development, ordered by time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseLabel {
    BeforeSmoke,
    DevelopingSmoke,
    ConfirmedSmoke,
}

impl PhaseLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseLabel::BeforeSmoke => "before-smoke",
            PhaseLabel::DevelopingSmoke => "developing-smoke",
            PhaseLabel::ConfirmedSmoke => "confirmed-smoke",
        }
    }

    /// Dataset class the frame is filed under.
    pub fn destination(self) -> Destination {
        match self {
            PhaseLabel::BeforeSmoke => Destination::NonSmoke,
            PhaseLabel::DevelopingSmoke => Destination::Motion,
            PhaseLabel::ConfirmedSmoke => Destination::Smoke,
        }
    }
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload destinations. Crops have their own class outside the phase labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    NonSmoke,
    Motion,
    Smoke,
    CropSmoke,
}

impl Destination {
    pub fn as_str(self) -> &'static str {
        match self {
            Destination::NonSmoke => "nonSmoke",
            Destination::Motion => "motion",
            Destination::Smoke => "smoke",
            Destination::CropSmoke => "cropSmoke",
        }
    }
}

/// Operator-chosen thresholds in epoch seconds.
///
/// Ordering is not checked: with `enough < initial` no frame is ever
/// developing-smoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    pub initial: i64,
    pub enough: i64,
}

impl Thresholds {
    pub fn new(initial: i64, enough: i64) -> Self {
        Self { initial, enough }
    }

    pub fn classify(&self, time: &CaptureTime) -> PhaseLabel {
        classify_epoch(time.epoch, self.initial, self.enough)
    }
}

pub fn classify(time: &CaptureTime, initial: i64, enough: i64) -> PhaseLabel {
    classify_epoch(time.epoch, initial, enough)
}

pub fn classify_epoch(epoch: i64, initial: i64, enough: i64) -> PhaseLabel {
    if epoch < initial {
        PhaseLabel::BeforeSmoke
    } else if epoch < enough {
        PhaseLabel::DevelopingSmoke
    } else {
        PhaseLabel::ConfirmedSmoke
    }
}
