//! Smoke dataset curator
//!
//! Turns a zip of wildfire camera frames into labelled dataset entries.
//!
//! # Flow
//!
//! 1. `archive`: unpack the batch into a private working directory
//! 2. `timestamp` + `sequence`: recover each frame's capture time from its
//!    filename and order the batch chronologically
//! 3. `phase`: label frames before-smoke, developing-smoke or confirmed-smoke
//!    against two operator thresholds
//! 4. `sampling`: pick a rate-limited subset of confirmed-smoke frames for
//!    cropping
//! 5. `pipeline`: drive renaming, uploading, record keeping and cropping
//!    frame by frame
//!
//! Collaborators (`rename`, `upload`, `records`, `crop`) sit behind traits;
//! the crate ships local filesystem and SQLite implementations.

pub mod archive;
pub mod config;
pub mod crop;
pub mod error;
pub mod phase;
pub mod pipeline;
pub mod records;
pub mod rename;
pub mod sampling;
pub mod sequence;
pub mod timestamp;
pub mod upload;

pub use archive::ExtractedArchive;
pub use config::{minutes_to_duration, CropSettings, CurateConfig};
pub use crop::{CropRegion, CropSelection, Cropper, FixedRegionCropper};
pub use error::CurateError;
pub use phase::{classify, classify_epoch, Destination, PhaseLabel, Thresholds};
pub use pipeline::{plan, Collaborators, IngestionPipeline, PlannedFrame, RunSettings, RunSummary};
pub use records::{CropRecord, ImageRecord, InMemoryRecordKeeper, RecordKeeper, SqliteRecordKeeper};
pub use rename::{canonical_name, FsRenamer, Renamer};
pub use sampling::{select_due, SamplingGate};
pub use sequence::{sequence, FilenamePolicy, Frame, OrderedBatch};
pub use timestamp::{extract_capture_time, CaptureTime};
pub use upload::{DestinationRoots, LocalDestinationTree, Uploader};
