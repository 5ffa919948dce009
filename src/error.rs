use std::path::PathBuf;

/// Failures the curator reports by name.
///
/// Collaborator seams return `anyhow::Result`; these values travel inside it
/// and callers that need to branch on them use `downcast_ref::<CurateError>()`.
#[derive(Debug, thiserror::Error)]
pub enum CurateError {
    #[error("unrecognized filename format: {name}")]
    UnrecognizedFilenameFormat { name: String },

    #[error("expected 1 {destination} directory for camera {camera} but found {found}")]
    DestinationResolution {
        destination: &'static str,
        camera: String,
        found: usize,
    },

    #[error("input archive not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("archive contains more than one entry named {name}")]
    DuplicateArchiveEntry { name: String },
}

impl CurateError {
    /// True for the failures a per-file filename policy may skip over.
    pub fn is_filename_error(&self) -> bool {
        matches!(self, CurateError::UnrecognizedFilenameFormat { .. })
    }
}
