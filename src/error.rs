//! Error types for the killfeed compositor

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing or persisting a killfeed
#[derive(Error, Debug)]
pub enum Error {
    /// A required asset (font, agent or weapon icon, overlay image) is missing
    #[error("Required asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    /// An asset exists but could not be decoded
    #[error("Failed to decode asset {}: {reason}", .path.display())]
    AssetDecode { path: PathBuf, reason: String },

    /// Caller supplied an invalid parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failed to rasterize or encode the composite
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem error while writing or sweeping output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` when the error is caused by a missing file on disk.
    pub fn is_missing_asset(&self) -> bool {
        matches!(self, Error::MissingAsset(_))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::RenderError(err.to_string())
    }
}
