// ABOUTME: Error types for the image-deck application
// ABOUTME: Separates fatal pipeline failures from per-file media problems

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid media file {path:?}: {reason}")]
    InvalidMedia { path: PathBuf, reason: String },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PPTX packaging error: {0}")]
    Package(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No slides could be built from {0:?}; presentation not saved")]
    NoSlides(PathBuf),
}

impl DeckError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeckError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_media(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DeckError::InvalidMedia {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the pipeline may log this error and carry on with the next file
    pub fn is_skippable(&self) -> bool {
        matches!(self, DeckError::InvalidMedia { .. })
    }
}

// Implement conversion from zip errors
impl From<zip::result::ZipError> for DeckError {
    fn from(err: zip::result::ZipError) -> Self {
        DeckError::Package(format!("ZIP operation failed: {}", err))
    }
}

// Poster encoding is the only image operation without a source path
impl From<image::ImageError> for DeckError {
    fn from(err: image::ImageError) -> Self {
        DeckError::Package(format!("Image encoding failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
