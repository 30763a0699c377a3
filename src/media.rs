// ABOUTME: Media item model for the image-deck application
// ABOUTME: Classifies files by extension allow-list and maps them to OOXML content types

use crate::utils::{display_name, lowercase_extension};
use std::path::{Path, PathBuf};

/// Extensions accepted as slide pictures
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif"];

/// Extensions accepted as background music
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "wma"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    fn allow_list(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Audio => AUDIO_EXTENSIONS,
        }
    }
}

/// A file on disk that ends up embedded in the deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub path: PathBuf,
    pub kind: MediaKind,
    /// Lowercased file extension
    pub format: String,
}

impl MediaItem {
    /// Classify `path` as `kind`, or `None` when its extension is not allow-listed
    pub fn from_path(path: &Path, kind: MediaKind) -> Option<Self> {
        let format = lowercase_extension(path)?;
        if !kind.allow_list().contains(&format.as_str()) {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            kind,
            format,
        })
    }

    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }

    /// Name of the directory holding this file
    pub fn folder_name(&self) -> Option<String> {
        self.path.parent().and_then(|parent| {
            parent
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
    }

    pub fn content_type(&self) -> &'static str {
        content_type_for(&self.format)
    }
}

/// MIME type written to `[Content_Types].xml` for a media extension
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "wma" => "audio/x-ms-wma",
        _ => "application/octet-stream",
    }
}
