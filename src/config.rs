// ABOUTME: Configuration module for the image-deck application
// ABOUTME: Provides deck settings, their defaults and environment variable handling

use crate::errors::{DeckError, Result};
use log::warn;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_IMAGES_DIR: &str = "images";
pub const DEFAULT_MUSIC_DIR: &str = "music";
pub const DEFAULT_OUTPUT_FILE: &str = "presentation.pptx";
pub const DEFAULT_TITLE: &str = "Presentation";

/// Slide proportions supported by the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    Standard,
    Widescreen,
}

impl AspectRatio {
    /// Slide width and height in EMU
    pub fn dimensions(self) -> (i64, i64) {
        match self {
            AspectRatio::Standard => (9144000, 6858000),
            AspectRatio::Widescreen => (9144000, 5143500),
        }
    }

    /// Value of the `type` attribute on `p:sldSz`
    pub fn slide_size_type(self) -> &'static str {
        match self {
            AspectRatio::Standard => "screen4x3",
            AspectRatio::Widescreen => "screen16x9",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "4:3" => Ok(AspectRatio::Standard),
            "16:9" => Ok(AspectRatio::Widescreen),
            other => Err(DeckError::Config(format!(
                "Unsupported aspect ratio: {} (expected \"4:3\" or \"16:9\")",
                other
            ))),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Standard => f.write_str("4:3"),
            AspectRatio::Widescreen => f.write_str("16:9"),
        }
    }
}

/// Where subfolder blocks go relative to the top-level images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderOrder {
    /// Subfolders and top-level images share one name-sorted sequence
    #[default]
    Interleaved,
    /// Every top-level image comes before the first subfolder
    ImagesFirst,
}

impl FromStr for FolderOrder {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "interleaved" => Ok(FolderOrder::Interleaved),
            "images-first" | "images_first" => Ok(FolderOrder::ImagesFirst),
            other => Err(DeckError::Config(format!(
                "Unsupported folder order: {} (expected \"interleaved\" or \"images-first\")",
                other
            ))),
        }
    }
}

impl fmt::Display for FolderOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderOrder::Interleaved => f.write_str("interleaved"),
            FolderOrder::ImagesFirst => f.write_str("images-first"),
        }
    }
}

/// Settings for a single deck build
#[derive(Debug, Clone, PartialEq)]
pub struct DeckConfig {
    pub images_dir: PathBuf,
    pub music_dir: PathBuf,
    pub output: PathBuf,
    pub title: String,
    pub aspect_ratio: AspectRatio,
    pub enable_audio: bool,
    pub auto_advance_seconds: Option<f64>,
    pub folder_order: FolderOrder,
    /// Blank border kept around placed pictures, in EMU
    pub margin_emu: i64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            music_dir: PathBuf::from(DEFAULT_MUSIC_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            title: DEFAULT_TITLE.to_string(),
            aspect_ratio: AspectRatio::default(),
            enable_audio: true,
            auto_advance_seconds: None,
            folder_order: FolderOrder::default(),
            margin_emu: 0,
        }
    }
}

impl DeckConfig {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `IMAGE_DECK_*` environment variables.
    ///
    /// Values that fail to parse are reported and replaced by the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let images_dir = env::var("IMAGE_DECK_IMAGES_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or(defaults.images_dir);
        let music_dir = env::var("IMAGE_DECK_MUSIC_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or(defaults.music_dir);
        let output = env::var("IMAGE_DECK_OUTPUT")
            .ok()
            .map(PathBuf::from)
            .unwrap_or(defaults.output);
        let title = env::var("IMAGE_DECK_TITLE").unwrap_or(defaults.title);

        let aspect_ratio = parse_env_or("IMAGE_DECK_ASPECT_RATIO", defaults.aspect_ratio);
        let folder_order = parse_env_or("IMAGE_DECK_FOLDER_ORDER", defaults.folder_order);
        let enable_audio = env::var("IMAGE_DECK_ENABLE_AUDIO")
            .ok()
            .map(|s| s.to_lowercase() != "false" && s != "0")
            .unwrap_or(defaults.enable_audio);

        let auto_advance_seconds = match env::var("IMAGE_DECK_AUTO_ADVANCE_SECONDS") {
            Ok(raw) => match raw.trim().parse::<f64>() {
                Ok(secs) => Some(secs),
                Err(e) => {
                    warn!(
                        "Ignoring IMAGE_DECK_AUTO_ADVANCE_SECONDS={:?}: {}",
                        raw, e
                    );
                    defaults.auto_advance_seconds
                }
            },
            Err(_) => defaults.auto_advance_seconds,
        };

        let margin_emu = match env::var("IMAGE_DECK_MARGIN_EMU") {
            Ok(raw) => raw.trim().parse::<i64>().unwrap_or_else(|e| {
                warn!("Ignoring IMAGE_DECK_MARGIN_EMU={:?}: {}", raw, e);
                defaults.margin_emu
            }),
            Err(_) => defaults.margin_emu,
        };

        Self {
            images_dir,
            music_dir,
            output,
            title,
            aspect_ratio,
            enable_audio,
            auto_advance_seconds,
            folder_order,
            margin_emu,
        }
    }

    /// Check value ranges that the types alone cannot express
    pub fn validate(&self) -> Result<()> {
        if let Some(secs) = self.auto_advance_seconds {
            if !secs.is_finite() || secs < 0.0 {
                return Err(DeckError::Config(format!(
                    "Auto-advance must be a non-negative number of seconds, got {}",
                    secs
                )));
            }
            // advTm is an xsd:unsignedInt of milliseconds
            if (secs * 1000.0).round() > u32::MAX as f64 {
                return Err(DeckError::Config(format!(
                    "Auto-advance of {} seconds exceeds the {} ms PowerPoint allows",
                    secs,
                    u32::MAX
                )));
            }
        }

        let (width, height) = self.aspect_ratio.dimensions();
        let too_wide = self
            .margin_emu
            .checked_mul(2)
            .map_or(true, |both_sides| both_sides >= width.min(height));
        if self.margin_emu < 0 || too_wide {
            return Err(DeckError::Config(format!(
                "Margin of {} EMU leaves no content area on a {} slide",
                self.margin_emu, self.aspect_ratio
            )));
        }

        Ok(())
    }

    /// Auto-advance delay in milliseconds, as stored in `advTm`.
    ///
    /// Values past `u32::MAX` saturate; `validate` rejects them first.
    pub fn auto_advance_ms(&self) -> Option<u32> {
        self.auto_advance_seconds
            .map(|secs| (secs * 1000.0).round() as u32)
    }
}

fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr<Err = DeckError> + fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{}. Using {} instead.", e, default);
            default
        }),
        Err(_) => default,
    }
}
