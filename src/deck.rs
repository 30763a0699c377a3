// ABOUTME: Deck model and build pipeline for the image-deck application
// ABOUTME: Turns discovered media into an ordered, laid-out sequence of slides

use crate::config::{AspectRatio, DeckConfig};
use crate::discover::{discover, discover_audio, Entry};
use crate::errors::{DeckError, Result};
use crate::layout::{layout, Rect};
use crate::media::MediaItem;
use image::io::Reader as ImageReader;
use log::{info, warn};
use std::fs;
use std::io::Cursor;

/// A picture slide with its bytes already loaded and placement computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlide {
    pub media: MediaItem,
    /// Source size in pixels
    pub dimensions: (u32, u32),
    pub placement: Rect,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slide {
    Title(String),
    Image(ImageSlide),
}

impl Slide {
    pub fn is_title(&self) -> bool {
        matches!(self, Slide::Title(_))
    }
}

/// Background track embedded on the first slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAttachment {
    pub media: MediaItem,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub title: String,
    pub aspect_ratio: AspectRatio,
    pub slides: Vec<Slide>,
    /// Attached to slide 0 and started automatically
    pub audio: Option<AudioAttachment>,
    pub auto_advance_ms: Option<u32>,
}

impl Deck {
    pub fn new(title: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            title: title.into(),
            aspect_ratio,
            slides: Vec::new(),
            audio: None,
            auto_advance_ms: None,
        }
    }

    /// Slide width and height in EMU
    pub fn size(&self) -> (i64, i64) {
        self.aspect_ratio.dimensions()
    }

    pub fn push(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// A slide holding only `folder_name` as large centered text
pub fn build_title_slide(folder_name: &str) -> Slide {
    Slide::Title(folder_name.to_string())
}

/// Load `media`, read its pixel size and fit it onto a slide of `slide_size`.
///
/// Only the image header is decoded, so a file with a valid header and a
/// truncated body is still accepted.
pub fn build_image_slide(media: &MediaItem, slide_size: (i64, i64), margin: i64) -> Result<Slide> {
    let data = fs::read(&media.path).map_err(|e| DeckError::invalid_media(&media.path, e))?;

    let dimensions = ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .map_err(|e| DeckError::invalid_media(&media.path, e))?
        .into_dimensions()
        .map_err(|e| DeckError::invalid_media(&media.path, e))?;

    let placement =
        layout(dimensions, slide_size, margin).map_err(|e| DeckError::invalid_media(&media.path, e))?;

    Ok(Slide::Image(ImageSlide {
        media: media.clone(),
        dimensions,
        placement,
        data,
    }))
}

/// Read an audio file so it can be embedded
pub fn load_audio(media: &MediaItem) -> Result<AudioAttachment> {
    let data = fs::read(&media.path).map_err(|e| DeckError::invalid_media(&media.path, e))?;
    if data.is_empty() {
        return Err(DeckError::invalid_media(&media.path, "file is empty"));
    }
    Ok(AudioAttachment {
        media: media.clone(),
        data,
    })
}

/// Attach `audio` to the first slide. `None` leaves the deck untouched.
pub fn attach_audio(deck: &mut Deck, audio: Option<AudioAttachment>) {
    let Some(audio) = audio else {
        return;
    };
    if deck.is_empty() {
        warn!(
            "Cannot add music {}, no slides exist in the presentation",
            audio.media.file_name()
        );
        return;
    }
    info!("Adding music {} to the first slide", audio.media.file_name());
    deck.audio = Some(audio);
}

fn push_image(deck: &mut Deck, media: &MediaItem, margin: i64) -> Result<()> {
    match build_image_slide(media, deck.size(), margin) {
        Ok(slide) => {
            info!("Added image: {}", media.file_name());
            deck.push(slide);
            Ok(())
        }
        Err(e) if e.is_skippable() => {
            warn!("Skipping image: {}", e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Run discovery and layout for `config`, producing the in-memory deck.
///
/// Unreadable media is skipped with a warning. A missing images root is fatal.
pub fn build_deck(config: &DeckConfig) -> Result<Deck> {
    config.validate()?;

    let discovery = discover(&config.images_dir)?;

    let mut deck = Deck::new(config.title.clone(), config.aspect_ratio);
    deck.auto_advance_ms = config.auto_advance_ms();

    for entry in discovery.ordered(config.folder_order) {
        match entry {
            Entry::Image(media) => push_image(&mut deck, media, config.margin_emu)?,
            Entry::Folder(folder) => {
                info!("Adding title slide for: {}", folder.name);
                deck.push(build_title_slide(&folder.name));
                for media in &folder.images {
                    push_image(&mut deck, media, config.margin_emu)?;
                }
            }
        }
    }
    info!("Built {} slides", deck.len());

    if config.enable_audio {
        let audio = discover_audio(&config.music_dir).and_then(|media| match load_audio(&media) {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!("Skipping music: {}", e);
                None
            }
        });
        attach_audio(&mut deck, audio);
    } else {
        info!("Background music disabled");
    }

    Ok(deck)
}
