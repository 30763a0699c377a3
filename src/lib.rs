// ABOUTME: Library module for the image-deck program.
// ABOUTME: Discovers images and music, lays out slides and writes PPTX files.

// Reexport modules
pub mod config;
pub mod deck;
pub mod discover;
pub mod errors;
pub mod layout;
pub mod media;
pub mod pptx;
pub mod templates;
pub mod utils;

// Reexport common types and functions
pub use config::{AspectRatio, DeckConfig, FolderOrder};
pub use deck::{attach_audio, build_deck, build_title_slide, AudioAttachment, Deck, ImageSlide, Slide};
pub use discover::{discover, discover_audio, Discovery, Entry, Folder};
pub use errors::{DeckError, Result};
pub use layout::{layout, LayoutError, Rect};
pub use media::{MediaItem, MediaKind};
pub use pptx::{generate_pptx, save, write_package};

#[cfg(test)]
mod tests;
