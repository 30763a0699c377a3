// ABOUTME: Media discovery for the image-deck application
// ABOUTME: Walks the images root and music directory in name order

use crate::config::FolderOrder;
use crate::errors::Result;
use crate::media::{MediaItem, MediaKind};
use crate::utils::{display_name, sorted_entries, validate_directory_exists};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// A subdirectory of the images root and the pictures directly inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub path: PathBuf,
    pub name: String,
    pub images: Vec<MediaItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Image(MediaItem),
    Folder(Folder),
}

/// Everything found under the images root, sorted by file name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    entries: Vec<Entry>,
}

impl Discovery {
    /// All entries in name order, images and folders merged
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn top_level_images(&self) -> Vec<&MediaItem> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Image(item) => Some(item),
                Entry::Folder(_) => None,
            })
            .collect()
    }

    pub fn subfolders(&self) -> Vec<&Folder> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Folder(folder) => Some(folder),
                Entry::Image(_) => None,
            })
            .collect()
    }

    /// Entries in the sequence slides should be emitted for `order`
    pub fn ordered(&self, order: FolderOrder) -> Vec<&Entry> {
        match order {
            FolderOrder::Interleaved => self.entries.iter().collect(),
            FolderOrder::ImagesFirst => {
                let (images, folders): (Vec<&Entry>, Vec<&Entry>) = self
                    .entries
                    .iter()
                    .partition(|entry| matches!(entry, Entry::Image(_)));
                images.into_iter().chain(folders).collect()
            }
        }
    }

    /// Number of slides these entries produce, one title slide per folder included
    pub fn slide_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                Entry::Image(_) => 1,
                Entry::Folder(folder) => 1 + folder.images.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scan `images_root` for allow-listed pictures and one level of subfolders
pub fn discover(images_root: &Path) -> Result<Discovery> {
    validate_directory_exists(images_root)?;
    info!("Scanning directory: {:?}", images_root);

    let mut entries = Vec::new();
    for path in sorted_entries(images_root)? {
        if path.is_dir() {
            let name = display_name(&path);
            let images = match folder_images(&path) {
                Ok(images) => images,
                Err(e) => {
                    warn!("Could not list subdirectory {:?}: {}. Skipping its images.", path, e);
                    Vec::new()
                }
            };
            info!("Found subdirectory '{}' with {} images", name, images.len());
            entries.push(Entry::Folder(Folder { path, name, images }));
        } else if let Some(item) = image_item(&path) {
            entries.push(Entry::Image(item));
        } else {
            debug!("Skipping unsupported item: {:?}", path);
        }
    }

    info!("Found {} items in {:?}", entries.len(), images_root);
    Ok(Discovery { entries })
}

fn folder_images(folder: &Path) -> Result<Vec<MediaItem>> {
    let mut images = Vec::new();
    for path in sorted_entries(folder)? {
        if path.is_dir() {
            debug!("Skipping nested directory: {:?}", path);
        } else if let Some(item) = image_item(&path) {
            images.push(item);
        } else {
            debug!("Skipping unsupported item: {:?}", path);
        }
    }
    Ok(images)
}

fn image_item(path: &Path) -> Option<MediaItem> {
    if !path.is_file() {
        return None;
    }
    MediaItem::from_path(path, MediaKind::Image)
}

/// Find the background track in `music_root`.
///
/// Returns the first allow-listed audio file by name. A missing or unreadable
/// directory is not an error.
pub fn discover_audio(music_root: &Path) -> Option<MediaItem> {
    if !music_root.is_dir() {
        warn!("Music directory {:?} not found", music_root);
        return None;
    }

    info!("Searching for music file in {:?}", music_root);
    let paths = match sorted_entries(music_root) {
        Ok(paths) => paths,
        Err(e) => {
            warn!("Could not list music directory {:?}: {}", music_root, e);
            return None;
        }
    };

    let mut candidates = paths
        .iter()
        .filter(|path| path.is_file())
        .filter_map(|path| MediaItem::from_path(path, MediaKind::Audio));

    let chosen = candidates.next();
    match &chosen {
        Some(item) => {
            info!("Found music file: {}", item.file_name());
            for ignored in candidates {
                info!(
                    "Ignoring additional music file {} (only the first is used)",
                    ignored.file_name()
                );
            }
        }
        None => info!("No supported music file found"),
    }
    chosen
}
