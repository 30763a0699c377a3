// ABOUTME: Main entry point for the image-deck program.
// ABOUTME: Provides CLI interface and runs the deck pipeline from the library.

use anyhow::Context;
use clap::Parser;
use image_deck::{AspectRatio, DeckConfig, FolderOrder};
use std::path::PathBuf;

/// Build a PowerPoint deck from a folder of images
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the images and one level of subfolders
    #[arg(long)]
    images: Option<PathBuf>,

    /// Directory searched for a background music file
    #[arg(long)]
    music: Option<PathBuf>,

    /// Path of the PPTX file to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Slide aspect ratio: "4:3" or "16:9"
    #[arg(long, value_parser = parse_aspect_ratio)]
    aspect_ratio: Option<AspectRatio>,

    /// Do not embed background music
    #[arg(long)]
    no_audio: bool,

    /// Advance slides automatically after this many seconds
    #[arg(long, value_name = "SECONDS")]
    auto_advance: Option<f64>,

    /// Placement of subfolders: "interleaved" or "images-first"
    #[arg(long, value_parser = parse_folder_order)]
    order: Option<FolderOrder>,

    /// Presentation title stored in the document properties
    #[arg(long)]
    title: Option<String>,

    /// Blank border around pictures, in EMU
    #[arg(long, value_name = "EMU")]
    margin: Option<i64>,
}

impl Cli {
    /// Layer command-line flags over the environment configuration
    fn into_config(self, mut config: DeckConfig) -> DeckConfig {
        if let Some(images) = self.images {
            config.images_dir = images;
        }
        if let Some(music) = self.music {
            config.music_dir = music;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(aspect_ratio) = self.aspect_ratio {
            config.aspect_ratio = aspect_ratio;
        }
        if self.no_audio {
            config.enable_audio = false;
        }
        if self.auto_advance.is_some() {
            config.auto_advance_seconds = self.auto_advance;
        }
        if let Some(order) = self.order {
            config.folder_order = order;
        }
        if let Some(title) = self.title {
            config.title = title;
        }
        if let Some(margin) = self.margin {
            config.margin_emu = margin;
        }
        config
    }
}

fn parse_aspect_ratio(s: &str) -> Result<AspectRatio, String> {
    s.parse().map_err(|e: image_deck::DeckError| e.to_string())
}

fn parse_folder_order(s: &str) -> Result<FolderOrder, String> {
    s.parse().map_err(|e: image_deck::DeckError| e.to_string())
}

fn run(config: &DeckConfig) -> anyhow::Result<()> {
    log::info!(
        "Image directory: {:?}, music directory: {:?}, output file: {:?}",
        config.images_dir,
        config.music_dir,
        config.output
    );

    let deck = image_deck::generate_pptx(config)
        .with_context(|| format!("Failed to build presentation {:?}", config.output))?;

    println!(
        "Presentation saved successfully as {:?} ({} slides created)",
        config.output,
        deck.len()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.into_config(DeckConfig::from_env());

    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
