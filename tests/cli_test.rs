use image::{ImageBuffer, Rgb};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::ZipArchive;

const CONFIG_VARS: &[&str] = &[
    "IMAGE_DECK_IMAGES_DIR",
    "IMAGE_DECK_MUSIC_DIR",
    "IMAGE_DECK_OUTPUT",
    "IMAGE_DECK_TITLE",
    "IMAGE_DECK_ASPECT_RATIO",
    "IMAGE_DECK_ENABLE_AUDIO",
    "IMAGE_DECK_AUTO_ADVANCE_SECONDS",
    "IMAGE_DECK_FOLDER_ORDER",
    "IMAGE_DECK_MARGIN_EMU",
];

fn run_command(dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_image-deck"));
    command.current_dir(dir).args(args);
    for var in CONFIG_VARS {
        command.env_remove(var);
    }
    command.output().expect("Failed to execute command")
}

fn create_images(dir: &Path) {
    let images = dir.join("images");
    fs::create_dir_all(images.join("holiday")).expect("Failed to create images directory");
    let img = ImageBuffer::from_fn(64, 48, |_, _| Rgb([0u8, 128u8, 0u8]));
    img.save(images.join("cover.png")).expect("Failed to save image");
    img.save(images.join("holiday").join("beach.png"))
        .expect("Failed to save image");
}

fn count_slides(pptx: &Path) -> usize {
    let file = fs::File::open(pptx).expect("Failed to open PPTX file");
    let archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .count()
}

#[test]
fn test_runs_without_arguments() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_images(temp_dir.path());

    let output = run_command(temp_dir.path(), &[]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let pptx = temp_dir.path().join("presentation.pptx");
    assert!(pptx.exists(), "PPTX file was not created");
    assert_eq!(count_slides(&pptx), 3);
}

#[test]
fn test_flags_override_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_images(temp_dir.path());

    let output = run_command(
        temp_dir.path(),
        &[
            "--output",
            "slides/holiday.pptx",
            "--aspect-ratio",
            "16:9",
            "--auto-advance",
            "2",
            "--order",
            "images-first",
            "--no-audio",
        ],
    );

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(temp_dir.path().join("slides").join("holiday.pptx").exists());
    assert!(!temp_dir.path().join("presentation.pptx").exists());
}

#[test]
fn test_missing_images_dir_exits_with_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = run_command(temp_dir.path(), &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "Unexpected stderr: {}", stderr);
    assert!(stderr.contains("images"), "Path missing from stderr: {}", stderr);
    assert!(!temp_dir.path().join("presentation.pptx").exists());
}

#[test]
fn test_rejects_unknown_aspect_ratio() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_images(temp_dir.path());

    let output = run_command(temp_dir.path(), &["--aspect-ratio", "21:9"]);

    assert!(!output.status.success());
    assert!(!temp_dir.path().join("presentation.pptx").exists());
}
