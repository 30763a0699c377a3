use super::*;
use image::{ImageBuffer, Rgb};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn create_test_image(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgb([200u8, 40u8, 40u8]));
    img.save(path).expect("Failed to save test image");
}

fn names(items: &[&MediaItem]) -> Vec<String> {
    items.iter().map(|item| item.file_name()).collect()
}

const STANDARD: (i64, i64) = (9144000, 6858000);

#[test]
fn test_layout_landscape_fills_width() {
    let rect = layout((200, 100), STANDARD, 0).unwrap();
    assert_eq!(
        rect,
        Rect {
            x: 0,
            y: 1143000,
            cx: 9144000,
            cy: 4572000
        }
    );
}

#[test]
fn test_layout_portrait_fills_height() {
    let rect = layout((100, 200), STANDARD, 0).unwrap();
    assert_eq!(
        rect,
        Rect {
            x: 2857500,
            y: 0,
            cx: 3429000,
            cy: 6858000
        }
    );
}

#[test]
fn test_layout_respects_margin() {
    let rect = layout((100, 100), STANDARD, 457200).unwrap();
    assert_eq!(
        rect,
        Rect {
            x: 1600200,
            y: 457200,
            cx: 5943600,
            cy: 5943600
        }
    );
}

#[test]
fn test_layout_keeps_aspect_ratio_and_stays_on_slide() {
    let slide = Rect {
        x: 0,
        y: 0,
        cx: STANDARD.0,
        cy: STANDARD.1,
    };
    for &(w, h) in &[(1, 1), (3, 7), (1920, 1080), (4000, 3), (17, 4096), (640, 480)] {
        let rect = layout((w, h), STANDARD, 0).unwrap();
        assert!(slide.contains(&rect), "{}x{} placed outside slide: {:?}", w, h, rect);

        let source = w as f64 / h as f64;
        let placed = rect.cx as f64 / rect.cy as f64;
        assert!(
            (placed - source).abs() / source < 1e-3,
            "{}x{} distorted to {:?}",
            w,
            h,
            rect
        );

        // Centered: equal slack on both sides, give or take integer rounding
        assert!((rect.x - (slide.right() - rect.right())).abs() <= 1);
        assert!((rect.y - (slide.bottom() - rect.bottom())).abs() <= 1);
    }
}

#[test]
fn test_layout_upscales_small_images_to_content_area() {
    let rect = layout((4, 3), STANDARD, 0).unwrap();
    assert_eq!((rect.cx, rect.cy), STANDARD);
}

#[test]
fn test_layout_rejects_zero_dimension() {
    assert_eq!(
        layout((0, 100), STANDARD, 0),
        Err(LayoutError::ZeroDimension(0, 100))
    );
    assert_eq!(
        layout((100, 0), STANDARD, 0),
        Err(LayoutError::ZeroDimension(100, 0))
    );
}

#[test]
fn test_layout_rejects_margin_larger_than_slide() {
    assert_eq!(
        layout((100, 100), STANDARD, 4000000),
        Err(LayoutError::EmptyContentArea)
    );
}

#[test]
fn test_media_item_extension_is_case_insensitive() {
    let item = MediaItem::from_path(Path::new("images/Photo.JPG"), MediaKind::Image).unwrap();
    assert_eq!(item.format, "jpg");
    assert_eq!(item.content_type(), "image/jpeg");
    assert_eq!(item.folder_name().as_deref(), Some("images"));

    assert!(MediaItem::from_path(Path::new("scan.TIFF"), MediaKind::Image).is_some());
    assert!(MediaItem::from_path(Path::new("notes.txt"), MediaKind::Image).is_none());
    assert!(MediaItem::from_path(Path::new("README"), MediaKind::Image).is_none());
    assert!(MediaItem::from_path(Path::new("song.mp3"), MediaKind::Image).is_none());
}

#[test]
fn test_media_item_audio_allow_list() {
    let item = MediaItem::from_path(Path::new("music/Theme.WAV"), MediaKind::Audio).unwrap();
    assert_eq!(item.kind, MediaKind::Audio);
    assert_eq!(item.content_type(), "audio/wav");
    assert!(MediaItem::from_path(Path::new("track.wma"), MediaKind::Audio).is_some());
    assert!(MediaItem::from_path(Path::new("track.flac"), MediaKind::Audio).is_none());
}

#[test]
fn test_aspect_ratio_parsing() {
    assert_eq!("4:3".parse::<AspectRatio>().unwrap(), AspectRatio::Standard);
    assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Widescreen);
    assert!(matches!(
        "21:9".parse::<AspectRatio>(),
        Err(DeckError::Config(_))
    ));
    assert_eq!(AspectRatio::default(), AspectRatio::Standard);
    assert_eq!(AspectRatio::Widescreen.dimensions(), (9144000, 5143500));
}

#[test]
fn test_folder_order_parsing() {
    assert_eq!(
        "images-first".parse::<FolderOrder>().unwrap(),
        FolderOrder::ImagesFirst
    );
    assert_eq!(
        "Interleaved".parse::<FolderOrder>().unwrap(),
        FolderOrder::Interleaved
    );
    assert!("random".parse::<FolderOrder>().is_err());
}

#[test]
fn test_config_defaults() {
    let config = DeckConfig::default();
    assert_eq!(config.images_dir, Path::new("images"));
    assert_eq!(config.music_dir, Path::new("music"));
    assert_eq!(config.output, Path::new("presentation.pptx"));
    assert_eq!(config.aspect_ratio, AspectRatio::Standard);
    assert!(config.enable_audio);
    assert_eq!(config.auto_advance_seconds, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation() {
    let mut config = DeckConfig {
        auto_advance_seconds: Some(-1.0),
        ..DeckConfig::default()
    };
    assert!(matches!(config.validate(), Err(DeckError::Config(_))));

    config.auto_advance_seconds = Some(f64::NAN);
    assert!(config.validate().is_err());

    config.auto_advance_seconds = Some(1.5);
    assert!(config.validate().is_ok());
    assert_eq!(config.auto_advance_ms(), Some(1500));

    config.margin_emu = -5;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_rejects_huge_margin_without_overflow() {
    for margin_emu in [3429000, i64::MAX / 2 + 1, i64::MAX] {
        let config = DeckConfig {
            margin_emu,
            ..DeckConfig::default()
        };
        assert!(
            matches!(config.validate(), Err(DeckError::Config(_))),
            "margin {} should be rejected",
            margin_emu
        );
    }

    let config = DeckConfig {
        margin_emu: 3428999,
        ..DeckConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_auto_advance_fits_advtm() {
    // advTm holds at most u32::MAX milliseconds
    let mut config = DeckConfig {
        auto_advance_seconds: Some(4_294_967.0),
        ..DeckConfig::default()
    };
    assert!(config.validate().is_ok());
    assert_eq!(config.auto_advance_ms(), Some(4_294_967_000));

    config.auto_advance_seconds = Some(5_000_000.0);
    assert!(matches!(config.validate(), Err(DeckError::Config(_))));
}

#[test]
fn test_discover_sorts_and_filters() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    create_test_image(&root.join("b.png"), 10, 10);
    create_test_image(&root.join("a.jpg"), 10, 10);
    fs::write(root.join("notes.txt"), "not an image").unwrap();
    fs::create_dir(root.join("trip")).unwrap();
    create_test_image(&root.join("trip").join("z.jpg"), 10, 10);
    create_test_image(&root.join("trip").join("c.bmp"), 10, 10);
    fs::create_dir(root.join("trip").join("nested")).unwrap();
    create_test_image(&root.join("trip").join("nested").join("deep.png"), 10, 10);

    let discovery = discover(root).unwrap();

    assert_eq!(names(&discovery.top_level_images()), vec!["a.jpg", "b.png"]);
    let folders = discovery.subfolders();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name, "trip");
    assert_eq!(
        folders[0]
            .images
            .iter()
            .map(|item| item.file_name())
            .collect::<Vec<_>>(),
        vec!["c.bmp", "z.jpg"]
    );
    assert_eq!(discovery.slide_count(), 5);
}

#[test]
fn test_discover_ordering_modes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    create_test_image(&root.join("b.png"), 10, 10);
    create_test_image(&root.join("a.jpg"), 10, 10);
    fs::create_dir(root.join("trip")).unwrap();

    let discovery = discover(root).unwrap();
    let label = |entry: &&Entry| match entry {
        Entry::Image(item) => item.file_name(),
        Entry::Folder(folder) => format!("{}/", folder.name),
    };

    let interleaved: Vec<String> = discovery
        .ordered(FolderOrder::Interleaved)
        .iter()
        .map(label)
        .collect();
    assert_eq!(interleaved, vec!["a.jpg", "b.png", "trip/"]);

    fs::create_dir(root.join("album")).unwrap();
    let discovery = discover(root).unwrap();
    let interleaved: Vec<String> = discovery
        .ordered(FolderOrder::Interleaved)
        .iter()
        .map(label)
        .collect();
    assert_eq!(interleaved, vec!["a.jpg", "album/", "b.png", "trip/"]);

    let images_first: Vec<String> = discovery
        .ordered(FolderOrder::ImagesFirst)
        .iter()
        .map(label)
        .collect();
    assert_eq!(images_first, vec!["a.jpg", "b.png", "album/", "trip/"]);
}

#[test]
fn test_discover_missing_root() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("does-not-exist");
    match discover(&missing) {
        Err(DeckError::NotFound(path)) => assert_eq!(path, missing),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_discover_audio() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let music = temp_dir.path().join("music");

    assert!(discover_audio(&music).is_none());

    fs::create_dir(&music).unwrap();
    assert!(discover_audio(&music).is_none());

    fs::write(music.join("cover.jpg"), b"not audio").unwrap();
    fs::write(music.join("zebra.wav"), b"RIFF").unwrap();
    fs::write(music.join("Intro.MP3"), b"ID3").unwrap();

    let found = discover_audio(&music).unwrap();
    assert_eq!(found.file_name(), "Intro.MP3");
    assert_eq!(found.format, "mp3");
}

#[test]
fn test_build_title_slide() {
    let slide = build_title_slide("Summer 2023");
    assert_eq!(slide, Slide::Title("Summer 2023".to_string()));
    assert!(slide.is_title());
}

#[test]
fn test_attach_audio() {
    let audio = AudioAttachment {
        media: MediaItem::from_path(Path::new("music/song.mp3"), MediaKind::Audio).unwrap(),
        data: vec![1, 2, 3],
    };

    let mut empty = Deck::new("Empty", AspectRatio::Standard);
    attach_audio(&mut empty, Some(audio.clone()));
    assert!(empty.audio.is_none());

    let mut deck = Deck::new("Trip", AspectRatio::Standard);
    deck.push(build_title_slide("trip"));
    attach_audio(&mut deck, None);
    assert!(deck.audio.is_none());

    attach_audio(&mut deck, Some(audio.clone()));
    assert_eq!(deck.audio, Some(audio));
}

#[test]
fn test_build_deck_skips_invalid_images() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let images = temp_dir.path().join("images");
    fs::create_dir(&images).unwrap();
    create_test_image(&images.join("good.png"), 40, 30);
    fs::write(images.join("broken.jpg"), b"definitely not a jpeg").unwrap();
    fs::write(images.join("empty.png"), b"").unwrap();

    let config = DeckConfig {
        images_dir: images,
        music_dir: temp_dir.path().join("music"),
        ..DeckConfig::default()
    };
    let deck = build_deck(&config).unwrap();

    assert_eq!(deck.len(), 1);
    match &deck.slides[0] {
        Slide::Image(image) => {
            assert_eq!(image.media.file_name(), "good.png");
            assert_eq!(image.dimensions, (40, 30));
        }
        other => panic!("Expected image slide, got {:?}", other),
    }
}

#[test]
fn test_image_slide_reads_header_only() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("cut.png");
    create_test_image(&path, 40, 30);

    // Drop IEND and the last byte of the IDAT checksum
    let data = fs::read(&path).unwrap();
    fs::write(&path, &data[..data.len() - 13]).unwrap();

    let media = MediaItem::from_path(&path, MediaKind::Image).unwrap();
    match deck::build_image_slide(&media, AspectRatio::Standard.dimensions(), 0).unwrap() {
        Slide::Image(image) => assert_eq!(image.dimensions, (40, 30)),
        other => panic!("Expected image slide, got {:?}", other),
    }
}

#[test]
fn test_build_deck_rejects_invalid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = DeckConfig {
        images_dir: temp_dir.path().to_path_buf(),
        auto_advance_seconds: Some(-3.0),
        ..DeckConfig::default()
    };
    assert!(matches!(build_deck(&config), Err(DeckError::Config(_))));
}

#[test]
fn test_invalid_media_is_skippable() {
    assert!(DeckError::invalid_media("x.png", "bad header").is_skippable());
    assert!(!DeckError::NotFound("images".into()).is_skippable());
}
