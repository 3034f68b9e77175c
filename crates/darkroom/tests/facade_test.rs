//! End-to-end test of the production collaborators wired by `pipeline_context`.

use darkroom::{
    Capabilities, DarkroomConfig, DiagnosticLog, InMemoryMediaRepository, Ingestor, MediaType,
    SizeVariantKind, pipeline_context,
};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

fn png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn config(dir: &TempDir) -> DarkroomConfig {
    let mut config = DarkroomConfig {
        capabilities: Capabilities::none(),
        ..DarkroomConfig::default()
    };
    config.storage.root = dir.path().to_path_buf();
    config
}

#[tokio::test]
async fn test_png_upload_gets_jpeg_variants() {
    let dir = TempDir::new().unwrap();
    let repository = InMemoryMediaRepository::new();
    let context = pipeline_context(
        &config(&dir),
        Arc::new(repository.clone()),
        DiagnosticLog::new(),
    )
    .unwrap();

    let ingested = Ingestor::new(context)
        .ingest(png(800, 600), "sunset.png", "image/png")
        .await
        .unwrap();

    assert_eq!(ingested.record.media_type, MediaType::Image);
    assert_eq!(ingested.record.title, "sunset");
    let dims: Vec<(SizeVariantKind, u32, u32)> = ingested
        .variants
        .iter()
        .map(|v| (v.kind, v.width, v.height))
        .collect();
    assert_eq!(
        dims,
        vec![
            (SizeVariantKind::Thumb, 200, 200),
            (SizeVariantKind::Thumb2x, 400, 400),
            (SizeVariantKind::Small, 480, 360),
            (SizeVariantKind::Original, 800, 600),
        ]
    );

    for variant in &ingested.variants {
        let bytes = std::fs::read(dir.path().join(&variant.storage_path)).unwrap();
        if variant.kind == SizeVariantKind::Original {
            assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
        } else {
            assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!(
                (decoded.width(), decoded.height()),
                (variant.width, variant.height)
            );
        }
    }
    assert_eq!(repository.variant_count().await, 4);
}

#[tokio::test]
async fn test_context_creates_storage_root() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.storage.root = dir.path().join("library");

    pipeline_context(
        &config,
        Arc::new(InMemoryMediaRepository::new()),
        DiagnosticLog::new(),
    )
    .unwrap();

    assert!(dir.path().join("library").is_dir());
}
