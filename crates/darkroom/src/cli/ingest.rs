//! `darkroom ingest` handler.

use darkroom::{
    DarkroomResult, DiagnosticLog, IngestedMedia, Ingestor, PipelineContext, StorageError,
    StorageErrorKind, extension_of, guess_mime_type,
};
use std::path::{Path, PathBuf};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Ingest every file in order, printing the resulting variants.
pub async fn ingest_files(
    context: PipelineContext,
    files: &[PathBuf],
    mime: Option<&str>,
) -> DarkroomResult<()> {
    let diagnostics = context.diagnostics().clone();
    let ingestor = Ingestor::new(context);

    for path in files {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Read {
                key: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        let filename = file_name(path);
        let declared_mime = mime
            .map(str::to_string)
            .or_else(|| {
                extension_of(&filename)
                    .and_then(|ext| guess_mime_type(&ext))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| FALLBACK_MIME.to_string());

        let before = diagnostics.len();
        let ingested = ingestor.ingest(bytes, &filename, &declared_mime).await?;
        print_ingested(&ingested);
        print_new_diagnostics(&diagnostics, before);
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_ingested(ingested: &IngestedMedia) {
    let record = &ingested.record;
    let dimensions = record
        .dimensions
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unknown size".to_string());
    println!("{} ({}, {}) {}", record.title, record.media_type, dimensions, record.id);
    if let Some(companion) = record.live_companion_url() {
        println!("   live companion {}", companion);
    }
    for variant in &ingested.variants {
        println!(
            "   {:<9} {:>11} {}",
            variant.kind,
            format!("{}x{}", variant.width, variant.height),
            variant.storage_path
        );
    }
}

fn print_new_diagnostics(diagnostics: &DiagnosticLog, before: usize) {
    for entry in diagnostics.entries().iter().skip(before) {
        println!("   ! {}", entry.message());
    }
}
