//! Test utilities for pipeline tests.
//!
//! Mock collaborators plus a harness that wires them to a real
//! `FileSystemStorage` in a temporary directory and an in-memory repository.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use darkroom_core::{
    CameraInfo, Capabilities, DiagnosticLog, Dimensions, Extracted, LiveState, MediaRecord,
    MediaType, Metadata, Orientation, RecordId, VariantSettings,
};
use darkroom_error::{
    DarkroomResult, RenderError, RenderErrorKind, VideoToolError, VideoToolErrorKind,
};
use darkroom_interface::{
    MediaRepository, MetadataExtractor, RenderRequest, Rendered, Renderer, VideoProbe, VideoTool,
};
use darkroom_pipeline::{InMemoryMediaRepository, PipelineContext};
use darkroom_storage::{FileSystemStorage, MediaStorage};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Renderer that "renders" by echoing the requested box.
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    failing: Arc<Mutex<HashSet<(u32, u32)>>>,
    calls: Arc<AtomicUsize>,
}

impl MockRenderer {
    /// Make every request for this target box fail.
    pub fn fail_on(&self, width: u32, height: u32) {
        self.failing.lock().unwrap().insert((width, height));
    }

    /// Number of render calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(&self, _source: &[u8], request: &RenderRequest) -> DarkroomResult<Rendered> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self
            .failing
            .lock()
            .unwrap()
            .contains(&(request.width, request.height))
        {
            return Err(RenderError::new(RenderErrorKind::Encode(
                "encoder exploded".to_string(),
            ))
            .into());
        }
        Ok(Rendered {
            bytes: format!("{}x{}", request.width, request.height).into_bytes(),
            width: request.width,
            height: request.height,
        })
    }
}

/// Video tool with scripted probe results.
#[derive(Debug, Clone, Default)]
pub struct MockVideoTool {
    probes: Arc<Mutex<HashMap<Vec<u8>, VideoProbe>>>,
    frame_fails: Arc<Mutex<bool>>,
    probe_calls: Arc<AtomicUsize>,
    frame_calls: Arc<AtomicUsize>,
}

impl MockVideoTool {
    /// Probing `bytes` returns `probe`; anything else fails.
    pub fn register(&self, bytes: &[u8], probe: VideoProbe) {
        self.probes.lock().unwrap().insert(bytes.to_vec(), probe);
    }

    /// Make frame extraction fail.
    pub fn fail_frames(&self) {
        *self.frame_fails.lock().unwrap() = true;
    }

    /// Number of probe calls so far.
    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// Number of frame extractions so far.
    pub fn frame_calls(&self) -> usize {
        self.frame_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoTool for MockVideoTool {
    async fn probe(&self, bytes: &[u8]) -> DarkroomResult<VideoProbe> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.probes
            .lock()
            .unwrap()
            .get(bytes)
            .cloned()
            .ok_or_else(|| {
                VideoToolError::new(VideoToolErrorKind::Exit {
                    tool: "ffprobe".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "Invalid data found when processing input".to_string(),
                })
                .into()
            })
    }

    async fn extract_frame(&self, _bytes: &[u8]) -> DarkroomResult<Vec<u8>> {
        self.frame_calls.fetch_add(1, Ordering::SeqCst);
        if *self.frame_fails.lock().unwrap() {
            return Err(VideoToolError::new(VideoToolErrorKind::NoVideoStream).into());
        }
        Ok(b"frame".to_vec())
    }
}

/// Extractor that looks metadata up by file contents.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    known: Arc<Mutex<HashMap<Vec<u8>, Metadata>>>,
}

impl MockExtractor {
    /// Extracting `bytes` returns `metadata`; anything else is degraded.
    pub fn register(&self, bytes: &[u8], metadata: Metadata) {
        self.known.lock().unwrap().insert(bytes.to_vec(), metadata);
    }
}

#[async_trait]
impl MetadataExtractor for MockExtractor {
    async fn extract(&self, bytes: &[u8], _declared_mime: &str) -> Metadata {
        self.known
            .lock()
            .unwrap()
            .get(bytes)
            .cloned()
            .unwrap_or_default()
    }
}

/// Mocks, storage and repository for one test.
pub struct Harness {
    pub dir: TempDir,
    pub repository: InMemoryMediaRepository,
    pub storage: Arc<FileSystemStorage>,
    pub renderer: MockRenderer,
    pub video_tool: MockVideoTool,
    pub extractor: MockExtractor,
    pub diagnostics: DiagnosticLog,
}

impl Harness {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FileSystemStorage::new(dir.path()).unwrap());
        Self {
            dir,
            repository: InMemoryMediaRepository::new(),
            storage,
            renderer: MockRenderer::default(),
            video_tool: MockVideoTool::default(),
            extractor: MockExtractor::default(),
            diagnostics: DiagnosticLog::new(),
        }
    }

    /// Context with every capability enabled and default variant settings.
    pub fn context(&self) -> PipelineContext {
        self.context_with(Capabilities::default())
    }

    pub fn context_with(&self, capabilities: Capabilities) -> PipelineContext {
        PipelineContext::builder()
            .repository(Arc::new(self.repository.clone()))
            .storage(self.storage.clone())
            .renderer(Arc::new(self.renderer.clone()))
            .video_tool(Arc::new(self.video_tool.clone()))
            .extractor(Arc::new(self.extractor.clone()))
            .capabilities(capabilities)
            .settings(VariantSettings::default())
            .diagnostics(self.diagnostics.clone())
            .build()
            .unwrap()
    }

    /// Whether a storage key exists on disk.
    pub fn stored(&self, key: &str) -> bool {
        self.dir.path().join(key).is_file()
    }
}

/// Metadata of a plain image of the given size.
pub fn image_metadata(width: u32, height: u32) -> Metadata {
    Metadata {
        mime_type: Extracted::Known("image/jpeg".to_string()),
        dimensions: Extracted::Known(Dimensions::new(width, height)),
        orientation: Extracted::Known(Orientation::Normal),
        make: Extracted::Known("Apple".to_string()),
        model: Extracted::Known("iPhone 15 Pro".to_string()),
        ..Metadata::degraded()
    }
}

/// Metadata of a video of the given size.
pub fn video_metadata(width: u32, height: u32) -> Metadata {
    Metadata {
        mime_type: Extracted::Known("video/quicktime".to_string()),
        dimensions: Extracted::Known(Dimensions::new(width, height)),
        ..Metadata::degraded()
    }
}

/// `metadata` carrying a live photo content identifier.
pub fn with_content_id(metadata: Metadata, content_id: &str) -> Metadata {
    Metadata {
        live_photo_content_id: Extracted::Known(content_id.to_string()),
        ..metadata
    }
}

/// Probe result for a landscape video.
pub fn probe(width: u32, height: u32, content_id: Option<&str>) -> VideoProbe {
    VideoProbe {
        dimensions: Dimensions::new(width, height),
        orientation: Orientation::Normal,
        duration: Some(2.5),
        content_id: content_id.map(str::to_string),
    }
}

/// Store an original and insert a record for it directly, bypassing pairing.
pub async fn stored_record(
    harness: &Harness,
    media_type: MediaType,
    dimensions: Option<Dimensions>,
    age_secs: i64,
) -> MediaRecord {
    let id = RecordId::new();
    let extension = match media_type {
        MediaType::Image => "jpg",
        MediaType::Video => "mov",
    };
    let original_path = format!("original/{}.{}", id, extension);
    let file_size = harness
        .storage
        .put(&original_path, id.to_string().as_bytes())
        .await
        .unwrap();
    let record = MediaRecord {
        id,
        title: format!("IMG_{}", &id.to_string()[..4]),
        media_type,
        mime_type: match media_type {
            MediaType::Image => "image/jpeg".to_string(),
            MediaType::Video => "video/quicktime".to_string(),
        },
        dimensions,
        orientation: Orientation::Normal,
        file_size,
        original_path,
        captured_at: None,
        captured_at_timezone: None,
        camera: CameraInfo::default(),
        live_companion_id: None,
        live: LiveState::Standalone,
        created_at: Utc::now() - chrono::Duration::seconds(age_secs),
    };
    harness.repository.insert_record(&record).await.unwrap();
    record
}

/// Number of files stored under a top-level directory.
pub fn count_files(harness: &Harness, directory: &str) -> usize {
    fn walk(path: &std::path::Path) -> usize {
        match std::fs::read_dir(path) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .map(|entry| {
                    let path = entry.path();
                    if path.is_dir() { walk(&path) } else { 1 }
                })
                .sum(),
            Err(_) => 0,
        }
    }
    walk(&harness.dir.path().join(directory))
}
