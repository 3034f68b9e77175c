//! Live photo pairing.
//!
//! An upload is either stored as a new standalone record or merged with a
//! stored record of the opposite media type that carries the same content
//! identifier. The merged record is always the image; the video becomes its
//! companion file and the standalone video row is deleted. Arrival order does
//! not affect the final record.

use crate::PipelineContext;
use chrono::Utc;
use darkroom_core::{
    Capability, CompanionRef, DiagnosticCategory, Extracted, LiveState, MediaRecord, MediaType,
    Metadata, RecordId, SizeVariantKind, guess_extension, guess_mime_type,
};
use darkroom_error::{DarkroomResult, PipelineError, PipelineErrorKind};
use darkroom_storage::{companion_key, extension_of};
use derive_builder::Builder;
use std::path::Path;
use tracing::{debug, info, instrument};

// The MP4 stream cut from a motion photo is served as a QuickTime movie,
// like an Apple live photo companion.
const EMBEDDED_VIDEO_MIME: &str = "video/quicktime";

/// One incoming file together with its extracted metadata.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into))]
pub struct Upload {
    /// Identity the record gets if it is stored standalone
    #[builder(default)]
    pub id: RecordId,
    /// File contents
    pub bytes: Vec<u8>,
    /// Client-side file name
    pub filename: String,
    /// MIME type declared by the client
    pub declared_mime: String,
    /// Metadata extracted from `bytes`
    #[builder(default)]
    pub metadata: Metadata,
}

/// A video carried in the trailing bytes of a motion photo still.
struct EmbeddedVideo {
    bytes: Vec<u8>,
}

/// Stores uploads and merges the halves of live photos.
#[derive(Debug, Clone)]
pub struct PairingResolver {
    context: PipelineContext,
}

impl PairingResolver {
    /// Create a resolver.
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }

    /// Store `upload` and return the record it now belongs to.
    ///
    /// For the video half of a pair whose image is already stored, that image
    /// record is returned and no video record is created.
    #[instrument(skip(self, upload), fields(record_id = %upload.id, filename = %upload.filename))]
    pub async fn resolve(&self, upload: Upload) -> DarkroomResult<MediaRecord> {
        let (media_type, mime_type) = classify(&upload)?;
        let Upload {
            id,
            bytes,
            filename,
            mut metadata,
            ..
        } = upload;
        let subject = id.to_string();
        debug!(%media_type, %mime_type, "Classified upload");

        let embedded = match media_type {
            MediaType::Video => {
                self.probe_video(&subject, &bytes, &mut metadata).await;
                None
            }
            MediaType::Image => self.split_motion_photo(&subject, &bytes, &metadata).await,
        };

        if embedded.is_none()
            && let Some(content_id) = metadata.live_photo_content_id.known()
            && let Some(partner) = self
                .pick_partner(&subject, content_id, media_type.counterpart())
                .await?
        {
            return match media_type {
                MediaType::Image => {
                    let record = self
                        .store_standalone(id, &filename, media_type, mime_type, &metadata, &bytes)
                        .await?;
                    self.absorb_video(record, partner).await
                }
                MediaType::Video => {
                    let extension = extension_for(&filename, &mime_type, media_type);
                    self.attach_companion(partner, &extension, mime_type, &bytes)
                        .await
                }
            };
        }

        let record = self
            .store_standalone(id, &filename, media_type, mime_type, &metadata, &bytes)
            .await?;
        match embedded {
            Some(video) => {
                let extension = extension_for("", EMBEDDED_VIDEO_MIME, MediaType::Video);
                self.attach_companion(
                    record,
                    &extension,
                    EMBEDDED_VIDEO_MIME.to_string(),
                    &video.bytes,
                )
                .await
            }
            None => Ok(record),
        }
    }

    /// Fill a video's dimensions and content identifier from ffprobe.
    async fn probe_video(&self, subject: &str, bytes: &[u8], metadata: &mut Metadata) {
        if metadata.live_photo_content_id.is_known() && metadata.upright_dimensions().is_some() {
            return;
        }
        if !self.context.capabilities().has(Capability::FFmpeg) {
            self.context.diagnostics().capability_disabled(
                subject,
                Capability::FFmpeg,
                "cannot probe video for dimensions or a live photo identifier",
            );
            return;
        }

        match self.context.video_tool().probe(bytes).await {
            Ok(probe) => {
                let probed = Metadata {
                    dimensions: Extracted::Known(probe.dimensions),
                    orientation: Extracted::Known(probe.orientation),
                    live_photo_content_id: probe.content_id.into(),
                    ..Metadata::degraded()
                };
                *metadata = std::mem::take(metadata).merge(probed);
            }
            Err(e) => self.context.diagnostics().probe_failed(subject, e),
        }
    }

    /// Cut the companion video off the end of a motion photo.
    async fn split_motion_photo(
        &self,
        subject: &str,
        bytes: &[u8],
        metadata: &Metadata,
    ) -> Option<EmbeddedVideo> {
        let offset = *metadata.micro_video_offset.known()?;
        let start = usize::try_from(offset)
            .ok()
            .and_then(|offset| bytes.len().checked_sub(offset))
            .filter(|start| *start > 0 && *start < bytes.len());
        let Some(start) = start else {
            self.context.diagnostics().record(
                DiagnosticCategory::PairingAnomaly,
                subject,
                format!(
                    "Motion photo video length {} does not fit in {} bytes",
                    offset,
                    bytes.len()
                ),
            );
            return None;
        };

        if !self.context.capabilities().has(Capability::FFmpeg) {
            self.context.diagnostics().capability_disabled(
                subject,
                Capability::FFmpeg,
                "cannot verify the video embedded in a motion photo",
            );
            return None;
        }

        let video = &bytes[start..];
        match self.context.video_tool().probe(video).await {
            Ok(_) => Some(EmbeddedVideo {
                bytes: video.to_vec(),
            }),
            Err(e) => {
                self.context.diagnostics().probe_failed(subject, e);
                None
            }
        }
    }

    /// The earliest-created unpaired record of `media_type` sharing `content_id`.
    async fn pick_partner(
        &self,
        subject: &str,
        content_id: &str,
        media_type: MediaType,
    ) -> DarkroomResult<Option<MediaRecord>> {
        let mut candidates = self
            .context
            .repository()
            .find_live_partners(content_id, media_type)
            .await?;
        candidates.sort_by_key(|record| (record.created_at, record.id));

        if let [winner, rest @ ..] = candidates.as_slice()
            && !rest.is_empty()
        {
            let others = rest
                .iter()
                .map(|record| record.id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            self.context.diagnostics().record(
                DiagnosticCategory::PairingAnomaly,
                subject,
                format!(
                    "{} unpaired {} records share live photo identifier {}; pairing with {}, leaving {}",
                    candidates.len(),
                    media_type,
                    content_id,
                    winner.id,
                    others
                ),
            );
        }
        Ok(candidates.into_iter().next())
    }

    async fn store_standalone(
        &self,
        id: RecordId,
        filename: &str,
        media_type: MediaType,
        mime_type: String,
        metadata: &Metadata,
        bytes: &[u8],
    ) -> DarkroomResult<MediaRecord> {
        let extension = extension_for(filename, &mime_type, media_type);
        let original_path = self
            .context
            .naming()
            .name(id, SizeVariantKind::Original, &extension);
        let file_size = self.context.storage().put(&original_path, bytes).await?;

        let record = MediaRecord {
            id,
            title: title_of(filename),
            media_type,
            mime_type,
            dimensions: metadata.upright_dimensions(),
            orientation: metadata.orientation.known().copied().unwrap_or_default(),
            file_size,
            original_path,
            captured_at: metadata.taken_at.known().copied(),
            captured_at_timezone: metadata.timezone.known().cloned(),
            camera: metadata.camera(),
            live_companion_id: metadata.live_photo_content_id.known().cloned(),
            live: LiveState::Standalone,
            created_at: Utc::now(),
        };
        self.context.repository().insert_record(&record).await?;
        info!(record_id = %record.id, %media_type, "Stored new record");
        Ok(record)
    }

    /// Turn a stored standalone video into the companion of `image`.
    async fn absorb_video(
        &self,
        mut image: MediaRecord,
        donor: MediaRecord,
    ) -> DarkroomResult<MediaRecord> {
        let extension = extension_for(&donor.original_path, &donor.mime_type, MediaType::Video);
        let companion_path = companion_key(&image.original_path, &extension);

        if let Err(e) = self
            .context
            .storage()
            .relocate(&donor.original_path, &companion_path)
            .await
        {
            self.context.diagnostics().record(
                DiagnosticCategory::StorageFailed,
                image.id.to_string(),
                format!(
                    "Could not move {} next to {}: {}; both stay unpaired",
                    donor.original_path, image.original_path, e
                ),
            );
            return Ok(image);
        }

        image.live = LiveState::PairedAsImage {
            companion: CompanionRef {
                storage_path: companion_path,
                mime_type: donor.mime_type.clone(),
                file_size: donor.file_size,
            },
        };
        self.context.repository().update_record(&image).await?;
        self.retire(&donor).await?;
        info!(record_id = %image.id, donor = %donor.id, "Paired image with stored video");
        Ok(image)
    }

    /// Store `bytes` as the companion video of `image`.
    async fn attach_companion(
        &self,
        mut image: MediaRecord,
        extension: &str,
        mime_type: String,
        bytes: &[u8],
    ) -> DarkroomResult<MediaRecord> {
        let companion_path = companion_key(&image.original_path, extension);
        let file_size = self.context.storage().put(&companion_path, bytes).await?;

        image.live = LiveState::PairedAsImage {
            companion: CompanionRef {
                storage_path: companion_path,
                mime_type,
                file_size,
            },
        };
        self.context.repository().update_record(&image).await?;
        info!(record_id = %image.id, "Attached companion video");
        Ok(image)
    }

    /// Delete a merged-away record and its derived files.
    async fn retire(&self, donor: &MediaRecord) -> DarkroomResult<()> {
        let variants = self.context.repository().list_variants(donor.id).await?;
        for variant in variants
            .iter()
            .filter(|variant| variant.kind != SizeVariantKind::Original)
        {
            if let Err(e) = self.context.storage().delete(&variant.storage_path).await {
                self.context.diagnostics().record(
                    DiagnosticCategory::StorageFailed,
                    donor.id.to_string(),
                    format!("Could not remove {}: {}", variant.storage_path, e),
                );
            }
        }
        self.context.repository().delete_record(donor.id).await
    }
}

/// Media type and effective MIME type of an upload.
///
/// Unknown or generic declared types fall back to the sniffed type and then
/// to the file extension.
fn classify(upload: &Upload) -> DarkroomResult<(MediaType, String)> {
    let declared = upload.declared_mime.trim().to_ascii_lowercase();
    if let Some(media_type) = MediaType::from_mime(&declared) {
        return Ok((media_type, declared));
    }

    if let Some(sniffed) = upload.metadata.mime_type.known()
        && let Some(media_type) = MediaType::from_mime(sniffed)
    {
        return Ok((media_type, sniffed.to_ascii_lowercase()));
    }

    if let Some(extension) = extension_of(&upload.filename)
        && let Some(media_type) = MediaType::from_extension(&extension)
    {
        let mime_type = guess_mime_type(&extension)
            .map(str::to_string)
            .unwrap_or(declared);
        return Ok((media_type, mime_type));
    }

    Err(PipelineError::new(PipelineErrorKind::UnsupportedMediaType(
        upload.declared_mime.clone(),
    ))
    .into())
}

fn title_of(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| filename.to_string())
}

/// The extension usual for `mime_type`, else that of `name` when it names
/// the same media type.
///
/// A client file name never turns a still into a `.mov`, which would collide
/// with its companion's key.
fn extension_for(name: &str, mime_type: &str, media_type: MediaType) -> String {
    guess_extension(mime_type)
        .map(str::to_string)
        .or_else(|| {
            extension_of(name)
                .filter(|ext| MediaType::from_extension(ext) == Some(media_type))
        })
        .unwrap_or_else(|| match media_type {
            MediaType::Image => "jpg".to_string(),
            MediaType::Video => "mp4".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(filename: &str, declared_mime: &str) -> Upload {
        UploadBuilder::default()
            .bytes(vec![0u8; 4])
            .filename(filename)
            .declared_mime(declared_mime)
            .build()
            .unwrap()
    }

    #[test]
    fn test_octet_stream_is_reclassified_by_extension() {
        let (media_type, mime) =
            classify(&upload("IMG_0001.MOV", "application/octet-stream")).unwrap();
        assert_eq!(media_type, MediaType::Video);
        assert_eq!(mime, "video/quicktime");
    }

    #[test]
    fn test_declared_type_wins() {
        let (media_type, mime) = classify(&upload("clip.mov", "Image/JPEG")).unwrap();
        assert_eq!(media_type, MediaType::Image);
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn test_unclassifiable_upload_is_rejected() {
        assert!(classify(&upload("notes.txt", "text/plain")).is_err());
    }

    #[test]
    fn test_extension_follows_classified_type() {
        assert_eq!(
            extension_for("IMG_0001.mov", "image/jpeg", MediaType::Image),
            "jpg"
        );
        assert_eq!(
            extension_for("IMG_0001.mov", "image/x-unknown", MediaType::Image),
            "jpg"
        );
        assert_eq!(
            extension_for("scan.TIFF", "image/x-unknown", MediaType::Image),
            "tiff"
        );
        assert_eq!(extension_for("", "video/mp4", MediaType::Video), "mp4");
    }

    #[test]
    fn test_title_is_file_stem() {
        assert_eq!(title_of("IMG_0001.HEIC"), "IMG_0001");
        assert_eq!(title_of("noext"), "noext");
    }
}
