//! Storage names for size variants.

use darkroom_core::{RecordId, SizeVariantKind};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Decides the storage key of a new size variant.
///
/// Implementations need not be deterministic. A persisted variant's key is
/// authoritative and is never recomputed.
pub trait SizeVariantNamingStrategy: Send + Sync {
    /// Storage key for a new variant of `record` with the given file extension.
    fn name(&self, record: RecordId, kind: SizeVariantKind, extension: &str) -> String;
}

/// Groups variants by a token derived from the record and appends a random suffix.
///
/// Keys look like `{kind}/{g[0..2]}/{g[2..4]}/{g[4..16]}{suffix}.{ext}`. The
/// group token is a hash of the record id, so every variant of a record shares
/// a prefix without exposing the upload's file name; the random suffix keeps
/// derived URLs unguessable.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupedRandomSuffixNamingStrategy;

impl GroupedRandomSuffixNamingStrategy {
    /// Hex token shared by every variant of `record`.
    pub fn group_token(record: RecordId) -> String {
        let mut hasher = Sha256::new();
        hasher.update(record.as_uuid().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl SizeVariantNamingStrategy for GroupedRandomSuffixNamingStrategy {
    fn name(&self, record: RecordId, kind: SizeVariantKind, extension: &str) -> String {
        let token = Self::group_token(record);
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "{}/{}/{}/{}{}.{}",
            kind.as_str(),
            &token[0..2],
            &token[2..4],
            &token[4..16],
            &suffix[0..16],
            extension.trim_start_matches('.').to_ascii_lowercase()
        )
    }
}

/// Lowercase extension of a key or file name, without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    let file_name = name.rsplit('/').next()?;
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Key of a live photo companion: the image's key with the video's extension.
///
/// The result never equals `image_key`; when the extensions coincide the
/// stem gets a `-live` suffix.
pub fn companion_key(image_key: &str, video_extension: &str) -> String {
    let extension = video_extension.trim_start_matches('.').to_ascii_lowercase();
    let (directory, file_name) = match image_key.rsplit_once('/') {
        Some((directory, file_name)) => (Some(directory), file_name),
        None => (None, image_key),
    };
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    let key = match directory {
        Some(directory) => format!("{}/{}.{}", directory, stem, extension),
        None => format!("{}.{}", stem, extension),
    };
    if !key.eq_ignore_ascii_case(image_key) {
        return key;
    }
    match directory {
        Some(directory) => format!("{}/{}-live.{}", directory, stem, extension),
        None => format!("{}-live.{}", stem, extension),
    }
}
