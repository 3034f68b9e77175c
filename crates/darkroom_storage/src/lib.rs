//! File storage and variant naming for Darkroom.
//!
//! Originals, companions and derived variants are addressed by a relative
//! storage key (`thumb/3f/a1/...jpg`). The [`MediaStorage`] trait maps keys to
//! bytes; [`SizeVariantNamingStrategy`] decides what the keys look like.
//!
//! # Example
//!
//! ```rust
//! use darkroom_core::{RecordId, SizeVariantKind};
//! use darkroom_storage::{
//!     FileSystemStorage, GroupedRandomSuffixNamingStrategy, MediaStorage,
//!     SizeVariantNamingStrategy,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/darkroom")?;
//! let naming = GroupedRandomSuffixNamingStrategy;
//!
//! let key = naming.name(RecordId::new(), SizeVariantKind::Original, "jpg");
//! let size = storage.put(&key, b"jpeg bytes").await?;
//! assert_eq!(size, 10);
//! assert_eq!(storage.get(&key).await?, b"jpeg bytes");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod naming;
mod storage;

pub use darkroom_error::{StorageError, StorageErrorKind};
pub use filesystem::FileSystemStorage;
pub use naming::{
    GroupedRandomSuffixNamingStrategy, SizeVariantNamingStrategy, companion_key, extension_of,
};
pub use storage::MediaStorage;
