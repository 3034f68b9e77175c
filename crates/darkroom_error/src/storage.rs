//! Storage error types.

/// Failures of the key/value file store.
///
/// Keys are the relative storage paths recorded on media records and size
/// variants; they are reported as given, not as resolved filesystem paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StorageErrorKind {
    /// The store root or a key's parent directory could not be created
    #[display("Cannot create directory {}: {}", path, reason)]
    CreateDirectory {
        /// Directory on disk
        path: String,
        /// Underlying I/O error
        reason: String,
    },
    /// Writing a key failed
    #[display("Cannot write {}: {}", key, reason)]
    Write {
        /// Storage key
        key: String,
        /// Underlying I/O error
        reason: String,
    },
    /// Reading a key failed for a reason other than absence
    #[display("Cannot read {}: {}", key, reason)]
    Read {
        /// Storage key or local file
        key: String,
        /// Underlying I/O error
        reason: String,
    },
    /// Removing a key failed for a reason other than absence
    #[display("Cannot delete {}: {}", key, reason)]
    Delete {
        /// Storage key
        key: String,
        /// Underlying I/O error
        reason: String,
    },
    /// Moving a file between keys failed
    #[display("Cannot move {} to {}: {}", from, to, reason)]
    Move {
        /// Source key
        from: String,
        /// Destination key
        to: String,
        /// Underlying I/O error
        reason: String,
    },
    /// Nothing is stored under the key
    #[display("Nothing stored at {}", _0)]
    Missing(String),
    /// The key is empty, absolute or leaves the store root
    #[display("Invalid storage key '{}'", _0)]
    InvalidKey(String),
    /// A move would replace an existing file
    #[display("Storage key {} is already taken", _0)]
    Occupied(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use darkroom_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::Missing("original/ab/cd/ef.jpg".to_string()));
/// assert!(err.is_missing());
/// assert!(format!("{}", err).contains("Nothing stored"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }

    /// Whether the key simply does not exist.
    pub fn is_missing(&self) -> bool {
        matches!(self.kind, StorageErrorKind::Missing(_))
    }
}
