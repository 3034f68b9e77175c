//! Repository error types.
//!
//! These describe violations of the persistence contract independent of the
//! backend. Driver-level failures are wrapped in `Backend`.

/// Repository error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RepositoryErrorKind {
    /// No media record with this id
    #[display("Media record {} not found", _0)]
    RecordNotFound(String),
    /// A size variant of this kind already exists for the record
    #[display("Size variant {} already exists for record {}", kind, record_id)]
    UniqueViolation {
        /// Owning record
        record_id: String,
        /// Variant kind name
        kind: String,
    },
    /// Stored data could not be mapped back to domain types
    #[display("Corrupt row: {}", _0)]
    CorruptRow(String),
    /// Backend failure (connection, query, task join)
    #[display("Repository backend error: {}", _0)]
    Backend(String),
}

/// Repository error with location tracking.
///
/// # Examples
///
/// ```
/// use darkroom_error::{RepositoryError, RepositoryErrorKind};
///
/// let err = RepositoryError::new(RepositoryErrorKind::RecordNotFound("42".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Repository Error: {} at line {} in {}", kind, line, file)]
pub struct RepositoryError {
    /// The kind of error that occurred
    pub kind: RepositoryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RepositoryError {
    /// Create a new repository error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RepositoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
