//! Top-level error wrapper types.

#[cfg(feature = "database")]
use crate::DatabaseError;
use crate::{
    ConfigError, PipelineError, RenderError, RepositoryError, StorageError, VideoToolError,
};

/// Every error domain of the workspace, discriminated by origin.
///
/// # Examples
///
/// ```
/// use darkroom_error::{DarkroomError, ConfigError, ConfigErrorKind};
///
/// let config_err = ConfigError::new(ConfigErrorKind::QualityOutOfRange(0));
/// let err: DarkroomError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum DarkroomErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Rendering error
    #[from(RenderError)]
    Render(RenderError),
    /// Video probing or frame extraction error
    #[from(VideoToolError)]
    VideoTool(VideoToolError),
    /// Repository (persistence contract) error
    #[from(RepositoryError)]
    Repository(RepositoryError),
    /// Database driver error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Pipeline contract error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Darkroom error with kind discrimination.
///
/// # Examples
///
/// ```
/// use darkroom_error::{DarkroomResult, ConfigError, ConfigErrorKind};
///
/// fn might_fail() -> DarkroomResult<()> {
///     Err(ConfigError::new(ConfigErrorKind::Parse("missing field `root`".to_string())))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Darkroom Error: {}", _0)]
pub struct DarkroomError(Box<DarkroomErrorKind>);

impl DarkroomError {
    /// Create a new error from a kind.
    pub fn new(kind: DarkroomErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DarkroomErrorKind {
        &self.0
    }

    /// Whether this error reports a duplicate (record, kind) size variant.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.kind(),
            DarkroomErrorKind::Repository(e) if matches!(e.kind, crate::RepositoryErrorKind::UniqueViolation { .. })
        )
    }
}

// Generic From implementation for any type that converts to DarkroomErrorKind
impl<T> From<T> for DarkroomError
where
    T: Into<DarkroomErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Darkroom operations.
pub type DarkroomResult<T> = std::result::Result<T, DarkroomError>;
