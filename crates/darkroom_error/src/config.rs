//! Configuration error types.

/// Ways a configuration can be unusable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Thumbnails are square crops
    #[display("variants.thumb must be a non-empty square, got {}x{}", width, height)]
    NonSquareThumb {
        /// Configured width
        width: u32,
        /// Configured height
        height: u32,
    },
    /// JPEG quality outside 1..=100
    #[display("variants.jpeg_quality must be within 1..=100, got {}", _0)]
    QualityOutOfRange(u8),
    /// A scaled box with both bounds zero
    #[display("variants.{} needs at least one non-zero bound", _0)]
    EmptyBox(String),
    /// A source could not be read or merged
    #[display("Failed to load configuration from {}: {}", layer, reason)]
    Load {
        /// File or layer that failed
        layer: String,
        /// Underlying error text
        reason: String,
    },
    /// The merged layers do not deserialize
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use darkroom_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::QualityOutOfRange(0));
/// assert!(format!("{}", err).contains("jpeg_quality"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// What is wrong with the configuration
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error at the caller's location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
