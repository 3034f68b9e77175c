//! Pipeline contract error types.

/// Pipeline error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// An operation was called before `init`
    #[display("Factory used before init")]
    NotInitialized,
    /// The variant kind is not valid for this operation
    #[display("Size variant {} is not valid here: {}", kind, reason)]
    InvalidVariantKind {
        /// Variant kind name
        kind: String,
        /// Why it was rejected
        reason: String,
    },
    /// Unknown variant kind name
    #[display("Type {} is not one of {}", name, valid)]
    UnknownVariantKind {
        /// Name as given
        name: String,
        /// Accepted names, comma separated
        valid: String,
    },
    /// The upload could not be classified as image or video
    #[display("Unsupported media type '{}'", _0)]
    UnsupportedMediaType(String),
    /// A pipeline component was built with a required part missing
    #[display("Incomplete pipeline: {}", _0)]
    Builder(String),
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
