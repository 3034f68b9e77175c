//! Rendering error types.

/// Specific rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RenderErrorKind {
    /// The source could not be decoded
    #[display("Failed to decode source: {}", _0)]
    Decode(String),
    /// The derived image could not be encoded
    #[display("Failed to encode variant: {}", _0)]
    Encode(String),
    /// The requested target box is unusable
    #[display("Invalid target {}x{}", width, height)]
    InvalidTarget {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
    /// The blocking render task died
    #[display("Render task failed: {}", _0)]
    Task(String),
}

/// Rendering error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The kind of error that occurred
    pub kind: RenderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RenderError {
    /// Create a new render error with caller location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RenderErrorKind {
        &self.kind
    }
}
