//! Video tool (ffprobe / ffmpeg) error types.

/// Specific video tool failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum VideoToolErrorKind {
    /// The tool process could not be started
    #[display("Failed to spawn {}: {}", tool, message)]
    Spawn {
        /// Executable name
        tool: String,
        /// OS error text
        message: String,
    },
    /// The tool exited unsuccessfully
    #[display("{} exited with {}: {}", tool, status, stderr)]
    Exit {
        /// Executable name
        tool: String,
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },
    /// The tool output could not be understood
    #[display("Unparseable output from {}: {}", tool, message)]
    Parse {
        /// Executable name
        tool: String,
        /// Parser error text
        message: String,
    },
    /// The container holds no video stream
    #[display("No video stream found")]
    NoVideoStream,
}

/// Video tool error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Video Tool Error: {} at line {} in {}", kind, line, file)]
pub struct VideoToolError {
    /// The kind of error that occurred
    pub kind: VideoToolErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl VideoToolError {
    /// Create a new video tool error with caller location tracking.
    #[track_caller]
    pub fn new(kind: VideoToolErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VideoToolErrorKind {
        &self.kind
    }
}
