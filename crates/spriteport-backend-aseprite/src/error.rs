//! Error types for the Aseprite backend.

use spriteport_spec::BackendError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for tool invocations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Result type for metadata parsing.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors that can occur while running the external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool executable not found.
    #[error("Aseprite executable not found. Set tool_path in the importer configuration or the ASEPRITE_PATH environment variable")]
    ToolNotFound,

    /// Configured tool path does not exist.
    #[error("Configured Aseprite path does not exist: {path}")]
    ConfiguredPathMissing { path: PathBuf },

    /// Failed to spawn the tool process.
    #[error("Failed to spawn Aseprite process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// Tool process timed out.
    #[error("Aseprite process timed out after {timeout_secs} seconds")]
    Timeout {
        timeout_secs: u64,
        /// Output captured before the process was killed.
        stdout: String,
        stderr: String,
    },

    /// Tool process exited with non-zero status.
    #[error("Aseprite process exited with status {exit_code}")]
    ProcessFailed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// Expected output file not found after the run.
    #[error("Expected output file not found: {path}")]
    OutputNotFound { path: PathBuf },

    /// Argument template is missing a required placeholder.
    #[error("Tool argument template is missing the {placeholder} placeholder")]
    MissingPlaceholder { placeholder: &'static str },

    /// IO error while preparing the run.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Creates a new process failed error.
    pub fn process_failed(
        exit_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ProcessFailed {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Captured diagnostic output, stderr first.
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            ToolError::ProcessFailed { stdout, stderr, .. }
            | ToolError::Timeout { stdout, stderr, .. } => {
                let mut out = String::new();
                for part in [stderr.trim(), stdout.trim()] {
                    if !part.is_empty() {
                        if !out.is_empty() {
                            out.push('\n');
                        }
                        out.push_str(part);
                    }
                }
                Some(out).filter(|s| !s.is_empty())
            }
            _ => None,
        }
    }
}

impl BackendError for ToolError {
    fn code(&self) -> &'static str {
        match self {
            ToolError::ToolNotFound => "TOOL_001",
            ToolError::ConfiguredPathMissing { .. } => "TOOL_002",
            ToolError::SpawnFailed(_) => "TOOL_003",
            ToolError::Timeout { .. } => "TOOL_004",
            ToolError::ProcessFailed { .. } => "TOOL_005",
            ToolError::OutputNotFound { .. } => "TOOL_006",
            ToolError::MissingPlaceholder { .. } => "TOOL_007",
            ToolError::Io(_) => "TOOL_008",
        }
    }

    fn category(&self) -> &'static str {
        "tool"
    }
}

/// Structural decode failures of the tool's metadata document.
///
/// `at` is a JSON-path-like location such as `frames[3]` or
/// `frames["hero_walk_0"].frame`.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("metadata root is not a JSON object")]
    NotAnObject,

    #[error("metadata has no 'frames' field")]
    MissingFrames,

    #[error("'frames' must be an array or an object, found {found}")]
    InvalidFramesLayout { found: &'static str },

    #[error("metadata contains no frames")]
    EmptyFrameList,

    #[error("{at}: {message}")]
    InvalidEntry { at: String, message: String },

    #[error("{at}: frame has no rectangle")]
    MissingRect { at: String },

    #[error("{at}: frame has no duration")]
    MissingDuration { at: String },

    #[error("{at}: frame has no label")]
    MissingLabel { at: String },

    #[error("{at}: label '{label}' has no numeric frame index")]
    NonNumericIndex { at: String, label: String },

    #[error("{at}: duplicate frame label '{label}'")]
    DuplicateLabel { at: String, label: String },

    #[error("{at}: frame rectangle is empty")]
    EmptyRect { at: String },

    #[error("{at}: frame rectangle lies outside the {width}x{height} sheet")]
    RectOutOfBounds { at: String, width: u32, height: u32 },

    #[error("{at}: {message}")]
    InvalidMeta { at: String, message: String },
}

impl BackendError for MetadataError {
    fn code(&self) -> &'static str {
        match self {
            MetadataError::InvalidJson(_) => "META_001",
            MetadataError::NotAnObject => "META_002",
            MetadataError::MissingFrames => "META_003",
            MetadataError::InvalidFramesLayout { .. } => "META_004",
            MetadataError::EmptyFrameList => "META_005",
            MetadataError::InvalidEntry { .. } => "META_006",
            MetadataError::MissingRect { .. } => "META_007",
            MetadataError::MissingDuration { .. } => "META_008",
            MetadataError::MissingLabel { .. } => "META_009",
            MetadataError::NonNumericIndex { .. } => "META_010",
            MetadataError::EmptyRect { .. } => "META_011",
            MetadataError::RectOutOfBounds { .. } => "META_012",
            MetadataError::InvalidMeta { .. } => "META_013",
            MetadataError::DuplicateLabel { .. } => "META_014",
        }
    }

    fn category(&self) -> &'static str {
        "metadata"
    }
}
