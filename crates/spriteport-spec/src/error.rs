//! Error taxonomy for the import pipeline.
//!
//! Every variant is file-scoped: it carries the path of the source asset (or
//! artifact) that failed and never aborts a multi-file batch on its own.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, ImportError>;

/// The kind of an [`ImportError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportErrorKind {
    /// E001: The external tool exited non-zero, timed out, or produced no output.
    ExternalToolFailure,
    /// E002: The tool's metadata could not be decoded structurally.
    MalformedMetadata,
    /// E003: Assembly produced no clips.
    EmptyClipSet,
    /// E004: Override controller requested without a usable base controller.
    NoBaseController,
    /// E005: An artifact could not be read back or written.
    ArtifactWriteFailure,
}

impl ImportErrorKind {
    /// Returns the stable error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ImportErrorKind::ExternalToolFailure => "E001",
            ImportErrorKind::MalformedMetadata => "E002",
            ImportErrorKind::EmptyClipSet => "E003",
            ImportErrorKind::NoBaseController => "E004",
            ImportErrorKind::ArtifactWriteFailure => "E005",
        }
    }

    /// Returns the kind name used in user-facing output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportErrorKind::ExternalToolFailure => "ExternalToolFailure",
            ImportErrorKind::MalformedMetadata => "MalformedMetadata",
            ImportErrorKind::EmptyClipSet => "EmptyClipSet",
            ImportErrorKind::NoBaseController => "NoBaseController",
            ImportErrorKind::ArtifactWriteFailure => "ArtifactWriteFailure",
        }
    }

    /// Whether a user can reasonably retry after fixing their setup.
    ///
    /// Nothing in the pipeline retries automatically.
    pub fn is_user_retryable(&self) -> bool {
        matches!(self, ImportErrorKind::ExternalToolFailure)
    }
}

impl std::fmt::Display for ImportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors produced by a single-file import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The external tool could not be run to completion.
    #[error("external tool failed for {path}: {reason}")]
    ExternalToolFailure {
        path: PathBuf,
        reason: String,
        /// Captured stderr, when the process got far enough to produce any.
        stderr: Option<String>,
    },

    /// The tool's metadata document could not be decoded.
    #[error("malformed metadata for {path}: {message}")]
    MalformedMetadata { path: PathBuf, message: String },

    /// No frame label could be segmented into a clip.
    #[error("no animation clips could be assembled from {path} (frame labels do not follow the naming convention)")]
    EmptyClipSet { path: PathBuf },

    /// An override controller was requested without a base.
    #[error("no base controller for override of {path}: {detail}")]
    NoBaseController { path: PathBuf, detail: String },

    /// An artifact could not be written (or an existing one read back).
    #[error("failed to write artifact {path}: {source}")]
    ArtifactWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImportError {
    /// Creates an external tool failure.
    pub fn external_tool(
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
        stderr: Option<String>,
    ) -> Self {
        Self::ExternalToolFailure {
            path: path.into(),
            reason: reason.into(),
            stderr: stderr.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Creates a malformed metadata error.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a missing base controller error.
    pub fn no_base_controller(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::NoBaseController {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Creates an artifact write failure.
    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ArtifactWriteFailure {
            path: path.into(),
            source,
        }
    }

    /// Creates an artifact write failure for an existing artifact that no
    /// longer decodes.
    pub fn corrupt_artifact(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ArtifactWriteFailure {
            path: path.into(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, source),
        }
    }

    /// Creates an artifact write failure for two clips whose names map to
    /// the same artifact file.
    pub fn clip_file_collision(path: impl Into<PathBuf>, first: &str, second: &str) -> Self {
        Self::ArtifactWriteFailure {
            path: path.into(),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("clips '{first}' and '{second}' map to the same artifact file"),
            ),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ImportError::ExternalToolFailure { .. } => ImportErrorKind::ExternalToolFailure,
            ImportError::MalformedMetadata { .. } => ImportErrorKind::MalformedMetadata,
            ImportError::EmptyClipSet { .. } => ImportErrorKind::EmptyClipSet,
            ImportError::NoBaseController { .. } => ImportErrorKind::NoBaseController,
            ImportError::ArtifactWriteFailure { .. } => ImportErrorKind::ArtifactWriteFailure,
        }
    }

    /// Returns the offending path.
    pub fn path(&self) -> &Path {
        match self {
            ImportError::ExternalToolFailure { path, .. }
            | ImportError::MalformedMetadata { path, .. }
            | ImportError::EmptyClipSet { path }
            | ImportError::NoBaseController { path, .. }
            | ImportError::ArtifactWriteFailure { path, .. } => path,
        }
    }

    /// Captured tool stderr, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ImportError::ExternalToolFailure { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}

impl BackendError for ImportError {
    fn code(&self) -> &'static str {
        self.kind().code()
    }

    fn category(&self) -> &'static str {
        "import"
    }
}

/// Common trait for coded errors.
///
/// Gives every error type in the workspace a stable code and a category so the
/// CLI can report failures uniformly.
pub trait BackendError: std::error::Error {
    /// Stable error code (e.g., "E002", "TOOL_004").
    fn code(&self) -> &'static str;

    /// Human-readable message; defaults to `Display`.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Error category for grouping ("import", "tool", "config").
    fn category(&self) -> &'static str;
}
