//! The seam between the import pipeline and the external tool.

use std::path::{Path, PathBuf};

use crate::error::PipelineResult;

/// Where the tool should write its outputs for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub input: PathBuf,
    /// Packed sheet image to produce.
    pub sheet_path: PathBuf,
    /// Metadata document to produce.
    pub data_path: PathBuf,
}

impl ExportRequest {
    /// Output paths inside `staging_dir`, named after the input's stem.
    pub fn in_staging_dir(input: &Path, staging_dir: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "sheet".to_string());
        Self {
            input: input.to_path_buf(),
            sheet_path: staging_dir.join(format!("{stem}.png")),
            data_path: staging_dir.join(format!("{stem}.json")),
        }
    }
}

/// Something that turns a source file into a sheet image plus metadata.
///
/// Implementations block until the export finished and report any failure as
/// [`crate::ImportError::ExternalToolFailure`]. The caller checks that both
/// outputs exist afterwards.
pub trait SheetExporter {
    fn export(&self, request: &ExportRequest) -> PipelineResult<()>;

    /// Short description for diagnostics (e.g. the resolved executable).
    fn describe(&self) -> String;
}
