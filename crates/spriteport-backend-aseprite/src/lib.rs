//! spriteport Aseprite Backend
//!
//! This crate drives Aseprite as an out-of-process sheet exporter and decodes
//! the metadata it writes.
//!
//! # Architecture
//!
//! 1. **Orchestrator** - resolves the executable, expands the argument
//!    template for one source file and waits for the process with a timeout.
//! 2. **Metadata parser** - decodes the JSON document (array or mapping
//!    layout) into [`spriteport_spec::ParsedSheet`].
//!
//! The orchestrator implements [`spriteport_spec::SheetExporter`], which is
//! what the import pipeline depends on.
//!
//! # Example
//!
//! ```ignore
//! use spriteport_backend_aseprite::{parse_metadata, Orchestrator, OrchestratorConfig};
//! use spriteport_spec::ExportRequest;
//! use std::path::Path;
//!
//! let orchestrator = Orchestrator::with_config(
//!     OrchestratorConfig::default().tool_path("/usr/bin/aseprite"),
//! );
//! let request = ExportRequest::in_staging_dir(Path::new("hero.aseprite"), Path::new("/tmp/stage"));
//! orchestrator.run(&request)?;
//!
//! let sheet = parse_metadata(&std::fs::read_to_string(&request.data_path)?)?;
//! println!("{} frames", sheet.frames.len());
//! ```
//!
//! # Aseprite Requirements
//!
//! The orchestrator searches for Aseprite in:
//!
//! 1. The configured `tool.path`
//! 2. `ASEPRITE_PATH` environment variable
//! 3. System PATH
//! 4. Common installation locations (platform-specific)

pub mod error;
pub mod metadata;
pub mod orchestrator;

// Re-export main types at crate root
pub use error::{MetadataError, MetadataResult, ToolError, ToolResult};
pub use metadata::{parse_metadata, parse_metadata_value, FrameLayout};
pub use orchestrator::{expand_args, Orchestrator, OrchestratorConfig, ToolRun, TOOL_PATH_ENV};

/// File extensions the tool can import.
pub const SOURCE_EXTENSIONS: &[&str] = &["ase", "aseprite"];

/// Returns true if `path` names a file the tool can import.
pub fn is_valid_source(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
