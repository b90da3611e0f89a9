//! spriteport import pipeline
//!
//! Drives one import per source file: the exporter writes a sheet and its
//! metadata into a staging directory, the metadata is parsed, frames are
//! assembled into clips, and sprite, clip and controller artifacts are
//! synthesized beneath the source directory.
//!
//! # Example
//!
//! ```ignore
//! use spriteport_import::{import_batch, orchestrator_for, ControllerTarget, Importer, NoopObserver};
//! use spriteport_spec::ImporterConfiguration;
//!
//! let config = ImporterConfiguration::default();
//! let exporter = orchestrator_for(&config);
//! let importer = Importer::new(&config, &exporter);
//!
//! let report = import_batch(
//!     &importer,
//!     &["art/hero.aseprite".into()],
//!     &ControllerTarget::Base,
//!     &mut NoopObserver,
//! );
//! assert!(report.is_success());
//! ```

pub mod assembler;
pub mod batch;
pub mod controller;
pub mod pipeline;
pub mod synthesizer;

pub use assembler::{assemble, split_tag, Assembly};
pub use batch::{import_batch, BatchReport, FileOutcome, ImportedFile};
pub use controller::{
    build_controller, build_override_controller, load_base_controller, BaseController,
};
pub use pipeline::{
    can_import, is_valid_source, orchestrator_for, ControllerTarget, ImportObserver, ImportStage,
    Importer, NoopObserver,
};
pub use synthesizer::{samples_for, OutputLayout};
