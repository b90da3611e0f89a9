//! spriteport data model
//!
//! This crate holds the types shared by every stage of the sprite-sheet import
//! pipeline: parsed frames, assembled clips, the importer configuration and
//! its non-looping rules, the on-disk artifact schemas, per-file results and
//! the error taxonomy.
//!
//! # Example
//!
//! ```
//! use spriteport_spec::{ImporterConfiguration, SpriteAlignment};
//!
//! let mut config = ImporterConfiguration::default();
//! config.sprite_alignment = SpriteAlignment::BottomCenter;
//! assert!(config.non_looping_rules.add("^die"));
//!
//! let rules = config.non_looping_rules.compile();
//! assert!(!rules.loops("die_front"));
//! assert!(rules.loops("idle"));
//! assert_eq!(config.pivot(), [0.5, 0.0]);
//! ```
//!
//! # Modules
//!
//! - [`frame`]: Parsed frames and sheet metadata
//! - [`clip`]: Assembled clips and rule match reports
//! - [`rules`]: Non-looping rule storage and evaluation
//! - [`config`]: Importer configuration and session dirty tracking
//! - [`artifact`]: Sprite sheet, clip and controller artifact schemas
//! - [`result`]: Per-file import results
//! - [`exporter`]: Seam trait for the external tool
//! - [`error`]: Error taxonomy
//! - [`hash`]: Identity and content hashing

pub mod artifact;
pub mod clip;
pub mod config;
pub mod error;
pub mod exporter;
pub mod frame;
pub mod hash;
pub mod result;
pub mod rules;

// Re-export commonly used types at the crate root
pub use artifact::{
    ArtifactRecord, ArtifactStatus, ClipArtifact, ControllerArtifact, ControllerState,
    OverrideControllerArtifact, OverrideEntry, PropertyBinding, SpriteEntry, SpriteKeyframe,
    SpriteSheetArtifact, ARTIFACT_VERSION, CLIP_SUFFIX, CONTROLLER_SUFFIX,
    OVERRIDE_CONTROLLER_SUFFIX, SPRITE_SHEET_SUFFIX,
};
pub use clip::{AnimationClipData, RuleMatch};
pub use config::{
    ConfigError, ConfigSession, CustomPivot, ImporterConfiguration, SpriteAlignment,
    TargetObjectKind, ToolSettings, CONFIG_KEYS,
};
pub use error::{BackendError, ImportError, ImportErrorKind, PipelineResult};
pub use exporter::{ExportRequest, SheetExporter};
pub use frame::{FrameTag, ParsedSheet, PixelRect, SheetMetadata, SourceFrame, TagDirection};
pub use result::{ClipArtifactRef, ImportResult};
pub use rules::{CompiledRule, CompiledRules, NonLoopingRule, NonLoopingRules, RuleMatcher};
