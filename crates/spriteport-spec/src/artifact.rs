//! On-disk artifact schemas.
//!
//! Every artifact is a pretty-printed JSON document written beneath the
//! source file's directory. Paths stored inside artifacts are relative to
//! that directory and always use `/` separators.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::frame::PixelRect;

/// Schema version written into every artifact.
pub const ARTIFACT_VERSION: u32 = 1;

/// File suffix of sprite sheet artifacts.
pub const SPRITE_SHEET_SUFFIX: &str = ".sprites.json";
/// File suffix of clip artifacts.
pub const CLIP_SUFFIX: &str = ".anim.json";
/// File suffix of base controller artifacts.
pub const CONTROLLER_SUFFIX: &str = ".controller.json";
/// File suffix of override controller artifacts.
pub const OVERRIDE_CONTROLLER_SUFFIX: &str = ".overrideController.json";

/// Sliced sprites of one sheet image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheetArtifact {
    pub version: u32,
    /// Sheet image, relative to the source directory.
    pub texture: String,
    /// BLAKE3 hash of the sheet image bytes.
    pub texture_hash: String,
    pub width: u32,
    pub height: u32,
    pub pixels_per_unit: f32,
    pub sprites: Vec<SpriteEntry>,
}

impl SpriteSheetArtifact {
    pub fn sprite(&self, name: &str) -> Option<&SpriteEntry> {
        self.sprites.iter().find(|s| s.name == name)
    }
}

/// One sliced sprite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteEntry {
    /// Stable identity; preserved across re-imports of the same name.
    pub id: String,
    pub name: String,
    /// Region in the sheet (top-left origin).
    pub rect: PixelRect,
    /// Normalized pivot (x right, y up from the bottom-left corner).
    pub pivot: [f32; 2],
}

/// The animated property a clip drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBinding {
    pub component: String,
    pub property: String,
}

/// A sprite swap at a sample offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteKeyframe {
    pub sample: u32,
    pub sprite_id: String,
    pub sprite: String,
}

/// One animation clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipArtifact {
    pub version: u32,
    pub name: String,
    /// Samples per second.
    pub frame_rate: f32,
    pub loops: bool,
    /// Clip length in samples.
    pub length_samples: u32,
    /// Sprite sheet artifact the keyframes refer to.
    pub sprite_sheet: String,
    pub binding: PropertyBinding,
    /// Sprite swaps; the last keyframe repeats the final sprite at
    /// `length_samples`.
    pub keyframes: Vec<SpriteKeyframe>,
}

/// A state in a base controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub name: String,
    /// Clip artifact bound to the state.
    pub clip: String,
}

/// A state graph binding clip names to playable states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerArtifact {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_state: Option<String>,
    pub states: Vec<ControllerState>,
}

impl ControllerArtifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            name: name.into(),
            default_state: None,
            states: Vec::new(),
        }
    }

    pub fn state(&self, name: &str) -> Option<&ControllerState> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.state(name).is_some()
    }

    pub fn state_names(&self) -> Vec<&str> {
        self.states.iter().map(|s| s.name.as_str()).collect()
    }
}

/// A single overridden slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    /// Name of the base controller state being re-skinned.
    pub slot: String,
    pub clip: String,
}

/// Re-skins a base controller's clips without altering its state graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideControllerArtifact {
    pub version: u32,
    pub name: String,
    /// Base controller artifact this override refers to.
    pub base_controller: String,
    pub overrides: Vec<OverrideEntry>,
}

impl OverrideControllerArtifact {
    pub fn new(name: impl Into<String>, base_controller: impl Into<String>) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            name: name.into(),
            base_controller: base_controller.into(),
            overrides: Vec::new(),
        }
    }

    pub fn override_for(&self, slot: &str) -> Option<&OverrideEntry> {
        self.overrides.iter().find(|o| o.slot == slot)
    }
}

/// What a write did to the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Created,
    Updated,
    Unchanged,
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactStatus::Created => write!(f, "created"),
            ArtifactStatus::Updated => write!(f, "updated"),
            ArtifactStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// A written (or confirmed unchanged) artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub path: PathBuf,
    pub status: ArtifactStatus,
}
