//! Per-file import results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::artifact::{ArtifactRecord, ArtifactStatus};
use crate::clip::{AnimationClipData, RuleMatch};

/// A clip artifact written for one assembled clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipArtifactRef {
    pub clip_name: String,
    pub path: PathBuf,
    /// Path relative to the source directory, as referenced by controllers.
    pub relative_path: String,
    pub status: ArtifactStatus,
}

/// Outcome of importing one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub source_asset_path: PathBuf,
    /// Source file stem; names every artifact of this import.
    pub base_name: String,
    /// Directory the artifacts were written beneath.
    pub output_dir: PathBuf,
    pub has_animations: bool,
    pub clips: Vec<AnimationClipData>,
    /// Sheet image and sprite sheet artifact.
    pub sprite_artifacts: Vec<ArtifactRecord>,
    pub clip_artifacts: Vec<ClipArtifactRef>,
    pub rule_matches: Vec<RuleMatch>,
    /// Tag names the tool declared in its metadata.
    pub declared_tags: Vec<String>,
}

impl ImportResult {
    pub fn clip(&self, name: &str) -> Option<&AnimationClipData> {
        self.clips.iter().find(|c| c.name == name)
    }

    pub fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn clip_artifact(&self, clip_name: &str) -> Option<&ClipArtifactRef> {
        self.clip_artifacts.iter().find(|c| c.clip_name == clip_name)
    }

    /// Every artifact path of this import with its write status.
    pub fn artifacts(&self) -> Vec<ArtifactRecord> {
        self.sprite_artifacts
            .iter()
            .cloned()
            .chain(self.clip_artifacts.iter().map(|c| ArtifactRecord {
                path: c.path.clone(),
                status: c.status,
            }))
            .collect()
    }

    /// Declared tags with no clip of the same name.
    ///
    /// A non-empty answer usually means the labels did not follow the naming
    /// convention.
    pub fn unmatched_tags(&self) -> Vec<&str> {
        self.declared_tags
            .iter()
            .filter(|tag| self.clip(tag).is_none())
            .map(|tag| tag.as_str())
            .collect()
    }
}
