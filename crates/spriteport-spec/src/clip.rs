//! Assembled animation clips.

use serde::{Deserialize, Serialize};

use crate::frame::SourceFrame;

/// A named, ordered run of frames produced by the clip assembler.
///
/// `frames` is never empty and is sorted by `sequence_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationClipData {
    pub name: String,
    pub frames: Vec<SourceFrame>,
    pub loops: bool,
}

impl AnimationClipData {
    /// Sum of frame durations in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_ms as u64).sum()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Which clips a non-looping rule matched during one assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub rule: String,
    /// True when the rule did not compile as a regex and matched literally.
    pub literal: bool,
    pub clips: Vec<String>,
}
