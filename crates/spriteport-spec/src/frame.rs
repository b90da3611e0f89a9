//! Parsed frame data.
//!
//! These types are produced by the metadata parser and consumed by the clip
//! assembler. They are immutable once parsed.

use serde::{Deserialize, Serialize};

/// A rectangle in sheet pixel space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    /// Creates a new rectangle.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.w as u64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.h as u64
    }

    /// Returns true if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// A single frame as exported by the external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFrame {
    /// Region of the packed sheet holding this frame.
    pub region: PixelRect,
    /// Display duration in milliseconds.
    pub duration_ms: u32,
    /// Raw label from the tool (e.g. `hero_walk_3`).
    pub source_name: String,
    /// Position of the frame in the metadata document.
    pub sequence_index: usize,
    /// Numeric index extracted from the end of the label.
    pub frame_number: u32,
}

/// Playback direction of a declared frame tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TagDirection {
    #[default]
    Forward,
    Reverse,
    #[serde(alias = "pingpong")]
    PingPong,
}

/// A frame tag declared in the metadata (`meta.frameTags`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTag {
    pub name: String,
    pub from: usize,
    pub to: usize,
    #[serde(default)]
    pub direction: TagDirection,
}

/// Sheet-level metadata that accompanies the frame list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMetadata {
    /// Sheet width in pixels.
    pub width: u32,
    /// Sheet height in pixels.
    pub height: u32,
    /// Image file name reported by the tool, if any.
    pub image: Option<String>,
    /// Declared frame tags, in document order.
    pub tags: Vec<FrameTag>,
}

/// The fully decoded output of one tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSheet {
    /// Frames in document order.
    pub frames: Vec<SourceFrame>,
    pub meta: SheetMetadata,
}

impl ParsedSheet {
    /// Names of the declared tags, in document order.
    pub fn declared_tag_names(&self) -> Vec<String> {
        self.meta.tags.iter().map(|t| t.name.clone()).collect()
    }
}

/// Source-file extensions the tool may append after the frame index.
const LABEL_EXTENSIONS: &[&str] = &[".aseprite", ".ase"];

/// Splits a frame label into its stem and trailing frame index.
///
/// Accepts `<stem>_<index>` and `<stem> <index>`, optionally followed by a
/// source-file extension (`hero 3.aseprite`). Returns `None` when the label
/// has no numeric index.
///
/// ```
/// use spriteport_spec::frame::split_frame_label;
///
/// assert_eq!(split_frame_label("hero_walk_left_12"), Some(("hero_walk_left", 12)));
/// assert_eq!(split_frame_label("hero 3.aseprite"), Some(("hero", 3)));
/// assert_eq!(split_frame_label("hero_walk_x"), None);
/// ```
pub fn split_frame_label(label: &str) -> Option<(&str, u32)> {
    let mut body = label;
    for ext in LABEL_EXTENSIONS {
        if body.len() > ext.len() && body.to_ascii_lowercase().ends_with(ext) {
            body = &body[..body.len() - ext.len()];
            break;
        }
    }

    let split = body.rfind(['_', ' '])?;
    let digits = &body[split + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;
    Some((&body[..split], index))
}
