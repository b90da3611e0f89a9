//! Decoding of the tool's sheet metadata.
//!
//! Aseprite writes `frames` either as an array of entries carrying a
//! `filename`, or as an object keyed by label, depending on version and
//! `--format`. The layout is resolved once into [`FrameLayout`]; everything
//! after that is layout-independent.
//!
//! Entries may nest their rectangle under `frame` (`{"frame": {"x",..}}`) or
//! carry flat `x`/`y`/`w`/`h` fields, and give their duration as `duration`
//! or `durationMs`.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use spriteport_spec::frame::split_frame_label;
use spriteport_spec::{FrameTag, ParsedSheet, PixelRect, SheetMetadata, SourceFrame};

use crate::error::{MetadataError, MetadataResult};

/// The two `frames` layouts in use across tool versions.
#[derive(Debug, Clone, Copy)]
pub enum FrameLayout<'a> {
    /// `"frames": [ { "filename": "...", ... }, ... ]`
    Array(&'a [Value]),
    /// `"frames": { "<label>": { ... }, ... }` in document order.
    Mapping(&'a Map<String, Value>),
}

impl<'a> FrameLayout<'a> {
    /// Resolves the layout of a `frames` value.
    pub fn resolve(frames: &'a Value) -> MetadataResult<Self> {
        match frames {
            Value::Array(items) => Ok(FrameLayout::Array(items)),
            Value::Object(map) => Ok(FrameLayout::Mapping(map)),
            other => Err(MetadataError::InvalidFramesLayout {
                found: json_type_name(other),
            }),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FrameLayout::Array(items) => items.len(),
            FrameLayout::Mapping(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in document order as `(location, mapping key, value)`.
    fn entries(&self) -> Vec<(String, Option<&'a str>, &'a Value)> {
        match *self {
            FrameLayout::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("frames[{i}]"), None, v))
                .collect(),
            FrameLayout::Mapping(map) => map
                .iter()
                .map(|(k, v)| (format!("frames[{k:?}]"), Some(k.as_str()), v))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    frame: Option<RawRect>,
    #[serde(default)]
    x: Option<u32>,
    #[serde(default)]
    y: Option<u32>,
    #[serde(default)]
    w: Option<u32>,
    #[serde(default)]
    h: Option<u32>,
    #[serde(default, alias = "durationMs")]
    duration: Option<u32>,
}

impl RawFrame {
    fn rect(&self) -> Option<PixelRect> {
        if let Some(ref r) = self.frame {
            return Some(PixelRect::new(r.x, r.y, r.w, r.h));
        }
        match (self.x, self.y, self.w, self.h) {
            (Some(x), Some(y), Some(w), Some(h)) => Some(PixelRect::new(x, y, w, h)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSize {
    w: u32,
    h: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeta {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    size: Option<RawSize>,
    #[serde(default)]
    frame_tags: Vec<FrameTag>,
}

/// Parses a metadata document into frames (in document order) and sheet
/// metadata.
pub fn parse_metadata(json: &str) -> MetadataResult<ParsedSheet> {
    let root: Value = serde_json::from_str(json).map_err(MetadataError::InvalidJson)?;
    parse_metadata_value(&root)
}

/// Same as [`parse_metadata`] for an already-decoded document.
pub fn parse_metadata_value(root: &Value) -> MetadataResult<ParsedSheet> {
    let root = root.as_object().ok_or(MetadataError::NotAnObject)?;
    let frames_value = root.get("frames").ok_or(MetadataError::MissingFrames)?;
    let layout = FrameLayout::resolve(frames_value)?;
    if layout.is_empty() {
        return Err(MetadataError::EmptyFrameList);
    }

    let meta = match root.get("meta") {
        None | Some(Value::Null) => RawMeta::default(),
        Some(value) => RawMeta::deserialize(value).map_err(|e| MetadataError::InvalidMeta {
            at: "meta".to_string(),
            message: e.to_string(),
        })?,
    };

    let mut frames: Vec<SourceFrame> = Vec::with_capacity(layout.len());
    let mut seen = HashSet::new();
    for (sequence_index, (at, key, value)) in layout.entries().into_iter().enumerate() {
        let frame = decode_frame(&at, key, value, sequence_index)?;
        if !seen.insert(frame.source_name.clone()) {
            return Err(MetadataError::DuplicateLabel {
                at,
                label: frame.source_name,
            });
        }
        frames.push(frame);
    }

    let (width, height) = match meta.size {
        Some(size) => {
            for frame in &frames {
                let r = frame.region;
                if r.right() > size.w as u64 || r.bottom() > size.h as u64 {
                    return Err(MetadataError::RectOutOfBounds {
                        at: locate(&layout, frame.sequence_index),
                        width: size.w,
                        height: size.h,
                    });
                }
            }
            (size.w, size.h)
        }
        None => sheet_extent(&frames),
    };

    for (i, tag) in meta.frame_tags.iter().enumerate() {
        if tag.from > tag.to || tag.to >= frames.len() {
            return Err(MetadataError::InvalidMeta {
                at: format!("meta.frameTags[{i}]"),
                message: format!(
                    "tag '{}' range {}..={} does not fit {} frames",
                    tag.name,
                    tag.from,
                    tag.to,
                    frames.len()
                ),
            });
        }
    }

    Ok(ParsedSheet {
        frames,
        meta: SheetMetadata {
            width,
            height,
            image: meta.image,
            tags: meta.frame_tags,
        },
    })
}

fn decode_frame(
    at: &str,
    key: Option<&str>,
    value: &Value,
    sequence_index: usize,
) -> MetadataResult<SourceFrame> {
    if !value.is_object() {
        return Err(MetadataError::InvalidEntry {
            at: at.to_string(),
            message: format!("expected an object, found {}", json_type_name(value)),
        });
    }
    let raw = RawFrame::deserialize(value).map_err(|e| MetadataError::InvalidEntry {
        at: at.to_string(),
        message: e.to_string(),
    })?;

    // In the mapping layout the key is the label.
    let label = match key {
        Some(k) => k.to_string(),
        None => raw
            .filename
            .clone()
            .ok_or_else(|| MetadataError::MissingLabel { at: at.to_string() })?,
    };

    let region = raw
        .rect()
        .ok_or_else(|| MetadataError::MissingRect { at: at.to_string() })?;
    if region.is_empty() {
        return Err(MetadataError::EmptyRect { at: at.to_string() });
    }

    let duration_ms = raw
        .duration
        .ok_or_else(|| MetadataError::MissingDuration { at: at.to_string() })?;

    let (_, frame_number) =
        split_frame_label(&label).ok_or_else(|| MetadataError::NonNumericIndex {
            at: at.to_string(),
            label: label.clone(),
        })?;

    Ok(SourceFrame {
        region,
        duration_ms,
        source_name: label,
        sequence_index,
        frame_number,
    })
}

fn sheet_extent(frames: &[SourceFrame]) -> (u32, u32) {
    let w = frames.iter().map(|f| f.region.right()).max().unwrap_or(0);
    let h = frames.iter().map(|f| f.region.bottom()).max().unwrap_or(0);
    (
        u32::try_from(w).unwrap_or(u32::MAX),
        u32::try_from(h).unwrap_or(u32::MAX),
    )
}

fn locate(layout: &FrameLayout<'_>, index: usize) -> String {
    match layout {
        FrameLayout::Array(_) => format!("frames[{index}]"),
        FrameLayout::Mapping(map) => map
            .keys()
            .nth(index)
            .map(|k| format!("frames[{k:?}]"))
            .unwrap_or_else(|| format!("frames[{index}]")),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spriteport_spec::TagDirection;

    const ARRAY_DOC: &str = r#"{
      "frames": [
        { "filename": "hero_walk_0", "frame": { "x": 0, "y": 0, "w": 16, "h": 16 }, "duration": 100 },
        { "filename": "hero_walk_1", "frame": { "x": 16, "y": 0, "w": 16, "h": 16 }, "duration": 120 },
        { "filename": "hero_idle_2", "frame": { "x": 32, "y": 0, "w": 16, "h": 16 }, "duration": 200 }
      ],
      "meta": {
        "image": "hero.png",
        "size": { "w": 48, "h": 16 },
        "frameTags": [
          { "name": "walk", "from": 0, "to": 1, "direction": "forward" },
          { "name": "idle", "from": 2, "to": 2, "direction": "pingpong" }
        ]
      }
    }"#;

    #[test]
    fn test_array_layout() {
        let sheet = parse_metadata(ARRAY_DOC).unwrap();
        assert_eq!(sheet.frames.len(), 3);
        assert_eq!(sheet.frames[1].source_name, "hero_walk_1");
        assert_eq!(sheet.frames[1].region, PixelRect::new(16, 0, 16, 16));
        assert_eq!(sheet.frames[1].duration_ms, 120);
        assert_eq!(sheet.frames[2].frame_number, 2);
        assert_eq!(sheet.meta.width, 48);
        assert_eq!(sheet.meta.image.as_deref(), Some("hero.png"));
        assert_eq!(sheet.declared_tag_names(), vec!["walk", "idle"]);
        assert_eq!(sheet.meta.tags[1].direction, TagDirection::PingPong);
    }

    #[test]
    fn test_mapping_layout_keeps_document_order() {
        let doc = r#"{
          "frames": {
            "hero_run_9": { "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "duration": 50 },
            "hero_run_1": { "frame": { "x": 8, "y": 0, "w": 8, "h": 8 }, "duration": 50 },
            "hero_hit_5": { "x": 16, "y": 0, "w": 8, "h": 8, "durationMs": 80 }
          }
        }"#;
        let sheet = parse_metadata(doc).unwrap();
        let names: Vec<&str> = sheet.frames.iter().map(|f| f.source_name.as_str()).collect();
        assert_eq!(names, vec!["hero_run_9", "hero_run_1", "hero_hit_5"]);
        let seq: Vec<usize> = sheet.frames.iter().map(|f| f.sequence_index).collect();
        assert_eq!(seq, vec![0, 1, 2]);
        assert_eq!(sheet.frames[2].duration_ms, 80);
        // no meta.size: extent of the frames
        assert_eq!((sheet.meta.width, sheet.meta.height), (24, 8));
        assert!(sheet.meta.tags.is_empty());
    }

    #[test]
    fn test_frame_count_and_order_preserved() {
        let mut frames = Vec::new();
        for i in 0..40 {
            let tag = if i % 3 == 0 { "a" } else { "b" };
            frames.push(format!(
                r#"{{ "filename": "s_{tag}_{i}", "frame": {{ "x": {x}, "y": 0, "w": 4, "h": 4 }}, "duration": 10 }}"#,
                x = i * 4
            ));
        }
        let doc = format!(r#"{{ "frames": [{}] }}"#, frames.join(","));
        let sheet = parse_metadata(&doc).unwrap();
        assert_eq!(sheet.frames.len(), 40);
        assert!(sheet
            .frames
            .windows(2)
            .all(|w| w[0].sequence_index < w[1].sequence_index));
    }

    #[test]
    fn test_missing_rect_is_malformed() {
        let doc = r#"{ "frames": [
            { "filename": "hero_walk_0", "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "duration": 10 },
            { "filename": "hero_walk_1", "duration": 10 }
        ] }"#;
        let err = parse_metadata(doc).unwrap_err();
        assert!(matches!(err, MetadataError::MissingRect { ref at } if at == "frames[1]"));
    }

    #[test]
    fn test_partial_flat_rect_is_malformed() {
        let doc = r#"{ "frames": { "hero_walk_0": { "x": 0, "y": 0, "w": 8, "duration": 10 } } }"#;
        let err = parse_metadata(doc).unwrap_err();
        assert!(matches!(err, MetadataError::MissingRect { .. }));
        assert!(err.to_string().contains("hero_walk_0"));
    }

    #[test]
    fn test_non_numeric_index_is_malformed() {
        let doc = r#"{ "frames": [
            { "filename": "hero_walk_last", "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "duration": 10 }
        ] }"#;
        let err = parse_metadata(doc).unwrap_err();
        assert!(matches!(err, MetadataError::NonNumericIndex { ref label, .. } if label == "hero_walk_last"));
    }

    #[test]
    fn test_structural_failures() {
        assert!(matches!(
            parse_metadata("not json").unwrap_err(),
            MetadataError::InvalidJson(_)
        ));
        assert!(matches!(
            parse_metadata("[1, 2]").unwrap_err(),
            MetadataError::NotAnObject
        ));
        assert!(matches!(
            parse_metadata(r#"{ "meta": {} }"#).unwrap_err(),
            MetadataError::MissingFrames
        ));
        assert!(matches!(
            parse_metadata(r#"{ "frames": "hero" }"#).unwrap_err(),
            MetadataError::InvalidFramesLayout { found: "string" }
        ));
        assert!(matches!(
            parse_metadata(r#"{ "frames": [] }"#).unwrap_err(),
            MetadataError::EmptyFrameList
        ));
        assert!(matches!(
            parse_metadata(r#"{ "frames": {} }"#).unwrap_err(),
            MetadataError::EmptyFrameList
        ));
        assert!(matches!(
            parse_metadata(r#"{ "frames": [ 3 ] }"#).unwrap_err(),
            MetadataError::InvalidEntry { .. }
        ));
    }

    #[test]
    fn test_negative_coordinate_is_malformed() {
        let doc = r#"{ "frames": [
            { "filename": "a_b_0", "frame": { "x": -1, "y": 0, "w": 8, "h": 8 }, "duration": 10 }
        ] }"#;
        assert!(matches!(
            parse_metadata(doc).unwrap_err(),
            MetadataError::InvalidEntry { .. }
        ));
    }

    #[test]
    fn test_missing_duration_and_label() {
        let doc = r#"{ "frames": [ { "filename": "a_b_0", "frame": { "x": 0, "y": 0, "w": 8, "h": 8 } } ] }"#;
        assert!(matches!(
            parse_metadata(doc).unwrap_err(),
            MetadataError::MissingDuration { .. }
        ));

        let doc = r#"{ "frames": [ { "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "duration": 1 } ] }"#;
        assert!(matches!(
            parse_metadata(doc).unwrap_err(),
            MetadataError::MissingLabel { .. }
        ));
    }

    #[test]
    fn test_rect_bounds_and_empty_rect() {
        let doc = r#"{
          "frames": [ { "filename": "a_b_0", "frame": { "x": 8, "y": 0, "w": 8, "h": 8 }, "duration": 10 } ],
          "meta": { "size": { "w": 12, "h": 8 } }
        }"#;
        assert!(matches!(
            parse_metadata(doc).unwrap_err(),
            MetadataError::RectOutOfBounds { width: 12, height: 8, .. }
        ));

        let doc = r#"{ "frames": [ { "filename": "a_b_0", "frame": { "x": 0, "y": 0, "w": 0, "h": 8 }, "duration": 10 } ] }"#;
        assert!(matches!(
            parse_metadata(doc).unwrap_err(),
            MetadataError::EmptyRect { .. }
        ));
    }

    #[test]
    fn test_tag_range_must_fit() {
        let doc = r#"{
          "frames": [ { "filename": "a_b_0", "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "duration": 10 } ],
          "meta": { "frameTags": [ { "name": "b", "from": 0, "to": 4 } ] }
        }"#;
        let err = parse_metadata(doc).unwrap_err();
        assert!(err.to_string().contains("meta.frameTags[0]"));
    }

    #[test]
    fn test_duplicate_label_is_malformed() {
        let doc = r#"{ "frames": [
            { "filename": "a_b_0", "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "duration": 10 },
            { "filename": "a_b_0", "frame": { "x": 8, "y": 0, "w": 8, "h": 8 }, "duration": 10 }
        ] }"#;
        assert!(matches!(
            parse_metadata(doc).unwrap_err(),
            MetadataError::DuplicateLabel { ref at, .. } if at == "frames[1]"
        ));
    }

    #[test]
    fn test_default_filename_format_is_accepted() {
        let doc = r#"{ "frames": {
            "hero 0.aseprite": { "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "duration": 100 },
            "hero 1.aseprite": { "frame": { "x": 8, "y": 0, "w": 8, "h": 8 }, "duration": 100 }
        } }"#;
        let sheet = parse_metadata(doc).unwrap();
        assert_eq!(sheet.frames[1].frame_number, 1);
        assert_eq!(sheet.frames[1].source_name, "hero 1.aseprite");
    }
}
