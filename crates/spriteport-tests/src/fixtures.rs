//! Test fixtures: sample metadata documents, project directories and a
//! scripted exporter that stands in for Aseprite.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use spriteport_spec::{ExportRequest, ImportError, PipelineResult, SheetExporter};

/// Bytes written as the packed sheet image.
pub const SHEET_PNG: &[u8] = b"\x89PNG\r\n\x1a\nspriteport-fixture";

/// Frame width and height used by the generated documents.
pub const FRAME_SIZE: u32 = 16;

/// A metadata document that is valid JSON but has no usable frames.
pub const MALFORMED_JSON: &str = r#"{"frames": [{"filename": "hero_walk_0", "duration": 100}]}"#;

/// One animation in a generated document: tag, frame count, frame duration.
#[derive(Debug, Clone, Copy)]
pub struct TagSpec<'a> {
    pub tag: &'a str,
    pub frames: usize,
    pub duration_ms: u32,
}

impl<'a> TagSpec<'a> {
    pub fn new(tag: &'a str, frames: usize, duration_ms: u32) -> Self {
        Self {
            tag,
            frames,
            duration_ms,
        }
    }
}

/// Builds an array-layout metadata document the way Aseprite writes it with
/// `--format json-array --list-tags`.
///
/// Frames are packed left to right on a single row.
pub fn sheet_json(base: &str, tags: &[TagSpec<'_>]) -> String {
    let (frames, meta) = sheet_parts(base, tags);
    let frames: Vec<Value> = frames
        .into_iter()
        .map(|(label, mut entry)| {
            entry.insert("filename".to_string(), Value::String(label));
            Value::Object(entry)
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "frames": frames, "meta": meta }))
        .expect("Failed to serialize fixture")
}

/// Same document in the mapping layout (`"frames": { label: entry }`).
pub fn sheet_json_mapping(base: &str, tags: &[TagSpec<'_>]) -> String {
    let (frames, meta) = sheet_parts(base, tags);
    let frames: Map<String, Value> = frames
        .into_iter()
        .map(|(label, entry)| (label, Value::Object(entry)))
        .collect();
    serde_json::to_string_pretty(&json!({ "frames": frames, "meta": meta }))
        .expect("Failed to serialize fixture")
}

fn sheet_parts(base: &str, tags: &[TagSpec<'_>]) -> (Vec<(String, Map<String, Value>)>, Value) {
    let mut frames = Vec::new();
    let mut frame_tags = Vec::new();
    for spec in tags {
        let from = frames.len();
        for i in 0..spec.frames {
            let x = frames.len() as u32 * FRAME_SIZE;
            let label = if spec.tag.is_empty() {
                format!("{base}_{i}")
            } else {
                format!("{base}_{}_{i}", spec.tag)
            };
            let mut entry = Map::new();
            entry.insert(
                "frame".to_string(),
                json!({ "x": x, "y": 0, "w": FRAME_SIZE, "h": FRAME_SIZE }),
            );
            entry.insert("rotated".to_string(), json!(false));
            entry.insert("trimmed".to_string(), json!(false));
            entry.insert("duration".to_string(), json!(spec.duration_ms));
            frames.push((label, entry));
        }
        if !spec.tag.is_empty() && spec.frames > 0 {
            frame_tags.push(json!({
                "name": spec.tag,
                "from": from,
                "to": frames.len() - 1,
                "direction": "forward",
            }));
        }
    }
    let width = (frames.len() as u32).max(1) * FRAME_SIZE;
    let meta = json!({
        "app": "https://www.aseprite.org/",
        "image": format!("{base}.png"),
        "format": "RGBA8888",
        "size": { "w": width, "h": FRAME_SIZE },
        "scale": "1",
        "frameTags": frame_tags,
    });
    (frames, meta)
}

/// What the scripted exporter does for one source stem.
#[derive(Debug, Clone)]
pub enum Script {
    /// Write the sheet image and this metadata document.
    Sheet(String),
    /// Fail like a non-zero exit with this stderr.
    Fail(String),
    /// Exit successfully without writing anything.
    NoOutput,
}

/// A [`SheetExporter`] that follows per-file scripts instead of running a
/// tool.
///
/// Files without a script get a two-frame `idle` animation.
#[derive(Debug, Default)]
pub struct FakeExporter {
    scripts: HashMap<String, Script>,
    calls: RefCell<Vec<PathBuf>>,
}

impl FakeExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `json` for the source whose stem is `stem`.
    pub fn with_sheet(mut self, stem: &str, json: impl Into<String>) -> Self {
        self.scripts
            .insert(stem.to_string(), Script::Sheet(json.into()));
        self
    }

    /// Fail the export of `stem` with `stderr`.
    pub fn failing(mut self, stem: &str, stderr: &str) -> Self {
        self.scripts
            .insert(stem.to_string(), Script::Fail(stderr.to_string()));
        self
    }

    /// Succeed for `stem` without producing output.
    pub fn silent(mut self, stem: &str) -> Self {
        self.scripts.insert(stem.to_string(), Script::NoOutput);
        self
    }

    /// Replace the script for `stem` after construction.
    pub fn set_sheet(&mut self, stem: &str, json: impl Into<String>) {
        self.scripts
            .insert(stem.to_string(), Script::Sheet(json.into()));
    }

    /// Inputs exported so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl SheetExporter for FakeExporter {
    fn export(&self, request: &ExportRequest) -> PipelineResult<()> {
        self.calls.borrow_mut().push(request.input.clone());
        let stem = request
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let script = self
            .scripts
            .get(&stem)
            .cloned()
            .unwrap_or_else(|| Script::Sheet(sheet_json(&stem, &[TagSpec::new("idle", 2, 100)])));

        match script {
            Script::Sheet(json) => {
                let io = |e: std::io::Error| {
                    ImportError::external_tool(&request.input, e.to_string(), None)
                };
                fs::write(&request.sheet_path, SHEET_PNG).map_err(io)?;
                fs::write(&request.data_path, json).map_err(io)?;
                Ok(())
            }
            Script::Fail(stderr) => Err(ImportError::external_tool(
                &request.input,
                "Aseprite process exited with status 1",
                Some(stderr),
            )),
            Script::NoOutput => Ok(()),
        }
    }

    fn describe(&self) -> String {
        "fake exporter".to_string()
    }
}

/// A temporary project directory holding source files.
pub struct ProjectFixture {
    pub root: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a placeholder source file at `relative`.
    pub fn add_source(&self, relative: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create source dir");
        }
        fs::write(&path, b"ASEPRITE").expect("Failed to write source file");
        path
    }

    /// Writes `value` as JSON at `relative`.
    pub fn write_json(&self, relative: &str, value: &impl serde::Serialize) -> PathBuf {
        let path = self.root.path().join(relative);
        fs::write(
            &path,
            serde_json::to_string_pretty(value).expect("Failed to serialize"),
        )
        .expect("Failed to write JSON file");
        path
    }

    /// Reads and decodes the JSON file at `relative`.
    pub fn read_json<T: DeserializeOwned>(&self, relative: &str) -> T {
        let path = self.root.path().join(relative);
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
    }

    /// Every file under the project except sources, relative path to
    /// BLAKE3 hash.
    pub fn artifact_hashes(&self) -> BTreeMap<String, String> {
        tree_hashes(self.root.path())
            .into_iter()
            .filter(|(path, _)| !spriteport_import::is_valid_source(Path::new(path)))
            .collect()
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// BLAKE3 hash of every file below `dir`, keyed by `/`-separated relative
/// path.
pub fn tree_hashes(dir: &Path) -> BTreeMap<String, String> {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(dir)
                .unwrap_or(e.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/");
            let bytes = fs::read(e.path()).expect("Failed to read file");
            (rel, blake3::hash(&bytes).to_hex().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_json_parses() {
        let json = sheet_json("hero", &[TagSpec::new("walk", 3, 100), TagSpec::new("", 1, 50)]);
        let sheet = spriteport_backend_aseprite::parse_metadata(&json).unwrap();
        assert_eq!(sheet.frames.len(), 4);
        assert_eq!(sheet.frames[3].source_name, "hero_0");
        assert_eq!(sheet.meta.width, 4 * FRAME_SIZE);
        assert_eq!(sheet.declared_tag_names(), vec!["walk"]);
    }

    #[test]
    fn test_layouts_decode_identically() {
        let tags = [TagSpec::new("walk", 2, 100), TagSpec::new("idle", 1, 200)];
        let array = spriteport_backend_aseprite::parse_metadata(&sheet_json("hero", &tags)).unwrap();
        let mapping =
            spriteport_backend_aseprite::parse_metadata(&sheet_json_mapping("hero", &tags)).unwrap();
        assert_eq!(array, mapping);
    }
}
