//! Artifact synthesis.
//!
//! Turns an assembled import into on-disk artifacts: the copied sheet image,
//! a sprite sheet artifact, and one clip artifact per clip. Every write goes
//! through [`write_if_changed`] so re-importing unchanged input touches
//! nothing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use spriteport_spec::hash::derive_sprite_id;
use spriteport_spec::{
    AnimationClipData, ArtifactStatus, ClipArtifact, ImportError, ImporterConfiguration,
    PipelineResult, PropertyBinding, SourceFrame, SpriteEntry, SpriteKeyframe,
    SpriteSheetArtifact, ARTIFACT_VERSION, CLIP_SUFFIX, SPRITE_SHEET_SUFFIX,
};

/// Subfolder for the sheet image and sprite sheet artifact.
pub const SPRITES_SUBFOLDER: &str = "Sprites";
/// Subfolder for clip artifacts.
pub const ANIMATIONS_SUBFOLDER: &str = "Animations";

/// Where the artifacts of one source file go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Directory of the source file; every artifact path is relative to it.
    pub source_dir: PathBuf,
    pub base_name: String,
    pub sprites_dir: PathBuf,
    pub animations_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(source: &Path, config: &ImporterConfiguration) -> Self {
        let source_dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let base_name = source_base_name(source);
        let sprites_dir = if config.save_sprites_to_subfolder {
            source_dir.join(SPRITES_SUBFOLDER)
        } else {
            source_dir.clone()
        };
        let animations_dir = if config.save_animations_to_subfolder {
            source_dir.join(ANIMATIONS_SUBFOLDER)
        } else {
            source_dir.clone()
        };
        Self {
            source_dir,
            base_name,
            sprites_dir,
            animations_dir,
        }
    }

    pub fn texture_path(&self) -> PathBuf {
        self.sprites_dir.join(format!("{}.png", self.base_name))
    }

    pub fn sprite_sheet_path(&self) -> PathBuf {
        self.sprites_dir
            .join(format!("{}{}", self.base_name, SPRITE_SHEET_SUFFIX))
    }

    pub fn clip_path(&self, clip_name: &str) -> PathBuf {
        self.animations_dir.join(format!(
            "{}_{}{}",
            self.base_name,
            file_safe(clip_name),
            CLIP_SUFFIX
        ))
    }

    /// `path` relative to the source directory, with `/` separators.
    pub fn relative(&self, path: &Path) -> String {
        relative_reference(&self.source_dir, path)
    }
}

/// Stem of the source file, used to name every artifact.
pub fn source_base_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// `path` relative to `dir` with `/` separators, or the whole path when it
/// does not live beneath `dir`.
pub fn relative_reference(dir: &Path, path: &Path) -> String {
    match path.strip_prefix(dir) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}

/// Number of samples a frame of `duration_ms` lasts at `frame_rate`.
///
/// Never less than one, so every frame stays visible.
pub fn samples_for(duration_ms: u32, frame_rate: f32) -> u32 {
    let samples = (duration_ms as f64 * frame_rate as f64 / 1000.0).round();
    if samples.is_finite() && samples >= 1.0 {
        samples.min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// Builds the sprite sheet artifact for `frames`.
///
/// Sprites keep the id they have in `existing` (matched by name); new sprites
/// get an id derived from the texture reference and the sprite name.
pub fn build_sprite_sheet(
    texture: &str,
    texture_hash: &str,
    size: (u32, u32),
    frames: &[SourceFrame],
    config: &ImporterConfiguration,
    existing: Option<&SpriteSheetArtifact>,
) -> SpriteSheetArtifact {
    let pivot = config.pivot();
    let sprites = frames
        .iter()
        .map(|frame| {
            let id = existing
                .and_then(|sheet| sheet.sprite(&frame.source_name))
                .map(|sprite| sprite.id.clone())
                .unwrap_or_else(|| derive_sprite_id(texture, &frame.source_name));
            SpriteEntry {
                id,
                name: frame.source_name.clone(),
                rect: frame.region,
                pivot,
            }
        })
        .collect();

    SpriteSheetArtifact {
        version: ARTIFACT_VERSION,
        texture: texture.to_string(),
        texture_hash: texture_hash.to_string(),
        width: size.0,
        height: size.1,
        pixels_per_unit: config.pixels_per_unit,
        sprites,
    }
}

/// Builds the clip artifact for one assembled clip.
///
/// Keyframes sit at cumulative sample offsets; a closing keyframe repeats
/// the last sprite at the clip end so the final frame holds for its full
/// duration.
pub fn build_clip(
    clip: &AnimationClipData,
    sheet: &SpriteSheetArtifact,
    sprite_sheet_ref: &str,
    config: &ImporterConfiguration,
) -> ClipArtifact {
    let mut keyframes = Vec::with_capacity(clip.frames.len() + 1);
    let mut sample: u32 = 0;

    for frame in &clip.frames {
        keyframes.push(SpriteKeyframe {
            sample,
            sprite_id: sprite_id(sheet, &frame.source_name),
            sprite: frame.source_name.clone(),
        });
        sample = sample.saturating_add(samples_for(frame.duration_ms, config.clip_frame_rate));
    }
    if let Some(last) = keyframes.last().cloned() {
        keyframes.push(SpriteKeyframe { sample, ..last });
    }

    ClipArtifact {
        version: ARTIFACT_VERSION,
        name: clip.name.clone(),
        frame_rate: config.clip_frame_rate,
        loops: clip.loops,
        length_samples: sample,
        sprite_sheet: sprite_sheet_ref.to_string(),
        binding: PropertyBinding {
            component: config.target_object_kind.component().to_string(),
            property: "m_Sprite".to_string(),
        },
        keyframes,
    }
}

fn sprite_id(sheet: &SpriteSheetArtifact, name: &str) -> String {
    sheet
        .sprite(name)
        .map(|s| s.id.clone())
        .unwrap_or_else(|| derive_sprite_id(&sheet.texture, name))
}

/// Writes `bytes` to `path` unless the file already holds exactly them.
///
/// Missing parent directories are created.
pub fn write_if_changed(path: &Path, bytes: &[u8]) -> PipelineResult<ArtifactStatus> {
    let status = match fs::read(path) {
        Ok(current) if current == bytes => return Ok(ArtifactStatus::Unchanged),
        Ok(_) => ArtifactStatus::Updated,
        Err(e) if e.kind() == io::ErrorKind::NotFound => ArtifactStatus::Created,
        Err(e) => return Err(ImportError::write_failure(path, e)),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ImportError::write_failure(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| ImportError::write_failure(path, e))?;
    Ok(status)
}

/// Serializes `value` as pretty JSON and writes it if changed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> PipelineResult<ArtifactStatus> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| {
        ImportError::write_failure(path, io::Error::new(io::ErrorKind::InvalidData, e))
    })?;
    bytes.push(b'\n');
    write_if_changed(path, &bytes)
}

/// Loads an existing JSON artifact.
///
/// Returns `Ok(None)` when the file does not exist. An unreadable or corrupt
/// artifact is an [`ImportError::ArtifactWriteFailure`]: overwriting it would
/// lose whatever identity it holds.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> PipelineResult<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ImportError::write_failure(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| ImportError::corrupt_artifact(path, e))
}

/// Replaces characters that cannot appear in a file name.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spriteport_spec::{PixelRect, SpriteAlignment, TargetObjectKind};

    fn frame(label: &str, index: usize, duration_ms: u32) -> SourceFrame {
        SourceFrame {
            region: PixelRect::new(index as u32 * 16, 0, 16, 24),
            duration_ms,
            source_name: label.to_string(),
            sequence_index: index,
            frame_number: index as u32,
        }
    }

    #[test]
    fn test_samples_round_with_minimum_of_one() {
        assert_eq!(samples_for(100, 60.0), 6);
        assert_eq!(samples_for(125, 60.0), 8); // 7.5 rounds up
        assert_eq!(samples_for(1, 60.0), 1);
        assert_eq!(samples_for(0, 60.0), 1);
        assert_eq!(samples_for(100, 12.0), 1);
        assert_eq!(samples_for(1000, 24.0), 24);
    }

    #[test]
    fn test_layout_with_and_without_subfolders() {
        let mut config = ImporterConfiguration::default();
        let layout = OutputLayout::new(Path::new("art/hero.aseprite"), &config);
        assert_eq!(layout.texture_path(), Path::new("art/Sprites/hero.png"));
        assert_eq!(
            layout.sprite_sheet_path(),
            Path::new("art/Sprites/hero.sprites.json")
        );
        assert_eq!(
            layout.clip_path("walk"),
            Path::new("art/Animations/hero_walk.anim.json")
        );
        assert_eq!(
            layout.relative(&layout.clip_path("walk")),
            "Animations/hero_walk.anim.json"
        );

        config.save_sprites_to_subfolder = false;
        config.save_animations_to_subfolder = false;
        let layout = OutputLayout::new(Path::new("art/hero.aseprite"), &config);
        assert_eq!(layout.texture_path(), Path::new("art/hero.png"));
        assert_eq!(layout.relative(&layout.clip_path("a/b")), "hero_a_b.anim.json");
    }

    #[test]
    fn test_sprite_sheet_reuses_ids_by_name() {
        let config = ImporterConfiguration::default();
        let frames = vec![frame("hero_walk_0", 0, 100), frame("hero_walk_1", 1, 100)];
        let first = build_sprite_sheet("Sprites/hero.png", "h", (32, 24), &frames, &config, None);
        assert_eq!(
            first.sprites[0].id,
            derive_sprite_id("Sprites/hero.png", "hero_walk_0")
        );

        let mut existing = first.clone();
        existing.sprites[1].id = "kept-id".to_string();
        let moved = vec![frame("hero_walk_1", 0, 100), frame("hero_walk_2", 1, 100)];
        let second = build_sprite_sheet(
            "Sprites/hero.png",
            "h",
            (32, 24),
            &moved,
            &config,
            Some(&existing),
        );

        assert_eq!(second.sprites[0].id, "kept-id");
        assert_eq!(second.sprites[0].rect, PixelRect::new(0, 0, 16, 24));
        assert_eq!(
            second.sprites[1].id,
            derive_sprite_id("Sprites/hero.png", "hero_walk_2")
        );
        assert!(second.sprite("hero_walk_0").is_none());
    }

    #[test]
    fn test_sprite_pivot_follows_alignment() {
        let mut config = ImporterConfiguration::default();
        config.sprite_alignment = SpriteAlignment::BottomCenter;
        let sheet = build_sprite_sheet("t.png", "h", (16, 24), &[frame("a_0", 0, 50)], &config, None);
        assert_eq!(sheet.sprites[0].pivot, [0.5, 0.0]);
        assert_eq!(sheet.pixels_per_unit, config.pixels_per_unit);
    }

    #[test]
    fn test_clip_keyframes_and_closing_key() {
        let mut config = ImporterConfiguration::default();
        config.target_object_kind = TargetObjectKind::Image;
        let frames = vec![frame("hero_walk_0", 0, 100), frame("hero_walk_1", 1, 50)];
        let sheet = build_sprite_sheet("Sprites/hero.png", "h", (32, 24), &frames, &config, None);
        let clip = AnimationClipData {
            name: "walk".to_string(),
            frames,
            loops: false,
        };

        let artifact = build_clip(&clip, &sheet, "Sprites/hero.sprites.json", &config);
        let keys: Vec<(u32, &str)> = artifact
            .keyframes
            .iter()
            .map(|k| (k.sample, k.sprite.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![(0, "hero_walk_0"), (6, "hero_walk_1"), (9, "hero_walk_1")]
        );
        assert_eq!(artifact.length_samples, 9);
        assert!(!artifact.loops);
        assert_eq!(artifact.binding.component, "Image");
        assert_eq!(artifact.binding.property, "m_Sprite");
        assert_eq!(artifact.keyframes[1].sprite_id, sheet.sprites[1].id);
    }

    #[test]
    fn test_write_if_changed_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");

        assert_eq!(write_if_changed(&path, b"one").unwrap(), ArtifactStatus::Created);
        assert_eq!(write_if_changed(&path, b"one").unwrap(), ArtifactStatus::Unchanged);
        assert_eq!(write_if_changed(&path, b"two").unwrap(), ArtifactStatus::Updated);
        assert_eq!(fs::read(&path).unwrap(), b"two");
    }

    #[test]
    fn test_load_json_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.sprites.json");
        assert!(load_json::<SpriteSheetArtifact>(&path).unwrap().is_none());

        fs::write(&path, "{ not json").unwrap();
        let err = load_json::<SpriteSheetArtifact>(&path).unwrap_err();
        assert!(matches!(err, ImportError::ArtifactWriteFailure { .. }));
        assert_eq!(err.path(), path.as_path());
    }
}
