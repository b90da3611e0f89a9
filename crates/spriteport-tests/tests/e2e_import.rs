//! End-to-End Import Tests for spriteport
//!
//! Tests verify:
//! - Artifacts produced for a well-formed sheet
//! - Idempotent re-import (identical files, identical sprite ids)
//! - Malformed metadata leaves no artifacts
//! - Non-looping rules applied through the whole pipeline
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p spriteport-tests --test e2e_import
//! ```

use pretty_assertions::assert_eq;
use spriteport_backend_aseprite::parse_metadata;
use spriteport_import::Importer;
use spriteport_spec::{
    ArtifactStatus, ClipArtifact, ImportErrorKind, ImporterConfiguration, SpriteSheetArtifact,
};
use spriteport_tests::fixtures::{MALFORMED_JSON, SHEET_PNG};
use spriteport_tests::{sheet_json, sheet_json_mapping, FakeExporter, ProjectFixture, TagSpec};

fn hero_tags() -> Vec<TagSpec<'static>> {
    vec![
        TagSpec::new("walk", 4, 100),
        TagSpec::new("idle", 2, 250),
        TagSpec::new("jump", 3, 80),
    ]
}

// ============================================================================
// Artifact Tests
// ============================================================================

#[test]
fn test_import_writes_sheet_sprites_and_clips() {
    let project = ProjectFixture::new();
    let source = project.add_source("art/hero.aseprite");
    let config = ImporterConfiguration::default();
    let exporter = FakeExporter::new().with_sheet("hero", sheet_json("hero", &hero_tags()));

    let result = Importer::new(&config, &exporter).import(&source).unwrap();

    assert!(result.has_animations);
    assert_eq!(result.clip_names(), vec!["walk", "idle", "jump"]);
    assert!(result.unmatched_tags().is_empty());

    let sheet: SpriteSheetArtifact = project.read_json("art/Sprites/hero.sprites.json");
    assert_eq!(sheet.texture, "Sprites/hero.png");
    assert_eq!(sheet.sprites.len(), 9);
    assert_eq!(sheet.width, 9 * 16);
    assert_eq!(
        sheet.texture_hash,
        blake3::hash(SHEET_PNG).to_hex().to_string()
    );

    let walk: ClipArtifact = project.read_json("art/Animations/hero_walk.anim.json");
    assert_eq!(walk.name, "walk");
    assert_eq!(walk.sprite_sheet, "Sprites/hero.sprites.json");
    assert_eq!(walk.binding.component, "SpriteRenderer");
    // 4 frames x 6 samples + closing key
    assert_eq!(walk.length_samples, 24);
    assert_eq!(walk.keyframes.len(), 5);
    for key in &walk.keyframes {
        assert_eq!(sheet.sprite(&key.sprite).unwrap().id, key.sprite_id);
    }

    let idle: ClipArtifact = project.read_json("art/Animations/hero_idle.anim.json");
    let samples: Vec<u32> = idle.keyframes.iter().map(|k| k.sample).collect();
    assert_eq!(samples, vec![0, 15, 30]);
}

#[test]
fn test_subfolders_can_be_disabled() {
    let project = ProjectFixture::new();
    let source = project.add_source("hero.aseprite");
    let mut config = ImporterConfiguration::default();
    config.save_sprites_to_subfolder = false;
    config.save_animations_to_subfolder = false;
    let exporter = FakeExporter::new();

    Importer::new(&config, &exporter).import(&source).unwrap();

    let files: Vec<String> = project.artifact_hashes().into_keys().collect();
    assert_eq!(
        files,
        vec!["hero.png", "hero.sprites.json", "hero_idle.anim.json"]
    );
}

// ============================================================================
// Idempotence Tests
// ============================================================================

#[test]
fn test_reimport_is_a_no_op() {
    let project = ProjectFixture::new();
    let source = project.add_source("hero.aseprite");
    let config = ImporterConfiguration::default();
    let exporter = FakeExporter::new().with_sheet("hero", sheet_json("hero", &hero_tags()));
    let importer = Importer::new(&config, &exporter);

    let first = importer.import(&source).unwrap();
    let before = project.artifact_hashes();
    let second = importer.import(&source).unwrap();

    assert_eq!(before, project.artifact_hashes());
    assert!(first
        .artifacts()
        .iter()
        .all(|a| a.status == ArtifactStatus::Created));
    assert!(second
        .artifacts()
        .iter()
        .all(|a| a.status == ArtifactStatus::Unchanged));
    assert_eq!(first.clips, second.clips);
}

#[test]
fn test_reimport_keeps_sprite_ids_of_surviving_frames() {
    let project = ProjectFixture::new();
    let source = project.add_source("hero.aseprite");
    let config = ImporterConfiguration::default();

    let exporter =
        FakeExporter::new().with_sheet("hero", sheet_json("hero", &[TagSpec::new("walk", 2, 100)]));
    Importer::new(&config, &exporter).import(&source).unwrap();

    // Tamper with an id to prove it is read back rather than re-derived.
    let mut sheet: SpriteSheetArtifact = project.read_json("Sprites/hero.sprites.json");
    sheet.sprites[0].id = "artist-assigned".to_string();
    project.write_json("Sprites/hero.sprites.json", &sheet);

    let exporter = FakeExporter::new().with_sheet(
        "hero",
        sheet_json("hero", &[TagSpec::new("walk", 3, 100)]),
    );
    let result = Importer::new(&config, &exporter).import(&source).unwrap();

    let sheet: SpriteSheetArtifact = project.read_json("Sprites/hero.sprites.json");
    assert_eq!(sheet.sprites.len(), 3);
    assert_eq!(sheet.sprite("hero_walk_0").unwrap().id, "artist-assigned");

    let walk: ClipArtifact = project.read_json("Animations/hero_walk.anim.json");
    assert_eq!(walk.keyframes[0].sprite_id, "artist-assigned");
    assert_eq!(
        result.clip_artifact("walk").unwrap().status,
        ArtifactStatus::Updated
    );
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_malformed_metadata_writes_zero_artifacts() {
    let project = ProjectFixture::new();
    let source = project.add_source("hero.aseprite");
    let config = ImporterConfiguration::default();
    let exporter = FakeExporter::new().with_sheet("hero", MALFORMED_JSON);

    let err = Importer::new(&config, &exporter).import(&source).unwrap_err();

    assert_eq!(err.kind(), ImportErrorKind::MalformedMetadata);
    assert_eq!(err.path(), source.as_path());
    assert!(err.to_string().contains("rectangle"));
    assert!(project.artifact_hashes().is_empty());
}

#[test]
fn test_unsegmentable_labels_are_empty_clip_set() {
    let project = ProjectFixture::new();
    let source = project.add_source("hero.aseprite");
    let config = ImporterConfiguration::default();
    let json = r#"{"frames": {
        "_0": {"frame": {"x": 0, "y": 0, "w": 8, "h": 8}, "duration": 100},
        " 1": {"frame": {"x": 8, "y": 0, "w": 8, "h": 8}, "duration": 100}
    }}"#;
    let exporter = FakeExporter::new().with_sheet("hero", json);

    let err = Importer::new(&config, &exporter).import(&source).unwrap_err();
    assert_eq!(err.kind(), ImportErrorKind::EmptyClipSet);
    assert!(project.artifact_hashes().is_empty());
}

#[test]
fn test_clips_sharing_an_artifact_file_are_rejected() {
    let project = ProjectFixture::new();
    let source = project.add_source("hero.aseprite");
    let config = ImporterConfiguration::default();
    let exporter = FakeExporter::new().with_sheet(
        "hero",
        sheet_json(
            "hero",
            &[TagSpec::new("a:b", 1, 100), TagSpec::new("a_b", 1, 100)],
        ),
    );

    let err = Importer::new(&config, &exporter).import(&source).unwrap_err();

    assert_eq!(err.kind(), ImportErrorKind::ArtifactWriteFailure);
    assert!(err.path().ends_with("Animations/hero_a_b.anim.json"));
    assert!(project.artifact_hashes().is_empty());
}

// ============================================================================
// Parsing and Rules
// ============================================================================

#[test]
fn test_parser_preserves_count_and_order() {
    for json in [
        sheet_json("hero", &hero_tags()),
        sheet_json_mapping("hero", &hero_tags()),
    ] {
        let sheet = parse_metadata(&json).unwrap();
        assert_eq!(sheet.frames.len(), 9);
        assert!(sheet
            .frames
            .windows(2)
            .all(|w| w[0].sequence_index < w[1].sequence_index));
        assert_eq!(sheet.frames[4].source_name, "hero_idle_0");
    }
}

#[test]
fn test_mapping_layout_imports_like_array_layout() {
    let config = ImporterConfiguration::default();

    let array_project = ProjectFixture::new();
    let source = array_project.add_source("hero.aseprite");
    let exporter = FakeExporter::new().with_sheet("hero", sheet_json("hero", &hero_tags()));
    Importer::new(&config, &exporter).import(&source).unwrap();

    let mapping_project = ProjectFixture::new();
    let source = mapping_project.add_source("hero.aseprite");
    let exporter =
        FakeExporter::new().with_sheet("hero", sheet_json_mapping("hero", &hero_tags()));
    Importer::new(&config, &exporter).import(&source).unwrap();

    assert_eq!(
        array_project.artifact_hashes(),
        mapping_project.artifact_hashes()
    );
}

#[test]
fn test_non_looping_rules_reach_clip_artifacts() {
    let project = ProjectFixture::new();
    let source = project.add_source("hero.aseprite");
    let mut config = ImporterConfiguration::default();
    for rule in ["walk", "^run.*", "walk("] {
        assert!(config.non_looping_rules.add(rule));
    }
    let exporter = FakeExporter::new().with_sheet(
        "hero",
        sheet_json(
            "hero",
            &[
                TagSpec::new("walk_left", 2, 100),
                TagSpec::new("run_01", 2, 100),
                TagSpec::new("idle", 2, 100),
            ],
        ),
    );

    let result = Importer::new(&config, &exporter).import(&source).unwrap();

    for (clip, loops) in [("walk_left", false), ("run_01", false), ("idle", true)] {
        let artifact: ClipArtifact =
            project.read_json(&format!("Animations/hero_{clip}.anim.json"));
        assert_eq!(artifact.loops, loops, "clip {clip}");
    }
    let literal = result
        .rule_matches
        .iter()
        .find(|m| m.rule == "walk(")
        .unwrap();
    assert!(literal.literal);
    assert!(literal.clips.is_empty());
}
