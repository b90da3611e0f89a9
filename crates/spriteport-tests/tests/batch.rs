//! Batch Import Tests for spriteport
//!
//! Tests verify:
//! - A failing file never halts the batch
//! - Failures are collected in input order
//! - Progress is reported per file
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p spriteport-tests --test batch
//! ```

use pretty_assertions::assert_eq;
use spriteport_import::{import_batch, ControllerTarget, ImportObserver, ImportStage, Importer};
use spriteport_spec::{ImportErrorKind, ImporterConfiguration};
use spriteport_tests::{FakeExporter, ProjectFixture};
use std::path::{Path, PathBuf};

/// Records everything the batch reports.
#[derive(Default)]
struct Recorder {
    started: Vec<(usize, usize)>,
    finished: Vec<(usize, bool)>,
    failed_stages: Vec<PathBuf>,
}

impl ImportObserver for Recorder {
    fn stage_changed(&mut self, path: &Path, stage: ImportStage) {
        if stage == ImportStage::Failed {
            self.failed_stages.push(path.to_path_buf());
        }
    }

    fn file_started(&mut self, index: usize, total: usize, _path: &Path) {
        self.started.push((index, total));
    }

    fn file_finished(&mut self, index: usize, _total: usize, _path: &Path, ok: bool) {
        self.finished.push((index, ok));
    }
}

#[test]
fn test_second_of_three_fails_in_tool() {
    let project = ProjectFixture::new();
    let paths = vec![
        project.add_source("hero.aseprite"),
        project.add_source("slime.aseprite"),
        project.add_source("bat.ase"),
    ];
    let config = ImporterConfiguration::default();
    let exporter = FakeExporter::new().failing("slime", "Error: file is corrupted");
    let importer = Importer::new(&config, &exporter);
    let mut recorder = Recorder::default();

    let report = import_batch(&importer, &paths, &ControllerTarget::None, &mut recorder);

    assert_eq!(report.total(), 3);
    assert_eq!(report.failure_count(), 1);
    assert!(report.outcomes[0].is_success());
    assert!(!report.outcomes[1].is_success());
    assert!(report.outcomes[2].is_success());

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    let (path, error) = failures[0];
    assert_eq!(path, paths[1].as_path());
    assert_eq!(error.kind(), ImportErrorKind::ExternalToolFailure);
    assert_eq!(error.stderr(), Some("Error: file is corrupted"));

    assert_eq!(exporter.calls(), paths);
    assert_eq!(recorder.started, vec![(0, 3), (1, 3), (2, 3)]);
    assert_eq!(recorder.finished, vec![(0, true), (1, false), (2, true)]);
    assert_eq!(recorder.failed_stages, vec![paths[1].clone()]);

    assert!(project.path().join("Sprites/hero.sprites.json").is_file());
    assert!(project.path().join("Sprites/bat.sprites.json").is_file());
    assert!(!project.path().join("Sprites/slime.sprites.json").exists());
}

#[test]
fn test_tool_without_output_is_external_failure() {
    let project = ProjectFixture::new();
    let paths = vec![project.add_source("ghost.aseprite")];
    let config = ImporterConfiguration::default();
    let exporter = FakeExporter::new().silent("ghost");
    let importer = Importer::new(&config, &exporter);

    let report = import_batch(
        &importer,
        &paths,
        &ControllerTarget::None,
        &mut spriteport_import::NoopObserver,
    );

    let (_, error) = report.failures().next().unwrap();
    assert_eq!(error.kind(), ImportErrorKind::ExternalToolFailure);
    assert!(error.to_string().contains("did not produce"));
}

#[test]
fn test_missing_source_is_reported_not_fatal() {
    let project = ProjectFixture::new();
    let paths = vec![
        project.path().join("missing.aseprite"),
        project.add_source("hero.aseprite"),
    ];
    let config = ImporterConfiguration::default();
    let exporter = FakeExporter::new();
    let importer = Importer::new(&config, &exporter);

    let report = import_batch(
        &importer,
        &paths,
        &ControllerTarget::Base,
        &mut spriteport_import::NoopObserver,
    );

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(exporter.calls(), vec![paths[1].clone()]);
    let imported = report.succeeded().next().unwrap();
    assert!(imported.controller.is_some());
    assert!(project.path().join("hero.controller.json").is_file());
}
