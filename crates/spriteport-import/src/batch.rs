//! Multi-file import.
//!
//! Files are imported in the order given. A failing file is recorded and the
//! batch moves on; failures are only surfaced through the returned
//! [`BatchReport`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use spriteport_spec::{ArtifactRecord, ImportError, ImportResult, PipelineResult};

use crate::pipeline::{ControllerTarget, ImportObserver, Importer};

/// A successfully imported file.
#[derive(Debug)]
pub struct ImportedFile {
    pub result: ImportResult,
    /// Controller written after the import, if one was requested.
    pub controller: Option<ArtifactRecord>,
}

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub outcome: PipelineResult<ImportedFile>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&ImportError> {
        self.outcome.as_ref().err()
    }
}

/// Everything a batch did, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ImportedFile> {
        self.outcomes.iter().filter_map(|o| o.outcome.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ImportError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.path.as_path(), e)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Imports `paths` in order, then writes the controller `target` asks for.
///
/// A controller failure fails that file only.
pub fn import_batch(
    importer: &Importer<'_>,
    paths: &[PathBuf],
    target: &ControllerTarget,
    observer: &mut dyn ImportObserver,
) -> BatchReport {
    let start = Instant::now();
    let total = paths.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, path) in paths.iter().enumerate() {
        observer.file_started(index, total, path);
        let outcome = importer
            .import_observed(path, observer)
            .and_then(|result| {
                let controller = importer.build_controller(&result, target)?;
                Ok(ImportedFile { result, controller })
            });
        observer.file_finished(index, total, path, outcome.is_ok());
        outcomes.push(FileOutcome {
            path: path.clone(),
            outcome,
        });
    }

    BatchReport {
        outcomes,
        elapsed: start.elapsed(),
    }
}
