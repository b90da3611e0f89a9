//! Per-file import orchestration.
//!
//! One import runs through `Invoking -> Parsing -> Assembling ->
//! Synthesizing` and ends in `Done` or `Failed`. Nothing is written to the
//! output directory before the synthesizing stage, so a file that fails
//! earlier leaves no artifacts behind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use spriteport_backend_aseprite::{parse_metadata, Orchestrator, OrchestratorConfig};
use spriteport_spec::hash::blake3_hash;
use spriteport_spec::{
    ArtifactRecord, ClipArtifactRef, CompiledRules, ControllerArtifact, ExportRequest,
    ImportError, ImportResult, ImporterConfiguration, OverrideControllerArtifact, ParsedSheet,
    PipelineResult, SheetExporter, SpriteSheetArtifact,
};

use crate::assembler::{assemble, Assembly};
use crate::controller::{
    build_controller, build_override_controller, controller_path, find_controller,
    load_base_controller, load_existing, override_controller_path, write_controller,
};
use crate::synthesizer::{
    build_clip, build_sprite_sheet, load_json, source_base_name, write_if_changed, write_json,
    OutputLayout,
};

pub use spriteport_backend_aseprite::is_valid_source;

/// Stage of a single-file import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportStage {
    Invoking,
    Parsing,
    Assembling,
    Synthesizing,
    Done,
    Failed,
}

impl ImportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStage::Invoking => "invoking",
            ImportStage::Parsing => "parsing",
            ImportStage::Assembling => "assembling",
            ImportStage::Synthesizing => "synthesizing",
            ImportStage::Done => "done",
            ImportStage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives progress of imports. All methods default to doing nothing.
pub trait ImportObserver {
    /// A file moved to `stage`.
    fn stage_changed(&mut self, _path: &Path, _stage: ImportStage) {}

    /// File `index` (zero-based) of `total` is about to be imported.
    fn file_started(&mut self, _index: usize, _total: usize, _path: &Path) {}

    /// File `index` of `total` finished, successfully or not.
    fn file_finished(&mut self, _index: usize, _total: usize, _path: &Path, _ok: bool) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ImportObserver for NoopObserver {}

/// What controller, if any, to produce after importing animations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControllerTarget {
    /// Animations only.
    #[default]
    None,
    /// Animations plus a base controller named after the source.
    Base,
    /// Animations plus an override controller re-skinning `base`.
    Override { base: PathBuf },
}

/// Returns an orchestrator configured from `config`.
pub fn orchestrator_for(config: &ImporterConfiguration) -> Orchestrator {
    Orchestrator::with_config(OrchestratorConfig::from_settings(&config.tool))
}

/// Returns true if the external tool can be resolved with `config`.
pub fn can_import(config: &ImporterConfiguration) -> bool {
    orchestrator_for(config).is_available()
}

/// Runs imports against one configuration and one exporter.
///
/// The configuration is borrowed for the importer's lifetime and never
/// modified.
pub struct Importer<'a> {
    config: &'a ImporterConfiguration,
    exporter: &'a dyn SheetExporter,
    rules: CompiledRules,
}

impl<'a> Importer<'a> {
    pub fn new(config: &'a ImporterConfiguration, exporter: &'a dyn SheetExporter) -> Self {
        Self {
            config,
            exporter,
            rules: config.non_looping_rules.compile(),
        }
    }

    pub fn config(&self) -> &ImporterConfiguration {
        self.config
    }

    pub fn exporter(&self) -> &dyn SheetExporter {
        self.exporter
    }

    /// Imports one source file.
    pub fn import(&self, source: &Path) -> PipelineResult<ImportResult> {
        self.import_observed(source, &mut NoopObserver)
    }

    /// Imports one source file, reporting stage transitions to `observer`.
    pub fn import_observed(
        &self,
        source: &Path,
        observer: &mut dyn ImportObserver,
    ) -> PipelineResult<ImportResult> {
        let outcome = self.run_stages(source, observer);
        let last = if outcome.is_ok() {
            ImportStage::Done
        } else {
            ImportStage::Failed
        };
        observer.stage_changed(source, last);
        outcome
    }

    fn run_stages(
        &self,
        source: &Path,
        observer: &mut dyn ImportObserver,
    ) -> PipelineResult<ImportResult> {
        observer.stage_changed(source, ImportStage::Invoking);
        check_source(source)?;
        let staging = tempfile::Builder::new()
            .prefix("spriteport-")
            .tempdir()
            .map_err(|e| {
                ImportError::external_tool(
                    source,
                    format!("cannot create staging directory: {e}"),
                    None,
                )
            })?;
        let request = ExportRequest::in_staging_dir(source, staging.path());
        self.exporter.export(&request)?;
        for output in [&request.sheet_path, &request.data_path] {
            if !output.is_file() {
                return Err(ImportError::external_tool(
                    source,
                    format!("tool did not produce {}", output.display()),
                    None,
                ));
            }
        }

        observer.stage_changed(source, ImportStage::Parsing);
        let sheet = read_sheet(source, &request.data_path)?;

        observer.stage_changed(source, ImportStage::Assembling);
        let base_name = source_base_name(source);
        let assembly = assemble(source, &base_name, &sheet.frames, &self.rules)?;

        observer.stage_changed(source, ImportStage::Synthesizing);
        self.synthesize(source, &request, sheet, assembly)
    }

    fn synthesize(
        &self,
        source: &Path,
        request: &ExportRequest,
        sheet: ParsedSheet,
        assembly: Assembly,
    ) -> PipelineResult<ImportResult> {
        let layout = OutputLayout::new(source, self.config);
        let clip_files = clip_paths(&layout, &assembly)?;

        let sheet_path = layout.sprite_sheet_path();
        let sheet_ref = layout.relative(&sheet_path);
        let existing: Option<SpriteSheetArtifact> = load_json(&sheet_path)?;

        let texture_bytes = fs::read(&request.sheet_path)
            .map_err(|e| ImportError::write_failure(&request.sheet_path, e))?;
        let texture_path = layout.texture_path();
        let texture_status = write_if_changed(&texture_path, &texture_bytes)?;
        let sprite_sheet = build_sprite_sheet(
            &layout.relative(&texture_path),
            &blake3_hash(&texture_bytes),
            (sheet.meta.width, sheet.meta.height),
            &sheet.frames,
            self.config,
            existing.as_ref(),
        );
        let sheet_status = write_json(&sheet_path, &sprite_sheet)?;

        let mut clip_artifacts = Vec::with_capacity(assembly.clips.len());
        for (clip, path) in assembly.clips.iter().zip(clip_files) {
            let artifact = build_clip(clip, &sprite_sheet, &sheet_ref, self.config);
            let status = write_json(&path, &artifact)?;
            clip_artifacts.push(ClipArtifactRef {
                clip_name: clip.name.clone(),
                relative_path: layout.relative(&path),
                path,
                status,
            });
        }

        Ok(ImportResult {
            source_asset_path: source.to_path_buf(),
            base_name: layout.base_name.clone(),
            output_dir: layout.source_dir.clone(),
            has_animations: !assembly.clips.is_empty(),
            declared_tags: sheet.declared_tag_names(),
            clips: assembly.clips,
            sprite_artifacts: vec![
                ArtifactRecord {
                    path: texture_path,
                    status: texture_status,
                },
                ArtifactRecord {
                    path: sheet_path,
                    status: sheet_status,
                },
            ],
            clip_artifacts,
            rule_matches: assembly.rule_matches,
        })
    }

    /// Writes the controller `target` asks for, merging into existing files.
    ///
    /// Returns `Ok(None)` for [`ControllerTarget::None`].
    pub fn build_controller(
        &self,
        result: &ImportResult,
        target: &ControllerTarget,
    ) -> PipelineResult<Option<ArtifactRecord>> {
        match target {
            ControllerTarget::None => Ok(None),
            ControllerTarget::Base => {
                let mut path = controller_path(result);
                if self.config.automatic_controller_discovery && !path.is_file() {
                    if let Some(found) = find_controller(result) {
                        path = found;
                    }
                }
                let existing: Option<ControllerArtifact> = load_existing(&path)?;
                let controller = build_controller(result, existing);
                write_controller(&path, &controller).map(Some)
            }
            ControllerTarget::Override { base } => {
                let base = load_base_controller(&result.source_asset_path, base)?;
                let path = override_controller_path(result);
                let existing: Option<OverrideControllerArtifact> = load_existing(&path)?;
                let controller = build_override_controller(result, Some(&base), existing)?;
                write_controller(&path, &controller).map(Some)
            }
        }
    }
}

fn check_source(source: &Path) -> PipelineResult<()> {
    if !is_valid_source(source) {
        return Err(ImportError::external_tool(
            source,
            "not an Aseprite file (expected .ase or .aseprite)",
            None,
        ));
    }
    if !source.is_file() {
        return Err(ImportError::external_tool(
            source,
            "source file does not exist",
            None,
        ));
    }
    Ok(())
}

/// Artifact path of every clip, in clip order.
///
/// Fails before anything is written when two clip names map to one file.
/// Paths are compared case-insensitively.
fn clip_paths(layout: &OutputLayout, assembly: &Assembly) -> PipelineResult<Vec<PathBuf>> {
    let mut claimed: HashMap<String, &str> = HashMap::new();
    let mut paths = Vec::with_capacity(assembly.clips.len());
    for clip in &assembly.clips {
        let path = layout.clip_path(&clip.name);
        let key = path.to_string_lossy().to_lowercase();
        if let Some(first) = claimed.insert(key, &clip.name) {
            return Err(ImportError::clip_file_collision(path, first, &clip.name));
        }
        paths.push(path);
    }
    Ok(paths)
}

fn read_sheet(source: &Path, data_path: &Path) -> PipelineResult<ParsedSheet> {
    let json = fs::read_to_string(data_path).map_err(|e| {
        ImportError::malformed(source, format!("cannot read {}: {e}", data_path.display()))
    })?;
    parse_metadata(&json).map_err(|e| ImportError::malformed(source, e.to_string()))
}
