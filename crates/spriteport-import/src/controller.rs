//! Base and override controller synthesis.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use spriteport_spec::{
    ArtifactRecord, ControllerArtifact, ControllerState, ImportError, ImportResult,
    OverrideControllerArtifact, OverrideEntry, PipelineResult, CONTROLLER_SUFFIX,
    OVERRIDE_CONTROLLER_SUFFIX,
};

use crate::synthesizer::{load_json, relative_reference, write_json};

/// A loaded base controller that an override refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseController {
    pub path: PathBuf,
    pub artifact: ControllerArtifact,
}

/// Path of the base controller written for `result`.
pub fn controller_path(result: &ImportResult) -> PathBuf {
    result
        .output_dir
        .join(format!("{}{}", result.base_name, CONTROLLER_SUFFIX))
}

/// Path of the override controller written for `result`.
pub fn override_controller_path(result: &ImportResult) -> PathBuf {
    result
        .output_dir
        .join(format!("{}{}", result.base_name, OVERRIDE_CONTROLLER_SUFFIX))
}

/// Searches below the output directory for a base controller named after
/// `result`. Directories are walked in sorted order and the first match wins.
pub fn find_controller(result: &ImportResult) -> Option<PathBuf> {
    let file_name = format!("{}{}", result.base_name, CONTROLLER_SUFFIX);
    WalkDir::new(&result.output_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name().to_string_lossy() == file_name)
        .map(|e| e.into_path())
}

/// Merges the clips of `result` into a base controller.
///
/// Existing states named after a clip are rebound to the new clip artifact,
/// missing ones are appended, and no state is ever removed. The first state
/// becomes the default when none is set.
pub fn build_controller(
    result: &ImportResult,
    existing: Option<ControllerArtifact>,
) -> ControllerArtifact {
    let mut controller =
        existing.unwrap_or_else(|| ControllerArtifact::new(result.base_name.clone()));

    for clip in &result.clip_artifacts {
        match controller
            .states
            .iter_mut()
            .find(|s| s.name == clip.clip_name)
        {
            Some(state) => state.clip = clip.relative_path.clone(),
            None => controller.states.push(ControllerState {
                name: clip.clip_name.clone(),
                clip: clip.relative_path.clone(),
            }),
        }
    }

    if controller.default_state.is_none() {
        controller.default_state = controller.states.first().map(|s| s.name.clone());
    }
    controller
}

/// Builds an override controller re-skinning `base` with the clips of
/// `result`.
///
/// Only clips whose name matches a base state are used. Entries of `existing`
/// for other slots are kept. Fails with [`ImportError::NoBaseController`]
/// when `base` is `None`.
pub fn build_override_controller(
    result: &ImportResult,
    base: Option<&BaseController>,
    existing: Option<OverrideControllerArtifact>,
) -> PipelineResult<OverrideControllerArtifact> {
    let base = base.ok_or_else(|| {
        ImportError::no_base_controller(
            &result.source_asset_path,
            "an override controller needs a base controller",
        )
    })?;

    let base_ref = relative_reference(&result.output_dir, &base.path);
    let mut controller = existing
        .unwrap_or_else(|| OverrideControllerArtifact::new(result.base_name.clone(), ""));
    controller.base_controller = base_ref;

    for clip in &result.clip_artifacts {
        if !base.artifact.has_state(&clip.clip_name) {
            continue;
        }
        match controller
            .overrides
            .iter_mut()
            .find(|o| o.slot == clip.clip_name)
        {
            Some(entry) => entry.clip = clip.relative_path.clone(),
            None => controller.overrides.push(OverrideEntry {
                slot: clip.clip_name.clone(),
                clip: clip.relative_path.clone(),
            }),
        }
    }
    Ok(controller)
}

/// Loads the base controller an override will refer to.
///
/// A missing, unreadable or corrupt file is a
/// [`ImportError::NoBaseController`] for `source`.
pub fn load_base_controller(source: &Path, path: &Path) -> PipelineResult<BaseController> {
    match load_json::<ControllerArtifact>(path) {
        Ok(Some(artifact)) => Ok(BaseController {
            path: path.to_path_buf(),
            artifact,
        }),
        Ok(None) => Err(ImportError::no_base_controller(
            source,
            format!("{} does not exist", path.display()),
        )),
        Err(e) => Err(ImportError::no_base_controller(
            source,
            format!("cannot load {}: {}", path.display(), error_detail(&e)),
        )),
    }
}

/// Loads an existing controller artifact of either kind.
pub fn load_existing<T: serde::de::DeserializeOwned>(path: &Path) -> PipelineResult<Option<T>> {
    load_json(path)
}

/// Writes a controller artifact if its content changed.
pub fn write_controller<T: serde::Serialize>(
    path: &Path,
    artifact: &T,
) -> PipelineResult<ArtifactRecord> {
    let status = write_json(path, artifact)?;
    Ok(ArtifactRecord {
        path: path.to_path_buf(),
        status,
    })
}

fn error_detail(err: &ImportError) -> String {
    match std::error::Error::source(err) {
        Some(source) => source.to_string(),
        None => err.to_string(),
    }
}
