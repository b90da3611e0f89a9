//! Machine-readable output for `--json`.

use serde::Serialize;
use spriteport_import::{BatchReport, ImportedFile};
use spriteport_spec::{ArtifactRecord, BackendError, ConfigError, ImportError, RuleMatch};

/// JSON document printed by `spriteport import --json`.
#[derive(Debug, Serialize)]
pub struct BatchJson {
    pub success: bool,
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
    pub files: Vec<FileJson>,
}

/// One file of a batch.
#[derive(Debug, Serialize)]
pub struct FileJson {
    pub path: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clips: Option<Vec<ClipJson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<ArtifactRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<ArtifactRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_matches: Vec<RuleMatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmatched_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorJson>,
}

#[derive(Debug, Serialize)]
pub struct ClipJson {
    pub name: String,
    pub frames: usize,
    pub duration_ms: u64,
    pub loops: bool,
}

/// A coded error.
#[derive(Debug, Serialize)]
pub struct ErrorJson {
    pub code: String,
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl ErrorJson {
    fn from_import(error: &ImportError) -> Self {
        Self {
            code: error.code().to_string(),
            kind: error.kind().to_string(),
            message: error.message(),
            stderr: error.stderr().map(str::to_string),
        }
    }
}

pub fn batch_json(report: &BatchReport) -> BatchJson {
    let files = report
        .outcomes
        .iter()
        .map(|outcome| {
            let path = outcome.path.display().to_string();
            match &outcome.outcome {
                Ok(file) => success_json(path, file),
                Err(error) => FileJson {
                    path,
                    success: false,
                    clips: None,
                    artifacts: None,
                    controller: None,
                    rule_matches: Vec::new(),
                    unmatched_tags: Vec::new(),
                    error: Some(ErrorJson::from_import(error)),
                },
            }
        })
        .collect();

    BatchJson {
        success: report.is_success(),
        total: report.total(),
        imported: report.success_count(),
        failed: report.failure_count(),
        elapsed_ms: report.elapsed.as_millis() as u64,
        files,
    }
}

fn success_json(path: String, file: &ImportedFile) -> FileJson {
    let result = &file.result;
    FileJson {
        path,
        success: true,
        clips: Some(
            result
                .clips
                .iter()
                .map(|clip| ClipJson {
                    name: clip.name.clone(),
                    frames: clip.frame_count(),
                    duration_ms: clip.total_duration_ms(),
                    loops: clip.loops,
                })
                .collect(),
        ),
        artifacts: Some(result.artifacts()),
        controller: file.controller.clone(),
        rule_matches: result.rule_matches.clone(),
        unmatched_tags: result
            .unmatched_tags()
            .into_iter()
            .map(str::to_string)
            .collect(),
        error: None,
    }
}

pub fn config_errors_json(errors: &[ConfigError]) -> serde_json::Value {
    let errors: Vec<ErrorJson> = errors
        .iter()
        .map(|e| ErrorJson {
            code: e.code().to_string(),
            kind: e.category().to_string(),
            message: e.message(),
            stderr: None,
        })
        .collect();
    serde_json::json!({
        "success": false,
        "errors": errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use spriteport_import::FileOutcome;
    use std::path::PathBuf;

    #[test]
    fn test_failed_file_json() {
        let report = BatchReport {
            outcomes: vec![FileOutcome {
                path: PathBuf::from("art/hero.aseprite"),
                outcome: Err(ImportError::external_tool(
                    "art/hero.aseprite",
                    "exit status 2",
                    Some("bad file".to_string()),
                )),
            }],
            elapsed: std::time::Duration::from_millis(12),
        };

        let json = serde_json::to_value(batch_json(&report)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["files"][0]["error"]["code"], "E001");
        assert_eq!(json["files"][0]["error"]["kind"], "ExternalToolFailure");
        assert_eq!(json["files"][0]["error"]["stderr"], "bad file");
        assert!(json["files"][0].get("clips").is_none());
    }
}
