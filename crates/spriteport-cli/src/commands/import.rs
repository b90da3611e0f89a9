//! Import command implementation
//!
//! Imports Aseprite files (or directories of them) into sprite, clip and
//! controller artifacts and prints a per-file summary.

use anyhow::Result;
use colored::Colorize;
use spriteport_import::{
    can_import, import_batch, orchestrator_for, BatchReport, ControllerTarget, ImportObserver,
    ImportStage, Importer,
};
use spriteport_spec::{ArtifactStatus, BackendError, SheetExporter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::json_output::{batch_json, config_errors_json};
use crate::config_store::ConfigStore;
use crate::input::expand_sources;

/// Options of one `spriteport import` invocation.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions<'a> {
    pub paths: &'a [String],
    pub controller: bool,
    pub override_base: Option<&'a str>,
    pub project: Option<&'a str>,
    pub json: bool,
    pub verbose: bool,
}

impl ImportOptions<'_> {
    fn controller_target(&self) -> ControllerTarget {
        match (self.override_base, self.controller) {
            (Some(base), _) => ControllerTarget::Override {
                base: PathBuf::from(base),
            },
            (None, true) => ControllerTarget::Base,
            (None, false) => ControllerTarget::None,
        }
    }
}

/// Run the import command
///
/// # Returns
/// Exit code: 0 if every file imported, 1 otherwise
pub fn run(options: &ImportOptions<'_>) -> Result<ExitCode> {
    let store = ConfigStore::resolve(options.project);
    let session = store.load()?;

    if let Err(errors) = session.config().validate() {
        if options.json {
            println!("{}", serde_json::to_string_pretty(&config_errors_json(&errors))?);
        } else {
            for error in &errors {
                eprintln!("{} [{}] {}", "error".red(), error.code(), error);
            }
            eprintln!("Fix with `spriteport config set <key> <value>`");
        }
        return Ok(ExitCode::from(1));
    }

    let set = expand_sources(options.paths);
    if !options.json {
        for ignored in &set.ignored {
            println!(
                "{} Skipping {} (not an .ase/.aseprite file)",
                "!!".yellow(),
                ignored.display()
            );
        }
    }
    if set.sources.is_empty() {
        anyhow::bail!("No Aseprite files found in the given paths");
    }

    let config = session.config();
    if !can_import(config) {
        anyhow::bail!(
            "Aseprite executable not found. Set it with `spriteport config set tool_path <PATH>` or the ASEPRITE_PATH environment variable"
        );
    }

    let exporter = orchestrator_for(config);
    let importer = Importer::new(config, &exporter);
    let target = options.controller_target();

    if !options.json {
        println!(
            "{} Importing {} file(s) with {}",
            "INFO".blue().bold(),
            set.sources.len(),
            exporter.describe()
        );
    }

    let mut observer = ProgressPrinter {
        verbose: options.verbose,
        quiet: options.json,
    };
    let report = import_batch(&importer, &set.sources, &target, &mut observer);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&batch_json(&report))?);
    } else {
        print_summary(&report, options.verbose);
    }

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Prints progress dots, or one line per stage with `--verbose`.
struct ProgressPrinter {
    verbose: bool,
    quiet: bool,
}

impl ImportObserver for ProgressPrinter {
    fn stage_changed(&mut self, path: &Path, stage: ImportStage) {
        if self.quiet || !self.verbose {
            return;
        }
        match stage {
            ImportStage::Done | ImportStage::Failed => {}
            _ => println!("    {} {}", stage.as_str().dimmed(), path.display()),
        }
    }

    fn file_started(&mut self, index: usize, total: usize, path: &Path) {
        if !self.quiet && self.verbose {
            println!("[{}/{}] {}", index + 1, total, path.display());
        }
    }

    fn file_finished(&mut self, index: usize, total: usize, _path: &Path, ok: bool) {
        if self.quiet {
            return;
        }
        if self.verbose {
            let marker = if ok { "ok".green() } else { "FAILED".red() };
            println!("  {}", marker);
        } else {
            let mark = if ok { ".".green() } else { "x".red() };
            print!("{}", mark);
            if index + 1 == total {
                println!();
            }
        }
    }
}

fn print_summary(report: &BatchReport, verbose: bool) {
    println!();
    for file in report.succeeded() {
        let result = &file.result;
        let artifacts = result.artifacts();
        let changed = artifacts
            .iter()
            .filter(|a| a.status != ArtifactStatus::Unchanged)
            .count();
        println!(
            "{} {} - {} clip(s), {} artifact(s) written, {} unchanged",
            "ok".green(),
            result.source_asset_path.display(),
            result.clips.len(),
            changed,
            artifacts.len() - changed
        );
        for clip in &result.clips {
            let policy = if clip.loops { "loop" } else { "once" };
            println!(
                "     {} ({} frames, {}ms, {})",
                clip.name,
                clip.frame_count(),
                clip.total_duration_ms(),
                policy.dimmed()
            );
        }
        if verbose {
            for artifact in &artifacts {
                println!(
                    "     {} {}",
                    artifact.status.to_string().dimmed(),
                    artifact.path.display()
                );
            }
        }
        if let Some(controller) = &file.controller {
            println!(
                "     controller {} ({})",
                controller.path.display(),
                controller.status
            );
        }
        let unmatched = result.unmatched_tags();
        if !unmatched.is_empty() {
            println!(
                "     {} declared tags without a clip: {} (check the frame naming)",
                "!!".yellow(),
                unmatched.join(", ")
            );
        }
    }

    if report.failure_count() > 0 {
        println!();
        println!("{}", "Failures:".red().bold());
        for (path, error) in report.failures() {
            println!(
                "  {} [{} {}] {}",
                "FAILED".red(),
                error.kind(),
                error.code(),
                path.display()
            );
            println!("     {}", error);
            if let Some(stderr) = error.stderr() {
                for line in stderr.lines() {
                    println!("     {}", line.dimmed());
                }
            }
        }
    }

    println!();
    println!(
        "{} {}  {} {}  {} {:.2}s",
        "Imported:".green().bold(),
        report.success_count(),
        "Failed:".red().bold(),
        report.failure_count(),
        "Time:".blue().bold(),
        report.elapsed.as_secs_f64()
    );
}
