//! Doctor command implementation
//!
//! Checks that Aseprite can be found and that the configuration is usable.

use anyhow::Result;
use colored::Colorize;
use spriteport_backend_aseprite::{ToolError, TOOL_PATH_ENV};
use spriteport_import::orchestrator_for;
use spriteport_spec::BackendError;
use std::env;
use std::process::ExitCode;

use crate::config_store::ConfigStore;

/// Run the doctor command
///
/// Checks:
/// - Configuration file
/// - Aseprite resolution and version
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(project: Option<&str>) -> Result<ExitCode> {
    println!("{}", "spriteport Doctor".cyan().bold());
    println!("{}", "=================".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} spriteport-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Configuration:".bold());
    let store = ConfigStore::resolve(project);
    let session = match store.load() {
        Ok(session) => {
            if store.exists() {
                println!("  {} {}", "ok".green(), store.path().display());
            } else {
                println!(
                    "  {} {} not found, using defaults",
                    "->".green(),
                    store.path().display()
                );
            }
            session
        }
        Err(e) => {
            println!("  {} {:#}", "!!".red(), e);
            println!();
            println!(
                "{} Some checks failed. See above for details.",
                "WARNING".yellow().bold()
            );
            return Ok(ExitCode::from(1));
        }
    };
    let config = session.config();
    if let Err(errors) = config.validate() {
        all_ok = false;
        for error in errors {
            println!("  {} [{}] {}", "!!".red(), error.code(), error);
        }
    }
    println!();

    println!("{}", "Dependencies:".bold());
    let orchestrator = orchestrator_for(config);
    match orchestrator.find_tool() {
        Ok(path) => {
            println!("  {} Aseprite at {}", "ok".green(), path.display());
            match orchestrator.version() {
                Ok(version) => println!("  {} {}", "->".green(), version),
                Err(e) => println!("  {} version check failed: {}", "!!".yellow(), e),
            }
        }
        Err(e) => {
            all_ok = false;
            println!("  {} [{}] {}", "!!".red(), e.code(), e);
            if matches!(e, ToolError::ToolNotFound) {
                println!(
                    "     {}",
                    format!(
                        "Set tool_path with `spriteport config set tool_path <PATH>` or export {}.",
                        TOOL_PATH_ENV
                    )
                    .dimmed()
                );
            }
        }
    }
    if let Ok(value) = env::var(TOOL_PATH_ENV) {
        println!("  {} {}={}", "->".green(), TOOL_PATH_ENV, value);
    }

    println!();
    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}
