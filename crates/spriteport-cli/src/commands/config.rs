//! Config command implementation
//!
//! Shows and edits the project's importer configuration.

use anyhow::{Context, Result};
use colored::Colorize;
use spriteport_spec::{BackendError, ConfigSession, ImporterConfiguration, CONFIG_KEYS};
use std::process::ExitCode;

use crate::config_store::ConfigStore;

/// Print the configuration.
pub fn show(project: Option<&str>, json: bool) -> Result<ExitCode> {
    let store = ConfigStore::resolve(project);
    let session = store.load()?;
    let config = session.config();

    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(ExitCode::SUCCESS);
    }

    let source = if store.exists() {
        store.path().display().to_string()
    } else {
        format!("{} (defaults, not saved yet)", store.path().display())
    };
    println!("{} {}", "Configuration:".blue().bold(), source);
    println!();
    for (key, value) in describe(config) {
        println!("  {:<32} {}", key, value);
    }
    println!();
    println!("{}", "Non-looping rules:".bold());
    if config.non_looping_rules.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (i, rule) in config.non_looping_rules.compile().iter().enumerate() {
        let kind = if rule.is_literal() { "literal" } else { "regex" };
        println!("  [{}] {} {}", i, rule.source, kind.dimmed());
    }

    if let Err(errors) = config.validate() {
        println!();
        for error in errors {
            println!("  {} [{}] {}", "!!".yellow(), error.code(), error);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Set one key.
pub fn set(project: Option<&str>, key: &str, value: &str) -> Result<ExitCode> {
    edit(project, |session| {
        session.edit(|c| c.set(key, value)).map_err(|e| {
            anyhow::anyhow!("{} (known keys: {})", e, CONFIG_KEYS.join(", "))
        })?;
        Ok(format!("{} = {}", key, value))
    })
}

/// Append a non-looping rule.
pub fn add_rule(project: Option<&str>, rule: &str) -> Result<ExitCode> {
    edit(project, |session| {
        session.edit(|c| {
            if c.non_looping_rules.add(rule) {
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "Rule '{}' is empty or already registered",
                    rule
                ))
            }
        })?;
        let compiled = spriteport_spec::CompiledRule::compile(rule);
        let kind = if compiled.is_literal() {
            "literal substring (not a valid regex)"
        } else {
            "regex"
        };
        Ok(format!("added non-looping rule '{}' as {}", rule, kind))
    })
}

/// Remove the rule at `index` as listed by `config show`.
pub fn remove_rule(project: Option<&str>, index: usize) -> Result<ExitCode> {
    edit(project, |session| {
        let removed = session.edit(|c| {
            let len = c.non_looping_rules.len();
            c.non_looping_rules
                .remove(index)
                .ok_or_else(|| anyhow::anyhow!("No rule at index {} ({} rules)", index, len))
        })?;
        Ok(format!("removed non-looping rule '{}'", removed))
    })
}

/// Restore the defaults.
pub fn reset(project: Option<&str>) -> Result<ExitCode> {
    edit(project, |session| {
        *session = ConfigSession::new(ImporterConfiguration::default());
        session.mark_dirty();
        Ok("configuration reset to defaults".to_string())
    })
}

/// Loads, applies `f`, validates and saves when dirty.
fn edit(
    project: Option<&str>,
    f: impl FnOnce(&mut ConfigSession) -> Result<String>,
) -> Result<ExitCode> {
    let store = ConfigStore::resolve(project);
    let mut session = store.load()?;
    let summary = f(&mut session)?;

    if let Err(errors) = session.config().validate() {
        for error in &errors {
            eprintln!("{} [{}] {}", "error".red(), error.code(), error);
        }
        return Ok(ExitCode::from(1));
    }

    store
        .save_if_dirty(&mut session)
        .context("Failed to save importer configuration")?;
    println!("{} {}", "ok".green(), summary);
    Ok(ExitCode::SUCCESS)
}

/// Scalar settings as display rows.
fn describe(config: &ImporterConfiguration) -> Vec<(&'static str, String)> {
    vec![
        (
            "tool_path",
            config
                .tool
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(auto)".to_string()),
        ),
        ("tool_args", config.tool.args.join(" ")),
        ("tool_timeout_secs", config.tool.timeout_secs.to_string()),
        (
            "target_object_kind",
            config.target_object_kind.as_str().to_string(),
        ),
        ("sprite_alignment", config.sprite_alignment.as_str().to_string()),
        (
            "custom_pivot",
            format!("{}, {}", config.custom_pivot.x, config.custom_pivot.y),
        ),
        ("pixels_per_unit", config.pixels_per_unit.to_string()),
        ("clip_frame_rate", config.clip_frame_rate.to_string()),
        (
            "save_sprites_to_subfolder",
            config.save_sprites_to_subfolder.to_string(),
        ),
        (
            "save_animations_to_subfolder",
            config.save_animations_to_subfolder.to_string(),
        ),
        (
            "automatic_controller_discovery",
            config.automatic_controller_discovery.to_string(),
        ),
    ]
}
