//! spriteport CLI - Import Aseprite sprite sheets as animation artifacts
//!
//! This binary imports `.ase`/`.aseprite` files into sprite sheet, clip and
//! controller artifacts and manages the project's importer configuration.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use spriteport_cli::commands;
use spriteport_cli::commands::import::ImportOptions;

/// spriteport - Aseprite animation importer
#[derive(Parser)]
#[command(name = "spriteport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import Aseprite files (or directories of them)
    Import {
        /// Files or directories to import
        #[arg(required = true)]
        paths: Vec<String>,

        /// Also build a base controller for each file
        #[arg(long, conflicts_with = "override_base")]
        controller: bool,

        /// Also build an override controller re-skinning this base controller
        #[arg(long, value_name = "FILE")]
        override_base: Option<String>,

        /// Project directory holding .spriteport/importer.json (default: current directory)
        #[arg(long)]
        project: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,

        /// Show per-stage progress and every artifact
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show or edit the importer configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,

        /// Project directory holding .spriteport/importer.json (default: current directory)
        #[arg(long, global = true)]
        project: Option<String>,
    },

    /// Check Aseprite availability and configuration
    Doctor {
        /// Project directory holding .spriteport/importer.json (default: current directory)
        #[arg(long)]
        project: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the configuration
    Show {
        /// Output the configuration as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set one configuration key
    Set {
        /// Key to set (e.g. sprite_alignment, pixels_per_unit)
        key: String,

        /// New value
        value: String,
    },

    /// Add a non-looping rule (regex, or literal text if not a valid regex)
    AddRule {
        rule: String,
    },

    /// Remove the non-looping rule at INDEX (as listed by `config show`)
    RemoveRule {
        index: usize,
    },

    /// Restore the default configuration
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            paths,
            controller,
            override_base,
            project,
            json,
            verbose,
        } => commands::import::run(&ImportOptions {
            paths: &paths,
            controller,
            override_base: override_base.as_deref(),
            project: project.as_deref(),
            json,
            verbose,
        }),
        Commands::Config { action, project } => {
            let project = project.as_deref();
            match action {
                ConfigCommands::Show { json } => commands::config::show(project, json),
                ConfigCommands::Set { key, value } => commands::config::set(project, &key, &value),
                ConfigCommands::AddRule { rule } => commands::config::add_rule(project, &rule),
                ConfigCommands::RemoveRule { index } => {
                    commands::config::remove_rule(project, index)
                }
                ConfigCommands::Reset => commands::config::reset(project),
            }
        }
        Commands::Doctor { project } => commands::doctor::run(project.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_import() {
        let cli = Cli::try_parse_from([
            "spriteport",
            "import",
            "art/hero.aseprite",
            "art/enemies",
            "--controller",
        ])
        .unwrap();
        match cli.command {
            Commands::Import {
                paths,
                controller,
                override_base,
                json,
                ..
            } => {
                assert_eq!(paths, vec!["art/hero.aseprite", "art/enemies"]);
                assert!(controller);
                assert!(override_base.is_none());
                assert!(!json);
            }
            _ => panic!("expected import command"),
        }
    }

    #[test]
    fn test_cli_parses_import_with_override() {
        let cli = Cli::try_parse_from([
            "spriteport",
            "import",
            "knight.ase",
            "--override-base",
            "hero.controller.json",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Import {
                override_base,
                json,
                ..
            } => {
                assert_eq!(override_base.as_deref(), Some("hero.controller.json"));
                assert!(json);
            }
            _ => panic!("expected import command"),
        }
    }

    #[test]
    fn test_cli_rejects_controller_with_override() {
        let err = Cli::try_parse_from([
            "spriteport",
            "import",
            "knight.ase",
            "--controller",
            "--override-base",
            "hero.controller.json",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn test_cli_requires_import_paths() {
        assert!(Cli::try_parse_from(["spriteport", "import"]).is_err());
    }

    #[test]
    fn test_cli_parses_config_set() {
        let cli = Cli::try_parse_from([
            "spriteport",
            "config",
            "set",
            "sprite_alignment",
            "bottom_center",
            "--project",
            "game",
        ])
        .unwrap();
        match cli.command {
            Commands::Config {
                action: ConfigCommands::Set { key, value },
                project,
            } => {
                assert_eq!(key, "sprite_alignment");
                assert_eq!(value, "bottom_center");
                assert_eq!(project.as_deref(), Some("game"));
            }
            _ => panic!("expected config set command"),
        }
    }

    #[test]
    fn test_cli_parses_config_rules() {
        let cli = Cli::try_parse_from(["spriteport", "config", "add-rule", "^die"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigCommands::AddRule { .. },
                ..
            }
        ));

        let cli = Cli::try_parse_from(["spriteport", "config", "remove-rule", "2"]).unwrap();
        match cli.command {
            Commands::Config {
                action: ConfigCommands::RemoveRule { index },
                ..
            } => assert_eq!(index, 2),
            _ => panic!("expected config remove-rule command"),
        }
    }

    #[test]
    fn test_cli_parses_doctor() {
        let cli = Cli::try_parse_from(["spriteport", "doctor"]).unwrap();
        assert!(matches!(cli.command, Commands::Doctor { project: None }));
    }
}
