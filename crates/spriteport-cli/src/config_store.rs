//! JSON persistence of the importer configuration.
//!
//! The configuration lives at `<project>/.spriteport/importer.json`. It is
//! loaded once per invocation and written back only when the session was
//! marked dirty.

use anyhow::{Context, Result};
use spriteport_spec::{ConfigSession, ImporterConfiguration};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding project-local settings.
pub const STORE_DIR: &str = ".spriteport";
/// Configuration file name inside [`STORE_DIR`].
pub const STORE_FILE: &str = "importer.json";

/// Location of one project's configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store for the project rooted at `project_dir`.
    pub fn for_project(project_dir: &Path) -> Self {
        Self {
            path: project_dir.join(STORE_DIR).join(STORE_FILE),
        }
    }

    /// Store for `--project`, defaulting to the current directory.
    pub fn resolve(project: Option<&str>) -> Self {
        Self::for_project(Path::new(project.unwrap_or(".")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the configuration, or the defaults when no file exists yet.
    pub fn load(&self) -> Result<ConfigSession> {
        if !self.exists() {
            return Ok(ConfigSession::new(ImporterConfiguration::default()));
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read configuration: {}", self.path.display()))?;
        let config: ImporterConfiguration = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse configuration: {}", self.path.display()))?;
        Ok(ConfigSession::new(config))
    }

    /// Writes the configuration if the session is dirty.
    ///
    /// Returns true if the file was written.
    pub fn save_if_dirty(&self, session: &mut ConfigSession) -> Result<bool> {
        if !session.is_dirty() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let mut json = serde_json::to_string_pretty(session.config())?;
        json.push('\n');
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write configuration: {}", self.path.display()))?;
        session.mark_clean();
        Ok(true)
    }
}
