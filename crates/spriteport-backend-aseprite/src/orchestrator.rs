//! Aseprite subprocess orchestrator.
//!
//! Resolves the Aseprite executable, expands the argument template for one
//! source file and runs the process to completion with a timeout.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use spriteport_spec::config::{default_tool_args, DEFAULT_TOOL_TIMEOUT_SECS};
use spriteport_spec::{ExportRequest, ImportError, PipelineResult, SheetExporter, ToolSettings};

use crate::error::{ToolError, ToolResult};

/// Environment variable consulted when no path is configured.
pub const TOOL_PATH_ENV: &str = "ASEPRITE_PATH";

/// Placeholder for the source file in the argument template.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder for the sheet image output.
pub const SHEET_PLACEHOLDER: &str = "{sheet}";
/// Placeholder for the metadata output.
pub const DATA_PLACEHOLDER: &str = "{data}";

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Explicit executable path.
    pub tool_path: Option<PathBuf>,
    /// Argument template.
    pub args: Vec<String>,
    /// Timeout for one run.
    pub timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tool_path: None,
            args: default_tool_args(),
            timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        }
    }
}

impl OrchestratorConfig {
    /// Builds a config from the importer's tool settings.
    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self {
            tool_path: settings.path.clone(),
            args: settings.args.clone(),
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
        }
    }

    /// Sets the executable path.
    pub fn tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_path = Some(path.into());
        self
    }

    /// Replaces the argument template.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Output of a successful tool run.
#[derive(Debug, Clone)]
pub struct ToolRun {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// The Aseprite subprocess orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Creates a new orchestrator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new orchestrator with the given configuration.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Finds the Aseprite executable.
    ///
    /// A configured path wins and must exist. Otherwise `ASEPRITE_PATH`, the
    /// system `PATH` and common install locations are searched in that order.
    pub fn find_tool(&self) -> ToolResult<PathBuf> {
        if let Some(ref path) = self.config.tool_path {
            let path = normalize_tool_path(path);
            if path.exists() {
                return Ok(path);
            }
            // A bare name like "aseprite" is looked up on PATH.
            if path.components().count() == 1 {
                if let Ok(found) = which::which(&path) {
                    return Ok(found);
                }
            }
            return Err(ToolError::ConfiguredPathMissing { path });
        }

        if let Ok(path) = std::env::var(TOOL_PATH_ENV) {
            let path = normalize_tool_path(Path::new(&path));
            if path.exists() {
                return Ok(path);
            }
        }

        let names = if cfg!(windows) {
            vec!["aseprite.exe", "aseprite"]
        } else {
            vec!["aseprite"]
        };
        for name in names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        let common_paths = if cfg!(windows) {
            vec![
                "C:\\Program Files\\Aseprite\\Aseprite.exe",
                "C:\\Program Files (x86)\\Aseprite\\Aseprite.exe",
                "C:\\Program Files (x86)\\Steam\\steamapps\\common\\Aseprite\\Aseprite.exe",
            ]
        } else if cfg!(target_os = "macos") {
            vec![
                "/Applications/Aseprite.app/Contents/MacOS/aseprite",
                "/Applications/Steam.app/Contents/MacOS/Aseprite.app/Contents/MacOS/aseprite",
            ]
        } else {
            vec![
                "/usr/bin/aseprite",
                "/usr/local/bin/aseprite",
                "/opt/aseprite/aseprite",
            ]
        };
        for path_str in common_paths {
            let path = PathBuf::from(path_str);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(ToolError::ToolNotFound)
    }

    /// Returns true when the tool can be resolved.
    pub fn is_available(&self) -> bool {
        self.find_tool().is_ok()
    }

    /// Asks the tool for its version string.
    pub fn version(&self) -> ToolResult<String> {
        let tool = self.find_tool()?;
        let output = Command::new(&tool)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(ToolError::SpawnFailed)?;
        if !output.status.success() {
            return Err(ToolError::process_failed(
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Runs the tool for one source file and checks both outputs exist.
    pub fn run(&self, request: &ExportRequest) -> ToolResult<ToolRun> {
        let tool = self.find_tool()?;
        let args = expand_args(&self.config.args, request)?;

        if let Some(parent) = request.data_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if let Some(parent) = request.sheet_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut cmd = Command::new(&tool);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = Instant::now();
        let child = cmd.spawn().map_err(ToolError::SpawnFailed)?;
        let (status, stdout, stderr) = wait_with_timeout(child, self.config.timeout)?;

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            return Err(ToolError::process_failed(exit_code, stdout, stderr));
        }

        for path in [&request.data_path, &request.sheet_path] {
            if !path.is_file() {
                return Err(ToolError::OutputNotFound { path: path.clone() });
            }
        }

        Ok(ToolRun {
            stdout,
            stderr,
            elapsed: start.elapsed(),
        })
    }
}

impl SheetExporter for Orchestrator {
    fn export(&self, request: &ExportRequest) -> PipelineResult<()> {
        self.run(request).map(|_| ()).map_err(|err| {
            let diagnostics = err.diagnostics();
            ImportError::external_tool(&request.input, err.to_string(), diagnostics)
        })
    }

    fn describe(&self) -> String {
        match self.find_tool() {
            Ok(path) => format!("aseprite ({})", path.display()),
            Err(err) => format!("aseprite (unavailable: {err})"),
        }
    }
}

/// Maps a macOS application bundle to the executable inside it.
pub fn normalize_tool_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "app") && path.is_dir() {
        return path.join("Contents").join("MacOS").join("aseprite");
    }
    path.to_path_buf()
}

/// Substitutes the request paths into the argument template.
///
/// Every placeholder must appear in the template; other brace groups are
/// passed through untouched.
pub fn expand_args(template: &[String], request: &ExportRequest) -> ToolResult<Vec<String>> {
    for placeholder in [INPUT_PLACEHOLDER, SHEET_PLACEHOLDER, DATA_PLACEHOLDER] {
        if !template.iter().any(|arg| arg.contains(placeholder)) {
            return Err(ToolError::MissingPlaceholder { placeholder });
        }
    }

    let input = request.input.to_string_lossy();
    let sheet = request.sheet_path.to_string_lossy();
    let data = request.data_path.to_string_lossy();

    Ok(template
        .iter()
        .map(|arg| {
            arg.replace(INPUT_PLACEHOLDER, &input)
                .replace(SHEET_PLACEHOLDER, &sheet)
                .replace(DATA_PLACEHOLDER, &data)
        })
        .collect())
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).to_string()
        })
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// How long captured output is waited for after a timeout kill.
const KILL_DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Joins a drain thread unless it is still blocked after `grace`.
///
/// A killed tool can leave a child process holding the pipe open; its
/// output is dropped rather than waited for.
fn join_within(handle: Option<JoinHandle<String>>, grace: Duration) -> String {
    let Some(handle) = handle else {
        return String::new();
    };
    let start = Instant::now();
    while !handle.is_finished() {
        if start.elapsed() > grace {
            return String::new();
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    handle.join().unwrap_or_default()
}

fn wait_with_timeout(mut child: Child, timeout: Duration) -> ToolResult<(ExitStatus, String, String)> {
    // Drain both pipes concurrently so a chatty tool cannot block on a full pipe.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ToolError::Timeout {
                        timeout_secs: timeout.as_secs(),
                        stdout: join_within(stdout, KILL_DRAIN_GRACE),
                        stderr: join_within(stderr, KILL_DRAIN_GRACE),
                    });
                }
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(e) => return Err(ToolError::SpawnFailed(e)),
        }
    };

    Ok((status, join(stdout), join(stderr)))
}
