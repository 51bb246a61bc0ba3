use std::path::PathBuf;
use std::time::Duration;

/// Default wall-clock bound per job.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Default stdout/stderr capture bound (50 MiB per stream).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 50 * 1024 * 1024;

/// Where the tool lives and how it may be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliSettings {
    /// Tool install directory; also the child's working directory.
    pub install_path: PathBuf,
    /// Runtime executable (e.g. `lua5.1`).
    pub runtime: String,
    /// CLI script relative to `install_path`.
    pub cli_script: String,
    /// Directory holding per-job files.
    pub work_dir: PathBuf,
    /// Wall-clock bound per job.
    pub timeout: Duration,
    /// Capture bound applied to each of stdout and stderr.
    pub max_output_bytes: usize,
    /// Maximum concurrent processes; `None` is unbounded.
    pub max_concurrent_jobs: Option<usize>,
}

impl CliSettings {
    /// Settings for `install_path` with default runtime, script, and bounds.
    #[must_use]
    pub fn new(install_path: impl Into<PathBuf>) -> Self {
        Self {
            install_path: install_path.into(),
            runtime: "lua5.1".to_string(),
            cli_script: "cli.lua".to_string(),
            work_dir: std::env::temp_dir(),
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            max_concurrent_jobs: None,
        }
    }

    /// Full path of the CLI script.
    #[must_use]
    pub fn cli_path(&self) -> PathBuf {
        self.install_path.join(&self.cli_script)
    }
}
