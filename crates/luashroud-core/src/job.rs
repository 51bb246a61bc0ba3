//! Job identifiers and the temporary files backing one invocation.
//!
//! [`JobFiles`] removes every artifact when dropped, so cleanup also runs when the
//! owning future is cancelled mid-invocation.

use std::fmt::{self, Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::document::ConfigDocument;
use crate::error::{ObfuscateError, ObfuscateResult};

const SUFFIX_LEN: usize = 8;

/// Collision-resistant job identifier: `<unix-millis>_<8 lowercase alphanumerics>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|byte| char::from(byte).to_ascii_lowercase())
            .collect();
        Self(format!("{}_{suffix}", Utc::now().timestamp_millis()))
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for JobId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Input, output, and config paths for one job.
#[derive(Debug)]
pub struct JobFiles {
    id: JobId,
    input: PathBuf,
    output: PathBuf,
    config: PathBuf,
}

impl JobFiles {
    /// Derive the artifact paths for `id` inside `work_dir`. Nothing is created yet.
    #[must_use]
    pub fn new(work_dir: &Path, id: JobId) -> Self {
        Self {
            input: work_dir.join(format!("input_{id}.lua")),
            output: work_dir.join(format!("output_{id}.lua")),
            config: work_dir.join(format!("config_{id}.lua")),
            id,
        }
    }

    /// Job identifier.
    #[must_use]
    pub const fn id(&self) -> &JobId {
        &self.id
    }

    /// Path of the source file handed to the tool.
    #[must_use]
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    /// Path the tool writes its result to.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Path of the generated config file.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config
    }

    /// Write the source text.
    ///
    /// # Errors
    ///
    /// Returns [`ObfuscateError::Io`] when the file cannot be written.
    pub async fn write_input(&self, source: &str) -> ObfuscateResult<()> {
        tokio::fs::write(&self.input, source)
            .await
            .map_err(|err| ObfuscateError::io("job.write_input", self.input.clone(), err))
    }

    /// Render `document` as a Lua chunk and write it as the config file.
    ///
    /// # Errors
    ///
    /// Returns [`ObfuscateError::Io`] when the file cannot be written.
    pub async fn write_config(&self, document: &ConfigDocument) -> ObfuscateResult<()> {
        tokio::fs::write(&self.config, document.to_lua_chunk())
            .await
            .map_err(|err| ObfuscateError::io("job.write_config", self.config.clone(), err))
    }

    /// Read the tool's output artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ObfuscateError::OutputMissing`] when the file does not exist,
    /// [`ObfuscateError::OutputNotUtf8`] for non-UTF-8 content, and
    /// [`ObfuscateError::Io`] for any other read failure.
    pub async fn read_output(&self) -> ObfuscateResult<String> {
        let bytes = match tokio::fs::read(&self.output).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ObfuscateError::OutputMissing {
                    path: self.output.clone(),
                });
            }
            Err(err) => {
                return Err(ObfuscateError::io(
                    "job.read_output",
                    self.output.clone(),
                    err,
                ));
            }
        };
        String::from_utf8(bytes).map_err(|source| ObfuscateError::OutputNotUtf8 {
            path: self.output.clone(),
            source,
        })
    }

    /// Remove all artifacts. Missing files and removal failures are ignored.
    pub fn cleanup(&self) {
        for path in [&self.input, &self.output, &self.config] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "job file cleanup failed");
                }
            }
        }
    }
}

impl Drop for JobFiles {
    fn drop(&mut self) {
        self.cleanup();
    }
}
