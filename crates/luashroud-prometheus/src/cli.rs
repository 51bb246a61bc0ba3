use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use luashroud_core::{
    JobFiles, JobId, ObfuscateError, ObfuscateResult, ObfuscationOutput, ObfuscationRequest,
    Obfuscator, ToolReadiness,
};
use tokio::process::Command;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{Instrument, info, info_span, warn};

use crate::capture::read_bounded;
use crate::settings::CliSettings;

/// Runs `<runtime> <cli> [--preset NAME | --config FILE] INPUT --out OUTPUT` per job.
#[derive(Debug, Clone)]
pub struct PrometheusCli {
    settings: Arc<CliSettings>,
    permits: Option<Arc<Semaphore>>,
    active: Arc<AtomicUsize>,
}

impl PrometheusCli {
    /// Build an invoker, creating the work directory when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ObfuscateError::Io`] when the work directory cannot be resolved
    /// or created, and [`ObfuscateError::InvalidInput`] for a zero concurrency bound.
    pub fn new(mut settings: CliSettings) -> ObfuscateResult<Self> {
        if settings.max_concurrent_jobs == Some(0) {
            return Err(ObfuscateError::invalid_input(
                "max_concurrent_jobs",
                "must_be_positive",
                Some("0".to_string()),
            ));
        }
        std::fs::create_dir_all(&settings.work_dir).map_err(|source| ObfuscateError::Io {
            operation: "invoker.create_work_dir",
            path: settings.work_dir.clone(),
            source,
        })?;
        // The child runs inside the install dir, so job paths must not be relative.
        settings.work_dir =
            std::path::absolute(&settings.work_dir).map_err(|source| ObfuscateError::Io {
                operation: "invoker.resolve_work_dir",
                path: settings.work_dir.clone(),
                source,
            })?;

        let permits = settings
            .max_concurrent_jobs
            .map(|limit| Arc::new(Semaphore::new(limit)));
        Ok(Self {
            settings: Arc::new(settings),
            permits,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Settings in effect.
    #[must_use]
    pub fn settings(&self) -> &CliSettings {
        &self.settings
    }

    async fn admit(&self) -> ObfuscateResult<Option<OwnedSemaphorePermit>> {
        match &self.permits {
            Some(permits) => Arc::clone(permits)
                .acquire_owned()
                .await
                .map(Some)
                .map_err(|_| ObfuscateError::Unavailable),
            None => Ok(None),
        }
    }

    fn command(&self, files: &JobFiles, request: &ObfuscationRequest) -> Command {
        let mut command = Command::new(&self.settings.runtime);
        command.arg(&self.settings.cli_script);
        match request.settings.document() {
            Some(_) => {
                command.arg("--config").arg(files.config_path());
            }
            None => {
                command.arg("--preset").arg(request.settings.label());
            }
        }
        command
            .arg(files.input_path())
            .arg("--out")
            .arg(files.output_path())
            .current_dir(&self.settings.install_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn run(&self, files: &JobFiles, request: &ObfuscationRequest) -> ObfuscateResult<String> {
        files.write_input(&request.source).await?;
        if let Some(document) = request.settings.document() {
            files.write_config(document).await?;
        }

        let mut child = self
            .command(files, request)
            .spawn()
            .map_err(|source| ObfuscateError::Spawn {
                program: self.settings.runtime.clone(),
                source,
            })?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.settings.max_output_bytes;
        let cli_path = self.settings.cli_path();

        let outcome = tokio::time::timeout(self.settings.timeout, async {
            tokio::try_join!(
                async {
                    match stdout {
                        Some(pipe) => read_bounded(pipe, "stdout", limit).await,
                        None => Ok(Vec::new()),
                    }
                },
                async {
                    match stderr {
                        Some(pipe) => read_bounded(pipe, "stderr", limit).await,
                        None => Ok(Vec::new()),
                    }
                },
                async {
                    child.wait().await.map_err(|source| ObfuscateError::Io {
                        operation: "invoker.wait",
                        path: cli_path.clone(),
                        source,
                    })
                },
            )
        })
        .await;

        let (stdout, stderr, status) = match outcome {
            Ok(Ok(captured)) => captured,
            Ok(Err(err)) => {
                let _ = child.kill().await;
                return Err(err);
            }
            Err(_) => {
                let _ = child.kill().await;
                return Err(ObfuscateError::Timeout {
                    after: self.settings.timeout,
                });
            }
        };

        if !status.success() {
            return Err(tool_failure(status, &stdout, &stderr));
        }
        files.read_output().await
    }
}

#[async_trait]
impl Obfuscator for PrometheusCli {
    async fn obfuscate(&self, request: ObfuscationRequest) -> ObfuscateResult<ObfuscationOutput> {
        if request.source.trim().is_empty() {
            return Err(ObfuscateError::invalid_input("code", "empty", None));
        }

        let _permit = self.admit().await?;
        let _active = ActiveJob::enter(&self.active);
        let files = JobFiles::new(&self.settings.work_dir, JobId::generate());
        let span = info_span!(
            "obfuscate",
            job_id = %files.id(),
            surface = request.surface.as_str(),
            preset = request.settings.label()
        );

        async {
            let started = Instant::now();
            let result = self.run(&files, &request).await;
            let elapsed = started.elapsed();
            files.cleanup();

            match result {
                Ok(code) => {
                    info!(
                        elapsed_ms = elapsed.as_millis(),
                        original_size = request.source.len(),
                        obfuscated_size = code.len(),
                        "obfuscation completed"
                    );
                    Ok(ObfuscationOutput {
                        original_size: request.source.len(),
                        obfuscated_size: code.len(),
                        preset_label: request.settings.label(),
                        lua_version: request.settings.lua_version().map(str::to_string),
                        elapsed,
                        code,
                    })
                }
                Err(err) => {
                    warn!(
                        elapsed_ms = elapsed.as_millis(),
                        kind = err.kind(),
                        detail = %err.detail(),
                        "obfuscation failed"
                    );
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    fn readiness(&self) -> ToolReadiness {
        ToolReadiness {
            install_path: self.settings.install_path.clone(),
            runtime: self.settings.runtime.clone(),
            cli_script: self.settings.cli_script.clone(),
            install_present: self.settings.install_path.is_dir(),
            cli_present: self.settings.cli_path().is_file(),
        }
    }

    fn active_jobs(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

struct ActiveJob(Arc<AtomicUsize>);

impl ActiveJob {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for ActiveJob {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn tool_failure(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> ObfuscateError {
    let stderr = String::from_utf8_lossy(stderr);
    let diagnostics = if stderr.trim().is_empty() {
        String::from_utf8_lossy(stdout).into_owned()
    } else {
        stderr.into_owned()
    };
    ObfuscateError::ToolFailed {
        code: status.code(),
        diagnostics,
    }
}
