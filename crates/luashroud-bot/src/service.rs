//! Command planning and job execution, independent of the gateway.
//!
//! # Design
//! - [`ChatService::plan`] answers cheap commands immediately and validates
//!   obfuscation input before any processing message is sent.
//! - [`ChatService::execute`] downloads, invokes, and formats; it never fails,
//!   every error becomes a user-facing [`Reply`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use luashroud_config::BotConfig;
use luashroud_core::{
    ConfigBuilder, ObfuscateError, ObfuscationRequest, Preset, SharedObfuscator, SourceLimits,
    Surface,
};
use luashroud_telemetry::{JobOutcome, Metrics, build_sha};
use tracing::{info, warn};

use crate::command::Command;
use crate::error::BotResult;
use crate::reply::{self, Reply, SourceOrigin, StatusReport};
use crate::source::{AttachmentFetcher, AttachmentRef, AttachmentRejection, CodeBlockExtractor};

/// What to do with an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Send this reply and stop.
    Reply(Reply),
    /// Send a processing message, then run the job and edit the message.
    Obfuscate(PendingJob),
}

/// Validated obfuscation job awaiting execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingJob {
    preset: Preset,
    input: PendingInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingInput {
    Inline(String),
    Attachment(AttachmentRef),
}

impl PendingJob {
    /// Preset the job will use.
    #[must_use]
    pub const fn preset(&self) -> Preset {
        self.preset
    }

    /// Where the source comes from.
    #[must_use]
    pub fn origin(&self) -> SourceOrigin {
        match &self.input {
            PendingInput::Inline(_) => SourceOrigin::CodeBlock,
            PendingInput::Attachment(attachment) => {
                SourceOrigin::Attachment(attachment.name.clone())
            }
        }
    }

    /// Text of the processing message.
    #[must_use]
    pub fn processing_message(&self) -> String {
        reply::processing(&self.origin(), self.preset)
    }
}

/// Chat command logic shared by the gateway handler and tests.
pub struct ChatService {
    obfuscator: SharedObfuscator,
    telemetry: Metrics,
    fetcher: Arc<dyn AttachmentFetcher>,
    extractor: CodeBlockExtractor,
    limits: SourceLimits,
    inline_limit: usize,
    started_at: Instant,
}

impl ChatService {
    /// Build the service from the chat configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the code-block pattern cannot be compiled.
    pub fn new(
        config: &BotConfig,
        obfuscator: SharedObfuscator,
        telemetry: Metrics,
        fetcher: Arc<dyn AttachmentFetcher>,
    ) -> BotResult<Self> {
        Ok(Self {
            obfuscator,
            telemetry,
            fetcher,
            extractor: CodeBlockExtractor::new()?,
            limits: config.limits,
            inline_limit: config.inline_limit,
            started_at: Instant::now(),
        })
    }

    /// Decide how to answer a message. `None` means the message is not a command.
    #[must_use]
    pub fn plan(&self, content: &str, attachment: Option<AttachmentRef>) -> Option<Plan> {
        let command = Command::parse(content)?;
        let plan = match command {
            Command::Help => Plan::Reply(reply::help()),
            Command::Presets => Plan::Reply(reply::presets()),
            Command::Status => Plan::Reply(reply::status(&self.status_report())),
            Command::Obfuscate { preset } => match self.prepare(preset, content, attachment) {
                Ok(job) => Plan::Obfuscate(job),
                Err(rejection) => {
                    self.record(preset, JobOutcome::Rejected, Duration::ZERO);
                    Plan::Reply(rejection)
                }
            },
        };
        Some(plan)
    }

    fn prepare(
        &self,
        preset: Preset,
        content: &str,
        attachment: Option<AttachmentRef>,
    ) -> Result<PendingJob, Reply> {
        if let Some(attachment) = attachment {
            return match attachment.validate(self.limits.max_bytes) {
                Ok(()) => Ok(PendingJob {
                    preset,
                    input: PendingInput::Attachment(attachment),
                }),
                Err(AttachmentRejection::NotLua) => Err(reply::not_lua()),
                Err(AttachmentRejection::TooLarge) => {
                    Err(reply::attachment_too_large(self.limits.max_bytes))
                }
            };
        }

        let code = self
            .extractor
            .extract(content)
            .ok_or_else(reply::missing_code)?;
        match self.limits.check(code) {
            Ok(()) => Ok(PendingJob {
                preset,
                input: PendingInput::Inline(code.to_string()),
            }),
            Err(ObfuscateError::InvalidInput {
                reason: "too_large",
                ..
            }) => Err(reply::code_too_large(self.limits.max_bytes)),
            Err(_) => Err(reply::code_too_short()),
        }
    }

    /// Run a planned job and format the outcome.
    pub async fn execute(&self, job: PendingJob) -> Reply {
        let origin = job.origin();
        let started = Instant::now();
        let source = match job.input {
            PendingInput::Inline(code) => code,
            PendingInput::Attachment(attachment) => {
                match self.fetcher.fetch(&attachment.url).await {
                    Ok(code) => code,
                    Err(err) => {
                        warn!(error = %err, name = %attachment.name, "attachment download failed");
                        if err.is_download() {
                            self.telemetry.inc_attachment_download_failure();
                        }
                        self.record(job.preset, JobOutcome::Failed, started.elapsed());
                        return reply::failure(&err.user_message());
                    }
                }
            }
        };
        let download_bound = SourceLimits {
            min_chars: 0,
            max_bytes: self.limits.max_bytes,
        };
        if let Err(err) = download_bound.check(&source) {
            self.record(job.preset, JobOutcome::Rejected, Duration::ZERO);
            return reply::failure(&err.detail());
        }

        let request =
            ObfuscationRequest::new(source, ConfigBuilder::for_preset(job.preset), Surface::Chat);
        match self.obfuscator.obfuscate(request).await {
            Ok(output) => {
                self.record(job.preset, JobOutcome::Succeeded, output.elapsed);
                self.telemetry.add_job_bytes(
                    Surface::Chat.as_str(),
                    output.original_size,
                    output.obfuscated_size,
                );
                info!(
                    preset = %job.preset,
                    original_size = output.original_size,
                    obfuscated_size = output.obfuscated_size,
                    "chat obfuscation served"
                );
                reply::obfuscated(&output, &origin, self.inline_limit)
            }
            Err(err) => {
                let outcome = if err.is_timeout() {
                    JobOutcome::TimedOut
                } else {
                    JobOutcome::Failed
                };
                self.record(job.preset, outcome, started.elapsed());
                warn!(preset = %job.preset, kind = err.kind(), detail = %err.detail(), "chat obfuscation failed");
                reply::failure(&err.detail())
            }
        }
    }

    fn status_report(&self) -> StatusReport {
        let active_jobs = self.obfuscator.active_jobs();
        self.telemetry.set_active_jobs(active_jobs);
        StatusReport {
            tool: self.obfuscator.readiness(),
            active_jobs,
            uptime: self.started_at.elapsed(),
            build: build_sha().to_string(),
        }
    }

    fn record(&self, preset: Preset, outcome: JobOutcome, elapsed: Duration) {
        self.telemetry
            .record_job(Surface::Chat.as_str(), preset.as_str(), outcome, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use luashroud_core::JobSettings;
    use luashroud_test_support::{StubBehaviour, StubObfuscator};

    use crate::error::BotError;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    struct CannedFetcher(Result<String, u16>);

    #[async_trait]
    impl AttachmentFetcher for CannedFetcher {
        async fn fetch(&self, _url: &str) -> BotResult<String> {
            self.0
                .clone()
                .map_err(|status| BotError::DownloadStatus { status })
        }
    }

    fn config() -> BotConfig {
        BotConfig {
            token: "token".to_string(),
            limits: SourceLimits {
                min_chars: 5,
                max_bytes: 500_000,
            },
            inline_limit: 1900,
            download_timeout: Duration::from_secs(30),
        }
    }

    fn service(
        stub: &Arc<StubObfuscator>,
        fetched: Result<String, u16>,
    ) -> Result<ChatService, Box<dyn std::error::Error>> {
        Ok(ChatService::new(
            &config(),
            stub.clone(),
            Metrics::new()?,
            Arc::new(CannedFetcher(fetched)),
        )?)
    }

    fn attachment(name: &str, size: u64) -> AttachmentRef {
        AttachmentRef {
            name: name.to_string(),
            size,
            url: format!("https://cdn.example/{name}"),
        }
    }

    #[test]
    fn non_commands_are_ignored() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let service = service(&stub, Ok(String::new()))?;
        assert!(service.plan("hello there", None).is_none());
        assert!(service.plan("!obfx ```print(1)```", None).is_none());
        Ok(())
    }

    #[test]
    fn rejections_are_answered_without_invoking() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let service = service(&stub, Ok(String::new()))?;

        let cases = [
            ("!obfuscate", None, "Please provide code"),
            ("!obfuscate ```lua\nx=1\n```", None, "Code is too short"),
            ("!obf", Some(attachment("notes.txt", 10)), "upload a `.lua` file"),
            ("!obf", Some(attachment("big.lua", 600_000)), "File too large! Maximum size: 488KB"),
        ];
        for (content, attachment, expected) in cases {
            match service.plan(content, attachment) {
                Some(Plan::Reply(reply)) => {
                    let text = reply.content.unwrap_or_default();
                    assert!(text.contains(expected), "{content}: {text}");
                }
                other => return Err(format!("{content}: unexpected {other:?}").into()),
            }
        }

        let oversized = format!("!obf ```lua\n{}\n```", "a".repeat(500_001));
        match service.plan(&oversized, None) {
            Some(Plan::Reply(reply)) => {
                assert!(reply.content.unwrap_or_default().contains("Code too large!"));
            }
            other => return Err(format!("unexpected {other:?}").into()),
        }
        assert_eq!(stub.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn medium_print_yields_inline_reply_only() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let service = service(&stub, Ok(String::new()))?;

        let Some(Plan::Obfuscate(job)) =
            service.plan("!obfuscate Medium\n```lua\nprint(1)\n```", None)
        else {
            return Err("expected an obfuscation plan".into());
        };
        assert_eq!(job.preset(), Preset::Medium);
        assert_eq!(
            job.processing_message(),
            "⏳ Obfuscating with preset **Medium**..."
        );

        let reply = service.execute(job).await;
        let content = reply.content.clone().unwrap_or_default();
        assert!(content.contains("```lua\n-- obfuscated\nprint(1)\n```"));
        assert!(reply.file.is_none());
        assert!(reply.embed.is_none());

        let request = stub.last_request().ok_or("stub not called")?;
        assert_eq!(request.source, "print(1)");
        assert_eq!(request.surface, Surface::Chat);
        assert_eq!(request.settings, JobSettings::NativePreset(Preset::Medium));
        Ok(())
    }

    #[tokio::test]
    async fn large_output_yields_attachment_only() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Fixed("z".repeat(1901))));
        let service = service(&stub, Ok(String::new()))?;

        let Some(Plan::Obfuscate(job)) = service.plan("!obf robloxweak ```print(1)```", None)
        else {
            return Err("expected an obfuscation plan".into());
        };
        let reply = service.execute(job).await;
        let file = reply.file.ok_or("expected a file")?;
        assert_eq!(file.name, "obfuscated_robloxweak.lua");
        assert_eq!(file.contents.len(), 1901);
        assert!(!reply.content.unwrap_or_default().contains("```"));

        let request = stub.last_request().ok_or("stub not called")?;
        assert!(request.settings.document().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn attachments_are_downloaded_and_returned_as_files() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let service = service(&stub, Ok("print('file')".to_string()))?;

        let Some(Plan::Obfuscate(job)) =
            service.plan("!obf Strong", Some(attachment("game.lua", 13)))
        else {
            return Err("expected an obfuscation plan".into());
        };
        assert_eq!(
            job.processing_message(),
            "⏳ Processing **game.lua** with preset **Strong**..."
        );
        let reply = service.execute(job).await;
        assert_eq!(
            reply.file.map(|file| file.name),
            Some("obfuscated_game.lua".to_string())
        );
        assert_eq!(
            stub.last_request().map(|request| request.source),
            Some("print('file')".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn failures_become_tips_replies() -> TestResult {
        let failing = Arc::new(StubObfuscator::new(StubBehaviour::Fail(
            "cli.lua:1: unexpected symbol".to_string(),
        )));
        let failing_service = service(&failing, Ok(String::new()))?;
        let Some(Plan::Obfuscate(job)) = failing_service.plan("!obf ```print(1)```", None) else {
            return Err("expected an obfuscation plan".into());
        };
        let content = failing_service.execute(job).await.content.unwrap_or_default();
        assert!(content.starts_with("❌ Error: cli.lua:1: unexpected symbol"));
        assert!(content.contains("💡 **Tips:**"));

        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let broken_download = service(&stub, Err(404))?;
        let Some(Plan::Obfuscate(job)) =
            broken_download.plan("!obf", Some(attachment("game.lua", 10)))
        else {
            return Err("expected an obfuscation plan".into());
        };
        let content = broken_download.execute(job).await.content.unwrap_or_default();
        assert!(content.starts_with("❌ Error: HTTP 404"));
        assert_eq!(stub.calls(), 0);
        assert_eq!(
            broken_download
                .telemetry
                .snapshot()
                .attachment_downloads_failed_total,
            1
        );
        Ok(())
    }

    #[test]
    fn status_reports_invoker_state() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let service = service(&stub, Ok(String::new()))?;
        let Some(Plan::Reply(reply)) = service.plan("!status", None) else {
            return Err("expected a reply".into());
        };
        let content = reply.content.unwrap_or_default();
        assert!(content.contains("/opt/prometheus"));
        assert!(content.contains("✅ ready"));
        Ok(())
    }
}
