use std::future::{Future, pending};
use std::net::SocketAddr;
use std::sync::Arc;

use luashroud_api::ApiServer;
use luashroud_bot::ChatBot;
use luashroud_config::ServiceConfig;
use luashroud_core::{Obfuscator, SharedObfuscator};
use luashroud_prometheus::PrometheusCli;
use luashroud_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::tool_config::cli_settings;

const BUILD_SHA: &str = match option_env!("LUASHROUD_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Dependencies required to bootstrap the service.
pub(crate) struct BootstrapDependencies {
    config: ServiceConfig,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            ServiceConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self { config, telemetry })
    }
}

/// Entry point for the service boot sequence.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be installed,
/// or a hosted surface fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    let logging = &dependencies.config.logging;
    luashroud_telemetry::init_logging(&LoggingConfig {
        level: &logging.level,
        format: LogFormat::from_setting(logging.format.as_deref()),
        build_sha: BUILD_SHA,
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    run_until(dependencies, shutdown_signal()).await
}

/// Host the surfaces selected by the run mode until `shutdown` resolves or a
/// surface stops.
pub(crate) async fn run_until<S>(dependencies: BootstrapDependencies, shutdown: S) -> AppResult<()>
where
    S: Future<Output = ()>,
{
    let BootstrapDependencies { config, telemetry } = dependencies;
    let _context = GlobalContextGuard::new(config.mode.as_str());
    info!(mode = config.mode.as_str(), "luashroud bootstrap starting");

    let invoker = PrometheusCli::new(cli_settings(&config.tool))
        .map_err(|err| AppError::obfuscator("prometheus_cli.new", err))?;
    report_readiness(&invoker);
    let obfuscator: SharedObfuscator = Arc::new(invoker);

    let api = if config.mode.includes_api() {
        let section = config
            .api
            .as_ref()
            .ok_or(AppError::MissingSurface { name: "api" })?;
        let server = ApiServer::new(section, Arc::clone(&obfuscator), telemetry.clone());
        Some((server, section.bind_addr))
    } else {
        None
    };

    let bot = if config.mode.includes_bot() {
        let section = config
            .bot
            .as_ref()
            .ok_or(AppError::MissingSurface { name: "bot" })?;
        let bot = ChatBot::new(section, Arc::clone(&obfuscator), telemetry.clone())
            .map_err(|err| AppError::bot("chat_bot.new", err))?;
        Some(bot)
    } else {
        None
    };

    tokio::select! {
        result = serve_api(api) => result?,
        result = run_bot(bot) => result?,
        () = shutdown => info!("shutdown signal received"),
    }

    info!("luashroud shutdown complete");
    Ok(())
}

async fn serve_api(api: Option<(ApiServer, SocketAddr)>) -> AppResult<()> {
    let Some((server, addr)) = api else {
        return pending().await;
    };
    info!(addr = %addr, "Launching API listener");
    server
        .serve(addr)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))
}

async fn run_bot(bot: Option<ChatBot>) -> AppResult<()> {
    let Some(bot) = bot else {
        return pending().await;
    };
    bot.run()
        .await
        .map_err(|err| AppError::bot("chat_bot.run", err))
}

fn report_readiness(invoker: &PrometheusCli) {
    let readiness = invoker.readiness();
    if readiness.is_ready() {
        info!(
            install_path = %readiness.install_path.display(),
            runtime = %readiness.runtime,
            "obfuscator installation found"
        );
    } else {
        warn!(
            install_path = %readiness.install_path.display(),
            cli_script = %readiness.cli_script,
            install_present = readiness.install_present,
            cli_present = readiness.cli_present,
            "obfuscator installation incomplete; jobs will fail until it is provided"
        );
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::net::TcpListener;
    use std::time::Duration;

    use luashroud_config::{ApiConfig, LogSettings, RunMode, ToolConfig};
    use luashroud_core::LuaVersion;
    use luashroud_test_support::{FAKE_CLI, FAKE_RUNTIME, FakeBehaviour, FakePrometheus};

    fn service_config(
        mode: RunMode,
        fake: &FakePrometheus,
        bind_addr: SocketAddr,
    ) -> ServiceConfig {
        ServiceConfig {
            mode,
            tool: ToolConfig {
                install_path: fake.install_path().to_path_buf(),
                runtime: FAKE_RUNTIME.to_string(),
                cli_script: FAKE_CLI.to_string(),
                work_dir: fake.work_dir().to_path_buf(),
                timeout: Duration::from_secs(5),
                max_output_bytes: 1024 * 1024,
                max_concurrent_jobs: None,
            },
            api: Some(ApiConfig {
                bind_addr,
                max_body_bytes: 1024 * 1024,
                max_code_bytes: 500_000,
                default_lua_version: LuaVersion::LuaU,
            }),
            bot: None,
            logging: LogSettings {
                level: "info".to_string(),
                format: None,
            },
        }
    }

    fn dependencies(config: ServiceConfig) -> Result<BootstrapDependencies, Box<dyn Error>> {
        Ok(BootstrapDependencies {
            config,
            telemetry: Metrics::new()?,
        })
    }

    #[tokio::test]
    async fn shutdown_signal_stops_api_mode() -> Result<(), Box<dyn Error>> {
        let fake = FakePrometheus::install(FakeBehaviour::Echo)?;
        let addr: SocketAddr = "127.0.0.1:0".parse()?;
        let deps = dependencies(service_config(RunMode::Api, &fake, addr))?;

        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let run = run_until(deps, async move {
            let _ = stopped.await;
        });
        let trigger = async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = stop.send(());
        };

        let (result, ()) =
            tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(run, trigger) })
                .await?;
        result?;
        Ok(())
    }

    #[tokio::test]
    async fn occupied_listener_surfaces_api_error() -> Result<(), Box<dyn Error>> {
        let fake = FakePrometheus::install(FakeBehaviour::Echo)?;
        let occupied = TcpListener::bind("127.0.0.1:0")?;
        let deps = dependencies(service_config(RunMode::Api, &fake, occupied.local_addr()?))?;

        let result = run_until(deps, pending()).await;

        assert!(matches!(
            result,
            Err(AppError::ApiServer {
                operation: "api_server.serve",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn bot_mode_requires_bot_section() -> Result<(), Box<dyn Error>> {
        let fake = FakePrometheus::install(FakeBehaviour::Echo)?;
        let addr: SocketAddr = "127.0.0.1:0".parse()?;
        let deps = dependencies(service_config(RunMode::Bot, &fake, addr))?;

        let result = run_until(deps, pending()).await;

        assert!(matches!(
            result,
            Err(AppError::MissingSurface { name: "bot" })
        ));
        Ok(())
    }
}
