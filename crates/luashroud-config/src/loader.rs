//! Assemble a [`ServiceConfig`] from environment variables.

use std::path::PathBuf;

use luashroud_core::{LuaVersion, SourceLimits};

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ApiConfig, BotConfig, LogSettings, RunMode, ServiceConfig, ToolConfig};
use crate::validate::{
    parse_bind_addr, parse_bounded, parse_port, parse_positive, parse_seconds,
};

impl ServiceConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value is invalid.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let mode = env
            .get("LUASHROUD_MODE")
            .map_or(Ok(RunMode::All), |value| value.parse())?;

        let tool = ToolConfig {
            install_path: PathBuf::from(env.get_or("PROMETHEUS_PATH", defaults::INSTALL_PATH)),
            runtime: env.get_or("LUA_PATH", defaults::RUNTIME),
            cli_script: env.get_or("PROMETHEUS_CLI", defaults::CLI_SCRIPT),
            work_dir: env
                .get("LUASHROUD_WORK_DIR")
                .map_or_else(std::env::temp_dir, PathBuf::from),
            timeout: env
                .get("LUASHROUD_TIMEOUT_SECS")
                .map_or(Ok(defaults::TIMEOUT), |value| {
                    parse_seconds("LUASHROUD_TIMEOUT_SECS", &value)
                })?,
            max_output_bytes: env.positive("LUASHROUD_MAX_OUTPUT_BYTES", defaults::MAX_OUTPUT_BYTES)?,
            max_concurrent_jobs: env
                .get("LUASHROUD_MAX_CONCURRENT_JOBS")
                .map(|value| parse_positive("LUASHROUD_MAX_CONCURRENT_JOBS", &value))
                .transpose()?,
        };

        let max_code_bytes = env.positive("LUASHROUD_MAX_CODE_BYTES", defaults::MAX_CODE_BYTES)?;

        let api = if mode.includes_api() {
            let port = env
                .get("PORT")
                .map_or(Ok(defaults::PORT), |value| parse_port("PORT", &value))?;
            let host = env.get_or("HOST", defaults::HOST);
            Some(ApiConfig {
                bind_addr: parse_bind_addr("HOST", &host, port)?,
                max_body_bytes: env.positive("LUASHROUD_MAX_BODY_BYTES", defaults::MAX_BODY_BYTES)?,
                max_code_bytes,
                default_lua_version: env
                    .get("LUASHROUD_DEFAULT_LUA_VERSION")
                    .map_or(Ok(LuaVersion::LuaU), |value| {
                        value.parse().map_err(|_| {
                            ConfigError::invalid(
                                "LUASHROUD_DEFAULT_LUA_VERSION",
                                &value,
                                "unknown_lua_version",
                            )
                        })
                    })?,
            })
        } else {
            None
        };

        let bot = if mode.includes_bot() {
            let token = env.get("DISCORD_TOKEN").ok_or(ConfigError::MissingEnv {
                name: "DISCORD_TOKEN",
            })?;
            Some(BotConfig {
                token,
                limits: SourceLimits {
                    min_chars: defaults::MIN_CODE_CHARS,
                    max_bytes: max_code_bytes,
                },
                inline_limit: env.bounded(
                    "LUASHROUD_INLINE_LIMIT",
                    defaults::INLINE_LIMIT,
                    defaults::MAX_INLINE_LIMIT,
                )?,
                download_timeout: defaults::DOWNLOAD_TIMEOUT,
            })
        } else {
            None
        };

        let logging = LogSettings {
            level: env.get_or("RUST_LOG", defaults::LOG_LEVEL),
            format: env.get("LOG_FORMAT"),
        };

        Ok(Self {
            mode,
            tool,
            api,
            bot,
            logging,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn positive(&self, name: &'static str, default: usize) -> ConfigResult<usize> {
        self.get(name)
            .map_or(Ok(default), |value| parse_positive(name, &value))
    }

    fn bounded(&self, name: &'static str, default: usize, max: usize) -> ConfigResult<usize> {
        self.get(name)
            .map_or(Ok(default), |value| parse_bounded(name, &value, max))
    }
}
