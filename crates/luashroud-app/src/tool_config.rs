use luashroud_config::ToolConfig;
use luashroud_prometheus::CliSettings;

/// Translate the validated tool section into invoker settings.
#[must_use]
pub fn cli_settings(tool: &ToolConfig) -> CliSettings {
    CliSettings {
        install_path: tool.install_path.clone(),
        runtime: tool.runtime.clone(),
        cli_script: tool.cli_script.clone(),
        work_dir: tool.work_dir.clone(),
        timeout: tool.timeout,
        max_output_bytes: tool.max_output_bytes,
        max_concurrent_jobs: tool.max_concurrent_jobs,
    }
}
