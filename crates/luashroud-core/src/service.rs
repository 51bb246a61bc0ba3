//! Invoker trait implemented by tool adapters.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ObfuscateResult;
use crate::model::{ObfuscationOutput, ObfuscationRequest};

/// Drives the external obfuscator for one job at a time per call.
#[async_trait]
pub trait Obfuscator: Send + Sync {
    /// Run one job to completion. Temporary artifacts are removed on every path.
    async fn obfuscate(&self, request: ObfuscationRequest) -> ObfuscateResult<ObfuscationOutput>;

    /// Describe the installation backing this invoker.
    fn readiness(&self) -> ToolReadiness;

    /// Number of jobs currently in flight.
    fn active_jobs(&self) -> usize {
        0
    }
}

/// Shared handle used by both surfaces.
pub type SharedObfuscator = Arc<dyn Obfuscator>;

/// Installation snapshot reported by `!status` and `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReadiness {
    /// Tool install directory.
    pub install_path: PathBuf,
    /// Runtime executable used to launch the CLI.
    pub runtime: String,
    /// CLI script path relative to the install directory.
    pub cli_script: String,
    /// Whether the install directory exists.
    pub install_present: bool,
    /// Whether the CLI script exists.
    pub cli_present: bool,
}

impl ToolReadiness {
    /// Whether the tool looks runnable.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.install_present && self.cli_present
    }
}
