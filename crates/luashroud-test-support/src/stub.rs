//! In-process [`Obfuscator`] double that never spawns a process.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use luashroud_core::{
    ObfuscateError, ObfuscateResult, ObfuscationOutput, ObfuscationRequest, Obfuscator,
    ToolReadiness,
};

/// Canned outcome returned by [`StubObfuscator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubBehaviour {
    /// Return `"-- obfuscated\n"` followed by the source.
    Echo,
    /// Return this exact text.
    Fixed(String),
    /// Fail as a tool error carrying these diagnostics.
    Fail(String),
    /// Fail as a timeout.
    Timeout,
}

/// Records every request and answers with a fixed behaviour.
#[derive(Debug)]
pub struct StubObfuscator {
    behaviour: StubBehaviour,
    calls: AtomicUsize,
    last: Mutex<Option<ObfuscationRequest>>,
}

impl StubObfuscator {
    /// Build a stub with the given behaviour.
    #[must_use]
    pub const fn new(behaviour: StubBehaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    /// Number of `obfuscate` calls seen.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<ObfuscationRequest> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Obfuscator for StubObfuscator {
    async fn obfuscate(&self, request: ObfuscationRequest) -> ObfuscateResult<ObfuscationOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(request.clone());

        let code = match &self.behaviour {
            StubBehaviour::Echo => format!("-- obfuscated\n{}", request.source),
            StubBehaviour::Fixed(text) => text.clone(),
            StubBehaviour::Fail(diagnostics) => {
                return Err(ObfuscateError::ToolFailed {
                    code: Some(1),
                    diagnostics: diagnostics.clone(),
                });
            }
            StubBehaviour::Timeout => {
                return Err(ObfuscateError::Timeout {
                    after: Duration::from_secs(60),
                });
            }
        };

        Ok(ObfuscationOutput {
            original_size: request.source.len(),
            obfuscated_size: code.len(),
            preset_label: request.settings.label(),
            lua_version: request.settings.lua_version().map(str::to_string),
            elapsed: Duration::from_millis(250),
            code,
        })
    }

    fn readiness(&self) -> ToolReadiness {
        ToolReadiness {
            install_path: PathBuf::from("/opt/prometheus"),
            runtime: "lua5.1".to_string(),
            cli_script: "cli.lua".to_string(),
            install_present: true,
            cli_present: true,
        }
    }
}
