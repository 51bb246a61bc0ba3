//! Request and result types shared by both surfaces.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use crate::builder::JobSettings;
use crate::error::{ObfuscateError, ObfuscateResult};

/// Entry point that created a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// `POST /obfuscate`.
    Http,
    /// Chat command.
    Chat,
}

impl Surface {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Chat => "chat",
        }
    }
}

impl Display for Surface {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One obfuscation job as submitted to an [`crate::Obfuscator`].
#[derive(Debug, Clone)]
pub struct ObfuscationRequest {
    /// Lua/LuaU source text.
    pub source: String,
    /// Preset flag or config document to use.
    pub settings: JobSettings,
    /// Surface that produced the request.
    pub surface: Surface,
}

impl ObfuscationRequest {
    /// Build a request.
    #[must_use]
    pub const fn new(source: String, settings: JobSettings, surface: Surface) -> Self {
        Self {
            source,
            settings,
            surface,
        }
    }
}

/// Successful job result.
#[derive(Debug, Clone, PartialEq)]
pub struct ObfuscationOutput {
    /// Obfuscated source text.
    pub code: String,
    /// Preset name, or `custom` for override documents.
    pub preset_label: &'static str,
    /// Dialect tag the tool saw, when known.
    pub lua_version: Option<String>,
    /// Input size in bytes.
    pub original_size: usize,
    /// Output size in bytes.
    pub obfuscated_size: usize,
    /// Wall-clock time spent in the tool.
    pub elapsed: Duration,
}

impl ObfuscationOutput {
    /// Output size as a multiple of input size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.obfuscated_size as f64 / self.original_size as f64
    }
}

/// Size bounds applied by callers before a job is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLimits {
    /// Minimum length in characters after trimming; `0` disables the check.
    pub min_chars: usize,
    /// Maximum length in bytes.
    pub max_bytes: usize,
}

impl SourceLimits {
    /// Validate `source` against these bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ObfuscateError::InvalidInput`] with reason `empty`, `too_short`,
    /// or `too_large`.
    pub fn check(&self, source: &str) -> ObfuscateResult<()> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(ObfuscateError::invalid_input("code", "empty", None));
        }
        let chars = trimmed.chars().count();
        if chars < self.min_chars {
            return Err(ObfuscateError::invalid_input(
                "code",
                "too_short",
                Some(chars.to_string()),
            ));
        }
        if source.len() > self.max_bytes {
            return Err(ObfuscateError::invalid_input(
                "code",
                "too_large",
                Some(source.len().to_string()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: SourceLimits = SourceLimits {
        min_chars: 5,
        max_bytes: 16,
    };

    fn reason(result: ObfuscateResult<()>) -> Option<&'static str> {
        match result {
            Err(ObfuscateError::InvalidInput { reason, .. }) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn source_limits_classify_failures() {
        assert_eq!(reason(LIMITS.check("   ")), Some("empty"));
        assert_eq!(reason(LIMITS.check("x=1")), Some("too_short"));
        assert_eq!(reason(LIMITS.check(&"a".repeat(17))), Some("too_large"));
        assert!(LIMITS.check("print(1)").is_ok());
        assert!(LIMITS.check(&"a".repeat(16)).is_ok());
    }

    #[test]
    fn ratio_handles_empty_input() {
        let output = ObfuscationOutput {
            code: String::new(),
            preset_label: "Medium",
            lua_version: None,
            original_size: 0,
            obfuscated_size: 10,
            elapsed: Duration::ZERO,
        };
        assert!(output.ratio().abs() < f64::EPSILON);

        let grown = ObfuscationOutput {
            original_size: 100,
            obfuscated_size: 250,
            ..output
        };
        assert!((grown.ratio() - 2.5).abs() < f64::EPSILON);
    }
}
