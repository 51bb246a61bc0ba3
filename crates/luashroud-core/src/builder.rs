//! Mapping of presets and caller overrides onto tool invocation settings.

use serde_json::Value;

use crate::document::ConfigDocument;
use crate::error::ObfuscateResult;
use crate::preset::{LuaVersion, Preset};

/// How a job instructs the external tool.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSettings {
    /// Pass the preset name through `--preset`.
    NativePreset(Preset),
    /// Write a preset-derived document and pass it through `--config`.
    PresetDocument {
        /// Preset the document was built from.
        preset: Preset,
        /// Document written to the config file.
        document: ConfigDocument,
    },
    /// Write a caller-supplied document and pass it through `--config`.
    Custom(ConfigDocument),
}

impl JobSettings {
    /// Label used in replies, responses, and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NativePreset(preset) | Self::PresetDocument { preset, .. } => preset.as_str(),
            Self::Custom(_) => "custom",
        }
    }

    /// Preset backing these settings, if any.
    #[must_use]
    pub const fn preset(&self) -> Option<Preset> {
        match self {
            Self::NativePreset(preset) | Self::PresetDocument { preset, .. } => Some(*preset),
            Self::Custom(_) => None,
        }
    }

    /// Document to write as a config file; `None` for native presets.
    #[must_use]
    pub const fn document(&self) -> Option<&ConfigDocument> {
        match self {
            Self::NativePreset(_) => None,
            Self::PresetDocument { document, .. } | Self::Custom(document) => Some(document),
        }
    }

    /// Dialect tag the tool will see.
    #[must_use]
    pub fn lua_version(&self) -> Option<&str> {
        match self {
            Self::NativePreset(preset) => Some(preset.lua_version().as_str()),
            Self::PresetDocument { document, .. } | Self::Custom(document) => {
                document.lua_version()
            }
        }
    }
}

/// Builds [`JobSettings`] for each surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigBuilder;

impl ConfigBuilder {
    /// Settings for the chat surface.
    ///
    /// Tool-native presets use `--preset`; Roblox presets ship their document.
    #[must_use]
    pub fn for_preset(preset: Preset) -> JobSettings {
        if preset.is_tool_native() {
            JobSettings::NativePreset(preset)
        } else {
            JobSettings::PresetDocument {
                preset,
                document: preset.document(),
            }
        }
    }

    /// Settings for the HTTP surface. Always produces a config document.
    ///
    /// An override object is used as-is with `lua_version` filled in when it
    /// carries no `LuaVersion` of its own.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ObfuscateError::InvalidInput`] when the override is not
    /// a JSON object.
    pub fn for_request(
        preset: Preset,
        override_config: Option<Value>,
        lua_version: LuaVersion,
    ) -> ObfuscateResult<JobSettings> {
        match override_config {
            Some(value) => {
                let document =
                    ConfigDocument::from_value(value)?.with_default_lua_version(lua_version);
                tracing::debug!(
                    lua_version = document.lua_version(),
                    steps = ?document.step_names(),
                    "using caller-supplied config"
                );
                Ok(JobSettings::Custom(document))
            }
            None => Ok(JobSettings::PresetDocument {
                preset,
                document: preset.document().with_lua_version(lua_version),
            }),
        }
    }
}
