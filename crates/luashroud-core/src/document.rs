//! Configuration documents consumed by the external tool.
//!
//! # Design
//! - Documents are plain JSON maps so caller-supplied overrides pass through untouched.
//! - Key order is preserved, which keeps rendered config files stable across runs.
//! - Preset documents are built on demand; nothing here is shared mutable state.

use serde_json::{Map, Value, json};

use crate::error::{ObfuscateError, ObfuscateResult};
use crate::lua_table;
use crate::preset::{LuaVersion, Preset};

/// Key holding the dialect tag.
pub const LUA_VERSION_KEY: &str = "LuaVersion";
/// Key holding the ordered transform list.
pub const STEPS_KEY: &str = "Steps";

/// Nested mapping of tool options.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    entries: Map<String, Value>,
}

impl ConfigDocument {
    /// Accept an arbitrary JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`ObfuscateError::InvalidInput`] when the value is not an object.
    pub fn from_value(value: Value) -> ObfuscateResult<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(ObfuscateError::invalid_input(
                "config",
                "not_an_object",
                Some(json_kind(&other).to_string()),
            )),
        }
    }

    pub(crate) fn for_preset(preset: Preset) -> Self {
        let steps = match preset {
            Preset::Minify | Preset::RobloxMinify => Vec::new(),
            Preset::Weak | Preset::RobloxWeak => vec![step(
                "ConstantArray",
                json!({ "Treshold": 0.5, "StringsOnly": true }),
            )],
            Preset::Medium | Preset::RobloxMedium => vec![
                step(
                    "ConstantArray",
                    json!({
                        "Treshold": 0.8,
                        "StringsOnly": false,
                        "Shuffle": true,
                        "Rotate": true
                    }),
                ),
                step("EncryptStrings", json!({ "Treshold": 0.8 })),
                step("WrapInFunction", json!({})),
            ],
            Preset::Strong | Preset::RobloxStrong => vec![
                step(
                    "ConstantArray",
                    json!({
                        "Treshold": 0.9,
                        "StringsOnly": false,
                        "Shuffle": true,
                        "Rotate": true,
                        "LocalWrapperTreshold": 0.7
                    }),
                ),
                step("EncryptStrings", json!({ "Treshold": 0.9 })),
                step("SplitStrings", json!({ "Treshold": 0.5 })),
                step("ProxifyLocals", json!({ "Treshold": 0.7 })),
                step("WrapInFunction", json!({})),
            ],
            Preset::RobloxSafeStrong => vec![
                step(
                    "ConstantArray",
                    json!({
                        "Treshold": 0.9,
                        "StringsOnly": false,
                        "Shuffle": true,
                        "Rotate": true
                    }),
                ),
                step("EncryptStrings", json!({ "Treshold": 0.9 })),
                step("SplitStrings", json!({ "Treshold": 0.5 })),
                step("WrapInFunction", json!({})),
            ],
        };

        let mut entries = Map::new();
        entries.insert(
            LUA_VERSION_KEY.to_string(),
            Value::from(preset.lua_version().as_str()),
        );
        entries.insert("VarNamePrefix".to_string(), Value::from(""));
        entries.insert("NameGenerator".to_string(), Value::from("MangledShuffled"));
        entries.insert("PrettyPrint".to_string(), Value::Bool(false));
        entries.insert("Seed".to_string(), Value::from(0));
        entries.insert(STEPS_KEY.to_string(), Value::Array(steps));
        Self { entries }
    }

    /// Replace the dialect tag.
    #[must_use]
    pub fn with_lua_version(mut self, version: LuaVersion) -> Self {
        self.entries.insert(
            LUA_VERSION_KEY.to_string(),
            Value::from(version.as_str()),
        );
        self
    }

    /// Set the dialect tag only when the document does not carry one.
    #[must_use]
    pub fn with_default_lua_version(mut self, version: LuaVersion) -> Self {
        let missing = self
            .entries
            .get(LUA_VERSION_KEY)
            .is_none_or(|value| value.is_null() || value.as_str() == Some(""));
        if missing {
            self.entries.insert(
                LUA_VERSION_KEY.to_string(),
                Value::from(version.as_str()),
            );
        }
        self
    }

    /// Dialect tag, if present and a string.
    #[must_use]
    pub fn lua_version(&self) -> Option<&str> {
        self.entries.get(LUA_VERSION_KEY).and_then(Value::as_str)
    }

    /// Names of the configured steps, in order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.entries
            .get(STEPS_KEY)
            .and_then(Value::as_array)
            .map(|steps| {
                steps
                    .iter()
                    .filter_map(|step| step.get("Name").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a top-level option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Convert into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    /// Render as a Lua chunk (`return { ... }`) suitable for `--config`.
    #[must_use]
    pub fn to_lua_chunk(&self) -> String {
        lua_table::render_map_chunk(&self.entries)
    }
}

fn step(name: &str, settings: Value) -> Value {
    json!({ "Name": name, "Settings": settings })
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_documents_match_table() {
        let expected: [(Preset, &[&str]); 9] = [
            (Preset::Minify, &[]),
            (Preset::Weak, &["ConstantArray"]),
            (
                Preset::Medium,
                &["ConstantArray", "EncryptStrings", "WrapInFunction"],
            ),
            (
                Preset::Strong,
                &[
                    "ConstantArray",
                    "EncryptStrings",
                    "SplitStrings",
                    "ProxifyLocals",
                    "WrapInFunction",
                ],
            ),
            (Preset::RobloxMinify, &[]),
            (Preset::RobloxWeak, &["ConstantArray"]),
            (
                Preset::RobloxMedium,
                &["ConstantArray", "EncryptStrings", "WrapInFunction"],
            ),
            (
                Preset::RobloxStrong,
                &[
                    "ConstantArray",
                    "EncryptStrings",
                    "SplitStrings",
                    "ProxifyLocals",
                    "WrapInFunction",
                ],
            ),
            (
                Preset::RobloxSafeStrong,
                &[
                    "ConstantArray",
                    "EncryptStrings",
                    "SplitStrings",
                    "WrapInFunction",
                ],
            ),
        ];

        for (preset, steps) in expected {
            let document = preset.document();
            assert_eq!(document.step_names(), steps, "steps for {preset}");
            assert_eq!(
                document.lua_version(),
                Some(preset.lua_version().as_str()),
                "version for {preset}"
            );
            assert_eq!(
                document.get("NameGenerator").and_then(Value::as_str),
                Some("MangledShuffled")
            );
        }
    }

    #[test]
    fn strong_constant_array_carries_local_wrapper() {
        let document = Preset::Strong.document();
        let threshold = document
            .get(STEPS_KEY)
            .and_then(|steps| steps.get(0))
            .and_then(|step| step.get("Settings"))
            .and_then(|settings| settings.get("LocalWrapperTreshold"))
            .and_then(Value::as_f64);
        assert_eq!(threshold, Some(0.7));
    }

    #[test]
    fn lua_version_override_and_default() -> ObfuscateResult<()> {
        let document = Preset::Medium.document().with_lua_version(LuaVersion::LuaU);
        assert_eq!(document.lua_version(), Some("LuaU"));

        let custom =
            ConfigDocument::from_value(json!({}))?.with_default_lua_version(LuaVersion::Lua51);
        assert_eq!(custom.lua_version(), Some("Lua51"));

        let kept = ConfigDocument::from_value(json!({ "LuaVersion": "LuaU" }))?
            .with_default_lua_version(LuaVersion::Lua51);
        assert_eq!(kept.lua_version(), Some("LuaU"));
        Ok(())
    }

    #[test]
    fn from_value_requires_object() {
        assert!(ConfigDocument::from_value(json!({ "Seed": 1 })).is_ok());
        let err = ConfigDocument::from_value(json!([1, 2])).err();
        assert!(matches!(
            err,
            Some(ObfuscateError::InvalidInput {
                field: "config",
                reason: "not_an_object",
                ..
            })
        ));
    }

    #[test]
    fn chunk_starts_with_return() {
        let chunk = Preset::Minify.document().to_lua_chunk();
        assert!(chunk.starts_with("return {\n"));
        assert!(chunk.contains("Steps = {};"));
    }
}
