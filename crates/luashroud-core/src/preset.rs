//! Preset registry and Lua dialect identifiers.
//!
//! # Design
//! - The preset set is closed and fixed at compile time.
//! - Parsing is case-insensitive; rendering always uses the canonical spelling.
//! - Unknown tokens resolve to [`Preset::DEFAULT`] via [`Preset::resolve`].

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::ConfigDocument;
use crate::error::ObfuscateError;

/// Named, pre-defined obfuscation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preset {
    /// Minification only.
    Minify,
    /// Constant array extraction for strings.
    Weak,
    /// Balanced pipeline: constant array, string encryption, function wrap.
    Medium,
    /// Full pipeline including string splitting and local proxification.
    Strong,
    /// `Minify` targeting LuaU.
    RobloxMinify,
    /// `Weak` targeting LuaU.
    RobloxWeak,
    /// `Medium` targeting LuaU.
    RobloxMedium,
    /// `Strong` targeting LuaU.
    RobloxStrong,
    /// `Strong` without local proxification or local wrappers, targeting LuaU.
    RobloxSafeStrong,
}

impl Preset {
    /// Every preset in display order.
    pub const ALL: [Self; 9] = [
        Self::Minify,
        Self::Weak,
        Self::Medium,
        Self::Strong,
        Self::RobloxMinify,
        Self::RobloxWeak,
        Self::RobloxMedium,
        Self::RobloxStrong,
        Self::RobloxSafeStrong,
    ];

    /// Preset used when none (or an unknown one) is requested.
    pub const DEFAULT: Self = Self::Medium;

    /// Canonical preset name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minify => "Minify",
            Self::Weak => "Weak",
            Self::Medium => "Medium",
            Self::Strong => "Strong",
            Self::RobloxMinify => "RobloxMinify",
            Self::RobloxWeak => "RobloxWeak",
            Self::RobloxMedium => "RobloxMedium",
            Self::RobloxStrong => "RobloxStrong",
            Self::RobloxSafeStrong => "RobloxSafeStrong",
        }
    }

    /// Whether the external tool ships this preset and accepts it via `--preset`.
    #[must_use]
    pub const fn is_tool_native(self) -> bool {
        matches!(self, Self::Minify | Self::Weak | Self::Medium | Self::Strong)
    }

    /// Whether this preset targets Roblox (LuaU).
    #[must_use]
    pub const fn is_roblox(self) -> bool {
        !self.is_tool_native()
    }

    /// Dialect recorded in this preset's document.
    #[must_use]
    pub const fn lua_version(self) -> LuaVersion {
        if self.is_roblox() {
            LuaVersion::LuaU
        } else {
            LuaVersion::Lua51
        }
    }

    /// One-line description for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Minify => "Only minification, no obfuscation",
            Self::Weak => "Basic obfuscation, fast and safe for most scripts",
            Self::Medium => "Balanced obfuscation (recommended)",
            Self::Strong => "Maximum obfuscation, may break complex scripts",
            Self::RobloxMinify => "Minify for Roblox",
            Self::RobloxWeak => "Basic obfuscation for Roblox",
            Self::RobloxMedium => "Balanced obfuscation for Roblox (recommended)",
            Self::RobloxStrong => "Strong obfuscation for Roblox",
            Self::RobloxSafeStrong => "Strong obfuscation for Roblox without local proxies",
        }
    }

    /// Case-insensitive lookup of a preset token.
    #[must_use]
    pub fn lookup(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(token.trim()))
    }

    /// Resolve an optional token, falling back to [`Preset::DEFAULT`].
    #[must_use]
    pub fn resolve(token: Option<&str>) -> Self {
        token.and_then(Self::lookup).unwrap_or(Self::DEFAULT)
    }

    /// Fixed configuration document for this preset.
    #[must_use]
    pub fn document(self) -> ConfigDocument {
        ConfigDocument::for_preset(self)
    }
}

impl Display for Preset {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = ObfuscateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::lookup(value).ok_or_else(|| {
            ObfuscateError::invalid_input("preset", "unknown_preset", Some(value.to_string()))
        })
    }
}

/// Lua dialect understood by the external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LuaVersion {
    /// Lua 5.1.
    Lua51,
    /// Roblox LuaU.
    LuaU,
}

impl LuaVersion {
    /// Value written to the document's `LuaVersion` key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lua51 => "Lua51",
            Self::LuaU => "LuaU",
        }
    }
}

impl Display for LuaVersion {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for LuaVersion {
    type Err = ObfuscateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lua51" | "lua5.1" => Ok(Self::Lua51),
            "luau" => Ok(Self::LuaU),
            _ => Err(ObfuscateError::invalid_input(
                "luaVersion",
                "unknown_lua_version",
                Some(value.to_string()),
            )),
        }
    }
}
