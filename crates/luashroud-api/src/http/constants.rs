//! Shared HTTP constants (headers, response strings).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub(crate) const SERVICE_NAME: &str = "Prometheus Obfuscator (Roblox/LuaU)";
pub(crate) const LUAU_NOTE: &str = "LuaU support is not fully finished yet";
pub(crate) const LUAU_WARNING: &str = "LuaU support is not fully finished yet. Test thoroughly!";
pub(crate) const LUAU_HINT: &str = "If using LuaU features, some may not be supported yet";
