//! Reply texts, embeds, and the inline-or-file decision.
//!
//! Everything here is pure; the handler turns a [`Reply`] into gateway calls.

use std::fmt::Write as _;
use std::time::Duration;

use luashroud_core::{ObfuscationOutput, Preset, ToolReadiness};

/// Embed accent colour.
pub const EMBED_COLOUR: u32 = 0x00FF_6B35;
/// Longest message body the chat service accepts.
pub const MESSAGE_LIMIT: usize = 2000;
/// Activity shown once connected.
pub const ACTIVITY: &str = "!help | Lua Obfuscator";

const TIPS: &str = "💡 **Tips:**\n\
• Try a lighter preset (Minify, Weak, RobloxWeak)\n\
• Check your code for syntax errors\n\
• For Roblox, remove type annotations if present";

/// One outgoing message or message edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Message text.
    pub content: Option<String>,
    /// Embed, if any.
    pub embed: Option<EmbedSpec>,
    /// File attachment, if any.
    pub file: Option<ReplyFile>,
}

impl Reply {
    /// Text-only reply, clipped to [`MESSAGE_LIMIT`].
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(clip(content.into(), MESSAGE_LIMIT)),
            ..Self::default()
        }
    }

    fn embed(embed: EmbedSpec) -> Self {
        Self {
            embed: Some(embed),
            ..Self::default()
        }
    }
}

/// File sent alongside a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyFile {
    /// File name shown in chat.
    pub name: String,
    /// File contents.
    pub contents: Vec<u8>,
}

/// Embed description independent of the gateway library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSpec {
    /// Title line.
    pub title: String,
    /// Body text under the title.
    pub description: Option<String>,
    /// Accent colour as `0xRRGGBB`.
    pub colour: u32,
    /// Fields in display order.
    pub fields: Vec<EmbedField>,
    /// Footer text.
    pub footer: Option<String>,
    /// Stamp the embed with the send time.
    pub timestamp: bool,
}

/// One embed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    /// Field heading.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Render beside the previous field.
    pub inline: bool,
}

impl EmbedField {
    fn block(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            inline: false,
        }
    }
}

/// Where the submitted source came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// Fenced code block in the message body.
    CodeBlock,
    /// Uploaded file with this name.
    Attachment(String),
}

/// `!help` embed.
#[must_use]
pub fn help() -> Reply {
    Reply::embed(EmbedSpec {
        title: "🔥 Prometheus Lua Obfuscator Bot".to_string(),
        description: Some("Obfuscate your Lua/Roblox scripts!".to_string()),
        colour: EMBED_COLOUR,
        fields: vec![
            EmbedField::block(
                "📝 !obfuscate [preset]",
                "Obfuscate code in a code block\n```!obfuscate RobloxMedium\n\\`\\`\\`lua\nprint(\"Hello\")\n\\`\\`\\````",
            ),
            EmbedField::block(
                "📎 !obfuscate [preset] + file",
                "Upload a .lua file with the command",
            ),
            EmbedField::block("📋 !presets", "Show all available presets"),
            EmbedField::block("📡 !status", "Show obfuscator status"),
            EmbedField::block("❓ !help", "Show this message"),
            EmbedField::block("⚡ Quick Presets", &quick_presets()),
            EmbedField::block(
                "⚠️ Note",
                "LuaU support is not fully finished. If errors occur, try a lighter preset.",
            ),
        ],
        footer: Some("Powered by Prometheus".to_string()),
        timestamp: true,
    })
}

/// `!presets` embed.
#[must_use]
pub fn presets() -> Reply {
    Reply::embed(EmbedSpec {
        title: "🔥 Available Presets".to_string(),
        description: None,
        colour: EMBED_COLOUR,
        fields: vec![
            EmbedField::block(
                "📦 STANDARD PRESETS (Lua 5.1)",
                &preset_lines(|preset| !preset.is_roblox()),
            ),
            EmbedField::block(
                "🎮 ROBLOX PRESETS (LuaU)",
                &preset_lines(Preset::is_roblox),
            ),
            EmbedField::block(
                "💡 Tips",
                "• For Roblox, use `RobloxMedium` (recommended)\n\
                 • Start with lighter presets and test\n\
                 • Strong presets may cause errors on complex scripts\n\
                 • LuaU support is not fully finished yet",
            ),
        ],
        footer: Some("Usage: !obfuscate <preset>".to_string()),
        timestamp: false,
    })
}

fn quick_presets() -> String {
    let row = |roblox: bool| {
        Preset::ALL
            .iter()
            .filter(|preset| preset.is_roblox() == roblox)
            .map(|preset| format!("`{preset}`"))
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!("{}\n{}", row(false), row(true))
}

fn preset_lines(include: impl Fn(Preset) -> bool) -> String {
    Preset::ALL
        .into_iter()
        .filter(|preset| include(*preset))
        .map(|preset| format!("`{preset}` - {}", preset.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inputs for the `!status` reply.
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// Tool installation snapshot.
    pub tool: ToolReadiness,
    /// Jobs currently running.
    pub active_jobs: usize,
    /// Time since the bot started.
    pub uptime: Duration,
    /// Build identifier.
    pub build: String,
}

/// `!status` reply.
#[must_use]
pub fn status(report: &StatusReport) -> Reply {
    let ready = if report.tool.is_ready() {
        "✅ ready"
    } else if report.tool.install_present {
        "❌ CLI script missing"
    } else {
        "❌ install directory missing"
    };
    Reply::text(format!(
        "📡 **Obfuscator status**\n\
         📂 Path: `{}`\n\
         🔧 Runtime: `{}` `{}`\n\
         🩺 Tool: {ready}\n\
         ⚙️ Active jobs: {}\n\
         ⏱️ Uptime: {}\n\
         🏷️ Build: `{}`",
        report.tool.install_path.display(),
        report.tool.runtime,
        report.tool.cli_script,
        report.active_jobs,
        format_uptime(report.uptime),
        report.build,
    ))
}

/// Message sent while a job runs.
#[must_use]
pub fn processing(origin: &SourceOrigin, preset: Preset) -> String {
    match origin {
        SourceOrigin::CodeBlock => format!("⏳ Obfuscating with preset **{preset}**..."),
        SourceOrigin::Attachment(name) => {
            format!("⏳ Processing **{name}** with preset **{preset}**...")
        }
    }
}

/// Reply for a non-`.lua` attachment.
#[must_use]
pub fn not_lua() -> Reply {
    Reply::text("❌ Please upload a `.lua` file!")
}

/// Reply for an attachment over the size bound.
#[must_use]
pub fn attachment_too_large(max_bytes: usize) -> Reply {
    Reply::text(format!(
        "❌ File too large! Maximum size: {}KB",
        max_bytes / 1024
    ))
}

/// Reply when the message has neither a code block nor an attachment.
#[must_use]
pub fn missing_code() -> Reply {
    Reply::text(
        "❌ Please provide code in a code block or attach a `.lua` file!\n\
         \n\
         **Example:**\n\
         ```\n\
         !obfuscate RobloxMedium\n\
         \\`\\`\\`lua\n\
         print(\"Hello World\")\n\
         \\`\\`\\`\n\
         ```",
    )
}

/// Reply for a code block below the minimum length.
#[must_use]
pub fn code_too_short() -> Reply {
    Reply::text("❌ Code is too short!")
}

/// Reply for a code block over the size bound.
#[must_use]
pub fn code_too_large(max_bytes: usize) -> Reply {
    Reply::text(format!(
        "❌ Code too large! Maximum: {}KB. Please upload as file.",
        max_bytes / 1024
    ))
}

/// Failure reply with remediation tips.
#[must_use]
pub fn failure(message: &str) -> Reply {
    let room = MESSAGE_LIMIT.saturating_sub(TIPS.chars().count() + "❌ Error: \n\n".len());
    Reply::text(format!(
        "❌ Error: {}\n\n{TIPS}",
        clip(message.to_string(), room)
    ))
}

/// Success reply: inline block for small code-block results, a file otherwise.
#[must_use]
pub fn obfuscated(output: &ObfuscationOutput, origin: &SourceOrigin, inline_limit: usize) -> Reply {
    let preset = output.preset_label;
    let ratio = format!("{:.2}x", output.ratio());
    let elapsed = format!("{:.2}s", output.elapsed.as_secs_f64());
    let sizes = format!(
        "📏 Size: {} → {} bytes ({ratio})",
        output.original_size, output.obfuscated_size
    );

    if matches!(origin, SourceOrigin::CodeBlock) && output.code.chars().count() <= inline_limit {
        let inline = format!(
            "✅ Obfuscation complete!\n\
             📊 Preset: **{preset}** | Size: {ratio} | Time: {elapsed}\n\
             ```lua\n{}\n```",
            output.code
        );
        if inline.chars().count() <= MESSAGE_LIMIT {
            return Reply {
                content: Some(inline),
                ..Reply::default()
            };
        }
    }

    match origin {
        SourceOrigin::CodeBlock => Reply {
            content: Some(format!(
                "✅ Obfuscation complete!\n\
                 📊 Preset: **{preset}**\n\
                 {sizes}\n\
                 ⏱️ Time: {elapsed}\n\
                 📦 Output too large, sent as file."
            )),
            embed: None,
            file: Some(ReplyFile {
                name: format!("obfuscated_{}.lua", preset.to_ascii_lowercase()),
                contents: output.code.clone().into_bytes(),
            }),
        },
        SourceOrigin::Attachment(name) => Reply {
            content: Some(format!(
                "✅ **{name}** obfuscated!\n\
                 📊 Preset: **{preset}**\n\
                 {sizes}\n\
                 ⏱️ Time: {elapsed}"
            )),
            embed: None,
            file: Some(ReplyFile {
                name: format!("obfuscated_{name}"),
                contents: output.code.clone().into_bytes(),
            }),
        },
    }
}

/// `1d 2h 3m 4s`, omitting leading zero units.
#[must_use]
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60,
    );
    let mut out = String::new();
    if days > 0 {
        let _ = write!(out, "{days}d ");
    }
    if days > 0 || hours > 0 {
        let _ = write!(out, "{hours}h ");
    }
    if total >= 60 {
        let _ = write!(out, "{minutes}m ");
    }
    let _ = write!(out, "{seconds}s");
    out
}

fn clip(mut text: String, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut = text
            .char_indices()
            .nth(max_chars.saturating_sub(1))
            .map_or(0, |(index, _)| index);
        text.truncate(cut);
        text.push('…');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn output(code: &str) -> ObfuscationOutput {
        ObfuscationOutput {
            code: code.to_string(),
            preset_label: "Medium",
            lua_version: Some("Lua51".to_string()),
            original_size: 8,
            obfuscated_size: code.len(),
            elapsed: Duration::from_millis(1234),
        }
    }

    #[test]
    fn small_code_block_results_are_inline_only() {
        let reply = obfuscated(&output("print(1)"), &SourceOrigin::CodeBlock, 1900);
        assert!(reply.file.is_none());
        let content = reply.content.unwrap_or_default();
        assert!(content.contains("```lua\nprint(1)\n```"));
        assert!(content.contains("Size: 1.00x | Time: 1.23s"));
    }

    #[test]
    fn large_results_are_files_only() {
        let code = "x".repeat(1901);
        let reply = obfuscated(&output(&code), &SourceOrigin::CodeBlock, 1900);
        let file = reply.file.as_ref().map(|file| file.name.as_str());
        assert_eq!(file, Some("obfuscated_medium.lua"));
        let content = reply.content.unwrap_or_default();
        assert!(!content.contains("```"));
        assert!(content.contains("📦 Output too large, sent as file."));

        let exact = obfuscated(&output(&"y".repeat(1900)), &SourceOrigin::CodeBlock, 1900);
        assert!(exact.file.is_none());
    }

    #[test]
    fn inline_never_overflows_the_message_limit() {
        let code = "x".repeat(1950);
        let reply = obfuscated(&output(&code), &SourceOrigin::CodeBlock, 1990);
        let file = reply.file.as_ref().map(|file| file.contents.clone());
        assert_eq!(file, Some(code.into_bytes()));
        let content = reply.content.unwrap_or_default();
        assert!(!content.contains("```"));
        assert!(!content.contains('…'));
        assert!(content.chars().count() <= MESSAGE_LIMIT);
    }

    #[test]
    fn attachment_results_are_always_files() {
        let origin = SourceOrigin::Attachment("game.lua".to_string());
        let reply = obfuscated(&output("print(1)"), &origin, 1900);
        assert_eq!(
            reply.file.map(|file| file.name),
            Some("obfuscated_game.lua".to_string())
        );
        let content = reply.content.unwrap_or_default();
        assert!(content.starts_with("✅ **game.lua** obfuscated!"));
        assert!(content.contains("📏 Size: 8 → 8 bytes (1.00x)"));
    }

    #[test]
    fn failures_carry_tips_and_fit_one_message() {
        let reply = failure(&"e".repeat(5000));
        let content = reply.content.unwrap_or_default();
        assert!(content.starts_with("❌ Error: eee"));
        assert!(content.ends_with("For Roblox, remove type annotations if present"));
        assert!(content.chars().count() <= MESSAGE_LIMIT);
    }

    #[test]
    fn embeds_list_every_preset() -> Result<(), &'static str> {
        let presets = presets().embed.ok_or("presets reply has no embed")?;
        let listed: String = presets.fields.iter().map(|field| field.value.as_str()).collect();
        for preset in Preset::ALL {
            assert!(listed.contains(&format!("`{preset}`")), "{preset} missing");
        }
        assert_eq!(presets.colour, EMBED_COLOUR);

        let help = help().embed.map(|embed| embed.title);
        assert_eq!(help.as_deref(), Some("🔥 Prometheus Lua Obfuscator Bot"));
        Ok(())
    }

    #[test]
    fn status_reports_readiness_and_uptime() {
        let report = StatusReport {
            tool: ToolReadiness {
                install_path: PathBuf::from("/opt/prometheus"),
                runtime: "lua5.1".to_string(),
                cli_script: "cli.lua".to_string(),
                install_present: true,
                cli_present: false,
            },
            active_jobs: 2,
            uptime: Duration::from_secs(3_725),
            build: "abc123".to_string(),
        };
        let content = status(&report).content.unwrap_or_default();
        assert!(content.contains("`/opt/prometheus`"));
        assert!(content.contains("CLI script missing"));
        assert!(content.contains("Active jobs: 2"));
        assert!(content.contains("Uptime: 1h 2m 5s"));
        assert!(content.contains("`abc123`"));
    }

    #[test]
    fn uptime_omits_leading_zero_units() {
        assert_eq!(format_uptime(Duration::from_secs(5)), "5s");
        assert_eq!(format_uptime(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip("héllo".to_string(), 10), "héllo");
        assert_eq!(clip("héllo".to_string(), 3), "hé…");
    }
}
