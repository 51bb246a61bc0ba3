//! Chat command grammar.

use luashroud_core::Preset;

/// Recognised chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `!help` / `!h`.
    Help,
    /// `!presets` / `!preset`.
    Presets,
    /// `!status`.
    Status,
    /// `!obfuscate` / `!obf`, with the preset named in the arguments.
    Obfuscate {
        /// Requested preset, `Medium` when none matched.
        preset: Preset,
    },
}

impl Command {
    /// Classify a message by its first token. Returns `None` for anything else.
    ///
    /// The head token ends at whitespace or at an opening fence, so a code
    /// block glued to `!obf` still names the command.
    #[must_use]
    pub fn parse(content: &str) -> Option<Self> {
        let (head, rest) = split_head(content.trim_start());
        let tokens = rest.split_whitespace();
        match head.to_ascii_lowercase().as_str() {
            "!help" | "!h" => Some(Self::Help),
            "!presets" | "!preset" => Some(Self::Presets),
            "!status" => Some(Self::Status),
            "!obfuscate" | "!obf" => Some(Self::Obfuscate {
                preset: preset_argument(tokens),
            }),
            _ => None,
        }
    }

    /// Label used in spans.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Presets => "presets",
            Self::Status => "status",
            Self::Obfuscate { .. } => "obfuscate",
        }
    }
}

fn split_head(content: &str) -> (&str, &str) {
    let end = content
        .find(char::is_whitespace)
        .unwrap_or(content.len());
    let end = content[..end].find("```").unwrap_or(end);
    content.split_at(end)
}

/// First argument naming a known preset. Scanning stops at the opening fence.
fn preset_argument<'a>(tokens: impl Iterator<Item = &'a str>) -> Preset {
    tokens
        .take_while(|token| !token.starts_with("```"))
        .find_map(Preset::lookup)
        .unwrap_or(Preset::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_match_exact_tokens_case_insensitively() {
        assert_eq!(Command::parse("!HELP"), Some(Command::Help));
        assert_eq!(Command::parse("  !h  "), Some(Command::Help));
        assert_eq!(Command::parse("!preset"), Some(Command::Presets));
        assert_eq!(Command::parse("!Status"), Some(Command::Status));
        assert_eq!(Command::parse("!obfx"), None);
        assert_eq!(Command::parse("!helpme"), None);
        assert_eq!(Command::parse("hello !help"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn obfuscate_picks_first_known_preset() {
        assert_eq!(
            Command::parse("!obf please robloxstrong weak"),
            Some(Command::Obfuscate {
                preset: Preset::RobloxStrong
            })
        );
        assert_eq!(
            Command::parse("!OBFUSCATE"),
            Some(Command::Obfuscate {
                preset: Preset::Medium
            })
        );
        assert_eq!(
            Command::parse("!obfuscate Ultra"),
            Some(Command::Obfuscate {
                preset: Preset::Medium
            })
        );
    }

    #[test]
    fn preset_words_inside_code_are_ignored() {
        assert_eq!(
            Command::parse("!obfuscate\n```lua\nlocal Strong = 1\n```"),
            Some(Command::Obfuscate {
                preset: Preset::Medium
            })
        );
        assert_eq!(
            Command::parse("!obfuscate Weak ```lua\nprint(1)```"),
            Some(Command::Obfuscate {
                preset: Preset::Weak
            })
        );
    }

    #[test]
    fn fence_glued_to_command_still_parses() {
        assert_eq!(
            Command::parse("!obf```lua\nlocal Strong = 1\n```"),
            Some(Command::Obfuscate {
                preset: Preset::Medium
            })
        );
        assert_eq!(
            Command::parse("!OBFUSCATE```print(1)```"),
            Some(Command::Obfuscate {
                preset: Preset::Medium
            })
        );
        assert_eq!(Command::parse("!obfx```lua\nprint(1)```"), None);
        assert_eq!(Command::parse("```lua\nprint(1)```"), None);
    }
}
