//! Source extraction: fenced code blocks and `.lua` attachments.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::redirect::Policy;

use crate::error::{BotError, BotResult};

const CODE_BLOCK_PATTERN: &str = r"```(?:lua)?\n?([\s\S]+?)```";
const MAX_REDIRECTS: usize = 10;

/// Finds the first fenced code block in a message.
#[derive(Debug, Clone)]
pub struct CodeBlockExtractor {
    pattern: Regex,
}

impl CodeBlockExtractor {
    /// Compile the code-block pattern.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::RegexCompile`] if the pattern does not compile.
    pub fn new() -> BotResult<Self> {
        let pattern = Regex::new(CODE_BLOCK_PATTERN).map_err(|source| BotError::RegexCompile {
            pattern: CODE_BLOCK_PATTERN,
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Trimmed body of the first ```` ```lua ```` or ```` ``` ```` block.
    #[must_use]
    pub fn extract<'a>(&self, content: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(content)
            .and_then(|captures| captures.get(1))
            .map(|body| body.as_str().trim())
    }
}

/// Attachment metadata taken from a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// File name as uploaded.
    pub name: String,
    /// Size reported by the chat service, in bytes.
    pub size: u64,
    /// Download URL.
    pub url: String,
}

/// Why an attachment was refused before download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentRejection {
    /// The file name does not end in `.lua`.
    NotLua,
    /// The reported size exceeds the bound.
    TooLarge,
}

impl AttachmentRef {
    /// Check the file extension and reported size.
    ///
    /// # Errors
    ///
    /// Returns the first rule the attachment breaks.
    pub fn validate(&self, max_bytes: usize) -> Result<(), AttachmentRejection> {
        if !self.name.ends_with(".lua") {
            return Err(AttachmentRejection::NotLua);
        }
        if self.size > u64::try_from(max_bytes).unwrap_or(u64::MAX) {
            return Err(AttachmentRejection::TooLarge);
        }
        Ok(())
    }
}

/// Downloads attachment bodies.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    /// Fetch `url` as UTF-8 text.
    async fn fetch(&self, url: &str) -> BotResult<String>;
}

/// [`AttachmentFetcher`] over HTTP(S), following redirects.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher whose requests are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::HttpClient`] if the client cannot be built.
    pub fn new(timeout: Duration) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|source| BotError::HttpClient { source })?;
        Ok(Self { client, timeout })
    }

    fn transport_error(&self, source: reqwest::Error) -> BotError {
        if source.is_timeout() {
            BotError::DownloadTimeout {
                after: self.timeout,
            }
        } else {
            BotError::Download { source }
        }
    }
}

#[async_trait]
impl AttachmentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> BotResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BotError::DownloadStatus {
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| self.transport_error(source))?;
        String::from_utf8(body.to_vec()).map_err(|source| BotError::DownloadNotUtf8 { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_block_with_or_without_language() -> BotResult<()> {
        let extractor = CodeBlockExtractor::new()?;
        assert_eq!(
            extractor.extract("!obf\n```lua\nprint(1)\n```\n```lua\nprint(2)\n```"),
            Some("print(1)")
        );
        assert_eq!(
            extractor.extract("!obf ```\n  local x = 1  \n```"),
            Some("local x = 1")
        );
        assert_eq!(extractor.extract("!obf ```print(3)```"), Some("print(3)"));
        assert_eq!(extractor.extract("!obf print(1)"), None);
        assert_eq!(extractor.extract("!obf ``````"), None);
        Ok(())
    }

    #[test]
    fn attachments_must_be_small_lua_files() {
        let attachment = AttachmentRef {
            name: "script.lua".to_string(),
            size: 100,
            url: "https://cdn.example/script.lua".to_string(),
        };
        assert_eq!(attachment.validate(100), Ok(()));
        assert_eq!(
            attachment.validate(99),
            Err(AttachmentRejection::TooLarge)
        );

        let text = AttachmentRef {
            name: "script.txt".to_string(),
            ..attachment
        };
        assert_eq!(text.validate(1000), Err(AttachmentRejection::NotLua));
    }
}
