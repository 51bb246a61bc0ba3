//! Gateway client host.

use std::sync::Arc;

use luashroud_config::BotConfig;
use luashroud_core::SharedObfuscator;
use luashroud_telemetry::Metrics;
use serenity::Client;
use serenity::all::GatewayIntents;

use crate::error::{BotError, BotResult};
use crate::handler::Handler;
use crate::service::ChatService;
use crate::source::HttpFetcher;

/// Discord bot wired to the shared invoker.
pub struct ChatBot {
    token: String,
    service: Arc<ChatService>,
}

impl ChatBot {
    /// Build the bot from its configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the download client or code-block pattern cannot be built.
    pub fn new(
        config: &BotConfig,
        obfuscator: SharedObfuscator,
        telemetry: Metrics,
    ) -> BotResult<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config.download_timeout)?);
        let service = ChatService::new(config, obfuscator, telemetry, fetcher)?;
        Ok(Self {
            token: config.token.clone(),
            service: Arc::new(service),
        })
    }

    /// Connect to the gateway and handle events until the connection ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the gateway connection fails.
    pub async fn run(self) -> BotResult<()> {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;
        let mut client = Client::builder(&self.token, intents)
            .event_handler(Handler::new(self.service))
            .await
            .map_err(|source| BotError::discord("client.build", source))?;
        tracing::info!("Starting chat bot");
        client
            .start()
            .await
            .map_err(|source| BotError::discord("client.start", source))
    }
}
