use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info, warn};

use mina_core::config::DiscordConfig;

use crate::context::BotContext;
use crate::error::DiscordError;
use crate::handler::DiscordHandler;

/// Discord channel adapter.
///
/// Wraps a serenity `Client` and drives the event loop until the process
/// exits. Reconnects automatically whenever the gateway drops.
pub struct DiscordAdapter {
    ctx: Arc<BotContext>,
    config: DiscordConfig,
}

impl DiscordAdapter {
    pub fn new(config: &DiscordConfig, ctx: Arc<BotContext>) -> Result<Self, DiscordError> {
        if config.bot_token.trim().is_empty() {
            return Err(DiscordError::NoToken);
        }
        Ok(Self {
            ctx,
            config: config.clone(),
        })
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Never returns; runs for the lifetime of the process.
    pub async fn run(self) {
        // Slash-command ingress only; the message-content intent is not needed.
        let intents = GatewayIntents::GUILDS | GatewayIntents::DIRECT_MESSAGES;

        let mut client = self.connect_with_retry(intents).await;

        loop {
            info!("Discord: gateway connecting");

            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }

            tokio::time::sleep(Duration::from_secs(5)).await;
            client = self.connect_with_retry(intents).await;
        }
    }

    /// Build a fresh client, retrying every 30s until construction succeeds.
    async fn connect_with_retry(&self, intents: GatewayIntents) -> Client {
        loop {
            match self.build_client(intents).await {
                Ok(c) => return c,
                Err(e) => {
                    error!("Discord: connect failed ({e}), retrying in 30s");
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        }
    }

    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, DiscordError> {
        let handler = DiscordHandler {
            ctx: Arc::clone(&self.ctx),
            config: self.config.clone(),
        };

        let client = Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await?;
        Ok(client)
    }
}
