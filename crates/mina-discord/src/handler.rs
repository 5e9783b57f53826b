use std::sync::Arc;

use serenity::all::ActivityData;
use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::user::OnlineStatus;
use serenity::prelude::{Context, EventHandler};
use tracing::info;

use mina_core::config::DiscordConfig;

use crate::context::BotContext;

/// Serenity event handler wired to the query pipeline.
pub struct DiscordHandler {
    pub ctx: Arc<BotContext>,
    pub config: DiscordConfig,
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        // Config-driven presence.
        let status = parse_online_status(&self.config.status);
        let activity = self.config.activity_name.as_deref().map(ActivityData::playing);
        ctx.set_presence(activity, status);

        info!(name = %ready.user.name, "Discord bot connected");

        crate::commands::register_commands(&ctx).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            crate::commands::handle_interaction(&self.ctx, &ctx, &command).await;
        }
    }
}

/// Parse a config status string into serenity's `OnlineStatus`.
fn parse_online_status(s: &str) -> OnlineStatus {
    match s.to_lowercase().as_str() {
        "idle" => OnlineStatus::Idle,
        "dnd" | "do_not_disturb" => OnlineStatus::DoNotDisturb,
        "invisible" => OnlineStatus::Invisible,
        _ => OnlineStatus::Online,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_map_to_presence() {
        assert_eq!(parse_online_status("idle"), OnlineStatus::Idle);
        assert_eq!(parse_online_status("DND"), OnlineStatus::DoNotDisturb);
        assert_eq!(parse_online_status("invisible"), OnlineStatus::Invisible);
        assert_eq!(parse_online_status("anything"), OnlineStatus::Online);
    }
}
