//! Discord slash commands: `/ask` and `/credits`.
//!
//! Registration happens in `ready()`; interactions are dispatched from
//! `interaction_create` in the event handler. `/ask` only acknowledges
//! receipt; the answer arrives asynchronously through the delivery agent.

use std::sync::Arc;

use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::prelude::Context;
use tracing::{error, info, warn};

use mina_core::types::PendingRequest;

use crate::context::BotContext;

const ACK_RECEIVED: &str = "Your query has been received and is being processed.";
const ACK_FAILED: &str = "Sorry, there was an error processing your request.";

/// Register global slash commands. Call from `ready()`.
pub async fn register_commands(ctx: &Context) {
    let commands = vec![
        CreateCommand::new("ask")
            .description("Submit a query for the bot to process")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "query", "The query text")
                    .required(true),
            ),
        CreateCommand::new("credits").description("Show your remaining query credits"),
    ];

    match serenity::model::application::Command::set_global_commands(&ctx.http, commands).await {
        Ok(cmds) => info!(count = cmds.len(), "registered global slash commands"),
        Err(e) => warn!(error = %e, "failed to register global slash commands"),
    }
}

/// Dispatch a slash command interaction to the appropriate handler.
pub async fn handle_interaction(app: &Arc<BotContext>, ctx: &Context, command: &CommandInteraction) {
    let result = match command.data.name.as_str() {
        "ask" => handle_ask(app, ctx, command).await,
        "credits" => handle_credits(app, ctx, command).await,
        _ => {
            respond_ephemeral(ctx, command, "Unknown command.").await;
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!(command = %command.data.name, error = %e, "slash command error");
    }
}

/// `/ask query:String`: cache the submission context and queue the query.
async fn handle_ask(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let query = command
        .data
        .options
        .iter()
        .find(|o| o.name == "query")
        .and_then(|o| o.value.as_str())
        .unwrap_or("");

    if query.trim().is_empty() {
        respond_ephemeral(ctx, command, "Please provide a query.").await;
        return Ok(());
    }

    // Defer ephemerally; only the invoker sees the acknowledgment.
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(
                CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;

    let request = PendingRequest {
        user_id: command.user.id.to_string(),
        channel_id: command.channel_id.to_string(),
        guild_id: command
            .guild_id
            .map(|g| g.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        query: query.to_string(),
    };

    let ack = match app.pipeline.submit(request) {
        Ok(()) => ACK_RECEIVED,
        Err(e) => {
            error!(
                user_id = %command.user.id,
                channel_id = %command.channel_id,
                error = %e,
                "query submission rejected"
            );
            ACK_FAILED
        }
    };

    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(ack))
        .await?;
    Ok(())
}

/// `/credits`: report the invoker's remaining balance (ephemeral).
async fn handle_credits(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let user_id = command.user.id.to_string();
    let content = match app.credits.balance(&user_id).await {
        Ok(balance) => format!("You have **{balance}** query credit(s) remaining."),
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "credit balance lookup failed");
            "Credit balance is unavailable right now.".to_string()
        }
    };

    respond_ephemeral(ctx, command, &content).await;
    Ok(())
}

/// Send an ephemeral response to a slash command (only visible to the invoker).
async fn respond_ephemeral(ctx: &Context, command: &CommandInteraction, content: &str) {
    let _ = command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await;
}
