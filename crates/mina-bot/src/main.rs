use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use mina_core::error::MinaError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mina=info".into()),
        )
        .init();

    // load config: explicit MINA_CONFIG env > ~/.mina/mina.toml
    let config_path = std::env::var("MINA_CONFIG").ok();
    let config = mina_core::config::MinaConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        mina_core::config::MinaConfig::default()
    });

    // Missing credentials are a startup error, never a per-request one.
    if config.provider.api_key.trim().is_empty() {
        return Err(MinaError::MissingCredential("provider.api_key").into());
    }
    if config.discord.bot_token.trim().is_empty() {
        return Err(MinaError::MissingCredential("discord.bot_token").into());
    }

    // Credit ledger; the schema migration is idempotent.
    let db_path = &config.credits.db_path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening credit ledger");
    let conn = rusqlite::Connection::open(db_path)?;
    mina_credits::db::init_db(&conn)?;
    let credits: Arc<dyn mina_credits::CreditGate> = Arc::new(mina_credits::SqliteLedger::new(
        conn,
        config.credits.starting_balance,
        config.credits.query_cost,
    ));

    // Model client + per-user conversation history.
    let model: Arc<dyn mina_agent::ModelClient> = Arc::new(mina_agent::OpenAiClient::new(
        config.provider.api_key.clone(),
        config.provider.base_url.clone(),
    ));
    info!(
        provider = model.name(),
        base_url = %config.provider.base_url,
        model = %config.agent.model,
        "model client ready"
    );
    let store = Arc::new(mina_agent::ConversationStore::new(
        config.agent.system_prompt.clone(),
    ));

    // Pending-request cache shared by ingress, queue, and delivery.
    let cache: Arc<dyn mina_pipeline::PendingStore> =
        Arc::new(mina_pipeline::MemoryPendingStore::new());

    // REST-only transport: stays valid across gateway reconnects.
    let transport = Arc::new(mina_discord::DiscordTransport::from_token(
        &config.discord.bot_token,
    ));

    let delivery = Arc::new(mina_pipeline::DeliveryAgent::new(
        transport,
        Arc::clone(&cache),
        mina_pipeline::ChatLogAppender::new(&config.pipeline.chat_log_path),
        config.pipeline.response_title.clone(),
        config.pipeline.delivery_attempts,
        Duration::from_millis(config.pipeline.retry_backoff_ms),
    ));

    let queue = mina_pipeline::QueryQueue::new(
        Arc::clone(&credits),
        Arc::clone(&cache),
        Arc::clone(&store),
        model,
        mina_pipeline::QueueSettings {
            model: config.agent.model.clone(),
            temperature: config.agent.temperature,
            max_tokens: config.agent.max_tokens,
            history_limit: config.pipeline.history_limit,
            request_timeout: Duration::from_secs(config.pipeline.request_timeout_secs),
        },
    );

    let pipeline = Arc::new(mina_pipeline::QueryPipeline::new(cache, queue, delivery));

    let ctx = Arc::new(mina_discord::BotContext { pipeline, credits });
    let adapter = mina_discord::DiscordAdapter::new(&config.discord, ctx)?;

    info!("mina starting");
    adapter.run().await;
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
