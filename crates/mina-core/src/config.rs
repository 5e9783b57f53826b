use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (mina.toml + MINA_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MinaConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub credits: CreditsConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token. Empty at startup is a fatal error.
    #[serde(default)]
    pub bot_token: String,
    /// Gateway presence: "online", "idle", "dnd", or "invisible".
    #[serde(default = "default_status")]
    pub status: String,
    /// Optional "Playing ..." activity shown next to the bot.
    pub activity_name: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            status: default_status(),
            activity_name: None,
        }
    }
}

/// Completion endpoint credentials. The API key is a required process
/// precondition, checked once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    /// API root including the version suffix the provider expects.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Completion length cap. Omitted from requests when not set.
    pub max_tokens: Option<u32>,
    /// Fixed system instruction seeding every conversation.
    #[serde(default)]
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            system_prompt: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditsConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Balance granted to an account on first contact.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: i64,
    /// Credits deducted per accepted query.
    #[serde(default = "default_query_cost")]
    pub query_cost: i64,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            starting_balance: default_starting_balance(),
            query_cost: default_query_cost(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Turns of history (beyond the system turn) sent to the model.
    /// 0 means no bound.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Send attempts before a delivery is abandoned.
    #[serde(default = "default_delivery_attempts")]
    pub delivery_attempts: u32,
    /// Pause between failed send attempts. 0 retries immediately.
    #[serde(default)]
    pub retry_backoff_ms: u64,
    /// Deadline for a single model invocation.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Append-only JSONL audit log of (query, response) pairs.
    #[serde(default = "default_chat_log_path")]
    pub chat_log_path: String,
    /// Title shown on delivered response embeds.
    #[serde(default = "default_response_title")]
    pub response_title: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            delivery_attempts: default_delivery_attempts(),
            retry_backoff_ms: 0,
            request_timeout_secs: default_request_timeout_secs(),
            chat_log_path: default_chat_log_path(),
            response_title: default_response_title(),
        }
    }
}

fn default_status() -> String {
    "online".to_string()
}
fn default_base_url() -> String {
    "https://api.endpoints.anyscale.com/v1".to_string()
}
fn default_model() -> String {
    "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_starting_balance() -> i64 {
    10
}
fn default_query_cost() -> i64 {
    1
}
fn default_history_limit() -> usize {
    40
}
fn default_delivery_attempts() -> u32 {
    3
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_chat_log_path() -> String {
    "chatlog.json".to_string()
}
fn default_response_title() -> String {
    "Mina Chats".to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.mina/mina.db", home)
}

impl MinaConfig {
    /// Load config from a TOML file with MINA_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.mina/mina.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: MinaConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MINA_").split("_"))
            .extract()
            .map_err(|e| crate::error::MinaError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.mina/mina.toml", home)
}
