pub mod adapter;
pub mod commands;
pub mod context;
pub mod embed;
pub mod error;
pub mod handler;
pub mod transport;

pub use adapter::DiscordAdapter;
pub use context::BotContext;
pub use error::DiscordError;
pub use transport::DiscordTransport;
