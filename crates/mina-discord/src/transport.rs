//! `ChatTransport` over a REST-only serenity `Http` handle.
//!
//! The handle is independent of the gateway client, so delivery keeps
//! working across gateway reconnects.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::id::{ChannelId, UserId};

use mina_pipeline::{ChatTransport, Requester, ResponsePayload, TransportError};

const FAILURE_NOTICE: &str = "Sorry, there was an error processing your request.";

pub struct DiscordTransport {
    http: Arc<Http>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Build a transport with its own REST client for `token`.
    pub fn from_token(token: &str) -> Self {
        Self::new(Arc::new(Http::new(token)))
    }
}

fn parse_channel(channel_id: &str) -> Result<ChannelId, TransportError> {
    channel_id
        .parse::<u64>()
        .ok()
        .filter(|&id| id != 0)
        .map(ChannelId::new)
        .ok_or_else(|| TransportError::NotFound(format!("malformed channel id: {channel_id}")))
}

fn parse_user(user_id: &str) -> Result<UserId, TransportError> {
    user_id
        .parse::<u64>()
        .ok()
        .filter(|&id| id != 0)
        .map(UserId::new)
        .ok_or_else(|| TransportError::NotFound(format!("malformed user id: {user_id}")))
}

#[async_trait]
impl ChatTransport for DiscordTransport {
    async fn resolve_channel(&self, channel_id: &str) -> Result<(), TransportError> {
        let id = parse_channel(channel_id)?;
        self.http
            .get_channel(id)
            .await
            .map_err(|e| TransportError::Platform(e.to_string()))?;
        Ok(())
    }

    async fn resolve_user(&self, user_id: &str) -> Result<Requester, TransportError> {
        let id = parse_user(user_id)?;
        let user = self
            .http
            .get_user(id)
            .await
            .map_err(|e| TransportError::Platform(e.to_string()))?;
        Ok(Requester {
            name: user.tag(),
            avatar_url: Some(user.avatar_url().unwrap_or_else(|| user.face())),
        })
    }

    async fn send(
        &self,
        channel_id: &str,
        payload: &ResponsePayload,
    ) -> Result<(), TransportError> {
        let id = parse_channel(channel_id)?;
        let message = CreateMessage::new().embed(crate::embed::response_embed(payload));
        id.send_message(&self.http, message)
            .await
            .map_err(|e| TransportError::Platform(e.to_string()))?;
        Ok(())
    }

    async fn notify_failure(&self, channel_id: &str) -> Result<(), TransportError> {
        let id = parse_channel(channel_id)?;
        id.say(&self.http, FAILURE_NOTICE)
            .await
            .map_err(|e| TransportError::Platform(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_parse() {
        assert!(parse_channel("1234567890").is_ok());
        assert!(parse_user("42").is_ok());
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(matches!(
            parse_channel("not-a-number"),
            Err(TransportError::NotFound(_))
        ));
        assert!(matches!(parse_channel("0"), Err(TransportError::NotFound(_))));
        assert!(matches!(parse_user(""), Err(TransportError::NotFound(_))));
    }
}
