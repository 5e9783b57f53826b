//! Response embed construction: the "Mina Chats" presentation card.

use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::Timestamp;

use mina_pipeline::ResponsePayload;

/// Embed accent color.
const EMBED_COLOR: u32 = 0x0099ff;

/// Discord caps embed field values at 1024 characters.
const FIELD_MAX: usize = 1024;

/// Build the response embed for one delivered query.
pub fn response_embed(payload: &ResponsePayload) -> CreateEmbed {
    let mut footer = CreateEmbedFooter::new(format!("Requested by {}", payload.requester.name));
    if let Some(ref url) = payload.requester.avatar_url {
        footer = footer.icon_url(url);
    }

    CreateEmbed::new()
        .colour(EMBED_COLOR)
        .title(&payload.title)
        .field(
            "Your Query",
            field_text(&payload.query, "No query provided"),
            false,
        )
        .field(
            "Response",
            field_text(&payload.response, "No response provided"),
            false,
        )
        .footer(footer)
        .timestamp(Timestamp::now())
}

/// Clamp text to Discord's field-value limit, appending an ellipsis when
/// truncated. Discord rejects empty field values, hence the placeholder.
fn field_text(text: &str, placeholder: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return placeholder.to_string();
    }
    if trimmed.chars().count() <= FIELD_MAX {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(FIELD_MAX - 1).collect();
    out.push('\u{2026}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_passes_through() {
        assert_eq!(field_text("hello", "x"), "hello");
    }

    #[test]
    fn blank_text_becomes_placeholder() {
        assert_eq!(field_text("   ", "No query provided"), "No query provided");
    }

    #[test]
    fn long_text_is_clamped_to_the_field_limit() {
        let long = "a".repeat(3000);
        let clamped = field_text(&long, "x");
        assert_eq!(clamped.chars().count(), FIELD_MAX);
        assert!(clamped.ends_with('\u{2026}'));
    }

    #[test]
    fn clamp_counts_chars_not_bytes() {
        let long = "é".repeat(2000);
        let clamped = field_text(&long, "x");
        assert_eq!(clamped.chars().count(), FIELD_MAX);
    }
}
