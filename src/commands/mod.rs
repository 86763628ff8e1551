mod article;
mod ask;
mod config;
mod manage;
mod search;
mod selected;

use crate::state::Context;

/// Discord message limit minus some headroom.
const CHUNK_LEN: usize = 1990;

/// Knowledge base assistant
#[poise::command(
    slash_command,
    subcommands(
        "ask::ask",
        "article::article",
        "search::connect",
        "search::search",
        "selected::select",
        "selected::remove",
        "selected::selected",
        "manage::history",
        "manage::clear",
        "config::key",
        "config::config"
    )
)]
pub async fn kb(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Split text into pieces Discord accepts, preferring line then word breaks.
pub(crate) fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(max);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        if chunk_len == 0 {
            chunk_len = remaining.chars().next().map_or(remaining.len(), char::len_utf8);
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}

/// Send a message in Discord-safe chunks. Uses ctx.say() for every chunk so
/// follow-ups go through the interaction webhook.
pub(crate) async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_chunks(text, CHUNK_LEN) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Reply visible only to the invoking user.
pub(crate) async fn say_private(ctx: &Context<'_>, text: impl Into<String>) -> Result<(), anyhow::Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(text.into())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_prefers_newlines() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_chunks(text, 7), vec!["aaaa\n", "bbbb\n", "cccc"]);
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        let text = "••••••";
        let chunks = split_chunks(text, 4);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.len() <= 4));
    }

    #[test]
    fn test_split_short_text() {
        assert_eq!(split_chunks("hi", CHUNK_LEN), vec!["hi"]);
        assert!(split_chunks("", CHUNK_LEN).is_empty());
    }
}
