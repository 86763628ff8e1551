use super::send_chunked;
use crate::session::{Action, ChatMessage, Role};
use crate::state::Context;

/// Messages shown by `/kb history`.
const HISTORY_SHOWN: usize = 10;

pub(crate) fn render_history(messages: &[ChatMessage], limit: usize) -> String {
    if messages.is_empty() {
        return "No conversation yet. Start with `/kb ask`.".to_string();
    }
    let start = messages.len().saturating_sub(limit);
    let mut out = format!(
        "**Conversation ({} of {} messages):**",
        messages.len() - start,
        messages.len()
    );
    for message in &messages[start..] {
        let who = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        out.push_str(&format!(
            "\n\n__{}__ · {}\n{}",
            who,
            message.timestamp.format("%H:%M"),
            message.content
        ));
    }
    out
}

/// Show your recent conversation
#[poise::command(slash_command, guild_only)]
pub async fn history(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let session = ctx.data().session(ctx.author().id.get()).await;
    send_chunked(&ctx, &render_history(&session.messages, HISTORY_SHOWN)).await
}

/// Clear your conversation and search results
#[poise::command(slash_command, guild_only)]
pub async fn clear(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    ctx.data().dispatch(user_id, Action::ClearChat).await;
    ctx.data().dispatch(user_id, Action::ClearResults).await;
    ctx.say("Conversation and search results cleared.").await?;
    Ok(())
}
