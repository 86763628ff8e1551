use chrono::Utc;
use tracing::{info, warn};

use super::ask::render_completion;
use super::send_chunked;
use crate::answer::{Article, Category};
use crate::docs::ingest::fetch_article;
use crate::session::Action;
use crate::state::Context;

/// Build the article from pasted text. A URL alone is a reference, not content.
fn pasted_article(url: Option<&str>, title: Option<&str>, content: &str) -> Article {
    Article {
        title: title.map(|t| t.trim().to_string()).unwrap_or_default(),
        source: url.map(|u| u.trim().to_string()).unwrap_or_default(),
        content: content.to_string(),
    }
}

/// Summarize an external article by URL or pasted text
#[poise::command(slash_command, guild_only)]
pub async fn article(
    ctx: Context<'_>,
    #[description = "Article URL"] url: Option<String>,
    #[description = "Article title"] title: Option<String>,
    #[description = "Pasted article text (used instead of fetching the URL)"] content: Option<String>,
    #[description = "Category"] category: Option<Category>,
) -> Result<(), anyhow::Error> {
    let url = url.filter(|u| !u.trim().is_empty());
    let content = content.filter(|c| !c.trim().is_empty());
    if url.is_none() && content.is_none() {
        ctx.say("Provide an article URL or paste the article text.").await?;
        return Ok(());
    }

    ctx.defer().await?;

    let article = match (&content, &url) {
        (Some(text), _) => pasted_article(url.as_deref(), title.as_deref(), text),
        (None, Some(link)) => {
            match fetch_article(&ctx.data().http, link.trim(), title.as_deref()).await {
                Ok(article) => article,
                Err(e) => {
                    warn!(url = %link, error = %e, "article fetch failed");
                    ctx.say(format!("Could not fetch the article: {}", e)).await?;
                    return Ok(());
                }
            }
        }
        (None, None) => return Ok(()),
    };

    let category = category.unwrap_or(ctx.data().default_category);
    let user_id = ctx.author().id.get();
    let label = if article.title.is_empty() {
        "External Article Analysis"
    } else {
        &article.title
    };
    let session = ctx
        .data()
        .dispatch(
            user_id,
            Action::QuestionAsked {
                content: format!("**Article analysis:** {}", label),
                at: Utc::now(),
            },
        )
        .await;
    let key = session.gemini_key.unwrap_or_default();
    let timeout = ctx.data().kb_config.read().await.timeout();

    info!(
        user = %ctx.author().name,
        size = article.content.len(),
        "article summary requested"
    );

    let completion = ctx
        .data()
        .completion
        .summarize_article(&article, category, &key, timeout)
        .await;

    let reply = render_completion(&completion);
    ctx.data()
        .dispatch(
            user_id,
            Action::AnswerReceived {
                content: completion.result.response_text,
                suggestions: completion.result.search_suggestions,
                at: Utc::now(),
            },
        )
        .await;

    send_chunked(&ctx, &reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pasted_article_keeps_url_as_source() {
        let article = pasted_article(Some(" https://blog.example.com/a "), Some(" A "), "body");
        assert_eq!(article.title, "A");
        assert_eq!(article.source, "https://blog.example.com/a");
        assert_eq!(article.content, "body");
    }

    #[test]
    fn test_pasted_article_without_title() {
        let article = pasted_article(None, None, "body");
        assert!(article.title.is_empty());
        assert!(article.source.is_empty());
    }
}
