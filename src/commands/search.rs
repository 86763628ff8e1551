use tracing::info;

use super::{say_private, send_chunked};
use crate::docs::types::{Credentials, DocumentRecord, SearchOutcome};
use crate::session::Action;
use crate::state::Context;

/// Discord caps autocomplete lists at 25 entries.
const MAX_CHOICES: usize = 25;

pub(crate) fn render_results(outcome: &SearchOutcome) -> String {
    let mut out = format!("*{}*", outcome.status);
    for (i, doc) in outcome.documents.iter().enumerate() {
        out.push_str(&format!("\n\n{}", render_document(i + 1, doc)));
    }
    if !outcome.documents.is_empty() {
        out.push_str("\n\n*Use `/kb select` with an id to keep a document.*");
    }
    out
}

fn render_document(n: usize, doc: &DocumentRecord) -> String {
    format!(
        "**{}. {}** (id `{}`)\n{} | {} | {}\n{}\n<{}>",
        n,
        doc.title,
        doc.id,
        doc.space,
        doc.author,
        doc.last_modified.format("%Y-%m-%d"),
        doc.content,
        doc.url
    )
}

/// Connect to the knowledge base with your username and API token
#[poise::command(slash_command, guild_only)]
pub async fn connect(
    ctx: Context<'_>,
    #[description = "Account email or username"] username: String,
    #[description = "API token (only you see the reply)"] token: String,
) -> Result<(), anyhow::Error> {
    ctx.defer_ephemeral().await?;

    let user_id = ctx.author().id.get();
    let credentials = Credentials::new(username.trim(), token.trim());
    ctx.data()
        .dispatch(user_id, Action::SetCredentials(credentials.clone()))
        .await;

    let result = ctx.data().search.connect(&credentials).await;
    info!(user = %ctx.author().name, ok = result.ok, "knowledge base connect");
    let session = ctx
        .data()
        .dispatch(user_id, Action::ConnectionChecked(result))
        .await;

    say_private(&ctx, session.status).await
}

/// Search the knowledge base
#[poise::command(slash_command, guild_only)]
pub async fn search(
    ctx: Context<'_>,
    #[description = "Search terms"]
    #[autocomplete = "autocomplete_suggestion"]
    query: String,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let user_id = ctx.author().id.get();
    let session = ctx.data().session(user_id).await;
    let limit = ctx.data().kb_config.read().await.search_limit;

    let outcome = ctx
        .data()
        .search
        .search(&query, session.credentials.as_ref(), session.connected, limit)
        .await;
    info!(
        user = %ctx.author().name,
        results = outcome.documents.len(),
        source = ?outcome.source,
        "knowledge base search"
    );

    let reply = render_results(&outcome);
    ctx.data()
        .dispatch(user_id, Action::SearchCompleted(outcome))
        .await;

    send_chunked(&ctx, &reply).await
}

/// Offer the suggestions from the last answer.
async fn autocomplete_suggestion(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let session = ctx.data().session(ctx.author().id.get()).await;
    let partial = partial.to_lowercase();

    session
        .last_suggestions
        .into_iter()
        .filter(|s| s.to_lowercase().contains(&partial))
        .take(MAX_CHOICES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::canned::sample_documents;
    use crate::docs::types::SearchSource;

    #[test]
    fn test_render_sample_results() {
        let documents = sample_documents("https://kb.example.com/wiki");
        let outcome = SearchOutcome {
            documents: documents[..2].to_vec(),
            status: "Found 2 sample documents".to_string(),
            connected: false,
            source: SearchSource::Sample,
        };
        let text = render_results(&outcome);
        assert!(text.starts_with("*Found 2 sample documents*"));
        assert!(text.contains(&format!("**1. {}** (id `{}`)", documents[0].title, documents[0].id)));
        assert!(text.contains(&format!("<{}>", documents[1].url)));
    }

    #[test]
    fn test_render_empty_results() {
        let outcome = SearchOutcome {
            documents: vec![],
            status: "No results found".to_string(),
            connected: true,
            source: SearchSource::Remote,
        };
        assert_eq!(render_results(&outcome), "*No results found*");
    }
}
