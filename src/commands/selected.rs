use super::{say_private, send_chunked};
use crate::docs::types::SelectedDocuments;
use crate::session::Action;
use crate::state::Context;

const MAX_CHOICES: usize = 25;

pub(crate) fn render_selected(selected: &SelectedDocuments) -> String {
    if selected.is_empty() {
        return "No documents selected. Use `/kb select` after a search.".to_string();
    }
    let mut out = format!("**Selected documents ({}):**", selected.len());
    for doc in selected.iter() {
        out.push_str(&format!(
            "\n- **{}** (id `{}`, {}) <{}>",
            doc.title, doc.id, doc.space, doc.url
        ));
    }
    out
}

/// Add a document from your last search to your selection
#[poise::command(slash_command, guild_only)]
pub async fn select(
    ctx: Context<'_>,
    #[description = "Document id"]
    #[autocomplete = "autocomplete_result"]
    id: String,
) -> Result<(), anyhow::Error> {
    let session = ctx
        .data()
        .dispatch(ctx.author().id.get(), Action::Select(id.trim().to_string()))
        .await;
    say_private(&ctx, session.status).await
}

/// Remove a document from your selection
#[poise::command(slash_command, guild_only)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Document id"]
    #[autocomplete = "autocomplete_selected"]
    id: String,
) -> Result<(), anyhow::Error> {
    let session = ctx
        .data()
        .dispatch(ctx.author().id.get(), Action::Deselect(id.trim().to_string()))
        .await;
    say_private(&ctx, session.status).await
}

/// List your selected documents
#[poise::command(slash_command, guild_only)]
pub async fn selected(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let session = ctx.data().session(ctx.author().id.get()).await;
    send_chunked(&ctx, &render_selected(&session.selected)).await
}

fn matches(partial: &str, id: &str, title: &str) -> bool {
    let partial = partial.to_lowercase();
    id.contains(&partial) || title.to_lowercase().contains(&partial)
}

async fn autocomplete_result(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let session = ctx.data().session(ctx.author().id.get()).await;
    session
        .results
        .iter()
        .filter(|d| !session.selected.contains(&d.id) && matches(partial, &d.id, &d.title))
        .map(|d| d.id.clone())
        .take(MAX_CHOICES)
        .collect()
}

async fn autocomplete_selected(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let session = ctx.data().session(ctx.author().id.get()).await;
    session
        .selected
        .iter()
        .filter(|d| matches(partial, &d.id, &d.title))
        .map(|d| d.id.clone())
        .take(MAX_CHOICES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::canned::sample_documents;

    #[test]
    fn test_render_selected() {
        let mut selected = SelectedDocuments::default();
        assert!(render_selected(&selected).starts_with("No documents selected"));

        let doc = sample_documents("https://kb.example.com/wiki").remove(0);
        selected.insert(doc.clone());
        let text = render_selected(&selected);
        assert!(text.starts_with("**Selected documents (1):**"));
        assert!(text.contains(&format!("id `{}`", doc.id)));
    }

    #[test]
    fn test_matches_id_or_title() {
        assert!(matches("", "3", "Anything"));
        assert!(matches("3", "3", "Anything"));
        assert!(matches("fraud", "1", "Fraud Detection"));
        assert!(!matches("kyc", "1", "Fraud Detection"));
    }
}
