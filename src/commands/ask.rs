use chrono::Utc;
use tracing::info;

use super::send_chunked;
use crate::answer::{Category, Completion, Query};
use crate::session::Action;
use crate::state::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum Priority {
    #[name = "low"]
    Low,
    #[name = "medium"]
    Medium,
    #[name = "high"]
    High,
}

impl Priority {
    fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// What the user filled in on the question form.
pub(crate) struct QuestionForm<'a> {
    pub title: &'a str,
    pub details: &'a str,
    pub category: Category,
    pub priority: Priority,
    pub tags: &'a str,
    pub deadline: &'a str,
}

impl QuestionForm<'_> {
    /// Text sent to the model: title and details exactly as typed.
    pub fn input(&self) -> String {
        let title = self.title.trim();
        let details = self.details.trim();
        match (title.is_empty(), details.is_empty()) {
            (_, true) => title.to_string(),
            (true, false) => format!(" {}", details),
            (false, false) => format!("{} {}", title, details),
        }
    }

    /// History entry for the question.
    pub fn summary(&self) -> String {
        let mut meta = format!(
            "Category: {} | Priority: {}",
            self.category.as_str(),
            self.priority.as_str()
        );
        if !self.tags.trim().is_empty() {
            meta.push_str(&format!(" | Tags: {}", self.tags.trim()));
        }
        if !self.deadline.trim().is_empty() {
            meta.push_str(&format!(" | Deadline: {}", self.deadline.trim()));
        }
        format!("**{}**\n\n{}\n\n*{}*", self.title, self.details, meta)
    }
}

/// Answer text followed by numbered search suggestions and, for canned
/// answers, a note saying why.
pub(crate) fn render_completion(completion: &Completion) -> String {
    let mut out = String::new();
    if let Some(err) = &completion.degraded {
        out.push_str(&format!("*{}*\n\n", err.fallback_notice()));
    }
    out.push_str(&completion.result.response_text);

    let suggestions = &completion.result.search_suggestions;
    if !suggestions.is_empty() {
        out.push_str("\n\n---\n\n**Quick Knowledge Base Search Options:**\n");
        for (i, suggestion) in suggestions.iter().enumerate() {
            out.push_str(&format!("\n[{}] **{}**", i + 1, suggestion));
        }
        out.push_str("\n\n*Tip: use `/kb search` to look these up; the suggestions are offered as you type.*");
    }
    out
}

/// Ask the knowledge base a question
#[poise::command(slash_command, guild_only)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "Question title"] title: String,
    #[description = "Additional details"] details: Option<String>,
    #[description = "Category"] category: Option<Category>,
    #[description = "Priority"] priority: Option<Priority>,
    #[description = "Comma-separated tags"] tags: Option<String>,
    #[description = "Deadline"] deadline: Option<String>,
) -> Result<(), anyhow::Error> {
    let form = QuestionForm {
        title: &title,
        details: details.as_deref().unwrap_or(""),
        category: category.unwrap_or(ctx.data().default_category),
        priority: priority.unwrap_or(Priority::Medium),
        tags: tags.as_deref().unwrap_or(""),
        deadline: deadline.as_deref().unwrap_or(""),
    };

    let input = form.input();
    if input.trim().is_empty() {
        ctx.say("Please enter a question.").await?;
        return Ok(());
    }

    ctx.defer().await?;

    let user_id = ctx.author().id.get();
    let session = ctx
        .data()
        .dispatch(
            user_id,
            Action::QuestionAsked {
                content: form.summary(),
                at: Utc::now(),
            },
        )
        .await;
    let key = session.gemini_key.unwrap_or_default();
    let timeout = ctx.data().kb_config.read().await.timeout();

    info!(
        user = %ctx.author().name,
        category = form.category.as_str(),
        priority = form.priority.as_str(),
        "question received"
    );

    let query = Query::new(input, form.category);
    let completion = ctx.data().completion.complete(&query, &key, timeout).await;

    info!(
        fallback = completion.is_fallback(),
        suggestions = completion.result.search_suggestions.len(),
        "question answered"
    );

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
