pub mod fallback;
pub mod prompts;
pub mod suggestions;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::llm::GeminiClient;

/// Default deadline for one generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Question category. Selects canned answers and suggestion phrases.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, poise::ChoiceParameter)]
pub enum Category {
    #[default]
    #[name = "security"]
    Security,
    #[name = "compliance"]
    Compliance,
    #[name = "technical"]
    Technical,
    #[name = "fraud"]
    Fraud,
    #[name = "identity"]
    Identity,
    #[name = "data"]
    Data,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Compliance => "compliance",
            Category::Technical => "technical",
            Category::Fraud => "fraud",
            Category::Identity => "identity",
            Category::Data => "data",
        }
    }

    /// Parse a category name, treating anything unknown as security.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "security" => Ok(Category::Security),
            "compliance" => Ok(Category::Compliance),
            "technical" => Ok(Category::Technical),
            "fraud" => Ok(Category::Fraud),
            "identity" => Ok(Category::Identity),
            "data" => Ok(Category::Data),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// One user submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub category: Category,
}

impl Query {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub response_text: String,
    /// At most five items.
    pub search_suggestions: Vec<String>,
}

/// A result plus, when canned output was used, the reason why.
#[derive(Debug, Clone)]
pub struct Completion {
    pub result: CompletionResult,
    pub degraded: Option<ServiceError>,
}

impl Completion {
    pub fn is_fallback(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Article submitted for summarizing.
#[derive(Debug, Clone, Default)]
pub struct Article {
    pub title: String,
    /// URL the text came from, empty for pasted text.
    pub source: String,
    pub content: String,
}

pub struct CompletionService {
    llm: Arc<GeminiClient>,
    /// Fixed seed for the canned-answer picker. `None` seeds from entropy.
    rng_seed: Option<u64>,
}

impl CompletionService {
    pub fn new(llm: Arc<GeminiClient>) -> Self {
        Self { llm, rng_seed: None }
    }

    #[cfg(test)]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    fn rng(&self) -> fastrand::Rng {
        match self.rng_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    /// Run one call against the generation endpoint, cancelled at `timeout`
    /// or when `parent` fires, whichever comes first.
    async fn generate_with_deadline(
        &self,
        prompt: &str,
        credential: &str,
        timeout: Duration,
        parent: &CancellationToken,
    ) -> Result<String, ServiceError> {
        if credential.trim().is_empty() {
            return Err(ServiceError::MissingCredential);
        }

        let cancel = parent.child_token();
        let call = self.llm.generate(prompt, credential, &cancel);
        tokio::pin!(call);

        let mut timed_out = false;
        let outcome = tokio::select! {
            outcome = &mut call => outcome,
            _ = tokio::time::sleep(timeout) => {
                timed_out = true;
                cancel.cancel();
                (&mut call).await
            }
        };

        match outcome.into_result() {
            Err(ServiceError::Cancelled) if timed_out => Err(ServiceError::Timeout),
            other => other,
        }
    }

    /// Answer a question. Always produces a result: any failure of the
    /// remote call yields the canned answer for the query's category.
    pub async fn complete(&self, query: &Query, credential: &str, timeout: Duration) -> Completion {
        self.complete_with_cancel(query, credential, timeout, &CancellationToken::new())
            .await
    }

    pub async fn complete_with_cancel(
        &self,
        query: &Query,
        credential: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Completion {
        let prompt = prompts::question_prompt(&query.text);

        match self
            .generate_with_deadline(&prompt, credential, timeout, cancel)
            .await
        {
            Ok(text) => {
                let search_suggestions =
                    suggestions::extract(&text, &query.text, query.category);
                info!(
                    category = query.category.as_str(),
                    response_len = text.len(),
                    suggestions = search_suggestions.len(),
                    "completion received"
                );
                Completion {
                    result: CompletionResult {
                        response_text: text,
                        search_suggestions,
                    },
                    degraded: None,
                }
            }
            Err(err) => {
                warn!(category = query.category.as_str(), error = %err, "completion failed, using fallback");
                Completion {
                    result: self.fallback(query),
                    degraded: Some(err),
                }
            }
        }
    }

    /// The canned result for a query.
    pub fn fallback(&self, query: &Query) -> CompletionResult {
        let mut rng = self.rng();
        CompletionResult {
            response_text: fallback::fallback_response(&query.text, query.category, &mut rng),
            search_suggestions: fallback::fallback_suggestions(&query.text, query.category),
        }
    }

    /// Summarize an article. Falls back to the canned analysis on failure.
    pub async fn summarize_article(
        &self,
        article: &Article,
        category: Category,
        credential: &str,
        timeout: Duration,
    ) -> Completion {
        let prompt = prompts::article_prompt(&article.title, &article.source, &article.content);
        let query_text = if article.title.trim().is_empty() {
            article.content.chars().take(200).collect::<String>()
        } else {
            article.title.clone()
        };

        match self
            .generate_with_deadline(&prompt, credential, timeout, &CancellationToken::new())
            .await
        {
            Ok(text) => {
                debug!(response_len = text.len(), "article summary received");
                let search_suggestions = suggestions::extract(&text, &query_text, category);
                Completion {
                    result: CompletionResult {
                        response_text: text,
                        search_suggestions,
                    },
                    degraded: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "article summary failed, using canned analysis");
                let today = chrono::Utc::now().date_naive();
                Completion {
                    result: CompletionResult {
                        response_text: fallback::article_summary(
                            &article.title,
                            &article.source,
                            today,
                        ),
                        search_suggestions: fallback::fallback_suggestions(&query_text, category),
                    },
                    degraded: Some(err),
                }
            }
        }
    }
}
