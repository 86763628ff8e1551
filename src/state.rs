use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::answer::{Category, CompletionService, DEFAULT_TIMEOUT};
use crate::docs::{DocumentSearch, MAX_SEARCH_LIMIT};
use crate::llm::GeminiClient;
use crate::session::{Action, Session};

/// Settings admins can change at runtime.
pub struct KbConfig {
    pub timeout_ms: u64,
    pub search_limit: u32,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            search_limit: MAX_SEARCH_LIMIT,
        }
    }
}

impl KbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

pub struct AppState {
    pub llm: Arc<GeminiClient>,
    pub completion: Arc<CompletionService>,
    pub search: Arc<DocumentSearch>,
    /// Plain client for fetching article URLs.
    pub http: reqwest::Client,
    pub admin_ids: HashSet<u64>,
    /// Used when a command leaves the category out.
    pub default_category: Category,
    pub kb_config: Arc<RwLock<KbConfig>>,
    sessions: RwLock<HashMap<u64, Session>>,
}

impl AppState {
    pub fn new(
        llm: Arc<GeminiClient>,
        completion: Arc<CompletionService>,
        search: Arc<DocumentSearch>,
        http: reqwest::Client,
        admin_ids: HashSet<u64>,
    ) -> Self {
        Self {
            llm,
            completion,
            search,
            http,
            admin_ids,
            default_category: Category::default(),
            kb_config: Arc::new(RwLock::new(KbConfig::default())),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_default_category(mut self, category: Category) -> Self {
        self.default_category = category;
        self
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Snapshot of a user's session.
    pub async fn session(&self, user_id: u64) -> Session {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Apply one action to a user's session and return the new state.
    pub async fn dispatch(&self, user_id: u64, action: Action) -> Session {
        let mut sessions = self.sessions.write().await;
        let current = sessions.remove(&user_id).unwrap_or_default();
        let next = current.reduce(action);
        sessions.insert(user_id, next.clone());
        next
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
