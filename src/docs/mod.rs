pub mod canned;
pub mod ingest;
pub mod types;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use html2text::render::TrivialDecorator;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use types::{ConnectionResult, Credentials, DocumentRecord, SearchOutcome, SearchSource};

/// Preview length kept from a page body, in chars.
const PREVIEW_CHARS: usize = 200;

/// Wide enough that previews are never wrapped mid-sentence.
const RENDER_WIDTH: usize = 10_000;

pub const MIN_SEARCH_LIMIT: u32 = 10;
pub const MAX_SEARCH_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentUser {
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<RawHit>,
}

#[derive(Debug, Default, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LastUpdated {
    when: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct History {
    created_by: Option<Person>,
    last_updated: Option<LastUpdated>,
}

#[derive(Debug, Default, Deserialize)]
struct BodyValue {
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Body {
    view: Option<BodyValue>,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    webui: Option<String>,
}

/// One entry of `results` in a content search reply. Everything but the id
/// may be missing.
#[derive(Debug, Default, Deserialize)]
struct RawHit {
    #[serde(default)]
    id: String,
    title: Option<String>,
    space: Option<Named>,
    history: Option<History>,
    body: Option<Body>,
    #[serde(rename = "_links")]
    links: Option<Links>,
}

/// Render page markup to a single line of plain text. Entities are decoded
/// and runs of whitespace collapse to one space.
pub fn strip_markup(html: &str) -> String {
    let text = html2text::from_read_with_decorator(html.as_bytes(), RENDER_WIDTH, TrivialDecorator::new())
        .unwrap_or_else(|_| html.to_string());
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Markup-free preview: first 200 chars plus an ellipsis.
fn preview(html: &str) -> String {
    let text: String = strip_markup(html).chars().take(PREVIEW_CHARS).collect();
    format!("{}...", text)
}

/// Escape a user query for use inside a quoted CQL string.
pub fn cql_text_query(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('"', "\\\"");
    format!("text~\"{}\"", escaped)
}

/// Network failures get a message that points at the network rather than at
/// the credentials.
fn transport_message(err: &ServiceError, during_search: bool) -> String {
    match err {
        ServiceError::Network {
            unreachable: true, ..
        } => {
            if during_search {
                "Network error during search. The knowledge base could not be reached (proxy, VPN or firewall)."
                    .to_string()
            } else {
                "Network error. The knowledge base could not be reached; this is a network issue, \
                 not a credentials issue. Check proxy, VPN or firewall settings."
                    .to_string()
            }
        }
        ServiceError::Timeout => "The knowledge base did not respond in time. Please try again.".to_string(),
        _ => {
            if during_search {
                "Search failed. Please try again.".to_string()
            } else {
                "Connection failed. Please check your credentials and network connection.".to_string()
            }
        }
    }
}

pub struct DocumentSearch {
    client: reqwest::Client,
    base_url: String,
}

impl DocumentSearch {
    pub fn from_env() -> Result<Self> {
        let base_url = dotenv::var("CONFLUENCE_BASE_URL")
            .unwrap_or_else(|_| "https://your-domain.atlassian.net/wiki".to_string());
        Self::new(&base_url)
    }

    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, credentials: &Credentials) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header(reqwest::header::AUTHORIZATION, credentials.basic_auth_header())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Check credentials against the current-user endpoint.
    pub async fn connect(&self, credentials: &Credentials) -> ConnectionResult {
        if !credentials.is_complete() {
            return ConnectionResult {
                ok: false,
                message: "Please enter both username and API token".to_string(),
            };
        }

        let resp = match self.get("/rest/api/user/current", credentials).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let err = ServiceError::from_transport(e);
                warn!(error = %err, "knowledge base connect failed");
                return ConnectionResult {
                    ok: false,
                    message: transport_message(&err, false),
                };
            }
        };

        let status = resp.status();
        if status.is_success() {
            let user: Option<CurrentUser> = resp.json().await.ok();
            let name = user
                .and_then(|u| u.display_name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| credentials.username.clone());
            info!(user = %name, "connected to knowledge base");
            return ConnectionResult {
                ok: true,
                message: format!("Successfully connected as {}", name),
            };
        }

        let message = match ServiceError::from_status(status) {
            ServiceError::Auth => {
                "Authentication failed. Please check your username and API token.".to_string()
            }
            ServiceError::Permission => "Access denied. Please verify your permissions.".to_string(),
            _ => format!("Connection failed (HTTP {}). Please try again.", status.as_u16()),
        };
        warn!(status = status.as_u16(), "knowledge base connect rejected");
        ConnectionResult { ok: false, message }
    }

    /// Search remotely when connected, otherwise filter the sample pages.
    pub async fn search(
        &self,
        query: &str,
        credentials: Option<&Credentials>,
        connected: bool,
        limit: u32,
    ) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome {
                documents: vec![],
                status: "Please enter a search query".to_string(),
                connected,
                source: SearchSource::Sample,
            };
        }

        match credentials {
            Some(credentials) if connected => self.search_remote(query, credentials, limit).await,
            _ => {
                let documents =
                    canned::filter_documents(canned::sample_documents(&self.base_url), query);
                debug!(query, hits = documents.len(), "sample search");
                SearchOutcome {
                    status: format!(
                        "Sample results for \"{}\" ({} found). Use `/kb connect` to search the live knowledge base.",
                        query,
                        documents.len()
                    ),
                    documents,
                    connected: false,
                    source: SearchSource::Sample,
                }
            }
        }
    }

    async fn search_remote(&self, query: &str, credentials: &Credentials, limit: u32) -> SearchOutcome {
        let limit = limit.clamp(MIN_SEARCH_LIMIT, MAX_SEARCH_LIMIT).to_string();
        let cql = cql_text_query(query);

        let failed = |status: String, connected: bool| SearchOutcome {
            documents: vec![],
            status,
            connected,
            source: SearchSource::Remote,
        };

        let resp = match self
            .get("/rest/api/content/search", credentials)
            .query(&[
                ("cql", cql.as_str()),
                ("limit", limit.as_str()),
                ("expand", "space,history,body.view"),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let err = ServiceError::from_transport(e);
                warn!(error = %err, "knowledge base search failed");
                return failed(transport_message(&err, true), true);
            }
        };

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "knowledge base search rejected");
            return match ServiceError::from_status(status) {
                ServiceError::Auth => failed("Authentication expired. Please reconnect.".to_string(), false),
                ServiceError::Permission => failed(
                    "Access denied. Please check your search permissions.".to_string(),
                    true,
                ),
                _ => failed(
                    format!("Search failed (HTTP {}). Please try again.", status.as_u16()),
                    true,
                ),
            };
        }

        let page: SearchPage = match resp.json().await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "unreadable search reply");
                return failed("Search failed: unreadable reply from the knowledge base.".to_string(), true);
            }
        };

        let now = Utc::now();
        let documents: Vec<DocumentRecord> = page
            .results
            .into_iter()
            .map(|hit| self.to_record(hit, now))
            .collect();

        info!(query, hits = documents.len(), "knowledge base search complete");
        SearchOutcome {
            status: format!("Found {} results for \"{}\"", documents.len(), query),
            documents,
            connected: true,
            source: SearchSource::Remote,
        }
    }

    fn to_record(&self, hit: RawHit, now: DateTime<Utc>) -> DocumentRecord {
        let history = hit.history.unwrap_or_default();
        let last_modified = history
            .last_updated
            .and_then(|u| u.when)
            .and_then(|w| DateTime::parse_from_rfc3339(&w).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now);

        DocumentRecord {
            id: hit.id,
            title: hit.title.unwrap_or_else(|| "Untitled".to_string()),
            content: hit
                .body
                .and_then(|b| b.view)
                .and_then(|v| v.value)
                .map(|html| preview(&html))
                .unwrap_or_else(|| "No preview available".to_string()),
            author: history
                .created_by
                .and_then(|p| p.display_name)
                .unwrap_or_else(|| "Unknown Author".to_string()),
            space: hit
                .space
                .and_then(|s| s.name)
                .unwrap_or_else(|| "Unknown Space".to_string()),
            last_modified,
            url: format!(
                "{}{}",
                self.base_url,
                hit.links.and_then(|l| l.webui).unwrap_or_default()
            ),
        }
    }
}
