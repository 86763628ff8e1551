//! Per-user shell state.
//!
//! A `Session` is never mutated in place by command handlers. Every change
//! goes through [`Session::reduce`], which consumes the old state and returns
//! the next one.

use chrono::{DateTime, Utc};

use crate::docs::types::{
    ConnectionResult, Credentials, DocId, DocumentRecord, SearchOutcome, SelectedDocuments,
};

/// Oldest messages are dropped past this many.
pub const MAX_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub gemini_key: Option<String>,
    pub credentials: Option<Credentials>,
    pub connected: bool,
    /// Last human-readable status line.
    pub status: String,
    pub messages: Vec<ChatMessage>,
    /// Results of the last search, in endpoint order.
    pub results: Vec<DocumentRecord>,
    pub selected: SelectedDocuments,
    /// Suggestions from the last answer; offered as search autocomplete.
    pub last_suggestions: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Action {
    SetApiKey(String),
    SetCredentials(Credentials),
    ConnectionChecked(ConnectionResult),
    SearchCompleted(SearchOutcome),
    QuestionAsked { content: String, at: DateTime<Utc> },
    AnswerReceived {
        content: String,
        suggestions: Vec<String>,
        at: DateTime<Utc>,
    },
    Select(DocId),
    Deselect(DocId),
    ClearChat,
    ClearResults,
}

impl Session {
    pub fn reduce(mut self, action: Action) -> Session {
        match action {
            Action::SetApiKey(key) => {
                let key = key.trim().to_string();
                self.gemini_key = (!key.is_empty()).then_some(key);
                self.status = "Gemini API key updated.".to_string();
            }
            Action::SetCredentials(credentials) => {
                self.credentials = Some(credentials);
                self.connected = false;
                self.status = "Connecting to the knowledge base...".to_string();
            }
            Action::ConnectionChecked(result) => {
                self.connected = result.ok;
                self.status = result.message;
            }
            Action::SearchCompleted(outcome) => {
                self.connected = outcome.connected;
                self.results = outcome.documents;
                self.status = outcome.status;
            }
            Action::QuestionAsked { content, at } => {
                self.push_message(Role::User, content, at);
            }
            Action::AnswerReceived {
                content,
                suggestions,
                at,
            } => {
                self.push_message(Role::Assistant, content, at);
                self.last_suggestions = suggestions;
            }
            Action::Select(id) => match self.results.iter().find(|d| d.id == id).cloned() {
                Some(doc) => {
                    let title = doc.title.clone();
                    self.status = if self.selected.insert(doc) {
                        format!("Added \"{}\" to your selected documents.", title)
                    } else {
                        format!("\"{}\" is already in your selected documents.", title)
                    };
                }
                None => {
                    self.status = format!("No document with id `{}` in your last search results.", id);
                }
            },
            Action::Deselect(id) => {
                self.status = match self.selected.remove(&id) {
                    Some(doc) => format!("Removed \"{}\" from your selected documents.", doc.title),
                    None => format!("No selected document with id `{}`.", id),
                };
            }
            Action::ClearChat => {
                self.messages.clear();
                self.last_suggestions.clear();
                self.status = "Chat history cleared.".to_string();
            }
            Action::ClearResults => {
                self.results.clear();
                self.status = "Search results cleared.".to_string();
            }
        }
        self
    }

    fn push_message(&mut self, role: Role, content: String, timestamp: DateTime<Utc>) {
        self.messages.push(ChatMessage {
            role,
            content,
            timestamp,
        });
        if self.messages.len() > MAX_HISTORY {
            let excess = self.messages.len() - MAX_HISTORY;
            self.messages.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::types::SearchSource;

    fn doc(id: &str) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            title: format!("Doc {}", id),
            content: String::new(),
            author: "a".to_string(),
            space: "s".to_string(),
            last_modified: DateTime::<Utc>::default(),
            url: String::new(),
        }
    }

    fn with_results(ids: &[&str]) -> Session {
        Session::default().reduce(Action::SearchCompleted(SearchOutcome {
            documents: ids.iter().map(|id| doc(id)).collect(),
            status: "ok".to_string(),
            connected: true,
            source: SearchSource::Remote,
        }))
    }

    #[test]
    fn test_select_twice_is_noop() {
        let session = with_results(&["1", "2"])
            .reduce(Action::Select("1".to_string()))
            .reduce(Action::Select("1".to_string()));
        assert_eq!(session.selected.len(), 1);
        assert!(session.status.contains("already"));
    }

    #[test]
    fn test_select_unknown_id() {
        let session = with_results(&["1"]).reduce(Action::Select("7".to_string()));
        assert!(session.selected.is_empty());
        assert!(session.status.contains("`7`"));
    }

    #[test]
    fn test_selection_survives_new_search() {
        let session = with_results(&["1"])
            .reduce(Action::Select("1".to_string()))
            .reduce(Action::SearchCompleted(SearchOutcome {
                documents: vec![],
                status: "Authentication expired. Please reconnect.".to_string(),
                connected: false,
                source: SearchSource::Remote,
            }));
        assert!(!session.connected);
        assert!(session.results.is_empty());
        assert_eq!(session.selected.len(), 1);
    }

    #[test]
    fn test_deselect() {
        let session = with_results(&["1", "2"])
            .reduce(Action::Select("1".to_string()))
            .reduce(Action::Select("2".to_string()))
            .reduce(Action::Deselect("1".to_string()));
        let ids: Vec<&str> = session.selected.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_credentials_reset_connection() {
        let session = Session::default()
            .reduce(Action::ConnectionChecked(ConnectionResult {
                ok: true,
                message: "Successfully connected as A".to_string(),
            }))
            .reduce(Action::SetCredentials(Credentials::new("b", "t")));
        assert!(!session.connected);
        assert!(session.credentials.is_some());
    }

    #[test]
    fn test_history_and_clear() {
        let now = Utc::now();
        let mut session = Session::default();
        for i in 0..(MAX_HISTORY + 5) {
            session = session.reduce(Action::QuestionAsked {
                content: format!("q{}", i),
                at: now,
            });
        }
        assert_eq!(session.messages.len(), MAX_HISTORY);
        assert_eq!(session.messages[0].content, "q5");

        let session = session
            .reduce(Action::AnswerReceived {
                content: "a".to_string(),
                suggestions: vec!["s".to_string()],
                at: now,
            })
            .reduce(Action::ClearChat);
        assert!(session.messages.is_empty());
        assert!(session.last_suggestions.is_empty());
    }

    #[test]
    fn test_blank_key_unsets() {
        let session = Session::default()
            .reduce(Action::SetApiKey("AIza-something".to_string()))
            .reduce(Action::SetApiKey("   ".to_string()));
        assert!(session.gemini_key.is_none());
    }
}
