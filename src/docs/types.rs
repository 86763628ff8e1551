use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page id as reported by the search endpoint.
pub type DocId = String;

/// One search hit, from the remote endpoint or the sample set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocId,
    pub title: String,
    /// Plain-text preview, already truncated.
    pub content: String,
    pub author: String,
    pub space: String,
    pub last_modified: DateTime<Utc>,
    pub url: String,
}

/// Username plus API token. Lives in memory for the session only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.api_key.trim().is_empty()
    }

    /// `Basic base64(username:api_key)`
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.api_key);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionResult {
    pub ok: bool,
    pub message: String,
}

/// Where search results came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSource {
    Remote,
    Sample,
}

/// Result of one search. `connected` is the connection flag after the call,
/// which a 401 resets.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub documents: Vec<DocumentRecord>,
    pub status: String,
    pub connected: bool,
    pub source: SearchSource,
}

/// Ordered collection of documents the user picked, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedDocuments {
    docs: Vec<DocumentRecord>,
}

impl SelectedDocuments {
    /// Add a document. Returns false and changes nothing when the id is
    /// already present.
    pub fn insert(&mut self, doc: DocumentRecord) -> bool {
        if self.contains(&doc.id) {
            return false;
        }
        self.docs.push(doc);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<DocumentRecord> {
        let pos = self.docs.iter().position(|d| d.id == id)?;
        Some(self.docs.remove(pos))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.iter().any(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.docs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            author: "a".to_string(),
            space: "s".to_string(),
            last_modified: DateTime::<Utc>::default(),
            url: String::new(),
        }
    }

    #[test]
    fn test_insert_same_id_twice() {
        let mut selected = SelectedDocuments::default();
        assert!(selected.insert(doc("1", "first")));
        assert!(!selected.insert(doc("1", "first again")));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.iter().next().unwrap().title, "first");
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut selected = SelectedDocuments::default();
        for id in ["1", "2", "3"] {
            selected.insert(doc(id, id));
        }
        assert!(selected.remove("2").is_some());
        assert!(selected.remove("9").is_none());
        let ids: Vec<&str> = selected.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_basic_auth_header() {
        let creds = Credentials::new("alice@example.com", "token123");
        // base64("alice@example.com:token123")
        assert_eq!(
            creds.basic_auth_header(),
            "Basic YWxpY2VAZXhhbXBsZS5jb206dG9rZW4xMjM="
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = Credentials::new("alice", "supersecret");
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("supersecret"));
        assert!(!Credentials::new("alice", "  ").is_complete());
    }
}
