use anyhow::{Context, Result};
use tracing::info;

use crate::answer::Article;

/// Largest page body read. Only the first few thousand chars are ever
/// summarized, so anything past this is dropped unread.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Fetch a web page and turn it into an article for summarizing.
/// HTML is rendered to plain text; other content types are used as-is.
pub async fn fetch_article(client: &reqwest::Client, url: &str, title: Option<&str>) -> Result<Article> {
    let mut resp = client
        .get(url)
        .send()
        .await
        .context("Failed to fetch URL")?
        .error_for_status()
        .context("Article URL returned an error status")?;

    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if let Some(len) = resp.content_length() {
        if len > MAX_BODY_BYTES as u64 {
            anyhow::bail!("Article is too large ({} bytes, limit {})", len, MAX_BODY_BYTES);
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await.context("Failed to read response body")? {
        let room = MAX_BODY_BYTES - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    let text = if content_type.contains("html") {
        html2text::from_read(&body[..], 120)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).to_string())
    } else {
        String::from_utf8_lossy(&body).to_string()
    };

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            url.trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(url)
                .to_string()
        });

    info!(url, size = text.len(), "article fetched");
    Ok(Article {
        title,
        source: url.to_string(),
        content: text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_html_article() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts/zero-trust"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    "<html><body><p>Never trust, always verify.</p></body></html>",
                    "text/html",
                ),
            )
            .mount(&server)
            .await;

        let url = format!("{}/posts/zero-trust", server.uri());
        let article = fetch_article(&reqwest::Client::new(), &url, None).await.unwrap();
        assert_eq!(article.title, "zero-trust");
        assert_eq!(article.source, url);
        assert!(article.content.contains("Never trust, always verify."));
        assert!(!article.content.contains("<p>"));
    }

    #[tokio::test]
    async fn test_fetch_plain_text_with_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("plain body", "text/plain"),
            )
            .mount(&server)
            .await;

        let article = fetch_article(&reqwest::Client::new(), &server.uri(), Some(" Notes "))
            .await
            .unwrap();
        assert_eq!(article.title, "Notes");
        assert_eq!(article.content, "plain body");
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![b'a'; MAX_BODY_BYTES + 1], "text/plain"),
            )
            .mount(&server)
            .await;

        let err = fetch_article(&reqwest::Client::new(), &server.uri(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        assert!(fetch_article(&reqwest::Client::new(), &server.uri(), None).await.is_err());
    }
}
