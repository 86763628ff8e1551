use thiserror::Error;

/// Failure kinds for calls to the generation and search endpoints.
///
/// None of these are fatal. The completion pipeline swallows every kind and
/// substitutes canned output; the search flow turns them into status lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("request timed out")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    /// Transport-level failure. `unreachable` is set when the endpoint could
    /// not be reached at all (DNS, connect, TLS), as opposed to a connection
    /// that broke mid-request.
    #[error("network failure: {detail}")]
    Network { unreachable: bool, detail: String },

    #[error("authentication failed (401)")]
    Auth,

    #[error("access denied (403)")]
    Permission,

    #[error("service temporarily unavailable (503)")]
    ServiceUnavailable,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP {0}")]
    Http(u16),

    #[error("no credential configured")]
    MissingCredential,
}

impl ServiceError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 => ServiceError::Auth,
            403 => ServiceError::Permission,
            503 => ServiceError::ServiceUnavailable,
            code => ServiceError::Http(code),
        }
    }

    /// Classify a transport error from reqwest by what the client reports,
    /// not by its message text. The request URL is dropped first since it can
    /// carry the API key as a query parameter.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_decode() {
            ServiceError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::from_status(status)
        } else {
            ServiceError::Network {
                unreachable: err.is_connect() || err.is_builder(),
                detail: err.to_string(),
            }
        }
    }

    /// Notice shown next to a canned answer, explaining why it was used.
    pub fn fallback_notice(&self) -> String {
        match self {
            ServiceError::ServiceUnavailable => {
                "The AI service is temporarily unavailable. Please try again in a few minutes. \
                 Showing a standard knowledge-base response instead."
                    .to_string()
            }
            ServiceError::Timeout | ServiceError::Cancelled => {
                "The AI service did not answer in time. Showing a standard knowledge-base response instead."
                    .to_string()
            }
            ServiceError::Network { .. } => {
                "The AI service could not be reached (network error). Showing a standard \
                 knowledge-base response instead."
                    .to_string()
            }
            ServiceError::MissingCredential => {
                "No Gemini API key is set (use `/kb key`). Showing a standard knowledge-base response instead."
                    .to_string()
            }
            other => format!(
                "The AI service could not be used ({}). Showing a standard knowledge-base response instead.",
                other
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ServiceError::from_status(reqwest::StatusCode::UNAUTHORIZED),
            ServiceError::Auth
        );
        assert_eq!(
            ServiceError::from_status(reqwest::StatusCode::FORBIDDEN),
            ServiceError::Permission
        );
        assert_eq!(
            ServiceError::from_status(reqwest::StatusCode::SERVICE_UNAVAILABLE),
            ServiceError::ServiceUnavailable
        );
        assert_eq!(
            ServiceError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            ServiceError::Http(500)
        );
    }

    #[test]
    fn test_unavailable_notice_is_specific() {
        let notice = ServiceError::ServiceUnavailable.fallback_notice();
        assert!(notice.contains("temporarily unavailable"));
        let generic = ServiceError::Http(500).fallback_notice();
        assert!(generic.contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_connect_failure_is_unreachable() {
        // Port 9 on localhost is closed in any sane test environment.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .unwrap_err();
        match ServiceError::from_transport(err) {
            ServiceError::Network { unreachable, .. } => assert!(unreachable),
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_network_error_hides_query_key() {
        const KEY: &str = "AIzaSyTestKeyThatIsLongEnoughForValidation";
        let err = reqwest::Client::new()
            .post("http://127.0.0.1:9/models/m:generateContent")
            .query(&[("key", KEY)])
            .send()
            .await
            .unwrap_err();
        let classified = ServiceError::from_transport(err);
        assert!(matches!(classified, ServiceError::Network { .. }));
        assert!(!classified.to_string().contains(KEY));
        assert!(!format!("{:?}", classified).contains(KEY));
        assert!(!classified.fallback_notice().contains(KEY));
        assert!(classified.fallback_notice().contains("could not be reached"));
    }
}
