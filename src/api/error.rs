use thiserror::Error;

/// Every way a profile lookup can fail.
///
/// Variants that saw a response keep the whole body; callers decide how much
/// of it to show.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("account @{username} not found")]
    NotFound { username: String },

    #[error("rate limited by the endpoint")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected HTTP status {status}")]
    Status { status: u16, body: String },

    #[error("expected JSON but got content type \"{content_type}\"")]
    ContentType { content_type: String, body: String },

    #[error("response body is not valid JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("unexpected response shape: {reason}")]
    Shape { reason: String, body: String },

    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("could not connect to the endpoint")]
    Connect(#[source] reqwest::Error),

    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected error: {0}")]
    Unexpected(anyhow::Error),
}

impl FetchError {
    /// Sorts a transport-level failure into timeout, connect or other.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err)
        } else if err.is_connect() {
            FetchError::Connect(err)
        } else {
            FetchError::Transport(err)
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            FetchError::Status { body, .. }
            | FetchError::ContentType { body, .. }
            | FetchError::Json { body, .. }
            | FetchError::Shape { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_body_only_for_response_errors() {
        let shape = FetchError::Shape {
            reason: "missing data.user".to_string(),
            body: "{}".to_string(),
        };
        assert_eq!(shape.body(), Some("{}"));

        let not_found = FetchError::NotFound {
            username: "ghost".to_string(),
        };
        assert_eq!(not_found.body(), None);
        assert_eq!(not_found.to_string(), "account @ghost not found");
    }

    #[test]
    fn json_error_mentions_parser_message() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = FetchError::Json {
            source,
            body: "{oops".to_string(),
        };
        assert!(err.to_string().starts_with("response body is not valid JSON"));
    }
}
