use crate::api::FetchError;
use crate::config::{ScanConfig, PROFILE_PATH};
use crate::models::{ProfileSnapshot, RawUser};
use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct ProfileClient {
    client: Client,
    config: ScanConfig,
    endpoint: Url,
}

impl ProfileClient {
    pub fn new(config: ScanConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join(PROFILE_PATH))
            .with_context(|| format!("Invalid endpoint URL: {}", config.base_url))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-ig-app-id",
            HeaderValue::from_str(&config.app_id).context("Invalid app id header")?,
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            "x-requested-with",
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn profile_url(&self, username: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("username", username);
        url
    }

    /// Looks up one account. Exactly one request is made; nothing is retried.
    pub async fn fetch_profile(&self, username: &str) -> Result<ProfileSnapshot, FetchError> {
        let url = self.profile_url(username);
        debug!(%url, "requesting profile");

        let response = self
            .client
            .get(url)
            .header(header::REFERER, self.config.profile_page(username))
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        debug!(status = status.as_u16(), %content_type, "profile response");

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                username: username.to_string(),
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(FetchError::RateLimited { retry_after_secs });
        }

        let body = response.text().await.map_err(FetchError::from_transport)?;
        debug!(bytes = body.len(), "read response body");

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if !is_json(&content_type) {
            return Err(FetchError::ContentType { content_type, body });
        }

        parse_profile_body(body, &self.config)
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().to_ascii_lowercase().contains("json"))
        .unwrap_or(false)
}

/// Turns a `web_profile_info` body into a snapshot, classifying anything
/// that is not the expected `{"data": {"user": {...}}}` shape.
pub fn parse_profile_body(body: String, config: &ScanConfig) -> Result<ProfileSnapshot, FetchError> {
    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(source) => return Err(FetchError::Json { source, body }),
    };

    let Some(user) = value
        .get("data")
        .and_then(|data| data.get("user"))
        .filter(|user| user.is_object())
    else {
        return Err(FetchError::Shape {
            reason: "no data.user object in response".to_string(),
            body,
        });
    };

    match RawUser::deserialize(user) {
        Ok(raw) => Ok(ProfileSnapshot::from_raw(raw, config)),
        Err(err) => Err(FetchError::Shape {
            reason: err.to_string(),
            body,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WEB_APP_ID;
    use crate::models::fixtures::{post_json, profile_body};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ProfileClient {
        ProfileClient::new(ScanConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
            ..ScanConfig::default()
        })
        .unwrap()
    }

    async fn mount(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(PROFILE_PATH))
            .and(query_param("username", "examplecorp"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[test]
    fn builds_profile_url_with_encoded_username() {
        let client = test_client("http://localhost:1234");
        assert_eq!(
            client.profile_url("a b").as_str(),
            "http://localhost:1234/api/v1/users/web_profile_info/?username=a+b"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = ProfileClient::new(ScanConfig {
            base_url: "not a url".to_string(),
            ..ScanConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn recognises_json_content_types() {
        assert!(is_json("application/json"));
        assert!(is_json("application/json; charset=utf-8"));
        assert!(is_json("Application/JSON"));
        assert!(!is_json("text/html; charset=utf-8"));
        assert!(!is_json(""));
    }

    #[test]
    fn parse_reports_missing_user_as_shape() {
        let body = json!({ "data": {}, "status": "ok" }).to_string();
        let err = parse_profile_body(body, &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::Shape { .. }), "got: {err:?}");
    }

    #[test]
    fn parse_reports_null_user_as_shape() {
        let body = json!({ "data": { "user": null } }).to_string();
        let err = parse_profile_body(body, &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::Shape { .. }), "got: {err:?}");
    }

    #[test]
    fn parse_reports_garbage_as_json_error() {
        let err = parse_profile_body("<html>".to_string(), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::Json { .. }), "got: {err:?}");
        assert_eq!(err.body(), Some("<html>"));
    }

    #[tokio::test]
    async fn sends_browser_signature_and_parses_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PROFILE_PATH))
            .and(query_param("username", "examplecorp"))
            .and(header_eq("x-ig-app-id", WEB_APP_ID))
            .and(header_eq(
                "referer",
                "https://www.instagram.com/examplecorp/",
            ))
            .and(header_eq("x-requested-with", "XMLHttpRequest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(profile_body(1000, 50, vec![post_json(1, 10, 1)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = test_client(&server.uri())
            .fetch_profile("examplecorp")
            .await
            .unwrap();

        assert_eq!(snapshot.username, "examplecorp");
        assert_eq!(snapshot.follower_count, 1000);
        assert_eq!(snapshot.posts.len(), 1);
    }

    #[tokio::test]
    async fn maps_404_to_not_found() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(404)).await;

        let err = test_client(&server.uri())
            .fetch_profile("examplecorp")
            .await
            .unwrap_err();
        assert!(
            matches!(err, FetchError::NotFound { ref username } if username == "examplecorp"),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn maps_429_to_rate_limited_with_retry_after() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(429).insert_header("Retry-After", "120"),
        )
        .await;

        let err = test_client(&server.uri())
            .fetch_profile("examplecorp")
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                FetchError::RateLimited {
                    retry_after_secs: Some(120)
                }
            ),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn keeps_body_for_other_statuses() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(401).set_body_string("{\"message\":\"Please wait a few minutes\"}"),
        )
        .await;

        let err = test_client(&server.uri())
            .fetch_profile("examplecorp")
            .await
            .unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Please wait"));
            }
            other => panic!("expected Status, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_html_login_wall() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_raw("<!DOCTYPE html><html>login</html>", "text/html"),
        )
        .await;

        let err = test_client(&server.uri())
            .fetch_profile("examplecorp")
            .await
            .unwrap_err();
        match err {
            FetchError::ContentType { content_type, body } => {
                assert!(content_type.starts_with("text/html"));
                assert!(body.starts_with("<!DOCTYPE html>"));
            }
            other => panic!("expected ContentType, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reports_malformed_json() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_raw("{\"data\": {\"user\":", "application/json"),
        )
        .await;

        let err = test_client(&server.uri())
            .fetch_profile("examplecorp")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Json { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn reports_missing_user_object() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "viewer": null } })),
        )
        .await;

        let err = test_client(&server.uri())
            .fetch_profile("examplecorp")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Shape { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn classifies_corrupt_compressed_body_as_transport() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .set_body_raw("definitely not gzip", "application/json"),
        )
        .await;

        let err = test_client(&server.uri())
            .fetch_profile("examplecorp")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn classifies_slow_responses_as_timeout() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(profile_body(1, 1, vec![]))
                .set_delay(Duration::from_secs(3)),
        )
        .await;

        let client = ProfileClient::new(ScanConfig {
            base_url: server.uri(),
            timeout: Duration::from_millis(200),
            ..ScanConfig::default()
        })
        .unwrap();

        let err = client.fetch_profile("examplecorp").await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn classifies_refused_connection() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let err = test_client(&format!("http://127.0.0.1:{port}"))
            .fetch_profile("examplecorp")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Connect(_)), "got: {err:?}");
    }
}
