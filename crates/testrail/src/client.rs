//! Authenticated TestRail API v2 client
//!
//! A thin GET/POST wrapper: every call either yields the decoded JSON body or
//! an [`ApiError`]. Nothing is retried.

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// Path of the API v2 entry point relative to the server URL
pub const DEFAULT_API_PATH: &str = "index.php?/api/v2/";

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_root: String,
    user: String,
    password: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_root", &self.api_root)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ApiClient {
    /// Create a client for a TestRail server using the default API path
    pub fn new(base_url: &str, user: &str, password: &str) -> Result<Self, ApiError> {
        Self::with_api_path(base_url, DEFAULT_API_PATH, user, password)
    }

    pub fn with_api_path(
        base_url: &str,
        api_path: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, ApiError> {
        let mut api_root = base_url.trim().to_string();
        reqwest::Url::parse(&api_root).map_err(|e| ApiError::InvalidUrl {
            url: api_root.clone(),
            reason: e.to_string(),
        })?;
        if !api_root.ends_with('/') {
            api_root.push('/');
        }
        api_root.push_str(api_path.trim_start_matches('/'));

        let http = reqwest::Client::builder()
            .build()
            .map_err(|source| ApiError::Transport {
                url: api_root.clone(),
                source,
            })?;

        Ok(Self {
            http,
            api_root,
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    /// Prefix every endpoint is appended to
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_root, endpoint)
    }

    /// Issue a GET request, e.g. `get_projects`
    pub async fn send_get(&self, endpoint: &str) -> Result<Value, ApiError> {
        let url = self.url(endpoint);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.user, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        read_response(&url, response).await
    }

    /// Issue a POST request with a JSON payload, e.g. `add_plan/1`
    pub async fn send_post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<Value, ApiError> {
        let url = self.url(endpoint);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.user, Some(&self.password))
            .json(payload)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        read_response(&url, response).await
    }
}

async fn read_response(url: &str, response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

/// TestRail reports failures as `{"error": "..."}`
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| match body.trim() {
            "" => "no response body".to_string(),
            text => text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_root_default_path() {
        let client = ApiClient::new("https://testrail.example.com", "u", "p").unwrap();
        assert_eq!(
            client.api_root(),
            "https://testrail.example.com/index.php?/api/v2/"
        );
        assert_eq!(
            client.url("get_runs/3"),
            "https://testrail.example.com/index.php?/api/v2/get_runs/3"
        );
    }

    #[test]
    fn test_api_root_custom_path() {
        let client =
            ApiClient::with_api_path("http://127.0.0.1:8080/", "/api/v2/", "u", "p").unwrap();
        assert_eq!(client.api_root(), "http://127.0.0.1:8080/api/v2/");
    }

    #[test]
    fn test_invalid_url() {
        let err = ApiClient::new("not a url", "u", "p").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn test_debug_redacts_password() {
        let client = ApiClient::new("https://testrail.example.com", "bot", "hunter2").unwrap();
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("bot"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": "Field :project_id is not a valid project."}"#),
            "Field :project_id is not a valid project."
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message("  "), "no response body");
    }
}
