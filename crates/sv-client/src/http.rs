//! HTTP transport with auth, bounded retry, and error mapping.
//!
//! Retry policy: server-class failures (5xx) and transport failures
//! retry at most `max_retries` times with exponential backoff and jitter.
//! Client errors (4xx) never retry; a 401 additionally clears the held
//! bearer token, exactly once per failed call since 401s are not retried.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sv_core::CoreError;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::token::TokenStore;

/// Backoff starts here and doubles per attempt.
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Backoff never exceeds this.
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the backend, e.g. `https://soc.example.com/api`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum automatic retries for transient failures.
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// HTTP client wrapping reqwest with the Sigview transport policy.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
    tokens: TokenStore,
}

impl HttpClient {
    /// Builds the client; fails only on TLS/runtime construction errors.
    pub fn new(config: HttpConfig, tokens: TokenStore) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// Joins a path onto the base URL.
    pub fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// GET returning the raw JSON body for transformer-based endpoints.
    pub async fn get_value(
        &self,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> ClientResult<Value> {
        self.get_json(path, params).await
    }

    /// GET deserializing the JSON body directly.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> ClientResult<T> {
        let mut request = self.client.get(self.build_url(path));
        if !params.is_empty() {
            request = request.query(params);
        }
        let response = self.execute_with_retry(request).await?;
        Self::parse_body(response).await
    }

    /// POST with a JSON body, deserializing the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.client.post(self.build_url(path)).json(body);
        let response = self.execute_with_retry(request).await?;
        Self::parse_body(response).await
    }

    async fn parse_body<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| {
            ClientError::Core(CoreError::malformed(format!(
                "response body: {e} - {}",
                text.chars().take(200).collect::<String>()
            )))
        })
    }

    async fn execute_with_retry(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ClientResult<Response> {
        let mut last_error: Option<ClientError> = None;
        let mut delay = INITIAL_BACKOFF;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!(attempt, ?delay, "retrying request");
                sleep(delay).await;
                delay = std::cmp::min(delay * 2 + jitter(), MAX_BACKOFF);
            }

            let Some(mut request) = request.try_clone() else {
                return Err(ClientError::Config("request body cannot be retried".into()));
            };
            // Auth is attached per attempt so an invalidated token is not
            // re-sent.
            if let Some(header) = self.tokens.header_value() {
                request = request.header(reqwest::header::AUTHORIZATION, header);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if status.is_server_error() && attempt < self.config.max_retries {
                        warn!(%status, "server error, retrying");
                        last_error = Some(Self::http_error(response).await);
                        continue;
                    }

                    if status == StatusCode::UNAUTHORIZED {
                        // 401 is never retried, so this runs exactly once
                        // per failed call.
                        self.tokens.invalidate();
                    }

                    return Err(Self::http_error(response).await);
                }
                Err(e) => {
                    let mapped = if e.is_timeout() {
                        ClientError::Timeout(e.to_string())
                    } else {
                        ClientError::Network(e.to_string())
                    };
                    if attempt >= self.config.max_retries {
                        return Err(mapped);
                    }
                    last_error = Some(mapped);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::Network("request failed".into())))
    }

    /// Maps a non-2xx response to [`ClientError::Http`], pulling the
    /// message out of the backend's `error`/`message` body keys.
    async fn http_error(response: Response) -> ClientError {
        let status = response.status();
        let body: Option<Value> = match response.text().await {
            Ok(text) => serde_json::from_str(&text).ok(),
            Err(_) => None,
        };

        let message = body
            .as_ref()
            .and_then(|b| {
                b.get("error")
                    .or_else(|| b.get("message"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        ClientError::Http {
            status: status.as_u16(),
            message,
            body,
        }
    }
}

/// Small deterministic-enough jitter so synchronized retries fan out.
fn jitter() -> Duration {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::time::Instant::now().hash(&mut hasher);
    Duration::from_millis(hasher.finish() % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(
            HttpConfig {
                base_url: "https://soc.example.com/api/".into(),
                ..Default::default()
            },
            TokenStore::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_build_url_joins_slashes() {
        let client = client();
        assert_eq!(
            client.build_url("/rules"),
            "https://soc.example.com/api/rules"
        );
        assert_eq!(
            client.build_url("rules/7"),
            "https://soc.example.com/api/rules/7"
        );
    }

    #[test]
    fn test_default_config_retry_limit() {
        let config = HttpConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.timeout_secs, 30);
    }
}
