use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::models::UsageResponse;

#[derive(Debug, Clone)]
pub struct CursorClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub request_delay_ms: u64,
}

impl CursorClientConfig {
    /// Load Cursor config from environment.
    ///
    /// Returns `None` if the connector is not configured (`CURSOR_API_KEY`
    /// missing).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("CURSOR_API_KEY").ok()?;
        let base_url = std::env::var("CURSOR_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.cursor.com".to_string());
        let max_retries = std::env::var("CURSOR_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let timeout_secs = std::env::var("CURSOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let request_delay_ms = std::env::var("CURSOR_REQUEST_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(250);

        Some(Self {
            base_url,
            api_key,
            max_retries,
            timeout_secs,
            request_delay_ms,
        })
    }
}

#[derive(Clone)]
pub struct CursorClient {
    client: Client,
    config: CursorClientConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum CursorClientError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl CursorClient {
    pub fn new(config: CursorClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// For testing: create a client pointing at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// Pause between consecutive window fetches, respecting the upstream
    /// rate limit.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.config.request_delay_ms)
    }

    /// Fetch per-user daily usage rows for an inclusive instant range.
    /// The upstream takes epoch-millisecond bounds and resolves pagination
    /// itself.
    pub async fn fetch_daily_usage(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Value>, CursorClientError> {
        let url = format!("{}/teams/daily-usage-data", self.config.base_url);
        let body = serde_json::json!({
            "startDate": start.timestamp_millis(),
            "endDate": end.timestamp_millis(),
        });

        let response = self.request_with_retry(&url, &body).await?;
        Ok(response.data)
    }

    async fn request_with_retry(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<UsageResponse, CursorClientError> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt, 30);
                tracing::warn!(attempt, backoff_secs, "retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            let response = match self
                .client
                .post(url)
                .basic_auth(&self.config.api_key, Some(""))
                .json(body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(CursorClientError::RequestError(e));
                }
            };

            let status = response.status();

            if status.is_success() {
                return response
                    .json::<UsageResponse>()
                    .await
                    .map_err(CursorClientError::RequestError);
            }

            // Honor Retry-After header for 429
            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    let wait = std::cmp::min(retry_after, 60);
                    tracing::warn!(wait, "rate-limited, waiting Retry-After");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                last_error = "429 Too Many Requests".to_string();
                continue;
            }

            // Retry on 5xx
            if status.is_server_error() {
                let body_text = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body_text}");
                continue;
            }

            // Fail fast on 4xx (except 429 handled above)
            let body_text = response.text().await.unwrap_or_default();
            return Err(CursorClientError::HttpError {
                status,
                body: body_text,
            });
        }

        Err(CursorClientError::MaxRetriesExceeded {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}
