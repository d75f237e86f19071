use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::models::SeatsPage;

#[derive(Debug, Clone)]
pub struct CopilotClientConfig {
    pub base_url: String,
    pub token: String,
    pub org: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub page_delay_ms: u64,
}

impl CopilotClientConfig {
    /// Load Copilot config from environment.
    ///
    /// Returns `None` if the connector is not configured (`GITHUB_TOKEN`
    /// missing); the org slug comes from the shared `GITHUB_ORG`.
    pub fn from_env(org: &str) -> Option<Self> {
        let token = std::env::var("GITHUB_TOKEN").ok()?;
        let base_url = std::env::var("GITHUB_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.github.com".to_string());
        let max_retries = std::env::var("GITHUB_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let timeout_secs = std::env::var("GITHUB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let page_delay_ms = std::env::var("GITHUB_PAGE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(250);

        Some(Self {
            base_url,
            token,
            org: org.to_string(),
            max_retries,
            timeout_secs,
            page_delay_ms,
        })
    }
}

#[derive(Clone)]
pub struct CopilotClient {
    client: Client,
    config: CopilotClientConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum CopilotClientError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },

    #[error("unexpected payload: {0}")]
    Payload(String),
}

impl CopilotClient {
    pub fn new(config: CopilotClientConfig) -> Result<Self, reqwest::Error> {
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

    /// Fetch every seat assignment via the paginated billing API, with a
    /// configurable delay between pages to respect upstream rate limits.
    pub async fn fetch_all_seats(&self) -> Result<Vec<Value>, CopilotClientError> {
        let per_page = 100;
        let mut page: u64 = 1;
        let mut all_seats = Vec::new();

        loop {
            let url = format!(
                "{}/orgs/{}/copilot/billing/seats?per_page={}&page={}",
                self.config.base_url, self.config.org, per_page, page
            );

            let body = self.request_with_retry(&url).await?;
            let seats_page: SeatsPage = serde_json::from_value(body)
                .map_err(|e| CopilotClientError::Payload(format!("seats page: {e}")))?;
            let page_len = seats_page.seats.len();
            all_seats.extend(seats_page.seats);

            if page_len < per_page {
                break;
            }
            page += 1;
            tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
        }

        Ok(all_seats)
    }

    /// Fetch the org-wide daily metrics payload (array of day objects).
    pub async fn fetch_metrics(&self) -> Result<Vec<Value>, CopilotClientError> {
        let url = format!(
            "{}/orgs/{}/copilot/metrics",
            self.config.base_url, self.config.org
        );
        let body = self.request_with_retry(&url).await?;
        match body {
            Value::Array(days) => Ok(days),
            other => Err(CopilotClientError::Payload(format!(
                "metrics: expected an array, got {other}"
            ))),
        }
    }

    async fn request_with_retry(&self, url: &str) -> Result<Value, CopilotClientError> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt, 30);
                tracing::warn!(attempt, backoff_secs, "retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            let response = match self
                .client
                .get(url)
                .bearer_auth(&self.config.token)
                .header("Accept", "application/vnd.github+json")
                .header("X-GitHub-Api-Version", "2022-11-28")
                .header("User-Agent", "tandem-ingest")
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(CopilotClientError::RequestError(e));
                }
            };

            let status = response.status();

            if status.is_success() {
                return response
                    .json::<Value>()
                    .await
                    .map_err(CopilotClientError::RequestError);
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
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            // Fail fast on 4xx (except 429 handled above)
            let body = response.text().await.unwrap_or_default();
            return Err(CopilotClientError::HttpError { status, body });
        }

        Err(CopilotClientError::MaxRetriesExceeded {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}
