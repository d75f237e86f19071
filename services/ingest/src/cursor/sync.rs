use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use super::client::CursorClient;
use super::models::{ActivitySnapshotBody, SnapshotMeta};
use crate::connector::{Connector, SyncResult};

pub struct CursorSyncer {
    client: CursorClient,
    data_dir: PathBuf,
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
}

impl CursorSyncer {
    pub fn new(client: CursorClient, data_dir: &Path) -> Self {
        Self {
            client,
            data_dir: data_dir.to_path_buf(),
        }
    }

    fn write_snapshot(
        &self,
        file_name: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        data: Vec<Value>,
    ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
        let day = Utc::now().date_naive().to_string();
        let dir = self.data_dir.join("cursor").join(&day);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        let body = ActivitySnapshotBody {
            meta: SnapshotMeta {
                source: "cursor".to_string(),
                fetched_at: Utc::now(),
                window_start,
                window_end,
            },
            data,
        };
        std::fs::write(&path, serde_json::to_string_pretty(&body)?)?;
        tracing::info!(path = %path.display(), "snapshot written");
        Ok(path)
    }

    async fn fetch_and_write(
        &self,
        file_name: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        result: &mut SyncResult,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self.client.fetch_daily_usage(window_start, window_end).await {
            Ok(rows) => {
                result.records += rows.len();
                self.write_snapshot(file_name, window_start, window_end, rows)?;
                result.files_written += 1;
            }
            Err(e) => {
                tracing::error!(file = file_name, error = %e, "cursor usage fetch failed");
                result.errors += 1;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Connector for CursorSyncer {
    fn source_name(&self) -> &str {
        "cursor"
    }

    /// One run captures three overlapping windows: today, the trailing
    /// seven days, and the current calendar month to date. Each lands in
    /// its own immutable dated snapshot; the report side accumulates and
    /// deduplicates across them.
    async fn sync(&self) -> Result<SyncResult, Box<dyn std::error::Error + Send + Sync>> {
        let now = Utc::now();
        let today = now.date_naive();

        let mut result = SyncResult {
            source: "cursor".to_string(),
            files_written: 0,
            records: 0,
            errors: 0,
        };

        self.fetch_and_write(
            &format!("cursor-daily_{today}.json"),
            start_of_day(today),
            now,
            &mut result,
        )
        .await?;
        tokio::time::sleep(self.client.request_delay()).await;

        let week_start = today - Duration::days(6);
        self.fetch_and_write(
            &format!("cursor-weekly_{week_start}_{today}.json"),
            start_of_day(week_start),
            now,
            &mut result,
        )
        .await?;
        tokio::time::sleep(self.client.request_delay()).await;

        let month_start = today.with_day(1).expect("day 1 is valid");
        self.fetch_and_write(
            &format!("cursor-monthly_{}.json", today.format("%Y-%m")),
            start_of_day(month_start),
            now,
            &mut result,
        )
        .await?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::client::{CursorClient, CursorClientConfig};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> CursorClient {
        CursorClient::new(CursorClientConfig {
            base_url: base_url.to_string(),
            api_key: "key_test".to_string(),
            max_retries: 0,
            timeout_secs: 5,
            request_delay_ms: 0,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sync_writes_daily_weekly_and_monthly_snapshots() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/teams/daily-usage-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"date": "2026-08-01", "userId": 1, "email": "a@x.com"}]
            })))
            .expect(3)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let syncer = CursorSyncer::new(test_client(&server.uri()), dir.path());
        let result = syncer.sync().await.expect("sync should succeed");

        assert_eq!(result.files_written, 3);
        assert_eq!(result.records, 3);
        assert_eq!(result.errors, 0);

        let today = Utc::now().date_naive();
        let day_dir = dir.path().join("cursor").join(today.to_string());
        assert!(day_dir.join(format!("cursor-daily_{today}.json")).exists());
        assert!(day_dir
            .join(format!("cursor-monthly_{}.json", today.format("%Y-%m")))
            .exists());

        let daily: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(day_dir.join(format!("cursor-daily_{today}.json"))).unwrap(),
        )
        .unwrap();
        assert_eq!(daily["meta"]["source"], "cursor");
        assert_eq!(daily["data"][0]["email"], "a@x.com");
    }

    #[tokio::test]
    async fn failed_fetches_are_counted_not_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/teams/daily-usage-data"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let syncer = CursorSyncer::new(test_client(&server.uri()), dir.path());
        let result = syncer.sync().await.expect("sync itself should succeed");

        assert_eq!(result.files_written, 0);
        assert_eq!(result.errors, 3);
    }
}
