use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;

use super::client::CopilotClient;
use super::models::{MetricsSnapshotBody, SeatSnapshotBody, SnapshotMeta};
use crate::connector::{Connector, SyncResult};

pub struct CopilotSyncer {
    org: String,
    client: CopilotClient,
    data_dir: PathBuf,
}

impl CopilotSyncer {
    pub fn new(org: &str, client: CopilotClient, data_dir: &Path) -> Self {
        Self {
            org: org.to_string(),
            client,
            data_dir: data_dir.to_path_buf(),
        }
    }

    fn meta(&self) -> SnapshotMeta {
        SnapshotMeta {
            org: self.org.clone(),
            source: "copilot".to_string(),
            fetched_at: Utc::now(),
        }
    }

    /// Write one immutable dated snapshot under
    /// `data_dir/copilot/YYYY-MM-DD/`. Files are never edited afterwards.
    fn write_snapshot(
        &self,
        file_name: &str,
        body: &impl serde::Serialize,
    ) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
        let day = Utc::now().date_naive().to_string();
        let dir = self.data_dir.join("copilot").join(&day);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        std::fs::write(&path, serde_json::to_string_pretty(body)?)?;
        tracing::info!(path = %path.display(), "snapshot written");
        Ok(path)
    }
}

#[async_trait]
impl Connector for CopilotSyncer {
    fn source_name(&self) -> &str {
        "copilot"
    }

    async fn sync(&self) -> Result<SyncResult, Box<dyn std::error::Error + Send + Sync>> {
        let day = Utc::now().date_naive().to_string();
        let mut files_written = 0;
        let mut records = 0;
        let mut errors = 0;

        match self.client.fetch_all_seats().await {
            Ok(seats) => {
                records += seats.len();
                let body = SeatSnapshotBody {
                    meta: self.meta(),
                    seats,
                };
                self.write_snapshot(&format!("{}_copilot-seats_{day}.json", self.org), &body)?;
                files_written += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "copilot seat fetch failed");
                errors += 1;
            }
        }

        match self.client.fetch_metrics().await {
            Ok(days) => {
                records += days.len();
                let body = MetricsSnapshotBody {
                    meta: self.meta(),
                    data: days,
                };
                self.write_snapshot(&format!("{}_copilot-metrics_{day}.json", self.org), &body)?;
                files_written += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "copilot metrics fetch failed");
                errors += 1;
            }
        }

        Ok(SyncResult {
            source: "copilot".to_string(),
            files_written,
            records,
            errors,
        })
    }
}
