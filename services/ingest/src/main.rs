mod connector;
mod copilot;
mod cursor;

use tandem_config::{init_tracing, AppConfig};

use crate::connector::Connector;
use crate::copilot::client::{CopilotClient, CopilotClientConfig};
use crate::copilot::sync::CopilotSyncer;
use crate::cursor::client::{CursorClient, CursorClientConfig};
use crate::cursor::sync::CursorSyncer;

#[tokio::main]
async fn main() {
    init_tracing("info");
    let _ = dotenvy::dotenv();

    tracing::info!(service = "tandem-ingest", "starting");

    let config = AppConfig::from_env().expect("failed to load config");

    // The two platform fetches touch disjoint snapshot paths, so they run
    // concurrently; aggregation happens in a separate report run after both
    // have settled.
    let copilot_task = async {
        match CopilotClientConfig::from_env(&config.org) {
            Some(client_config) => {
                tracing::info!(org = %config.org, "copilot connector configured, starting sync");
                let client =
                    CopilotClient::new(client_config).expect("failed to create copilot client");
                let syncer = CopilotSyncer::new(&config.org, client, &config.data_dir);
                match syncer.sync().await {
                    Ok(result) => {
                        tracing::info!(
                            source = result.source,
                            files_written = result.files_written,
                            records = result.records,
                            errors = result.errors,
                            "copilot sync completed"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "copilot sync failed");
                    }
                }
            }
            None => {
                tracing::info!("no copilot credentials found, skipping copilot sync");
            }
        }
    };

    let cursor_task = async {
        match CursorClientConfig::from_env() {
            Some(client_config) => {
                tracing::info!("cursor connector configured, starting sync");
                let client =
                    CursorClient::new(client_config).expect("failed to create cursor client");
                let syncer = CursorSyncer::new(client, &config.data_dir);
                match syncer.sync().await {
                    Ok(result) => {
                        tracing::info!(
                            source = result.source,
                            files_written = result.files_written,
                            records = result.records,
                            errors = result.errors,
                            "cursor sync completed"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "cursor sync failed");
                    }
                }
            }
            None => {
                tracing::info!("no cursor credentials found, skipping cursor sync");
            }
        }
    };

    tokio::join!(copilot_task, cursor_task);

    tracing::info!("ingest finished");
}
