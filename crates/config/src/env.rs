use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use tandem_common::error::{TandemError, TandemResult};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub org: String,
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub lookback_days: i64,
    pub freshness_max_age_days: i64,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> TandemResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            org: get_var("GITHUB_ORG")?,
            data_dir: PathBuf::from(get_var_or("TANDEM_DATA_DIR", "data")),
            reports_dir: PathBuf::from(get_var_or("TANDEM_REPORTS_DIR", "reports")),
            lookback_days: get_var_or("TANDEM_LOOKBACK_DAYS", "7")
                .parse()
                .map_err(|e| TandemError::Config(format!("invalid TANDEM_LOOKBACK_DAYS: {e}")))?,
            freshness_max_age_days: get_var_or("TANDEM_FRESHNESS_MAX_AGE_DAYS", "7")
                .parse()
                .map_err(|e| {
                    TandemError::Config(format!("invalid TANDEM_FRESHNESS_MAX_AGE_DAYS: {e}"))
                })?,
            log_level: get_var_or("LOG_LEVEL", "info"),
        })
    }
}

fn get_var(key: &str) -> TandemResult<String> {
    env::var(key).map_err(|_| TandemError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
