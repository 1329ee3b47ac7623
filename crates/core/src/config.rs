use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub source: SourceConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// CFTC Socrata API client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    /// Politeness pacing between requests.
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
    /// Bounded retry budget for transient failures.
    pub max_retries: u32,
    /// Base delay for exponential backoff, doubled per attempt.
    pub retry_base_ms: u64,
}

/// Ingestion pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Records requested per page; a short page terminates pagination.
    pub page_size: u32,
    /// Hard cap on pages per run.
    pub max_pages: u32,
    /// Incremental fetch starts this many days before the latest stored
    /// report date, to pick up late corrections.
    pub watermark_margin_days: i64,
    /// Floor for full-history fetches.
    pub epoch_floor: NaiveDate,
    /// Batch-level retry attempts before a run surfaces PersistFailed.
    pub batch_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/cot_aggregator".to_string(),
                max_connections: 10,
            },
            source: SourceConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://publicreporting.cftc.gov/resource/6dca-aqww.json".to_string(),
            requests_per_minute: 60,
            timeout_secs: 30,
            max_retries: 3,
            retry_base_ms: 1000,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            max_pages: 500,
            watermark_margin_days: 30,
            epoch_floor: NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date"),
            batch_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.ingest.page_size, 1000);
        assert_eq!(config.ingest.watermark_margin_days, 30);
        assert!(config.source.base_url.contains("publicreporting.cftc.gov"));
    }

    #[test]
    fn test_config_round_trip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ingest.epoch_floor, config.ingest.epoch_floor);
        assert_eq!(parsed.source.max_retries, config.source.max_retries);
    }
}
