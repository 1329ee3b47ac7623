//! HTTP client for the CFTC Socrata COT endpoint.
//!
//! Issues one request per page, paces requests through a rate limiter, and
//! retries transient failures with bounded exponential backoff. Pagination
//! policy (short-page termination) lives in the callers; this client only
//! fetches single pages.

use std::time::Duration;

use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;

use chrono::NaiveDate;
use cot_core::config::SourceConfig;

use crate::error::{Result, SourceError};
use crate::records::RawCotRecord;

/// CFTC Legacy Futures dataset endpoint.
pub const CFTC_API_URL: &str = "https://publicreporting.cftc.gov/resource/6dca-aqww.json";

/// Newest-first ordering used by every query.
const ORDER_BY: &str = "report_date_as_yyyy_mm_dd DESC";

/// Rate-limited, retrying CFTC API client.
pub struct SourceClient {
    http: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    max_retries: u32,
    retry_base: Duration,
}

impl SourceClient {
    /// Creates a client with default settings (60 requests/minute, 30 s
    /// timeout, 3 retries).
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&SourceConfig::default())
    }

    /// Creates a client from configuration.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be built or the rate limit is zero.
    #[must_use]
    pub fn from_config(config: &SourceConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        let per_minute =
            NonZeroU32::new(config.requests_per_minute).unwrap_or(nonzero!(60u32));

        Self {
            http,
            base_url: config.base_url.clone(),
            rate_limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
            max_retries: config.max_retries,
            retry_base: Duration::from_millis(config.retry_base_ms),
        }
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Overrides the retry budget and backoff base.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, retry_base: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_base = retry_base;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one page of records, newest first, optionally filtered to
    /// report dates on or after `since`.
    ///
    /// # Errors
    /// Returns `FetchFailed` once the transient-retry budget is exhausted,
    /// or an `Api` error for non-retryable responses.
    pub async fn fetch_page(
        &self,
        since: Option<NaiveDate>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RawCotRecord>> {
        let mut query = vec![
            ("$limit", limit.to_string()),
            ("$offset", offset.to_string()),
            ("$order", ORDER_BY.to_string()),
        ];
        if let Some(since) = since {
            query.push(("$where", format!("report_date_as_yyyy_mm_dd >= '{since}'")));
        }

        self.get_records(&query).await
    }

    /// Fetches the single most recent record for one contract code.
    ///
    /// # Errors
    /// Same failure modes as [`fetch_page`](Self::fetch_page).
    pub async fn fetch_latest(&self, contract_code: &str) -> Result<Option<RawCotRecord>> {
        let query = vec![
            ("$where", format!("cftc_contract_market_code = '{contract_code}'")),
            ("$order", ORDER_BY.to_string()),
            ("$limit", "1".to_string()),
        ];

        let records = self.get_records(&query).await?;
        Ok(records.into_iter().next())
    }

    /// Returns the most recent report date available at the source.
    ///
    /// # Errors
    /// Same failure modes as [`fetch_page`](Self::fetch_page).
    pub async fn latest_report_date(&self) -> Result<Option<NaiveDate>> {
        let query = vec![
            ("$select", "report_date_as_yyyy_mm_dd".to_string()),
            ("$order", ORDER_BY.to_string()),
            ("$limit", "1".to_string()),
        ];

        let records = self.get_records(&query).await?;
        Ok(records.into_iter().next().and_then(|r| r.report_date()))
    }

    /// Waits for the rate limiter, issues the request, and retries
    /// transient failures with exponential backoff.
    async fn get_records(&self, query: &[(&str, String)]) -> Result<Vec<RawCotRecord>> {
        let mut attempt: u32 = 0;

        loop {
            self.rate_limiter.until_ready().await;
            attempt += 1;

            match self.try_get(query).await {
                Ok(records) => return Ok(records),
                Err(err) if err.is_transient() => {
                    if attempt > self.max_retries {
                        return Err(SourceError::FetchFailed {
                            attempts: attempt,
                            message: err.to_string(),
                        });
                    }
                    let delay = self.retry_base * 2u32.pow(attempt - 1);
                    tracing::warn!(
                        attempt,
                        retries_left = self.max_retries - attempt + 1,
                        error = %err,
                        "CFTC API retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_get(&self, query: &[(&str, String)]) -> Result<Vec<RawCotRecord>> {
        tracing::debug!(url = %self.base_url, "GET CFTC page");

        let response = self.http.get(&self.base_url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SourceError::api(status.as_u16(), text));
        }

        let records = response.json::<Vec<RawCotRecord>>().await?;
        Ok(records)
    }
}

impl Default for SourceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gold_record(date: &str) -> serde_json::Value {
        json!({
            "market_and_exchange_names": "GOLD - COMMODITY EXCHANGE INC.",
            "cftc_contract_market_code": "088691",
            "report_date_as_yyyy_mm_dd": format!("{date}T00:00:00.000"),
            "open_interest_all": "400000",
            "comm_positions_long_all": "63251",
            "comm_positions_short_all": "349526",
            "noncomm_positions_long_all": "307611",
            "noncomm_positions_short_all": "47875",
            "nonrept_positions_long_all": "29138",
            "nonrept_positions_short_all": "2599"
        })
    }

    fn test_client(server: &MockServer) -> SourceClient {
        SourceClient::new()
            .with_base_url(server.uri())
            .with_retry(2, Duration::from_millis(10))
    }

    #[test]
    fn test_client_defaults() {
        let client = SourceClient::new();
        assert_eq!(client.base_url(), CFTC_API_URL);
    }

    #[tokio::test]
    async fn test_fetch_page_sends_socrata_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("$limit", "1000"))
            .and(query_param("$offset", "2000"))
            .and(query_param("$order", "report_date_as_yyyy_mm_dd DESC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                gold_record("2024-01-02"),
                gold_record("2023-12-26"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let records = client.fetch_page(None, 2000, 1000).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].contract_code(), Some("088691"));
    }

    #[tokio::test]
    async fn test_fetch_page_applies_date_filter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param(
                "$where",
                "report_date_as_yyyy_mm_dd >= '2024-01-01'",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let since = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = client.fetch_page(Some(since), 0, 1000).await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let server = MockServer::start().await;

        // First attempt fails with a 500, second succeeds.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream hiccup"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([gold_record(
                "2024-01-02"
            )])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let records = client.fetch_page(None, 0, 1000).await.unwrap();

        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_retry_budget_exhaustion_surfaces_fetch_failed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(3) // initial attempt + 2 retries
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.fetch_page(None, 0, 1000).await.unwrap_err();

        assert!(matches!(err, SourceError::FetchFailed { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("malformed $where"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.fetch_page(None, 0, 1000).await.unwrap_err();

        assert!(matches!(
            err,
            SourceError::Api {
                status_code: 400,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_latest_filters_by_contract_code() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("$where", "cftc_contract_market_code = '088691'"))
            .and(query_param("$limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([gold_record(
                "2024-01-02"
            )])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let record = client.fetch_latest("088691").await.unwrap().unwrap();

        assert_eq!(
            record.report_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[tokio::test]
    async fn test_fetch_latest_empty_result() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert!(client.fetch_latest("999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_report_date_uses_projection() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("$select", "report_date_as_yyyy_mm_dd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "report_date_as_yyyy_mm_dd": "2024-01-02T00:00:00.000" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let date = client.latest_report_date().await.unwrap();

        assert_eq!(date, Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
    }
}
