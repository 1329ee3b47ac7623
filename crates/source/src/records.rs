//! Raw record types for the CFTC Legacy Futures dataset.
//!
//! Socrata serves every numeric field as a string; parsing and defaulting
//! happen downstream in the transformer. Fields absent from a `$select`
//! projection simply deserialize as None.

use chrono::NaiveDate;
use serde::Deserialize;

/// One raw row from the Legacy Futures COT dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCotRecord {
    pub market_and_exchange_names: Option<String>,
    pub cftc_contract_market_code: Option<String>,
    /// Floating timestamp, e.g. "2024-01-02T00:00:00.000".
    pub report_date_as_yyyy_mm_dd: Option<String>,
    pub open_interest_all: Option<String>,
    pub comm_positions_long_all: Option<String>,
    pub comm_positions_short_all: Option<String>,
    pub noncomm_positions_long_all: Option<String>,
    pub noncomm_positions_short_all: Option<String>,
    pub nonrept_positions_long_all: Option<String>,
    pub nonrept_positions_short_all: Option<String>,
    pub change_in_comm_long_all: Option<String>,
    pub change_in_comm_short_all: Option<String>,
    pub change_in_noncomm_long_all: Option<String>,
    pub change_in_noncomm_short_all: Option<String>,
}

impl RawCotRecord {
    /// Parses the report date, tolerating both date-only and floating
    /// timestamp forms.
    #[must_use]
    pub fn report_date(&self) -> Option<NaiveDate> {
        let raw = self.report_date_as_yyyy_mm_dd.as_deref()?;
        let date_part = raw.split('T').next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    /// Contract code, when present and non-empty.
    #[must_use]
    pub fn contract_code(&self) -> Option<&str> {
        self.cftc_contract_market_code
            .as_deref()
            .filter(|c| !c.is_empty())
    }

    /// Display name, defaulting to empty.
    #[must_use]
    pub fn market_name(&self) -> &str {
        self.market_and_exchange_names.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_date_with_timestamp() {
        let record = RawCotRecord {
            report_date_as_yyyy_mm_dd: Some("2024-01-02T00:00:00.000".to_string()),
            ..Default::default()
        };
        assert_eq!(
            record.report_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[test]
    fn test_report_date_date_only() {
        let record = RawCotRecord {
            report_date_as_yyyy_mm_dd: Some("2024-01-02".to_string()),
            ..Default::default()
        };
        assert_eq!(
            record.report_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[test]
    fn test_report_date_missing_or_garbage() {
        let record = RawCotRecord::default();
        assert_eq!(record.report_date(), None);

        let record = RawCotRecord {
            report_date_as_yyyy_mm_dd: Some("not-a-date".to_string()),
            ..Default::default()
        };
        assert_eq!(record.report_date(), None);
    }

    #[test]
    fn test_empty_contract_code_is_none() {
        let record = RawCotRecord {
            cftc_contract_market_code: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(record.contract_code(), None);
    }

    #[test]
    fn test_deserialize_ignores_extra_fields() {
        let json = r#"{
            "market_and_exchange_names": "GOLD - COMMODITY EXCHANGE INC.",
            "cftc_contract_market_code": "088691",
            "report_date_as_yyyy_mm_dd": "2024-01-02T00:00:00.000",
            "open_interest_all": "400000",
            "comm_positions_long_all": "63251",
            "cftc_region_code": "0"
        }"#;
        let record: RawCotRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.contract_code(), Some("088691"));
        assert_eq!(record.open_interest_all.as_deref(), Some("400000"));
        assert_eq!(record.nonrept_positions_long_all, None);
    }
}
