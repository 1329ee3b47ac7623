//! Raw record normalization.
//!
//! Converts one raw source record into a `NewCotReport`. Percentages and
//! sentiment are deliberately not computed here so raw storage stays
//! independent of scaling choices; see the metrics module.

use chrono::Duration;
use cot_core::SOURCE_TAG;
use cot_data::NewCotReport;
use cot_source::RawCotRecord;

/// The CFTC releases a Tuesday report on the following Friday.
pub const PUBLISH_LAG_DAYS: i64 = 3;

/// Parses a position field, defaulting missing or unparseable values to 0.
///
/// The source serves numbers as strings and does not distinguish a true
/// zero from an absent value; that precision loss is accepted here rather
/// than papered over.
pub(crate) fn parse_position(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0)
}

/// Parses an optional week-over-week delta, kept absent when not provided.
fn parse_change(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

/// Normalizes one raw record for the given market.
///
/// Returns None when the record has no parseable report date; such records
/// are counted as skipped, never treated as fatal.
#[must_use]
pub fn transform(raw: &RawCotRecord, market_id: i32) -> Option<NewCotReport> {
    let Some(report_date) = raw.report_date() else {
        tracing::debug!(
            market_id,
            raw_date = ?raw.report_date_as_yyyy_mm_dd,
            "skipping record without parseable report date"
        );
        return None;
    };

    let commercial_long = parse_position(raw.comm_positions_long_all.as_deref());
    let commercial_short = parse_position(raw.comm_positions_short_all.as_deref());
    let non_commercial_long = parse_position(raw.noncomm_positions_long_all.as_deref());
    let non_commercial_short = parse_position(raw.noncomm_positions_short_all.as_deref());
    let non_reportable_short = parse_position(raw.nonrept_positions_short_all.as_deref());
    let open_interest = parse_position(raw.open_interest_all.as_deref());

    if open_interest < 0 {
        // Data-quality defect at the source; stored as-is, flagged here.
        tracing::warn!(
            market_id,
            %report_date,
            open_interest,
            "negative open interest in source record"
        );
    }

    // The legacy dataset normally carries the non-reportable long side; when
    // it is absent, fall back to the residual of open interest.
    let non_reportable_long = match raw.nonrept_positions_long_all.as_deref() {
        Some(value) => parse_position(Some(value)),
        None => (open_interest - commercial_long - non_commercial_long).max(0),
    };

    Some(NewCotReport {
        market_id,
        report_date,
        publish_date: report_date + Duration::days(PUBLISH_LAG_DAYS),
        commercial_long,
        commercial_short,
        non_commercial_long,
        non_commercial_short,
        non_reportable_long,
        non_reportable_short,
        open_interest,
        commercial_long_change: parse_change(raw.change_in_comm_long_all.as_deref()),
        commercial_short_change: parse_change(raw.change_in_comm_short_all.as_deref()),
        non_commercial_long_change: parse_change(raw.change_in_noncomm_long_all.as_deref()),
        non_commercial_short_change: parse_change(raw.change_in_noncomm_short_all.as_deref()),
        source: SOURCE_TAG.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(date: &str) -> RawCotRecord {
        RawCotRecord {
            market_and_exchange_names: Some("GOLD - COMMODITY EXCHANGE INC.".to_string()),
            cftc_contract_market_code: Some("088691".to_string()),
            report_date_as_yyyy_mm_dd: Some(format!("{date}T00:00:00.000")),
            open_interest_all: Some("400000".to_string()),
            comm_positions_long_all: Some("63251".to_string()),
            comm_positions_short_all: Some("349526".to_string()),
            noncomm_positions_long_all: Some("307611".to_string()),
            noncomm_positions_short_all: Some("47875".to_string()),
            nonrept_positions_long_all: Some("29138".to_string()),
            nonrept_positions_short_all: Some("2599".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_transform_maps_position_fields() {
        let report = transform(&raw("2024-01-02"), 7).unwrap();

        assert_eq!(report.market_id, 7);
        assert_eq!(
            report.report_date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(report.commercial_long, 63_251);
        assert_eq!(report.commercial_short, 349_526);
        assert_eq!(report.non_commercial_long, 307_611);
        assert_eq!(report.non_commercial_short, 47_875);
        assert_eq!(report.non_reportable_long, 29_138);
        assert_eq!(report.non_reportable_short, 2_599);
        assert_eq!(report.open_interest, 400_000);
        assert_eq!(report.source, "CFTC_API");
    }

    #[test]
    fn test_transform_nets_match_reference_values() {
        let report = transform(&raw("2024-01-02"), 1).unwrap();
        let commercial_net = report.commercial_long - report.commercial_short;
        let non_commercial_net = report.non_commercial_long - report.non_commercial_short;

        assert_eq!(commercial_net, -286_275);
        assert_eq!(non_commercial_net, 259_736);
    }

    #[test]
    fn test_publish_date_is_three_days_after_report_date() {
        let report = transform(&raw("2024-01-02"), 1).unwrap();
        assert_eq!(
            report.publish_date,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
    }

    #[test]
    fn test_missing_numerics_default_to_zero() {
        let record = RawCotRecord {
            report_date_as_yyyy_mm_dd: Some("2024-01-02".to_string()),
            ..Default::default()
        };
        let report = transform(&record, 1).unwrap();

        assert_eq!(report.commercial_long, 0);
        assert_eq!(report.open_interest, 0);
        assert_eq!(report.commercial_long_change, None);
    }

    #[test]
    fn test_residual_non_reportable_long_floors_at_zero() {
        let mut record = raw("2024-01-02");
        record.nonrept_positions_long_all = None;
        // Reported longs exceed open interest; residual must not go negative.
        record.open_interest_all = Some("100000".to_string());

        let report = transform(&record, 1).unwrap();
        assert_eq!(report.non_reportable_long, 0);
    }

    #[test]
    fn test_residual_non_reportable_long_computed_when_absent() {
        let mut record = raw("2024-01-02");
        record.nonrept_positions_long_all = None;
        record.open_interest_all = Some("400000".to_string());

        let report = transform(&record, 1).unwrap();
        // 400000 - 63251 - 307611
        assert_eq!(report.non_reportable_long, 29_138);
    }

    #[test]
    fn test_unparseable_date_is_skipped() {
        let mut record = raw("2024-01-02");
        record.report_date_as_yyyy_mm_dd = Some("not-a-date".to_string());
        assert!(transform(&record, 1).is_none());

        record.report_date_as_yyyy_mm_dd = None;
        assert!(transform(&record, 1).is_none());
    }

    #[test]
    fn test_negative_open_interest_is_kept() {
        let mut record = raw("2024-01-02");
        record.open_interest_all = Some("-5".to_string());

        // Flagged as a data-quality defect but not rejected.
        let report = transform(&record, 1).unwrap();
        assert_eq!(report.open_interest, -5);
    }

    #[test]
    fn test_change_fields_pass_through() {
        let mut record = raw("2024-01-02");
        record.change_in_comm_long_all = Some("-1200".to_string());
        record.change_in_noncomm_short_all = Some("350".to_string());

        let report = transform(&record, 1).unwrap();
        assert_eq!(report.commercial_long_change, Some(-1200));
        assert_eq!(report.non_commercial_short_change, Some(350));
        assert_eq!(report.commercial_short_change, None);
    }
}
