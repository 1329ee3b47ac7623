//! Spot-check reconciliation against the live source.
//!
//! For every catalog market with a contract code, fetches the single most
//! recent source record and compares the position fields against the
//! stored row for the same report date. Shares the pipeline's client, so
//! the per-request pacing applies here too.

use std::sync::Arc;

use chrono::NaiveDate;
use cot_core::SOURCE_TAG;
use cot_data::MarketRecord;
use cot_source::{RawCotRecord, SourceClient};

use crate::error::Result;
use crate::resolver::Registry;
use crate::store::ReportStore;
use crate::transformer;

/// Absolute contract-count difference tolerated before flagging.
pub const ABS_TOLERANCE: i64 = 100;

/// Percent difference tolerated before flagging.
pub const PCT_TOLERANCE: f64 = 1.0;

/// One stored-vs-source discrepancy.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFinding {
    pub symbol: String,
    pub cftc_code: String,
    pub report_date: NaiveDate,
    /// Position field name, or "MISSING" when no stored row exists.
    pub field: &'static str,
    pub stored: i64,
    pub source: i64,
    pub difference: i64,
    pub percent_diff: f64,
}

impl ValidationFinding {
    fn missing(market: &MarketRecord, code: &str, report_date: NaiveDate) -> Self {
        Self {
            symbol: market.symbol.clone(),
            cftc_code: code.to_string(),
            report_date,
            field: "MISSING",
            stored: 0,
            source: 0,
            difference: 0,
            percent_diff: 100.0,
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Symbols whose latest report matched within tolerance.
    pub validated: Vec<String>,
    pub findings: Vec<ValidationFinding>,
}

/// Compares stored reports against fresh source records.
pub struct Reconciler<S: ReportStore> {
    client: Arc<SourceClient>,
    store: Arc<S>,
    registry: Arc<Registry>,
}

impl<S: ReportStore> Reconciler<S> {
    #[must_use]
    pub fn new(client: Arc<SourceClient>, store: Arc<S>, registry: Arc<Registry>) -> Self {
        Self {
            client,
            store,
            registry,
        }
    }

    /// Runs one pass over every market with a contract code.
    ///
    /// Markets the source has no record for are skipped silently; a market
    /// the source knows but storage does not yields a "MISSING" finding.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures and storage errors; a discrepancy is a
    /// finding, never an error.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();

        for market in self.registry.markets() {
            let Some(code) = market.cftc_code.as_deref() else {
                continue;
            };

            let Some(raw) = self.client.fetch_latest(code).await? else {
                tracing::debug!(symbol = %market.symbol, code, "no source record");
                continue;
            };
            let Some(report_date) = raw.report_date() else {
                tracing::debug!(symbol = %market.symbol, code, "source record has no date");
                continue;
            };

            let stored = self
                .store
                .find_by_market_and_date(market.id, report_date, SOURCE_TAG)
                .await?;

            match stored {
                None => {
                    tracing::warn!(symbol = %market.symbol, %report_date, "stored report missing");
                    outcome
                        .findings
                        .push(ValidationFinding::missing(market, code, report_date));
                }
                Some(stored) => {
                    let before = outcome.findings.len();
                    compare_fields(market, code, report_date, &stored, &raw, &mut outcome.findings);
                    if outcome.findings.len() == before {
                        outcome.validated.push(market.symbol.clone());
                    }
                }
            }
        }

        tracing::info!(
            validated = outcome.validated.len(),
            findings = outcome.findings.len(),
            "reconciliation pass complete"
        );
        Ok(outcome)
    }
}

fn compare_fields(
    market: &MarketRecord,
    code: &str,
    report_date: NaiveDate,
    stored: &cot_data::CotReportRecord,
    raw: &RawCotRecord,
    findings: &mut Vec<ValidationFinding>,
) {
    let parse = |field: &Option<String>| transformer::parse_position(field.as_deref());

    let pairs: [(&'static str, i64, i64); 7] = [
        ("open_interest", stored.open_interest, parse(&raw.open_interest_all)),
        ("commercial_long", stored.commercial_long, parse(&raw.comm_positions_long_all)),
        ("commercial_short", stored.commercial_short, parse(&raw.comm_positions_short_all)),
        (
            "non_commercial_long",
            stored.non_commercial_long,
            parse(&raw.noncomm_positions_long_all),
        ),
        (
            "non_commercial_short",
            stored.non_commercial_short,
            parse(&raw.noncomm_positions_short_all),
        ),
        (
            "non_reportable_long",
            stored.non_reportable_long,
            parse(&raw.nonrept_positions_long_all),
        ),
        (
            "non_reportable_short",
            stored.non_reportable_short,
            parse(&raw.nonrept_positions_short_all),
        ),
    ];

    for (field, stored_value, source_value) in pairs {
        let difference = (stored_value - source_value).abs();
        let percent_diff = if source_value != 0 {
            difference as f64 / (source_value as f64).abs() * 100.0
        } else if stored_value != 0 {
            100.0
        } else {
            0.0
        };

        if difference > ABS_TOLERANCE || percent_diff > PCT_TOLERANCE {
            findings.push(ValidationFinding {
                symbol: market.symbol.clone(),
                cftc_code: code.to_string(),
                report_date,
                field,
                stored: stored_value,
                source: source_value,
                difference,
                percent_diff,
            });
        }
    }
}
