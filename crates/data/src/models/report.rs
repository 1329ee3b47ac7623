//! COT report row models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A persisted weekly COT report.
///
/// Natural key: `(market_id, report_date, source)` — at most one row per
/// key, enforced by a unique index and upsert-on-conflict writes.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CotReportRecord {
    pub id: i64,
    pub market_id: i32,
    /// Tuesday as-of date of the report.
    pub report_date: NaiveDate,
    /// Friday release date (report date + 3 days).
    pub publish_date: NaiveDate,
    pub commercial_long: i64,
    pub commercial_short: i64,
    pub non_commercial_long: i64,
    pub non_commercial_short: i64,
    pub non_reportable_long: i64,
    pub non_reportable_short: i64,
    pub open_interest: i64,
    /// Week-over-week deltas, when the source provides them.
    pub commercial_long_change: Option<i64>,
    pub commercial_short_change: Option<i64>,
    pub non_commercial_long_change: Option<i64>,
    pub non_commercial_short_change: Option<i64>,
    pub source: String,
}

impl CotReportRecord {
    /// Commercial net position (long minus short).
    #[must_use]
    pub fn commercial_net(&self) -> i64 {
        self.commercial_long - self.commercial_short
    }

    /// Non-commercial net position (long minus short).
    #[must_use]
    pub fn non_commercial_net(&self) -> i64 {
        self.non_commercial_long - self.non_commercial_short
    }
}

/// A normalized report ready for upsert, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCotReport {
    pub market_id: i32,
    pub report_date: NaiveDate,
    pub publish_date: NaiveDate,
    pub commercial_long: i64,
    pub commercial_short: i64,
    pub non_commercial_long: i64,
    pub non_commercial_short: i64,
    pub non_reportable_long: i64,
    pub non_reportable_short: i64,
    pub open_interest: i64,
    pub commercial_long_change: Option<i64>,
    pub commercial_short_change: Option<i64>,
    pub non_commercial_long_change: Option<i64>,
    pub non_commercial_short_change: Option<i64>,
    pub source: String,
}

impl NewCotReport {
    /// Natural key of this report.
    #[must_use]
    pub fn natural_key(&self) -> (i32, NaiveDate, &str) {
        (self.market_id, self.report_date, &self.source)
    }

    /// Promotes this report to a stored record with the given id.
    #[must_use]
    pub fn into_record(self, id: i64) -> CotReportRecord {
        CotReportRecord {
            id,
            market_id: self.market_id,
            report_date: self.report_date,
            publish_date: self.publish_date,
            commercial_long: self.commercial_long,
            commercial_short: self.commercial_short,
            non_commercial_long: self.non_commercial_long,
            non_commercial_short: self.non_commercial_short,
            non_reportable_long: self.non_reportable_long,
            non_reportable_short: self.non_reportable_short,
            open_interest: self.open_interest,
            commercial_long_change: self.commercial_long_change,
            commercial_short_change: self.commercial_short_change,
            non_commercial_long_change: self.non_commercial_long_change,
            non_commercial_short_change: self.non_commercial_short_change,
            source: self.source,
        }
    }
}
