//! Derived metrics row model.

use serde::{Deserialize, Serialize};

/// Analytics derived from one report. Recomputed on demand, never
/// authoritative; the stored copy only serves the read-heavy dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CotMetricsRecord {
    pub cot_report_id: i64,
    pub commercial_net: i64,
    pub non_commercial_net: i64,
    /// Percentage-of-open-interest fields are 0.0 when open interest is 0.
    pub commercial_long_pct: f64,
    pub commercial_short_pct: f64,
    pub non_commercial_long_pct: f64,
    pub non_commercial_short_pct: f64,
    pub non_reportable_pct: f64,
    /// Commercial net scaled against open interest, clamped to [-100, 100].
    pub commercial_sentiment: f64,
}
