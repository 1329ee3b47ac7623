//! Trend row model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-market, per-period trend snapshot as of the latest report.
///
/// Keyed on `(market_id, period_weeks)`; each recompute replaces the
/// previous snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrendRecord {
    pub market_id: i32,
    /// Moving-average period length in weeks (4, 13, or 26).
    pub period_weeks: i32,
    /// Report date of the most recent report in the window.
    pub week_ending: NaiveDate,
    /// None until `period_weeks` reports exist, never silently zero.
    pub ma_commercial_net: Option<f64>,
    /// Percent change of commercial net over the period window; None when
    /// history is shorter than the window.
    pub rate_of_change: Option<f64>,
    pub is_extreme_long: bool,
    pub is_extreme_short: bool,
}
