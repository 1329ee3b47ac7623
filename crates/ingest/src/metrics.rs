//! Derived analytics over stored reports.
//!
//! Pure functions, no IO. Nets and percentages come from a single report;
//! moving averages, rate of change, and extreme-positioning flags need the
//! market's history in ascending report-date order.

use cot_data::{CotMetricsRecord, CotReportRecord, TrendRecord};

/// Moving-average windows computed per market, in weeks.
pub const DEFAULT_PERIODS: [usize; 3] = [4, 13, 26];

/// Reports considered when ranking the current net against history.
pub const EXTREME_LOOKBACK: usize = 52;

/// Percentile rank at or beyond which positioning is flagged extreme.
pub const EXTREME_PERCENTILE: f64 = 90.0;

/// Extreme-positioning assessment for one market.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtremeFlags {
    /// Percentile of the current commercial net within the lookback range;
    /// None when the range is empty or flat.
    pub percentile: Option<f64>,
    pub is_extreme_long: bool,
    pub is_extreme_short: bool,
}

/// Computes per-report metrics.
///
/// When open interest is not positive every percentage and the sentiment
/// are 0.0 rather than dividing by zero.
#[must_use]
pub fn compute_metrics(report: &CotReportRecord) -> CotMetricsRecord {
    let commercial_net = report.commercial_net();
    let non_commercial_net = report.non_commercial_net();

    let oi = report.open_interest;
    let pct = |positions: i64| -> f64 {
        if oi > 0 {
            positions as f64 / oi as f64 * 100.0
        } else {
            0.0
        }
    };

    let commercial_sentiment = if oi > 0 {
        (commercial_net as f64 / oi as f64 * 200.0)
            .round()
            .clamp(-100.0, 100.0)
    } else {
        0.0
    };

    CotMetricsRecord {
        cot_report_id: report.id,
        commercial_net,
        non_commercial_net,
        commercial_long_pct: pct(report.commercial_long),
        commercial_short_pct: pct(report.commercial_short),
        non_commercial_long_pct: pct(report.non_commercial_long),
        non_commercial_short_pct: pct(report.non_commercial_short),
        non_reportable_pct: pct(report.non_reportable_long + report.non_reportable_short),
        commercial_sentiment,
    }
}

/// Trailing moving average over a value series.
///
/// Output is aligned with the input: position `i` holds the mean of the
/// window ending at `i`, or None while fewer than `period` values exist.
#[must_use]
pub fn moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

/// Percent change from `previous` to `current`; 0.0 when the baseline is 0.
#[must_use]
pub fn rate_of_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous.abs() * 100.0
    }
}

/// Ranks the current commercial net within the lookback history.
///
/// `history` is the net series in ascending date order, current value last.
/// A flat or empty range yields no percentile and no flags.
#[must_use]
pub fn detect_extremes(history: &[f64]) -> ExtremeFlags {
    let Some(&current) = history.last() else {
        return ExtremeFlags::default();
    };
    let window_start = history.len().saturating_sub(EXTREME_LOOKBACK);
    let window = &history[window_start..];

    let min = window.iter().copied().fold(f64::INFINITY, f64::min);
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return ExtremeFlags::default();
    }

    let percentile = (current - min) / (max - min) * 100.0;
    ExtremeFlags {
        percentile: Some(percentile),
        is_extreme_long: percentile >= EXTREME_PERCENTILE,
        is_extreme_short: percentile <= 100.0 - EXTREME_PERCENTILE,
    }
}

/// Builds one trend snapshot per period from a market's ascending history.
///
/// Markets with no history produce no snapshots. The rate of change for a
/// period compares the latest net against the net `period` reports back,
/// and stays None when history is too short for that baseline.
#[must_use]
pub fn compute_trends(
    market_id: i32,
    history: &[CotReportRecord],
    periods: &[usize],
) -> Vec<TrendRecord> {
    let Some(latest) = history.last() else {
        return Vec::new();
    };

    let nets: Vec<f64> = history.iter().map(|r| r.commercial_net() as f64).collect();
    let extremes = detect_extremes(&nets);

    periods
        .iter()
        .map(|&period| {
            let ma = moving_average(&nets, period)
                .last()
                .copied()
                .flatten();
            let roc = if nets.len() > period {
                let baseline = nets[nets.len() - 1 - period];
                Some(rate_of_change(nets[nets.len() - 1], baseline))
            } else {
                None
            };
            TrendRecord {
                market_id,
                period_weeks: period as i32,
                week_ending: latest.report_date,
                ma_commercial_net: ma,
                rate_of_change: roc,
                is_extreme_long: extremes.is_extreme_long,
                is_extreme_short: extremes.is_extreme_short,
            }
        })
        .collect()
}
