//! Row models for the COT aggregator.
//!
//! Position counts are whole contract numbers, stored as `i64`.
//! Models derive `sqlx::FromRow` for database compatibility.

pub mod market;
pub mod metrics;
pub mod report;
pub mod trend;

pub use market::MarketRecord;
pub use metrics::CotMetricsRecord;
pub use report::{CotReportRecord, NewCotReport};
pub use trend::TrendRecord;
