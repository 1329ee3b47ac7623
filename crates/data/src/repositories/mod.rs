//! Database repositories for the COT aggregator.
//!
//! Each repository provides typed access to one table. Report writes are
//! batched into single transactions with conflict-safe upserts.

pub mod markets_repo;
pub mod metrics_repo;
pub mod reports_repo;
pub mod trends_repo;

pub use markets_repo::MarketRepository;
pub use metrics_repo::CotMetricsRepository;
pub use reports_repo::CotReportRepository;
pub use trends_repo::TrendRepository;

use sqlx::PgPool;

/// Creates all repositories from a single database pool.
pub struct Repositories {
    pub markets: MarketRepository,
    pub reports: CotReportRepository,
    pub metrics: CotMetricsRepository,
    pub trends: TrendRepository,
}

impl Repositories {
    /// Creates a new set of repositories from a database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            markets: MarketRepository::new(pool.clone()),
            reports: CotReportRepository::new(pool.clone()),
            metrics: CotMetricsRepository::new(pool.clone()),
            trends: TrendRepository::new(pool),
        }
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here, requiring a test database.
    // The pipeline exercises these through the ReportStore seam instead.
}
