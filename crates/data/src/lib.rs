//! PostgreSQL storage for the COT aggregator.
//!
//! This crate provides:
//! - Database handle with schema bootstrap and close lifecycle
//! - Row models for markets, reports, metrics, and trends
//! - Repositories with conflict-safe batched upserts

pub mod database;
pub mod models;
pub mod repositories;

pub use database::Database;

// Re-export models
pub use models::{CotMetricsRecord, CotReportRecord, MarketRecord, NewCotReport, TrendRecord};

// Re-export repositories
pub use repositories::{
    CotMetricsRepository, CotReportRepository, MarketRepository, Repositories, TrendRepository,
};
