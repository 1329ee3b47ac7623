//! Core types and configuration for the COT aggregator.
//!
//! This crate provides:
//! - Application configuration with figment-based loading
//! - The built-in market catalog (symbols, CFTC contract codes, name fragments)

pub mod catalog;
pub mod config;
pub mod config_loader;

pub use catalog::{MarketSpec, MARKET_CATALOG};
pub use config::{AppConfig, DatabaseConfig, IngestConfig, SourceConfig};
pub use config_loader::ConfigLoader;

/// Source tag recorded on every report row ingested from the CFTC API.
pub const SOURCE_TAG: &str = "CFTC_API";
