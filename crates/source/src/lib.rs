//! CFTC Socrata API client for the COT aggregator.
//!
//! This crate provides:
//! - Raw record types with string-typed numeric fields
//! - A rate-limited, retrying page client with typed errors

pub mod client;
pub mod error;
pub mod records;

pub use client::{SourceClient, CFTC_API_URL};
pub use error::SourceError;
pub use records::RawCotRecord;
