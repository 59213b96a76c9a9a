//! Country geolocation lookup library for geo-enrich.
//!
//! Wraps a MaxMind GeoLite2 Country database behind a small read-only API:
//!
//! - Load Once: the database file is read into memory at startup and shared
//!   across all lookups for the process lifetime
//! - Explicit Failure Taxonomy: invalid address literals, failed hostname
//!   resolution, and missing database coverage are distinct error variants
//! - Concurrency: lookups hold no mutable state and are safe from any task

pub mod error;
pub mod resolver;

pub use error::{Error, Result};
pub use resolver::{resolve_host, CountryDb, CountryLookup};
