//! Per-record enrichment transform.
//!
//! Maps one raw message value to at most one outbound value: parse the JSON
//! record, resolve its `source` address to a country, rebuild the record
//! with the `country` field filled in. The transform holds no cross-record
//! state; a single [`Enricher`] is shared across all consumer tasks.

use crate::record::InboundRecord;
use geo_enrich_geoip::{resolve_host, CountryLookup};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    /// Input was not a JSON object with a `source` field. Nothing is emitted
    /// for such records.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Failed to serialize outbound record: {0}")]
    Serialize(String),
}

/// Outcome of enriching one well-formed record.
#[derive(Debug)]
pub enum Enriched {
    /// Resolution succeeded; the value carries the country name.
    Full(String),
    /// Resolution failed; the value carries an empty `country` field and the
    /// reason is kept for diagnostics.
    Degraded {
        value: String,
        reason: geo_enrich_geoip::Error,
    },
}

impl Enriched {
    /// The outbound message value, whichever way enrichment went.
    pub fn into_value(self) -> String {
        match self {
            Enriched::Full(value) => value,
            Enriched::Degraded { value, .. } => value,
        }
    }
}

/// The per-record mapping function.
///
/// Generic over the lookup so tests can substitute an in-memory table for
/// the country database.
pub struct Enricher<L> {
    lookup: Arc<L>,
}

impl<L: CountryLookup> Enricher<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self { lookup }
    }

    /// Map one raw message value to its enriched form.
    ///
    /// Returns `Err` only for malformed input; resolution failures are the
    /// [`Enriched::Degraded`] outcome so the caller still has a record to
    /// publish.
    pub fn enrich(&self, raw: &str) -> Result<Enriched, EnrichError> {
        let record = InboundRecord::from_json(raw)
            .map_err(|e| EnrichError::MalformedRecord(e.to_string()))?;

        match self.resolve(&record.source) {
            Ok(country) => {
                let value = record
                    .with_country(country)
                    .to_json()
                    .map_err(|e| EnrichError::Serialize(e.to_string()))?;
                Ok(Enriched::Full(value))
            }
            Err(reason) => {
                let value = record
                    .with_country(String::new())
                    .to_json()
                    .map_err(|e| EnrichError::Serialize(e.to_string()))?;
                Ok(Enriched::Degraded { value, reason })
            }
        }
    }

    fn resolve(&self, source: &str) -> geo_enrich_geoip::Result<String> {
        let ip = resolve_host(source)?;
        self.lookup.country(ip)
    }
}
