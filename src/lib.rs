//! geo-enrich: single-stage Kafka stream enrichment.
//!
//! Consumes JSON event records from an input topic, resolves each record's
//! `source` IP address to a country name against a local GeoLite2 database,
//! and republishes the enriched record to an output topic.
//!
//! The library is split along the same lines as the wire format:
//! [`record`] defines the inbound/outbound shapes, [`enrich`] is the
//! per-record mapping function, and [`run`] wires consumer group, enricher,
//! and producer together.

pub mod enrich;
pub mod record;
pub mod run;

pub use enrich::{EnrichError, Enriched, Enricher};
pub use record::{InboundRecord, OutboundRecord};
pub use run::{run_enrichment, Config};
