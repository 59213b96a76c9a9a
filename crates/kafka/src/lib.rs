//! Kafka plumbing for `geo-enrich`: consuming raw event records and
//! republishing their enriched counterparts.
//!
//! Features:
//!
//! - String Values: message values are decoded as UTF-8 strings, the wire
//!   format of the event records this service processes
//! - Consumer Groups: spawn multiple consumers in the same consumer group
//! - Batch Processing: process messages in batches with manual offset commits
//!   after the whole batch has been handled (at-least-once)
//! - Producer: publish enriched records, preserving the source record's key

/// High-level API for spawning consumer tasks
///
/// Takes the consumer config to create one or more consumers in the same
/// consumer group, each running in its own async task.
pub mod client;

/// Low-level consumer with manual offsets
pub mod consumer;
pub mod error;

/// Producer for publishing enriched records and test fixtures
pub mod producer;

// Re-export main types for easy access
pub use client::Client;
pub use consumer::{Consumer, ConsumerConfig, Message};
pub use error::{Error, Result};
pub use producer::Producer;
