//! Stream run loop: consume, enrich, republish.
//!
//! Spawns a consumer group on the input topic and passes every record
//! through the [`Enricher`], publishing the result to the output topic.
//! Offsets are committed per batch after the whole batch has been
//! republished, so a crash mid-batch redelivers rather than drops.

use crate::enrich::{Enriched, Enricher};
use anyhow::{Context, Result};
use clap::Parser;
use geo_enrich_geoip::CountryLookup;
use geo_enrich_kafka::{Client, ConsumerConfig, Message, Producer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Configuration for the enrichment stream.
#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Application identity, used as the Kafka consumer group ID
    #[clap(long, default_value = "geo-enrich")]
    pub application_id: String,
    /// Kafka brokers (comma-separated or multiple --brokers)
    #[clap(long, value_delimiter = ',', default_value = "localhost:9092")]
    pub brokers: Vec<String>,
    /// Path to the GeoLite2 Country database (.mmdb)
    #[clap(long)]
    pub dataset_path: std::path::PathBuf,
    /// Topic to consume raw records from
    #[clap(long, default_value = "message")]
    pub input_topic: String,
    /// Topic to publish enriched records to
    #[clap(long, default_value = "messageWithCountry")]
    pub output_topic: String,
    /// Number of consumers in the consumer group to spawn
    #[clap(long, default_value_t = 1)]
    pub num_consumers: usize,
    /// Number of messages to read from Kafka per batch before committing.
    /// Larger batches improve throughput but increase memory usage and
    /// potential duplicate processing on failure.
    #[clap(long, default_value_t = 100)]
    pub batch_size: usize,
    /// Session timeout in milliseconds
    #[clap(long, default_value = "30000")]
    pub session_timeout_ms: String,
    /// Maximum number of messages to process before exiting.
    /// When set, the processor exits after handling this many messages.
    /// Useful for tests where the exact message count is known.
    #[clap(long)]
    pub max_messages: Option<u64>,
    /// Maximum time to run, in seconds. When absent the processor runs
    /// until stopped.
    #[clap(long)]
    pub timeout: Option<i64>,
}

/// Run the enrichment stream until stopped (or until a bound set via
/// `--max-messages` / `--timeout` is reached).
pub async fn run_enrichment<L: CountryLookup + 'static>(
    config: Config,
    lookup: Arc<L>,
) -> Result<()> {
    info!(
        "Starting enrichment from topic {} to topic {} as group {}",
        config.input_topic, config.output_topic, config.application_id
    );

    let brokers = config.brokers.join(",");

    let consumer_config = ConsumerConfig {
        brokers: brokers.clone(),
        group_id: config.application_id.clone(),
        topic: config.input_topic.clone(),
        session_timeout_ms: config.session_timeout_ms.clone(),
        ..Default::default()
    };

    let client = Client::new(consumer_config);
    let producer =
        Arc::new(Producer::new(&brokers).context("Failed to create Kafka producer")?);
    let enricher = Arc::new(Enricher::new(lookup));

    // Shared counter for processed messages
    let processed_count = Arc::new(AtomicU64::new(0));

    let output_topic = config.output_topic.clone();
    let processor = {
        let counter = Arc::clone(&processed_count);
        let enricher = Arc::clone(&enricher);
        let producer = Arc::clone(&producer);
        move |messages: Vec<Message>| {
            let counter = Arc::clone(&counter);
            let enricher = Arc::clone(&enricher);
            let producer = Arc::clone(&producer);
            let output_topic = output_topic.clone();
            async move {
                for message in messages {
                    debug!(
                        "Received record: topic={} partition={} offset={}",
                        message.topic, message.partition, message.offset
                    );

                    match enricher.enrich(&message.value) {
                        Ok(Enriched::Full(value)) => {
                            producer
                                .publish(&output_topic, message.key.as_deref(), &value)
                                .await?;
                        }
                        Ok(Enriched::Degraded { value, reason }) => {
                            warn!(
                                "Could not resolve source country (partition={} offset={}): {reason}",
                                message.partition, message.offset
                            );
                            producer
                                .publish(&output_topic, message.key.as_deref(), &value)
                                .await?;
                        }
                        Err(e) => {
                            // Skip: republishing a value we could not parse
                            // would silently forward garbage downstream.
                            warn!(
                                "Dropping record (partition={} offset={}): {e}",
                                message.partition, message.offset
                            );
                            continue;
                        }
                    }

                    let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if count % 100 == 0 {
                        info!("Processed {count} records total");
                    }
                }

                Ok(())
            }
        }
    };

    let num_consumers = config.num_consumers;
    info!("Spawning {num_consumers} consumers in the same consumer group...");

    let handles = client.spawn_batch_consumer_group(num_consumers, config.batch_size, processor)?;

    let deadline = config
        .timeout
        .map(|secs| chrono::Utc::now() + chrono::Duration::seconds(secs));
    if let Some(deadline) = deadline {
        info!("Will consume until deadline: {deadline}");
    }
    let max_messages = config.max_messages;
    if let Some(max) = max_messages {
        info!("Will exit after processing {max} messages");
    }

    // Unbounded service mode: run until a consumer task fails.
    if deadline.is_none() && max_messages.is_none() {
        for handle in handles {
            handle.await??;
        }
        return Ok(());
    }

    // Bounded run: poll for completion conditions, then abort the tasks.
    loop {
        sleep(Duration::from_millis(100)).await;

        let current_count = processed_count.load(Ordering::SeqCst);

        if let Some(max) = max_messages {
            if current_count >= max {
                info!("Reached max_messages limit ({max}) after {current_count} messages");
                break;
            }
        }

        if let Some(deadline) = deadline {
            if chrono::Utc::now() >= deadline {
                info!("Deadline reached, aborting consumer tasks");
                break;
            }
        }
    }

    for (i, handle) in handles.into_iter().enumerate() {
        handle.abort();
        debug!("Aborted consumer task {i}");
    }

    // Brief delay to allow cleanup
    sleep(Duration::from_millis(100)).await;

    let final_count = processed_count.load(Ordering::SeqCst);
    info!(
        "Enrichment completed: processed {} records total from topic {}",
        final_count, config.input_topic
    );

    Ok(())
}
