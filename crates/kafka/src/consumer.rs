use crate::error::{Error, Result};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer as RdkafkaConsumer, StreamConsumer as RdkafkaStreamConsumer};
use rdkafka::message::{BorrowedMessage as RdkafkaBorrowedMessage, Message as RdkafkaMessage};
use rdkafka::{Offset, TopicPartitionList};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for Kafka consumer
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Consumer group ID
    ///
    /// All consumers spawned for the same topic share this group, so Kafka
    /// spreads the topic's partitions across them.
    pub group_id: String,
    /// Topic to consume from
    ///
    /// All the messages' values must be UTF-8 encoded strings. Values that
    /// are not valid UTF-8 surface as consumer errors rather than records.
    pub topic: String,
    /// Auto offset reset strategy ("earliest" or "latest")
    ///
    /// "earliest" means the consumer will start from the beginning of the topic
    /// if no committed offsets are found for the consumer group.
    /// "latest" means the consumer will start from the end of the topic.
    ///
    /// Generally, "earliest" is preferred for enrichment so records published
    /// before the processor joined are not silently skipped.
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    pub session_timeout_ms: String,
    /// Enable auto commit (should be false for manual offset management)
    ///
    /// This is false by default: offsets are committed manually only after a
    /// batch has been fully processed and republished, giving at-least-once
    /// delivery to the output topic.
    pub enable_auto_commit: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "geo-enrich".to_string(),
            topic: "".to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout_ms: "6000".to_string(),
            enable_auto_commit: false,
        }
    }
}

/// A Kafka message with a UTF-8 string value
#[derive(Debug, Clone)]
pub struct Message {
    /// Message value decoded as UTF-8
    pub value: String,
    /// Kafka topic
    pub topic: String,
    /// Kafka partition
    pub partition: i32,
    /// Kafka offset
    pub offset: i64,
    /// Message key (if any)
    pub key: Option<Vec<u8>>,
    /// Message timestamp (milliseconds since epoch)
    pub timestamp: Option<i64>,
}

/// Kafka consumer with manual offset management
pub struct Consumer {
    consumer: Arc<RdkafkaStreamConsumer>,
}

impl Consumer {
    /// Create a new Kafka consumer and subscribe to the configured topic
    pub fn new(config: ConsumerConfig) -> Result<Self> {
        if config.topic.is_empty() {
            return Err(Error::InvalidConfig("Consumer topic is empty".to_string()));
        }

        let consumer: RdkafkaStreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", config.enable_auto_commit.to_string())
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("session.timeout.ms", &config.session_timeout_ms)
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| Error::Consumer(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[&config.topic])
            .map_err(|e| Error::Consumer(format!("Failed to subscribe to topic: {e}")))?;

        Ok(Self {
            consumer: Arc::new(consumer),
        })
    }

    /// Receive multiple messages (blocks until at least one message is available)
    pub async fn receive_batch(&self, max_count: usize) -> Result<Vec<Message>> {
        let mut messages = Vec::new();

        // Block for the first message
        let msg = self
            .consumer
            .recv()
            .await
            .map_err(|e| Error::Consumer(format!("Error receiving message: {e}")))?;
        messages.push(decode_message(&msg)?);

        // Try to fetch more with a short timeout
        while messages.len() < max_count {
            match tokio::time::timeout(Duration::from_millis(10), self.consumer.recv()).await {
                Ok(Ok(msg)) => messages.push(decode_message(&msg)?),
                _ => break,
            }
        }

        Ok(messages)
    }

    /// Commit multiple messages' offsets
    pub async fn commit_batch(&self, messages: &[Message]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut tpl = TopicPartitionList::new();
        for message in messages {
            tpl.add_partition_offset(
                &message.topic,
                message.partition,
                Offset::Offset(message.offset + 1),
            )
            .map_err(|e| Error::Consumer(format!("Failed to add partition offset: {e}")))?;
        }

        self.consumer
            .commit(&tpl, rdkafka::consumer::CommitMode::Sync)
            .map_err(|e| Error::Consumer(format!("Failed to commit offset: {e}")))?;

        Ok(())
    }

    /// Get the underlying consumer (for advanced use cases)
    pub fn inner(&self) -> &RdkafkaStreamConsumer {
        &self.consumer
    }
}

fn decode_message(msg: &RdkafkaBorrowedMessage) -> Result<Message> {
    let payload = msg
        .payload()
        .ok_or_else(|| Error::Consumer("Message has no payload".to_string()))?;

    let value = std::str::from_utf8(payload)?.to_string();

    Ok(Message {
        value,
        topic: msg.topic().to_string(),
        partition: msg.partition(),
        offset: msg.offset(),
        key: msg.key().map(|k| k.to_vec()),
        timestamp: msg.timestamp().to_millis(),
    })
}

/// Clone support for spawning multiple consumer tasks
impl Clone for Consumer {
    fn clone(&self) -> Self {
        Self {
            consumer: Arc::clone(&self.consumer),
        }
    }
}

impl std::fmt::Debug for Consumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer").finish_non_exhaustive()
    }
}
