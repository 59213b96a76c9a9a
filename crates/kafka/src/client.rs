use crate::consumer::{Consumer, ConsumerConfig, Message};
use crate::error::Result;
use std::future::Future;
use tokio::task::JoinHandle;

/// Kafka client for managing multiple consumers
pub struct Client {
    config: ConsumerConfig,
}

impl Client {
    /// Create a new Kafka client
    pub fn new(config: ConsumerConfig) -> Self {
        Self { config }
    }

    /// Create a single consumer
    pub fn create_consumer(&self) -> Result<Consumer> {
        Consumer::new(self.config.clone())
    }

    /// Spawn a batch consumer task that processes messages in batches
    pub fn spawn_batch_consumer_task<F, Fut>(
        &self,
        batch_size: usize,
        processor: F,
    ) -> anyhow::Result<JoinHandle<anyhow::Result<()>>>
    where
        F: Fn(Vec<Message>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let consumer = self.create_consumer()?;

        let handle = tokio::spawn(async move {
            loop {
                // Receive a batch of messages
                let messages = consumer.receive_batch(batch_size).await?;

                if messages.is_empty() {
                    continue;
                }

                // Process the batch
                if let Err(e) = processor(messages.clone()).await {
                    tracing::error!("Error processing batch: {}", e);
                    // Don't commit on error - messages will be reprocessed
                    continue;
                }

                // Commit all messages in the batch after successful processing
                consumer.commit_batch(&messages).await?;
            }
        });

        Ok(handle)
    }

    /// Spawn multiple batch consumer tasks in the same consumer group
    ///
    /// When spawning multiple consumers:
    /// - All consumers join the same consumer group (same `group_id`)
    /// - Kafka assigns different partitions of the specified topic to each consumer
    /// - Each partition is processed by exactly one consumer
    pub fn spawn_batch_consumer_group<F, Fut>(
        &self,
        num_consumers: usize,
        batch_size: usize,
        processor: F,
    ) -> anyhow::Result<Vec<JoinHandle<anyhow::Result<()>>>>
    where
        F: Fn(Vec<Message>) -> Fut + Send + Clone + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut handles = Vec::new();

        for _ in 0..num_consumers {
            let handle = self.spawn_batch_consumer_task(batch_size, processor.clone())?;
            handles.push(handle);
        }

        Ok(handles)
    }

    /// Get the config
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }
}
