//! Enrichment stream E2E test
//!
//! Validates the whole pipeline against a real broker and a real GeoLite2
//! database: publish raw records to the input topic, run the enrichment
//! stream, and assert the enriched values on the output topic.
//!
//! Requires a reachable Kafka broker (`KAFKA_BROKER`, default
//! `localhost:9092`) and a GeoLite2 Country database
//! (`GEOLITE2_COUNTRY_PATH`, default `GeoLite2-Country.mmdb`), so the test
//! is ignored by default.

use geo_enrich::{run_enrichment, Config};
use geo_enrich_geoip::CountryDb;
use geo_enrich_kafka::{Consumer, ConsumerConfig, Producer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn kafka_broker() -> String {
    std::env::var("KAFKA_BROKER").unwrap_or_else(|_| "localhost:9092".to_string())
}

fn dataset_path() -> std::path::PathBuf {
    std::env::var("GEOLITE2_COUNTRY_PATH")
        .unwrap_or_else(|_| "GeoLite2-Country.mmdb".to_string())
        .into()
}

fn generate_test_id() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

#[tokio::test]
#[ignore = "requires a running Kafka broker and a GeoLite2 Country database"]
async fn test_enrichment_e2e() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter("geo_enrich=debug,geo_enrich_kafka=debug")
        .try_init()
        .ok();

    let broker = kafka_broker();
    let test_id = generate_test_id();

    // Random topic names for this test run to avoid conflicts
    let input_topic = format!("test-message-{test_id}");
    let output_topic = format!("test-message-with-country-{test_id}");

    tracing::info!("Using topics: input={input_topic}, output={output_topic}");

    // Step 1: Create topics and publish raw records
    let producer = Producer::new(&broker)?;
    producer.create_topic_if_not_exists(&input_topic, 3).await?;
    producer.create_topic_if_not_exists(&output_topic, 3).await?;

    // Give Kafka a moment to propagate topic metadata
    sleep(Duration::from_millis(500)).await;

    producer
        .publish(
            &input_topic,
            None,
            r#"{"ts": 1620000000, "source": "8.8.8.8", "payload": "hello"}"#,
        )
        .await?;
    producer
        .publish(
            &input_topic,
            None,
            r#"{"ts": 1620000001, "source": "not an ip", "payload": "x"}"#,
        )
        .await?;

    tracing::info!("Test records published");

    // Step 2: Run the enrichment stream, bounded to the published records
    let config = Config {
        application_id: format!("test-geo-enrich-{test_id}"),
        brokers: vec![broker.clone()],
        dataset_path: dataset_path(),
        input_topic: input_topic.clone(),
        output_topic: output_topic.clone(),
        num_consumers: 1,
        batch_size: 100,
        session_timeout_ms: "6000".to_string(),
        max_messages: Some(2),
        timeout: Some(20),
    };

    let db = CountryDb::open(&config.dataset_path)?;
    run_enrichment(config, Arc::new(db)).await?;

    // Step 3: Consume the output topic from the beginning and verify
    let consumer = Consumer::new(ConsumerConfig {
        brokers: broker,
        group_id: format!("test-geo-enrich-verify-{test_id}"),
        topic: output_topic,
        ..Default::default()
    })?;

    let mut values = Vec::new();
    while values.len() < 2 {
        let batch =
            tokio::time::timeout(Duration::from_secs(10), consumer.receive_batch(2)).await??;
        values.extend(batch.into_iter().map(|m| m.value));
    }
    values.sort();

    assert_eq!(
        values,
        vec![
            r#"{"ts":1620000000,"source":"8.8.8.8","country":"United States","payload":"hello"}"#
                .to_string(),
            r#"{"ts":1620000001,"source":"not an ip","country":"","payload":"x"}"#.to_string(),
        ]
    );

    Ok(())
}
