//! Inbound and outbound record shapes.
//!
//! Records travel as JSON object strings. `ts` and `payload` are opaque to
//! the enrichment step: they are deserialized into raw JSON values and
//! carried through to the outbound record untouched, whatever their type.

use serde::{Deserialize, Serialize};

/// A record consumed from the input topic.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundRecord {
    /// Event timestamp, passed through unchanged
    #[serde(default)]
    pub ts: serde_json::Value,
    /// Textual source address (IPv4/IPv6 literal or hostname)
    pub source: String,
    /// Event content, passed through unchanged
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A record published to the output topic.
///
/// Identical to [`InboundRecord`] plus the resolved `country` field, which
/// is the empty string when resolution failed.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundRecord {
    pub ts: serde_json::Value,
    pub source: String,
    pub country: String,
    pub payload: serde_json::Value,
}

impl InboundRecord {
    /// Parse a raw message value. A missing `source` field is a parse error.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Build the outbound record, consuming the inbound one.
    pub fn with_country(self, country: String) -> OutboundRecord {
        OutboundRecord {
            ts: self.ts,
            source: self.source,
            country,
            payload: self.payload,
        }
    }
}

impl OutboundRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_record() {
        let record =
            InboundRecord::from_json(r#"{"ts": 1620000000, "source": "8.8.8.8", "payload": "hello"}"#)
                .unwrap();
        assert_eq!(record.source, "8.8.8.8");
        assert_eq!(record.ts, serde_json::json!(1620000000));
        assert_eq!(record.payload, serde_json::json!("hello"));
    }

    #[test]
    fn test_parse_rejects_missing_source() {
        let err = InboundRecord::from_json(r#"{"ts": 1, "payload": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("source"));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(InboundRecord::from_json("not valid json").is_err());
    }

    #[test]
    fn test_ts_and_payload_are_opaque() {
        // String timestamps and structured payloads survive the round trip.
        let record = InboundRecord::from_json(
            r#"{"ts": "2021-05-03T00:00:00Z", "source": "1.1.1.1", "payload": {"level": 3}}"#,
        )
        .unwrap();
        let out = record.with_country("Australia".to_string()).to_json().unwrap();
        assert_eq!(
            out,
            r#"{"ts":"2021-05-03T00:00:00Z","source":"1.1.1.1","country":"Australia","payload":{"level":3}}"#
        );
    }

    #[test]
    fn test_outbound_field_order() {
        let record = InboundRecord::from_json(r#"{"ts": 7, "source": "8.8.8.8", "payload": "p"}"#)
            .unwrap();
        let out = record.with_country(String::new()).to_json().unwrap();
        assert_eq!(out, r#"{"ts":7,"source":"8.8.8.8","country":"","payload":"p"}"#);
    }
}
