use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, de::Error as _};
use serde_json::{Map, Value};

pub const DEVICE_ID: &str = "laptop_setup_01";

/// `YYYY-MM-DD HH:MM:SS.ffffff`, local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One line of device output, e.g. `{"v": 3.21, "s": 1}`.
///
/// Both fields are kept as raw JSON values and forwarded untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundRecord {
    pub voltage: Value,
    pub step_detected: Value,
}

impl InboundRecord {
    /// Fails on malformed JSON, non-object values and missing `v`/`s` keys alike.
    ///
    /// Repeated keys are allowed; the last occurrence wins.
    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        let mut fields: Map<String, Value> = serde_json::from_str(line)?;

        let voltage = fields
            .remove("v")
            .ok_or_else(|| serde_json::Error::missing_field("v"))?;
        let step_detected = fields
            .remove("s")
            .ok_or_else(|| serde_json::Error::missing_field("s"))?;

        Ok(Self {
            voltage,
            step_detected,
        })
    }
}

/// The record as published to the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundPayload {
    pub device_id: String,
    pub timestamp: String,
    pub voltage: Value,
    pub step_detected: Value,
}

impl OutboundPayload {
    pub fn from_record(record: InboundRecord, device_id: &str, captured_at: NaiveDateTime) -> Self {
        Self {
            device_id: device_id.to_string(),
            timestamp: captured_at.format(TIMESTAMP_FORMAT).to_string(),
            voltage: record.voltage,
            step_detected: record.step_detected,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
