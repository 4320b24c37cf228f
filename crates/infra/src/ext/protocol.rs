//! EXT wire envelope parsing
//!
//! Every EXT response carries a `messages` array and a `response` object.
//! The first message's code decides success: `"0"` means OK, anything else
//! is classified into a [`BridgeError`] before the response body is used.

use serde::Deserialize;
use serde_json::Value;
use steward_core::ports::{ExtRecord, FieldData};
use steward_domain::{classify_ext_error, BridgeError, Result};

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub messages: Vec<EnvelopeMessage>,
    #[serde(default)]
    pub response: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeMessage {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Convert an envelope into its response body, classifying any non-zero
/// status code.
pub(crate) fn inspect_envelope(envelope: Envelope) -> Result<Value> {
    match envelope.messages.first() {
        Some(message) if message.code == "0" => Ok(envelope.response),
        Some(message) => Err(classify_ext_error(&message.code, &message.message)),
        None => Err(BridgeError::Unknown {
            code: String::new(),
            message: "response envelope carried no status message".to_string(),
        }),
    }
}

/// Extract the record list from a `data` response body.
pub(crate) fn parse_records(response: &Value) -> Vec<ExtRecord> {
    response
        .get("data")
        .and_then(Value::as_array)
        .map(|records| records.iter().filter_map(parse_record).collect())
        .unwrap_or_default()
}

fn parse_record(entry: &Value) -> Option<ExtRecord> {
    let record_id = entry.get("recordId").and_then(Value::as_str)?.to_string();
    let mod_id = entry.get("modId").and_then(Value::as_str).map(str::to_string);
    let fields = match entry.get("fieldData") {
        Some(Value::Object(map)) => map.clone(),
        _ => FieldData::new(),
    };
    Some(ExtRecord { record_id, mod_id, fields })
}
