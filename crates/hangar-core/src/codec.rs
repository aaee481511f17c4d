//! History codec: [`History`] <-> the store's string format (a JSON array)
//!
//! Decoding is tolerant. Corrupt local state must never keep the application from
//! starting, so every failure degrades to an empty history plus a warning.

use crate::error::PersistenceWarning;
use crate::model::{GeneratedModel, History};

/// Result of decoding a stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub history: History,
    pub warning: Option<PersistenceWarning>,
}

impl Decoded {
    fn empty() -> Self {
        Self::default()
    }

    fn corrupt(reason: impl Into<String>) -> Self {
        Self {
            history: History::new(),
            warning: Some(PersistenceWarning::Corrupt(reason.into())),
        }
    }
}

/// Decode a stored value. Absent or blank input is an empty history.
pub fn decode(raw: Option<&str>) -> Decoded {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Decoded::empty(),
    };

    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return Decoded::corrupt(e.to_string()),
    };

    if !value.is_array() {
        return Decoded::corrupt("expected an array of model records");
    }

    match serde_json::from_value::<Vec<GeneratedModel>>(value) {
        Ok(records) => Decoded {
            history: History::from_records(records),
            warning: None,
        },
        Err(e) => Decoded::corrupt(e.to_string()),
    }
}

/// Encode a history for storage
pub fn encode(history: &History) -> String {
    match serde_json::to_string(history) {
        Ok(json) => json,
        Err(e) => {
            // Only reachable if a metadata value refuses to serialize.
            tracing::error!("Failed to encode history: {}", e);
            "[]".to_string()
        }
    }
}
