//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use newdle_core::{slot_time, Newdle};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// One line of `watch --format json` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchOutput {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answered: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_dt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(serialize_with = "serialize_datetime")]
    pub refreshed_at: DateTime<Utc>,
}

impl WatchOutput {
    /// Summarizes a loaded newdle.
    pub fn loaded(newdle: &Newdle, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            code: newdle.code.clone(),
            title: Some(newdle.title.clone()),
            participants: Some(newdle.participants.len()),
            answered: Some(newdle.answered_count()),
            final_dt: newdle.final_dt.as_ref().map(slot_time::format),
            error: None,
            refreshed_at,
        }
    }

    /// Reports a failed refresh.
    pub fn failed(code: &str, error: &str, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            code: code.to_string(),
            title: None,
            participants: None,
            answered: None,
            final_dt: None,
            error: Some(error.to_string()),
            refreshed_at,
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }
}
