use crate::error::ProcessingError;
use crate::pipeline::config::Severity;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// Structured fields parsed from one log line.
///
/// Stages contribute fields incrementally; the nested `message` object
/// holds `operation`, `num`, `type` and `body`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Map::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Set a top-level field, returning self for chaining in extractors
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Set a field of the nested `message` object
    pub fn with_message(mut self, key: &str, value: impl Into<Value>) -> Self {
        let message = self
            .fields
            .entry("message")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(obj) = message {
            obj.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    fn message_field(&self, key: &str) -> Option<&str> {
        self.fields
            .get("message")
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
    }

    pub fn date(&self) -> Option<&str> {
        self.str_field("date")
    }

    pub fn time(&self) -> Option<&str> {
        self.str_field("time")
    }

    /// `date` and `time` joined by a space, when both are present.
    pub fn timestamp(&self) -> Option<String> {
        match (self.date(), self.time()) {
            (Some(date), Some(time)) => Some(format!("{} {}", date, time)),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// Named level as written in the line (oslo and keystone styles)
    pub fn level_name(&self) -> Option<&str> {
        self.str_field("level")
    }

    /// Nesting depth stored in `level` by the devstack extractor
    pub fn depth(&self) -> Option<u64> {
        self.fields.get("level").and_then(Value::as_u64)
    }

    pub fn source(&self) -> Option<&str> {
        self.str_field("source")
    }

    pub fn req_id(&self) -> Option<&str> {
        self.str_field("req_id")
    }

    pub fn subject(&self) -> Option<&str> {
        self.str_field("subject")
    }

    pub fn is_devstack(&self) -> bool {
        self.fields
            .get("is_devstack")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn devstack_level(&self) -> u64 {
        self.fields
            .get("devstack_level")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    pub fn operation(&self) -> Option<&str> {
        self.message_field("operation")
    }

    pub fn num(&self) -> Option<&str> {
        self.message_field("num")
    }

    pub fn message_type(&self) -> Option<&str> {
        self.message_field("type")
    }

    pub fn body(&self) -> &str {
        self.message_field("body").unwrap_or("")
    }

    /// Merge `other` into this record.
    ///
    /// Nested objects merge key by key. Equal values merge idempotently;
    /// differing values fail with the dotted path of the first conflict,
    /// leaving this record partially merged.
    pub fn merge(&mut self, other: Record) -> Result<(), ProcessingError> {
        merge_maps(&mut self.fields, other.fields, &mut Vec::new())
    }
}

fn merge_maps(
    into: &mut Map<String, Value>,
    from: Map<String, Value>,
    path: &mut Vec<String>,
) -> Result<(), ProcessingError> {
    for (key, value) in from {
        match into.get_mut(&key) {
            None => {
                into.insert(key, value);
            }
            Some(existing) => {
                path.push(key);
                match (existing, value) {
                    (Value::Object(a), Value::Object(b)) => merge_maps(a, b, path)?,
                    (a, b) if *a == b => {}
                    _ => {
                        return Err(ProcessingError::FieldConflict {
                            path: path.join("."),
                        })
                    }
                }
                path.pop();
            }
        }
    }
    Ok(())
}

/// Runtime statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub lines_processed: usize,
    pub lines_output: usize,
    pub lines_skipped: usize,
    pub processing_time: Duration,
    /// Output lines per rendered severity
    pub severity_counts: BTreeMap<Severity, usize>,
}

impl ProcessingStats {
    pub fn record_output(&mut self, severity: Severity) {
        self.lines_output += 1;
        *self.severity_counts.entry(severity).or_insert(0) += 1;
    }

    pub fn count_for(&self, severity: Severity) -> usize {
        self.severity_counts.get(&severity).copied().unwrap_or(0)
    }
}
