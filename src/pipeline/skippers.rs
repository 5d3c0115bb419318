// src/pipeline/skippers.rs - stages that only decide whether to drop a line
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

use crate::error::CompilationError;
use crate::pipeline::config::Severity;
use crate::pipeline::context::Record;
use crate::pipeline::stream::Stage;

/// Compile user patterns so they must match the whole field.
fn compile_anchored(patterns: &[String]) -> Result<Vec<Regex>, CompilationError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
                CompilationError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                }
            })
        })
        .collect()
}

/// Drops lines whose severity is below a minimum.
///
/// A line without a `level` counts as NONE. Devstack depths are numbers,
/// not severity names, and are never dropped.
pub struct LevelSkipper {
    excluded: HashSet<Severity>,
}

impl LevelSkipper {
    pub fn new(minimum: Severity) -> Self {
        LevelSkipper {
            excluded: Severity::below(minimum).collect(),
        }
    }
}

impl Stage for LevelSkipper {
    fn should_skip(&self, _full_line: &str, record: &Record, _rest: &str) -> bool {
        let severity = match record.get("level") {
            None => Some(Severity::None),
            Some(Value::String(name)) => name.parse::<Severity>().ok(),
            Some(_) => None,
        };
        severity.is_some_and(|sev| self.excluded.contains(&sev))
    }

    fn name(&self) -> &str {
        "level_skipper"
    }
}

/// Drops lines whose `source` fully matches one of the patterns
pub struct SourceSkipper {
    sources: Vec<Regex>,
}

impl SourceSkipper {
    pub fn new(patterns: &[String]) -> Result<Self, CompilationError> {
        Ok(SourceSkipper {
            sources: compile_anchored(patterns)?,
        })
    }
}

impl Stage for SourceSkipper {
    fn should_skip(&self, _full_line: &str, record: &Record, _rest: &str) -> bool {
        record
            .source()
            .is_some_and(|source| self.sources.iter().any(|re| re.is_match(source)))
    }

    fn name(&self) -> &str {
        "source_skipper"
    }
}

/// Drops lines whose `message.type` fully matches one of the patterns
pub struct MessageTypeSkipper {
    types: Vec<Regex>,
}

impl MessageTypeSkipper {
    pub fn new(patterns: &[String]) -> Result<Self, CompilationError> {
        Ok(MessageTypeSkipper {
            types: compile_anchored(patterns)?,
        })
    }
}

impl Stage for MessageTypeSkipper {
    fn should_skip(&self, _full_line: &str, record: &Record, _rest: &str) -> bool {
        record
            .message_type()
            .is_some_and(|kind| self.types.iter().any(|re| re.is_match(kind)))
    }

    fn name(&self) -> &str {
        "message_type_skipper"
    }
}

static PRE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*</?pre>\s*$").expect("static pre tag regex"));

/// Drops lines that are nothing but a `<pre>` or `</pre>` tag.
pub struct PreTagSkipper;

impl Stage for PreTagSkipper {
    fn should_skip(&self, full_line: &str, _record: &Record, _rest: &str) -> bool {
        PRE_TAG.is_match(full_line)
    }

    fn name(&self) -> &str {
        "pre_tag_skipper"
    }
}
