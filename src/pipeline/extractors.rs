// src/pipeline/extractors.rs - stages that pull fields off the front of a line
use once_cell::sync::Lazy;
use regex::Regex;

use crate::pipeline::config::Severity;
use crate::pipeline::context::Record;
use crate::pipeline::stream::Stage;

/// `DEBUG|INFO|...`, every named severity a line can carry
fn level_alternation() -> String {
    Severity::ALL
        .iter()
        .filter(|sev| **sev != Severity::None)
        .map(|sev| sev.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

static OSLO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        concat!(
            r"^(\d{{4}}-\d{{2}}-\d{{2}}) (\d{{2}}:\d{{2}}:\d{{2}}\.\d{{1,3}}) ",
            r"(?:(\d+) )?({}) ",
            r"([a-zA-Z0-9_.]+) ",
            r"(?:\[(-|(?:instance: )?[a-zA-Z0-9\-]+(?: [^\]]*)?)\] )?",
        ),
        level_alternation()
    ))
    .expect("static oslo regex")
});

static DEVSTACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}) (\d{2}:\d{2}:\d{2}) (?:(\++) )?")
        .expect("static devstack regex")
});

static CONSOLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}) (\d{2}:\d{2}:\d{2}\.\d{1,3}) \|")
        .expect("static console regex")
});

static KEYSTONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        concat!(
            r"^\(([a-zA-Z\-_.0-9]+)\): ",
            r"(\d{{4}}-\d{{2}}-\d{{2}}) (\d{{2}}:\d{{2}}:\d{{2}},\d{{3}}) ",
            r"({}) ",
            r"([a-zA-Z0-9_]+) ",
        ),
        level_alternation()
    ))
    .expect("static keystone regex")
});

/// Messaging operations that prefix a hex message id
pub const MESSAGE_OPERATIONS: &[&str] = &["OPEN", "SENT", "RECV", "RCVD", "REST", "READ", "RETR", "RACK"];

static MESSAGE_OP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^({})\[([a-f0-9]+)\]: ",
        MESSAGE_OPERATIONS.join("|")
    ))
    .expect("static message operation regex")
});

static MESSAGE_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\(").expect("static message type regex"));

static KEYSTONE_MESSAGE_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z0-9_]+) ").expect("static keystone type regex"));

/// `date time [pid] LEVEL source [req_id] `
pub struct OsloMetadataExtractor;

impl Stage for OsloMetadataExtractor {
    fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
        let Some(caps) = OSLO.captures(line) else {
            return (Record::new(), line);
        };

        let mut record = Record::new()
            .with("date", &caps[1])
            .with("time", &caps[2])
            .with("level", &caps[4])
            .with("source", &caps[5]);
        if let Some(id) = caps.get(3) {
            record = record.with("id", id.as_str());
        }
        if let Some(req_id) = caps.get(6) {
            record = record.with("req_id", req_id.as_str());
        }

        (record, &line[caps[0].len()..])
    }

    fn name(&self) -> &str {
        "oslo_metadata"
    }
}

/// `date time [+++ ]`; the number of `+` is stored as the integer `level`.
pub struct DevstackMetadataExtractor;

impl Stage for DevstackMetadataExtractor {
    fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
        let Some(caps) = DEVSTACK.captures(line) else {
            return (Record::new(), line);
        };

        let depth = caps.get(3).map_or(0, |m| m.len());
        let record = Record::new()
            .with("date", &caps[1])
            .with("time", &caps[2])
            .with("level", depth);

        (record, &line[caps[0].len()..])
    }

    fn name(&self) -> &str {
        "devstack_metadata"
    }
}

/// `date time |`, optionally followed by an embedded devstack line.
pub struct ConsoleMetadataExtractor;

impl Stage for ConsoleMetadataExtractor {
    fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
        let Some(caps) = CONSOLE.captures(line) else {
            return (Record::new(), line);
        };

        let record = Record::new().with("date", &caps[1]).with("time", &caps[2]);
        let rest = line[caps[0].len()..].trim_start();

        match DEVSTACK.captures(rest) {
            None => (record, rest),
            Some(inner) => {
                let depth = inner.get(3).map_or(0, |m| m.len());
                let record = record
                    .with("is_devstack", true)
                    .with("devstack_level", depth);
                (record, rest[inner[0].len()..].trim_start())
            }
        }
    }

    fn name(&self) -> &str {
        "console_metadata"
    }
}

/// `(source): date time LEVEL subject `
pub struct KeystoneMetadataExtractor;

impl Stage for KeystoneMetadataExtractor {
    fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
        let Some(caps) = KEYSTONE.captures(line) else {
            return (Record::new(), line);
        };

        let record = Record::new()
            .with("source", &caps[1])
            .with("date", &caps[2])
            .with("time", &caps[3])
            .with("level", &caps[4])
            .with("subject", &caps[5]);

        (record, &line[caps[0].len()..])
    }

    fn name(&self) -> &str {
        "keystone_metadata"
    }
}

/// `SENT[abc123]: `
pub struct MessageOperationExtractor;

impl Stage for MessageOperationExtractor {
    fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
        let trimmed = line.trim_end();
        let Some(caps) = MESSAGE_OP.captures(trimmed) else {
            return (Record::new(), line);
        };

        let record = Record::new()
            .with_message("operation", &caps[1])
            .with_message("num", &caps[2]);

        (record, &trimmed[caps[0].len()..])
    }

    fn name(&self) -> &str {
        "message_operation"
    }
}

/// Identifier directly before an opening parenthesis, e.g. `Message(`.
/// The parenthesis stays in the rest.
pub struct MessageTypeExtractor;

impl Stage for MessageTypeExtractor {
    fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
        let Some(caps) = MESSAGE_TYPE.captures(line) else {
            return (Record::new(), line);
        };

        let kind = &caps[1];
        (Record::new().with_message("type", kind), &line[kind.len()..])
    }

    fn name(&self) -> &str {
        "message_type"
    }
}

/// Bare word following the keystone subject
pub struct KeystoneMessageTypeExtractor;

impl Stage for KeystoneMessageTypeExtractor {
    fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
        let Some(caps) = KEYSTONE_MESSAGE_TYPE.captures(line) else {
            return (Record::new(), line);
        };

        (
            Record::new().with_message("type", &caps[1]),
            &line[caps[0].len()..],
        )
    }

    fn name(&self) -> &str {
        "keystone_message_type"
    }
}

/// Terminal stage: the whole remaining text becomes `message.body`.
pub struct BodyExtractor;

impl Stage for BodyExtractor {
    fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
        (Record::new().with_message("body", line.trim_end()), "")
    }

    fn name(&self) -> &str {
        "body"
    }
}
