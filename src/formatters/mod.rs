use crate::pipeline::config::Severity;
use crate::pipeline::context::Record;

pub mod console;
pub mod devstack;
pub mod keystone;
pub mod oslo;

pub use console::ConsoleFormatter;
pub use devstack::DevstackFormatter;
pub use keystone::KeystoneFormatter;
pub use oslo::OsloFormatter;

/// Trait for rendering parsed records back into styled lines
pub trait RecordFormatter: Send + Sync {
    fn format_record(&self, record: &Record) -> String;

    /// Severity the rendered line is displayed (and counted) at
    fn severity(&self, record: &Record) -> Severity;
}

/// Severity named by the record's `level`, NONE when missing or unknown
fn named_severity(record: &Record) -> Severity {
    record
        .level_name()
        .and_then(|name| name.parse().ok())
        .unwrap_or(Severity::None)
}

/// `+` repeated `depth` times, plus a separating space when non-empty
fn depth_marker(depth: u64) -> String {
    if depth == 0 {
        return String::new();
    }
    let mut marker = "+".repeat(depth as usize);
    marker.push(' ');
    marker
}
