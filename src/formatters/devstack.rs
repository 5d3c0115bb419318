use super::{depth_marker, RecordFormatter};
use crate::pipeline::config::Severity;
use crate::pipeline::context::Record;
use crate::stylers::Styler;

/// Renders `stack.sh` trace output: `date time +++ body`.
pub struct DevstackFormatter {
    styler: Box<dyn Styler>,
}

impl DevstackFormatter {
    pub fn new(styler: Box<dyn Styler>) -> Self {
        DevstackFormatter { styler }
    }
}

impl RecordFormatter for DevstackFormatter {
    fn format_record(&self, record: &Record) -> String {
        let Some(timestamp) = record.timestamp() else {
            return self.styler.wrap(record.body(), Severity::None);
        };

        let mut line = self.styler.date(&timestamp);
        line.push(' ');
        line.push_str(&depth_marker(record.depth().unwrap_or(0)));
        line.push_str(record.body());

        self.styler.wrap(&line, self.severity(record))
    }

    /// INFO for top-level commands, DEBUG for anything nested
    fn severity(&self, record: &Record) -> Severity {
        if record.timestamp().is_none() {
            return Severity::None;
        }
        match record.depth().unwrap_or(0) {
            0 => Severity::Info,
            _ => Severity::Debug,
        }
    }
}
