use super::{depth_marker, RecordFormatter};
use crate::pipeline::config::Severity;
use crate::pipeline::context::Record;
use crate::stylers::Styler;

/// Renders CI console lines, marking the devstack output embedded in them.
pub struct ConsoleFormatter {
    styler: Box<dyn Styler>,
}

impl ConsoleFormatter {
    pub fn new(styler: Box<dyn Styler>) -> Self {
        ConsoleFormatter { styler }
    }
}

impl RecordFormatter for ConsoleFormatter {
    fn format_record(&self, record: &Record) -> String {
        let Some(timestamp) = record.timestamp() else {
            return self.styler.wrap(record.body(), Severity::None);
        };

        let mut line = self.styler.date(&timestamp);
        line.push_str(" | ");
        if record.is_devstack() {
            line.push_str("(devstack) ");
            line.push_str(&depth_marker(record.devstack_level()));
        }
        line.push_str(record.body());

        self.styler.wrap(&line, self.severity(record))
    }

    fn severity(&self, record: &Record) -> Severity {
        if record.timestamp().is_none() {
            Severity::None
        } else if !record.is_devstack() {
            Severity::Audit
        } else if record.devstack_level() == 0 {
            Severity::Info
        } else {
            Severity::Debug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylers::PlainStyler;

    fn console(body: &str) -> Record {
        Record::new()
            .with("date", "2013-09-27")
            .with("time", "18:15:01.123")
            .with_message("body", body)
    }

    #[test]
    fn test_plain_console_line() {
        let formatter = ConsoleFormatter::new(Box::new(PlainStyler));
        let record = console("Started by user");
        assert_eq!(
            formatter.format_record(&record),
            "2013-09-27 18:15:01.123 | Started by user"
        );
        assert_eq!(formatter.severity(&record), Severity::Audit);
    }

    #[test]
    fn test_embedded_devstack() {
        let formatter = ConsoleFormatter::new(Box::new(PlainStyler));
        let nested = console("ln -sf a b")
            .with("is_devstack", true)
            .with("devstack_level", 3);
        assert_eq!(
            formatter.format_record(&nested),
            "2013-09-27 18:15:01.123 | (devstack) +++ ln -sf a b"
        );
        assert_eq!(formatter.severity(&nested), Severity::Debug);

        let top = console("stack.sh")
            .with("is_devstack", true)
            .with("devstack_level", 0);
        assert_eq!(
            formatter.format_record(&top),
            "2013-09-27 18:15:01.123 | (devstack) stack.sh"
        );
        assert_eq!(formatter.severity(&top), Severity::Info);
    }
}
