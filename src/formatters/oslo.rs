use super::{named_severity, RecordFormatter};
use crate::pipeline::config::Severity;
use crate::pipeline::context::Record;
use crate::stylers::Styler;

const CONTENT_MARKER: &str = "content=";

/// Renders oslo-style service log lines:
/// `date time [id] LEVEL source [req_id] [OP [num]: ][Type]body`.
pub struct OsloFormatter {
    styler: Box<dyn Styler>,
    highlight_content: bool,
}

impl OsloFormatter {
    pub fn new(styler: Box<dyn Styler>, highlight_content: bool) -> Self {
        OsloFormatter {
            styler,
            highlight_content,
        }
    }

    fn header(&self, record: &Record, level: &str) -> String {
        let styler = self.styler.as_ref();
        let mut header = styler.date(&record.timestamp().unwrap_or_default());
        header.push(' ');

        // an absent pid drops out together with its separator
        if let Some(id) = record.id() {
            header.push_str(id);
            header.push(' ');
        }

        header.push_str(&styler.lvl(level));
        header.push(' ');
        header.push_str(&styler.source(record.source().unwrap_or_default()));
        header.push(' ');

        if let Some(req_id) = record.req_id() {
            header.push('[');
            header.push_str(&styler.req_id(req_id));
            header.push_str("] ");
        }
        header
    }
}

impl RecordFormatter for OsloFormatter {
    fn format_record(&self, record: &Record) -> String {
        let Some(level) = record.level_name() else {
            return self.styler.wrap(record.body(), Severity::None);
        };

        let mut line = self.header(record, level);
        let mut body = record.body().to_string();

        if let Some(operation) = record.operation() {
            line.push_str(&format!(
                "{} [{}]: ",
                self.styler.msg_op(operation),
                self.styler.msg_num(record.num().unwrap_or_default())
            ));

            if self.highlight_content {
                body = body.replace(CONTENT_MARKER, &self.styler.msg_content(CONTENT_MARKER));
            }
        }

        if let Some(kind) = record.message_type() {
            line.push_str(&self.styler.msg_type(kind));
        }

        line.push_str(&body);
        self.styler.wrap(&line, self.severity(record))
    }

    fn severity(&self, record: &Record) -> Severity {
        named_severity(record)
    }
}
