use super::{named_severity, RecordFormatter};
use crate::pipeline::config::Severity;
use crate::pipeline::context::Record;
use crate::stylers::Styler;

/// Renders keystone lines, either in their native
/// `(source): date time LEVEL subject` order or, inverted, with the
/// timestamp first.
pub struct KeystoneFormatter {
    styler: Box<dyn Styler>,
    invert_order: bool,
}

impl KeystoneFormatter {
    pub fn new(styler: Box<dyn Styler>, invert_order: bool) -> Self {
        KeystoneFormatter {
            styler,
            invert_order,
        }
    }
}

impl RecordFormatter for KeystoneFormatter {
    fn format_record(&self, record: &Record) -> String {
        let Some(level) = record.level_name() else {
            return self.styler.wrap(record.body(), Severity::None);
        };

        let styler = self.styler.as_ref();
        let src = styler.source(record.source().unwrap_or_default());
        let dt = styler.date(&record.timestamp().unwrap_or_default());
        let lvl = styler.level(level);
        let subj = styler.subject(record.subject().unwrap_or_default());

        let mut line = if self.invert_order {
            format!("{dt}: ({src}) {lvl} {subj} ")
        } else {
            format!("({src}): {dt} {lvl} {subj} ")
        };

        if let Some(kind) = record.message_type() {
            line.push_str(&styler.msg_type(kind));
            line.push(' ');
        }
        line.push_str(record.body());

        styler.wrap(&line, self.severity(record))
    }

    fn severity(&self, record: &Record) -> Severity {
        named_severity(record)
    }
}
