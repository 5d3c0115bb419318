use once_cell::sync::Lazy;
use regex::Regex;

use super::{StyleField, Styler};
use crate::pipeline::config::Severity;

static ANCHOR_UNSAFE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_-]").expect("static anchor regex"));

/// Renders fields as classed `<span>`s and lines as severity `<div>`s.
///
/// Dates become self-referencing anchors, so every line stamped with the
/// same date and time links to the same id.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlStyler;

impl HtmlStyler {
    /// Anchor id for a timestamp; only `[0-9A-Za-z_-]` survive.
    pub fn anchor_id(text: &str) -> String {
        ANCHOR_UNSAFE.replace_all(text, "_").into_owned()
    }
}

impl Styler for HtmlStyler {
    fn style(&self, field: StyleField, text: &str) -> String {
        match field {
            StyleField::Date => {
                let id = Self::anchor_id(text);
                format!(r##"<a href="#{id}" id="{id}" class="date">{text}</a>"##)
            }
            other => format!(r#"<span class="{}">{}</span>"#, other.name(), text),
        }
    }

    fn wrap(&self, text: &str, severity: Severity) -> String {
        format!(r#"<div class="{}">{}</div>"#, severity.as_str(), text)
    }
}
