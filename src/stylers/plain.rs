use super::{StyleField, Styler};
use crate::pipeline::config::Severity;

/// Leaves every field and line untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyler;

impl Styler for PlainStyler {
    fn style(&self, _field: StyleField, text: &str) -> String {
        text.to_string()
    }

    fn wrap(&self, text: &str, _severity: Severity) -> String {
        text.to_string()
    }
}
