use std::fmt;
use std::str::FromStr;

use crate::pipeline::config::Severity;

pub mod direct;
pub mod html;
pub mod plain;

pub use direct::{DirectStyler, StyleMap};
pub use html::HtmlStyler;
pub use plain::PlainStyler;

/// Every field a formatter can ask to have styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleField {
    Date,
    Source,
    Level,
    Subject,
    ReqId,
    MsgOp,
    MsgNum,
    MsgContent,
    MsgType,
    Lvl(Severity),
    LvlOther,
}

impl StyleField {
    /// Name used as the HTML class and as the style-map key.
    pub fn name(&self) -> String {
        match self {
            StyleField::Date => "date".to_string(),
            StyleField::Source => "source".to_string(),
            StyleField::Level => "level".to_string(),
            StyleField::Subject => "subject".to_string(),
            StyleField::ReqId => "req_id".to_string(),
            StyleField::MsgOp => "msg_op".to_string(),
            StyleField::MsgNum => "msg_num".to_string(),
            StyleField::MsgContent => "msg_content".to_string(),
            StyleField::MsgType => "msg_type".to_string(),
            StyleField::Lvl(sev) => format!("lvl_{}", sev.as_str()),
            StyleField::LvlOther => "lvl_other".to_string(),
        }
    }
}

impl fmt::Display for StyleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for StyleField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "date" => StyleField::Date,
            "source" => StyleField::Source,
            "level" => StyleField::Level,
            "subject" => StyleField::Subject,
            "req_id" => StyleField::ReqId,
            "msg_op" => StyleField::MsgOp,
            "msg_num" => StyleField::MsgNum,
            "msg_content" => StyleField::MsgContent,
            "msg_type" => StyleField::MsgType,
            "lvl_other" => StyleField::LvlOther,
            other => match other.strip_prefix("lvl_") {
                Some(level) => StyleField::Lvl(
                    level
                        .parse()
                        .map_err(|_| format!("Unknown style field: {}", s))?,
                ),
                None => return Err(format!("Unknown style field: {}", s)),
            },
        };
        Ok(field)
    }
}

/// Output decoration used by the formatters.
///
/// Implementations only provide `style` and `wrap`; the per-field methods
/// are fixed conveniences on top of them.
pub trait Styler: Send + Sync {
    fn style(&self, field: StyleField, text: &str) -> String;

    /// Outermost decoration of a whole rendered line
    fn wrap(&self, text: &str, severity: Severity) -> String;

    fn date(&self, text: &str) -> String {
        self.style(StyleField::Date, text)
    }

    fn source(&self, text: &str) -> String {
        self.style(StyleField::Source, text)
    }

    fn level(&self, text: &str) -> String {
        self.style(StyleField::Level, text)
    }

    fn subject(&self, text: &str) -> String {
        self.style(StyleField::Subject, text)
    }

    fn req_id(&self, text: &str) -> String {
        self.style(StyleField::ReqId, text)
    }

    fn msg_op(&self, text: &str) -> String {
        self.style(StyleField::MsgOp, text)
    }

    fn msg_num(&self, text: &str) -> String {
        self.style(StyleField::MsgNum, text)
    }

    fn msg_content(&self, text: &str) -> String {
        self.style(StyleField::MsgContent, text)
    }

    fn msg_type(&self, text: &str) -> String {
        self.style(StyleField::MsgType, text)
    }

    /// Style a level name with its own severity style; names that are not
    /// a known severity get the neutral `lvl_other` style.
    fn lvl(&self, name: &str) -> String {
        match name.parse::<Severity>() {
            Ok(sev) => self.style(StyleField::Lvl(sev), name),
            Err(_) => self.style(StyleField::LvlOther, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names() {
        assert_eq!(StyleField::ReqId.name(), "req_id");
        assert_eq!(StyleField::Lvl(Severity::Warning).name(), "lvl_WARNING");
        assert_eq!(StyleField::LvlOther.name(), "lvl_other");
    }

    #[test]
    fn test_field_parse() {
        assert_eq!("msg_type".parse::<StyleField>(), Ok(StyleField::MsgType));
        assert_eq!(
            "lvl_DEBUG".parse::<StyleField>(),
            Ok(StyleField::Lvl(Severity::Debug))
        );
        assert_eq!("lvl_other".parse::<StyleField>(), Ok(StyleField::LvlOther));
        assert!("lvl_VERBOSE".parse::<StyleField>().is_err());
        assert!("colour".parse::<StyleField>().is_err());
    }

    struct Tagging;

    impl Styler for Tagging {
        fn style(&self, field: StyleField, text: &str) -> String {
            format!("<{}>{}", field, text)
        }

        fn wrap(&self, text: &str, _severity: Severity) -> String {
            text.to_string()
        }
    }

    #[test]
    fn test_lvl_falls_back_to_other() {
        assert_eq!(Tagging.lvl("ERROR"), "<lvl_ERROR>ERROR");
        assert_eq!(Tagging.lvl("CRITICAL"), "<lvl_other>CRITICAL");
    }
}
