use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;

/// Log severities in ascending order. The discriminant is the rank used
/// for threshold filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum Severity {
    #[value(name = "NONE")]
    None = 0,
    #[value(name = "DEBUG")]
    Debug = 1,
    #[value(name = "INFO")]
    Info = 2,
    #[value(name = "AUDIT")]
    Audit = 3,
    #[value(name = "TRACE")]
    Trace = 4,
    #[value(name = "WARNING")]
    Warning = 5,
    #[value(name = "ERROR")]
    Error = 6,
}

impl Severity {
    pub const ALL: [Severity; 7] = [
        Severity::None,
        Severity::Debug,
        Severity::Info,
        Severity::Audit,
        Severity::Trace,
        Severity::Warning,
        Severity::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Audit => "AUDIT",
            Severity::Trace => "TRACE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }

    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Every severity strictly below `minimum`.
    pub fn below(minimum: Severity) -> impl Iterator<Item = Severity> {
        Self::ALL.into_iter().filter(move |sev| *sev < minimum)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown severity: {}", s))
    }
}

/// Line-format families understood by the extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogStyle {
    #[default]
    #[value(name = "oslo")]
    Oslo,
    #[value(name = "devstack")]
    Devstack,
    #[value(name = "console")]
    Console,
    #[value(name = "keystone")]
    Keystone,
}

/// File name fragments that select a style, checked in order. Anything
/// unmatched is oslo.
const STYLE_HINTS: &[(&str, LogStyle)] = &[
    ("console", LogStyle::Console),
    ("stack", LogStyle::Devstack),
    ("key", LogStyle::Keystone),
];

static SUPPORTS_SEVERITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(screen-(n-|c-|q-|g-|h-|ceil|key)|tempest\.txt)")
        .expect("static severity regex")
});

static HTML_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.html(\.gz)?$").expect("static html regex"));

/// Source pattern of the raw messaging dumps hidden by default.
pub const RAW_MESSAGING_SOURCE: &str = r"\w+\.messaging\.io\.raw";

impl LogStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStyle::Oslo => "oslo",
            LogStyle::Devstack => "devstack",
            LogStyle::Console => "console",
            LogStyle::Keystone => "keystone",
        }
    }

    /// Guess the style from a file name, honouring an explicit override.
    pub fn detect(file_name: &str, override_style: Option<LogStyle>) -> LogStyle {
        if let Some(style) = override_style {
            return style;
        }

        let base = base_name(file_name);
        STYLE_HINTS
            .iter()
            .find(|(hint, _)| base.contains(hint))
            .map(|(_, style)| *style)
            .unwrap_or_default()
    }

    /// Styles whose lines carry a `source` field.
    pub fn has_source(&self) -> bool {
        matches!(self, LogStyle::Oslo | LogStyle::Keystone)
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "oslo" => Ok(LogStyle::Oslo),
            "devstack" => Ok(LogStyle::Devstack),
            "console" => Ok(LogStyle::Console),
            "keystone" => Ok(LogStyle::Keystone),
            _ => Err(format!("Unknown log style: {}", s)),
        }
    }
}

fn base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file_name)
}

/// Decide whether severity filtering applies to a file.
pub fn file_supports_severity(
    file_name: &str,
    filter_severity: Option<bool>,
    min_severity: Option<Severity>,
) -> bool {
    match (filter_severity, min_severity) {
        (Some(explicit), _) => explicit,
        (None, Some(_)) => true,
        (None, None) => SUPPORTS_SEVERITY.is_match(file_name),
    }
}

/// Whether the file already contains HTML markup.
pub fn is_html_file(file_name: &str) -> bool {
    HTML_FILE.is_match(file_name)
}

/// Resolved view settings, already parsed from flags or a query string
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub log_style: Option<LogStyle>,
    pub min_severity: Option<Severity>,
    pub filter_severity: Option<bool>,
    pub skip_raw: bool,
    pub skip_sources: Vec<String>,
    pub skip_message_types: Vec<String>,
    pub highlight_content: bool,
    pub invert_order: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            log_style: None,
            min_severity: None,
            filter_severity: None,
            skip_raw: true,
            skip_sources: Vec::new(),
            skip_message_types: Vec::new(),
            highlight_content: true,
            invert_order: false,
        }
    }
}

impl ViewConfig {
    pub fn minimum(&self) -> Severity {
        self.min_severity.unwrap_or(Severity::None)
    }

    /// Source patterns to drop, including the raw messaging source when enabled.
    pub fn source_patterns(&self) -> Vec<String> {
        let mut patterns = Vec::with_capacity(self.skip_sources.len() + 1);
        if self.skip_raw {
            patterns.push(RAW_MESSAGING_SOURCE.to_string());
        }
        patterns.extend(self.skip_sources.iter().cloned());
        patterns
    }
}
