use std::borrow::Cow;

use crate::error::ProcessingError;
use crate::formatters::RecordFormatter;
use crate::pipeline::config::{is_html_file, Severity};
use crate::pipeline::context::Record;
use crate::stylers::{DirectStyler, HtmlStyler, PlainStyler, StyleMap, Styler};
use crate::tty::should_use_colors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[value(name = "color", help = "ANSI colored text")]
    Color,
    #[value(name = "plain", help = "Formatted text without styling")]
    Plain,
    #[value(name = "html", help = "HTML page with severity and field classes")]
    Html,
    #[value(name = "jsonl", help = "JSON Lines format (one parsed record per line)")]
    Jsonl,
    #[value(name = "raw", help = "Filtered input lines, unformatted")]
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "color" | "colour" => Ok(OutputFormat::Color),
            "plain" | "text" => Ok(OutputFormat::Plain),
            "html" => Ok(OutputFormat::Html),
            "jsonl" => Ok(OutputFormat::Jsonl),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl OutputFormat {
    /// Color on a terminal, plain text otherwise
    pub fn auto() -> Self {
        if should_use_colors() {
            OutputFormat::Color
        } else {
            OutputFormat::Plain
        }
    }
}

/// Escape the characters that would otherwise turn log text into markup
pub fn escape_html(line: &str) -> Cow<'_, str> {
    if !line.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(line);
    }

    let mut escaped = String::with_capacity(line.len() + 16);
    for c in line.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

const HTML_PREAMBLE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
a {color: #000; text-decoration: none}
a:hover {text-decoration: underline}
"#;

const HTML_FIELD_STYLES: &str = r#".date {color: rgb(216,125,0);}
.source {color: rgb(0,0,102);}
.req_id {font-style: italic;}
.msg_op {color: rgb(205,0,205);}
.msg_num {font-style: italic;}
.msg_content {font-weight: bold;}
.msg_type {color: rgb(204,102,0);}
.lvl_NONE, .lvl_AUDIT, .lvl_TRACE {color: rgb(136,136,136);}
.lvl_DEBUG {color: rgb(0,205,205);}
.lvl_INFO {color: rgb(0,255,0);}
.lvl_ERROR {color: rgb(204,0,0);}
.lvl_WARNING {color: rgb(205,0,205);}
</style>
</head>
<body>
<pre id="main_container">
"#;

/// Line style for a whole severity class
fn severity_css(severity: Severity) -> &'static str {
    match severity {
        Severity::Debug => "color: #888",
        Severity::Info => "color: #006; font-weight: bold",
        Severity::Trace => "color: #c60",
        Severity::Warning => "color: #D89100; font-weight: bold",
        Severity::Error => "color: #c00; font-weight: bold",
        Severity::None | Severity::Audit => "",
    }
}

/// Output mode for one stream: how input is prepared, how each surviving
/// record is rendered and what framing surrounds the lines.
pub struct OutputFormatter {
    format: OutputFormat,
    escape_input: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, file_name: &str) -> Self {
        OutputFormatter {
            format,
            // files that already are HTML keep their markup
            escape_input: format == OutputFormat::Html && !is_html_file(file_name),
        }
    }

    /// Styler matching this output mode
    pub fn styler(&self, style_map: StyleMap) -> Box<dyn Styler> {
        match self.format {
            OutputFormat::Color => Box::new(DirectStyler::new(style_map)),
            OutputFormat::Html => Box::new(HtmlStyler),
            OutputFormat::Plain | OutputFormat::Jsonl | OutputFormat::Raw => Box::new(PlainStyler),
        }
    }

    pub fn prepare_line<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.escape_input {
            escape_html(line)
        } else {
            Cow::Borrowed(line)
        }
    }

    /// Render a surviving record; `original` is the line as read.
    pub fn render(
        &self,
        original: &str,
        record: &Record,
        formatter: &dyn RecordFormatter,
    ) -> Result<String, ProcessingError> {
        match self.format {
            OutputFormat::Raw => Ok(original.to_string()),
            OutputFormat::Jsonl => serde_json::to_string(record)
                .map_err(|e| ProcessingError::OutputError(format!("JSON encoding error: {}", e))),
            OutputFormat::Color | OutputFormat::Plain | OutputFormat::Html => {
                Ok(formatter.format_record(record))
            }
        }
    }

    pub fn header(&self) -> Option<String> {
        if self.format != OutputFormat::Html {
            return None;
        }

        let mut header = String::from(HTML_PREAMBLE);
        for severity in Severity::ALL {
            let css = severity_css(severity);
            if !css.is_empty() {
                header.push_str(&format!(".{} {{{}}}\n", severity.as_str(), css));
            }
        }
        header.push_str(HTML_FIELD_STYLES);
        Some(header)
    }

    pub fn footer(&self) -> Option<String> {
        match self.format {
            OutputFormat::Html => Some("</pre></body></html>\n".to_string()),
            _ => None,
        }
    }
}
