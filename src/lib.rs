// src/lib.rs
pub mod colors;
pub mod error;
pub mod formatters;
pub mod input;
pub mod output_format;
pub mod pipeline;
pub mod stylers;
pub mod tty;

pub use error::*;
pub use pipeline::*;

pub use formatters::RecordFormatter;
pub use input::{open_input, LineReader};
pub use output_format::{OutputFormat, OutputFormatter};
pub use stylers::{DirectStyler, HtmlStyler, PlainStyler, StyleField, StyleMap, Styler};
