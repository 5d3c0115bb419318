// src/pipeline/builder.rs - assemble the matcher chain and formatter for a file
use crate::error::CompilationError;
use crate::formatters::{
    ConsoleFormatter, DevstackFormatter, KeystoneFormatter, OsloFormatter, RecordFormatter,
};
use crate::pipeline::config::{file_supports_severity, is_html_file, LogStyle, ViewConfig};
use crate::pipeline::extractors::{
    BodyExtractor, ConsoleMetadataExtractor, DevstackMetadataExtractor,
    KeystoneMessageTypeExtractor, KeystoneMetadataExtractor, MessageOperationExtractor,
    MessageTypeExtractor, OsloMetadataExtractor,
};
use crate::pipeline::skippers::{LevelSkipper, MessageTypeSkipper, PreTagSkipper, SourceSkipper};
use crate::pipeline::stream::Chain;
use crate::stylers::Styler;

/// Build the chain and formatter for `file_name`.
///
/// Stage order matters: every skipper and later extractor reads fields
/// that only earlier stages produce.
///
/// 1. style metadata
/// 2. level skipper, when severity filtering applies to the file
/// 3. source skipper, for styles with a `source` field
/// 4. message decomposition for the style
/// 5. pre-tag skipper, for files that are already HTML
/// 6. message-type skipper, when type patterns are configured
/// 7. body
pub fn build_pipeline(
    file_name: &str,
    config: &ViewConfig,
    styler: Box<dyn Styler>,
) -> Result<(Chain, Box<dyn RecordFormatter>), CompilationError> {
    let style = LogStyle::detect(file_name, config.log_style);
    let mut chain = Chain::new();

    let formatter: Box<dyn RecordFormatter> = match style {
        LogStyle::Oslo => {
            chain = chain.then(OsloMetadataExtractor);
            Box::new(OsloFormatter::new(styler, config.highlight_content))
        }
        LogStyle::Devstack => {
            chain = chain.then(DevstackMetadataExtractor);
            Box::new(DevstackFormatter::new(styler))
        }
        LogStyle::Console => {
            chain = chain.then(ConsoleMetadataExtractor);
            Box::new(ConsoleFormatter::new(styler))
        }
        LogStyle::Keystone => {
            chain = chain.then(KeystoneMetadataExtractor);
            Box::new(KeystoneFormatter::new(styler, config.invert_order))
        }
    };

    if file_supports_severity(file_name, config.filter_severity, config.min_severity) {
        chain = chain.then(LevelSkipper::new(config.minimum()));
    }

    let sources = config.source_patterns();
    if style.has_source() && !sources.is_empty() {
        chain = chain.then(SourceSkipper::new(&sources)?);
    }

    match style {
        LogStyle::Oslo => {
            chain = chain.then(MessageOperationExtractor).then(MessageTypeExtractor);
        }
        LogStyle::Keystone => {
            chain = chain.then(KeystoneMessageTypeExtractor);
        }
        LogStyle::Devstack | LogStyle::Console => {}
    }

    if is_html_file(file_name) {
        chain = chain.then(PreTagSkipper);
    }

    if style.has_source() && !config.skip_message_types.is_empty() {
        chain = chain.then(MessageTypeSkipper::new(&config.skip_message_types)?);
    }

    chain = chain.then(BodyExtractor);

    tracing::debug!(
        file = file_name,
        style = %style,
        stages = ?chain.stage_names(),
        "pipeline assembled"
    );

    Ok((chain, formatter))
}
