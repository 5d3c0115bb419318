// src/pipeline/stream.rs
use std::io::{self, BufRead, Write};
use std::time::Instant;

use crate::error::ProcessingError;
use crate::formatters::RecordFormatter;
use crate::input::LineReader;
use crate::output_format::OutputFormatter;
use crate::pipeline::config::Severity;
use crate::pipeline::context::{ProcessingStats, Record};

/// One extraction + skip unit of a matcher chain.
///
/// `extract` is anchored at the start of `line`. On a miss it must return
/// an empty record and the whole input, which is the default.
pub trait Stage: Send + Sync {
    fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
        (Record::new(), line)
    }

    /// Decide whether to drop the line. `full_line` is the input this stage
    /// saw, `record` already includes this stage's fields.
    fn should_skip(&self, _full_line: &str, _record: &Record, _rest: &str) -> bool {
        false
    }

    fn name(&self) -> &str;
}

/// Ordered list of stages run by an explicit driver loop.
#[derive(Default)]
pub struct Chain {
    stages: Vec<Box<dyn Stage>>,
}

impl Chain {
    pub fn new() -> Self {
        Chain { stages: Vec::new() }
    }

    pub fn add_stage(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn then(mut self, stage: impl Stage + 'static) -> Self {
        self.add_stage(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run one line through every stage.
    ///
    /// Returns `Ok(None)` as soon as a stage asks to skip; later stages do
    /// not run. A field conflict between stages is an error.
    pub fn run(&self, line: &str) -> Result<Option<Record>, ProcessingError> {
        let mut record = Record::new();
        let mut rest = line;

        for stage in &self.stages {
            let (fields, next) = stage.extract(rest);
            tracing::trace!(stage = stage.name(), matched = !fields.is_empty(), "extract");
            record.merge(fields)?;

            if stage.should_skip(rest, &record, next) {
                tracing::trace!(stage = stage.name(), "skip");
                return Ok(None);
            }
            rest = next;
        }

        Ok(Some(record))
    }
}

/// `Ok(true)` when the consumer has gone away; other write errors propagate.
fn consumer_closed(result: io::Result<()>) -> Result<bool, ProcessingError> {
    match result {
        Ok(()) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(true),
        Err(e) => Err(e.into()),
    }
}

/// Chain + formatter + output mode, driven line by line
pub struct StreamPipeline {
    chain: Chain,
    formatter: Box<dyn RecordFormatter>,
    output: OutputFormatter,
}

impl StreamPipeline {
    pub fn new(
        chain: Chain,
        formatter: Box<dyn RecordFormatter>,
        output: OutputFormatter,
    ) -> Self {
        StreamPipeline {
            chain,
            formatter,
            output,
        }
    }

    /// Parse, filter and render one raw line.
    pub fn render_line(&self, line: &str) -> Result<Option<(String, Severity)>, ProcessingError> {
        let prepared = self.output.prepare_line(line);

        match self.chain.run(&prepared)? {
            Some(record) => {
                let severity = self.formatter.severity(&record);
                let rendered = self.output.render(line, &record, self.formatter.as_ref())?;
                Ok(Some((rendered, severity)))
            }
            None => Ok(None),
        }
    }

    /// Lazily render the lines of `input`; only the current line is held.
    pub fn render_lines<R: BufRead>(&self, input: R) -> RenderedLines<'_, R> {
        RenderedLines {
            pipeline: self,
            lines: LineReader::new(input),
        }
    }

    /// Process a single file/stream, writing page framing when the output mode has one.
    ///
    /// A consumer that closes its end (`| head`) ends the stream early
    /// without an error; nothing further is written, footer included.
    pub fn process_stream<R: BufRead, W: Write>(
        &self,
        input: R,
        output: &mut W,
        filename: Option<&str>,
    ) -> Result<ProcessingStats, ProcessingError> {
        let start_time = Instant::now();
        let mut stats = ProcessingStats::default();
        let mut closed = false;

        if let Some(header) = self.output.header() {
            closed = consumer_closed(write!(output, "{}", header))?;
        }

        for line_result in LineReader::new(input) {
            if closed {
                break;
            }
            let line = line_result?;
            stats.lines_processed += 1;

            match self.render_line(&line)? {
                Some((rendered, severity)) => {
                    closed = consumer_closed(writeln!(output, "{}", rendered))?;
                    if !closed {
                        stats.record_output(severity);
                    }
                }
                None => {
                    tracing::debug!(line = stats.lines_processed, "line dropped");
                    stats.lines_skipped += 1;
                }
            }
        }

        if !closed {
            if let Some(footer) = self.output.footer() {
                closed = consumer_closed(write!(output, "{}", footer))?;
            }
        }

        stats.processing_time = start_time.elapsed();

        tracing::debug!(
            file = filename.unwrap_or("-"),
            processed = stats.lines_processed,
            output = stats.lines_output,
            skipped = stats.lines_skipped,
            closed,
            elapsed = ?stats.processing_time,
            "processing complete"
        );

        Ok(stats)
    }
}

/// Pull-based iterator over rendered output lines. Dropped lines produce
/// nothing; the consumer cancels by not pulling any further.
pub struct RenderedLines<'p, R> {
    pipeline: &'p StreamPipeline,
    lines: LineReader<R>,
}

impl<R: BufRead> Iterator for RenderedLines<'_, R> {
    type Item = Result<String, ProcessingError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };

            match self.pipeline.render_line(&line) {
                Ok(Some((rendered, _))) => return Some(Ok(rendered)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Consumes a literal prefix and records it under `key`.
    struct Prefix {
        key: &'static str,
        text: &'static str,
    }

    fn prefix(key: &'static str, text: &'static str) -> Prefix {
        Prefix { key, text }
    }

    impl Stage for Prefix {
        fn extract<'a>(&self, line: &'a str) -> (Record, &'a str) {
            match line.strip_prefix(self.text) {
                Some(rest) => (Record::new().with(self.key, self.text), rest),
                None => (Record::new(), line),
            }
        }

        fn name(&self) -> &str {
            self.key
        }
    }

    struct SkipAll;

    impl Stage for SkipAll {
        fn should_skip(&self, _: &str, _: &Record, _: &str) -> bool {
            true
        }

        fn name(&self) -> &str {
            "skip_all"
        }
    }

    struct Panics;

    impl Stage for Panics {
        fn extract<'a>(&self, _line: &'a str) -> (Record, &'a str) {
            panic!("stage after a skip must not run");
        }

        fn name(&self) -> &str {
            "panics"
        }
    }

    #[test]
    fn test_chain_feeds_rest_forward() {
        let chain = Chain::new().then(prefix("first", "a")).then(prefix("second", "b"));
        let record = chain.run("ab").unwrap().unwrap();
        assert_eq!(record.get("first").and_then(|v| v.as_str()), Some("a"));
        assert_eq!(record.get("second").and_then(|v| v.as_str()), Some("b"));

        // a miss hands the whole input on to the next stage
        let record = chain.run("ba").unwrap().unwrap();
        assert!(record.get("first").is_none());
        assert_eq!(record.get("second").and_then(|v| v.as_str()), Some("b"));
    }

    #[test]
    fn test_skip_short_circuits() {
        let chain = Chain::new().then(SkipAll).then(Panics);
        assert!(chain.run("anything").unwrap().is_none());
    }

    #[test]
    fn test_equal_values_merge() {
        let chain = Chain::new().then(prefix("tag", "a")).then(prefix("tag", "a"));
        assert!(chain.run("aa").unwrap().is_some());
    }

    #[test]
    fn test_conflict_is_an_error() {
        let chain = Chain::new().then(prefix("tag", "a")).then(prefix("tag", "b"));
        match chain.run("ab") {
            Err(ProcessingError::FieldConflict { path }) => assert_eq!(path, "tag"),
            other => panic!("expected conflict, got {:?}", other.map(|_| ())),
        }
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_every_stage_decision_is_traced() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let chain = Chain::new().then(prefix("first", "a")).then(prefix("second", "b"));
        tracing::subscriber::with_default(subscriber, || {
            chain.run("ba").unwrap();
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let extracts: Vec<&str> = logs.lines().filter(|l| l.contains("extract")).collect();
        assert_eq!(extracts.len(), 2, "{}", logs);
        assert!(extracts[0].contains("first") && extracts[0].contains("matched=false"));
        assert!(extracts[1].contains("second") && extracts[1].contains("matched=true"));
    }

    #[test]
    fn test_stage_names() {
        let chain = Chain::new().then(prefix("first", "a")).then(SkipAll);
        assert_eq!(chain.stage_names(), vec!["first", "skip_all"]);
        assert_eq!(chain.len(), 2);
    }
}
