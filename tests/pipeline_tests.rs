// tests/pipeline_tests.rs
use regex::Regex;
use std::io::{self, BufReader, Cursor, Read, Write};

use logsift::pipeline::build_pipeline;
use logsift::{
    OutputFormat, OutputFormatter, ProcessingStats, Severity, StreamPipeline, StyleMap, ViewConfig,
};

const OSLO_LINE: &str = "2013-09-01 00:00:01.123 1234 INFO nova.api.foo [req-abc] hello world";

fn pipeline(file_name: &str, config: &ViewConfig, format: OutputFormat) -> StreamPipeline {
    let output = OutputFormatter::new(format, file_name);
    let styler = output.styler(StyleMap::default());
    let (chain, formatter) = build_pipeline(file_name, config, styler).unwrap();
    StreamPipeline::new(chain, formatter, output)
}

fn run(pipeline: &StreamPipeline, input: &str) -> (String, ProcessingStats) {
    let mut output = Vec::new();
    let stats = pipeline
        .process_stream(Cursor::new(input.to_string()), &mut output, Some("test"))
        .unwrap();
    (String::from_utf8(output).unwrap(), stats)
}

fn with_minimum(min: Severity) -> ViewConfig {
    ViewConfig {
        min_severity: Some(min),
        ..ViewConfig::default()
    }
}

#[test]
fn test_oslo_line_kept_at_its_own_level() {
    println!("=== Testing oslo line at minimum INFO ===");

    let p = pipeline("screen-n-api.txt", &with_minimum(Severity::Info), OutputFormat::Plain);
    let (out, stats) = run(&p, &format!("{}\n", OSLO_LINE));

    assert_eq!(out, format!("{}\n", OSLO_LINE));
    assert_eq!(stats.lines_output, 1);
    println!("✓ INFO line kept and re-rendered");
}

#[test]
fn test_oslo_line_dropped_below_minimum() {
    let p = pipeline("screen-n-api.txt", &with_minimum(Severity::Warning), OutputFormat::Plain);
    let (out, stats) = run(&p, &format!("{}\n", OSLO_LINE));

    assert_eq!(out, "");
    assert_eq!(stats.lines_processed, 1);
    assert_eq!(stats.lines_skipped, 1);
}

#[test]
fn test_source_skip_ignores_severity() {
    println!("=== Testing source skip on an oslo log ===");

    for min in [Severity::None, Severity::Info] {
        let config = ViewConfig {
            min_severity: Some(min),
            skip_sources: vec![r"nova\.api\.foo".to_string()],
            ..ViewConfig::default()
        };
        let p = pipeline("screen-n-api.txt", &config, OutputFormat::Plain);
        let (out, _) = run(&p, OSLO_LINE);
        assert_eq!(out, "", "line survived with minimum {}", min);
    }
    println!("✓ Source skip applies to oslo logs");
}

#[test]
fn test_devstack_depth_rendering() {
    let p = pipeline("stack.sh.log.txt", &ViewConfig::default(), OutputFormat::Plain);
    let (out, stats) = run(&p, "2013-09-01 00:00:01 ++ doing thing\n");

    assert_eq!(out, "2013-09-01 00:00:01 ++ doing thing\n");
    assert_eq!(stats.count_for(Severity::Debug), 1);
}

#[test]
fn test_html_anchor_ids_are_stable() {
    println!("=== Testing HTML anchors ===");

    let input = "2013-09-01 00:00:01.123 1 INFO nova.api a\n\
                 2013-09-01 00:00:01.123 1 INFO nova.api b\n";
    let p = pipeline("screen-n-api.txt", &ViewConfig::default(), OutputFormat::Html);
    let (out, _) = run(&p, input);

    let id_re = Regex::new(r#" id="([^"]*)" class="date""#).unwrap();
    let ids: Vec<&str> = id_re
        .captures_iter(&out)
        .map(|c| c.get(1).unwrap().as_str())
        .collect();

    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], ids[1]);
    assert!(ids[0]
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    println!("✓ Same timestamp, same anchor: {}", ids[0]);
}

#[test]
fn test_unrecognized_line_passes_through() {
    let p = pipeline("syslog.txt", &ViewConfig::default(), OutputFormat::Color);
    let (out, stats) = run(&p, "Traceback (most recent call last):   \n");

    assert_eq!(out, "Traceback (most recent call last):\n");
    assert_eq!(stats.count_for(Severity::None), 1);
}

#[test]
fn test_body_survives_rendering() {
    let lines = [
        ("2013-09-01 00:00:01.123 7 DEBUG nova.compute [-] doing (things) now", "doing (things) now"),
        ("2013-09-01 00:00:01.123 WARNING nova.compute Reply(x=1)", "Reply(x=1)"),
        (
            "2013-09-01 00:00:01.123 7 INFO oslo.messaging [req-1 a b] RECV[ff]: Message(content=2)",
            "Message(content=2)",
        ),
    ];

    let config = ViewConfig {
        highlight_content: false,
        ..ViewConfig::default()
    };
    for (line, body) in lines {
        let p = pipeline("screen-n-cpu.txt", &config, OutputFormat::Plain);
        let (out, _) = run(&p, line);
        assert!(out.trim_end().ends_with(body), "{:?} lost its body", out);
    }
}

#[test]
fn test_raw_messaging_hidden_by_default() {
    let input = "2013-09-01 00:00:01.123 1 DEBUG oslo.messaging.io.raw blob\n\
                 2013-09-01 00:00:01.123 1 DEBUG nova.api kept\n";

    let p = pipeline("screen-n-api.txt", &ViewConfig::default(), OutputFormat::Plain);
    let (out, _) = run(&p, input);
    assert!(!out.contains("blob"));
    assert!(out.contains("kept"));

    let shown = ViewConfig {
        skip_raw: false,
        ..ViewConfig::default()
    };
    let p = pipeline("screen-n-api.txt", &shown, OutputFormat::Plain);
    let (out, _) = run(&p, input);
    assert!(out.contains("blob"));
}

#[test]
fn test_message_type_skip() {
    let config = ViewConfig {
        skip_message_types: vec!["Reply".to_string()],
        ..ViewConfig::default()
    };
    let input = "2013-09-01 00:00:01.123 1 INFO nova.rpc [-] SENT[01]: Reply(x)\n\
                 2013-09-01 00:00:01.123 1 INFO nova.rpc [-] SENT[02]: Message(x)\n";
    let p = pipeline("screen-n-api.txt", &config, OutputFormat::Plain);
    let (out, stats) = run(&p, input);

    assert_eq!(out, "2013-09-01 00:00:01.123 1 INFO nova.rpc [-] SENT [02]: Message(x)\n");
    assert_eq!(stats.lines_skipped, 1);
}

#[test]
fn test_console_log() {
    let input = "2013-09-27 18:15:01.123 | Started by user\n\
                 2013-09-27 18:15:02.000 | 2013-09-27 18:15:02 + ./stack.sh\n";
    let p = pipeline("console.html", &ViewConfig::default(), OutputFormat::Plain);
    let (out, stats) = run(&p, input);

    assert_eq!(
        out,
        "2013-09-27 18:15:01.123 | Started by user\n\
         2013-09-27 18:15:02.000 | (devstack) + ./stack.sh\n"
    );
    assert_eq!(stats.count_for(Severity::Audit), 1);
    assert_eq!(stats.count_for(Severity::Debug), 1);
}

#[test]
fn test_html_source_drops_own_pre_tags() {
    let input = "<pre>\n2013-09-27 18:15:01.123 | hello\n</pre>\n";
    let p = pipeline("console.html", &ViewConfig::default(), OutputFormat::Plain);
    let (out, stats) = run(&p, input);

    assert_eq!(out, "2013-09-27 18:15:01.123 | hello\n");
    assert_eq!(stats.lines_skipped, 2);
}

#[test]
fn test_keystone_inverted() {
    let config = ViewConfig {
        invert_order: true,
        ..ViewConfig::default()
    };
    let line = "(keystone.common.wsgi): 2013-09-27 18:15:01,123 INFO wsgi __call__ arg\n";
    let p = pipeline("screen-key.txt", &config, OutputFormat::Plain);
    let (out, _) = run(&p, line);

    assert_eq!(
        out,
        "2013-09-27 18:15:01,123: (keystone.common.wsgi) INFO wsgi __call__ arg\n"
    );
}

#[test]
fn test_jsonl_exposes_record() {
    let p = pipeline("screen-n-api.txt", &ViewConfig::default(), OutputFormat::Jsonl);
    let (out, _) = run(&p, OSLO_LINE);

    let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
    assert_eq!(value["source"], "nova.api.foo");
    assert_eq!(value["req_id"], "req-abc");
    assert_eq!(value["message"]["body"], "hello world");
}

#[test]
fn test_html_escapes_text_logs() {
    let line = "2013-09-01 00:00:01.123 1 INFO nova.api got <xml a=\"1\"/>";
    let p = pipeline("screen-n-api.txt", &ViewConfig::default(), OutputFormat::Html);
    let (out, _) = run(&p, line);

    assert!(out.contains("got &lt;xml a=&quot;1&quot;/&gt;"));
    assert!(!out.contains("<xml"));
}

/// Endless supply of identical log lines.
struct EndlessLog {
    line: &'static [u8],
    pos: usize,
}

impl Read for EndlessLog {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            buf[written] = self.line[self.pos];
            self.pos = (self.pos + 1) % self.line.len();
            written += 1;
        }
        Ok(written)
    }
}

#[test]
fn test_rendering_is_lazy() {
    println!("=== Testing lazy rendering over an endless input ===");

    let p = pipeline("screen-n-api.txt", &with_minimum(Severity::Info), OutputFormat::Plain);
    let input = BufReader::new(EndlessLog {
        line: b"2013-09-01 00:00:01.123 1 DEBUG nova.api noise\n\
                2013-09-01 00:00:01.123 1 ERROR nova.api signal\n",
        pos: 0,
    });

    let rendered: Vec<String> = p
        .render_lines(input)
        .take(1000)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rendered.len(), 1000);
    assert!(rendered.iter().all(|l| l.ends_with("ERROR nova.api signal")));
    println!("✓ Pulled 1000 lines from an endless stream");
}

/// Accepts `limit` bytes, then reports the reader as gone.
struct ClosingWriter {
    written: usize,
    limit: usize,
}

impl Write for ClosingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() > self.limit {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader closed"));
        }
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_closed_consumer_ends_html_stream_quietly() {
    println!("=== Testing HTML output into a pipe that closes early ===");

    let input = format!("{}\n", OSLO_LINE).repeat(50);
    let p = pipeline("screen-n-api.txt", &ViewConfig::default(), OutputFormat::Html);
    let mut output = ClosingWriter {
        written: 0,
        limit: 2000,
    };

    let stats = p
        .process_stream(Cursor::new(input), &mut output, Some("test"))
        .expect("a closed pipe is not an error");

    assert!(stats.lines_output > 0);
    assert!(stats.lines_output < 50);
    assert!(output.written <= 2000);
    println!("✓ Stopped after {} lines", stats.lines_output);
}

#[test]
fn test_closed_consumer_before_header() {
    let p = pipeline("screen-n-api.txt", &ViewConfig::default(), OutputFormat::Html);
    let mut output = ClosingWriter {
        written: 0,
        limit: 0,
    };

    let stats = p
        .process_stream(Cursor::new(OSLO_LINE.to_string()), &mut output, Some("test"))
        .unwrap();
    assert_eq!(stats.lines_processed, 0);
    assert_eq!(output.written, 0);
}

#[test]
fn test_other_write_errors_propagate() {
    struct Failing;

    impl Write for Failing {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let p = pipeline("screen-n-api.txt", &ViewConfig::default(), OutputFormat::Plain);
    let result = p.process_stream(Cursor::new(OSLO_LINE.to_string()), &mut Failing, Some("test"));
    assert!(result.is_err());
}
