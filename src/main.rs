use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use logsift::pipeline::build_pipeline;
use logsift::{
    open_input, LogStyle, OutputFormat, OutputFormatter, Severity, StreamPipeline, StyleMap,
    ViewConfig,
};

#[derive(Parser, Debug)]
#[command(name = "logsift")]
#[command(about = "Parse, filter and colorize OpenStack service logs")]
#[command(version)]
struct Args {
    /// Log file to read ('-' for stdin)
    #[arg(value_name = "FILE", default_value = "-")]
    file: String,

    /// Output format (default: color on a terminal, plain otherwise)
    #[arg(short = 'o', long = "format", value_enum)]
    format: Option<OutputFormat>,

    /// Minimum severity to show
    #[arg(short = 'l', long = "level", visible_alias = "min-sev", value_enum, ignore_case = true)]
    min_severity: Option<Severity>,

    /// Log style, instead of guessing it from the file name
    #[arg(short = 't', long = "log-type", value_enum)]
    log_type: Option<LogStyle>,

    /// Always filter by severity
    #[arg(long, conflicts_with = "no_filter_sev")]
    filter_sev: bool,

    /// Never filter by severity
    #[arg(long)]
    no_filter_sev: bool,

    /// Show raw messaging dumps
    #[arg(long)]
    no_hide_raw: bool,

    /// Hide lines whose source fully matches REGEX (repeatable)
    #[arg(long = "skip-source", value_name = "REGEX")]
    skip_sources: Vec<String>,

    /// Hide lines whose message type fully matches REGEX (repeatable)
    #[arg(long = "skip-message-type", value_name = "REGEX")]
    skip_message_types: Vec<String>,

    /// Don't emphasize `content=` in messaging lines
    #[arg(long)]
    no_highlight_content: bool,

    /// Put the timestamp first in keystone lines
    #[arg(long)]
    invert_order: bool,

    /// YAML file overriding the terminal color scheme
    #[arg(long, value_name = "FILE")]
    style_map: Option<PathBuf>,

    /// Print line counts to stderr when done
    #[arg(long)]
    stats: bool,

    /// Debug mode - log pipeline decisions to stderr
    #[arg(long)]
    debug: bool,

    /// Buffer size for I/O
    #[arg(long, default_value = "65536")] // 64KB
    buffer_size: usize,
}

impl Args {
    fn filter_severity(&self) -> Option<bool> {
        match (self.filter_sev, self.no_filter_sev) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn view_config(&self) -> ViewConfig {
        ViewConfig {
            log_style: self.log_type,
            min_severity: self.min_severity,
            filter_severity: self.filter_severity(),
            skip_raw: !self.no_hide_raw,
            skip_sources: self.skip_sources.clone(),
            skip_message_types: self.skip_message_types.clone(),
            highlight_content: !self.no_highlight_content,
            invert_order: self.invert_order,
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default.into()),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.debug);

    if let Err(e) = run(args) {
        eprintln!("logsift: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.view_config();
    let format = args.format.unwrap_or_else(OutputFormat::auto);

    let style_map = match &args.style_map {
        Some(path) => StyleMap::from_yaml_file(path)
            .with_context(|| format!("Failed to load style map '{}'", path.display()))?,
        None => StyleMap::default(),
    };

    let output_formatter = OutputFormatter::new(format, &args.file);
    let styler = output_formatter.styler(style_map);
    let (chain, formatter) =
        build_pipeline(&args.file, &config, styler).context("Failed to build pipeline")?;

    // open before anything is written so a missing file produces no output
    let input = open_input(&args.file, args.buffer_size)?;

    let pipeline = StreamPipeline::new(chain, formatter, output_formatter);
    let mut output = io::BufWriter::with_capacity(args.buffer_size, io::stdout());

    let stats = pipeline
        .process_stream(input, &mut output, Some(&args.file))
        .context("Processing failed")?;

    if let Err(e) = output.flush() {
        if e.kind() != io::ErrorKind::BrokenPipe {
            return Err(e).context("Failed to flush output");
        }
    }

    if args.stats {
        eprintln!("Final statistics:");
        eprintln!("  Lines processed: {}", stats.lines_processed);
        eprintln!("  Lines output: {}", stats.lines_output);
        eprintln!("  Lines skipped: {}", stats.lines_skipped);
        for severity in Severity::ALL {
            let count = stats.count_for(severity);
            if count > 0 {
                eprintln!("  {}: {}", severity, count);
            }
        }
        eprintln!("  Processing time: {:?}", stats.processing_time);
    }

    Ok(())
}
