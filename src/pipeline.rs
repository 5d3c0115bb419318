pub mod builder;
pub mod config;
pub mod context;
pub mod extractors;
pub mod skippers;
pub mod stream;

pub use builder::build_pipeline;
pub use config::{LogStyle, Severity, ViewConfig};
pub use context::{ProcessingStats, Record};
pub use stream::{Chain, RenderedLines, Stage, StreamPipeline};
