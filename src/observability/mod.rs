//! OpenTelemetry-based observability with file-based trace export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → JSONL file
//! ```
//!
//! - One JSON object per finished span in `<data_dir>/shikimore-trace.jsonl`
//! - Files rotate at 10 MB with 3 backups
//! - Level from `RUST_LOG`, then the `trace_level` config option, then `info`
//!
//! # Usage
//!
//! ```rust,no_run
//! use shikimore::observability::init_tracing;
//! use shikimore::Config;
//!
//! init_tracing(&Config::default());
//! tracing::debug!("host started");
//! ```

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::init_tracing;
