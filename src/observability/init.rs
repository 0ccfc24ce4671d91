//! Tracing initialization and subscriber setup.

use super::tracer;
use crate::infrastructure::paths::trace_path;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "shikimore";

/// Installs the global subscriber exporting spans to the trace file.
///
/// The filter comes from `RUST_LOG` when set, else from
/// `config.trace_level`, else `"info"`. Spans are written to
/// `<data_dir>/shikimore-trace.jsonl`.
///
/// Tracing is optional: if the data directory cannot be created nothing is
/// installed. Calling this more than once is harmless; only the first call
/// takes effect.
///
/// # Example
///
/// ```rust
/// use shikimore::observability::init_tracing;
/// use shikimore::Config;
///
/// let dir = std::env::temp_dir().join("shikimore-doc");
/// let config = Config {
///     data_dir: dir,
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    if std::fs::create_dir_all(&config.data_dir).is_err() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.trace_level.as_deref().unwrap_or("info"))
    });

    let resource = Resource::new(vec![opentelemetry::KeyValue::new(
        "service.name",
        SERVICE_NAME,
    )]);
    let provider = tracer::create_tracer_provider(trace_path(&config.data_dir), resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .try_init();
}
