//! Subscriber setup with optional OpenTelemetry export

use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use super::config::TracingConfig;
use crate::config::LogFormat;
use crate::infrastructure::logging::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

pub(crate) fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn fmt_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    }
}

/// Installs the global subscriber; spans are exported over OTLP when enabled
pub fn init_tracing(logging_config: &LoggingConfig, tracing_config: &TracingConfig) {
    let provider = if tracing_config.enabled {
        match init_otel_tracing(tracing_config) {
            Ok(provider) => Some(provider),
            Err(e) => {
                eprintln!("Failed to initialize OpenTelemetry: {}. Export disabled.", e);
                None
            }
        }
    } else {
        None
    };

    let telemetry_layer = provider.as_ref().map(|provider| {
        let tracer = provider.tracer(tracing_config.service_name.clone());
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(fmt_layer(logging_config.format))
        .with(env_filter(&logging_config.level))
        .with(telemetry_layer)
        .init();

    match provider {
        Some(provider) => {
            // registered globally so shutdown_tracing can flush it
            global::set_tracer_provider(provider);
            tracing::info!(
                endpoint = %tracing_config.otlp_endpoint,
                "Tracing initialized with OpenTelemetry export"
            );
        }
        None => tracing::info!("Tracing initialized (OpenTelemetry disabled)"),
    }
}

fn sampler(ratio: f64) -> Sampler {
    let root = if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(ratio)
    };

    Sampler::ParentBased(Box::new(root))
}

fn init_otel_tracing(
    config: &TracingConfig,
) -> Result<TracerProvider, opentelemetry::trace::TraceError> {
    let resource = Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_sampler(sampler(config.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .with_batch_exporter(exporter, runtime::Tokio)
        .build();

    Ok(provider)
}

/// Flushes pending spans
pub fn shutdown_tracing() {
    global::shutdown_tracer_provider();
    tracing::info!("Tracing shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_is_parent_based() {
        assert!(matches!(sampler(1.0), Sampler::ParentBased(_)));
        assert!(matches!(sampler(0.5), Sampler::ParentBased(_)));
        assert!(matches!(sampler(-1.0), Sampler::ParentBased(_)));
    }

    #[test]
    fn test_env_filter_accepts_configured_level() {
        let filter = env_filter("debug");
        assert!(!filter.to_string().is_empty());
    }
}
