use std::sync::OnceLock;

use opentelemetry::{global, trace::TracerProvider};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    runtime::Tokio,
    trace::{Config, TracerProvider as SdkTracerProvider},
};
use thiserror::Error;
use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::layer, layer::SubscriberExt, util::SubscriberInitExt,
};

use super::LoggerConfig;

/// Kept so `finalize` can flush pending spans.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("otlp pipeline: {0}")]
    Otlp(#[from] opentelemetry::trace::TraceError),

    #[error("subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global subscriber.  OTLP export needs a running tokio
/// runtime.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // RUST_LOG overrides the default level.
    let filt = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let stdout_layer = if config.json_format {
        layer()
            .json()
            .with_span_events(config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    } else {
        layer()
            .compact()
            .with_span_events(config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    };

    let file_layer = config.file.as_ref().map(|file| {
        let appender = RollingFileAppender::new(
            file.rotation.clone(),
            &file.directory,
            &file.file_name_prefix,
        );
        if file.json_format {
            layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        } else {
            layer()
                .compact()
                .with_writer(appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        }
    });

    let otel_layer = match &config.otlp_url {
        Some(url) => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(url);
            let provider = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(Config::default().with_resource(config.resource()))
                .install_batch(Tokio)?;

            let tracer = provider.tracer("tessel-tracer");
            if TRACER_PROVIDER.set(provider).is_err() {
                warn!("tracer provider already set");
            }
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(otel_layer)
        .try_init()?;

    info!(
        service_name = %config.service_name,
        otlp = config.otlp_url.is_some(),
        file = config.file.is_some(),
        "logging initialized"
    );
    Ok(())
}

/// Flushes pending spans.  Call before exit.
pub fn finalize() {
    match TRACER_PROVIDER.get() {
        Some(provider) => {
            if let Err(e) = provider.shutdown() {
                error!(?e, "failed to shut down tracer provider");
            }
        }
        None => debug!("no tracer provider to shut down"),
    }
    global::shutdown_tracer_provider();
}
