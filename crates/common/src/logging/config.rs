use std::path::PathBuf;

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use tessel_config::LoggingConfig;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

use super::format_service_name;

/// Rolling file output.
#[derive(Debug, Clone)]
pub struct FileLogging {
    pub directory: PathBuf,
    pub file_name_prefix: String,
    pub rotation: Rotation,
    pub json_format: bool,
}

impl FileLogging {
    pub fn new(directory: PathBuf, file_name_prefix: String) -> Self {
        Self {
            directory,
            file_name_prefix,
            rotation: Rotation::DAILY,
            json_format: false,
        }
    }
}

/// Fully resolved logger settings.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub service_name: String,
    pub service_version: Option<String>,
    pub otlp_url: Option<String>,
    pub json_format: bool,
    /// Span events to log.  `CLOSE` records span durations.
    pub fmt_span: FmtSpan,
    pub file: Option<FileLogging>,
}

impl LoggerConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            service_name,
            service_version: None,
            otlp_url: None,
            json_format: false,
            fmt_span: FmtSpan::CLOSE,
            file: None,
        }
    }

    /// Resolves the `[logging]` config section against a base service name.
    /// The base name doubles as the log file prefix when none is configured.
    pub fn from_node_config(base_name: &str, cfg: &LoggingConfig) -> Self {
        let service_name = format_service_name(base_name, cfg.service_label.as_deref());
        let json_format = cfg.json_format.unwrap_or(false);
        let file = cfg.log_dir.as_ref().map(|dir| {
            let prefix = cfg
                .log_file_prefix
                .clone()
                .unwrap_or_else(|| base_name.to_owned());
            FileLogging {
                json_format,
                ..FileLogging::new(dir.clone(), prefix)
            }
        });

        Self {
            otlp_url: cfg.otlp_url.clone(),
            json_format,
            file,
            ..Self::new(service_name)
        }
    }

    pub fn with_service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub(crate) fn resource(&self) -> Resource {
        let mut attributes = vec![KeyValue::new("service.name", self.service_name.clone())];
        if let Some(version) = &self.service_version {
            attributes.push(KeyValue::new("service.version", version.clone()));
        }
        Resource::new(attributes)
    }
}
