//! Logging setup: compact or JSON stdout, optional rolling log files, and
//! optional OTLP span export.

mod config;
mod manager;

pub use config::{FileLogging, LoggerConfig};
pub use manager::{LoggingError, finalize, init};
pub use tracing_appender::rolling::Rotation;

/// Formats a service name with an optional label suffix.
pub fn format_service_name(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_service_name() {
        assert_eq!(format_service_name("tessel", None), "tessel");
        assert_eq!(format_service_name("tessel", Some("dev")), "tessel%dev");
    }
}
