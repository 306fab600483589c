use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};

/// Event field names we rename to their OpenTelemetry semantic-convention
/// spelling on the way out.
const FIELD_RENAMES: &[(&str, &str)] = &[
    ("event_name", "event.name"),
    ("request_id", "request.id"),
    ("method", "http.request.method"),
    ("path", "url.path"),
    ("status", "http.response.status_code"),
    ("error_kind", "error.type"),
];

#[derive(Default)]
struct JsonFieldVisitor {
    fields: Map<String, Value>,
}

impl JsonFieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonFieldVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::from(format!("{:?}", value)));
    }
}

/// One JSON object per line: timestamp, severity, body, resource, attributes.
#[derive(Clone)]
struct JsonLineFormatter {
    service_name: String,
    service_version: String,
}

impl JsonLineFormatter {
    fn severity_number(level: &Level) -> u64 {
        match *level {
            Level::TRACE => 1,
            Level::DEBUG => 5,
            Level::INFO => 9,
            Level::WARN => 13,
            Level::ERROR => 17,
        }
    }

    fn render(&self, level: &Level, target: &str, name: &str, fields: Map<String, Value>) -> Value {
        let mut attributes = fields;
        for (from, to) in FIELD_RENAMES {
            if let Some(v) = attributes.remove(*from) {
                attributes.insert((*to).to_string(), v);
            }
        }
        attributes.insert("code.target".to_string(), Value::from(target));

        let body = attributes
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| name.to_string());

        let mut resource = Map::new();
        resource.insert("service.name".to_string(), Value::from(self.service_name.clone()));
        resource.insert(
            "service.version".to_string(),
            Value::from(self.service_version.clone()),
        );

        let mut root = Map::new();
        root.insert(
            "timestamp".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        root.insert("severity_text".to_string(), Value::from(level.as_str()));
        root.insert(
            "severity_number".to_string(),
            Value::from(Self::severity_number(level)),
        );
        root.insert("body".to_string(), Value::from(body));
        root.insert("resource".to_string(), Value::Object(resource));
        root.insert("attributes".to_string(), Value::Object(attributes));
        Value::Object(root)
    }
}

impl<S, N> FormatEvent<S, N> for JsonLineFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);

        let json = self.render(
            metadata.level(),
            metadata.target(),
            metadata.name(),
            visitor.fields,
        );
        let serialized = serde_json::to_string(&json).map_err(|_| std::fmt::Error)?;
        writer.write_str(&serialized)?;
        writer.write_char('\n')?;
        Ok(())
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        "off" => Ok(LevelFilter::OFF),
        _ => Err(format!(
            "Invalid logging.level '{}'. Valid values: trace, debug, info, warn, error, off",
            level
        )),
    }
}

/// Installs the global subscriber. `RUST_LOG` directives are layered on top
/// of the configured level.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), String> {
    let level_filter = parse_level(&logging_config.level)?;
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();

    // Logs go to stderr so command output on stdout stays machine-readable.
    let result = match logging_config.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter_layer)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .event_format(JsonLineFormatter {
                        service_name: logging_config.service_name.clone(),
                        service_version: logging_config.service_version.clone(),
                    }),
            )
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().with_writer(std::io::stderr).pretty())
            .try_init(),
    };

    result.map_err(|e| format!("Failed to install log subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(" Debug ").unwrap(), LevelFilter::DEBUG);
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn test_render_renames_known_fields() {
        let formatter = JsonLineFormatter {
            service_name: "shelfclient".to_string(),
            service_version: "0.1.0".to_string(),
        };
        let mut fields = Map::new();
        fields.insert("message".to_string(), Value::from("request finished"));
        fields.insert("path".to_string(), Value::from("/books/"));
        fields.insert("status".to_string(), Value::from(200u64));

        let json = formatter.render(&Level::INFO, "shelfclient::client", "event", fields);

        assert_eq!(json["body"], "request finished");
        assert_eq!(json["severity_number"], 9);
        assert_eq!(json["resource"]["service.name"], "shelfclient");
        assert_eq!(json["attributes"]["url.path"], "/books/");
        assert_eq!(json["attributes"]["http.response.status_code"], 200);
        assert!(json["attributes"].get("path").is_none());
    }
}
