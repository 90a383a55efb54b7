//! Unified JSON logging.
//!
//! Log format:
//! ```json
//! {"ts":"2024-12-28T15:04:05.123Z","level":"info","type":"app","msg":"Framework initialized","ctx":{"service":"caspar"},"data":{}}
//! ```
//!
//! Events with target `access` become access lines whose message is built
//! from their `method`, `path` and `status` fields.

use std::collections::HashMap;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::core::Iso8601Timestamp;

/// Target used for per-request access lines.
pub const ACCESS_TARGET: &str = "access";

/// Install the global subscriber described by `config`.
///
/// Fails if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("caspar=info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .event_format(JsonFormatter::new(config.service_name.clone())),
            )
            .try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}

/// Custom JSON formatter for tracing.
pub struct JsonFormatter {
    service_name: String,
}

impl JsonFormatter {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Build the JSON line for one event's collected fields.
    fn entry(
        &self,
        ts: &str,
        level: &Level,
        target: &str,
        visitor: FieldVisitor,
    ) -> serde_json::Value {
        let level_str = match *level {
            Level::TRACE | Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };

        let log_type = if target == ACCESS_TARGET {
            "access"
        } else if *level == Level::ERROR {
            "error"
        } else {
            "app"
        };

        let FieldVisitor {
            message,
            mut fields,
        } = visitor;

        let msg = if log_type == "access" {
            let method = fields.get("method").and_then(|v| v.as_str()).unwrap_or("?");
            let path = fields.get("path").and_then(|v| v.as_str()).unwrap_or("?");
            let status = fields.get("status").and_then(|v| v.as_u64()).unwrap_or(0);
            format!("{} {} {}", method, path, status)
        } else {
            message.unwrap_or_default()
        };

        let mut ctx = serde_json::Map::new();
        ctx.insert("service".into(), serde_json::json!(self.service_name));
        if let Some(id) = fields.remove("request_id") {
            ctx.insert("request_id".into(), id);
        }

        serde_json::json!({
            "ts": ts,
            "level": level_str,
            "type": log_type,
            "msg": msg,
            "ctx": ctx,
            "data": fields,
        })
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        let ts = Iso8601Timestamp::now();
        let entry = self.entry(ts.as_str(), meta.level(), meta.target(), visitor);

        writeln!(writer, "{}", entry)
    }
}

/// Field visitor for collecting tracing fields.
struct FieldVisitor {
    message: Option<String>,
    fields: HashMap<String, serde_json::Value>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: None,
            fields: HashMap::new(),
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value).trim_matches('"').to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(format!("{:?}", value)),
            );
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(message: Option<&str>, fields: &[(&str, serde_json::Value)]) -> FieldVisitor {
        FieldVisitor {
            message: message.map(str::to_string),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_app_entry() {
        let fmt = JsonFormatter::new("caspar");
        let entry = fmt.entry(
            "2024-12-28T15:04:05.123Z",
            &Level::INFO,
            "caspar::bootstrap",
            visitor(
                Some("Framework initialized"),
                &[("environment", serde_json::json!("prod"))],
            ),
        );

        assert_eq!(entry["level"], "info");
        assert_eq!(entry["type"], "app");
        assert_eq!(entry["msg"], "Framework initialized");
        assert_eq!(entry["ctx"]["service"], "caspar");
        assert_eq!(entry["data"]["environment"], "prod");
    }

    #[test]
    fn test_access_entry_message() {
        let fmt = JsonFormatter::new("caspar");
        let entry = fmt.entry(
            "2024-12-28T15:04:05.123Z",
            &Level::INFO,
            ACCESS_TARGET,
            visitor(
                None,
                &[
                    ("method", serde_json::json!("GET")),
                    ("path", serde_json::json!("/health")),
                    ("status", serde_json::json!(200u64)),
                    ("request_id", serde_json::json!("abc")),
                ],
            ),
        );

        assert_eq!(entry["type"], "access");
        assert_eq!(entry["msg"], "GET /health 200");
        assert_eq!(entry["ctx"]["request_id"], "abc");
        assert!(entry["data"].get("request_id").is_none());
    }

    #[test]
    fn test_error_level_type() {
        let fmt = JsonFormatter::new("caspar");
        let entry = fmt.entry("ts", &Level::ERROR, "caspar::server", visitor(Some("boom"), &[]));
        assert_eq!(entry["type"], "error");
        assert_eq!(entry["level"], "error");
    }
}
