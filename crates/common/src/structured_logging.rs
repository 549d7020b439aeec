use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, Write};
use std::str::FromStr;
use tracing::field::{Field, Visit};
use tracing::{span, Event, Level, Subscriber};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// One JSON log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLogEntry {
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ExecutionContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
}

/// Process-level context attached to JSON lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Correlation id of the compile or warehouse run
    pub request_id: Option<String>,
    pub app_version: String,
    pub hostname: String,
    pub pid: u32,
    pub thread_id: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            request_id: None,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            hostname: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            thread_id: format!("{:?}", std::thread::current().id()),
        }
    }
}

/// Timing fields lifted out of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub duration_ms: Option<u64>,
    /// Rows, keys or channels handled by the operation
    pub items_processed: Option<u64>,
}

/// Layer writing one JSON object per event, to stderr unless another writer
/// is given
///
/// Stdout stays reserved for command output such as the compiled payload.
pub struct JsonFormatter<W = fn() -> io::Stderr> {
    make_writer: W,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            make_writer: io::stderr,
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> JsonFormatter<W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    pub fn with_writer(make_writer: W) -> Self {
        Self { make_writer }
    }
}

/// `request_id` recorded on a span, looked up by events inside it
struct SpanRequestId(String);

fn remember_request_id<S>(id: &span::Id, visitor: JsonVisitor, ctx: &Context<'_, S>)
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let Some(request_id) = visitor.fields.get("request_id").and_then(Value::as_str) else {
        return;
    };
    if let Some(span) = ctx.span(id) {
        span.extensions_mut()
            .replace(SpanRequestId(request_id.to_string()));
    }
}

impl<S, W> Layer<S> for JsonFormatter<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        attrs.record(&mut visitor);
        remember_request_id(id, visitor, &ctx);
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        values.record(&mut visitor);
        remember_request_id(id, visitor, &ctx);
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        // innermost span first
        let span_request_id = ctx.event_scope(event).and_then(|mut scope| {
            scope.find_map(|span| {
                span.extensions()
                    .get::<SpanRequestId>()
                    .map(|request_id| request_id.0.clone())
            })
        });

        let entry = visitor.into_entry(
            event.metadata().level(),
            event.metadata().target(),
            span_request_id,
        );

        if let Ok(json) = serde_json::to_string(&entry) {
            let _ = writeln!(self.make_writer.make_writer(), "{}", json);
        }
    }
}

#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: HashMap<String, Value>,
}

impl Visit for JsonVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(
                field.name().to_string(),
                Value::String(format!("{:?}", value)),
            );
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields.insert(field.name().to_string(), Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), Value::Bool(value));
    }
}

impl JsonVisitor {
    /// Event fields win over the request id inherited from the span scope
    fn into_entry(
        self,
        level: &Level,
        target: &str,
        span_request_id: Option<String>,
    ) -> StructuredLogEntry {
        let performance = self.extract_performance_metrics();
        let context = ExecutionContext {
            request_id: self
                .fields
                .get("request_id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or(span_request_id),
            ..ExecutionContext::default()
        };

        StructuredLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: level_label(level).to_string(),
            target: target.to_string(),
            message: self.message.unwrap_or_default(),
            fields: self.fields,
            context: Some(context),
            performance,
        }
    }

    fn extract_performance_metrics(&self) -> Option<PerformanceMetrics> {
        let metrics = PerformanceMetrics {
            duration_ms: self.fields.get("duration_ms").and_then(Value::as_u64),
            items_processed: self.fields.get("items_count").and_then(Value::as_u64),
        };

        if metrics.duration_ms.is_some() || metrics.items_processed.is_some() {
            Some(metrics)
        } else {
            None
        }
    }
}

fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub json_output: bool,
    /// Only honoured for the human-readable format
    pub color_output: bool,
    pub include_line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_output: false,
            color_output: true,
            include_line_numbers: cfg!(debug_assertions),
        }
    }
}

impl LoggingConfig {
    /// Build from the textual settings of the configuration file
    pub fn from_settings(level: &str, json_output: bool, color_output: bool) -> anyhow::Result<Self> {
        let level = Level::from_str(level.trim())
            .map_err(|_| anyhow::anyhow!("Unknown log level '{}'", level))?;
        Ok(Self {
            level,
            json_output,
            color_output,
            ..Self::default()
        })
    }

    /// Raise the level to DEBUG, as the CLI `--verbose` flag does
    pub fn verbose(mut self) -> Self {
        if self.level < Level::DEBUG {
            self.level = Level::DEBUG;
        }
        self
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_structured_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    if config.json_output {
        let subscriber = Registry::default().with(env_filter).with(JsonFormatter::new());
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_line_number(config.include_line_numbers)
            .with_ansi(config.color_output)
            .with_span_events(FmtSpan::CLOSE);

        let subscriber = Registry::default().with(env_filter).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Logs the duration and outcome of one operation
pub struct OperationTimer {
    start: std::time::Instant,
    operation_name: String,
    fields: HashMap<String, Value>,
}

impl OperationTimer {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation_name: operation_name.into(),
            fields: HashMap::new(),
        }
    }

    pub fn add_field(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> PerformanceMetrics {
        self.finish_with_result(Ok::<(), String>(()))
    }

    pub fn finish_with_result<T>(self, result: Result<T, impl std::fmt::Display>) -> PerformanceMetrics {
        let duration_ms = self.start.elapsed().as_millis() as u64;
        let items_count = self.fields.get("items_count").and_then(Value::as_u64);

        match result {
            Ok(_) => {
                tracing::info!(
                    operation = %self.operation_name,
                    duration_ms = duration_ms,
                    success = true,
                    fields = ?self.fields,
                    "Operation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    operation = %self.operation_name,
                    duration_ms = duration_ms,
                    success = false,
                    error = %e,
                    fields = ?self.fields,
                    "Operation failed"
                );
            }
        }

        PerformanceMetrics {
            duration_ms: Some(duration_ms),
            items_processed: items_count,
        }
    }
}

/// Correlation id carried through one CLI invocation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub start_time: std::time::Instant,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Span tagging every event of the invocation with the request id
    pub fn span(&self, command: &str) -> tracing::Span {
        tracing::info_span!("occp", request_id = %self.request_id, command = command)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
