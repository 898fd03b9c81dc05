/*!
 * Structured Tracing
 * Logging setup and task spans using the tracing crate
 *
 * Diagnostics go to stderr so the demonstration output on stdout stays
 * readable and pipeable.
 */

use std::time::Instant;
use tracing::{debug, info, span, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Environment variable that switches the log format to JSON
pub const TRACE_JSON_ENV: &str = "PROCLAB_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - PROCLAB_TRACE_JSON: Enable JSON output (default: false)
///
/// Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        debug!(json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique trace ID for correlating a task's log lines
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one lab task from start to report
pub struct TaskSpan {
    span: tracing::Span,
    start: Instant,
    trace_id: String,
}

impl TaskSpan {
    pub fn new(task: &str) -> Self {
        let trace_id = generate_trace_id();
        let span = span!(
            Level::INFO,
            "task",
            trace_id = %trace_id,
            task = task,
            pid = crate::core::current_pid(),
            children = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            trace_id,
        }
    }

    /// Record how many children the task created
    pub fn record_children(&self, count: usize) {
        self.span.record("children", count);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for TaskSpan {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.span.record("duration_ms", elapsed.as_millis() as u64);
        let _entered = self.span.enter();
        info!(
            trace_id = %self.trace_id,
            duration_ms = elapsed.as_millis() as u64,
            "task finished"
        );
    }
}
