/*!
 * Structured Tracing
 * Subscriber setup and dispatch spans using the tracing crate
 */

use crate::core::limits::TRACE_JSON_ENV;
use crate::core::GreenMode;
use std::time::Instant;
use tracing::{debug, info, span, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - GREEN_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        // Thread names show which backend ran an operation
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Span covering one green dispatch, from resolution to result or accessor
pub struct DispatchSpan {
    span: Span,
    start: Instant,
    operation: &'static str,
}

impl DispatchSpan {
    pub fn new(operation: &'static str) -> Self {
        let span = span!(
            Level::DEBUG,
            "green_dispatch",
            operation = operation,
            mode = tracing::field::Empty,
            outcome = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            operation,
        }
    }

    /// Record the mode the call resolved to
    pub fn record_mode(&self, mode: GreenMode) {
        self.span.record("mode", mode.as_str());
    }

    /// Record how the dispatch ended: `ready`, `pending` or `error`
    pub fn record_outcome(&self, outcome: &'static str) {
        self.span.record("outcome", outcome);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for DispatchSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Green dispatch finished"
        );
    }
}

/// Create a dispatch span for `operation`
pub fn span_dispatch(operation: &'static str) -> DispatchSpan {
    DispatchSpan::new(operation)
}
