//! Request spans and timing.

use tracing::{info_span, Span};

/// Create a span for one HTTP exchange.
pub fn request_span(method: &str, url: &str) -> Span {
    info_span!("request", method = %method, url = %url, status = tracing::field::Empty)
}

/// Record the response status on a request span.
pub fn record_status(span: &Span, status: u16) {
    span.record("status", status);
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
        duration
    }
}
