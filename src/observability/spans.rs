//! Structured span for one pipeline send.

use std::time::Instant;

use tracing::{Level, Span, field, span};

use crate::http::{HttpRequest, HttpResponse};

/// Span covering a request from the first policy to the final response.
///
/// Only the method, host and path are recorded. Query strings and header
/// values may carry secrets and never reach the span.
pub struct RequestSpan {
    span: Span,
    start: Instant,
}

impl RequestSpan {
    pub fn new(request: &HttpRequest) -> Self {
        let url = request.url();
        let span = span!(
            Level::INFO,
            "http.request",
            method = %request.method(),
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            otel.name = "http.request",
            status = field::Empty,
            latency_ms = field::Empty,
            error = field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
        }
    }

    pub fn record_response(&self, response: &HttpResponse) {
        self.span.record("status", response.status().as_u16());
    }

    pub fn record_error(&self, error: &crate::Error) {
        self.span.record("error", field::display(error));
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn finish(self) -> u64 {
        let latency_ms = self.elapsed_ms();
        self.span.record("latency_ms", latency_ms);
        latency_ms
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_request_span() {
        let request = HttpRequest::get("https://management.azure.com/subscriptions?token=x").unwrap();
        let span = RequestSpan::new(&request);
        span.record_response(&HttpResponse::new(StatusCode::OK));
        span.record_error(&crate::Error::Cancelled);
        span.finish();
    }
}
