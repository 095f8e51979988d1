//! Request logging.

use async_trait::async_trait;
use tracing::Instrument;

use crate::http::{HttpRequest, HttpResponse};
use crate::observability::RequestSpan;
use crate::pipeline::{Next, Policy};
use crate::Result;

/// Wraps the rest of the chain in a [`RequestSpan`] and logs the outcome.
///
/// Placed last in the standard pipeline, so each redirect hop is logged on
/// its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingPolicy;

impl LoggingPolicy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Policy for LoggingPolicy {
    fn name(&self) -> &str {
        "logging"
    }

    async fn process(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        let span = RequestSpan::new(&request);
        let result = next.run(request).instrument(span.span().clone()).await;

        match result {
            Ok(ref response) => {
                span.record_response(response);
                let latency_ms = span.finish();
                tracing::debug!(
                    status = response.status().as_u16(),
                    latency_ms,
                    "Request completed"
                );
            }
            Err(ref e) => {
                span.record_error(e);
                let latency_ms = span.finish();
                tracing::warn!(error = %e, latency_ms, "Request failed");
            }
        }
        result
    }
}
