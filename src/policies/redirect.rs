//! Redirect following with loop short-circuit.

use async_trait::async_trait;
use url::Url;

use crate::http::{HttpRequest, HttpResponse};
use crate::pipeline::{Next, Policy};
use crate::Result;

/// Follows 3xx responses by re-running the rest of the chain.
///
/// A redirect pointing at the location followed on the previous hop ends
/// the loop and is returned as-is, so a self-redirect costs two sends.
/// Responses other than redirects, `304 Not Modified`, and redirects without
/// a usable `Location` are returned unchanged.
///
/// Only the URL changes between hops. The method, headers and body are
/// resent as-is, including after `303 See Other`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedirectPolicy {
    max_redirects: Option<usize>,
}

/// Outcome of inspecting one response.
#[derive(Debug, PartialEq, Eq)]
enum RedirectState {
    RedirectReceived(Url),
    Terminal,
}

impl RedirectPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after `max` followed redirects and return the last 3xx.
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = Some(max);
        self
    }

    pub fn max_redirects(&self) -> Option<usize> {
        self.max_redirects
    }

    fn next_state(
        &self,
        current: &Url,
        response: &HttpResponse,
        last_location: Option<&Url>,
        followed: usize,
    ) -> RedirectState {
        if !response.is_redirect() {
            return RedirectState::Terminal;
        }

        let Some(location) = response.location() else {
            tracing::warn!(
                status = response.status().as_u16(),
                url = %current,
                "Redirect without Location header"
            );
            return RedirectState::Terminal;
        };

        let target = match current.join(&location) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(location = %location, error = %e, "Unresolvable redirect location");
                return RedirectState::Terminal;
            }
        };

        if last_location == Some(&target) {
            tracing::debug!(location = %target, "Redirect loop detected");
            return RedirectState::Terminal;
        }

        if self.max_redirects.is_some_and(|max| followed >= max) {
            tracing::debug!(followed, "Redirect limit reached");
            return RedirectState::Terminal;
        }

        RedirectState::RedirectReceived(target)
    }
}

#[async_trait]
impl Policy for RedirectPolicy {
    fn name(&self) -> &str {
        "redirect"
    }

    async fn process(&self, mut request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        let mut last_location: Option<Url> = None;
        let mut followed = 0usize;

        loop {
            let response = next.run(request.clone()).await?;

            match self.next_state(request.url(), &response, last_location.as_ref(), followed) {
                RedirectState::RedirectReceived(target) => {
                    tracing::debug!(
                        status = response.status().as_u16(),
                        from = %request.url(),
                        to = %target,
                        "Following redirect"
                    );
                    request.set_url(target.clone());
                    last_location = Some(target);
                    followed += 1;
                }
                RedirectState::Terminal => return Ok(response),
            }
        }
    }
}
