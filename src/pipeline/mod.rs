//! Ordered policy chain ending in a transport.
//!
//! A [`Pipeline`] owns a fixed list of [`Policy`] stages. Each stage receives
//! the request and a [`Next`] handle for the rest of the chain; it may modify
//! the request, call `next.run` any number of times, and inspect or replace
//! the response on the way back.

mod transport;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use transport::ReqwestTransport;

use crate::auth::AzureTokenCredentials;
use crate::http::{HttpRequest, HttpResponse};
use crate::network::HttpNetworkConfig;
use crate::policies::{
    AuthorizationPolicy, LoggingPolicy, RedirectPolicy, RequestIdPolicy, UserAgentPolicy,
};
use crate::{Error, Result};

/// One stage of the pipeline.
#[async_trait]
pub trait Policy: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn process(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse>;
}

/// Sends a fully prepared request over the wire.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// The remaining policies plus the transport.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    policies: &'a [Arc<dyn Policy>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub fn new(policies: &'a [Arc<dyn Policy>], transport: &'a dyn Transport) -> Self {
        Self {
            policies,
            transport,
        }
    }

    /// Run the rest of the chain. May be called more than once.
    pub async fn run(self, request: HttpRequest) -> Result<HttpResponse> {
        match self.policies.split_first() {
            Some((policy, rest)) => {
                policy
                    .process(request, Next::new(rest, self.transport))
                    .await
            }
            None => self.transport.send(request).await,
        }
    }

    /// Number of policies still to run.
    pub fn remaining(&self) -> usize {
        self.policies.len()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.policies.len())
            .field("transport", &self.transport)
            .finish()
    }
}

/// Per-call options for [`Pipeline::send_with_context`].
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub cancellation_token: CancellationToken,
    pub timeout: Option<Duration>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Overrides the pipeline's default timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Immutable policy chain. Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Pipeline {
    policies: Arc<[Arc<dyn Policy>]>,
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn policy_names(&self) -> Vec<&str> {
        self.policies.iter().map(|p| p.name()).collect()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.send_with_context(request, &Context::default()).await
    }

    /// Send with cancellation and an optional timeout.
    ///
    /// Cancelling drops the whole chain, including an in-flight token fetch.
    pub async fn send_with_context(
        &self,
        request: HttpRequest,
        context: &Context,
    ) -> Result<HttpResponse> {
        let timeout = context.timeout.or(self.timeout);
        let next = Next::new(&self.policies, self.transport.as_ref());

        let run = async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, next.run(request))
                    .await
                    .map_err(|_| Error::Timeout(limit))?,
                None => next.run(request).await,
            }
        };

        tokio::select! {
            biased;
            _ = context.cancellation_token.cancelled() => {
                tracing::debug!("Pipeline request cancelled");
                Err(Error::Cancelled)
            }
            result = run => result,
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("policies", &self.policy_names())
            .field("transport", &self.transport)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct PipelineBuilder {
    policies: Vec<Arc<dyn Policy>>,
    transport: Option<Arc<dyn Transport>>,
    network: HttpNetworkConfig,
    timeout: Option<Duration>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a policy. Policies run in the order they are added.
    pub fn policy<P: Policy + 'static>(mut self, policy: P) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }

    pub fn policy_arc(mut self, policy: Arc<dyn Policy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn transport_arc(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Network settings for the default reqwest transport.
    pub fn network(mut self, network: HttpNetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Request id, user agent, redirect, authorization, logging.
    ///
    /// Redirects sit before authorization so every hop gets a token for its
    /// own host.
    pub fn standard(self, credentials: Arc<AzureTokenCredentials>) -> Self {
        self.policy(RequestIdPolicy::new())
            .policy(UserAgentPolicy::default())
            .policy(RedirectPolicy::new())
            .policy(AuthorizationPolicy::new(credentials))
            .policy(LoggingPolicy::new())
    }

    pub fn build(self) -> Result<Pipeline> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_config(&self.network)?),
        };

        Ok(Pipeline {
            policies: self.policies.into(),
            transport,
            timeout: self.timeout,
        })
    }
}
