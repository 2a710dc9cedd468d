//! HTTP transport for the method-call protocol.
//!
//! One POST per operation against the agent's endpoint. The connection is
//! configured once, before any sampler starts, and shared read-only
//! afterwards; that write-once/read-many discipline is what makes it safe
//! to hold behind an `Arc` with no locking.

use gridview_common::{marshal_params, GridviewError, MethodCall, MethodReply, ReplyValue, Result};
use serde_json::Value;
use tracing::debug;

/// A client for one monitoring agent endpoint.
pub struct Connection {
    endpoint: String,
    client: reqwest::Client,
}

impl Connection {
    /// Creates a connection to `endpoint` (e.g. `"https://probe:7036/rpc"`).
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| GridviewError::Transport(e.to_string()))?;
        Ok(Connection {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Disables TLS certificate verification for the lifetime of this
    /// connection.
    ///
    /// This is an explicit, deliberate call, never a default. It must be
    /// made before the connection is shared with any sampler.
    pub fn allow_unverified_certificates(mut self) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| GridviewError::Transport(e.to_string()))?;
        Ok(self)
    }

    /// Invokes `method` with the given positional arguments.
    ///
    /// Arguments are kind-checked and marshalled before any I/O; an
    /// unsupported kind fails with [`GridviewError::Marshal`] without a
    /// request being issued. A reply carrying a fault is returned as
    /// [`GridviewError::Fault`], never as a value.
    pub async fn call(&self, method: &str, args: &[Value]) -> Result<Option<ReplyValue>> {
        let params = marshal_params(args)?;
        let call = MethodCall::new(method, params);
        debug!(method, params = call.params.len(), "issuing method call");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&call)
            .send()
            .await
            .map_err(|e| GridviewError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GridviewError::Transport(format!(
                "{method}: HTTP {status}"
            )));
        }

        let reply: MethodReply = response
            .json()
            .await
            .map_err(|e| GridviewError::Transport(e.to_string()))?;
        reply.into_result()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
