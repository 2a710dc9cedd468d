//! Session handle: entity + sampler identity on the remote agent.

use std::sync::Arc;
use std::time::Duration;

use gridview_common::{GridviewError, Result};
use serde_json::json;
use tracing::warn;

use crate::transport::Connection;

/// A named sampler session on the remote agent.
///
/// The session is the root of the remote naming hierarchy: every dataview
/// and stream method name starts with `entity.sampler`.
#[derive(Clone)]
pub struct Session {
    connection: Arc<Connection>,
    entity: String,
    sampler: String,
}

impl Session {
    pub fn new(
        connection: Arc<Connection>,
        entity: impl Into<String>,
        sampler: impl Into<String>,
    ) -> Self {
        Session {
            connection,
            entity: entity.into(),
            sampler: sampler.into(),
        }
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn sampler(&self) -> &str {
        &self.sampler
    }

    /// The `entity.sampler` prefix under which all remote methods live.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.entity, self.sampler)
    }

    pub(crate) fn method(&self, operation: &str) -> String {
        format!("{}.{}", self.qualified_name(), operation)
    }

    /// Reads a named configuration parameter from the remote side.
    ///
    /// Fails with [`GridviewError::NotFound`] if the sampler or the
    /// parameter is unknown remotely.
    pub async fn parameter(&self, name: &str) -> Result<String> {
        if !self.exists().await {
            return Err(GridviewError::NotFound(format!(
                "sampler {} not known to agent",
                self.qualified_name()
            )));
        }
        let reply = self
            .connection
            .call(&self.method("getParameter"), &[json!(name)])
            .await
            .map_err(|e| match e {
                GridviewError::Fault { code, message } => GridviewError::NotFound(format!(
                    "parameter {name}: {code} {message}"
                )),
                other => other,
            })?;
        match reply {
            Some(value) => Ok(value.as_str()?.to_owned()),
            None => Err(GridviewError::NotFound(format!("parameter {name}"))),
        }
    }

    /// Registers this sampler for heartbeat monitoring at `interval`.
    ///
    /// The interval travels as whole seconds; a zero interval is dropped at
    /// marshal time and reads as "absent" on the remote side.
    pub async fn sign_on(&self, interval: Duration) -> Result<()> {
        self.connection
            .call(&self.method("signOn"), &[json!(interval.as_secs())])
            .await?;
        Ok(())
    }

    pub async fn sign_off(&self) -> Result<()> {
        self.connection.call(&self.method("signOff"), &[]).await?;
        Ok(())
    }

    pub async fn heartbeat(&self) -> Result<()> {
        self.connection.call(&self.method("heartbeat"), &[]).await?;
        Ok(())
    }

    /// Probes whether this sampler exists on the agent.
    ///
    /// Never errors: a transport failure is logged and reported as absent.
    pub async fn exists(&self) -> bool {
        let probe = self
            .connection
            .call("_agent.samplerExists", &[json!(self.qualified_name())])
            .await;
        match probe {
            Ok(Some(value)) => value.as_bool().unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                warn!(sampler = %self.qualified_name(), error = %e, "sampler existence probe failed");
                false
            }
        }
    }
}
