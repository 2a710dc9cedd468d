//! Stream handle: append-only message publishing.

use std::time::Duration;

use gridview_common::Result;
use serde_json::json;

use crate::session::Session;

/// A named message stream owned by a session.
///
/// Stream-scoped method names are `entity.sampler.stream.<operation>`.
#[derive(Clone)]
pub struct Stream {
    session: Session,
    name: String,
}

impl Stream {
    pub fn new(session: Session, name: impl Into<String>) -> Self {
        Stream {
            session,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn method(&self, operation: &str) -> String {
        self.session.method(&format!("{}.{}", self.name, operation))
    }

    /// Appends one message to the stream.
    pub async fn write_message(&self, text: &str) -> Result<()> {
        self.session
            .connection()
            .call(&self.method("addMessage"), &[json!(text)])
            .await?;
        Ok(())
    }

    /// Registers this stream for heartbeat monitoring at `interval`.
    pub async fn sign_on(&self, interval: Duration) -> Result<()> {
        self.session
            .connection()
            .call(&self.method("signOn"), &[json!(interval.as_secs())])
            .await?;
        Ok(())
    }

    pub async fn sign_off(&self) -> Result<()> {
        self.session
            .connection()
            .call(&self.method("signOff"), &[])
            .await?;
        Ok(())
    }

    pub async fn heartbeat(&self) -> Result<()> {
        self.session
            .connection()
            .call(&self.method("heartbeat"), &[])
            .await?;
        Ok(())
    }
}
