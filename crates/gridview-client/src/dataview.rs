//! Dataview handle: a named remote table plus headlines.
//!
//! Existence is never cached. The peer may purge a view out-of-band (the
//! monitored process restarting is the usual cause), so every mutating and
//! query operation reverifies existence remotely first and fails with
//! [`GridviewError::ViewGone`] when the view has disappeared. Only
//! creation and removal tolerate absence.

use chrono::{DateTime, Utc};
use gridview_common::{GridviewError, Result};
use serde_json::json;
use tracing::warn;

use crate::session::Session;

/// A named, remotely-hosted table associated with one session.
///
/// The canonical remote name is `"{group}-{view}"`; view-scoped method
/// names are `entity.sampler.group-view.<operation>`.
#[derive(Clone)]
pub struct Dataview {
    session: Session,
    group: String,
    view: String,
}

impl Dataview {
    pub fn new(session: Session, group: impl Into<String>, view: impl Into<String>) -> Self {
        Dataview {
            session,
            group: group.into(),
            view: view.into(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Canonical remote view name, `"{group}-{view}"`.
    pub fn name(&self) -> String {
        format!("{}-{}", self.group, self.view)
    }

    fn method(&self, operation: &str) -> String {
        self.session
            .method(&format!("{}.{}", self.name(), operation))
    }

    /// Probes whether the view exists on the agent.
    ///
    /// Never errors: a transport failure is logged and reported as absent.
    pub async fn exists(&self) -> bool {
        let probe = self
            .session
            .connection()
            .call(&self.session.method("viewExists"), &[json!(self.name())])
            .await;
        match probe {
            Ok(Some(value)) => value.as_bool().unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                warn!(view = %self.name(), error = %e, "view existence probe failed");
                false
            }
        }
    }

    async fn require(&self, operation: &str) -> Result<()> {
        if !self.exists().await {
            return Err(GridviewError::ViewGone(format!(
                "{}: view {} no longer exists on agent",
                operation,
                self.name()
            )));
        }
        Ok(())
    }

    /// Creates the view on the agent.
    pub async fn create(&self) -> Result<()> {
        self.session
            .connection()
            .call(
                &self.session.method("createView"),
                &[json!(self.view), json!(self.group)],
            )
            .await?;
        Ok(())
    }

    /// Removes the view from the agent. Absence is tolerated.
    pub async fn remove(&self) -> Result<()> {
        if !self.exists().await {
            return Ok(());
        }
        self.session
            .connection()
            .call(
                &self.session.method("removeView"),
                &[json!(self.view), json!(self.group)],
            )
            .await?;
        Ok(())
    }

    /// Remove-then-create. Use this when the field shape may have changed:
    /// the agent cannot rename columns in place, so a stale view with the
    /// old column set must go first.
    pub async fn ensure(&self) -> Result<()> {
        self.remove().await?;
        self.create().await
    }

    /// Replaces the entire table body.
    ///
    /// The header travels as the first table row. The agent rejects a
    /// header whose column set differs from the one the view was created
    /// with (a documented remote limitation); callers needing a schema
    /// change must [`ensure`](Self::ensure) instead.
    pub async fn update_table(&self, header: &[String], rows: &[Vec<String>]) -> Result<()> {
        self.require("updateEntireTable").await?;
        let mut table = Vec::with_capacity(rows.len() + 1);
        table.push(json!(header));
        table.extend(rows.iter().map(|row| json!(row)));
        self.session
            .connection()
            .call(&self.method("updateEntireTable"), &[json!(table)])
            .await?;
        Ok(())
    }

    pub async fn update_cell(&self, row: &str, column: &str, value: &str) -> Result<()> {
        self.require("updateTableCell").await?;
        self.session
            .connection()
            .call(
                &self.method("updateTableCell"),
                &[json!(row), json!(column), json!(value)],
            )
            .await?;
        Ok(())
    }

    pub async fn add_row(&self, name: &str) -> Result<()> {
        self.require("addTableRow").await?;
        self.session
            .connection()
            .call(&self.method("addTableRow"), &[json!(name)])
            .await?;
        Ok(())
    }

    pub async fn remove_row(&self, name: &str) -> Result<()> {
        self.require("removeTableRow").await?;
        self.session
            .connection()
            .call(&self.method("removeTableRow"), &[json!(name)])
            .await?;
        Ok(())
    }

    pub async fn update_row(&self, name: &str, values: &[String]) -> Result<()> {
        self.require("updateTableRow").await?;
        self.session
            .connection()
            .call(
                &self.method("updateTableRow"),
                &[json!(name), json!(values)],
            )
            .await?;
        Ok(())
    }

    pub async fn add_column(&self, name: &str) -> Result<()> {
        self.require("addTableColumn").await?;
        self.session
            .connection()
            .call(&self.method("addTableColumn"), &[json!(name)])
            .await?;
        Ok(())
    }

    pub async fn row_names(&self) -> Result<Vec<String>> {
        self.require("getRowNames").await?;
        self.string_list("getRowNames", &[]).await
    }

    /// Names of rows whose last update is older than the given instant.
    pub async fn row_names_older_than(&self, instant: DateTime<Utc>) -> Result<Vec<String>> {
        self.require("getRowNamesOlderThan").await?;
        self.string_list("getRowNamesOlderThan", &[json!(instant.timestamp())])
            .await
    }

    pub async fn count_rows(&self) -> Result<i64> {
        self.require("getRowCount").await?;
        self.count("getRowCount").await
    }

    pub async fn column_names(&self) -> Result<Vec<String>> {
        self.require("getColumnNames").await?;
        self.string_list("getColumnNames", &[]).await
    }

    pub async fn count_columns(&self) -> Result<i64> {
        self.require("getColumnCount").await?;
        self.count("getColumnCount").await
    }

    /// Idempotent headline upsert: creates the headline if absent, then
    /// sets its value if one was supplied.
    pub async fn headline(&self, name: &str, value: Option<&str>) -> Result<()> {
        self.require("addHeadline").await?;
        let existing = self.string_list("getHeadlineNames", &[]).await?;
        if !existing.iter().any(|h| h == name) {
            self.session
                .connection()
                .call(&self.method("addHeadline"), &[json!(name)])
                .await?;
        }
        if let Some(value) = value {
            self.session
                .connection()
                .call(&self.method("updateHeadline"), &[json!(name), json!(value)])
                .await?;
        }
        Ok(())
    }

    pub async fn remove_headline(&self, name: &str) -> Result<()> {
        self.require("removeHeadline").await?;
        self.session
            .connection()
            .call(&self.method("removeHeadline"), &[json!(name)])
            .await?;
        Ok(())
    }

    pub async fn headline_names(&self) -> Result<Vec<String>> {
        self.require("getHeadlineNames").await?;
        self.string_list("getHeadlineNames", &[]).await
    }

    pub async fn count_headlines(&self) -> Result<i64> {
        self.require("getHeadlineCount").await?;
        self.count("getHeadlineCount").await
    }

    async fn string_list(&self, operation: &str, args: &[serde_json::Value]) -> Result<Vec<String>> {
        let reply = self
            .session
            .connection()
            .call(&self.method(operation), args)
            .await?;
        match reply {
            Some(value) => value.into_string_list(),
            None => Ok(Vec::new()),
        }
    }

    async fn count(&self, operation: &str) -> Result<i64> {
        let reply = self
            .session
            .connection()
            .call(&self.method(operation), &[])
            .await?;
        match reply {
            Some(value) => value.as_int(),
            None => Ok(0),
        }
    }
}
