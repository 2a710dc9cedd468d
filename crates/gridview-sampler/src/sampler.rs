//! Periodic sampler runtime.
//!
//! One sampler owns one column set and one dataview handle and runs the
//! initialize-then-sample-forever lifecycle:
//!
//! ```text
//! Unstarted -> Initialized -> Sampling -> Stopped
//! ```
//!
//! The sampling loop is a single tokio task with no internal concurrency:
//! hooks and pushes run strictly in program order, so tick N's push
//! completes before tick N+1's hook runs. Multiple samplers run as fully
//! independent tasks sharing only the read-only connection.
//!
//! One failed sample permanently ends the task (fail-fast, visible
//! failure over silently degraded data); the supervisor sees it through
//! [`Sampler::join`] and may call [`Sampler::start`] again to rebuild
//! the view and resume sampling. Cooperative shutdown
//! goes through the [`CancellationToken`] handed to [`Sampler::start`],
//! checked at every tick boundary.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gridview_client::{Dataview, Session};
use gridview_common::{GridviewError, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::columns::ColumnSet;
use crate::table::Table;

/// Everything the init hook produces: the immutable column metadata and
/// any headline values to publish before the first tick.
pub struct PluginSetup {
    pub columns: ColumnSet,
    pub headlines: Vec<(String, String)>,
}

impl PluginSetup {
    pub fn new(columns: ColumnSet) -> Self {
        PluginSetup {
            columns,
            headlines: Vec::new(),
        }
    }

    pub fn headline(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headlines.push((name.into(), value.into()));
        self
    }
}

/// A sampler data source. Both hooks are required: a plugin that cannot
/// meaningfully sample is a configuration error, not a silent no-op.
#[async_trait]
pub trait SamplerPlugin: Send {
    /// Runs once before sampling starts; produces the column set and any
    /// headlines. A failure here aborts [`Sampler::start`].
    async fn init_sample(&mut self) -> Result<PluginSetup>;

    /// Runs on every tick. The hook is expected to push a table through
    /// the dataview itself (see [`publish_table`]). An error permanently
    /// stops this sampler's task.
    async fn do_sample(&mut self, columns: &ColumnSet, view: &Dataview) -> Result<()>;
}

/// Pushes a rendered table through a dataview handle.
pub async fn publish_table(view: &Dataview, table: &Table) -> Result<()> {
    view.update_table(&table.header, &table.rows).await
}

/// Sampler lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SamplerState {
    Unstarted = 0,
    Initialized = 1,
    Sampling = 2,
    Stopped = 3,
}

/// Shared with the sampling task so the owner can observe transitions.
struct StateCell(AtomicU8);

impl StateCell {
    fn new() -> Self {
        StateCell(AtomicU8::new(SamplerState::Unstarted as u8))
    }

    fn set(&self, state: SamplerState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    fn get(&self) -> SamplerState {
        match self.0.load(Ordering::SeqCst) {
            0 => SamplerState::Unstarted,
            1 => SamplerState::Initialized,
            2 => SamplerState::Sampling,
            _ => SamplerState::Stopped,
        }
    }
}

const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// A named data source that owns one dataview and samples periodically.
pub struct Sampler {
    view: Dataview,
    interval: Duration,
    plugin: Option<Box<dyn SamplerPlugin>>,
    state: Arc<StateCell>,
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<Box<dyn SamplerPlugin>>>,
    opened: bool,
}

impl Sampler {
    pub fn new(
        session: Session,
        group: impl Into<String>,
        view: impl Into<String>,
        plugin: Box<dyn SamplerPlugin>,
    ) -> Self {
        Sampler {
            view: Dataview::new(session, group, view),
            interval: DEFAULT_INTERVAL,
            plugin: Some(plugin),
            state: Arc::new(StateCell::new()),
            token: None,
            handle: None,
            opened: false,
        }
    }

    /// Sets the sampling interval. Takes effect at the next
    /// [`start`](Self::start), including a restart after the task stopped.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn state(&self) -> SamplerState {
        self.state.get()
    }

    pub fn view(&self) -> &Dataview {
        &self.view
    }

    /// Runs the init hook, opens the remote view and spawns the periodic
    /// sampling task.
    ///
    /// Init-hook and view-open failures surface synchronously, no task is
    /// spawned, and the plugin stays with the sampler so the call can be
    /// retried. On success the task samples at the configured interval
    /// until the token is cancelled or the sample hook fails; once the
    /// task has stopped, `start` may be called again to rebuild it.
    pub async fn start(&mut self, token: CancellationToken) -> Result<()> {
        if self.state.get() == SamplerState::Sampling {
            return Err(GridviewError::Lifecycle(format!(
                "sampler for view {} already sampling",
                self.view.name()
            )));
        }
        // Recover the plugin from a previously finished task.
        self.join().await;
        let mut plugin = self.plugin.take().ok_or_else(|| {
            GridviewError::Lifecycle(format!(
                "sampler for view {} has no plugin",
                self.view.name()
            ))
        })?;

        let setup = match plugin.init_sample().await {
            Ok(setup) => setup,
            Err(e) => {
                self.plugin = Some(plugin);
                return Err(e);
            }
        };
        self.state.set(SamplerState::Initialized);

        if let Err(e) = self.open_view(&setup).await {
            self.plugin = Some(plugin);
            return Err(e);
        }

        let columns = Arc::new(setup.columns);
        let view = self.view.clone();
        let state = Arc::clone(&self.state);
        let interval = self.interval;
        let token = token.child_token();
        self.token = Some(token.clone());

        self.state.set(SamplerState::Sampling);
        info!(view = %view.name(), interval_secs = interval.as_secs_f64(), "sampler started");

        self.handle = Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately.
            tick.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!(view = %view.name(), "sampler cancelled");
                        break;
                    }
                    _ = tick.tick() => {
                        if let Err(e) = plugin.do_sample(&columns, &view).await {
                            error!(view = %view.name(), error = %e, "sample failed, stopping sampler");
                            break;
                        }
                        debug!(view = %view.name(), "sample pushed");
                    }
                }
            }
            state.set(SamplerState::Stopped);
            plugin
        }));

        Ok(())
    }

    // Remove-then-create: a stale view with the old column shape would
    // reject the new header.
    async fn open_view(&mut self, setup: &PluginSetup) -> Result<()> {
        self.view.ensure().await?;
        self.opened = true;
        for (name, value) in &setup.headlines {
            self.view.headline(name, Some(value)).await?;
        }
        Ok(())
    }

    /// Waits for the sampling task to finish (cancellation or a failed
    /// sample). Supervisors use this to notice fail-fast terminations;
    /// the plugin is handed back so [`start`](Self::start) can rebuild.
    pub async fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Ok(plugin) = handle.await {
                self.plugin = Some(plugin);
            }
        }
    }

    /// Stops sampling and tears down the remote view, best-effort.
    ///
    /// Idempotent, and a no-op if the view was never validly opened.
    /// Remote teardown failures are logged, never propagated, so close
    /// cannot hang or fail the caller.
    pub async fn close(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.join().await;

        if !self.opened {
            self.state.set(SamplerState::Stopped);
            return;
        }
        self.opened = false;

        if let Err(e) = self.view.remove().await {
            warn!(view = %self.view.name(), error = %e, "remote view teardown failed");
        }
        self.state.set(SamplerState::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_cell_transitions() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), SamplerState::Unstarted);
        cell.set(SamplerState::Initialized);
        assert_eq!(cell.get(), SamplerState::Initialized);
        cell.set(SamplerState::Sampling);
        assert_eq!(cell.get(), SamplerState::Sampling);
        cell.set(SamplerState::Stopped);
        assert_eq!(cell.get(), SamplerState::Stopped);
    }

    #[test]
    fn plugin_setup_collects_headlines() {
        let columns =
            ColumnSet::from_schema(&crate::columns::Schema::new().field("a", "")).unwrap();
        let setup = PluginSetup::new(columns)
            .headline("uptime", "0")
            .headline("version", "0.3.0");
        assert_eq!(setup.headlines.len(), 2);
        assert_eq!(setup.headlines[0].0, "uptime");
    }
}
