//! Gridview Sampler
//!
//! The tabular sampling engine: declarative column metadata, the
//! snapshot-to-table transformation pipeline (including rate-of-change
//! computation between successive samples), the stable sorting engine and
//! the periodic sampler runtime that pushes tables through a
//! [`Dataview`](gridview_client::Dataview) handle.
//!
//! # Data flow
//!
//! Plugin code produces a [`Record`] or keyed snapshot; the pipeline
//! renders a [`Table`] using the [`ColumnSet`]; the [`Sampler`] runtime
//! pushes that table to the remote dataview on each tick.
//!
//! # Components
//!
//! - [`Schema`] / [`ColumnSet`] — per-field directives to ordered columns
//! - [`Value`] / [`Record`] — typed row data
//! - [`Table`] and the `record_table` / `snapshot_table` / `delta_table`
//!   pipeline on [`ColumnSet`]
//! - [`Sampler`] / [`SamplerPlugin`] — the initialize-then-sample-forever
//!   lifecycle

pub mod columns;
pub mod record;
pub mod sampler;
mod sort;
pub mod table;

pub use columns::{Column, ColumnSet, Schema, SortRole, OMIT};
pub use record::{Record, Value};
pub use sampler::{publish_table, PluginSetup, Sampler, SamplerPlugin, SamplerState};
pub use table::Table;
