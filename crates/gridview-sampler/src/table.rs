//! Snapshot-to-table transformation pipeline.
//!
//! Three entry points on [`ColumnSet`], all producing a [`Table`]:
//!
//! - [`record_table`](ColumnSet::record_table) — one record, one row, no
//!   sorting
//! - [`snapshot_table`](ColumnSet::snapshot_table) — one row per keyed
//!   record, sorted on the designated sort key
//! - [`delta_table`](ColumnSet::delta_table) — rate-of-change between two
//!   keyed snapshots, normalized by the elapsed interval
//!
//! Omitted columns never contribute cells; a field missing from a record
//! renders as an empty cell (the pipeline is a view layer, shape
//! enforcement happens when the column set is built).

use std::collections::HashMap;
use std::time::Duration;

use gridview_common::{GridviewError, Result};

use crate::columns::ColumnSet;
use crate::record::{format_float, format_value, Record};
use crate::sort::sort_rows;

/// A rendered table: ordered display names plus formatted string rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ColumnSet {
    /// Renders a single record as a one-row table.
    pub fn record_table(&self, record: &Record) -> Table {
        Table {
            header: self.display_names().to_vec(),
            rows: vec![self.render_row(record)],
        }
    }

    /// Renders a keyed snapshot, one row per entry, sorted on the
    /// designated sort key.
    pub fn snapshot_table(&self, snapshot: &HashMap<String, Record>) -> Table {
        let mut rows: Vec<_> = snapshot.values().map(|r| self.render_row(r)).collect();
        let (column, role) = self.sort_spec();
        sort_rows(&mut rows, column, role);
        Table {
            header: self.display_names().to_vec(),
            rows,
        }
    }

    /// Renders the rate of change between two keyed snapshots.
    ///
    /// For each key in `new`: when the old snapshot holds a matching
    /// record, every numeric field becomes `(new - old) / interval`
    /// seconds; non-numeric fields render the new value directly. A key
    /// absent from `old` renders the new record as-is. A zero interval
    /// normalizes to one second, so the result equals the raw difference
    /// — the "true rate" and "raw counter diff" call sites deliberately
    /// share this one code path.
    ///
    /// Fails with [`GridviewError::TypeMismatch`] when old and new values
    /// for the same field have incompatible underlying types; this is
    /// fatal to the whole call, not recoverable per-field.
    pub fn delta_table(
        &self,
        new: &HashMap<String, Record>,
        old: &HashMap<String, Record>,
        interval: Duration,
    ) -> Result<Table> {
        let mut seconds = interval.as_secs_f64();
        if seconds == 0.0 {
            seconds = 1.0;
        }

        let mut rows = Vec::with_capacity(new.len());
        for (key, new_record) in new {
            match old.get(key) {
                Some(old_record) => {
                    rows.push(self.render_delta_row(key, new_record, old_record, seconds)?)
                }
                None => rows.push(self.render_row(new_record)),
            }
        }

        let (column, role) = self.sort_spec();
        sort_rows(&mut rows, column, role);
        Ok(Table {
            header: self.display_names().to_vec(),
            rows,
        })
    }

    fn render_row(&self, record: &Record) -> Vec<String> {
        self.columns()
            .iter()
            .filter(|c| !c.omitted)
            .map(|c| match record.get(&c.key) {
                Some(value) => format_value(&c.format, value),
                None => String::new(),
            })
            .collect()
    }

    fn render_delta_row(
        &self,
        key: &str,
        new: &Record,
        old: &Record,
        seconds: f64,
    ) -> Result<Vec<String>> {
        let mut row = Vec::new();
        for column in self.columns().iter().filter(|c| !c.omitted) {
            let Some(new_value) = new.get(&column.key) else {
                row.push(String::new());
                continue;
            };
            let cell = match old.get(&column.key) {
                Some(old_value) => {
                    if !new_value.compatible_with(old_value) {
                        return Err(GridviewError::TypeMismatch(format!(
                            "row {key} field {}: old is {}, new is {}",
                            column.key,
                            old_value.kind(),
                            new_value.kind()
                        )));
                    }
                    match (new_value.as_f64(), old_value.as_f64()) {
                        (Some(n), Some(o)) => format_float(&column.format, (n - o) / seconds),
                        _ => format_value(&column.format, new_value),
                    }
                }
                None => format_value(&column.format, new_value),
            };
            row.push(cell);
        }
        Ok(row)
    }
}
