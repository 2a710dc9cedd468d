//! Stable row sorting.
//!
//! Numeric roles parse cells as floating point; an unparsable cell sorts
//! as zero rather than failing (a lenient policy carried over from the
//! protocol's history) and numeric ties fall back to lexical comparison
//! of the same cell, keeping the order total and deterministic.

use std::cmp::Ordering;

use crate::columns::SortRole;

/// Stable-sorts `rows` by the cell at `column` under `role`.
/// [`SortRole::None`] behaves as ascending lexical.
pub(crate) fn sort_rows(rows: &mut [Vec<String>], column: usize, role: SortRole) {
    match role {
        SortRole::None | SortRole::Asc => {
            rows.sort_by(|a, b| lexical(a, b, column));
        }
        SortRole::Desc => {
            rows.sort_by(|a, b| lexical(b, a, column));
        }
        SortRole::AscNumeric => {
            rows.sort_by(|a, b| numeric(a, b, column));
        }
        SortRole::DescNumeric => {
            rows.sort_by(|a, b| numeric(b, a, column));
        }
    }
}

fn cell<'a>(row: &'a [String], column: usize) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

fn lexical(a: &[String], b: &[String], column: usize) -> Ordering {
    cell(a, column).cmp(cell(b, column))
}

fn numeric(a: &[String], b: &[String], column: usize) -> Ordering {
    let left = cell(a, column);
    let right = cell(b, column);
    let lv: f64 = left.trim().parse().unwrap_or(0.0);
    let rv: f64 = right.trim().parse().unwrap_or(0.0);
    lv.partial_cmp(&rv)
        .unwrap_or(Ordering::Equal)
        .then_with(|| left.cmp(right))
}
