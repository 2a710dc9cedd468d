//! Column metadata model.
//!
//! A [`Schema`] is an ordered list of `(fieldKey, directive)` pairs; a
//! [`ColumnSet`] is the parsed, immutable result: ordered columns, the
//! rendering order of non-omitted display names, and the designated sort
//! key. A column set is built once per sampler and never mutated — the
//! remote side cannot rename columns in place, so a shape change means a
//! new view.
//!
//! # Directive grammar
//!
//! Comma-separated `key[=value]` tokens per field:
//!
//! - a token without `=` overrides the display name (at most once)
//! - `sort=[+|-][num]` sets the sort role (`+` ascending is the default,
//!   the `num` suffix selects numeric comparison)
//! - `format=<spec>` sets the print format (default `%v`, generic
//!   stringify)
//! - a display name equal to [`OMIT`] marks the column as internal-only:
//!   addressable, never rendered

use std::collections::HashMap;

use gridview_common::{GridviewError, Result};

/// Sentinel display name marking a column as never rendered.
pub const OMIT: &str = "OMIT";

/// Sort role of a column. At most one column in a set may carry a role
/// other than `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortRole {
    /// No declared role; sorting falls back to ascending lexical order.
    #[default]
    None,
    Asc,
    Desc,
    AscNumeric,
    DescNumeric,
}

/// One derived column.
#[derive(Debug, Clone)]
pub struct Column {
    pub key: String,
    pub display_name: String,
    pub ordinal: usize,
    pub format: String,
    pub sort_role: SortRole,
    pub omitted: bool,
}

/// Ordered field-key/directive pairs describing a record shape.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, String)>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Appends a field with its directive string (may be empty).
    pub fn field(mut self, key: impl Into<String>, directive: impl Into<String>) -> Self {
        self.fields.push((key.into(), directive.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The parsed, immutable column metadata for one record shape.
#[derive(Debug, Clone)]
pub struct ColumnSet {
    columns: Vec<Column>,
    by_key: HashMap<String, usize>,
    display_names: Vec<String>,
    sort_key: String,
}

impl ColumnSet {
    /// Parses a schema into a column set.
    ///
    /// Fails with [`GridviewError::Schema`] on an empty schema, a
    /// duplicate field key, a re-declared display name, an unknown
    /// directive, or more than one declared sort role.
    pub fn from_schema(schema: &Schema) -> Result<Self> {
        if schema.is_empty() {
            return Err(GridviewError::Schema(
                "record shape declares no fields".into(),
            ));
        }

        let mut columns = Vec::with_capacity(schema.fields.len());
        let mut by_key = HashMap::with_capacity(schema.fields.len());
        let mut sort_key: Option<String> = None;

        for (ordinal, (key, directive)) in schema.fields.iter().enumerate() {
            let column = parse_directive(key, directive, ordinal)?;
            if by_key.insert(key.clone(), ordinal).is_some() {
                return Err(GridviewError::Schema(format!(
                    "duplicate field key {key}"
                )));
            }
            if column.sort_role != SortRole::None {
                if let Some(existing) = &sort_key {
                    return Err(GridviewError::Schema(format!(
                        "sort role declared on both {existing} and {key}"
                    )));
                }
                sort_key = Some(key.clone());
            }
            columns.push(column);
        }

        let display_names = columns
            .iter()
            .filter(|c| !c.omitted)
            .map(|c| c.display_name.clone())
            .collect();
        let sort_key = sort_key.unwrap_or_else(|| columns[0].key.clone());

        Ok(ColumnSet {
            columns,
            by_key,
            display_names,
            sort_key,
        })
    }

    /// All columns, including omitted ones, in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.by_key.get(key).map(|&i| &self.columns[i])
    }

    /// Display names of non-omitted columns, in rendering order.
    pub fn display_names(&self) -> &[String] {
        &self.display_names
    }

    /// The designated sort key (first field's key when none is declared).
    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    /// Position of the sort column among rendered columns, with its role.
    ///
    /// An omitted sort column cannot be sorted on in the rendered table;
    /// sorting then falls back to the first rendered column.
    pub(crate) fn sort_spec(&self) -> (usize, SortRole) {
        let mut rendered = 0;
        for column in &self.columns {
            if column.omitted {
                continue;
            }
            if column.key == self.sort_key {
                return (rendered, column.sort_role);
            }
            rendered += 1;
        }
        (0, SortRole::None)
    }
}

fn parse_directive(key: &str, directive: &str, ordinal: usize) -> Result<Column> {
    let mut display_name: Option<String> = None;
    let mut sort_role = SortRole::None;
    let mut format = String::from("%v");

    for token in directive.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.split_once('=') {
            Some(("sort", spec)) => sort_role = parse_sort_role(key, spec)?,
            Some(("format", spec)) => format = spec.to_owned(),
            Some((unknown, _)) => {
                return Err(GridviewError::Schema(format!(
                    "field {key}: unknown directive {unknown}"
                )))
            }
            None => {
                if display_name.is_some() {
                    return Err(GridviewError::Schema(format!(
                        "field {key}: display name declared more than once"
                    )));
                }
                display_name = Some(token.to_owned());
            }
        }
    }

    let display_name = display_name.unwrap_or_else(|| key.to_owned());
    let omitted = display_name == OMIT;

    Ok(Column {
        key: key.to_owned(),
        display_name,
        ordinal,
        format,
        sort_role,
        omitted,
    })
}

fn parse_sort_role(key: &str, spec: &str) -> Result<SortRole> {
    let (descending, rest) = match spec.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, spec.strip_prefix('+').unwrap_or(spec)),
    };
    match (rest, descending) {
        ("", false) => Ok(SortRole::Asc),
        ("", true) => Ok(SortRole::Desc),
        ("num", false) => Ok(SortRole::AscNumeric),
        ("num", true) => Ok(SortRole::DescNumeric),
        _ => Err(GridviewError::Schema(format!(
            "field {key}: bad sort directive sort={spec}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_bare_schema() {
        let schema = Schema::new().field("a", "").field("b", "").field("c", "");
        let columns = ColumnSet::from_schema(&schema).unwrap();
        assert_eq!(columns.display_names(), &["a", "b", "c"]);
        assert_eq!(columns.sort_key(), "a");
        assert_eq!(columns.column("b").unwrap().format, "%v");
        assert_eq!(columns.column("b").unwrap().sort_role, SortRole::None);
    }

    #[test]
    fn display_name_override_and_format() {
        let schema = Schema::new().field("pct", "Usage %,format=%.2f");
        let columns = ColumnSet::from_schema(&schema).unwrap();
        assert_eq!(columns.display_names(), &["Usage %"]);
        assert_eq!(columns.column("pct").unwrap().format, "%.2f");
    }

    #[test]
    fn sort_directive_variants() {
        let roles = [
            ("sort=+", SortRole::Asc),
            ("sort=-", SortRole::Desc),
            ("sort=num", SortRole::AscNumeric),
            ("sort=+num", SortRole::AscNumeric),
            ("sort=-num", SortRole::DescNumeric),
        ];
        for (directive, expected) in roles {
            let schema = Schema::new().field("v", directive);
            let columns = ColumnSet::from_schema(&schema).unwrap();
            assert_eq!(columns.column("v").unwrap().sort_role, expected, "{directive}");
            assert_eq!(columns.sort_key(), "v");
        }
    }

    #[test]
    fn two_sort_roles_is_a_schema_error() {
        let schema = Schema::new().field("a", "sort=+").field("b", "sort=-num");
        let err = ColumnSet::from_schema(&schema).unwrap_err();
        assert!(matches!(err, GridviewError::Schema(_)));
    }

    #[test]
    fn double_display_name_is_a_schema_error() {
        let schema = Schema::new().field("a", "First,Second");
        let err = ColumnSet::from_schema(&schema).unwrap_err();
        assert!(matches!(err, GridviewError::Schema(_)));
    }

    #[test]
    fn unknown_directive_is_a_schema_error() {
        let schema = Schema::new().field("a", "width=12");
        let err = ColumnSet::from_schema(&schema).unwrap_err();
        assert!(matches!(err, GridviewError::Schema(_)));
    }

    #[test]
    fn empty_schema_is_a_schema_error() {
        let err = ColumnSet::from_schema(&Schema::new()).unwrap_err();
        assert!(matches!(err, GridviewError::Schema(_)));
    }

    #[test]
    fn omitted_column_never_renders() {
        let schema = Schema::new().field("name", "").field("internal", "OMIT");
        let columns = ColumnSet::from_schema(&schema).unwrap();
        assert_eq!(columns.display_names(), &["name"]);
        assert!(columns.column("internal").unwrap().omitted);
    }

    #[test]
    fn sort_spec_counts_rendered_columns_only() {
        let schema = Schema::new()
            .field("hidden", "OMIT")
            .field("name", "")
            .field("value", "sort=-num");
        let columns = ColumnSet::from_schema(&schema).unwrap();
        assert_eq!(columns.sort_spec(), (1, SortRole::DescNumeric));
    }
}
