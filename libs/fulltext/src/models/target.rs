//! Per-entity search targets
//!
//! A `TargetConfig` names the table, the FULLTEXT-indexed columns, the
//! identifier column and an optional scope column for one entity kind. The
//! values come from configuration, never from user input, and are the only
//! structural parts of a rendered statement. They are validated once, when the
//! target is built, and rendered back-quoted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{Error, Result};

/// Raw, unvalidated target as it appears in configuration.
#[derive(Debug, Clone, Deserialize)]
struct TargetConfigSpec {
    table: String,
    id_column: String,
    search_columns: Vec<String>,
    #[serde(default)]
    output_columns: Vec<String>,
    #[serde(default)]
    scope_column: Option<String>,
    #[serde(default)]
    max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TargetConfigSpec")]
pub struct TargetConfig {
    table: String,
    id_column: String,
    search_columns: Vec<String>,
    output_columns: Vec<String>,
    scope_column: Option<String>,
    max_results: Option<u32>,
}

impl TryFrom<TargetConfigSpec> for TargetConfig {
    type Error = Error;

    fn try_from(spec: TargetConfigSpec) -> Result<Self> {
        let mut target = TargetConfig::new(spec.table, spec.id_column, spec.search_columns)?
            .with_output_columns(spec.output_columns)?;
        if let Some(column) = spec.scope_column {
            target = target.with_scope_column(column)?;
        }
        if let Some(limit) = spec.max_results {
            target = target.with_max_results(limit)?;
        }
        Ok(target)
    }
}

impl TargetConfig {
    pub fn new<S: Into<String>>(
        table: impl Into<String>,
        id_column: impl Into<String>,
        search_columns: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let table = table.into();
        let id_column = id_column.into();
        let search_columns: Vec<String> = search_columns.into_iter().map(Into::into).collect();

        validate_identifier("table", &table)?;
        validate_identifier("id_column", &id_column)?;
        if search_columns.is_empty() {
            return Err(Error::InvalidTarget(format!(
                "table '{}' needs at least one search column",
                table
            )));
        }
        for column in &search_columns {
            validate_identifier("search_columns", column)?;
        }

        Ok(Self {
            table,
            id_column,
            search_columns,
            output_columns: Vec::new(),
            scope_column: None,
            max_results: None,
        })
    }

    /// Restrict the columns returned for records. Empty means every column.
    ///
    /// The identifier column is appended when missing; rehydration keys on it.
    pub fn with_output_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let mut columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for column in &columns {
            validate_identifier("output_columns", column)?;
        }
        if !columns.is_empty() && !columns.contains(&self.id_column) {
            columns.push(self.id_column.clone());
        }
        self.output_columns = columns;
        Ok(self)
    }

    pub fn with_scope_column(mut self, column: impl Into<String>) -> Result<Self> {
        let column = column.into();
        validate_identifier("scope_column", &column)?;
        self.scope_column = Some(column);
        Ok(self)
    }

    pub fn with_max_results(mut self, limit: u32) -> Result<Self> {
        if limit == 0 {
            return Err(Error::InvalidTarget(format!(
                "table '{}': max_results must be greater than zero",
                self.table
            )));
        }
        self.max_results = Some(limit);
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn search_columns(&self) -> &[String] {
        &self.search_columns
    }

    pub fn output_columns(&self) -> &[String] {
        &self.output_columns
    }

    pub fn scope_column(&self) -> Option<&str> {
        self.scope_column.as_deref()
    }

    pub fn max_results(&self) -> Option<u32> {
        self.max_results
    }

    pub(crate) fn quoted_table(&self) -> String {
        quote_identifier(&self.table)
    }

    pub(crate) fn quoted_id_column(&self) -> String {
        quote_identifier(&self.id_column)
    }

    pub(crate) fn quoted_scope_column(&self) -> Option<String> {
        self.scope_column.as_deref().map(quote_identifier)
    }

    /// Column list for `MATCH(...)`; must equal a FULLTEXT index definition.
    pub(crate) fn match_columns(&self) -> String {
        join_quoted(&self.search_columns)
    }

    pub(crate) fn select_list(&self) -> String {
        if self.output_columns.is_empty() {
            "*".to_string()
        } else {
            join_quoted(&self.output_columns)
        }
    }
}

/// Entity kind to target lookup, built once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: BTreeMap<String, Arc<TargetConfig>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: impl Into<String>, target: TargetConfig) -> Self {
        self.targets.insert(kind.into(), Arc::new(target));
        self
    }

    pub fn get(&self, kind: &str) -> Result<Arc<TargetConfig>> {
        self.targets
            .get(kind)
            .cloned()
            .ok_or_else(|| Error::UnknownEntity(kind.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetConfig)> {
        self.targets.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl FromIterator<(String, TargetConfig)> for TargetRegistry {
    fn from_iter<I: IntoIterator<Item = (String, TargetConfig)>>(iter: I) -> Self {
        Self {
            targets: iter
                .into_iter()
                .map(|(kind, target)| (kind, Arc::new(target)))
                .collect(),
        }
    }
}

/// SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`, at most 64 bytes (MySQL limit).
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    s.len() <= 64
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_identifier(field: &str, value: &str) -> Result<()> {
    if is_valid_identifier(value) {
        Ok(())
    } else {
        Err(Error::InvalidTarget(format!(
            "{} '{}' is not a plain SQL identifier",
            field, value
        )))
    }
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name)
}

fn join_quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| quote_identifier(n))
        .collect::<Vec<_>>()
        .join(", ")
}
