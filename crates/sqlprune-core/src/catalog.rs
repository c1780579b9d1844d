//! Column catalog and selection sets.
//!
//! A [`ColumnCatalog`] describes the output columns a reporting statement is
//! known to produce, in display order, with the labels shown to users and the
//! flags that drive the `all`/`default` shortcuts. A [`SelectionSet`] is the
//! resulting list of aliases handed to [`crate::rewrite`].

use crate::analyzer::helpers::stable_unique;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered, duplicate-free set of output aliases to retain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SelectionSet(Vec<String>);

impl SelectionSet {
    pub fn from_aliases<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases = aliases
            .into_iter()
            .map(Into::into)
            .map(|alias: String| alias.trim().to_string())
            .filter(|alias| !alias.is_empty())
            .collect();
        Self(stable_unique(aliases))
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.0.iter().any(|a| a == alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_aliases(iter)
    }
}

/// Errors raised while turning user choices into a selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("column index {index} is out of range (catalog has {len} columns)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// One known output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogColumn {
    /// Output alias as written in the statement's select list
    pub alias: String,

    /// Display label, e.g. `Order details -> Order ID`
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Values the column can take, shown next to the label
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,

    /// Part of the `default` selection
    #[serde(default)]
    pub default: bool,

    /// Always retained, whatever else is selected
    #[serde(default)]
    pub required: bool,
}

impl CatalogColumn {
    /// Label with type, allowed values and flags, as listed in the prompt.
    pub fn display_label(&self) -> String {
        let mut label = self.label.clone();
        if let Some(data_type) = &self.data_type {
            label.push(':');
            label.push_str(data_type);
        }
        if !self.allowed_values.is_empty() {
            let values: Vec<String> = self.allowed_values.iter().map(|v| format!("'{v}'")).collect();
            label.push_str(&format!(":[{}]", values.join(",")));
        }
        if self.required {
            label.push_str(":REQUIRED");
        }
        if self.default {
            label.push_str("#DEFAULT");
        }
        label
    }
}

/// Known output columns in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnCatalog {
    pub columns: Vec<CatalogColumn>,
}

impl ColumnCatalog {
    pub fn new(columns: Vec<CatalogColumn>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn has_defaults(&self) -> bool {
        self.columns.iter().any(|c| c.default)
    }

    pub fn select_all(&self) -> SelectionSet {
        SelectionSet::from_aliases(self.columns.iter().map(|c| c.alias.as_str()))
    }

    /// Columns flagged `default`, plus required ones.
    pub fn select_defaults(&self) -> SelectionSet {
        self.with_required(self.columns.iter().filter(|c| c.default))
    }

    /// Columns at the given positions, in catalog order, plus required ones.
    pub fn select_indices(&self, indices: &[usize]) -> Result<SelectionSet, SelectionError> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let chosen = sorted
            .into_iter()
            .map(|index| {
                self.columns
                    .get(index)
                    .ok_or(SelectionError::IndexOutOfRange {
                        index,
                        len: self.columns.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.with_required(chosen))
    }

    fn with_required<'a>(&'a self, chosen: impl IntoIterator<Item = &'a CatalogColumn>) -> SelectionSet {
        let chosen: Vec<&CatalogColumn> = chosen.into_iter().collect();
        // Keep catalog order so required columns land where they are listed.
        SelectionSet::from_aliases(
            self.columns
                .iter()
                .filter(|c| c.required || chosen.iter().any(|picked| picked.alias == c.alias))
                .map(|c| c.alias.as_str()),
        )
    }
}
