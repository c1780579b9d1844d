//! Response types for the join pruning API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::common::{Issue, Summary};

/// The outcome of pruning one statement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    /// The reduced `SELECT ... FROM ... JOIN ...` text, placeholders restored
    pub sql: String,

    /// The leftmost table of the original join chain
    pub base_table: BaseTable,

    /// Every join of the original chain, in written order, with resolved
    /// dependency closures
    pub joins: Vec<Arc<JoinEdge>>,

    /// Retained projections, in select-list order
    pub projections: Vec<Projection>,

    /// Non-fatal issues encountered while rewriting
    pub issues: Vec<Issue>,

    /// Summary statistics
    pub summary: Summary,
}

/// The table every join in the chain hangs off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseTable {
    /// Physical table name
    pub name: String,

    /// Text rendered after `FROM` (the table name, or a parenthesized subquery)
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl BaseTable {
    /// Name other clauses use to qualify this table's columns.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// One join clause of the original chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinEdge {
    /// Base table of the chain
    pub left_table: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_alias: Option<String>,

    /// Join keyword text, e.g. `LEFT JOIN`
    pub join_type: String,

    /// Physical right-hand table (inner FROM table for a derived table)
    pub right_table: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_alias: Option<String>,

    /// Rendered ON condition; empty for `USING`/`NATURAL`/unconstrained joins
    pub on_condition: String,

    /// Table qualifiers referenced by the ON condition, first occurrence order
    pub tables: Vec<String>,

    /// Columns referenced by the ON condition, first occurrence order
    pub columns: Vec<String>,

    /// Rendered join clauses needed to satisfy this join, starting with its own
    /// clause followed by the closures of its dependencies
    pub dependency_fragments: Vec<String>,

    /// Reference names of the joins this one directly depends on
    pub dependencies: Vec<String>,

    /// Physical tables of the whole dependency closure, this join's first
    pub required_tables: Vec<String>,
}

impl JoinEdge {
    /// Name projections and ON conditions use to qualify the right-hand table:
    /// its alias, or the table name when unaliased.
    pub fn reference_name(&self) -> &str {
        self.right_alias.as_deref().unwrap_or(&self.right_table)
    }

    /// This join's own rendered clause.
    pub fn clause(&self) -> &str {
        self.dependency_fragments
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Dependency fragments in emission order: dependencies before dependents.
    pub fn fragments_for_emission(&self) -> impl Iterator<Item = &str> {
        self.dependency_fragments.iter().rev().map(String::as_str)
    }
}

/// One retained output column or computed expression.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// Output name (may be empty for an unaliased computed expression)
    pub alias: String,

    /// Source expression text
    pub expression: String,

    /// Table qualifiers referenced by the expression
    pub table_aliases: Vec<String>,

    /// Physical tables needed to compute the expression, including every
    /// table pulled in through join dependencies
    pub tables: Vec<String>,

    /// Referenced column names (or the expression text for opaque expressions)
    pub columns: Vec<String>,

    /// Joins whose right-hand table this projection references
    pub joins: Vec<Arc<JoinEdge>>,
}

/// One entry of a statement's select list, as offered for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutputColumn {
    /// Explicit alias, or the column name for an unaliased plain column
    pub alias: String,

    pub expression: String,
}
