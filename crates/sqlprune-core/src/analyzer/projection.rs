//! Select-list filtering and projection records.

use super::expression::ExpressionAnalyzer;
use super::helpers::stable_unique;
use super::model::{SelectEntry, SqlExpr};
use crate::catalog::SelectionSet;
use crate::types::{issue_codes, BaseTable, Issue, JoinEdge, Projection};
use std::sync::Arc;

pub(crate) struct ProjectionResolver<'a> {
    selection: &'a SelectionSet,
    pub(crate) issues: Vec<Issue>,
}

impl<'a> ProjectionResolver<'a> {
    pub(crate) fn new(selection: &'a SelectionSet) -> Self {
        Self {
            selection,
            issues: Vec::new(),
        }
    }

    /// Whether `entry` is one of the selected outputs.
    pub(crate) fn is_selected(&self, entry: &SelectEntry) -> bool {
        entry
            .output_name()
            .is_some_and(|name| self.selection.contains(name))
    }

    /// Builds the projection for `entry`, or `None` when it is not selected.
    ///
    /// The returned projection has no joins or physical tables yet; see
    /// [`attach_joins`].
    pub(crate) fn resolve(&mut self, entry: &SelectEntry) -> Option<Projection> {
        if !self.is_selected(entry) {
            return None;
        }
        let given_alias = entry.alias.clone().unwrap_or_default();

        let (alias, table_aliases, columns): (String, Vec<String>, Vec<String>) = match &entry.expr {
            SqlExpr::Column { qualifier, name } => {
                let alias = entry.alias.clone().unwrap_or_else(|| name.clone());
                (alias, qualifier.iter().cloned().collect(), vec![name.clone()])
            }
            SqlExpr::Other => (given_alias, Vec::new(), vec![entry.text.clone()]),
            expr => {
                let usage = ExpressionAnalyzer::analyze(expr).deduplicated();
                if usage.depth_limited {
                    self.issues.push(Issue::warning(
                        issue_codes::EXPRESSION_DEPTH_LIMIT,
                        format!(
                            "Expression for '{given_alias}' is nested too deeply; part of it was not analyzed"
                        ),
                    ));
                }
                (given_alias, usage.tables, usage.columns)
            }
        };

        Some(Projection {
            alias,
            expression: entry.text.clone(),
            table_aliases,
            tables: Vec::new(),
            columns,
            joins: Vec::new(),
        })
    }
}

/// Attaches every edge whose reference name the projection uses, and fills in
/// the physical tables needed to compute it.
pub(crate) fn attach_joins(projection: &mut Projection, edges: &[Arc<JoinEdge>], base: &BaseTable) {
    projection.joins = edges
        .iter()
        .filter(|edge| {
            projection
                .table_aliases
                .iter()
                .any(|alias| alias == edge.reference_name())
        })
        .cloned()
        .collect();

    let mut tables = Vec::new();
    if projection
        .table_aliases
        .iter()
        .any(|alias| alias == base.reference_name())
    {
        tables.push(base.name.clone());
    }
    for edge in &projection.joins {
        tables.extend(edge.required_tables.iter().cloned());
    }
    projection.tables = stable_unique(tables);
}
