//! Join chain flattening.

use super::expression::ExpressionAnalyzer;
use super::model::{JoinConstraintKind, Relation, TableExpr};
use crate::types::{issue_codes, BaseTable, Issue, JoinEdge};

/// The flattened `FROM` clause: its base table and the joins hanging off it,
/// in written order.
#[derive(Debug, Clone)]
pub(crate) struct JoinGraph {
    pub(crate) base: BaseTable,
    pub(crate) edges: Vec<JoinEdge>,
}

#[derive(Debug, Default)]
pub(crate) struct JoinGraphBuilder {
    pub(crate) issues: Vec<Issue>,
}

impl JoinGraphBuilder {
    /// Walks the chain from the last join back to the base table, then
    /// returns the edges in chain order.
    pub(crate) fn build(&mut self, from: &TableExpr) -> JoinGraph {
        let mut pending = Vec::new();
        let mut node = from;
        let base = loop {
            match node {
                TableExpr::Table(relation) => break relation,
                TableExpr::Join {
                    left,
                    right,
                    join_type,
                    constraint,
                } => {
                    pending.push((right, join_type.as_str(), constraint));
                    node = left;
                }
            }
        };

        let base = BaseTable {
            name: base.table.clone(),
            source: base.source.clone(),
            alias: base.alias.clone(),
        };

        let mut edges: Vec<JoinEdge> = pending
            .into_iter()
            .map(|(right, join_type, constraint)| self.edge(&base, right, join_type, constraint))
            .collect();
        edges.reverse();

        JoinGraph { base, edges }
    }

    fn edge(
        &mut self,
        base: &BaseTable,
        right: &Relation,
        join_type: &str,
        constraint: &JoinConstraintKind,
    ) -> JoinEdge {
        let (on_condition, tables, columns) = match constraint {
            JoinConstraintKind::On { expr, text } => {
                let usage = ExpressionAnalyzer::analyze(expr).deduplicated();
                if usage.depth_limited {
                    self.issues.push(Issue::warning(
                        issue_codes::EXPRESSION_DEPTH_LIMIT,
                        format!(
                            "Join condition of '{}' is nested too deeply; part of it was not analyzed",
                            right.alias.as_deref().unwrap_or(&right.table)
                        ),
                    ));
                }
                (text.clone(), usage.tables, usage.columns)
            }
            JoinConstraintKind::Using(columns) => (String::new(), Vec::new(), columns.clone()),
            JoinConstraintKind::Natural | JoinConstraintKind::None => {
                (String::new(), Vec::new(), Vec::new())
            }
        };

        JoinEdge {
            left_table: base.name.clone(),
            left_alias: base.alias.clone(),
            join_type: join_type.to_string(),
            right_table: right.table.clone(),
            right_alias: right.alias.clone(),
            on_condition,
            tables,
            columns,
            dependency_fragments: vec![render_clause(join_type, right, constraint)],
            dependencies: Vec::new(),
            required_tables: vec![right.table.clone()],
        }
    }
}

/// Renders `<JOIN-TYPE> <source> [<alias>] [ON <cond> | USING (<cols>)]`.
fn render_clause(join_type: &str, right: &Relation, constraint: &JoinConstraintKind) -> String {
    let mut clause = format!("{join_type} {}", right.source);
    if let Some(alias) = &right.alias {
        clause.push(' ');
        clause.push_str(alias);
    }
    match constraint {
        JoinConstraintKind::On { text, .. } => {
            clause.push_str(" ON ");
            clause.push_str(text);
        }
        JoinConstraintKind::Using(columns) => {
            clause.push_str(&format!(" USING ({})", columns.join(", ")));
        }
        JoinConstraintKind::Natural | JoinConstraintKind::None => {}
    }
    clause
}
