//! Column and table usage extraction.
//!
//! The `ExpressionAnalyzer` walks one lowered expression and records every
//! column it references together with the qualifier that owns it. It handles:
//! - Comparisons, `AND`/`OR` and binary operators (both operands)
//! - `IS` predicates (plain column operand only)
//! - Function arguments, including the operands of casts, unary operators and
//!   other special forms lowered as calls
//! - `CASE` operands, branches and `ELSE`
//! - Subqueries, reduced to the tables named in their own `FROM` (one level)
//!
//! Literals and other leaf shapes contribute nothing.

use super::helpers::stable_unique;
use super::model::SqlExpr;
#[cfg(feature = "tracing")]
use tracing::debug;

/// Maximum recursion depth for expression traversal to prevent stack overflow
/// on deeply nested expressions.
pub(crate) const MAX_RECURSION_DEPTH: usize = 100;

/// Columns and table qualifiers referenced by an expression, in traversal
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ColumnUsage {
    pub(crate) columns: Vec<String>,
    pub(crate) tables: Vec<String>,
    /// Set when part of the expression was skipped because of nesting depth
    pub(crate) depth_limited: bool,
}

impl ColumnUsage {
    /// Drops repeats from both lists, keeping first occurrences.
    pub(crate) fn deduplicated(self) -> Self {
        Self {
            columns: stable_unique(self.columns),
            tables: stable_unique(self.tables),
            depth_limited: self.depth_limited,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ExpressionAnalyzer {
    usage: ColumnUsage,
}

impl ExpressionAnalyzer {
    /// Collects the column usage of `expr`. Lists may contain repeats.
    pub(crate) fn analyze(expr: &SqlExpr) -> ColumnUsage {
        let mut analyzer = Self::default();
        analyzer.visit(expr, 0);
        analyzer.usage
    }

    fn visit(&mut self, expr: &SqlExpr, depth: usize) {
        if depth > MAX_RECURSION_DEPTH {
            self.usage.depth_limited = true;
            #[cfg(feature = "tracing")]
            debug!(depth, "Max recursion depth exceeded in ExpressionAnalyzer::visit");
            return;
        }
        let next_depth = depth + 1;

        match expr {
            SqlExpr::Column { qualifier, name } => self.record_column(qualifier.as_deref(), name),
            SqlExpr::Comparison { left, right }
            | SqlExpr::Binary { left, right }
            | SqlExpr::And(left, right)
            | SqlExpr::Or(left, right) => {
                self.visit(left, next_depth);
                self.visit(right, next_depth);
            }
            SqlExpr::Is(inner) => {
                if let Some((qualifier, name)) = unwrap_parens(inner).as_column() {
                    self.record_column(qualifier, name);
                }
            }
            SqlExpr::Paren(inner) => self.visit(inner, next_depth),
            SqlExpr::Function { args, .. } => {
                for arg in args {
                    self.visit(arg, next_depth);
                }
            }
            SqlExpr::Case {
                operand,
                whens,
                else_result,
            } => {
                if let Some(operand) = operand {
                    self.visit(operand, next_depth);
                }
                for (condition, result) in whens {
                    self.visit(condition, next_depth);
                    self.visit(result, next_depth);
                }
                if let Some(else_result) = else_result {
                    self.visit(else_result, next_depth);
                }
            }
            SqlExpr::Subquery { from_tables } => {
                self.usage.tables.extend(from_tables.iter().cloned());
            }
            SqlExpr::List(items) => {
                for item in items {
                    self.visit(item, next_depth);
                }
            }
            SqlExpr::Other => {}
        }
    }

    fn record_column(&mut self, qualifier: Option<&str>, name: &str) {
        self.usage.columns.push(name.to_string());
        if let Some(qualifier) = qualifier.filter(|q| !q.is_empty()) {
            self.usage.tables.push(qualifier.to_string());
        }
    }
}

fn unwrap_parens(mut expr: &SqlExpr) -> &SqlExpr {
    while let SqlExpr::Paren(inner) = expr {
        expr = inner;
    }
    expr
}
