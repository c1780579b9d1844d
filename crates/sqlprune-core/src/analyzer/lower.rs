//! Lowering from the sqlparser AST into the analyzer model.

use super::helpers::stable_unique;
use super::model::{JoinConstraintKind, Relation, SelectEntry, SqlExpr, TableExpr};
use crate::error::RewriteError;
use sqlparser::ast::{
    self, BinaryOperator, Expr, FunctionArg, FunctionArgExpr, GroupByExpr, JoinConstraint,
    JoinOperator, Query, Select, SelectItem, SetExpr, Statement, TableFactor, TableWithJoins,
};

/// The parts of a `SELECT` statement the rewrite works with.
#[derive(Debug, Clone)]
pub(crate) struct LoweredQuery {
    pub(crate) entries: Vec<SelectEntry>,
    /// Rendered wildcard items (`*`, `a.*`), which cannot be pruned
    pub(crate) wildcards: Vec<String>,
    pub(crate) from: TableExpr,
    /// Clauses present in the statement that the rewrite does not carry over
    pub(crate) dropped_clauses: Vec<&'static str>,
}

pub(crate) fn lower_statement(statement: &Statement) -> Result<LoweredQuery, RewriteError> {
    match statement {
        Statement::Query(query) => lower_query(query),
        other => Err(RewriteError::UnsupportedStatement(statement_keyword(
            &other.to_string(),
        ))),
    }
}

fn statement_keyword(rendered: &str) -> String {
    rendered
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

fn lower_query(query: &Query) -> Result<LoweredQuery, RewriteError> {
    let select = match query.body.as_ref() {
        SetExpr::Select(select) => select,
        SetExpr::SetOperation { op, .. } => {
            return Err(RewriteError::UnsupportedStatement(op.to_string()))
        }
        other => {
            return Err(RewriteError::UnsupportedStatement(statement_keyword(
                &other.to_string(),
            )))
        }
    };

    let mut dropped_clauses = Vec::new();
    if query.with.is_some() {
        dropped_clauses.push("WITH");
    }
    dropped_clauses.extend(dropped_select_clauses(select));
    if query.order_by.is_some() {
        dropped_clauses.push("ORDER BY");
    }
    if query.limit_clause.is_some() || query.fetch.is_some() {
        dropped_clauses.push("LIMIT");
    }

    let Some((first, rest)) = select.from.split_first() else {
        return Err(RewriteError::MissingFrom);
    };
    if !rest.is_empty() {
        dropped_clauses.push("additional FROM items");
    }

    let mut entries = Vec::new();
    let mut wildcards = Vec::new();
    for item in &select.projection {
        match item {
            SelectItem::UnnamedExpr(expr) => entries.push(SelectEntry {
                expr: lower_expr(expr),
                text: expr.to_string(),
                alias: None,
            }),
            SelectItem::ExprWithAlias { expr, alias } => entries.push(SelectEntry {
                expr: lower_expr(expr),
                text: expr.to_string(),
                alias: Some(alias.value.clone()),
            }),
            wildcard => wildcards.push(wildcard.to_string()),
        }
    }

    Ok(LoweredQuery {
        entries,
        wildcards,
        from: lower_from(first),
        dropped_clauses,
    })
}

fn dropped_select_clauses(select: &Select) -> Vec<&'static str> {
    let mut dropped = Vec::new();
    if select.distinct.is_some() {
        dropped.push("DISTINCT");
    }
    if select.selection.is_some() {
        dropped.push("WHERE");
    }
    let has_group_by = match &select.group_by {
        GroupByExpr::All(_) => true,
        GroupByExpr::Expressions(exprs, _) => !exprs.is_empty(),
    };
    if has_group_by {
        dropped.push("GROUP BY");
    }
    if select.having.is_some() {
        dropped.push("HAVING");
    }
    dropped
}

/// Folds a `FROM` item and its joins into a left-deep [`TableExpr`].
pub(crate) fn lower_from(table_with_joins: &TableWithJoins) -> TableExpr {
    let mut expr = TableExpr::Table(lower_relation(&table_with_joins.relation));
    for join in &table_with_joins.joins {
        let (keyword, constraint) = join_keyword(&join.join_operator);
        let constraint = lower_constraint(constraint);
        let join_type = if matches!(constraint, JoinConstraintKind::Natural) {
            format!("NATURAL {keyword}")
        } else {
            keyword.to_string()
        };
        expr = TableExpr::Join {
            left: Box::new(expr),
            right: lower_relation(&join.relation),
            join_type,
            constraint,
        };
    }
    expr
}

fn join_keyword(operator: &JoinOperator) -> (&'static str, Option<&JoinConstraint>) {
    match operator {
        JoinOperator::Join(c) => ("JOIN", Some(c)),
        JoinOperator::Inner(c) => ("INNER JOIN", Some(c)),
        JoinOperator::Left(c) => ("LEFT JOIN", Some(c)),
        JoinOperator::LeftOuter(c) => ("LEFT OUTER JOIN", Some(c)),
        JoinOperator::Right(c) => ("RIGHT JOIN", Some(c)),
        JoinOperator::RightOuter(c) => ("RIGHT OUTER JOIN", Some(c)),
        JoinOperator::FullOuter(c) => ("FULL OUTER JOIN", Some(c)),
        JoinOperator::CrossJoin(c) => ("CROSS JOIN", Some(c)),
        JoinOperator::Semi(c) => ("SEMI JOIN", Some(c)),
        JoinOperator::LeftSemi(c) => ("LEFT SEMI JOIN", Some(c)),
        JoinOperator::RightSemi(c) => ("RIGHT SEMI JOIN", Some(c)),
        JoinOperator::Anti(c) => ("ANTI JOIN", Some(c)),
        JoinOperator::LeftAnti(c) => ("LEFT ANTI JOIN", Some(c)),
        JoinOperator::RightAnti(c) => ("RIGHT ANTI JOIN", Some(c)),
        JoinOperator::StraightJoin(c) => ("STRAIGHT_JOIN", Some(c)),
        JoinOperator::AsOf { constraint, .. } => ("ASOF JOIN", Some(constraint)),
        JoinOperator::CrossApply => ("CROSS APPLY", None),
        JoinOperator::OuterApply => ("OUTER APPLY", None),
    }
}

fn lower_constraint(constraint: Option<&JoinConstraint>) -> JoinConstraintKind {
    match constraint {
        Some(JoinConstraint::On(expr)) => JoinConstraintKind::On {
            expr: lower_expr(expr),
            text: expr.to_string(),
        },
        Some(JoinConstraint::Using(columns)) => {
            JoinConstraintKind::Using(columns.iter().map(ToString::to_string).collect())
        }
        Some(JoinConstraint::Natural) => JoinConstraintKind::Natural,
        Some(JoinConstraint::None) | None => JoinConstraintKind::None,
    }
}

fn lower_relation(factor: &TableFactor) -> Relation {
    match factor {
        TableFactor::Table { name, alias, .. } => Relation {
            table: name.to_string(),
            source: name.to_string(),
            alias: alias.as_ref().map(|a| a.name.value.clone()),
        },
        TableFactor::Derived {
            subquery, alias, ..
        } => {
            let alias = alias.as_ref().map(|a| a.name.value.clone());
            // One level only: the innermost plain table of the subquery's FROM.
            let table = subquery_tables(subquery)
                .pop()
                .or_else(|| alias.clone())
                .unwrap_or_else(|| subquery.to_string());
            Relation {
                table,
                source: format!("({subquery})"),
                alias,
            }
        }
        TableFactor::NestedJoin {
            table_with_joins,
            alias,
            ..
        } => Relation {
            table: lower_relation(&table_with_joins.relation).table,
            source: format!("({table_with_joins})"),
            alias: alias.as_ref().map(|a| a.name.value.clone()),
        },
        other => {
            let rendered = other.to_string();
            Relation {
                table: rendered.clone(),
                source: rendered,
                alias: None,
            }
        }
    }
}

/// Plain tables named in a query's own FROM clause, joins included.
pub(crate) fn subquery_tables(query: &Query) -> Vec<String> {
    let SetExpr::Select(select) = query.body.as_ref() else {
        return Vec::new();
    };
    let mut tables = Vec::new();
    for table_with_joins in &select.from {
        let relations = std::iter::once(&table_with_joins.relation)
            .chain(table_with_joins.joins.iter().map(|join| &join.relation));
        for relation in relations {
            if let TableFactor::Table { name, .. } = relation {
                tables.push(name.to_string());
            }
        }
    }
    stable_unique(tables)
}

pub(crate) fn lower_expr(expr: &Expr) -> SqlExpr {
    match expr {
        Expr::Identifier(ident) => SqlExpr::column(None, &ident.value),
        Expr::CompoundIdentifier(parts) => match parts.split_last() {
            Some((name, [])) => SqlExpr::column(None, &name.value),
            Some((name, qualifier)) => {
                let qualifier = qualifier
                    .iter()
                    .map(|part| part.value.as_str())
                    .collect::<Vec<_>>()
                    .join(".");
                SqlExpr::column(Some(&qualifier), &name.value)
            }
            None => SqlExpr::Other,
        },
        Expr::BinaryOp { left, op, right } => {
            let left = Box::new(lower_expr(left));
            let right = Box::new(lower_expr(right));
            match op {
                BinaryOperator::And => SqlExpr::And(left, right),
                BinaryOperator::Or => SqlExpr::Or(left, right),
                BinaryOperator::Eq
                | BinaryOperator::NotEq
                | BinaryOperator::Lt
                | BinaryOperator::Gt
                | BinaryOperator::LtEq
                | BinaryOperator::GtEq
                | BinaryOperator::Spaceship => SqlExpr::Comparison { left, right },
                _ => SqlExpr::Binary { left, right },
            }
        }
        Expr::Like { expr, pattern, .. }
        | Expr::ILike { expr, pattern, .. }
        | Expr::SimilarTo { expr, pattern, .. } => comparison(expr, pattern),
        Expr::IsDistinctFrom(left, right) | Expr::IsNotDistinctFrom(left, right) => {
            comparison(left, right)
        }
        Expr::InList { expr, list, .. } => SqlExpr::Comparison {
            left: Box::new(lower_expr(expr)),
            right: Box::new(SqlExpr::List(list.iter().map(lower_expr).collect())),
        },
        Expr::InSubquery { expr, subquery, .. } => SqlExpr::Comparison {
            left: Box::new(lower_expr(expr)),
            right: Box::new(SqlExpr::Subquery {
                from_tables: subquery_tables(subquery),
            }),
        },
        Expr::IsNull(inner)
        | Expr::IsNotNull(inner)
        | Expr::IsTrue(inner)
        | Expr::IsNotTrue(inner)
        | Expr::IsFalse(inner)
        | Expr::IsNotFalse(inner)
        | Expr::IsUnknown(inner)
        | Expr::IsNotUnknown(inner) => SqlExpr::Is(Box::new(lower_expr(inner))),
        Expr::Nested(inner) => SqlExpr::Paren(Box::new(lower_expr(inner))),
        Expr::Function(func) => SqlExpr::Function {
            name: func.name.to_string(),
            args: lower_function_args(&func.args),
        },
        Expr::Substring {
            expr,
            substring_from,
            substring_for,
            ..
        } => {
            let args = std::iter::once(expr.as_ref())
                .chain(substring_from.as_deref())
                .chain(substring_for.as_deref())
                .map(lower_expr)
                .collect();
            SqlExpr::Function {
                name: "SUBSTRING".to_string(),
                args,
            }
        }
        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => SqlExpr::Case {
            operand: operand.as_deref().map(|op| Box::new(lower_expr(op))),
            whens: conditions
                .iter()
                .map(|when| (lower_expr(&when.condition), lower_expr(&when.result)))
                .collect(),
            else_result: else_result.as_deref().map(|e| Box::new(lower_expr(e))),
        },
        Expr::Subquery(query) | Expr::Exists { subquery: query, .. } => SqlExpr::Subquery {
            from_tables: subquery_tables(query),
        },
        Expr::Tuple(items) => SqlExpr::List(items.iter().map(lower_expr).collect()),
        Expr::Array(array) => SqlExpr::List(array.elem.iter().map(lower_expr).collect()),
        Expr::Between {
            expr, low, high, ..
        } => SqlExpr::Comparison {
            left: Box::new(lower_expr(expr)),
            right: Box::new(SqlExpr::List(vec![lower_expr(low), lower_expr(high)])),
        },
        Expr::RLike { expr, pattern, .. } => comparison(expr, pattern),
        Expr::InUnnest {
            expr, array_expr, ..
        } => comparison(expr, array_expr),
        Expr::AnyOp { left, right, .. } | Expr::AllOp { left, right, .. } => {
            comparison(left, right)
        }
        Expr::UnaryOp { op, expr } => call(&op.to_string(), [expr.as_ref()]),
        Expr::Cast { expr, .. } => call("CAST", [expr.as_ref()]),
        Expr::Convert { expr, .. } => call("CONVERT", [expr.as_ref()]),
        Expr::Collate { expr, .. } => call("COLLATE", [expr.as_ref()]),
        Expr::Extract { expr, .. } => call("EXTRACT", [expr.as_ref()]),
        Expr::Ceil { expr, .. } => call("CEIL", [expr.as_ref()]),
        Expr::Floor { expr, .. } => call("FLOOR", [expr.as_ref()]),
        Expr::IsNormalized { expr, .. } => call("IS NORMALIZED", [expr.as_ref()]),
        Expr::AtTimeZone {
            timestamp,
            time_zone,
        } => call("AT TIME ZONE", [timestamp.as_ref(), time_zone.as_ref()]),
        Expr::Position { expr, r#in } => call("POSITION", [expr.as_ref(), r#in.as_ref()]),
        Expr::Trim {
            expr,
            trim_what,
            trim_characters,
            ..
        } => call(
            "TRIM",
            std::iter::once(expr.as_ref())
                .chain(trim_what.as_deref())
                .chain(trim_characters.iter().flatten()),
        ),
        Expr::Overlay {
            expr,
            overlay_what,
            overlay_from,
            overlay_for,
        } => call(
            "OVERLAY",
            [expr.as_ref(), overlay_what.as_ref(), overlay_from.as_ref()]
                .into_iter()
                .chain(overlay_for.as_deref()),
        ),
        Expr::Named { expr, .. }
        | Expr::OuterJoin(expr)
        | Expr::Prior(expr)
        | Expr::JsonAccess { value: expr, .. }
        | Expr::CompoundFieldAccess { root: expr, .. } => lower_expr(expr),
        _ => SqlExpr::Other,
    }
}

/// Operator or special form with fixed operands, analyzed like a function call.
fn call<'a>(name: &str, operands: impl IntoIterator<Item = &'a Expr>) -> SqlExpr {
    SqlExpr::Function {
        name: name.to_string(),
        args: operands.into_iter().map(lower_expr).collect(),
    }
}

fn comparison(left: &Expr, right: &Expr) -> SqlExpr {
    SqlExpr::Comparison {
        left: Box::new(lower_expr(left)),
        right: Box::new(lower_expr(right)),
    }
}

fn lower_function_args(args: &ast::FunctionArguments) -> Vec<SqlExpr> {
    match args {
        ast::FunctionArguments::List(list) => list
            .args
            .iter()
            .filter_map(|arg| match arg {
                FunctionArg::Unnamed(FunctionArgExpr::Expr(e))
                | FunctionArg::Named {
                    arg: FunctionArgExpr::Expr(e),
                    ..
                }
                | FunctionArg::ExprNamed {
                    arg: FunctionArgExpr::Expr(e),
                    ..
                } => Some(lower_expr(e)),
                _ => None,
            })
            .collect(),
        ast::FunctionArguments::Subquery(query) => vec![SqlExpr::Subquery {
            from_tables: subquery_tables(query),
        }],
        ast::FunctionArguments::None => Vec::new(),
    }
}
