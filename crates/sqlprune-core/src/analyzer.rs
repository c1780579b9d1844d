use crate::error::RewriteError;
use crate::parser::parse_sql_with_dialect;
use crate::placeholder::{preprocess, Preprocessed};
use crate::types::*;
use sqlparser::ast::Statement;
#[cfg(feature = "tracing")]
use tracing::{debug, info_span};

mod dependencies;
mod emit;
mod expression;
pub(crate) mod helpers;
mod joins;
mod lower;
mod model;
mod projection;

use dependencies::DependencyResolver;
use emit::QueryEmitter;
use joins::JoinGraphBuilder;
use lower::{lower_statement, LoweredQuery};
use projection::{attach_joins, ProjectionResolver};

/// Prunes the first statement of `request.sql` down to the selected outputs
/// and the joins they need.
///
/// Fatal problems (empty input, unparsable SQL, a statement that is not a
/// `SELECT ... FROM`) are returned as errors. Everything else is reported as
/// issues on the result.
pub fn rewrite(request: &RewriteRequest) -> Result<RewriteResult, RewriteError> {
    #[cfg(feature = "tracing")]
    let _span = info_span!(
        "rewrite",
        dialect = ?request.dialect,
        selected = request.selection.len()
    )
    .entered();
    let options = request.options.clone().unwrap_or_default();
    let (prepared, lowered, mut issues) = prepare(request)?;

    for clause in &lowered.dropped_clauses {
        issues.push(Issue::warning(
            issue_codes::DROPPED_CLAUSE,
            format!("{clause} is not carried into the rewritten statement"),
        ));
    }
    for wildcard in &lowered.wildcards {
        issues.push(Issue::info(
            issue_codes::WILDCARD_SKIPPED,
            format!("Wildcard '{wildcard}' cannot be pruned and was skipped"),
        ));
    }

    // Phase 1: the edge list is fully resolved and frozen before any
    // projection looks at it.
    let mut builder = JoinGraphBuilder::default();
    let graph = builder.build(&lowered.from);
    issues.append(&mut builder.issues);
    let (edges, mut dependency_issues) = DependencyResolver::resolve(graph.edges);
    issues.append(&mut dependency_issues);

    #[cfg(feature = "tracing")]
    debug!(joins = edges.len(), base = %graph.base.name, "Join chain resolved");

    // Phase 2: read-only attachment.
    let mut resolver = ProjectionResolver::new(&request.selection);
    let mut projections = Vec::new();
    for entry in &lowered.entries {
        if let Some(mut projection) = resolver.resolve(entry) {
            attach_joins(&mut projection, &edges, &graph.base);
            projections.push(projection);
        }
    }
    issues.append(&mut resolver.issues);

    for alias in request.selection.iter() {
        let matched = lowered
            .entries
            .iter()
            .any(|entry| entry.output_name() == Some(alias));
        if !matched {
            issues.push(Issue::warning(
                issue_codes::UNMATCHED_SELECTION,
                format!("Selected column '{alias}' does not match any select-list entry"),
            ));
        }
    }
    if projections.is_empty() {
        issues.push(Issue::warning(
            issue_codes::EMPTY_SELECTION,
            "No select-list entry matched the selection; the rewritten statement selects nothing",
        ));
    }

    let emitted = QueryEmitter::new(&graph.base, options.trailing_marker.as_deref())
        .emit(&projections);
    let sql = prepared.restore(&emitted.render());

    let issue_count = IssueCount::from_issues(&issues);
    let summary = Summary {
        projection_count: projections.len(),
        join_count: edges.len(),
        retained_join_count: emitted.join_fragments.len(),
        has_errors: issue_count.errors > 0,
        issue_count,
    };

    Ok(RewriteResult {
        sql,
        base_table: graph.base,
        joins: edges,
        projections,
        issues,
        summary,
    })
}

/// Lists the selectable outputs of the first statement of `request.sql`:
/// every aliased entry, and every unaliased plain column under its own name.
///
/// `request.selection` is ignored.
pub fn list_output_columns(request: &RewriteRequest) -> Result<Vec<OutputColumn>, RewriteError> {
    let (prepared, lowered, _) = prepare(request)?;
    Ok(lowered
        .entries
        .iter()
        .filter_map(|entry| {
            entry.output_name().map(|alias| OutputColumn {
                alias: alias.to_string(),
                expression: prepared.restore(&entry.text),
            })
        })
        .collect())
}

/// Preprocesses, parses and lowers the first statement.
fn prepare(request: &RewriteRequest) -> Result<(Preprocessed, LoweredQuery, Vec<Issue>), RewriteError> {
    if request.sql.trim().is_empty() {
        return Err(RewriteError::EmptyInput);
    }
    let options = request.options.clone().unwrap_or_default();
    let prepared = preprocess(&request.sql, &options.placeholders);

    let statements = parse_sql_with_dialect(&prepared.sql, request.dialect)?;
    let Some(statement) = statements.first() else {
        return Err(RewriteError::EmptyInput);
    };

    let mut issues = Vec::new();
    if statements.len() > 1 {
        issues.push(Issue::info(
            issue_codes::MULTIPLE_STATEMENTS,
            format!(
                "Script contains {} statements; only the first is rewritten",
                statements.len()
            ),
        ));
    }

    let lowered = lower_first(statement)?;
    Ok((prepared, lowered, issues))
}

fn lower_first(statement: &Statement) -> Result<LoweredQuery, RewriteError> {
    #[cfg(feature = "tracing")]
    let _span = info_span!("lower_statement").entered();
    lower_statement(statement)
}
