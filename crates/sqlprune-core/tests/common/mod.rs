use sqlprune_core::{rewrite, RewriteOptions, RewriteRequest, RewriteResult, SelectionSet};

/// Rewrites `sql` keeping `selection`, panicking on fatal errors.
pub fn prune(sql: &str, selection: &[&str]) -> RewriteResult {
    prune_with(sql, selection, RewriteOptions::default())
}

pub fn prune_with(sql: &str, selection: &[&str], options: RewriteOptions) -> RewriteResult {
    let request = RewriteRequest::new(sql, SelectionSet::from_aliases(selection.iter().copied()))
        .with_options(options);
    rewrite(&request).unwrap_or_else(|e| panic!("rewrite failed for {sql:?}: {e}"))
}

/// Issue codes in reported order.
pub fn issue_codes(result: &RewriteResult) -> Vec<String> {
    result.issues.iter().map(|i| i.code.clone()).collect()
}

/// Join lines of the rewritten statement, in emitted order.
pub fn join_lines(result: &RewriteResult) -> Vec<&str> {
    result
        .sql
        .lines()
        .skip_while(|line| !line.starts_with("FROM "))
        .skip(1)
        .filter(|line| !line.is_empty())
        .collect()
}
