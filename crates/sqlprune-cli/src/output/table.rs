//! Human-readable table output formatting.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use sqlprune_core::{Projection, RewriteResult, Severity};
use std::fmt::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ProjectionRow {
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Expression")]
    expression: String,
    #[tabled(rename = "Tables")]
    tables: String,
    #[tabled(rename = "Joins")]
    joins: String,
}

impl From<&Projection> for ProjectionRow {
    fn from(projection: &Projection) -> Self {
        let joins: Vec<_> = projection
            .joins
            .iter()
            .map(|edge| edge.reference_name())
            .collect();
        Self {
            alias: projection.alias.clone(),
            expression: projection.expression.clone(),
            tables: projection.tables.join(", "),
            joins: joins.join(", "),
        }
    }
}

/// Format the rewrite report as human-readable text with optional colors.
pub fn format_table(result: &RewriteResult, quiet: bool, use_colors: bool) -> String {
    let colored = use_colors && std::io::stdout().is_terminal();
    let mut out = String::new();

    write_header(&mut out, colored);
    write_summary(&mut out, result, colored);
    write_projections(&mut out, result, colored);
    write_joins(&mut out, result, colored);

    if !quiet {
        write_issues(&mut out, result, colored);
    }

    out
}

fn write_header(out: &mut String, colored: bool) {
    let title = "sqlprune Rewrite";
    let line = "═".repeat(50);

    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
        writeln!(out, "{}", line.dimmed()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
        writeln!(out, "{line}").unwrap();
    }
}

fn write_summary(out: &mut String, result: &RewriteResult, colored: bool) {
    let summary = &result.summary;
    let base = match &result.base_table.alias {
        Some(alias) => format!("{} {alias}", result.base_table.name),
        None => result.base_table.name.clone(),
    };
    writeln!(out, "Base table: {base}").unwrap();
    writeln!(out).unwrap();

    let stats = format!(
        "Summary: {} projections | {} of {} joins kept",
        summary.projection_count, summary.retained_join_count, summary.join_count
    );

    if colored {
        writeln!(out, "{}", stats.cyan()).unwrap();
    } else {
        writeln!(out, "{stats}").unwrap();
    }

    writeln!(out).unwrap();
}

fn write_section_title(out: &mut String, title: &str, colored: bool) {
    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
    }
}

fn write_projections(out: &mut String, result: &RewriteResult, colored: bool) {
    if result.projections.is_empty() {
        return;
    }

    write_section_title(out, "Projections:", colored);
    let rows: Vec<ProjectionRow> = result.projections.iter().map(Into::into).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    writeln!(out, "{table}").unwrap();
    writeln!(out).unwrap();
}

fn write_joins(out: &mut String, result: &RewriteResult, colored: bool) {
    if result.joins.is_empty() {
        return;
    }

    write_section_title(out, "Joins:", colored);
    for edge in &result.joins {
        let retained = result
            .projections
            .iter()
            .flat_map(|p| p.joins.iter())
            .any(|attached| attached.dependency_fragments.iter().any(|f| f == edge.clause()));
        let marker = match (retained, colored) {
            (true, true) => "+".green().to_string(),
            (true, false) => "+".to_string(),
            (false, true) => "-".dimmed().to_string(),
            (false, false) => "-".to_string(),
        };
        writeln!(out, "  {marker} {}", edge.clause()).unwrap();
        if !edge.dependencies.is_empty() {
            writeln!(out, "      needs: {}", edge.dependencies.join(", ")).unwrap();
        }
    }
    writeln!(out).unwrap();
}

fn write_issues(out: &mut String, result: &RewriteResult, colored: bool) {
    if result.issues.is_empty() {
        return;
    }

    let error_count = result.summary.issue_count.errors;
    let warning_count = result.summary.issue_count.warnings;
    let info_count = result.summary.issue_count.infos;

    let mut parts = Vec::new();
    if error_count > 0 {
        parts.push(format!("{error_count} errors"));
    }
    if warning_count > 0 {
        parts.push(format!("{warning_count} warnings"));
    }
    if info_count > 0 {
        parts.push(format!("{info_count} info"));
    }

    write_section_title(out, &format!("Issues ({}):", parts.join(", ")), colored);

    for issue in &result.issues {
        let label = match issue.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        };
        let severity_str = if colored {
            match issue.severity {
                Severity::Error => label.red().to_string(),
                Severity::Warning => label.yellow().to_string(),
                Severity::Info => label.blue().to_string(),
            }
        } else {
            label.to_string()
        };

        writeln!(out, "  [{severity_str}] {}", issue.message).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlprune_core::{rewrite, RewriteRequest, SelectionSet};

    const SQL: &str = "SELECT a.id AS id, c.label AS label \
        FROM t1 a \
        JOIN t2 b ON a.id = b.t1_id \
        JOIN t3 c ON b.id = c.t2_id \
        LEFT JOIN t4 d ON a.id = d.t1_id";

    fn result(selection: &[&str]) -> RewriteResult {
        let request = RewriteRequest::new(SQL, SelectionSet::from_aliases(selection.iter().copied()));
        rewrite(&request).unwrap()
    }

    #[test]
    fn test_format_table_basic() {
        let output = format_table(&result(&["label"]), false, false);
        assert!(output.contains("sqlprune Rewrite"));
        assert!(output.contains("Base table: t1 a"));
        assert!(output.contains("Summary: 1 projections | 2 of 3 joins kept"));
        assert!(output.contains("c.label"));
    }

    #[test]
    fn test_joins_are_marked_by_retention() {
        let output = format_table(&result(&["label"]), false, false);
        assert!(output.contains("  + JOIN t2 b ON a.id = b.t1_id"));
        assert!(output.contains("  - LEFT JOIN t4 d ON a.id = d.t1_id"));
        assert!(output.contains("needs: b"));
    }

    #[test]
    fn test_format_table_quiet_hides_issues() {
        let result = result(&["missing"]);
        assert!(!result.issues.is_empty());

        let verbose = format_table(&result, false, false);
        let quiet = format_table(&result, true, false);
        assert!(verbose.contains("Issues ("));
        assert!(!quiet.contains("Issues ("));
    }

    #[test]
    fn test_unresolved_dependency_is_listed_as_error() {
        let request = RewriteRequest::new(
            "SELECT a.id, b.name FROM t1 a JOIN t2 b ON a.id = b.t1_id AND b.zone = z.id",
            SelectionSet::from_aliases(["name"]),
        );
        let output = format_table(&rewrite(&request).unwrap(), false, false);
        assert!(output.contains("Issues (1 errors):"));
        assert!(output.contains("  [ERROR] Join dependency 'z'"));
    }
}
