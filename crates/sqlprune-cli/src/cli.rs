//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// sqlprune - keep only the joins your chosen columns need
#[derive(Parser, Debug)]
#[command(name = "sqlprune")]
#[command(
    about = "Reduce a multi-join SELECT to the columns you pick and the joins they require",
    long_about = None
)]
#[command(version)]
pub struct Args {
    /// SQL file to rewrite (asked for interactively, or read from stdin, if omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// SQL dialect
    #[arg(short, long, default_value = "generic", value_enum)]
    pub dialect: DialectArg,

    /// JSON config with the column catalog, placeholder rules and trailing marker
    #[arg(short = 'C', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Comma-separated output aliases to keep (skips the prompt)
    #[arg(short, long, value_delimiter = ',', value_name = "ALIASES")]
    pub select: Vec<String>,

    /// Keep every output column (skips the prompt)
    #[arg(long, conflicts_with_all = ["select", "defaults"])]
    pub all: bool,

    /// Keep the catalog's default columns (skips the prompt)
    #[arg(long, conflicts_with = "select")]
    pub defaults: bool,

    /// Output file for the rewritten SQL (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write the JSON projection report to this file
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "sql", value_enum)]
    pub format: OutputFormat,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Fragment appended after the last select expression (overrides the config)
    #[arg(short, long, value_name = "TEXT")]
    pub marker: Option<String>,
}

impl Args {
    /// Whether the selection comes from flags rather than the prompt.
    pub fn has_selection_flags(&self) -> bool {
        self.all || self.defaults || !self.select.is_empty()
    }
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Ansi,
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl From<DialectArg> for sqlprune_core::Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => sqlprune_core::Dialect::Generic,
            DialectArg::Ansi => sqlprune_core::Dialect::Ansi,
            DialectArg::Bigquery => sqlprune_core::Dialect::Bigquery,
            DialectArg::Clickhouse => sqlprune_core::Dialect::Clickhouse,
            DialectArg::Databricks => sqlprune_core::Dialect::Databricks,
            DialectArg::Duckdb => sqlprune_core::Dialect::Duckdb,
            DialectArg::Hive => sqlprune_core::Dialect::Hive,
            DialectArg::Mssql => sqlprune_core::Dialect::Mssql,
            DialectArg::Mysql => sqlprune_core::Dialect::Mysql,
            DialectArg::Postgres => sqlprune_core::Dialect::Postgres,
            DialectArg::Redshift => sqlprune_core::Dialect::Redshift,
            DialectArg::Snowflake => sqlprune_core::Dialect::Snowflake,
            DialectArg::Sqlite => sqlprune_core::Dialect::Sqlite,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The rewritten statement
    Sql,
    /// The full projection report
    Json,
    /// Human-readable summary
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_conversion() {
        let dialect: sqlprune_core::Dialect = DialectArg::Postgres.into();
        assert_eq!(dialect, sqlprune_core::Dialect::Postgres);
    }

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::parse_from(["sqlprune"]);
        assert!(args.file.is_none());
        assert_eq!(args.dialect, DialectArg::Generic);
        assert_eq!(args.format, OutputFormat::Sql);
        assert!(!args.has_selection_flags());
    }

    #[test]
    fn test_parse_full_args() {
        let args = Args::parse_from([
            "sqlprune",
            "-d",
            "postgres",
            "-C",
            "report.json",
            "-s",
            "order_id,account_id",
            "-o",
            "out.sql",
            "-r",
            "report-out.json",
            "-f",
            "json",
            "-m",
            "@extra_column,",
            "--compact",
            "query.sql",
        ]);
        assert_eq!(args.dialect, DialectArg::Postgres);
        assert_eq!(args.select, vec!["order_id", "account_id"]);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.marker.as_deref(), Some("@extra_column,"));
        assert_eq!(args.file, Some(PathBuf::from("query.sql")));
        assert!(args.compact);
        assert!(args.has_selection_flags());
    }

    #[test]
    fn test_all_conflicts_with_select() {
        let result = Args::try_parse_from(["sqlprune", "--all", "-s", "id", "q.sql"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_flag() {
        let args = Args::parse_from(["sqlprune", "--defaults", "q.sql"]);
        assert!(args.defaults);
        assert!(args.has_selection_flags());
    }
}
