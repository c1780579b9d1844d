//! Projection-driven join pruning for large `SELECT` statements.
//!
//! Given one multi-join `SELECT` and a chosen subset of its output columns,
//! [`rewrite`] keeps only those columns and the joins needed to compute them,
//! following join conditions that depend on other joined tables.

pub mod analyzer;
pub mod catalog;
pub mod error;
pub mod parser;
pub mod placeholder;
pub mod types;

// Re-export main types and functions
pub use analyzer::{list_output_columns, rewrite};
pub use catalog::{CatalogColumn, ColumnCatalog, SelectionError, SelectionSet};
pub use error::{ParseError, ParseErrorKind, Position, RewriteError};
pub use parser::{parse_sql, parse_sql_with_dialect};
pub use placeholder::{PlaceholderConfig, PlaceholderMode, PlaceholderRule};

// Re-export types explicitly
pub use types::{
    // Issue codes
    issue_codes,
    // Response types
    BaseTable,
    // Request types
    Dialect,
    Issue,
    IssueCount,
    JoinEdge,
    OutputColumn,
    Projection,
    RewriteConfig,
    RewriteOptions,
    RewriteRequest,
    RewriteResult,
    Severity,
    Summary,
};
