//! Common types shared between request and response.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A non-fatal issue encountered while pruning (error, warning, or info).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Severity level
    pub severity: Severity,

    /// Machine-readable issue code
    pub code: String,

    /// Human-readable message
    pub message: String,
}

impl Issue {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Summary statistics for a rewrite.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of retained projections
    pub projection_count: usize,

    /// Number of joins in the original chain
    pub join_count: usize,

    /// Number of distinct join fragments in the rewritten statement
    pub retained_join_count: usize,

    /// Issue counts by severity
    pub issue_count: IssueCount,

    /// Quick check: true if any error-level issue was recorded
    pub has_errors: bool,
}

/// Counts of issues by severity level.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueCount {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueCount {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut count = Self::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => count.errors += 1,
                Severity::Warning => count.warnings += 1,
                Severity::Info => count.infos += 1,
            }
        }
        count
    }
}

/// Machine-readable issue codes.
pub mod issue_codes {
    pub const MULTIPLE_STATEMENTS: &str = "MULTIPLE_STATEMENTS";
    pub const DROPPED_CLAUSE: &str = "DROPPED_CLAUSE";
    pub const WILDCARD_SKIPPED: &str = "WILDCARD_SKIPPED";
    pub const UNMATCHED_SELECTION: &str = "UNMATCHED_SELECTION";
    pub const EMPTY_SELECTION: &str = "EMPTY_SELECTION";
    pub const UNRESOLVED_JOIN_DEPENDENCY: &str = "UNRESOLVED_JOIN_DEPENDENCY";
    pub const CIRCULAR_JOIN_DEPENDENCY: &str = "CIRCULAR_JOIN_DEPENDENCY";
    pub const EXPRESSION_DEPTH_LIMIT: &str = "EXPRESSION_DEPTH_LIMIT";
}
