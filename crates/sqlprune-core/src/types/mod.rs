//! Types for the join pruning API.
//!
//! A [`RewriteRequest`] carries the SQL script, the dialect and the selection
//! of output aliases to keep; a [`RewriteResult`] carries the reduced
//! statement plus a structured report of every retained projection and the
//! joins it needs.

mod common;
mod request;
mod response;

pub use common::{issue_codes, Issue, IssueCount, Severity, Summary};
pub use request::{Dialect, RewriteConfig, RewriteOptions, RewriteRequest};
pub use response::{BaseTable, JoinEdge, OutputColumn, Projection, RewriteResult};
