//! JSON output formatting.

use anyhow::{Context, Result};
use sqlprune_core::RewriteResult;

/// Format the rewrite report as JSON.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json(result: &RewriteResult, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(result)
    } else {
        serde_json::to_string_pretty(result)
    };
    json.context("Failed to serialize rewrite report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlprune_core::{rewrite, RewriteRequest, SelectionSet};

    fn result() -> RewriteResult {
        let request = RewriteRequest::new(
            "SELECT a.id AS id, b.name AS name FROM t1 a JOIN t2 b ON a.id = b.t1_id",
            SelectionSet::from_aliases(["name"]),
        );
        rewrite(&request).unwrap()
    }

    #[test]
    fn test_json_pretty() {
        let json = format_json(&result(), false).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"dependencyFragments\""));
        assert!(json.contains("\"summary\""));
    }

    #[test]
    fn test_json_compact() {
        let json = format_json(&result(), true).unwrap();
        assert!(!json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["projections"][0]["alias"], "name");
    }
}
