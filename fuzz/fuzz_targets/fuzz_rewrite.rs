//! Fuzz target for the join pruner.
//!
//! `rewrite()` must not panic on arbitrary SQL, selections or placeholder
//! modes, and whatever it emits must be a `SELECT`.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sqlprune_core::{
    rewrite, Dialect, PlaceholderConfig, PlaceholderMode, RewriteOptions, RewriteRequest,
    SelectionSet,
};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sql: String,
    selection: Vec<String>,
    dialect_idx: u8,
    mode_idx: u8,
    marker: Option<String>,
}

impl FuzzInput {
    fn dialect(&self) -> Dialect {
        match self.dialect_idx % 4 {
            0 => Dialect::Generic,
            1 => Dialect::Postgres,
            2 => Dialect::Mysql,
            _ => Dialect::Snowflake,
        }
    }

    fn mode(&self) -> PlaceholderMode {
        match self.mode_idx % 3 {
            0 => PlaceholderMode::Literal,
            1 => PlaceholderMode::List,
            _ => PlaceholderMode::Comment,
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let options = RewriteOptions {
        placeholders: PlaceholderConfig {
            rules: Vec::new(),
            default_mode: input.mode(),
        },
        trailing_marker: input.marker.clone(),
    };
    let request = RewriteRequest::new(
        input.sql.clone(),
        SelectionSet::from_aliases(input.selection.iter().cloned()),
    )
    .with_dialect(input.dialect())
    .with_options(options);

    if let Ok(result) = rewrite(&request) {
        assert!(result.sql.starts_with("SELECT\n"));
        assert_eq!(result.summary.join_count, result.joins.len());
    }
});
