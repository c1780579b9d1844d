//! SQL text reconstruction.

use super::helpers::stable_unique;
use crate::types::{BaseTable, Projection};

/// Select and join fragments of the reduced statement, deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EmittedQuery {
    pub(crate) select_fragments: Vec<String>,
    pub(crate) from: String,
    pub(crate) join_fragments: Vec<String>,
}

impl EmittedQuery {
    pub(crate) fn render(&self) -> String {
        format!(
            "SELECT\n{}\nFROM {}\n{}",
            self.select_fragments.join("\n"),
            self.from,
            self.join_fragments.join("\n")
        )
    }
}

pub(crate) struct QueryEmitter<'a> {
    base: &'a BaseTable,
    trailing_marker: Option<&'a str>,
}

impl<'a> QueryEmitter<'a> {
    pub(crate) fn new(base: &'a BaseTable, trailing_marker: Option<&'a str>) -> Self {
        Self {
            base,
            trailing_marker,
        }
    }

    pub(crate) fn emit(&self, projections: &[Projection]) -> EmittedQuery {
        let mut select_fragments = Vec::with_capacity(projections.len() + 1);
        let mut join_fragments = Vec::new();

        for projection in projections {
            select_fragments.push(if projection.alias.is_empty() {
                format!("{}, ", projection.expression)
            } else {
                format!("{} AS {}, ", projection.expression, projection.alias)
            });
            for edge in &projection.joins {
                join_fragments.extend(edge.fragments_for_emission().map(str::to_string));
            }
        }

        let mut select_fragments = stable_unique(select_fragments);
        let join_fragments = stable_unique(join_fragments);

        match self.trailing_marker {
            Some(marker) => select_fragments.push(marker.to_string()),
            None => {
                if let Some(last) = select_fragments.last_mut() {
                    let trimmed_len = last.trim_end_matches(' ').trim_end_matches(',').len();
                    last.truncate(trimmed_len);
                }
            }
        }

        let from = match &self.base.alias {
            Some(alias) => format!("{} {alias}", self.base.source),
            None => self.base.source.clone(),
        };

        EmittedQuery {
            select_fragments,
            from,
            join_fragments,
        }
    }
}
