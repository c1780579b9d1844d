//! Join dependency resolution.
//!
//! A join whose ON condition references a table other than its own left and
//! right sides can only be emitted together with the join that introduces
//! that table. Resolution runs in two steps over the chain-ordered edges:
//!
//! 1. Direct dependencies: each foreign qualifier is matched against another
//!    edge, first by reference name (alias, or table name when unaliased),
//!    then by physical table name. The first match in chain order wins.
//! 2. Closures: each edge's fragment list becomes
//!    `[self] ++ closure(dep1) ++ closure(dep2) ...`, following dependencies
//!    depth first and refusing to revisit an edge already on the current path.
//!
//! The resolved edges are frozen behind `Arc` so projections can share them.

use super::helpers::{push_unique, stable_unique};
use crate::types::{issue_codes, Issue, JoinEdge};
use std::sync::Arc;
#[cfg(feature = "tracing")]
use tracing::debug;

pub(crate) struct DependencyResolver {
    edges: Vec<JoinEdge>,
    direct: Vec<Vec<usize>>,
    issues: Vec<Issue>,
}

impl DependencyResolver {
    /// Resolves every edge and returns the frozen list plus any diagnostics.
    pub(crate) fn resolve(edges: Vec<JoinEdge>) -> (Vec<Arc<JoinEdge>>, Vec<Issue>) {
        let mut resolver = Self {
            direct: vec![Vec::new(); edges.len()],
            edges,
            issues: Vec::new(),
        };
        resolver.link_direct_dependencies();
        resolver.expand_closures();

        let Self { edges, issues, .. } = resolver;
        (edges.into_iter().map(Arc::new).collect(), issues)
    }

    fn link_direct_dependencies(&mut self) {
        for index in 0..self.edges.len() {
            let edge = &self.edges[index];
            let left_reference = edge.left_alias.as_deref().unwrap_or(&edge.left_table);
            let foreign: Vec<String> = edge
                .tables
                .iter()
                .filter(|t| {
                    !t.is_empty() && t.as_str() != left_reference && t.as_str() != edge.reference_name()
                })
                .cloned()
                .collect();

            for table in foreign {
                match self.find_provider(index, &table) {
                    Some(provider) => {
                        #[cfg(feature = "tracing")]
                        debug!(
                            join = self.edges[index].reference_name(),
                            depends_on = self.edges[provider].reference_name(),
                            "Resolved join dependency"
                        );
                        push_unique(&mut self.direct[index], provider);
                    }
                    None => {
                        // The emitted clause still names the missing table.
                        let message = format!(
                            "Join dependency '{table}' referenced by '{}' not found",
                            self.edges[index].clause()
                        );
                        push_unique(
                            &mut self.issues,
                            Issue::error(issue_codes::UNRESOLVED_JOIN_DEPENDENCY, message),
                        );
                    }
                }
            }
        }
    }

    /// First other edge whose reference name, then whose table name, is `table`.
    fn find_provider(&self, index: usize, table: &str) -> Option<usize> {
        let others = || {
            self.edges
                .iter()
                .enumerate()
                .filter(move |(other, _)| *other != index)
        };
        others()
            .find(|(_, edge)| edge.reference_name() == table)
            .or_else(|| others().find(|(_, edge)| edge.right_table == table))
            .map(|(other, _)| other)
    }

    fn expand_closures(&mut self) {
        let closures: Vec<(Vec<String>, Vec<String>)> = (0..self.edges.len())
            .map(|index| {
                let mut fragments = Vec::new();
                let mut tables = Vec::new();
                let mut path = Vec::new();
                self.collect_closure(index, &mut path, &mut fragments, &mut tables);
                (fragments, stable_unique(tables))
            })
            .collect();

        for (index, (fragments, tables)) in closures.into_iter().enumerate() {
            let dependencies = self.direct[index]
                .iter()
                .map(|&dep| self.edges[dep].reference_name().to_string())
                .collect();
            let edge = &mut self.edges[index];
            edge.dependency_fragments = fragments;
            edge.required_tables = tables;
            edge.dependencies = dependencies;
        }
    }

    fn collect_closure(
        &mut self,
        index: usize,
        path: &mut Vec<usize>,
        fragments: &mut Vec<String>,
        tables: &mut Vec<String>,
    ) {
        path.push(index);
        fragments.push(self.edges[index].clause().to_string());
        tables.push(self.edges[index].right_table.clone());

        for dep in self.direct[index].clone() {
            if path.contains(&dep) {
                let message = format!(
                    "Circular join dependency: '{}' depends on '{}', which is already being resolved",
                    self.edges[index].reference_name(),
                    self.edges[dep].reference_name()
                );
                push_unique(
                    &mut self.issues,
                    Issue::warning(issue_codes::CIRCULAR_JOIN_DEPENDENCY, message),
                );
                continue;
            }
            self.collect_closure(dep, path, fragments, tables);
        }

        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn edge(alias: &str, table: &str, references: &[&str]) -> JoinEdge {
        JoinEdge {
            left_table: "t1".to_string(),
            left_alias: Some("a".to_string()),
            join_type: "JOIN".to_string(),
            right_table: table.to_string(),
            right_alias: Some(alias.to_string()),
            on_condition: String::new(),
            tables: references.iter().map(|r| r.to_string()).collect(),
            columns: Vec::new(),
            dependency_fragments: vec![format!("JOIN {table} {alias}")],
            dependencies: Vec::new(),
            required_tables: vec![table.to_string()],
        }
    }

    #[test]
    fn edge_on_base_only_depends_on_nothing() {
        let (edges, issues) = DependencyResolver::resolve(vec![edge("b", "t2", &["a", "b"])]);
        assert_eq!(edges[0].dependency_fragments, vec!["JOIN t2 b"]);
        assert!(edges[0].dependencies.is_empty());
        assert!(issues.is_empty());
    }

    #[test]
    fn later_declared_dependency_is_followed() {
        let (edges, issues) = DependencyResolver::resolve(vec![
            edge("b", "t2", &["a", "b", "c"]),
            edge("c", "t3", &["a", "c"]),
        ]);
        assert!(issues.is_empty());
        assert_eq!(edges[0].dependency_fragments, vec!["JOIN t2 b", "JOIN t3 c"]);
        assert_eq!(edges[0].dependencies, vec!["c"]);
        assert_eq!(edges[0].required_tables, vec!["t2", "t3"]);
        let emitted: Vec<_> = edges[0].fragments_for_emission().collect();
        assert_eq!(emitted, vec!["JOIN t3 c", "JOIN t2 b"]);
    }

    #[test]
    fn closure_is_transitive() {
        let (edges, _) = DependencyResolver::resolve(vec![
            edge("b", "t2", &["a", "b"]),
            edge("c", "t3", &["b", "c"]),
            edge("d", "t4", &["c", "d"]),
        ]);
        assert_eq!(
            edges[2].dependency_fragments,
            vec!["JOIN t4 d", "JOIN t3 c", "JOIN t2 b"]
        );
        assert_eq!(edges[2].dependencies, vec!["c"]);
    }

    #[test]
    fn falls_back_to_table_name() {
        let (edges, issues) = DependencyResolver::resolve(vec![
            edge("b", "t2", &["a", "b"]),
            edge("c", "t3", &["t2", "c"]),
        ]);
        assert!(issues.is_empty());
        assert_eq!(edges[1].dependencies, vec!["b"]);
    }

    #[test]
    fn unresolved_reference_is_reported() {
        let (edges, issues) = DependencyResolver::resolve(vec![edge("b", "t2", &["zz", "b"])]);
        assert_eq!(edges[0].dependency_fragments, vec!["JOIN t2 b"]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, issue_codes::UNRESOLVED_JOIN_DEPENDENCY);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].message.contains("not found"));
    }

    #[test]
    fn cycles_terminate_with_a_warning() {
        let (edges, issues) = DependencyResolver::resolve(vec![
            edge("b", "t2", &["c", "b"]),
            edge("c", "t3", &["b", "c"]),
        ]);
        assert_eq!(edges[0].dependency_fragments, vec!["JOIN t2 b", "JOIN t3 c"]);
        assert_eq!(edges[1].dependency_fragments, vec!["JOIN t3 c", "JOIN t2 b"]);
        assert!(issues
            .iter()
            .all(|i| i.code == issue_codes::CIRCULAR_JOIN_DEPENDENCY));
        assert!(!issues.is_empty());
    }

    #[test]
    fn first_match_wins_for_shared_table_names() {
        let (edges, _) = DependencyResolver::resolve(vec![
            edge("b1", "t2", &["a", "b1"]),
            edge("b2", "t2", &["a", "b2"]),
            edge("c", "t3", &["t2", "c"]),
        ]);
        assert_eq!(edges[2].dependencies, vec!["b1"]);
    }
}
