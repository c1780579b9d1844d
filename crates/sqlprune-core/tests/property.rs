mod common;

use common::{join_lines, prune};
use proptest::prelude::*;
use sqlprune_core::placeholder::{preprocess, PlaceholderConfig, PlaceholderMode, PlaceholderRule};

const ALIASES: [&str; 3] = ["b", "c", "d"];
const COLUMNS: [&str; 3] = ["x", "y", "z"];

fn star_chain() -> &'static str {
    "FROM t1 a JOIN t2 b ON a.id = b.id JOIN t3 c ON a.id = c.id JOIN t4 d ON a.id = d.id"
}

fn first_seen<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.iter().any(|o| o == item) {
            out.push(item.to_string());
        }
    }
    out
}

proptest! {
    #[test]
    fn column_usage_is_first_seen_and_unique(
        refs in prop::collection::vec((0usize..3, 0usize..3), 1..12)
    ) {
        let args: Vec<String> = refs
            .iter()
            .map(|(t, c)| format!("{}.{}", ALIASES[*t], COLUMNS[*c]))
            .collect();
        let sql = format!("SELECT CONCAT({}) AS out {}", args.join(", "), star_chain());

        let result = prune(&sql, &["out"]);
        let projection = &result.projections[0];

        prop_assert_eq!(
            &projection.columns,
            &first_seen(refs.iter().map(|(_, c)| COLUMNS[*c]))
        );
        prop_assert_eq!(
            &projection.table_aliases,
            &first_seen(refs.iter().map(|(t, _)| ALIASES[*t]))
        );
    }

    #[test]
    fn dependency_closure_terminates_with_self_first(
        targets in prop::collection::vec(0usize..6, 2..6)
    ) {
        // Edge i also references edge targets[i] (possibly itself or a cycle).
        let n = targets.len();
        let mut sql = String::from("SELECT ");
        sql.push_str(
            &(0..n)
                .map(|i| format!("e{i}.v AS v{i}"))
                .collect::<Vec<_>>()
                .join(", "),
        );
        sql.push_str(" FROM t0 a");
        for (i, target) in targets.iter().enumerate() {
            let j = target % n;
            sql.push_str(&format!(" JOIN t{} e{i} ON a.id = e{i}.id AND e{i}.r = e{j}.id", i + 1));
        }

        let selection: Vec<String> = (0..n).map(|i| format!("v{i}")).collect();
        let selection: Vec<&str> = selection.iter().map(String::as_str).collect();
        let result = prune(&sql, &selection);

        for (i, edge) in result.joins.iter().enumerate() {
            prop_assert!(!edge.dependency_fragments.is_empty());
            let own = format!("JOIN t{} e{i} ON", i + 1);
            prop_assert!(edge.dependency_fragments[0].starts_with(&own));
            prop_assert!(edge.dependency_fragments.len() <= n);
        }

        let lines = join_lines(&result);
        prop_assert_eq!(lines.len(), n);
        prop_assert_eq!(first_seen(lines.iter().copied()).len(), n);
    }

    #[test]
    fn placeholders_round_trip_verbatim(text in "[a-z0-9 ,=()@_']{0,40}", list in any::<bool>()) {
        let config = PlaceholderConfig {
            rules: Vec::new(),
            default_mode: if list { PlaceholderMode::List } else { PlaceholderMode::Literal },
        };
        let prepared = preprocess(&text, &config);
        prop_assert_eq!(prepared.restore(&prepared.sql), text);
    }

    #[test]
    fn placeholders_in_join_conditions_are_restored(name in "[a-z_][a-z0-9_]{0,10}") {
        let sql = format!(
            "SELECT a.id, b.k AS k FROM t1 a JOIN t2 b ON a.id = b.t1_id AND b.k = @{name}"
        );
        let result = prune(&sql, &["k"]);
        let raw = format!("b.k = @{name}");
        let quoted = format!("'@{name}'");
        prop_assert!(result.sql.contains(&raw));
        prop_assert!(!result.sql.contains(&quoted));
    }

    #[test]
    fn rewriting_twice_is_stable(
        refs in prop::collection::vec((0usize..3, 0usize..3), 1..6)
    ) {
        let select: Vec<String> = refs
            .iter()
            .enumerate()
            .map(|(i, (t, c))| format!("{}.{} AS o{i}", ALIASES[*t], COLUMNS[*c]))
            .collect();
        let sql = format!("SELECT {} {}", select.join(", "), star_chain());
        let selection: Vec<String> = (0..refs.len()).map(|i| format!("o{i}")).collect();
        let selection: Vec<&str> = selection.iter().map(String::as_str).collect();

        let once = prune(&sql, &selection);
        let twice = prune(&once.sql, &selection);
        prop_assert_eq!(&once.sql, &twice.sql);
    }
}

#[test]
fn list_rules_override_the_default_mode() {
    let config = PlaceholderConfig {
        rules: vec![PlaceholderRule {
            name: "ids".to_string(),
            mode: PlaceholderMode::List,
        }],
        default_mode: PlaceholderMode::Literal,
    };
    let prepared = preprocess("x IN @ids AND y = @id", &config);
    assert_eq!(prepared.sql, "x IN ('@ids') AND y = '@id'");
}
