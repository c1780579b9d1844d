use schemars::generate::SchemaSettings;
use serde_json::{json, Value};
use sqlprune_core::{RewriteConfig, RewriteRequest, RewriteResult};

fn generate_schema() -> Value {
    let settings = SchemaSettings::draft07();
    let generator = settings.into_generator();
    json!({
        "RewriteRequest": generator.clone().into_root_schema_for::<RewriteRequest>(),
        "RewriteResult": generator.clone().into_root_schema_for::<RewriteResult>(),
        "RewriteConfig": generator.into_root_schema_for::<RewriteConfig>(),
    })
}

fn property_names(schema: &Value) -> Vec<&str> {
    let mut names: Vec<&str> = schema["properties"]
        .as_object()
        .map(|props| props.keys().map(String::as_str).collect())
        .unwrap_or_default();
    names.sort_unstable();
    names
}

fn sorted<'a>(names: &[&'a str]) -> Vec<&'a str> {
    let mut names = names.to_vec();
    names.sort_unstable();
    names
}

fn definition<'a>(root: &'a Value, name: &str) -> &'a Value {
    &root["definitions"][name]
}

#[test]
fn request_schema_exposes_camel_case_fields() {
    let schema = generate_schema();
    let request = &schema["RewriteRequest"];
    assert_eq!(
        property_names(request),
        sorted(&["sql", "dialect", "selection", "options"])
    );

    let required: Vec<&str> = request["required"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(required.contains(&"sql"));
    assert!(required.contains(&"selection"));
}

#[test]
fn result_schema_describes_projections_and_joins() {
    let schema = generate_schema();
    let result = &schema["RewriteResult"];
    assert_eq!(
        property_names(result),
        sorted(&["sql", "baseTable", "joins", "projections", "issues", "summary"])
    );

    let edge = property_names(definition(result, "JoinEdge"));
    for field in [
        "leftTable",
        "joinType",
        "rightTable",
        "onCondition",
        "dependencyFragments",
        "dependencies",
        "requiredTables",
    ] {
        assert!(edge.contains(&field), "JoinEdge schema is missing {field}");
    }

    let projection = property_names(definition(result, "Projection"));
    for field in ["alias", "expression", "tableAliases", "tables", "columns", "joins"] {
        assert!(projection.contains(&field), "Projection schema is missing {field}");
    }
}

#[test]
fn config_schema_has_catalog_and_placeholders() {
    let schema = generate_schema();
    let config = &schema["RewriteConfig"];
    assert_eq!(
        property_names(config),
        sorted(&["catalog", "placeholders", "trailingMarker"])
    );
    assert!(definition(config, "PlaceholderMode").is_object());
}

#[test]
#[ignore]
fn print_api_schema() {
    println!(
        "{}",
        serde_json::to_string_pretty(&generate_schema()).expect("serialize schema")
    );
}
