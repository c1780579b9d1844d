//! Rewrite configuration loading.

use anyhow::{Context, Result};
use sqlprune_core::RewriteConfig;
use std::path::Path;

/// Load the JSON config at `path`, or the empty default when none is given.
pub fn load_config(path: Option<&Path>) -> Result<RewriteConfig> {
    let Some(path) = path else {
        return Ok(RewriteConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_path_gives_default() {
        let config = load_config(None).unwrap();
        assert!(config.catalog.is_none());
        assert!(config.trailing_marker.is_none());
    }

    #[test]
    fn test_load_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"catalog": {{"columns": [{{"alias": "order_id", "label": "Order ID", "required": true}}]}},
                "trailingMarker": "@extra_column,"}}"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        let catalog = config.catalog.unwrap();
        assert_eq!(catalog.columns[0].alias, "order_id");
        assert!(catalog.columns[0].required);
        assert_eq!(config.trailing_marker.as_deref(), Some("@extra_column,"));
    }

    #[test]
    fn test_invalid_json_names_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("Invalid config file"));
    }
}
