//! Input handling for file reading and stdin support.

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::Path;

/// SQL text plus where it came from.
#[derive(Debug, Clone)]
pub struct SqlSource {
    pub name: String,
    pub content: String,
}

/// Read SQL from `file`, or from stdin when no file is given.
pub fn read_input(file: Option<&Path>) -> Result<SqlSource> {
    match file {
        Some(path) => read_from_file(path),
        None => read_from_stdin(),
    }
}

fn read_from_stdin() -> Result<SqlSource> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;

    Ok(SqlSource {
        name: "<stdin>".to_string(),
        content,
    })
}

pub fn read_from_file(path: &Path) -> Result<SqlSource> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    Ok(SqlSource {
        name: path.display().to_string(),
        content,
    })
}
