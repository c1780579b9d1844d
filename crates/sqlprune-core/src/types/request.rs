//! Request types for the join pruning API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{ColumnCatalog, SelectionSet};
use crate::placeholder::PlaceholderConfig;

/// A request to prune one multi-join `SELECT` down to a chosen set of outputs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    /// The SQL script. Only its first statement is rewritten.
    pub sql: String,

    /// SQL dialect
    #[serde(default)]
    pub dialect: Dialect,

    /// Output aliases to keep
    pub selection: SelectionSet,

    /// Optional rewrite options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RewriteOptions>,
}

impl RewriteRequest {
    pub fn new(sql: impl Into<String>, selection: SelectionSet) -> Self {
        Self {
            sql: sql.into(),
            dialect: Dialect::default(),
            selection,
            options: None,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Options that shape preprocessing and the emitted text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOptions {
    /// How `@placeholder` tokens are made parseable and restored
    #[serde(default)]
    pub placeholders: PlaceholderConfig,

    /// Fragment appended after the last select expression (e.g. a macro
    /// column substituted downstream). When absent the trailing comma of the
    /// last select expression is dropped instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_marker: Option<String>,
}

/// Configuration file consumed by the CLI.
///
/// Bundles the column catalog used for interactive selection with the
/// rewrite options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewriteConfig {
    /// Known output columns, in display order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<ColumnCatalog>,

    #[serde(default)]
    pub placeholders: PlaceholderConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_marker: Option<String>,
}

impl RewriteConfig {
    pub fn options(&self) -> RewriteOptions {
        RewriteOptions {
            placeholders: self.placeholders.clone(),
            trailing_marker: self.trailing_marker.clone(),
        }
    }
}

/// SQL dialect used to parse the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Generic,
    Ansi,
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl Dialect {
    pub fn to_sqlparser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{
            AnsiDialect, BigQueryDialect, ClickHouseDialect, DatabricksDialect, DuckDbDialect,
            GenericDialect, HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
            RedshiftSqlDialect, SQLiteDialect, SnowflakeDialect,
        };
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Ansi => Box::new(AnsiDialect {}),
            Self::Bigquery => Box::new(BigQueryDialect {}),
            Self::Clickhouse => Box::new(ClickHouseDialect {}),
            Self::Databricks => Box::new(DatabricksDialect {}),
            Self::Duckdb => Box::new(DuckDbDialect {}),
            Self::Hive => Box::new(HiveDialect {}),
            Self::Mssql => Box::new(MsSqlDialect {}),
            Self::Mysql => Box::new(MySqlDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Redshift => Box::new(RedshiftSqlDialect {}),
            Self::Snowflake => Box::new(SnowflakeDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
        }
    }
}
