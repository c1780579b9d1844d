//! Closed variant model the analyzer works on.
//!
//! The sqlparser AST is lowered into these types once (see [`super::lower`]);
//! every component after that matches on a small, exhaustive set of shapes
//! instead of the parser's full node hierarchy.

/// Expression kinds relevant to column/table usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SqlExpr {
    /// `name` or `qualifier.name`
    Column {
        qualifier: Option<String>,
        name: String,
    },
    /// `=`, `<>`, `LIKE`, `IN`, `IS DISTINCT FROM` and friends
    Comparison {
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
    And(Box<SqlExpr>, Box<SqlExpr>),
    Or(Box<SqlExpr>, Box<SqlExpr>),
    /// `IS [NOT] NULL/TRUE/FALSE/UNKNOWN`
    Is(Box<SqlExpr>),
    Paren(Box<SqlExpr>),
    /// Arithmetic, string concatenation and any other binary operator
    Binary {
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
    Function {
        name: String,
        args: Vec<SqlExpr>,
    },
    Case {
        operand: Option<Box<SqlExpr>>,
        whens: Vec<(SqlExpr, SqlExpr)>,
        else_result: Option<Box<SqlExpr>>,
    },
    /// Scalar, `EXISTS` or `IN` subquery, reduced to its own FROM tables
    Subquery { from_tables: Vec<String> },
    /// `IN (...)` list or row tuple
    List(Vec<SqlExpr>),
    /// Literals, casts, unary operators and anything else
    Other,
}

impl SqlExpr {
    pub(crate) fn column(qualifier: Option<&str>, name: &str) -> Self {
        Self::Column {
            qualifier: qualifier.map(str::to_string),
            name: name.to_string(),
        }
    }

    pub(crate) fn as_column(&self) -> Option<(Option<&str>, &str)> {
        match self {
            Self::Column { qualifier, name } => Some((qualifier.as_deref(), name.as_str())),
            _ => None,
        }
    }
}

/// A table reference in the FROM chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relation {
    /// Physical table name used for dependency lookups
    pub(crate) table: String,
    /// Text rendered in the emitted statement
    pub(crate) source: String,
    pub(crate) alias: Option<String>,
}

impl Relation {
    #[cfg(test)]
    pub(crate) fn named(table: &str, alias: Option<&str>) -> Self {
        Self {
            table: table.to_string(),
            source: table.to_string(),
            alias: alias.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JoinConstraintKind {
    On { expr: SqlExpr, text: String },
    Using(Vec<String>),
    Natural,
    None,
}

/// The FROM clause, nested so the outermost node's right side is the last
/// written join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TableExpr {
    Table(Relation),
    Join {
        left: Box<TableExpr>,
        right: Relation,
        join_type: String,
        constraint: JoinConstraintKind,
    },
}

/// One select-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectEntry {
    pub(crate) expr: SqlExpr,
    /// Rendered source expression
    pub(crate) text: String,
    /// Explicit `AS` alias
    pub(crate) alias: Option<String>,
}

impl SelectEntry {
    /// The name this entry is selected by: its alias, or the bare column name
    /// of an unaliased plain column.
    pub(crate) fn output_name(&self) -> Option<&str> {
        match &self.alias {
            Some(alias) => Some(alias.as_str()),
            None => self.expr.as_column().map(|(_, name)| name),
        }
    }
}
