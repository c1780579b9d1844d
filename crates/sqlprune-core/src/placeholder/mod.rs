//! Placeholder preprocessing for vendor macro tokens.
//!
//! Reporting SQL is often stored with free-standing `@name` macros that a
//! downstream system substitutes (`WHERE o.account_id = @account_id`). Those
//! tokens are not valid SQL, so they are rewritten before parsing and restored
//! in the emitted text:
//!
//! ```text
//! raw SQL → [preprocess] → parseable SQL → [parser] → AST → ... → SQL → [restore] → SQL with macros
//! ```
//!
//! # Modes
//!
//! - **Literal**: `@name` → `'@name'` (default)
//! - **List**: `@name` → `('@name')`, for macros that expand to `IN` lists
//! - **Comment**: `@name` → `-- @name`, for macros that expand to whole
//!   clauses; the rest of the line is commented out
//!
//! # Example
//!
//! ```
//! use sqlprune_core::placeholder::{preprocess, PlaceholderConfig};
//!
//! let sql = "SELECT o.id FROM orders o WHERE o.account_id = @account_id";
//! let prepared = preprocess(sql, &PlaceholderConfig::default());
//! assert!(prepared.sql.contains("'@account_id'"));
//! assert_eq!(prepared.restore(&prepared.sql), sql);
//! ```

use regex::{Captures, Regex};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// How placeholder tokens are rewritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderConfig {
    /// Per-name overrides
    #[serde(default)]
    pub rules: Vec<PlaceholderRule>,

    /// Mode for names without a rule
    #[serde(default)]
    pub default_mode: PlaceholderMode,
}

impl PlaceholderConfig {
    fn mode_for(&self, name: &str) -> PlaceholderMode {
        self.rules
            .iter()
            .find(|rule| rule.name.trim_start_matches('@') == name)
            .map(|rule| rule.mode)
            .unwrap_or(self.default_mode)
    }
}

/// Rewrite rule for one placeholder name (with or without the leading `@`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderRule {
    pub name: String,
    pub mode: PlaceholderMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderMode {
    #[default]
    Literal,
    List,
    Comment,
}

impl PlaceholderMode {
    fn encode(self, token: &str) -> String {
        match self {
            Self::Literal => format!("'{token}'"),
            Self::List => format!("('{token}')"),
            Self::Comment => format!("-- {token}"),
        }
    }

    /// First encoding of `token` that does not already occur in `sql`, so
    /// restoring it cannot touch text the caller wrote.
    fn encode_unique(self, token: &str, sql: &str) -> String {
        let plain = self.encode(token);
        if !sql.contains(&plain) {
            return plain;
        }
        (1..)
            .map(|n| self.encode(&format!("{token}#{n}")))
            .find(|candidate| !sql.contains(candidate.as_str()))
            .unwrap_or(plain)
    }
}

/// A placeholder that was rewritten, e.g. `@account_id` in literal mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    /// The token including its `@`
    pub token: String,
    pub mode: PlaceholderMode,
    /// Text the token was rewritten to, e.g. `'@account_id'`
    pub encoded: String,
}

/// Preprocessed SQL plus what is needed to undo the rewrite.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub sql: String,
    pub placeholders: Vec<Placeholder>,
}

impl Preprocessed {
    /// Restores every rewritten placeholder in `text` to its raw `@name` form.
    ///
    /// Only the encodings chosen by [`preprocess`] are replaced; longer ones
    /// first, since `('@x')` contains `'@x'`.
    pub fn restore(&self, text: &str) -> String {
        let mut ordered: Vec<&Placeholder> = self.placeholders.iter().collect();
        ordered.sort_by_key(|p| std::cmp::Reverse(p.encoded.len()));

        let mut restored = text.to_string();
        for placeholder in ordered {
            restored = restored.replace(&placeholder.encoded, &placeholder.token);
        }
        restored
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    // Strings and line comments are matched so that tokens inside them are
    // skipped; `@@name` system variables are matched and left alone.
    TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"'(?:[^']|'')*'|--[^\n]*|@@?[A-Za-z_][A-Za-z0-9_]*")
            .expect("Invalid regex pattern")
    })
}

/// Rewrites free-standing `@name` tokens so the parser accepts the text.
pub fn preprocess(sql: &str, config: &PlaceholderConfig) -> Preprocessed {
    let mut placeholders: Vec<Placeholder> = Vec::new();

    let rewritten = token_regex().replace_all(sql, |caps: &Captures<'_>| {
        let Some(whole) = caps.get(0) else {
            return String::new();
        };
        let token = whole.as_str();
        if !token.starts_with('@')
            || token.starts_with("@@")
            || !is_free_standing(sql, whole.start(), whole.end())
        {
            return token.to_string();
        }

        if let Some(seen) = placeholders.iter().find(|p| p.token == token) {
            return seen.encoded.clone();
        }
        let mode = config.mode_for(&token[1..]);
        let encoded = mode.encode_unique(token, sql);
        placeholders.push(Placeholder {
            token: token.to_string(),
            mode,
            encoded: encoded.clone(),
        });
        encoded
    });

    Preprocessed {
        sql: rewritten.into_owned(),
        placeholders,
    }
}

/// A token glued to a word, a quote or another `@` is left alone.
fn is_free_standing(sql: &str, start: usize, end: usize) -> bool {
    let before = match sql[..start].chars().next_back() {
        None => true,
        Some(prev) => !(prev.is_alphanumeric() || matches!(prev, '_' | '"' | '`' | '\'')),
    };
    before && !matches!(sql[end..].chars().next(), Some('\'' | '@'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rules: &[(&str, PlaceholderMode)]) -> PlaceholderConfig {
        PlaceholderConfig {
            rules: rules
                .iter()
                .map(|(name, mode)| PlaceholderRule {
                    name: name.to_string(),
                    mode: *mode,
                })
                .collect(),
            default_mode: PlaceholderMode::Literal,
        }
    }

    #[test]
    fn literal_is_default() {
        let prepared = preprocess("WHERE a.id = @account_id", &PlaceholderConfig::default());
        assert_eq!(prepared.sql, "WHERE a.id = '@account_id'");
        assert_eq!(prepared.placeholders.len(), 1);
    }

    #[test]
    fn list_and_comment_modes() {
        let cfg = config(&[
            ("@all_account_ids", PlaceholderMode::List),
            ("extra_column", PlaceholderMode::Comment),
        ]);
        let sql = "SELECT a.id,\n@extra_column,\nFROM t a WHERE a.id IN @all_account_ids";
        let prepared = preprocess(sql, &cfg);
        assert!(prepared.sql.contains("-- @extra_column,"));
        assert!(prepared.sql.contains("IN ('@all_account_ids')"));
        assert_eq!(prepared.restore(&prepared.sql), sql);
    }

    #[test]
    fn similar_prefixes_are_distinct_tokens() {
        let cfg = config(&[("all_account_ids", PlaceholderMode::List)]);
        let sql = "x = @account_id AND y IN @all_account_ids";
        let prepared = preprocess(sql, &cfg);
        assert_eq!(
            prepared.sql,
            "x = '@account_id' AND y IN ('@all_account_ids')"
        );
        assert_eq!(prepared.restore(&prepared.sql), sql);
    }

    #[test]
    fn strings_comments_and_system_variables_are_untouched() {
        let sql = "SELECT 'mail@example', @@version -- @note\nFROM t";
        let prepared = preprocess(sql, &PlaceholderConfig::default());
        assert_eq!(prepared.sql, sql);
        assert!(prepared.placeholders.is_empty());
    }

    #[test]
    fn embedded_at_sign_is_not_free_standing() {
        let sql = "SELECT user@host FROM t";
        let prepared = preprocess(sql, &PlaceholderConfig::default());
        assert_eq!(prepared.sql, sql);
    }

    #[test]
    fn repeated_tokens_recorded_once() {
        let prepared = preprocess("@d < x AND x < @d", &PlaceholderConfig::default());
        assert_eq!(prepared.placeholders.len(), 1);
        assert_eq!(prepared.sql, "'@d' < x AND x < '@d'");
    }

    #[test]
    fn existing_encoded_text_survives_restore() {
        let sql = "CASE WHEN b.note = '@account_id' THEN 1 END AND b.acct = @account_id";
        let prepared = preprocess(sql, &PlaceholderConfig::default());
        assert_eq!(
            prepared.sql,
            "CASE WHEN b.note = '@account_id' THEN 1 END AND b.acct = '@account_id#1'"
        );
        assert_eq!(prepared.restore(&prepared.sql), sql);
    }

    #[test]
    fn existing_list_text_survives_restore() {
        let cfg = config(&[("ids", PlaceholderMode::List)]);
        let sql = "x IN ('@ids') OR y IN @ids";
        let prepared = preprocess(sql, &cfg);
        assert_eq!(prepared.sql, "x IN ('@ids') OR y IN ('@ids#1')");
        assert_eq!(prepared.restore(&prepared.sql), sql);
    }

    #[test]
    fn token_touching_a_quote_or_token_is_left_alone() {
        for sql in ["SELECT 'abc'@x FROM t", "SELECT @x'abc' FROM t", "SELECT @b@a FROM t"] {
            let prepared = preprocess(sql, &PlaceholderConfig::default());
            assert_eq!(prepared.sql, sql);
            assert!(prepared.placeholders.is_empty());
        }

        let sql = "@b@a' = @a";
        let prepared = preprocess(sql, &PlaceholderConfig::default());
        assert_eq!(prepared.sql, "@b@a' = '@a'");
        assert_eq!(prepared.restore(&prepared.sql), sql);
    }
}
