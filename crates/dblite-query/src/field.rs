//! Validated column names.
//!
//! Field names are spliced into SQL text as identifiers, so they are checked
//! once here and never quoted from operand text later.

use std::fmt;

use crate::error::{Error, Result};

/// Name of the identity field as seen by callers.
pub const IDENTITY_FIELD: &str = "_id";

/// Column the identity field is stored in.
pub const ROWID_COLUMN: &str = "rowid";

/// Maximum accepted identifier length.
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// `SQLite` keywords, sorted. None of them is accepted as a bare identifier.
const SQL_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYZE", "AND", "AS", "ASC",
    "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST",
    "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS",
    "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT",
    "DEFERRABLE", "DEFERRED", "DELETE", "DESC", "DETACH", "DISTINCT", "DO", "DROP", "EACH",
    "ELSE", "END", "ESCAPE", "EXCEPT", "EXCLUDE", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL",
    "FILTER", "FIRST", "FOLLOWING", "FOR", "FOREIGN", "FROM", "FULL", "GENERATED", "GLOB",
    "GROUP", "GROUPS", "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED",
    "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "KEY", "LAST", "LEFT", "LIKE", "LIMIT", "MATCH", "MATERIALIZED", "NATURAL", "NO", "NOT",
    "NOTHING", "NOTNULL", "NULL", "NULLS", "OF", "OFFSET", "ON", "OR", "ORDER", "OTHERS",
    "OUTER", "OVER", "PARTITION", "PLAN", "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE",
    "RANGE", "RECURSIVE", "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE",
    "RESTRICT", "RETURNING", "RIGHT", "ROLLBACK", "ROW", "ROWS", "SAVEPOINT", "SELECT", "SET",
    "TABLE", "TEMP", "TEMPORARY", "THEN", "TIES", "TO", "TRANSACTION", "TRIGGER", "UNBOUNDED",
    "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL", "WHEN", "WHERE",
    "WINDOW", "WITH", "WITHOUT",
];

/// A column a criterion applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// The record identity (`_id`), rendered as `rowid`.
    Identity,
    /// A regular column.
    Column(String),
}

impl Field {
    /// Parse and validate a caller-supplied field name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCriteria`] if the name is not identifier-safe.
    pub fn parse(name: &str) -> Result<Self> {
        if name == IDENTITY_FIELD {
            return Ok(Self::Identity);
        }
        validate_identifier(name)?;
        Ok(Self::Column(name.to_string()))
    }

    /// The identifier emitted into SQL text.
    #[must_use]
    pub fn sql_name(&self) -> &str {
        match self {
            Self::Identity => ROWID_COLUMN,
            Self::Column(name) => name,
        }
    }

    /// The name callers use for this field.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Identity => IDENTITY_FIELD,
            Self::Column(name) => name,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check that `name` can be used verbatim as an SQL identifier.
///
/// Requirements:
/// - 1 to [`MAX_IDENTIFIER_LENGTH`] characters
/// - first character is an ASCII letter or `_`
/// - remaining characters are ASCII alphanumeric or `_`
/// - not an `SQLite` keyword, in any case
///
/// # Errors
///
/// Returns [`Error::InvalidCriteria`] describing the first violated rule.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(Error::invalid("field name must not be empty"));
    };

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(Error::invalid(format!(
            "field name '{name}' exceeds {MAX_IDENTIFIER_LENGTH} characters"
        )));
    }

    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(Error::invalid(format!(
            "field name '{name}' must start with a letter or underscore"
        )));
    }

    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(Error::invalid(format!(
            "field name '{name}' contains unsupported character '{bad}'"
        )));
    }

    if is_sql_keyword(name) {
        return Err(Error::invalid(format!(
            "field name '{name}' is a reserved SQL keyword"
        )));
    }

    Ok(())
}

/// Returns `true` if `name` is an `SQLite` keyword, ignoring case.
#[must_use]
pub fn is_sql_keyword(name: &str) -> bool {
    SQL_KEYWORDS
        .binary_search_by(|keyword| {
            keyword
                .bytes()
                .cmp(name.bytes().map(|b| b.to_ascii_uppercase()))
        })
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("name")]
    #[case("_private")]
    #[case("age2")]
    #[case("CamelCase")]
    fn accepts_identifiers(#[case] name: &str) {
        assert!(validate_identifier(name).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("2fast")]
    #[case("first name")]
    #[case("name;--")]
    #[case("a\"b")]
    #[case("tbl.col")]
    #[case("naïve")]
    fn rejects_unsafe_identifiers(#[case] name: &str) {
        assert!(matches!(
            validate_identifier(name),
            Err(Error::InvalidCriteria(_))
        ));
    }

    #[rstest]
    #[case("order")]
    #[case("GROUP")]
    #[case("Select")]
    #[case("in")]
    #[case("current_timestamp")]
    fn rejects_sql_keywords(#[case] name: &str) {
        assert!(is_sql_keyword(name));
        assert!(matches!(
            validate_identifier(name),
            Err(Error::InvalidCriteria(_))
        ));
    }

    #[test]
    fn keyword_table_is_sorted() {
        assert!(SQL_KEYWORDS.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[rstest]
    #[case("orders")]
    #[case("group_id")]
    #[case("rowcount")]
    fn keyword_prefixes_are_allowed(#[case] name: &str) {
        assert!(!is_sql_keyword(name));
        assert!(validate_identifier(name).is_ok());
    }

    #[test]
    fn rejects_overlong_identifier() {
        let name = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(validate_identifier(&name).is_err());
        assert!(validate_identifier(&name[1..]).is_ok());
    }

    #[test]
    fn identity_field_renders_as_rowid() {
        let field = Field::parse("_id").unwrap();
        assert_eq!(field, Field::Identity);
        assert_eq!(field.sql_name(), "rowid");
        assert_eq!(field.to_string(), "_id");
    }
}
