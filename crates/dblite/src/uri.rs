//! Connection URI parsing.
//!
//! A storage location is written `<backend>://<database>:<table>`, for example
//! `sqlite://data/items.db:items` or `sqlite://:memory::items`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Database path `SQLite` treats as a private in-memory database.
pub const MEMORY_DATABASE: &str = ":memory:";

/// Storage backends a URI may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// An `SQLite` database file.
    Sqlite,
}

impl Backend {
    /// URI scheme for this backend.
    #[must_use]
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sqlite" => Ok(Self::Sqlite),
            unknown => Err(Error::Uri(format!("unknown backend '{unknown}'"))),
        }
    }
}

/// A parsed storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUri {
    /// Backend named by the scheme.
    pub backend: Backend,
    /// Database path, or [`MEMORY_DATABASE`].
    pub database: String,
    /// Table holding the records.
    pub table: String,
}

impl DatabaseUri {
    /// Returns `true` for an in-memory database.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.database == MEMORY_DATABASE
    }
}

impl fmt::Display for DatabaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.backend.scheme(), self.database, self.table)
    }
}

impl FromStr for DatabaseUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_uri(s)
    }
}

/// Parse `<backend>://<database>:<table>`.
///
/// The database and table are split at the last `:` so that
/// `sqlite://:memory::items` works. Only the first whitespace-separated word
/// after that colon is used as the table name.
///
/// # Errors
///
/// Returns [`Error::Uri`] when the scheme is missing or unknown, the table
/// separator is missing, either part is empty, or the table name is not a
/// safe identifier.
pub fn parse_uri(uri: &str) -> Result<DatabaseUri> {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return Err(Error::Uri(format!("incorrect URI definition: '{uri}'")));
    };
    if scheme.is_empty() {
        return Err(Error::Uri(format!("incorrect URI definition: '{uri}'")));
    }
    let backend = scheme.parse::<Backend>()?;

    let Some((database, table)) = rest.rsplit_once(':') else {
        return Err(Error::Uri(format!(
            "missing table name in '{uri}', expected <backend>://<database>:<table>"
        )));
    };
    if database.is_empty() {
        return Err(Error::Uri(format!("empty database name in '{uri}'")));
    }

    let Some(table) = table.split_whitespace().next() else {
        return Err(Error::Uri(format!("empty table name in '{uri}'")));
    };
    dblite_query::validate_identifier(table)
        .map_err(|e| Error::Uri(format!("bad table name '{table}': {e}")))?;

    Ok(DatabaseUri {
        backend,
        database: database.to_string(),
        table: table.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_file_uri() {
        let uri = parse_uri("sqlite://data/items.db:items").unwrap();

        assert_eq!(uri.backend, Backend::Sqlite);
        assert_eq!(uri.database, "data/items.db");
        assert_eq!(uri.table, "items");
        assert!(!uri.is_memory());
    }

    #[test]
    fn memory_database_keeps_its_colons() {
        let uri = parse_uri("sqlite://:memory::items").unwrap();

        assert_eq!(uri.database, ":memory:");
        assert_eq!(uri.table, "items");
        assert!(uri.is_memory());
    }

    #[test]
    fn table_stops_at_whitespace() {
        let uri = parse_uri("sqlite://db.sqlite:items extra words").unwrap();
        assert_eq!(uri.table, "items");
    }

    #[test]
    fn display_round_trips() {
        let uri = parse_uri("sqlite://db.sqlite:items").unwrap();
        assert_eq!(uri.to_string(), "sqlite://db.sqlite:items");
        assert_eq!(uri.to_string().parse::<DatabaseUri>().unwrap(), uri);
    }

    #[rstest]
    #[case::empty("")]
    #[case::no_scheme("db.sqlite:items")]
    #[case::empty_scheme("://db.sqlite:items")]
    #[case::unknown_backend("postgres://db:items")]
    #[case::no_table("sqlite://db.sqlite")]
    #[case::empty_table("sqlite://db.sqlite:")]
    #[case::blank_table("sqlite://db.sqlite:   ")]
    #[case::empty_database("sqlite://:items")]
    #[case::unsafe_table("sqlite://db.sqlite:items;drop")]
    #[case::keyword_table("sqlite://db.sqlite:order")]
    fn rejects_malformed_uris(#[case] uri: &str) {
        assert!(
            matches!(parse_uri(uri), Err(Error::Uri(_))),
            "expected Error::Uri for {uri:?}"
        );
    }
}
