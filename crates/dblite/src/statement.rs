//! SQL statement skeletons completed with a translated `WHERE` fragment.
//!
//! Table and column names reaching these functions have been validated as
//! identifiers; values only ever travel as bound parameters.

use dblite_query::{Translation, ROWID_COLUMN};

/// Append `WHERE <fragment>` (when there is one) and the terminator.
fn with_where(skeleton: String, translation: &Translation) -> String {
    if translation.is_empty() {
        format!("{skeleton};")
    } else {
        format!("{skeleton} WHERE {};", translation.fragment())
    }
}

/// `SELECT rowid, * FROM <table> [WHERE ...];`
#[must_use]
pub fn select(table: &str, translation: &Translation) -> String {
    with_where(format!("SELECT {ROWID_COLUMN}, * FROM {table}"), translation)
}

/// `DELETE FROM <table> [WHERE ...];`
#[must_use]
pub fn delete(table: &str, translation: &Translation) -> String {
    with_where(format!("DELETE FROM {table}"), translation)
}

/// `SELECT count(*) FROM <table> [WHERE ...];`
#[must_use]
pub fn count(table: &str, translation: &Translation) -> String {
    with_where(format!("SELECT count(*) FROM {table}"), translation)
}

/// `CREATE TABLE IF NOT EXISTS <table> (<fields>);` with untyped columns.
#[must_use]
pub fn create_table(table: &str, fields: &[String]) -> String {
    format!("CREATE TABLE IF NOT EXISTS {table} ({});", fields.join(", "))
}

/// `INSERT INTO <table> (<fields>) VALUES (?, ...);`
///
/// Falls back to `DEFAULT VALUES` when there are no fields.
#[must_use]
pub fn insert(table: &str, fields: &[&str]) -> String {
    if fields.is_empty() {
        return format!("INSERT INTO {table} DEFAULT VALUES;");
    }
    let placeholders = vec!["?"; fields.len()].join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders});",
        fields.join(", ")
    )
}

/// `UPDATE <table> SET a = ?, ... WHERE rowid = ?;`
#[must_use]
pub fn update(table: &str, fields: &[&str]) -> String {
    let assignments = fields
        .iter()
        .map(|f| format!("{f} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {table} SET {assignments} WHERE {ROWID_COLUMN} = ?;")
}
