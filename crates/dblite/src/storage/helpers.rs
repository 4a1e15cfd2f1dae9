//! Conversions between record values and `SQLite` values.

use dblite_query::{Value, ROWID_COLUMN};
use rusqlite::types::{Type, Value as SqlValue, ValueRef};

use crate::record::Record;

/// Convert a record value into an owned `SQLite` value for binding.
///
/// Booleans are stored as the integers 0 and 1.
pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

/// Convert a slice of values for use with `params_from_iter`.
pub(crate) fn bind_all<'a>(values: impl IntoIterator<Item = &'a Value>) -> Vec<SqlValue> {
    values.into_iter().map(to_sql).collect()
}

/// Read column `idx` as a record value.
///
/// Returns an error for BLOB columns and for TEXT that is not valid UTF-8.
pub(crate) fn column_value(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Value> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::Integer(i)),
        ValueRef::Real(r) => Ok(Value::Real(r)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Value::Text(s.to_string()))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())),
        ValueRef::Blob(_) => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Blob,
            "BLOB columns cannot be represented in a record".into(),
        )),
    }
}

/// Convert a `SELECT rowid, *` row to a [`Record`].
///
/// The `rowid` column becomes the record identity; every other column
/// becomes a field of the same name.
pub(crate) fn row_to_record(row: &rusqlite::Row, columns: &[String]) -> rusqlite::Result<Record> {
    let mut record = Record::new();
    for (idx, column) in columns.iter().enumerate() {
        if column.eq_ignore_ascii_case(ROWID_COLUMN) {
            record.set_id(row.get(idx)?);
        } else {
            record.set(column.clone(), column_value(row, idx)?);
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn booleans_bind_as_integers() {
        assert_eq!(to_sql(&Value::Boolean(true)), SqlValue::Integer(1));
        assert_eq!(to_sql(&Value::Boolean(false)), SqlValue::Integer(0));
        assert_eq!(to_sql(&Value::from("x")), SqlValue::Text("x".to_string()));
    }

    #[test]
    fn rowid_column_becomes_identity() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name, score); INSERT INTO t VALUES ('a', 1.5);")
            .unwrap();

        let mut stmt = conn.prepare("SELECT rowid, * FROM t").unwrap();
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let record = stmt
            .query_row([], |row| row_to_record(row, &columns))
            .unwrap();

        assert_eq!(record.id(), Some(1));
        assert_eq!(record.get("name"), Some(&Value::from("a")));
        assert_eq!(record.get("score"), Some(&Value::Real(1.5)));
        assert_eq!(record.get("rowid"), None);
    }

    #[test]
    fn blob_columns_are_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.query_row("SELECT x'00ff'", [], |row| column_value(row, 0));
        assert!(result.is_err());
    }
}
