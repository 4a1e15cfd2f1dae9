//! Record CRUD operations.

use dblite_query::{build_criteria, translate, Criteria, Filter, Translation, Value};
use rusqlite::params_from_iter;
use tracing::{debug, trace};

use super::helpers::{bind_all, row_to_record};
use super::Storage;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::statement;

impl Storage {
    /// Records matching `filter`, in rowid order.
    ///
    /// An empty filter returns every record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Criteria`] for malformed filters and
    /// [`Error::Database`] if the query fails.
    pub fn get(&self, filter: impl Into<Filter>) -> Result<Vec<Record>> {
        self.select(&build_criteria(filter.into())?)
    }

    /// Records matching already-built criteria.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the query fails.
    pub fn select(&self, criteria: &Criteria) -> Result<Vec<Record>> {
        let translation = translate(criteria)?;
        let sql = statement::select(self.table(), &translation);
        debug!(%sql, "Selecting records");

        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt.query_map(
            params_from_iter(bind_all(translation.parameters())),
            |row| row_to_record(row, &columns),
        )?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// The record stored under `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the query fails.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        Ok(self.get(Filter::Identity(id))?.into_iter().next())
    }

    /// Store a record and return its identity.
    ///
    /// Records with an identity update the stored row; others are inserted.
    /// The auto-commit policy is applied afterwards.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRecord`] if the record has fields outside the schema,
    ///   or is an update without fields
    /// - [`Error::RecordNotFound`] if an update addresses a missing row
    /// - [`Error::Database`] if the write or commit fails
    pub fn put(&mut self, record: &Record) -> Result<i64> {
        self.schema.check(record)?;
        self.begin_if_needed()?;

        let id = match record.id() {
            Some(id) => self.update(id, record)?,
            None => self.insert(record)?,
        };

        if self.commits.record_put() {
            self.commit()?;
        }
        Ok(id)
    }

    /// Store several records in order, returning their identities.
    ///
    /// Every record is checked against the schema before any is written.
    ///
    /// # Errors
    ///
    /// See [`Storage::put`]. Records stored before a failing one stay in the
    /// pending transaction.
    pub fn put_many(&mut self, records: &[Record]) -> Result<Vec<i64>> {
        records
            .iter()
            .try_for_each(|record| self.schema.check(record))?;
        records.iter().map(|record| self.put(record)).collect()
    }

    fn insert(&self, record: &Record) -> Result<i64> {
        let (fields, values): (Vec<&str>, Vec<&Value>) = record.fields().unzip();
        let sql = statement::insert(self.table(), &fields);
        trace!(%sql, "Inserting record");

        self.conn.execute(&sql, params_from_iter(bind_all(values)))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: i64, record: &Record) -> Result<i64> {
        if record.is_empty() {
            return Err(Error::InvalidRecord(format!(
                "record _id {id} has no fields to update"
            )));
        }

        let (fields, values): (Vec<&str>, Vec<&Value>) = record.fields().unzip();
        let sql = statement::update(self.table(), &fields);
        trace!(%sql, id, "Updating record");

        let mut bound = bind_all(values);
        bound.push(rusqlite::types::Value::Integer(id));
        let changed = self.conn.execute(&sql, params_from_iter(bound))?;
        if changed == 0 {
            return Err(Error::RecordNotFound(id));
        }
        Ok(id)
    }

    /// Delete records matching `filter`, returning how many were removed.
    ///
    /// Deletes join the pending transaction and are committed with the next
    /// commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCriteria`] when the filter places no
    /// restriction; use [`Storage::delete_all`] for that.
    pub fn delete(&mut self, filter: impl Into<Filter>) -> Result<usize> {
        let criteria = build_criteria(filter.into())?;
        if criteria.is_empty() {
            return Err(Error::MissingCriteria);
        }
        self.delete_matching(&translate(&criteria)?)
    }

    /// Delete the stored row of `record`, matched by identity only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the record has no identity.
    pub fn delete_record(&mut self, record: &Record) -> Result<usize> {
        self.delete(Filter::try_from(record)?)
    }

    /// Delete every record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the delete fails.
    pub fn delete_all(&mut self) -> Result<usize> {
        self.delete_matching(&Translation::default())
    }

    fn delete_matching(&mut self, translation: &Translation) -> Result<usize> {
        self.begin_if_needed()?;
        let sql = statement::delete(self.table(), translation);
        debug!(%sql, "Deleting records");

        let deleted = self
            .conn
            .execute(&sql, params_from_iter(bind_all(translation.parameters())))?;
        debug!(deleted, "Deleted records");
        Ok(deleted)
    }

    /// Number of records matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Criteria`] for malformed filters and
    /// [`Error::Database`] if the query fails.
    pub fn count(&self, filter: impl Into<Filter>) -> Result<usize> {
        let translation = translate(&build_criteria(filter.into())?)?;
        let sql = statement::count(self.table(), &translation);
        debug!(%sql, "Counting records");

        let count: i64 = self.conn.query_row(
            &sql,
            params_from_iter(bind_all(translation.parameters())),
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| Error::Schema(format!("count(*) returned negative value {count}")))
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the query fails.
    pub fn len(&self) -> Result<usize> {
        self.count(Filter::All)
    }

    /// Returns `true` if no records are stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the query fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocommit::AutoCommit;
    use crate::record::Schema;
    use serde_json::json;

    fn memory_storage() -> Storage {
        let schema = Schema::new(["name", "age"]).unwrap();
        Storage::open(schema, "sqlite://:memory::people", AutoCommit::Manual).unwrap()
    }

    fn filter(input: serde_json::Value) -> Filter {
        Filter::try_from(input).unwrap()
    }

    #[test]
    fn insert_assigns_identity() {
        let mut storage = memory_storage();
        let first = storage.put(&Record::new().with("name", "a")).unwrap();
        let second = storage.put(&Record::new().with("name", "b")).unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(storage.len().unwrap(), 2);
    }

    #[test]
    fn empty_record_inserts_default_row() {
        let mut storage = memory_storage();
        let id = storage.put(&Record::new()).unwrap();

        let stored = storage.get_by_id(id).unwrap().unwrap();
        assert_eq!(stored.get("name"), Some(&Value::Null));
    }

    #[test]
    fn update_requires_fields_and_existing_row() {
        let mut storage = memory_storage();

        assert!(matches!(
            storage.put(&Record::new().with_id(1)),
            Err(Error::InvalidRecord(_))
        ));
        assert!(matches!(
            storage.put(&Record::new().with("name", "x").with_id(99)),
            Err(Error::RecordNotFound(99))
        ));
    }

    #[test]
    fn unknown_field_is_rejected_before_writing() {
        let mut storage = memory_storage();
        let records = [
            Record::new().with("name", "ok"),
            Record::new().with("email", "x@example.com"),
        ];

        assert!(matches!(
            storage.put_many(&records),
            Err(Error::InvalidRecord(_))
        ));
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn count_applies_filter() {
        let mut storage = memory_storage();
        for age in [10, 20, 30] {
            storage.put(&Record::new().with("age", age)).unwrap();
        }

        assert_eq!(storage.count(filter(json!({"age": {"$gte": 20}}))).unwrap(), 2);
        assert_eq!(storage.count(Filter::All).unwrap(), 3);
    }

    #[test]
    fn delete_without_criteria_is_refused() {
        let mut storage = memory_storage();
        storage.put(&Record::new().with("name", "a")).unwrap();

        assert!(matches!(
            storage.delete(Filter::All),
            Err(Error::MissingCriteria)
        ));
        assert!(matches!(
            storage.delete(filter(json!({}))),
            Err(Error::MissingCriteria)
        ));
        assert_eq!(storage.len().unwrap(), 1);
    }

    #[test]
    fn malformed_filter_surfaces_criteria_error() {
        let storage = memory_storage();
        let result = storage.get(filter(json!({"age": {"$between": [1, 2]}})));

        assert!(matches!(
            result,
            Err(Error::Criteria(dblite_query::Error::InvalidCriteria(_)))
        ));
    }
}
