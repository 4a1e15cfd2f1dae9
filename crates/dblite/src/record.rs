//! Records and the field set they are checked against.

use std::collections::BTreeMap;
use std::str::FromStr;

use dblite_query::{Filter, Value, IDENTITY_FIELD};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A stored dictionary: scalar fields plus an optional identity.
///
/// The identity is the `SQLite` rowid and is exposed as `_id` when a record
/// is serialized. Records without an identity have never been stored.
///
/// ```
/// use dblite::Record;
///
/// let record = Record::new().with("name", "alice").with("age", 30);
/// assert_eq!(
///     serde_json::to_string(&record)?,
///     r#"{"age":30,"name":"alice"}"#
/// );
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// An empty record without identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Builder-style identity assignment.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// The stored identity, if any.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Replace the identity.
    pub fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    /// Value of `field`, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set `field`, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Remove `field`, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Iterate fields in name order. The identity is not included.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields, excluding the identity.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a record from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the input is not an object of scalars.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A record used as criteria matches on its identity only.
impl TryFrom<&Record> for Filter {
    type Error = Error;

    fn try_from(record: &Record) -> Result<Self> {
        record.id.map(Filter::Identity).ok_or_else(|| {
            Error::InvalidRecord("record has no _id and cannot address a stored row".to_string())
        })
    }
}

/// Column names `SQLite` resolves to the rowid unless a real column shadows
/// them.
const ROWID_ALIASES: [&str; 3] = ["rowid", "oid", "_rowid_"];

/// The known field set of the stored item type.
///
/// Field order is kept as given and becomes the column order of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    /// Build a schema from field names.
    ///
    /// `_id` is skipped since it maps to the rowid rather than a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if no fields remain, a name is not a safe
    /// identifier, a name repeats, or a name is one of the rowid aliases
    /// (`rowid`, `oid`, `_rowid_`, in any case).
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if field == IDENTITY_FIELD {
                continue;
            }
            dblite_query::validate_identifier(&field)
                .map_err(|e| Error::Schema(e.to_string()))?;
            if ROWID_ALIASES
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(&field))
            {
                return Err(Error::Schema(format!(
                    "field '{field}' would shadow the record identity"
                )));
            }
            if names.contains(&field) {
                return Err(Error::Schema(format!("duplicate field '{field}'")));
            }
            names.push(field);
        }

        if names.is_empty() {
            return Err(Error::Schema("item fieldnames are not defined".to_string()));
        }
        Ok(Self { fields: names })
    }

    /// Field names in column order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns `true` if `field` belongs to the schema.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Check that every field of `record` belongs to the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] naming the first unknown field.
    pub fn check(&self, record: &Record) -> Result<()> {
        match record.fields().find(|(name, _)| !self.contains(name)) {
            Some((name, _)) => Err(Error::InvalidRecord(format!(
                "unknown field '{name}', expected one of: {}",
                self.fields.join(", ")
            ))),
            None => Ok(()),
        }
    }
}

impl FromStr for Schema {
    type Err = Error;

    /// Parse a comma-separated field list such as `name,age`.
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.split(',').map(str::trim).filter(|f| !f.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn identity_serializes_as_underscore_id() {
        let record = Record::new().with("name", "alice").with_id(3);
        let json = serde_json::to_string(&record).unwrap();

        assert_eq!(json, r#"{"_id":3,"name":"alice"}"#);
        assert_eq!(Record::from_json(&json).unwrap(), record);
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(matches!(
            Record::from_json(r#"{"tags": ["a", "b"]}"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn record_filter_uses_identity_only() {
        let record = Record::new().with("name", "alice").with_id(7);
        assert_eq!(Filter::try_from(&record).unwrap(), Filter::Identity(7));
    }

    #[test]
    fn record_without_identity_is_not_a_filter() {
        let record = Record::new().with("name", "alice");
        assert!(matches!(
            Filter::try_from(&record),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn schema_skips_identity_and_keeps_order() {
        let schema = Schema::new(["name", "_id", "age"]).unwrap();
        assert_eq!(schema.fields(), ["name", "age"]);
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::only_identity(&["_id"])]
    #[case::duplicate(&["a", "a"])]
    #[case::unsafe_name(&["a b"])]
    #[case::keyword(&["name", "order"])]
    #[case::rowid(&["rowid", "name"])]
    #[case::oid(&["name", "OID"])]
    #[case::underscore_rowid(&["_RowId_"])]
    fn schema_rejects_bad_field_sets(#[case] fields: &[&str]) {
        assert!(matches!(
            Schema::new(fields.iter().copied()),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn schema_parses_comma_list() {
        let schema: Schema = "name, age ,score".parse().unwrap();
        assert_eq!(schema.fields(), ["name", "age", "score"]);
    }

    #[test]
    fn schema_check_reports_unknown_field() {
        let schema = Schema::new(["name"]).unwrap();
        let err = schema
            .check(&Record::new().with("name", "a").with("age", 1))
            .unwrap_err();
        assert!(err.to_string().contains("'age'"));
    }
}
