//! Structured record filters translated into parameterized SQL.
//!
//! This crate turns a filter description, a mapping of field names to
//! literal values or operator descriptors, into a `WHERE` fragment with `?`
//! placeholders and the ordered values to bind to them. It performs no I/O
//! and holds no state between calls.
//!
//! ```
//! use dblite_query::{translate_filter, Filter, Value};
//! use serde_json::json;
//!
//! let translation = translate_filter(Filter::try_from(json!({"age": {"$gt": 18}}))?)?;
//! assert_eq!(translation.fragment(), "age > ?");
//! assert_eq!(translation.parameters(), [Value::Integer(18)]);
//! # Ok::<(), dblite_query::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod criteria;
pub mod error;
pub mod field;
pub mod translate;
pub mod value;

pub use criteria::{build_criteria, Criteria, CriteriaBuilder, Criterion, Filter, Junction, Operator};
pub use error::{Error, Result};
pub use field::{is_sql_keyword, validate_identifier, Field, IDENTITY_FIELD, ROWID_COLUMN};
pub use translate::{translate, translate_filter, Translation};
pub use value::Value;
