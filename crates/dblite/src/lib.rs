//! dblite - plain key/value records stored in `SQLite`.
//!
//! A storage is addressed by a URI of the form `sqlite://<database>:<table>`
//! and holds records whose fields belong to a known [`Schema`]. Filters for
//! [`Storage::get`] and [`Storage::delete`] are translated into
//! parameterized SQL by the `dblite-query` crate.
//!
//! ```
//! use dblite::{AutoCommit, Filter, Record, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new(["name", "age"])?;
//! let mut storage = dblite::open(schema, "sqlite://:memory::people", AutoCommit::EveryPut)?;
//!
//! storage.put(&Record::new().with("name", "alice").with("age", 30))?;
//! storage.put(&Record::new().with("name", "bob").with("age", 17))?;
//!
//! let adults = storage.get(Filter::try_from(json!({"age": {"greater-or-equal": 18}}))?)?;
//! assert_eq!(adults.len(), 1);
//! assert_eq!(adults[0].get("name"), Some(&dblite::Value::from("alice")));
//! # Ok::<(), dblite::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod autocommit;
pub mod config;
pub mod error;
pub mod record;
pub mod statement;
pub mod storage;
pub mod uri;

pub use autocommit::AutoCommit;
pub use config::Config;
pub use dblite_query::{Criteria, Filter, Value};
pub use error::{Error, Result};
pub use record::{Record, Schema};
pub use storage::{open, Storage};
pub use uri::{parse_uri, Backend, DatabaseUri};
