//! CLI command implementations.

pub mod count;
pub mod delete;
pub mod get;
pub mod put;
pub mod sql;

use std::path::Path;

use dblite::{AutoCommit, Config, Error, Filter, Result, Schema, Storage};

/// Settings shared by every command.
pub struct Context {
    uri: Option<String>,
    config: Config,
}

impl Context {
    /// Combine the command-line URI with the configuration file.
    pub fn new(uri: Option<String>, config_path: Option<&Path>) -> Result<Self> {
        let dir = std::env::current_dir()?;
        let config = Config::discover(config_path, &dir)?;
        Ok(Self { uri, config })
    }

    /// The storage URI, preferring the command line over the config file.
    pub fn uri(&self) -> Result<&str> {
        self.uri
            .as_deref()
            .or(self.config.uri.as_deref())
            .ok_or_else(|| {
                Error::Config("no storage URI; pass --uri or set 'uri' in dblite.yaml".to_string())
            })
    }

    /// Open the storage.
    ///
    /// With a field list (from `fields` or the config file) the table is
    /// created if needed; without one the table must already exist.
    pub fn open(&self, fields: Option<&str>, autocommit: Option<AutoCommit>) -> Result<Storage> {
        let uri = self.uri()?;
        let autocommit = autocommit.unwrap_or(self.config.autocommit);
        let schema = match fields {
            Some(list) => Some(list.parse::<Schema>()?),
            None => self.config.schema()?,
        };

        match schema {
            Some(schema) => Storage::open(schema, uri, autocommit),
            None => Storage::open_existing(uri, autocommit),
        }
    }
}

/// Parse a `--where` argument. No argument means no restriction.
pub fn parse_filter(filter: Option<&str>) -> Result<Filter> {
    match filter {
        None => Ok(Filter::All),
        Some(text) => {
            let json: serde_json::Value = serde_json::from_str(text)?;
            Ok(Filter::try_from(json)?)
        }
    }
}
