//! Configuration file support.
//!
//! Settings can be kept in a YAML file so the URI and field list do not
//! have to be repeated on every invocation:
//!
//! ```yaml
//! uri: sqlite://data.db:items
//! autocommit: 100
//! fields: [name, age]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::autocommit::AutoCommit;
use crate::error::{Error, Result};
use crate::record::Schema;

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "dblite.yaml";

/// Settings read from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Storage URI, `sqlite://<database>:<table>`.
    pub uri: Option<String>,

    /// Auto-commit policy for writes.
    pub autocommit: AutoCommit,

    /// Field names of the stored records.
    pub fields: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Config`] if it is not valid configuration YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed YAML or unknown keys.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load `explicit` if given, else [`CONFIG_FILE_NAME`] from `dir` when
    /// present, else the defaults.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "Loading configuration");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// The configured schema, if any fields are listed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the listed fields are invalid.
    pub fn schema(&self) -> Result<Option<Schema>> {
        if self.fields.is_empty() {
            Ok(None)
        } else {
            Schema::new(self.fields.iter().cloned()).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_full_file() {
        let config = Config::from_yaml(
            "uri: sqlite://data.db:items\nautocommit: 100\nfields: [name, age]\n",
        )
        .unwrap();

        assert_eq!(config.uri.as_deref(), Some("sqlite://data.db:items"));
        assert_eq!(config.autocommit, AutoCommit::from_count(100));
        assert_eq!(config.schema().unwrap().unwrap().fields(), ["name", "age"]);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = Config::from_yaml("uri: sqlite://x.db:t\n").unwrap();

        assert_eq!(config.autocommit, AutoCommit::Manual);
        assert!(config.schema().unwrap().is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_yaml("url: sqlite://x.db:t\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn discover_prefers_file_in_directory() {
        let dir = tempdir().unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "autocommit: true\n").unwrap();
        let config = Config::discover(None, dir.path()).unwrap();
        assert_eq!(config.autocommit, AutoCommit::EveryPut);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            Config::discover(Some(&missing), dir.path()),
            Err(Error::Io(_))
        ));
    }
}
