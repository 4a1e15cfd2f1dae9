//! Auto-commit policy for writes.
//!
//! Writes run inside an implicitly opened transaction. The policy decides
//! when [`crate::Storage::put`] commits it on the caller's behalf:
//!
//! | Policy | Commits |
//! |---|---|
//! | `Manual` | only on explicit `commit()` |
//! | `EveryPut` | after every put |
//! | `Every(n)` | after every `n`-th put since the last commit |

use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// When puts are committed without an explicit `commit()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AutoCommitSetting")]
pub enum AutoCommit {
    /// Never commit automatically.
    #[default]
    Manual,
    /// Commit after each put.
    EveryPut,
    /// Commit once this many puts are pending.
    Every(NonZeroUsize),
}

impl AutoCommit {
    /// Policy for a put count: `0` is manual, `1` commits every put.
    #[must_use]
    pub fn from_count(count: usize) -> Self {
        match NonZeroUsize::new(count) {
            None => Self::Manual,
            Some(n) if n.get() == 1 => Self::EveryPut,
            Some(n) => Self::Every(n),
        }
    }
}

impl From<bool> for AutoCommit {
    fn from(enabled: bool) -> Self {
        if enabled { Self::EveryPut } else { Self::Manual }
    }
}

impl FromStr for AutoCommit {
    type Err = Error;

    /// Accepts `false`/`manual`/`off`, `true`/`always`/`on`, or a put count.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "false" | "manual" | "off" => Ok(Self::Manual),
            "true" | "always" | "on" => Ok(Self::EveryPut),
            other => other.parse::<usize>().map(Self::from_count).map_err(|_| {
                Error::Config(format!(
                    "invalid autocommit '{s}', expected true, false or a put count"
                ))
            }),
        }
    }
}

/// Accepted YAML spellings of an auto-commit policy.
#[derive(Deserialize)]
#[serde(untagged)]
enum AutoCommitSetting {
    Flag(bool),
    Count(usize),
    Text(String),
}

impl TryFrom<AutoCommitSetting> for AutoCommit {
    type Error = Error;

    fn try_from(setting: AutoCommitSetting) -> Result<Self> {
        match setting {
            AutoCommitSetting::Flag(flag) => Ok(Self::from(flag)),
            AutoCommitSetting::Count(count) => Ok(Self::from_count(count)),
            AutoCommitSetting::Text(text) => text.parse(),
        }
    }
}

/// Counts puts since the last commit and applies the policy.
#[derive(Debug, Clone)]
pub(crate) struct CommitCounter {
    policy: AutoCommit,
    pending: usize,
}

impl CommitCounter {
    pub(crate) fn new(policy: AutoCommit) -> Self {
        Self { policy, pending: 0 }
    }

    pub(crate) fn policy(&self) -> AutoCommit {
        self.policy
    }

    /// Puts since the last commit.
    pub(crate) fn pending(&self) -> usize {
        self.pending
    }

    /// Register a put; returns `true` when the policy calls for a commit.
    pub(crate) fn record_put(&mut self) -> bool {
        self.pending += 1;
        match self.policy {
            AutoCommit::Manual => false,
            AutoCommit::EveryPut => true,
            AutoCommit::Every(n) => self.pending >= n.get(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.pending = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("false", AutoCommit::Manual)]
    #[case("manual", AutoCommit::Manual)]
    #[case("0", AutoCommit::Manual)]
    #[case("true", AutoCommit::EveryPut)]
    #[case("ON", AutoCommit::EveryPut)]
    #[case("1", AutoCommit::EveryPut)]
    #[case("100", AutoCommit::from_count(100))]
    fn parses_policy(#[case] input: &str, #[case] expected: AutoCommit) {
        assert_eq!(input.parse::<AutoCommit>().unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "sometimes".parse::<AutoCommit>(),
            Err(Error::Config(_))
        ));
        assert!("-3".parse::<AutoCommit>().is_err());
    }

    #[test]
    fn deserializes_yaml_spellings() {
        let policies: Vec<AutoCommit> = serde_yaml::from_str("[true, false, 25, manual]").unwrap();
        assert_eq!(
            policies,
            [
                AutoCommit::EveryPut,
                AutoCommit::Manual,
                AutoCommit::from_count(25),
                AutoCommit::Manual,
            ]
        );
    }

    #[test]
    fn manual_never_commits() {
        let mut counter = CommitCounter::new(AutoCommit::Manual);
        assert!((0..10).all(|_| !counter.record_put()));
        assert_eq!(counter.pending(), 10);
    }

    #[test]
    fn every_put_commits_each_time() {
        let mut counter = CommitCounter::new(AutoCommit::EveryPut);
        assert!(counter.record_put());
        counter.reset();
        assert!(counter.record_put());
    }

    #[test]
    fn every_n_commits_on_the_nth_put() {
        let mut counter = CommitCounter::new(AutoCommit::from_count(3));
        assert!(!counter.record_put());
        assert!(!counter.record_put());
        assert!(counter.record_put());
        counter.reset();
        assert_eq!(counter.pending(), 0);
        assert!(!counter.record_put());
    }
}
