//! The date index: which comic is published on which day.
//!
//! The index is a flat YAML mapping from date to comic folder name:
//!
//! ```yaml
//! 2024-01-01: first-comic
//! 2024-01-08: the-return
//! ```
//!
//! Order is lexical on the date key, which is chronological for ISO 8601
//! dates. Keys in any other shape are accepted but logged, since their order
//! may surprise. A date listed twice makes the whole index malformed.
//!
//! Each date also names its output page, so [`validate_date`] checks that a
//! key is a plain file name before anything is written for it.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DateIndexError {
    #[error("cannot read date index {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed date index: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("date {date:?} is listed more than once (comics {first:?} and {second:?})")]
    DuplicateDate {
        date: String,
        first: String,
        second: String,
    },
    #[error("date {0:?} is not a plain page name")]
    InvalidDate(String),
}

/// Publication dates mapped to comic folder names, sorted by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateIndex {
    entries: BTreeMap<String, String>,
}

impl DateIndex {
    /// Read and parse the index file.
    pub fn load(path: &Path) -> Result<Self, DateIndexError> {
        let content = fs::read_to_string(path).map_err(|source| DateIndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse the index from YAML text. An empty (or comment-only) document is
    /// an empty index, as is an explicit `~`.
    pub fn from_yaml(content: &str) -> Result<Self, DateIndexError> {
        let blank = content
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#'));
        if blank {
            return Ok(Self::default());
        }

        let raw: Option<RawEntries> = serde_yaml::from_str(content)?;
        let mut entries = BTreeMap::new();
        for (date, name) in raw.map(|r| r.0).unwrap_or_default() {
            match entries.entry(date) {
                Entry::Vacant(slot) => {
                    slot.insert(name);
                }
                Entry::Occupied(slot) => {
                    return Err(DateIndexError::DuplicateDate {
                        date: slot.key().clone(),
                        first: slot.get().clone(),
                        second: name,
                    });
                }
            }
        }
        for date in entries.keys().filter(|d| !is_iso_date(d)) {
            tracing::warn!(date = %date, "date is not YYYY-MM-DD; archive order may be off");
        }
        Ok(Self { entries })
    }

    /// `(date, comic name)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(d, c)| (d.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for DateIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Check that a date can name its page: `{date}.html` directly inside the
/// output directory.
pub fn validate_date(date: &str) -> Result<(), DateIndexError> {
    let plain = !date.trim().is_empty()
        && !date.starts_with('.')
        && !date.contains("..")
        && !date.contains(['/', '\\']);
    if plain {
        Ok(())
    } else {
        Err(DateIndexError::InvalidDate(date.to_string()))
    }
}

/// `YYYY-MM-DD`, digits only. No calendar validation.
fn is_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}

/// Mapping entries in document order. Deserializing straight into a map
/// would let a repeated date silently replace the earlier one.
struct RawEntries(Vec<(String, String)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of dates to comic folder names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
