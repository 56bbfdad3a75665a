use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{
    common::{Displayable, NamedEntity},
    entry::Entry,
};

/// File extension of persisted period tables.
pub const PERIOD_EXTENSION: &str = "csv";

/// Filesystem-safe name of one persisted period, including its extension.
///
/// Labels that differ only by whitespace versus underscore encode to the same
/// key (`"Acme Co"` and `"Acme_Co"`); the store treats them as one period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Encodes free-text labels into a key. Blank parts are skipped; returns
    /// `None` when nothing is left.
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Option<Self> {
        let encoded: Vec<String> = parts
            .iter()
            .map(|part| part.as_ref().trim())
            .filter(|part| !part.is_empty())
            .map(encode_part)
            .collect();
        if encoded.is_empty() {
            return None;
        }
        Some(Self(format!("{}.{}", encoded.join("_"), PERIOD_EXTENSION)))
    }

    /// Accepts either a bare stem (`Acme_March_2024`) or a full file name.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let suffix = format!(".{}", PERIOD_EXTENSION);
        let stem = trimmed.strip_suffix(&suffix).unwrap_or(trimmed);
        Self::from_parts(&[stem])
    }

    /// Recognizes an existing store file name; anything without the period
    /// extension is rejected.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(&format!(".{}", PERIOD_EXTENSION))?;
        if stem.is_empty() {
            return None;
        }
        Some(Self(file_name.to_string()))
    }

    pub fn file_name(&self) -> &str {
        &self.0
    }

    pub fn stem(&self) -> &str {
        self.0
            .strip_suffix(&format!(".{}", PERIOD_EXTENSION))
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

fn encode_part(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Ordered rows for one billing period. Row order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTable {
    pub identifier: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl PeriodTable {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entries(identifier: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            identifier: identifier.into(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entity called `name`, compared case-insensitively on
    /// trimmed names. Every name lookup goes through here.
    pub fn position(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.entries
            .iter()
            .position(|entry| entry.name().trim().to_lowercase() == needle)
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.position(name).map(|idx| &self.entries[idx])
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn remove(&mut self, name: &str) -> Option<Entry> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx))
    }

    /// Compares raw columns row by row, ignoring derived values.
    pub fn raw_eq(&self, other: &PeriodTable) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(left, right)| left.raw_eq(right))
    }
}

impl NamedEntity for PeriodTable {
    fn name(&self) -> &str {
        &self.identifier
    }
}

impl Displayable for PeriodTable {
    fn display_label(&self) -> String {
        let rows = self.entries.len();
        let noun = if rows == 1 { "entry" } else { "entries" };
        format!("{} ({} {})", self.identifier, rows, noun)
    }
}
