//! Size lookup table.
//!
//! Used to recover size fields from a flat on-device record and to
//! synthesize the "N diapers" subtitle for newly persisted lines.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeEntry {
    /// Short code, e.g. `"N"`, `"2"`.
    pub code: String,
    /// Display name, e.g. `"Newborn"`, `"Size 2"`.
    pub display_name: String,
    /// Diapers per box for this size.
    pub diaper_count: u32,
}

impl SizeEntry {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>, diaper_count: u32) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            diaper_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeTable {
    entries: Vec<SizeEntry>,
}

impl SizeTable {
    /// The standard size run.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                SizeEntry::new("N", "Newborn", 198),
                SizeEntry::new("1", "Size 1", 198),
                SizeEntry::new("2", "Size 2", 186),
                SizeEntry::new("3", "Size 3", 156),
                SizeEntry::new("4", "Size 4", 138),
                SizeEntry::new("5", "Size 5", 120),
                SizeEntry::new("6", "Size 6", 102),
                SizeEntry::new("7", "Size 7", 90),
            ],
        }
    }

    /// Builds a table from configured entries, falling back to the standard run when empty.
    pub fn from_entries(entries: Vec<SizeEntry>) -> Self {
        if entries.is_empty() {
            Self::standard()
        } else {
            Self { entries }
        }
    }

    /// Case-insensitive match against either the code or the display name.
    pub fn lookup(&self, name: &str) -> Option<&SizeEntry> {
        let needle = name.trim();
        if needle.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| {
            entry.code.eq_ignore_ascii_case(needle) || entry.display_name.eq_ignore_ascii_case(needle)
        })
    }

    pub fn entries(&self) -> &[SizeEntry] {
        &self.entries
    }
}

impl Default for SizeTable {
    fn default() -> Self {
        Self::standard()
    }
}
