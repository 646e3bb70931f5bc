//! Entry sort modes
//!
//! The sort mode is a global setting. Sorting is stable, so entries with equal
//! keys keep their current relative order and sorting twice is a no-op.

use crate::entry::{Entry, EntryVariant};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Manual order: entries stay where they were inserted or dragged to
    #[default]
    Unsorted,
    Alphabetical,
    ReverseAlphabetical,
    /// Assets before macros, then by name
    ByKind,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Unsorted,
        SortMode::Alphabetical,
        SortMode::ReverseAlphabetical,
        SortMode::ByKind,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SortMode::Unsorted => "Unsorted",
            SortMode::Alphabetical => "Alphabetical",
            SortMode::ReverseAlphabetical => "Reverse Alphabetical",
            SortMode::ByKind => "By Kind",
        }
    }

    fn as_key(&self) -> &'static str {
        match self {
            SortMode::Unsorted => "unsorted",
            SortMode::Alphabetical => "alphabetical",
            SortMode::ReverseAlphabetical => "reverse_alphabetical",
            SortMode::ByKind => "by_kind",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sort mode '{0}' (expected unsorted, alphabetical, reverse_alphabetical or by_kind)")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_key() == normalized)
            .ok_or_else(|| UnknownSortMode(s.to_string()))
    }
}

fn compare_names(a: &Entry, b: &Entry) -> Ordering {
    a.display_name()
        .to_lowercase()
        .cmp(&b.display_name().to_lowercase())
}

fn variant_rank(variant: EntryVariant) -> u8 {
    match variant {
        EntryVariant::Asset => 0,
        EntryVariant::Macro => 1,
    }
}

/// Sort entries in place according to `mode`
pub fn sort_entries(entries: &mut [Entry], mode: SortMode) {
    match mode {
        SortMode::Unsorted => {}
        SortMode::Alphabetical => entries.sort_by(compare_names),
        SortMode::ReverseAlphabetical => entries.sort_by(|a, b| compare_names(b, a)),
        SortMode::ByKind => entries.sort_by(|a, b| {
            variant_rank(a.variant())
                .cmp(&variant_rank(b.variant()))
                .then_with(|| compare_names(a, b))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(Entry::display_name).collect()
    }

    fn ids(entries: &[Entry]) -> Vec<NodeId> {
        entries.iter().map(Entry::id).collect()
    }

    fn sample() -> Vec<Entry> {
        vec![
            Entry::asset("Assets/crate.prefab"),
            Entry::macro_script("Scripts/align.rhai"),
            Entry::asset("Assets/Barrel.prefab"),
            Entry::asset("Assets/apple.prefab"),
        ]
    }

    #[test]
    fn test_alphabetical_is_case_insensitive() {
        let mut entries = sample();
        sort_entries(&mut entries, SortMode::Alphabetical);
        assert_eq!(names(&entries), vec!["align", "apple", "Barrel", "crate"]);

        sort_entries(&mut entries, SortMode::ReverseAlphabetical);
        assert_eq!(names(&entries), vec!["crate", "Barrel", "apple", "align"]);
    }

    #[test]
    fn test_by_kind_puts_assets_first() {
        let mut entries = sample();
        sort_entries(&mut entries, SortMode::ByKind);
        assert_eq!(names(&entries), vec!["apple", "Barrel", "crate", "align"]);
    }

    #[test]
    fn test_unsorted_keeps_manual_order() {
        let mut entries = sample();
        let before = ids(&entries);
        sort_entries(&mut entries, SortMode::Unsorted);
        assert_eq!(ids(&entries), before);
    }

    #[test]
    fn test_sorting_is_idempotent() {
        for mode in SortMode::ALL {
            let mut entries = sample();
            sort_entries(&mut entries, mode);
            let once = ids(&entries);
            sort_entries(&mut entries, mode);
            assert_eq!(ids(&entries), once, "mode {mode} reordered on second pass");
        }
    }

    #[test]
    fn test_ties_keep_original_order() {
        let mut entries = vec![
            Entry::asset("A/rock.prefab"),
            Entry::asset("B/rock.prefab"),
            Entry::asset("C/rock.prefab"),
        ];
        let before = ids(&entries);
        sort_entries(&mut entries, SortMode::Alphabetical);
        assert_eq!(ids(&entries), before);
    }

    #[test]
    fn test_parse_sort_mode() {
        assert_eq!("alphabetical".parse::<SortMode>(), Ok(SortMode::Alphabetical));
        assert_eq!("Reverse Alphabetical".parse::<SortMode>(), Ok(SortMode::ReverseAlphabetical));
        assert_eq!("by-kind".parse::<SortMode>(), Ok(SortMode::ByKind));
        assert!("random".parse::<SortMode>().is_err());
        for mode in SortMode::ALL {
            assert_eq!(mode.to_string().parse::<SortMode>(), Ok(mode));
        }
    }
}
