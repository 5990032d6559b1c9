//! The search index table
//!
//! All entries live in one `Vec` in load order. Lookups by key go through a
//! `BTreeMap` of positions into that vector, so the table owns every entry
//! and nothing else holds one.
//!
//! # Invariants
//!
//! - Immutable after [`IndexBuilder::build`]
//! - Every entry has at least one target (enforced by the parser)
//! - Keys are unique within a section
//! - Query results follow load order

use std::collections::BTreeMap;
use std::slice;

use super::entry::{Entry, Section};
use super::errors::{IndexError, IndexResult};
use super::key;

/// Collects parsed fragments and checks them before freezing the table.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    entries: Vec<Entry>,
    positions: BTreeMap<(Section, String), usize>,
    sections: Vec<Section>,
    fragments: usize,
}

impl IndexBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the entries of one fragment.
    ///
    /// A key already present in the same section fails the load; positions
    /// in the error refer to records of this fragment.
    pub fn add_fragment(&mut self, entries: Vec<Entry>) -> IndexResult<()> {
        for (record, entry) in entries.into_iter().enumerate() {
            let slot = (entry.section(), entry.key().to_string());
            if self.positions.contains_key(&slot) {
                return Err(IndexError::malformed_entry(
                    record,
                    format!("duplicate key '{}' in section {}", entry.key(), entry.section()),
                ));
            }
            if !self.sections.contains(&entry.section()) {
                self.sections.push(entry.section());
            }
            self.positions.insert(slot, self.entries.len());
            self.entries.push(entry);
        }
        self.fragments += 1;
        Ok(())
    }

    /// Number of fragments added so far
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Freeze the table.
    ///
    /// Fails with `DOCX_EMPTY_INDEX` if no fragment was ever added. A
    /// fragment with zero records still counts.
    pub fn build(self) -> IndexResult<SearchIndex> {
        if self.fragments == 0 {
            return Err(IndexError::empty_index("no index fragments were loaded"));
        }
        Ok(SearchIndex {
            entries: self.entries,
            positions: self.positions,
            sections: self.sections,
        })
    }
}

/// Immutable lookup table from normalized keys to documentation targets.
#[derive(Debug)]
pub struct SearchIndex {
    entries: Vec<Entry>,
    positions: BTreeMap<(Section, String), usize>,
    sections: Vec<Section>,
}

impl SearchIndex {
    /// Entries whose key contains `query`, ignoring case, in table order.
    ///
    /// The query is compared against the stored (escaped) keys as given.
    /// An empty query matches nothing.
    pub fn search(&self, query: &str) -> Matches<'_> {
        Matches::new(&self.entries, query.to_lowercase(), None)
    }

    /// Like [`search`](Self::search), restricted to one section
    pub fn search_in(&self, section: Section, query: &str) -> Matches<'_> {
        Matches::new(&self.entries, query.to_lowercase(), Some(section))
    }

    /// Search with free text typed by a user.
    ///
    /// The text is escaped the way the generator escapes keys first, so
    /// `Array2D.hpp` finds `array2d_2ehpp`.
    pub fn search_symbol(&self, text: &str) -> Matches<'_> {
        Matches::new(&self.entries, key::encode(text), None)
    }

    /// Exact key lookup, ignoring case.
    ///
    /// The `all` section wins; otherwise the first section in load order
    /// that has the key.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        let key = key.to_lowercase();
        self.get_in(Section::All, &key).or_else(|| {
            self.sections
                .iter()
                .filter(|s| **s != Section::All)
                .find_map(|s| self.get_in(*s, &key))
        })
    }

    /// Exact key lookup within one section. `key` must already be lowercase.
    pub fn get_in(&self, section: Section, key: &str) -> Option<&Entry> {
        self.positions
            .get(&(section, key.to_string()))
            .map(|&pos| &self.entries[pos])
    }

    /// All entries in table order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// All keys in table order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(Entry::key)
    }

    /// Sections present, in load order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of targets across all entries
    pub fn target_count(&self) -> usize {
        self.entries.iter().map(|e| e.targets().len()).sum()
    }
}

/// Lazy iterator over query matches.
///
/// Clone before consuming to walk the same matches twice.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    entries: slice::Iter<'a, Entry>,
    needle: String,
    section: Option<Section>,
}

impl<'a> Matches<'a> {
    fn new(entries: &'a [Entry], needle: String, section: Option<Section>) -> Self {
        let entries = if needle.is_empty() {
            entries[..0].iter()
        } else {
            entries.iter()
        };
        Self {
            entries,
            needle,
            section,
        }
    }

    /// The normalized needle being matched
    pub fn needle(&self) -> &str {
        &self.needle
    }
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = self.needle.as_str();
        let section = self.section;
        self.entries.find(|entry| {
            section.map_or(true, |s| entry.section() == s) && entry.key().contains(needle)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.entries.size_hint().1)
    }
}
