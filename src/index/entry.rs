//! Search index records
//!
//! An [`Entry`] is one row of the index: a normalized key and the ordered
//! documentation targets it resolves to.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::key;

/// Index section a fragment belongs to, named by the fragment file prefix
/// (`classes_1.js` belongs to [`Section::Classes`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    All,
    Classes,
    Namespaces,
    Files,
    Functions,
    Variables,
    Typedefs,
    Enums,
    Enumvalues,
    Related,
    Defines,
    Groups,
    Pages,
}

impl Section {
    /// Every section, in the order the generator lists them
    pub const ALL: [Section; 13] = [
        Section::All,
        Section::Classes,
        Section::Namespaces,
        Section::Files,
        Section::Functions,
        Section::Variables,
        Section::Typedefs,
        Section::Enums,
        Section::Enumvalues,
        Section::Related,
        Section::Defines,
        Section::Groups,
        Section::Pages,
    ];

    /// Returns the file-name prefix for this section
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::All => "all",
            Section::Classes => "classes",
            Section::Namespaces => "namespaces",
            Section::Files => "files",
            Section::Functions => "functions",
            Section::Variables => "variables",
            Section::Typedefs => "typedefs",
            Section::Enums => "enums",
            Section::Enumvalues => "enumvalues",
            Section::Related => "related",
            Section::Defines => "defines",
            Section::Groups => "groups",
            Section::Pages => "pages",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .iter()
            .copied()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| format!("unknown index section '{}'", s))
    }
}

/// How a target link is opened.
///
/// The generator writes `1` for anchors inside the documentation site and
/// `0` for anchors pulled in from external tag files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Opens in the documentation frame
    Local,
    /// Opens in a new window
    External,
}

impl LinkMode {
    /// Map the generator's numeric flag
    pub fn from_flag(flag: u64) -> Self {
        if flag == 0 {
            LinkMode::External
        } else {
            LinkMode::Local
        }
    }
}

/// One documentation page or anchor a key resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Display label, character references decoded
    pub label: String,
    /// Relative URL of the page, with fragment when the target is a member
    pub anchor: String,
    /// Owning type or file, `None` when the generator left it empty
    pub scope: Option<String>,
    /// Link mode
    pub link: LinkMode,
}

impl Target {
    /// Page part of the anchor, without the `#fragment`
    pub fn page(&self) -> &str {
        self.anchor.split('#').next().unwrap_or(&self.anchor)
    }

    /// Fragment part of the anchor, if any
    pub fn fragment(&self) -> Option<&str> {
        self.anchor.split_once('#').map(|(_, frag)| frag)
    }
}

/// One row of the search index.
///
/// Constructed only by the parser, which guarantees `targets` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    key: String,
    section: Section,
    targets: Vec<Target>,
}

impl Entry {
    pub(crate) fn new(key: String, section: Section, targets: Vec<Target>) -> Self {
        debug_assert!(!targets.is_empty());
        Self {
            key,
            section,
            targets,
        }
    }

    /// Normalized key as stored
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key with generator escapes decoded
    pub fn name(&self) -> String {
        key::decode(&self.key)
    }

    /// Section this entry was loaded from
    pub fn section(&self) -> Section {
        self.section
    }

    /// Targets in source order
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Label of the first target
    pub fn label(&self) -> &str {
        &self.targets[0].label
    }
}
