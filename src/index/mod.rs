//! Search index subsystem for docindex
//!
//! The index is loaded once from generated fragments and never mutated.
//!
//! # Design Principles
//!
//! - All-or-nothing load: a malformed record rejects the whole load
//! - Immutable: no API mutates a built index
//! - Deterministic: results follow load order, which follows file-name
//!   order and then record order
//!
//! # Invariants
//!
//! - Every entry has at least one target
//! - Keys are lowercase and unique within a section
//! - Target order within an entry is source order

mod entry;
mod errors;
pub mod key;
mod loader;
mod markup;
mod parser;
mod table;

pub use entry::{Entry, LinkMode, Section, Target};
pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use loader::{bundled, classify, load_dir, load_file, load_path, load_str, FragmentName, IndexLoader};
pub use markup::decode_entities;
pub use parser::{parse_fragment, parse_literal, Literal, SyntaxError};
pub use table::{IndexBuilder, Matches, SearchIndex};
