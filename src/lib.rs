//! docindex - loader and query engine for generated documentation search
//! indexes
//!
//! A documentation generator ships its symbol search as JavaScript
//! fragments mapping escaped, lowercased keys to documentation anchors.
//! This crate parses those fragments into an immutable [`index::SearchIndex`]
//! and answers substring and exact-key queries over it.

pub mod cli;
pub mod index;
pub mod observability;
