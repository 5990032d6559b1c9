//! Index loading
//!
//! A generated `search/` directory holds one fragment per section and
//! leading character: `all_0.js`, `all_1.js`, `classes_0.js`, ... Other
//! files in it (`search.js`, `searchdata.js`, stylesheets, images) are not
//! fragments and are ignored.
//!
//! # API
//!
//! - `load_str(text)` - one fragment from memory, section `all`
//! - `load_file(path)` - one fragment file, section from its name
//! - `load_dir(path)` - every fragment in a search directory
//! - `load_path(path)` - file or directory, whichever `path` is
//! - `bundled()` - the fragment shipped with the crate

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::entry::Section;
use super::errors::{IndexError, IndexResult};
use super::parser::parse_fragment;
use super::table::{IndexBuilder, SearchIndex};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

const BUNDLED_FRAGMENT: &str = include_str!("../../data/search/all_0.js");

static BUNDLED: OnceLock<SearchIndex> = OnceLock::new();
static FRAGMENT_NAME: OnceLock<Regex> = OnceLock::new();

fn fragment_name() -> &'static Regex {
    FRAGMENT_NAME.get_or_init(|| {
        Regex::new(r"^([a-z]+)_([0-9a-f]+)\.js$").expect("fragment name pattern is valid")
    })
}

/// What a file name says about the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentName {
    /// `<section>_<n>.js` with a known section
    Fragment(Section),
    /// `<prefix>_<n>.js` with a prefix that is not a section
    UnknownSection(String),
    /// Anything else
    NotFragment,
}

/// Classify a file name
pub fn classify(file_name: &str) -> FragmentName {
    match fragment_name().captures(file_name) {
        Some(caps) => match caps[1].parse::<Section>() {
            Ok(section) => FragmentName::Fragment(section),
            Err(_) => FragmentName::UnknownSection(caps[1].to_string()),
        },
        None => FragmentName::NotFragment,
    }
}

/// Loads fragments into a [`SearchIndex`], optionally counting into a
/// [`MetricsRegistry`].
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexLoader<'m> {
    metrics: Option<&'m MetricsRegistry>,
}

impl<'m> IndexLoader<'m> {
    /// Loader without metrics
    pub fn new() -> Self {
        Self { metrics: None }
    }

    /// Loader that records fragment and entry counts into `metrics`
    pub fn with_metrics(metrics: &'m MetricsRegistry) -> Self {
        Self {
            metrics: Some(metrics),
        }
    }

    /// Load one fragment held in memory as section `all`
    pub fn load_str(&self, text: &str) -> IndexResult<SearchIndex> {
        let mut builder = IndexBuilder::new();
        self.add(&mut builder, "<memory>", text, Section::All)?;
        builder.build()
    }

    /// Load one fragment file.
    ///
    /// The section comes from the file name; names that are not
    /// `<section>_<n>.js` load as `all`.
    pub fn load_file(&self, path: &Path) -> IndexResult<SearchIndex> {
        let name = display_name(path);
        let shown = path.display().to_string();
        log_event_with_fields(Event::IndexLoadStart, &[("path", shown.as_str())]);

        let section = match classify(&name) {
            FragmentName::Fragment(section) => section,
            _ => Section::All,
        };

        let result = fs::read_to_string(path)
            .map_err(|e| IndexError::source_unreadable(path, e))
            .and_then(|text| {
                let mut builder = IndexBuilder::new();
                self.add(&mut builder, &name, &text, section)?;
                builder.build()
            });

        finish(path, result)
    }

    /// Load every fragment in a search directory, in file-name order.
    ///
    /// Fails with `DOCX_EMPTY_INDEX` when the directory has no fragment.
    pub fn load_dir(&self, dir: &Path) -> IndexResult<SearchIndex> {
        let shown = dir.display().to_string();
        log_event_with_fields(Event::IndexLoadStart, &[("path", shown.as_str())]);
        let result = self.load_dir_inner(dir);
        finish(dir, result)
    }

    /// The shared bundled index, counted into this loader's metrics as one
    /// loaded fragment
    pub fn bundled(&self) -> &'static SearchIndex {
        let index = bundled();
        if let Some(metrics) = self.metrics {
            metrics.record_fragment(index.len() as u64);
        }
        index
    }

    /// Load `path` as a directory or a single fragment
    pub fn load_path(&self, path: &Path) -> IndexResult<SearchIndex> {
        if path.is_dir() {
            self.load_dir(path)
        } else {
            self.load_file(path)
        }
    }

    fn load_dir_inner(&self, dir: &Path) -> IndexResult<SearchIndex> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| IndexError::source_unreadable(dir, e))?
            .map(|entry| {
                entry
                    .map(|e| e.path())
                    .map_err(|e| IndexError::source_unreadable(dir, e))
            })
            .collect::<IndexResult<_>>()?;
        files.sort();

        let mut builder = IndexBuilder::new();
        for path in files.iter().filter(|p| p.is_file()) {
            let name = display_name(path);
            let section = match classify(&name) {
                FragmentName::Fragment(section) => section,
                FragmentName::UnknownSection(prefix) => {
                    log_event_with_fields(
                        Event::FragmentSkipped,
                        &[("fragment", name.as_str()), ("section", prefix.as_str())],
                    );
                    if let Some(metrics) = self.metrics {
                        metrics.increment_fragments_skipped();
                    }
                    continue;
                }
                FragmentName::NotFragment => continue,
            };

            let text =
                fs::read_to_string(path).map_err(|e| IndexError::source_unreadable(path, e))?;
            self.add(&mut builder, &name, &text, section)?;
        }

        if builder.fragment_count() == 0 {
            return Err(IndexError::empty_index(format!(
                "no index fragments in {}",
                dir.display()
            )));
        }
        builder.build()
    }

    fn add(
        &self,
        builder: &mut IndexBuilder,
        name: &str,
        text: &str,
        section: Section,
    ) -> IndexResult<()> {
        let entries = parse_fragment(text, section).map_err(|e| e.in_fragment(name))?;
        let count = entries.len();
        builder.add_fragment(entries).map_err(|e| e.in_fragment(name))?;

        let shown_count = count.to_string();
        log_event_with_fields(
            Event::FragmentLoaded,
            &[
                ("fragment", name),
                ("section", section.as_str()),
                ("entries", shown_count.as_str()),
            ],
        );
        if let Some(metrics) = self.metrics {
            metrics.record_fragment(count as u64);
        }
        Ok(())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn finish(path: &Path, result: IndexResult<SearchIndex>) -> IndexResult<SearchIndex> {
    match &result {
        Ok(index) => {
            let shown = path.display().to_string();
            let entries = index.len().to_string();
            let targets = index.target_count().to_string();
            log_event_with_fields(
                Event::IndexLoaded,
                &[
                    ("path", shown.as_str()),
                    ("entries", entries.as_str()),
                    ("targets", targets.as_str()),
                ],
            )
        }
        Err(e) => log_event_with_fields(
            Event::IndexLoadFailed,
            &[("code", e.code().code()), ("message", e.message())],
        ),
    }
    result
}

/// Load one fragment held in memory as section `all`
pub fn load_str(text: &str) -> IndexResult<SearchIndex> {
    IndexLoader::new().load_str(text)
}

/// Load one fragment file
pub fn load_file(path: &Path) -> IndexResult<SearchIndex> {
    IndexLoader::new().load_file(path)
}

/// Load every fragment in a search directory
pub fn load_dir(dir: &Path) -> IndexResult<SearchIndex> {
    IndexLoader::new().load_dir(dir)
}

/// Load a fragment file or a search directory
pub fn load_path(path: &Path) -> IndexResult<SearchIndex> {
    IndexLoader::new().load_path(path)
}

/// The fragment shipped with the crate, parsed on first use and shared for
/// the rest of the process.
pub fn bundled() -> &'static SearchIndex {
    BUNDLED.get_or_init(|| {
        let mut builder = IndexBuilder::new();
        let entries = parse_fragment(BUNDLED_FRAGMENT, Section::All)
            .expect("bundled fragment is well-formed");
        builder
            .add_fragment(entries)
            .expect("bundled fragment has unique keys");
        builder.build().expect("bundled index has one fragment")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_names() {
        assert_eq!(classify("all_0.js"), FragmentName::Fragment(Section::All));
        assert_eq!(classify("classes_1a.js"), FragmentName::Fragment(Section::Classes));
        assert_eq!(
            classify("widgets_0.js"),
            FragmentName::UnknownSection("widgets".to_string())
        );
        assert_eq!(classify("searchdata.js"), FragmentName::NotFragment);
        assert_eq!(classify("search.js"), FragmentName::NotFragment);
        assert_eq!(classify("all_0.html"), FragmentName::NotFragment);
    }

    #[test]
    fn test_bundled_has_sixteen_keys() {
        let index = bundled();
        assert_eq!(index.len(), 16);
        assert_eq!(index.sections(), &[Section::All]);
    }

    #[test]
    fn test_bundled_is_shared() {
        assert!(std::ptr::eq(bundled(), bundled()));
    }

    #[test]
    fn test_load_str_counts_metrics() {
        let metrics = MetricsRegistry::new();
        let index = IndexLoader::with_metrics(&metrics)
            .load_str("var searchData=[['ax',['ax','../a.html']]];")
            .unwrap();

        assert_eq!(index.len(), 1);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.fragments_loaded, 1);
        assert_eq!(snapshot.entries_loaded, 1);
    }

    #[test]
    fn test_loader_bundled_counts_metrics() {
        let metrics = MetricsRegistry::new();
        let index = IndexLoader::with_metrics(&metrics).bundled();

        assert!(std::ptr::eq(index, bundled()));
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.fragments_loaded, 1);
        assert_eq!(snapshot.entries_loaded, 16);
    }

    #[test]
    fn test_load_str_error_names_memory() {
        let err = load_str("[['ax']]").unwrap_err();
        assert!(err.message().starts_with("<memory>: "));
    }
}
