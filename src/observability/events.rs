//! Observable events
//!
//! Every lifecycle point that gets logged has a variant here. Events are
//! explicit and typed; the string form is what appears in the `event`
//! field of a log line.

use std::fmt;

/// Observable events in docindex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Index loading
    /// Index load begins
    IndexLoadStart,
    /// One fragment parsed and added
    FragmentLoaded,
    /// A fragment file named an unknown section
    FragmentSkipped,
    /// Index ready for queries
    IndexLoaded,
    /// Index load failed (FATAL)
    IndexLoadFailed,

    // Queries
    /// Query answered
    QueryExecuted,
    /// Request could not be answered
    QueryRejected,

    // Serving loop
    /// Ready to read requests from stdin
    Serving,
    /// Input closed, loop finished
    ServeComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::IndexLoadStart => "INDEX_LOAD_BEGIN",
            Event::FragmentLoaded => "FRAGMENT_LOADED",
            Event::FragmentSkipped => "FRAGMENT_SKIPPED",
            Event::IndexLoaded => "INDEX_LOAD_COMPLETE",
            Event::IndexLoadFailed => "INDEX_LOAD_FAILED",

            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",

            Event::Serving => "DOCINDEX_SERVING",
            Event::ServeComplete => "DOCINDEX_SERVE_COMPLETE",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::IndexLoadFailed)
    }

    /// Returns true if this event signals something the operator should see
    /// even with quiet logging
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::FragmentSkipped | Event::QueryRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::IndexLoadStart,
            Event::FragmentLoaded,
            Event::FragmentSkipped,
            Event::IndexLoaded,
            Event::IndexLoadFailed,
            Event::QueryExecuted,
            Event::QueryRejected,
            Event::Serving,
            Event::ServeComplete,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::IndexLoadFailed.is_fatal());
        assert!(!Event::IndexLoaded.is_fatal());
        assert!(!Event::FragmentSkipped.is_fatal());
    }

    #[test]
    fn test_warning_events() {
        assert!(Event::FragmentSkipped.is_warning());
        assert!(!Event::FragmentLoaded.is_warning());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::IndexLoaded), "INDEX_LOAD_COMPLETE");
    }
}
