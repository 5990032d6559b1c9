//! CLI command implementations
//!
//! Every command, one-shot or read from stdin by `serve`, becomes a
//! [`Request`] and is answered by a [`Session`] over an already loaded
//! index. Loading happens once per process, before the first request.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::index::{key, Entry, IndexLoader, SearchIndex, Section};
use crate::observability::{log_event, log_event_with_fields, Event, Logger, MetricsRegistry, Severity};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_error_to, write_response, write_response_to};

/// A query against the loaded index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    /// Substring search over keys
    Search {
        query: String,
        #[serde(default)]
        symbol: Option<bool>,
        #[serde(default)]
        section: Option<String>,
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Exact key lookup
    Show { key: String },
    /// Key listing
    Keys {
        #[serde(default)]
        section: Option<String>,
    },
    /// Index and process counters
    Stats,
}

impl Request {
    /// The request a one-shot command stands for; `None` for `serve`
    pub fn from_command(command: Command) -> Option<Self> {
        match command {
            Command::Search {
                query,
                symbol,
                section,
                limit,
                ..
            } => Some(Request::Search {
                query,
                // An unset flag defers to the config
                symbol: symbol.then_some(true),
                section,
                limit,
            }),
            Command::Show { key, .. } => Some(Request::Show { key }),
            Command::Keys { section, .. } => Some(Request::Keys { section }),
            Command::Stats { .. } => Some(Request::Stats),
            Command::Serve { .. } => None,
        }
    }
}

/// Answers requests against one index
pub struct Session<'a> {
    index: &'a SearchIndex,
    config: &'a Config,
    metrics: &'a MetricsRegistry,
}

impl<'a> Session<'a> {
    /// Create a session
    pub fn new(index: &'a SearchIndex, config: &'a Config, metrics: &'a MetricsRegistry) -> Self {
        Self {
            index,
            config,
            metrics,
        }
    }

    /// The counters this session updates
    pub fn metrics(&self) -> &MetricsRegistry {
        self.metrics
    }

    /// Answer one request
    pub fn execute(&self, request: Request) -> CliResult<Value> {
        match request {
            Request::Search {
                query,
                symbol,
                section,
                limit,
            } => self.search(&query, symbol, section.as_deref(), limit),
            Request::Show { key } => self
                .index
                .get(&key)
                .map(entry_json)
                .ok_or_else(|| CliError::not_found(&key)),
            Request::Keys { section } => {
                let section = parse_section(section.as_deref())?;
                let keys: Vec<&str> = self
                    .index
                    .entries()
                    .iter()
                    .filter(|e| section.map_or(true, |s| e.section() == s))
                    .map(Entry::key)
                    .collect();
                Ok(json!({ "count": keys.len(), "keys": keys }))
            }
            Request::Stats => Ok(json!({
                "entries": self.index.len(),
                "targets": self.index.target_count(),
                "sections": self.index.sections(),
                "metrics": self.metrics.snapshot(),
            })),
        }
    }

    /// Count and log a request that could not be answered
    pub fn reject(&self, error: &CliError) {
        self.metrics.increment_queries_rejected();
        log_event_with_fields(
            Event::QueryRejected,
            &[("code", error.code_str()), ("message", error.message())],
        );
    }

    fn search(
        &self,
        query: &str,
        symbol: Option<bool>,
        section: Option<&str>,
        limit: Option<usize>,
    ) -> CliResult<Value> {
        let section = parse_section(section)?;
        let symbol = symbol.unwrap_or(self.config.symbol_queries);
        let limit = limit.or(self.config.default_limit);
        if limit == Some(0) {
            return Err(CliError::bad_request("limit must be > 0"));
        }

        let mut matches = match (section, symbol) {
            (None, false) => self.index.search(query),
            (None, true) => self.index.search_symbol(query),
            (Some(s), false) => self.index.search_in(s, query),
            (Some(s), true) => self.index.search_in(s, &key::encode(query)),
        };
        let needle = matches.needle().to_string();

        let results: Vec<Value> = match limit {
            Some(n) => matches.by_ref().take(n).map(entry_json).collect(),
            None => matches.by_ref().map(entry_json).collect(),
        };
        let remaining = matches.count();

        self.metrics.record_query(results.len() as u64);
        let shown = results.len().to_string();
        log_event_with_fields(
            Event::QueryExecuted,
            &[("query", query), ("needle", needle.as_str()), ("matches", shown.as_str())],
        );

        Ok(json!({
            "query": query,
            "needle": needle,
            "total": results.len() + remaining,
            "truncated": remaining > 0,
            "results": results,
        }))
    }
}

fn parse_section(section: Option<&str>) -> CliResult<Option<Section>> {
    section
        .map(|s| s.parse::<Section>().map_err(|e: String| CliError::bad_request(e)))
        .transpose()
}

/// JSON form of one entry
pub fn entry_json(entry: &Entry) -> Value {
    json!({
        "key": entry.key(),
        "name": entry.name(),
        "section": entry.section(),
        "targets": entry.targets(),
    })
}

/// Answer requests read from `input` until it closes.
///
/// Bad requests and misses get an error line and the loop goes on; I/O
/// failures end it.
pub fn serve<R: BufRead, W: Write>(session: &Session<'_>, input: R, out: &mut W) -> CliResult<()> {
    log_event(Event::Serving);

    for raw in read_requests(input) {
        let outcome = raw
            .and_then(|value| {
                serde_json::from_value::<Request>(value)
                    .map_err(|e| CliError::bad_request(format!("Invalid request: {}", e)))
            })
            .and_then(|request| session.execute(request));

        match outcome {
            Ok(data) => write_response_to(out, data)?,
            Err(e) if e.is_request_error() => {
                session.reject(&e);
                write_error_to(out, e.code_str(), e.message())?;
            }
            Err(e) => return Err(e),
        }
    }

    let snapshot = session.metrics().snapshot();
    let executed = snapshot.queries_executed.to_string();
    let rejected = snapshot.queries_rejected.to_string();
    log_event_with_fields(
        Event::ServeComplete,
        &[
            ("queries_executed", executed.as_str()),
            ("queries_rejected", rejected.as_str()),
        ],
    );
    Ok(())
}

/// Load the configuration and apply its log level.
///
/// The threshold is set before anything is logged, so `--log-level` and
/// the config's `log_level` cover `CONFIG_LOADED` too.
fn configure(cli: &Cli) -> CliResult<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let severity: Severity = match &cli.log_level {
        Some(level) => level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("Invalid --log-level: {}", e)))?,
        None => config.severity()?,
    };
    Logger::set_min_severity(severity);

    if let Some(path) = &cli.config {
        let shown = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", shown.as_str())]);
    }
    Ok(config)
}

/// Run a parsed command line
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = configure(&cli)?;

    let metrics = MetricsRegistry::new();
    let index_path: Option<PathBuf> = cli
        .command
        .source()
        .index
        .clone()
        .or_else(|| config.index_path());

    let loader = IndexLoader::with_metrics(&metrics);
    let loaded;
    let index: &SearchIndex = match index_path {
        Some(path) => {
            loaded = loader.load_path(&path)?;
            &loaded
        }
        None => loader.bundled(),
    };

    let session = Session::new(index, &config, &metrics);
    match Request::from_command(cli.command) {
        Some(request) => match session.execute(request) {
            Ok(data) => write_response(data),
            Err(e) => {
                if e.is_request_error() {
                    session.reject(&e);
                }
                Err(e)
            }
        },
        None => serve(&session, io::stdin().lock(), &mut io::stdout().lock()),
    }
}

/// Parse the command line, run it, and report failures as a JSON error
/// object on stdout.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = run_command(cli);
    if let Err(ref e) = result {
        let _ = write_error(e.code_str(), e.message());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::bundled;
    use clap::Parser;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn with_session<T>(config: Config, f: impl FnOnce(&Session<'_>) -> T) -> T {
        let metrics = MetricsRegistry::new();
        let session = Session::new(bundled(), &config, &metrics);
        f(&session)
    }

    fn search(query: &str) -> Request {
        Request::Search {
            query: query.to_string(),
            symbol: None,
            section: None,
            limit: None,
        }
    }

    #[test]
    fn test_search_array2d() {
        let data = with_session(Config::default(), |s| s.execute(search("array2d")).unwrap());
        let keys: Vec<&str> = data["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["key"].as_str().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec!["array2d", "array2d_2ehpp", "array2d_3c_20real_5ftype_20_3e"]
        );
        assert_eq!(data["total"], 3);
        assert_eq!(data["truncated"], false);
    }

    #[test]
    fn test_search_limit_truncates() {
        let data = with_session(Config::default(), |s| {
            s.execute(Request::Search {
                query: "a".to_string(),
                symbol: None,
                section: None,
                limit: Some(2),
            })
            .unwrap()
        });
        assert_eq!(data["results"].as_array().unwrap().len(), 2);
        assert_eq!(data["total"], 16);
        assert_eq!(data["truncated"], true);
    }

    #[test]
    fn test_config_default_limit_and_symbol() {
        let config = Config {
            default_limit: Some(1),
            symbol_queries: true,
            ..Config::default()
        };
        let data = with_session(config, |s| s.execute(search("Array2D.hpp")).unwrap());
        assert_eq!(data["needle"], "array2d_2ehpp");
        assert_eq!(data["results"][0]["name"], "array2d.hpp");
        assert_eq!(data["results"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = with_session(Config::default(), |s| {
            s.execute(Request::Search {
                query: "a".to_string(),
                symbol: None,
                section: None,
                limit: Some(0),
            })
            .unwrap_err()
        });
        assert_eq!(err.code_str(), "DOCX_CLI_BAD_REQUEST");
    }

    #[test]
    fn test_show_and_not_found() {
        with_session(Config::default(), |s| {
            let data = s.execute(Request::Show { key: "Altitude".to_string() }).unwrap();
            assert_eq!(data["targets"].as_array().unwrap().len(), 2);
            assert_eq!(data["targets"][1]["scope"], "SolarGeometry::altitude()");

            let err = s.execute(Request::Show { key: "xyz".to_string() }).unwrap_err();
            assert_eq!(err.code_str(), "DOCX_CLI_NOT_FOUND");
        });
    }

    #[test]
    fn test_keys_and_unknown_section() {
        with_session(Config::default(), |s| {
            let data = s.execute(Request::Keys { section: None }).unwrap();
            assert_eq!(data["count"], 16);
            assert_eq!(data["keys"][0], "accumulatetimer");

            let data = s
                .execute(Request::Keys { section: Some("classes".to_string()) })
                .unwrap();
            assert_eq!(data["count"], 0);

            let err = s
                .execute(Request::Keys { section: Some("widgets".to_string()) })
                .unwrap_err();
            assert_eq!(err.code_str(), "DOCX_CLI_BAD_REQUEST");
        });
    }

    #[test]
    fn test_request_deserialize() {
        let request: Request =
            serde_json::from_str(r#"{"op":"search","query":"ax","limit":4}"#).unwrap();
        assert_eq!(
            request,
            Request::Search {
                query: "ax".to_string(),
                symbol: None,
                section: None,
                limit: Some(4),
            }
        );
        let request: Request = serde_json::from_str(r#"{"op":"stats"}"#).unwrap();
        assert_eq!(request, Request::Stats);
    }

    #[test]
    fn test_serve_answers_each_line() {
        let input = Cursor::new(
            "{\"op\":\"search\",\"query\":\"azimuth\"}\n\
             {\"op\":\"show\",\"key\":\"nope\"}\n\
             {\"op\":\"dance\"}\n\
             {\"op\":\"stats\"}\n",
        );
        let mut out = Vec::new();

        let config = Config::default();
        let metrics = MetricsRegistry::new();
        let session = Session::new(bundled(), &config, &metrics);
        serve(&session, input, &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[0]["data"]["total"], 1);
        assert_eq!(lines[1]["code"], "DOCX_CLI_NOT_FOUND");
        assert_eq!(lines[2]["code"], "DOCX_CLI_BAD_REQUEST");
        assert_eq!(lines[3]["data"]["metrics"]["queries_executed"], 1);
        assert_eq!(lines[3]["data"]["metrics"]["queries_rejected"], 2);
        assert_eq!(lines[3]["data"]["entries"], 16);
    }

    #[test]
    fn test_serve_continues_after_invalid_utf8() {
        let input = Cursor::new(b"{\"op\":\"stats\"}\n\xff\xfe\n{\"op\":\"stats\"}\n".to_vec());
        let mut out = Vec::new();

        let config = Config::default();
        let metrics = MetricsRegistry::new();
        let session = Session::new(bundled(), &config, &metrics);
        serve(&session, input, &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[1]["code"], "DOCX_CLI_BAD_REQUEST");
        assert_eq!(lines[2]["status"], "ok");
        assert_eq!(lines[2]["data"]["metrics"]["queries_rejected"], 1);
    }

    #[test]
    fn test_configure_applies_log_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docindex.json");
        std::fs::write(&path, r#"{"log_level":"error"}"#).unwrap();
        let shown = path.display().to_string();

        let cli = Cli::try_parse_from(["docindex", "stats", "--config", shown.as_str()]).unwrap();
        let config = configure(&cli).unwrap();
        assert_eq!(config.log_level, "error");
        assert_eq!(Logger::min_severity(), Severity::Error);
        assert!(!Logger::enabled(Severity::Info));

        let cli = Cli::try_parse_from([
            "docindex", "stats", "--config", shown.as_str(), "--log-level", "fatal",
        ])
        .unwrap();
        configure(&cli).unwrap();
        assert_eq!(Logger::min_severity(), Severity::Fatal);
        assert!(!Logger::enabled(Severity::Warn));
    }

    #[test]
    fn test_from_command() {
        let cli = Cli::try_parse_from(["docindex", "search", "ax", "--symbol"]).unwrap();
        match Request::from_command(cli.command) {
            Some(Request::Search { symbol, .. }) => assert_eq!(symbol, Some(true)),
            other => panic!("unexpected {:?}", other),
        }

        let cli = Cli::try_parse_from(["docindex", "search", "ax"]).unwrap();
        match Request::from_command(cli.command) {
            Some(Request::Search { symbol, .. }) => assert_eq!(symbol, None),
            other => panic!("unexpected {:?}", other),
        }

        let cli = Cli::try_parse_from(["docindex", "serve"]).unwrap();
        assert!(Request::from_command(cli.command).is_none());
    }
}
