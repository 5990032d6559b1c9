//! Fragment parser
//!
//! Reads one generated search fragment:
//!
//! ```text
//! var searchData=
//! [
//!   ['array2d_2ehpp',['Array2D.hpp',['../Array2D_8hpp.html',1,'']]],
//!   ...
//! ];
//! ```
//!
//! Parsing happens in two passes. The lexical pass turns the JavaScript
//! literal into a [`Literal`] tree and fails with a [`SyntaxError`]. The
//! shape pass checks every record against `[key, [label, target, ...]]` and
//! fails with `DOCX_MALFORMED_ENTRY` naming the record. Either failure
//! rejects the whole fragment.

use thiserror::Error;

use super::entry::{Entry, LinkMode, Section, Target};
use super::errors::{IndexError, IndexResult};
use super::markup::decode_entities;

/// Lexical errors in a fragment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected character '{found}' at byte {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape { offset: usize },

    #[error("integer out of range at byte {offset}")]
    IntegerOutOfRange { offset: usize },

    #[error("trailing content at byte {offset}")]
    TrailingContent { offset: usize },

    #[error("lists nested too deeply at byte {offset}")]
    NestingTooDeep { offset: usize },
}

/// Records nest at most four lists deep (record, body, group, target)
const MAX_DEPTH: usize = 16;

impl From<SyntaxError> for IndexError {
    fn from(e: SyntaxError) -> Self {
        IndexError::malformed_source(e.to_string())
    }
}

/// The subset of JavaScript literals a fragment is made of
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Str(String),
    Int(u64),
    List(Vec<Literal>),
}

impl Literal {
    fn kind(&self) -> &'static str {
        match self {
            Literal::Str(_) => "string",
            Literal::Int(_) => "integer",
            Literal::List(_) => "list",
        }
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if self.src[self.pos..].starts_with("//") {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, want: char) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(c) if c == want => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(found) => Err(SyntaxError::UnexpectedChar {
                found,
                offset: self.pos,
            }),
            None => Err(SyntaxError::UnexpectedEof),
        }
    }

    /// Consume `var <ident> =` if present
    fn skip_declaration(&mut self) -> Result<(), SyntaxError> {
        let rest = &self.src[self.pos..];
        let is_decl = rest.starts_with("var")
            && rest[3..].chars().next().is_some_and(char::is_whitespace);
        if !is_decl {
            return Ok(());
        }

        self.pos += 3;
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return match self.peek() {
                Some(found) => Err(SyntaxError::UnexpectedChar {
                    found,
                    offset: self.pos,
                }),
                None => Err(SyntaxError::UnexpectedEof),
            };
        }
        self.skip_ws();
        self.expect('=')
    }

    fn literal(&mut self) -> Result<Literal, SyntaxError> {
        self.skip_ws();
        match self.peek() {
            Some('[') => self.list().map(Literal::List),
            Some(q @ ('\'' | '"')) => self.string(q).map(Literal::Str),
            Some(c) if c.is_ascii_digit() => self.integer(),
            Some(found) => Err(SyntaxError::UnexpectedChar {
                found,
                offset: self.pos,
            }),
            None => Err(SyntaxError::UnexpectedEof),
        }
    }

    fn list(&mut self) -> Result<Vec<Literal>, SyntaxError> {
        if self.depth == MAX_DEPTH {
            return Err(SyntaxError::NestingTooDeep { offset: self.pos });
        }
        self.depth += 1;
        let items = self.list_items();
        self.depth -= 1;
        items
    }

    fn list_items(&mut self) -> Result<Vec<Literal>, SyntaxError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.literal()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {}
                Some(found) => {
                    return Err(SyntaxError::UnexpectedChar {
                        found,
                        offset: self.pos,
                    })
                }
                None => return Err(SyntaxError::UnexpectedEof),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let c = self
                .bump()
                .ok_or(SyntaxError::UnterminatedString { offset: start })?;
            match c {
                c if c == quote => return Ok(out),
                '\n' => return Err(SyntaxError::UnterminatedString { offset: start }),
                '\\' => {
                    let escape_at = self.pos - 1;
                    let e = self
                        .bump()
                        .ok_or(SyntaxError::UnterminatedString { offset: start })?;
                    match e {
                        '\\' | '\'' | '"' | '/' => out.push(e),
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'u' => out.push(self.unicode_escape(escape_at)?),
                        _ => return Err(SyntaxError::InvalidEscape { offset: escape_at }),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self, escape_at: usize) -> Result<char, SyntaxError> {
        let digits = self
            .src
            .get(self.pos..self.pos + 4)
            .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or(SyntaxError::InvalidEscape { offset: escape_at })?;
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| SyntaxError::InvalidEscape { offset: escape_at })?;
        self.pos += 4;
        char::from_u32(code).ok_or(SyntaxError::InvalidEscape { offset: escape_at })
    }

    fn integer(&mut self) -> Result<Literal, SyntaxError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.src[start..self.pos]
            .parse::<u64>()
            .map(Literal::Int)
            .map_err(|_| SyntaxError::IntegerOutOfRange { offset: start })
    }
}

/// Lexical pass: parse the fragment text into its top-level record list.
pub fn parse_literal(text: &str) -> Result<Vec<Literal>, SyntaxError> {
    let mut cursor = Cursor::new(text);
    cursor.skip_ws();
    cursor.skip_declaration()?;
    cursor.skip_ws();

    let records = match cursor.peek() {
        Some('[') => cursor.list()?,
        Some(found) => {
            return Err(SyntaxError::UnexpectedChar {
                found,
                offset: cursor.pos,
            })
        }
        None => return Err(SyntaxError::UnexpectedEof),
    };

    cursor.skip_ws();
    if cursor.peek() == Some(';') {
        cursor.pos += 1;
    }
    cursor.skip_ws();
    if cursor.pos < text.len() {
        return Err(SyntaxError::TrailingContent { offset: cursor.pos });
    }

    Ok(records)
}

/// Parse a whole fragment into entries tagged with `section`.
///
/// Keys are lowercased; record order is preserved.
pub fn parse_fragment(text: &str, section: Section) -> IndexResult<Vec<Entry>> {
    parse_literal(text)?
        .into_iter()
        .enumerate()
        .map(|(position, record)| record_to_entry(position, record, section))
        .collect()
}

fn record_to_entry(position: usize, record: Literal, section: Section) -> IndexResult<Entry> {
    let malformed = |reason: String| IndexError::malformed_entry(position, reason);

    let (key, body) = match record {
        Literal::List(fields) => match <[Literal; 2]>::try_from(fields) {
            Ok([key, body]) => (key, body),
            Err(fields) => {
                return Err(malformed(format!(
                    "expected [key, body], found {} fields",
                    fields.len()
                )))
            }
        },
        other => return Err(malformed(format!("expected list, found {}", other.kind()))),
    };

    let key = match key {
        Literal::Str(key) if !key.is_empty() => key.to_lowercase(),
        Literal::Str(_) => return Err(malformed("key must not be empty".to_string())),
        other => return Err(malformed(format!("key must be a string, found {}", other.kind()))),
    };

    let groups = match body {
        Literal::List(items) => items,
        other => return Err(malformed(format!("body must be a list, found {}", other.kind()))),
    };

    let mut targets = Vec::new();
    if matches!(groups.first(), Some(Literal::List(_))) {
        // [[label, target, ...], [label, target, ...]]
        for group in groups {
            match group {
                Literal::List(items) => collect_group(items, &mut targets).map_err(&malformed)?,
                other => {
                    return Err(malformed(format!(
                        "label group must be a list, found {}",
                        other.kind()
                    )))
                }
            }
        }
    } else {
        // [label, target, ...]
        collect_group(groups, &mut targets).map_err(&malformed)?;
    }

    if targets.is_empty() {
        return Err(malformed(format!("key '{}' has no targets", key)));
    }

    Ok(Entry::new(key, section, targets))
}

fn collect_group(items: Vec<Literal>, targets: &mut Vec<Target>) -> Result<(), String> {
    let mut items = items.into_iter();
    let label = match items.next() {
        Some(Literal::Str(label)) => decode_entities(&label).into_owned(),
        Some(other) => return Err(format!("label must be a string, found {}", other.kind())),
        None => return Err("label group is empty".to_string()),
    };

    let before = targets.len();
    for item in items {
        targets.push(to_target(&label, item)?);
    }
    if targets.len() == before {
        return Err(format!("label '{}' has no targets", label));
    }
    Ok(())
}

fn to_target(label: &str, item: Literal) -> Result<Target, String> {
    let (anchor, flag, scope) = match item {
        Literal::Str(anchor) => (anchor, None, None),
        Literal::List(parts) => {
            if parts.len() > 3 {
                return Err(format!("target has {} fields, at most 3 allowed", parts.len()));
            }
            let mut parts = parts.into_iter();
            let anchor = match parts.next() {
                Some(Literal::Str(anchor)) => anchor,
                Some(other) => {
                    return Err(format!("anchor must be a string, found {}", other.kind()))
                }
                None => return Err("target list is empty".to_string()),
            };
            let mut flag = None;
            let mut scope = None;
            for part in parts {
                match part {
                    Literal::Int(f) if flag.is_none() && scope.is_none() => flag = Some(f),
                    Literal::Str(s) if scope.is_none() => scope = Some(s),
                    other => {
                        return Err(format!("unexpected {} in target", other.kind()))
                    }
                }
            }
            (anchor, flag, scope)
        }
        Literal::Int(_) => return Err("target must be a string or list, found integer".to_string()),
    };

    if anchor.is_empty() {
        return Err("anchor must not be empty".to_string());
    }

    Ok(Target {
        label: label.to_string(),
        anchor,
        scope: scope
            .filter(|s| !s.is_empty())
            .map(|s| decode_entities(&s).into_owned()),
        link: flag.map_or(LinkMode::Local, LinkMode::from_flag),
    })
}
