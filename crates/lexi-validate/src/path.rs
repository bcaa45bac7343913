//! Path expressions over nested records
//!
//! Grammar: an optional `$` root marker followed by any number of segments:
//!
//! - `.name`: field of a mapping (`[A-Za-z0-9_-]+`)
//! - `['name']` / `["name"]`: quoted field, for keys outside the bare charset
//! - `[*]`: every element of an array
//! - `[3]`: one element of an array
//!
//! The root marker may be omitted (`senses[*].id`). Missing fields, out of
//! range indices and wildcards over non-arrays produce no match rather than an
//! error; only malformed expressions fail.

use dashmap::DashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Malformed path expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid path expression '{path}' at position {position}: {reason}")]
pub struct PathError {
    /// The expression as written
    pub path: String,
    /// Position of the problem, counted in characters rather than bytes
    pub position: usize,
    /// What went wrong
    pub reason: String,
}

/// One step of a compiled path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Mapping field access
    Field(String),
    /// Array element access
    Index(usize),
    /// Every element of an array
    Wildcard,
}

/// Compiled path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    source: String,
    segments: Vec<Segment>,
}

/// A value found by a path, with the concrete path that reached it
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatch<'a> {
    /// The matched value, borrowed from the record
    pub value: &'a Value,
    /// Concrete path, e.g. `$.senses[2].definition`
    pub path: String,
    /// Last field name or index on the path (`None` for the root)
    pub key: Option<String>,
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, position: usize, reason: impl Into<String>) -> PathError {
        PathError {
            path: self.source.to_string(),
            position,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_field_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn expect_close(&mut self) -> Result<(), PathError> {
        if self.peek() == Some(']') {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(self.pos, "expected ']'"))
        }
    }

    fn read_bracket(&mut self) -> Result<Segment, PathError> {
        // caller guarantees the current char is '['
        self.pos += 1;
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                self.expect_close()?;
                Ok(Segment::Wildcard)
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| self.error(start, "array index out of range"))?;
                self.expect_close()?;
                Ok(Segment::Index(index))
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error(start, "unterminated quoted field"));
                }
                let name: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                self.expect_close()?;
                Ok(Segment::Field(name))
            }
            Some('-') => Err(self.error(self.pos, "negative indices are not supported")),
            Some(c) => Err(self.error(self.pos, format!("unexpected '{c}' inside brackets"))),
            None => Err(self.error(self.pos, "unterminated bracket")),
        }
    }

    fn parse(mut self) -> Result<Vec<Segment>, PathError> {
        let mut segments = Vec::new();

        match self.peek() {
            Some('$') => self.pos += 1,
            Some('[') | None => {}
            Some(c) if is_field_char(c) => segments.push(Segment::Field(self.read_name())),
            Some(c) => return Err(self.error(0, format!("unexpected leading '{c}'"))),
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    let at = self.pos;
                    let name = self.read_name();
                    if name.is_empty() {
                        return Err(self.error(at, "expected field name after '.'"));
                    }
                    segments.push(Segment::Field(name));
                }
                '[' => segments.push(self.read_bracket()?),
                other => return Err(self.error(self.pos, format!("unexpected '{other}'"))),
            }
        }

        Ok(segments)
    }
}

impl PathExpr {
    /// Parse a path expression
    pub fn parse(source: &str) -> Result<Self, PathError> {
        let segments = Parser::new(source).parse()?;
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The expression as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether any segment fans out over an array
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Wildcard))
    }

    /// Resolve against a record, in array-index / insertion order
    pub fn evaluate<'a>(&self, root: &'a Value) -> Vec<PathMatch<'a>> {
        let mut current = vec![PathMatch {
            value: root,
            path: "$".to_string(),
            key: None,
        }];

        for segment in &self.segments {
            let mut next = Vec::with_capacity(current.len());
            for m in current {
                match segment {
                    Segment::Field(name) => {
                        if let Some(child) = m.value.as_object().and_then(|obj| obj.get(name)) {
                            next.push(PathMatch {
                                value: child,
                                path: push_field(&m.path, name),
                                key: Some(name.clone()),
                            });
                        }
                    }
                    Segment::Index(index) => {
                        if let Some(child) = m.value.as_array().and_then(|arr| arr.get(*index)) {
                            next.push(PathMatch {
                                value: child,
                                path: format!("{}[{index}]", m.path),
                                key: Some(index.to_string()),
                            });
                        }
                    }
                    Segment::Wildcard => {
                        if let Some(items) = m.value.as_array() {
                            for (index, child) in items.iter().enumerate() {
                                next.push(PathMatch {
                                    value: child,
                                    path: format!("{}[{index}]", m.path),
                                    key: Some(index.to_string()),
                                });
                            }
                        }
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }

        current
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Append a field to a concrete path, quoting names outside the bare charset
pub(crate) fn push_field(path: &str, name: &str) -> String {
    if !name.is_empty() && name.chars().all(is_field_char) {
        format!("{path}.{name}")
    } else {
        format!("{path}['{name}']")
    }
}

/// Last field name or index of a concrete path (`$` for the root)
pub(crate) fn last_key(path: &str) -> &str {
    if let Some(inner) = path.strip_suffix(']') {
        let Some(open) = inner.rfind('[') else {
            return path;
        };
        let key = &inner[open + 1..];
        return key
            .strip_prefix('\'')
            .and_then(|k| k.strip_suffix('\''))
            .unwrap_or(key);
    }
    match path.rfind('.') {
        Some(dot) => &path[dot + 1..],
        None => path,
    }
}

/// Path evaluator with a compilation cache keyed by the literal path string
#[derive(Debug, Default)]
pub struct PathEvaluator {
    cache: DashMap<String, Arc<PathExpr>>,
}

impl PathEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a path, reusing a cached expression when available
    pub fn compile(&self, path: &str) -> Result<Arc<PathExpr>, PathError> {
        if let Some(expr) = self.cache.get(path) {
            return Ok(Arc::clone(expr.value()));
        }
        trace!(path, "path cache miss");
        let expr = Arc::new(PathExpr::parse(path)?);
        self.cache.insert(path.to_string(), Arc::clone(&expr));
        Ok(expr)
    }

    /// Resolve `path` against `record`
    pub fn evaluate<'a>(&self, record: &'a Value, path: &str) -> Result<Vec<PathMatch<'a>>, PathError> {
        Ok(self.compile(path)?.evaluate(record))
    }

    /// Number of compiled expressions held in the cache
    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }
}
