//! Path addressing for JSON trees.
//!
//! A [`JsonPath`] is a structured list of segments rooted at `$`. It renders to
//! the familiar `$.triggers[0].actions[1]` form and parses back from it, so
//! change records can carry stable, printable addresses while the engine itself
//! never slices strings to move around a tree.

use crate::error::PathError;
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

mod edit;
mod walker;

pub use edit::{json_insert, json_remove, json_set};
pub use walker::{Visit, walk, walk_mut};

/// The root marker of every rendered path.
pub const PATH_ROOT: &str = "$";

/// One step from a value to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// An object member.
    Field(String),
    /// An array element.
    Index(usize),
}

impl PathSegment {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Field(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "[{}]", i),
            PathSegment::Field(name) if is_plain_field(name) => write!(f, ".{}", name),
            PathSegment::Field(name) => {
                let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
                write!(f, "['{}']", escaped)
            }
        }
    }
}

/// An address inside a JSON tree. The empty path is the root (`$`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn field(&self, name: &str) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Field(name.to_string()));
        path
    }

    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Index(index));
        path
    }

    /// The enclosing path. The root is its own parent.
    pub fn parent(&self) -> Self {
        let mut path = self.clone();
        path.segments.pop();
        path
    }

    /// Appends `suffix` (itself rooted at `$`) below this path.
    pub fn join(&self, suffix: &JsonPath) -> Self {
        let mut path = self.clone();
        path.segments.extend(suffix.segments.iter().cloned());
        path
    }

    /// True when `self` equals `other` or lies somewhere below it.
    pub fn starts_with(&self, other: &JsonPath) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// The part of `self` below `prefix`, rooted at `$`.
    pub fn strip_prefix(&self, prefix: &JsonPath) -> Option<JsonPath> {
        self.segments
            .strip_prefix(prefix.segments.as_slice())
            .map(|rest| JsonPath::from_segments(rest.to_vec()))
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub(crate) fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Parses a path expression. A leading `$` is optional, so the relative
    /// form `triggers[0].actions` is accepted as well.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        PathParser::new(input).parse()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PATH_ROOT, self.segments.iter().join(""))
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::parse(s)
    }
}

impl Serialize for JsonPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        JsonPath::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Resolves `path` against `tree`. `None` is the "absent" sentinel; this never fails.
pub fn get_at<'a>(tree: &'a Value, path: &JsonPath) -> Option<&'a Value> {
    path.segments
        .iter()
        .try_fold(tree, |current, segment| match segment {
            PathSegment::Field(name) => current.as_object()?.get(name),
            PathSegment::Index(i) => current.as_array()?.get(*i),
        })
}

pub fn get_at_mut<'a>(tree: &'a mut Value, path: &JsonPath) -> Option<&'a mut Value> {
    path.segments
        .iter()
        .try_fold(tree, |current, segment| match segment {
            PathSegment::Field(name) => current.as_object_mut()?.get_mut(name),
            PathSegment::Index(i) => current.as_array_mut()?.get_mut(*i),
        })
}

pub fn has_at(tree: &Value, path: &JsonPath) -> bool {
    get_at(tree, path).is_some()
}

fn is_plain_field(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

struct PathParser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<JsonPath, PathError> {
        let mut segments = Vec::new();

        if self.peek() == Some('$') {
            self.pos += 1;
        } else if !self.chars.is_empty() && self.peek() != Some('[') {
            // Relative form: the first member has no leading dot.
            segments.push(PathSegment::Field(self.read_field()?));
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    segments.push(PathSegment::Field(self.read_field()?));
                }
                '[' => {
                    self.pos += 1;
                    segments.push(self.read_bracket()?);
                }
                other => return Err(self.error(format!("unexpected character '{}'", other))),
            }
        }

        Ok(JsonPath { segments })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn read_field(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("empty member name".to_string()));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn read_bracket(&mut self) -> Result<PathSegment, PathError> {
        let segment = match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let mut name = String::new();
                loop {
                    match self.peek() {
                        None => return Err(self.error("unterminated quoted member".to_string())),
                        Some('\\') => {
                            self.pos += 1;
                            let escaped = self
                                .peek()
                                .ok_or_else(|| self.error("dangling escape".to_string()))?;
                            name.push(escaped);
                            self.pos += 1;
                        }
                        Some(c) if c == quote => {
                            self.pos += 1;
                            break;
                        }
                        Some(c) => {
                            name.push(c);
                            self.pos += 1;
                        }
                    }
                }
                PathSegment::Field(name)
            }
            _ => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| self.error("expected an array index".to_string()))?;
                PathSegment::Index(index)
            }
        };

        if self.peek() != Some(']') {
            return Err(self.error("expected ']'".to_string()));
        }
        self.pos += 1;
        Ok(segment)
    }

    fn error(&self, message: String) -> PathError {
        PathError::Malformed {
            path: self.input.to_string(),
            offset: self.pos,
            message,
        }
    }
}
