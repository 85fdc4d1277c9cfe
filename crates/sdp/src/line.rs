// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lexical layer: typed `<type>=<value>` records and the ordered [`Session`]
//! container they live in.
//!
//! This layer is deliberately ignorant of RFC 4566 semantics. It splits a
//! buffer into trimmed non-blank lines, tags each with its field letter, and
//! renders the sequence back with `\n` separators. Field ordering and value
//! grammars are the concern of [`crate::parse`].

use std::borrow::Cow;
use std::fmt;
use std::ops::Index;

/// Field letter of an SDP line, the single case-significant Unicode scalar
/// before the `=`.
///
/// Letters outside RFC 4566 are preserved as [`FieldType::Other`] so unknown
/// lines survive a lexical round trip; the semantic decoder rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `v=`
    Version,
    /// `o=`
    Origin,
    /// `s=`
    SessionName,
    /// `i=`, session information or media title
    SessionInfo,
    /// `u=`
    Uri,
    /// `e=`
    Email,
    /// `p=`
    Phone,
    /// `c=`
    Connection,
    /// `b=`
    Bandwidth,
    /// `t=`
    Timing,
    /// `r=`
    RepeatTimes,
    /// `z=`
    TimeZones,
    /// `k=`
    EncryptionKey,
    /// `a=`
    Attribute,
    /// `m=`
    Media,
    /// Any other field letter.
    Other(char),
}

impl FieldType {
    pub fn from_char(c: char) -> FieldType {
        match c {
            'v' => FieldType::Version,
            'o' => FieldType::Origin,
            's' => FieldType::SessionName,
            'i' => FieldType::SessionInfo,
            'u' => FieldType::Uri,
            'e' => FieldType::Email,
            'p' => FieldType::Phone,
            'c' => FieldType::Connection,
            'b' => FieldType::Bandwidth,
            't' => FieldType::Timing,
            'r' => FieldType::RepeatTimes,
            'z' => FieldType::TimeZones,
            'k' => FieldType::EncryptionKey,
            'a' => FieldType::Attribute,
            'm' => FieldType::Media,
            other => FieldType::Other(other),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            FieldType::Version => 'v',
            FieldType::Origin => 'o',
            FieldType::SessionName => 's',
            FieldType::SessionInfo => 'i',
            FieldType::Uri => 'u',
            FieldType::Email => 'e',
            FieldType::Phone => 'p',
            FieldType::Connection => 'c',
            FieldType::Bandwidth => 'b',
            FieldType::Timing => 't',
            FieldType::RepeatTimes => 'r',
            FieldType::TimeZones => 'z',
            FieldType::EncryptionKey => 'k',
            FieldType::Attribute => 'a',
            FieldType::Media => 'm',
            FieldType::Other(c) => c,
        }
    }
}

/// Long names for diagnostics; unknown letters print as themselves.
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Version => f.write_str("version"),
            FieldType::Origin => f.write_str("origin"),
            FieldType::SessionName => f.write_str("session name"),
            FieldType::SessionInfo => f.write_str("session info"),
            FieldType::Uri => f.write_str("uri"),
            FieldType::Email => f.write_str("email"),
            FieldType::Phone => f.write_str("phone"),
            FieldType::Connection => f.write_str("connection data"),
            FieldType::Bandwidth => f.write_str("bandwidth"),
            FieldType::Timing => f.write_str("timing"),
            FieldType::RepeatTimes => f.write_str("repeat times"),
            FieldType::TimeZones => f.write_str("time zones"),
            FieldType::EncryptionKey => f.write_str("encryption keys"),
            FieldType::Attribute => f.write_str("attributes"),
            FieldType::Media => f.write_str("media descriptions"),
            FieldType::Other(c) => write!(f, "{}", c),
        }
    }
}

/// Lexical failure for a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineError {
    /// The line has no `=` separator.
    MissingDelimiter,
    /// Nothing precedes the `=`.
    MissingType,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::MissingDelimiter => f.write_str("line has no = delimiter"),
            LineError::MissingType => f.write_str("line has no field type before ="),
        }
    }
}

impl std::error::Error for LineError {}

/// One SDP record, `<type>=<value>`.
///
/// The value may borrow from the decoded input buffer or own its bytes; it
/// may hold any byte except the line separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub kind: FieldType,
    pub value: Cow<'a, [u8]>,
}

impl<'a> Line<'a> {
    pub fn new(kind: FieldType, value: impl Into<Cow<'a, [u8]>>) -> Line<'a> {
        Line {
            kind,
            value: value.into(),
        }
    }

    /// Parses a trimmed line. The value is everything after the first `=`
    /// and may be empty; `=` bytes after the first belong to the value.
    pub fn decode(raw: &'a [u8]) -> Result<Line<'a>, LineError> {
        let delimiter = raw
            .iter()
            .position(|&b| b == b'=')
            .ok_or(LineError::MissingDelimiter)?;
        let kind = first_scalar(&raw[..delimiter]).ok_or(LineError::MissingType)?;
        Ok(Line {
            kind: FieldType::from_char(kind),
            value: Cow::Borrowed(&raw[delimiter + 1..]),
        })
    }

    /// Appends the wire form `<type>=<value>` to `buf`, no terminator.
    pub fn append_to(&self, buf: &mut Vec<u8>) {
        let mut scratch = [0u8; 4];
        buf.extend_from_slice(self.kind.as_char().encode_utf8(&mut scratch).as_bytes());
        buf.push(b'=');
        buf.extend_from_slice(&self.value);
    }

    /// Clones the value into an owned line independent of the input buffer.
    pub fn into_owned(self) -> Line<'static> {
        Line {
            kind: self.kind,
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, String::from_utf8_lossy(&self.value))
    }
}

/// Decodes the first Unicode scalar of `v`, if any.
fn first_scalar(v: &[u8]) -> Option<char> {
    for end in 1..=v.len().min(4) {
        if let Ok(s) = std::str::from_utf8(&v[..end]) {
            return s.chars().next();
        }
    }
    None
}

/// Ordered sequence of [`Line`]s; insertion order is the wire order.
///
/// Equality compares pairwise by field type and value bytes. The container
/// can be [`reset`](Session::reset) and fed back to [`decode_session`] to
/// reuse its allocation across messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session<'a> {
    lines: Vec<Line<'a>>,
}

impl<'a> Session<'a> {
    pub fn new() -> Session<'a> {
        Session::default()
    }

    pub fn with_capacity(capacity: usize) -> Session<'a> {
        Session {
            lines: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Line<'a>> {
        self.lines.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line<'a>> {
        self.lines.iter()
    }

    /// Drops all lines, retaining the allocated capacity.
    pub fn reset(&mut self) {
        self.lines.clear();
    }

    /// Renders all lines joined with `\n` and no trailing separator.
    pub fn append_to(&self, buf: &mut Vec<u8>) {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                buf.push(b'\n');
            }
            line.append_to(buf);
        }
    }
}

impl<'a> Index<usize> for Session<'a> {
    type Output = Line<'a>;

    fn index(&self, index: usize) -> &Line<'a> {
        &self.lines[index]
    }
}

impl<'s, 'a> IntoIterator for &'s Session<'a> {
    type Item = &'s Line<'a>;
    type IntoIter = std::slice::Iter<'s, Line<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Splits a buffer into trimmed, non-blank logical lines without copying.
/// Both `\n` and `\r\n` terminate a line; the final line needs no terminator.
struct LineScanner<'a> {
    v: &'a [u8],
    pos: usize,
}

impl<'a> LineScanner<'a> {
    fn new(v: &'a [u8]) -> LineScanner<'a> {
        LineScanner { v, pos: 0 }
    }
}

impl<'a> Iterator for LineScanner<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        while self.pos < self.v.len() {
            let rest = &self.v[self.pos..];
            let (raw, advance) = match rest.iter().position(|&b| b == b'\n') {
                Some(nl) => (&rest[..nl], nl + 1),
                None => (rest, rest.len()),
            };
            self.pos += advance;
            let line = trim_whitespace(raw);
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }
}

fn trim_whitespace(mut v: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = v {
        if !first.is_ascii_whitespace() {
            break;
        }
        v = rest;
    }
    while let [rest @ .., last] = v {
        if !last.is_ascii_whitespace() {
            break;
        }
        v = rest;
    }
    v
}

/// Decodes a [`Session`] from `input`. Blank lines and leading/trailing
/// whitespace are ignored; line values borrow from `input`.
///
/// When `reuse` is given, decoded lines are appended to it and its
/// allocation is kept.
pub fn decode_session<'a>(
    input: &'a [u8],
    reuse: Option<Session<'a>>,
) -> Result<Session<'a>, LineError> {
    let mut session = reuse.unwrap_or_default();
    for raw in LineScanner::new(input) {
        session.push(Line::decode(raw)?);
    }
    Ok(session)
}
