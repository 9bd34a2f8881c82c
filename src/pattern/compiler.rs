//! Pattern DSL compilation.
//!
//! # Grammar
//! ```text
//! pattern  := segment ("/" segment)*        leading/trailing "/" ignored
//! segment  := (literal | capture)*
//! capture  := "(" ["<" name ">"] ":" class quant ")"
//! class    := "n" digits | "s" letters | "a" word chars
//!           | "p" path-safe | "*" path-safe including "/"
//! quant    := "!" one or more | "?" zero or more
//! ```
//!
//! # Design Decisions
//! - Literals are escaped and matched case-insensitively, ASCII letters only;
//!   classes are plain ASCII ranges
//! - A segment holding only an optional capture makes its separator optional,
//!   so `page/(:p!)/(:p?)` matches `page/a` and `(:p?)/x` matches `x`
//! - The wildcard class spans `/`; a second wildcard, or any capture after
//!   it, is a compile error rather than something to backtrack around

use std::collections::HashSet;
use std::fmt::{self, Write as _};

use regex::Regex;
use thiserror::Error;

/// Errors produced while compiling a route pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unbalanced parentheses in segment `{segment}`")]
    Unbalanced { segment: String },

    #[error("unknown capture token `{token}` in segment `{segment}`")]
    UnknownToken { segment: String, token: String },

    #[error("invalid capture name `{name}` in segment `{segment}`")]
    InvalidName { segment: String, name: String },

    #[error("capture name `{name}` is used more than once")]
    DuplicateName { name: String },

    #[error("pattern `{pattern}` contains {count} wildcard captures, at most one is allowed")]
    MultipleWildcards { pattern: String, count: usize },

    #[error("capture in segment `{segment}` follows the wildcard capture")]
    CaptureAfterWildcard { segment: String },

    #[error("pattern `{pattern}` could not be compiled: {message}")]
    Regex { pattern: String, message: String },
}

/// Character class a capture may consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// `n`: ASCII digits.
    Digits,
    /// `s`: ASCII letters.
    Letters,
    /// `a`: letters, digits and underscore.
    WordChars,
    /// `p`: URL-safe characters, excluding `/`.
    PathSafe,
    /// `*`: URL-safe characters including `/` (the greedy wildcard).
    PathSafeWithSlash,
}

impl CharClass {
    fn from_token(token: char) -> Option<Self> {
        match token {
            'n' => Some(CharClass::Digits),
            's' => Some(CharClass::Letters),
            'a' => Some(CharClass::WordChars),
            'p' => Some(CharClass::PathSafe),
            '*' => Some(CharClass::PathSafeWithSlash),
            _ => None,
        }
    }

    /// DSL token for this class.
    pub fn token(self) -> char {
        match self {
            CharClass::Digits => 'n',
            CharClass::Letters => 's',
            CharClass::WordChars => 'a',
            CharClass::PathSafe => 'p',
            CharClass::PathSafeWithSlash => '*',
        }
    }

    /// Returns true if the class may span path separators.
    pub fn spans_segments(self) -> bool {
        self == CharClass::PathSafeWithSlash
    }

    /// Optional path-safe captures also accept `{` and `}`.
    fn regex_class(self, required: bool) -> &'static str {
        match (self, required) {
            (CharClass::Digits, _) => "[0-9]",
            (CharClass::Letters, _) => "[a-zA-Z]",
            (CharClass::WordChars, _) => "[a-zA-Z0-9_]",
            (CharClass::PathSafe, true) => "[a-zA-Z0-9_?&=%.+-]",
            (CharClass::PathSafe, false) => "[a-zA-Z0-9_?&=%.+{}-]",
            (CharClass::PathSafeWithSlash, true) => "[a-zA-Z0-9_?&=%.+/-]",
            (CharClass::PathSafeWithSlash, false) => "[a-zA-Z0-9_?&=%.+/{}-]",
        }
    }
}

/// A typed placeholder extracting part of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Output name; `None` for positional captures.
    pub name: Option<String>,
    pub class: CharClass,
    /// Required captures consume at least one character.
    pub required: bool,
}

impl Capture {
    /// Returns true for the greedy wildcard capture.
    pub fn is_wildcard(&self) -> bool {
        self.class.spans_segments()
    }

    fn regex(&self) -> String {
        let quantifier = if self.required { '+' } else { '*' };
        format!("{}{}", self.class.regex_class(self.required), quantifier)
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        if let Some(name) = &self.name {
            write!(f, "<{}>", name)?;
        }
        let quantifier = if self.required { '!' } else { '?' };
        write!(f, ":{}{})", self.class.token(), quantifier)
    }
}

/// A piece of a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Literal(String),
    Capture(Capture),
}

/// One `/`-delimited part of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pieces: Vec<Piece>,
}

impl Segment {
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Returns true if the segment has no captures.
    pub fn is_literal(&self) -> bool {
        self.pieces.iter().all(|p| matches!(p, Piece::Literal(_)))
    }

    /// The capture, if this segment is nothing but one optional capture.
    fn lone_optional_capture(&self) -> Option<&Capture> {
        match self.pieces.as_slice() {
            [Piece::Capture(capture)] if !capture.required => Some(capture),
            _ => None,
        }
    }

    fn captures(&self) -> impl Iterator<Item = &Capture> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Capture(c) => Some(c),
            Piece::Literal(_) => None,
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => f.write_str(text)?,
                Piece::Capture(capture) => write!(f, "{}", capture)?,
            }
        }
        Ok(())
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
    captures: Vec<Capture>,
    regex: Regex,
}

impl RoutePattern {
    /// The DSL text this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All captures, left to right. Capture `i` is regex group `i + 1`.
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    pub fn has_wildcard(&self) -> bool {
        self.captures.iter().any(Capture::is_wildcard)
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Compile a pattern DSL string.
pub fn compile(source: &str) -> Result<RoutePattern, CompileError> {
    let trimmed = source.trim_matches('/');
    let segments = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed
            .split('/')
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()?
    };

    let wildcards = segments
        .iter()
        .flat_map(Segment::captures)
        .filter(|c| c.is_wildcard())
        .count();
    if wildcards > 1 {
        return Err(CompileError::MultipleWildcards {
            pattern: source.to_string(),
            count: wildcards,
        });
    }

    let mut seen_wildcard = false;
    let mut names = HashSet::new();
    for segment in &segments {
        for capture in segment.captures() {
            if seen_wildcard {
                return Err(CompileError::CaptureAfterWildcard {
                    segment: segment.to_string(),
                });
            }
            seen_wildcard = capture.is_wildcard();
            if let Some(name) = &capture.name {
                if !names.insert(name.as_str()) {
                    return Err(CompileError::DuplicateName { name: name.clone() });
                }
            }
        }
    }

    let regex = build_regex(&segments).map_err(|e| CompileError::Regex {
        pattern: source.to_string(),
        message: e.to_string(),
    })?;
    let captures = segments.iter().flat_map(Segment::captures).cloned().collect();

    Ok(RoutePattern {
        source: source.to_string(),
        segments,
        captures,
        regex,
    })
}

fn parse_segment(segment: &str) -> Result<Segment, CompileError> {
    let unbalanced = || CompileError::Unbalanced {
        segment: segment.to_string(),
    };

    let mut pieces = Vec::new();
    let mut rest = segment;
    while let Some(pos) = rest.find(['(', ')']) {
        if rest[pos..].starts_with(')') {
            return Err(unbalanced());
        }
        if pos > 0 {
            pieces.push(Piece::Literal(rest[..pos].to_string()));
        }
        let inner = &rest[pos + 1..];
        let close = inner.find(')').ok_or_else(unbalanced)?;
        let body = &inner[..close];
        if body.contains('(') {
            return Err(unbalanced());
        }
        pieces.push(Piece::Capture(parse_capture(segment, body)?));
        rest = &inner[close + 1..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest.to_string()));
    }

    Ok(Segment { pieces })
}

fn parse_capture(segment: &str, body: &str) -> Result<Capture, CompileError> {
    let (name, token) = match body.strip_prefix('<') {
        Some(named) => {
            let (name, token) = named.split_once('>').ok_or_else(|| CompileError::InvalidName {
                segment: segment.to_string(),
                name: named.to_string(),
            })?;
            if !is_valid_name(name) {
                return Err(CompileError::InvalidName {
                    segment: segment.to_string(),
                    name: name.to_string(),
                });
            }
            (Some(name.to_string()), token)
        }
        None => (None, body),
    };

    let unknown = || CompileError::UnknownToken {
        segment: segment.to_string(),
        token: token.to_string(),
    };
    let spec = token.strip_prefix(':').ok_or_else(unknown)?;
    let mut chars = spec.chars();
    let (Some(class), Some(quantifier), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(unknown());
    };
    let class = CharClass::from_token(class).ok_or_else(unknown)?;
    let required = match quantifier {
        '!' => true,
        '?' => false,
        _ => return Err(unknown()),
    };

    Ok(Capture {
        name,
        class,
        required,
    })
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn build_regex(segments: &[Segment]) -> Result<Regex, regex::Error> {
    let mut expr = String::from("^");
    // True while every segment so far may match nothing, so the next
    // separator is only needed if something was consumed.
    let mut empty_prefix = false;
    for (i, segment) in segments.iter().enumerate() {
        let separator = if empty_prefix { r"(?:\A|/)" } else { "/" };
        match (i, segment.lone_optional_capture()) {
            (0, Some(capture)) => {
                let _ = write!(expr, "({})", capture.regex());
                empty_prefix = true;
                continue;
            }
            (0, None) => {}
            (_, Some(capture)) => {
                let _ = write!(expr, "(?:{}({}))?", separator, capture.regex());
                continue;
            }
            (_, None) => {
                expr.push_str(separator);
                empty_prefix = false;
            }
        }
        for piece in &segment.pieces {
            match piece {
                Piece::Literal(text) => push_literal(&mut expr, text),
                Piece::Capture(capture) => {
                    let _ = write!(expr, "({})", capture.regex());
                }
            }
        }
    }
    expr.push('$');

    Regex::new(&expr)
}

/// Escape a literal, folding case for ASCII letters only.
fn push_literal(expr: &mut String, text: &str) {
    let mut buf = [0; 4];
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            let _ = write!(expr, "[{}{}]", c.to_ascii_lowercase(), c.to_ascii_uppercase());
        } else {
            expr.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        }
    }
}
