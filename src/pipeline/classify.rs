//! Line classification: tag each text line as Heading, Code, Math or Point.
//!
//! The policy is an ordered rule table evaluated first-match-wins, with
//! [`LineKind::Point`] as the fallback. Order is load-bearing:
//!
//! 1. **Heading**: the line starts with `AIM:`, `Objective:` or `Goal:`
//!    (any case). `"AIM: x = 1"` is a heading even though it contains `=`.
//! 2. **Code**: a programming keyword as a whole word *and* one of
//!    `{ } ( ) ; =`. Code lines usually satisfy the Math rule too.
//! 3. **Math**: one of `^ = + - * /` and fewer than 100 characters.
//! 4. **Point**: everything else.

use super::cluster::TextLine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a highlighted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Heading,
    Code,
    Math,
    Point,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineKind::Heading => "heading",
            LineKind::Code => "code",
            LineKind::Math => "math",
            LineKind::Point => "point",
        })
    }
}

/// One highlighted line with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub kind: LineKind,
    pub text: String,
}

impl ClassifiedLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(AIM:|Objective:|Goal:)").unwrap());

static RE_CODE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(def|class|public|static|void|int|String|import|from)\b").unwrap()
});

const CODE_PUNCTUATION: &[char] = &['{', '}', '(', ')', ';', '='];
const MATH_OPERATORS: &[char] = &['^', '=', '+', '-', '*', '/'];
const MATH_MAX_CHARS: usize = 100;

fn is_heading(text: &str) -> bool {
    RE_HEADING.is_match(text)
}

fn is_code(text: &str) -> bool {
    RE_CODE_KEYWORD.is_match(text) && text.contains(CODE_PUNCTUATION)
}

fn is_math(text: &str) -> bool {
    text.contains(MATH_OPERATORS) && text.chars().count() < MATH_MAX_CHARS
}

type Rule = (fn(&str) -> bool, LineKind);

/// The classification policy, in priority order.
pub const RULES: &[Rule] = &[
    (is_heading, LineKind::Heading),
    (is_code, LineKind::Code),
    (is_math, LineKind::Math),
];

/// Classify a single line of text.
pub fn classify(text: &str) -> LineKind {
    RULES
        .iter()
        .find(|(matches, _)| matches(text))
        .map(|&(_, kind)| kind)
        .unwrap_or(LineKind::Point)
}

/// Classify a clustered line, taking ownership of its text.
pub fn classify_line(line: TextLine) -> ClassifiedLine {
    ClassifiedLine {
        kind: classify(&line.text),
        text: line.text,
    }
}
