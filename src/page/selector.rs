//! Minimal CSS selector dialect used by the DOM contract
//!
//! Only what the page markup contract needs: comma-separated groups of
//! compound selectors (`tag`, `#id`, `.class`, `[attr]`, `[attr=v]`,
//! `[attr^=v]`). Combinators are rejected.

use std::fmt;
use thiserror::Error;

/// Errors produced while parsing a selector string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character {found:?} at offset {offset} in {input:?}")]
    Unexpected {
        input: String,
        offset: usize,
        found: char,
    },
    #[error("unterminated attribute selector in {0:?}")]
    UnterminatedAttribute(String),
    #[error("combinators are not supported: {0:?}")]
    Combinator(String),
}

/// Anything a selector can be matched against
pub trait SelectorSubject {
    fn tag(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches<S: SelectorSubject + ?Sized>(&self, subject: &S) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !subject.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if subject.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| subject.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| match (&a.op, subject.attr(&a.name)) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(v), Some(actual)) => actual == v,
            (AttrOp::Prefix(v), Some(actual)) => actual.starts_with(v.as_str()),
        })
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Compound>,
}

impl Selector {
    /// Parse a selector list such as `.c-form, form` or `a[href^="#"]`
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut groups = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(SelectorError::Empty);
            }
            groups.push(parse_compound(part)?);
        }
        Ok(Self {
            source: input.trim().to_string(),
            groups,
        })
    }

    /// Check whether any group matches the subject
    pub fn matches<S: SelectorSubject + ?Sized>(&self, subject: &S) -> bool {
        self.groups.iter().any(|g| g.matches(subject))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(part: &str) -> Result<Compound, SelectorError> {
    let chars: Vec<char> = part.chars().collect();
    let mut compound = Compound::default();
    let mut i = 0;

    let read_ident = |start: usize| -> (String, usize) {
        let mut end = start;
        while end < chars.len() && is_ident_char(chars[end]) {
            end += 1;
        }
        (chars[start..end].iter().collect(), end)
    };

    if i < chars.len() && chars[i] == '*' {
        compound.tag = Some("*".to_string());
        i += 1;
    } else if i < chars.len() && is_ident_char(chars[i]) {
        let (tag, end) = read_ident(i);
        compound.tag = Some(tag.to_ascii_lowercase());
        i = end;
    }

    while i < chars.len() {
        match chars[i] {
            '.' | '#' => {
                let (name, end) = read_ident(i + 1);
                if name.is_empty() {
                    return Err(SelectorError::Unexpected {
                        input: part.to_string(),
                        offset: i,
                        found: chars[i],
                    });
                }
                if chars[i] == '.' {
                    compound.classes.push(name);
                } else {
                    compound.id = Some(name);
                }
                i = end;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| SelectorError::UnterminatedAttribute(part.to_string()))?;
                let body: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&body, part)?);
                i = close + 1;
            }
            c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                return Err(SelectorError::Combinator(part.to_string()));
            }
            c => {
                return Err(SelectorError::Unexpected {
                    input: part.to_string(),
                    offset: i,
                    found: c,
                });
            }
        }
    }

    if compound.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(compound)
}

fn parse_attr(body: &str, part: &str) -> Result<AttrMatch, SelectorError> {
    let (name, op) = if let Some((name, value)) = body.split_once("^=") {
        (name, AttrOp::Prefix(unquote(value)))
    } else if let Some((name, value)) = body.split_once('=') {
        (name, AttrOp::Equals(unquote(value)))
    } else {
        (body, AttrOp::Exists)
    };
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(SelectorError::UnterminatedAttribute(part.to_string()));
    }
    Ok(AttrMatch {
        name: name.to_string(),
        op,
    })
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}
