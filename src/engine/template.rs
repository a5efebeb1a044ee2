//! Path templates.
//!
//! A template is a literal `/`-separated path containing variable tokens.
//! A token is one of `{name}`, `{name[i]}`, `{name:default}`, or
//! `{name[i]:default}`. Anything that does not scan as a complete token is
//! kept as literal text, so a malformed template still renders.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::engine::env::Env;

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Token(Token),
}

/// A single `{...}` substitution token.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    name: String,
    index: Option<usize>,
    default: Option<String>,
    /// The original token text, preserved when the variable is absent.
    raw: String,
}

impl Template {
    /// Parse a template string.
    ///
    /// Parsing never fails: malformed tokens stay literal.
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            match scan_token(&rest[open..]) {
                Some((token, consumed)) => {
                    literal.push_str(&rest[..open]);
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(Part::Token(token));
                    rest = &rest[open + consumed..];
                }
                None => {
                    // Not a token, the brace is literal text.
                    literal.push_str(&rest[..=open]);
                    rest = &rest[open + 1..];
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Self {
            source: source.to_string(),
            parts,
        }
    }

    /// The original template string.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The set of variable names this template references, in order of first
    /// use. Indexes and defaults do not contribute.
    pub fn variables(&self) -> IndexSet<String> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Token(token) => Some(token.name.clone()),
                Part::Literal(_) => None,
            })
            .collect()
    }

    /// Substitute the environment into the template in a single pass.
    pub fn render(&self, env: &Env) -> String {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Token(token) => out.push_str(&token.resolve(env)),
            }
        }
        out
    }

    /// Render the destination path for the given environment: substitute,
    /// clean up the path segments, and place the result under the output
    /// directory if it is not already there.
    pub fn render_into(&self, env: &Env, output: &Path) -> PathBuf {
        let cleaned = clean_path(&self.render(env));
        if Path::new(&cleaned).starts_with(output) {
            PathBuf::from(cleaned)
        } else {
            output.join(cleaned.strip_prefix('/').unwrap_or(&cleaned))
        }
    }
}

impl From<&str> for Template {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Token {
    fn resolve(&self, env: &Env) -> String {
        if let Some(i) = self.index {
            let elem = match env.get(&self.name) {
                Some(value) => value.as_list().and_then(|list| list.get(i)),
                None => None,
            };
            return match (elem, &self.default) {
                (Some(elem), _) => elem.clone(),
                (None, Some(default)) => default.clone(),
                (None, None) => "unknown".to_string(),
            };
        }
        match (&self.default, env.get(&self.name)) {
            (Some(default), value) => match value {
                Some(value) if value.is_truthy() => value.to_string(),
                _ => default.clone(),
            },
            // Null, empty string, and empty list all display as "".
            (None, Some(value)) => value.to_string(),
            // The variable is unresolved, keep the token text.
            (None, None) => self.raw.clone(),
        }
    }
}

/// Try to scan a complete token at the start of `s` (which begins with `{`).
/// Returns the token and the number of bytes consumed.
fn scan_token(s: &str) -> Option<(Token, usize)> {
    let inner = &s[1..];
    let mut pos = 0;

    // NAME: letters, digits, underscores; starts non-digit.
    for (i, c) in inner.char_indices() {
        let ok = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !ok {
            break;
        }
        pos = i + c.len_utf8();
    }
    if pos == 0 {
        return None;
    }
    let name = inner[..pos].to_string();

    // INDEX: '[' digits ']'
    let mut index = None;
    if inner[pos..].starts_with('[') {
        let close = inner[pos..].find(']')?;
        let digits = &inner[pos + 1..pos + close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        index = Some(digits.parse().ok()?);
        pos += close + 1;
    }

    // DEFAULT: ':' followed by anything except '}'
    let mut default = None;
    if inner[pos..].starts_with(':') {
        let close = inner[pos..].find('}')?;
        default = Some(inner[pos + 1..pos + close].to_string());
        pos += close;
    }

    if !inner[pos..].starts_with('}') {
        return None;
    }
    let consumed = pos + 2;
    Some((
        Token {
            name,
            index,
            default,
            raw: s[..consumed].to_string(),
        },
        consumed,
    ))
}

/// Clean a rendered path: split on `/`, drop segments that are empty or all
/// whitespace, trim the rest, and rejoin. A leading `/` is preserved.
fn clean_path(path: &str) -> String {
    let joined = path
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if path.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////
