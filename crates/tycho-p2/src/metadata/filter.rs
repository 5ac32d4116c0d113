//! LDAP-style filters over string properties.
//!
//! The same filter language gates units and requirements against a
//! selection context (`(osgi.os=linux)`) and matches generic capabilities
//! by their attributes (`(&(osgi.ee=JavaSE)(version=17))`).

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tycho_version::Version;

use crate::error::{P2Error, Result};

/// Source of property values a filter is evaluated against.
///
/// Keys are matched case-insensitively.
pub trait FilterProperties {
    fn property(&self, key: &str) -> Option<Cow<'_, str>>;
}

/// A parsed filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equal { key: String, value: String },
    Approx { key: String, value: String },
    GreaterEq { key: String, value: String },
    LessEq { key: String, value: String },
    Present(String),
    /// `(key=a*b*c)`; the parts between wildcards, empty at unanchored ends
    Substring { key: String, parts: Vec<String> },
}

impl Filter {
    /// Parse filter text such as `(&(osgi.os=linux)(osgi.arch=x86_64))`
    pub fn parse(text: &str) -> Result<Filter> {
        let mut parser = Parser {
            text,
            chars: text.chars().collect(),
            pos: 0,
        };
        let filter = parser.parse_filter()?;
        parser.skip_whitespace();
        if parser.pos != parser.chars.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(filter)
    }

    pub fn equal(key: impl Into<String>, value: impl Into<String>) -> Filter {
        Filter::Equal {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Conjunction of filters, collapsing the single-element case
    pub fn and(mut filters: Vec<Filter>) -> Filter {
        if filters.len() == 1 {
            filters.remove(0)
        } else {
            Filter::And(filters)
        }
    }

    /// Disjunction of filters, collapsing the single-element case
    pub fn or(mut filters: Vec<Filter>) -> Filter {
        if filters.len() == 1 {
            filters.remove(0)
        } else {
            Filter::Or(filters)
        }
    }

    pub fn negate(filter: Filter) -> Filter {
        Filter::Not(Box::new(filter))
    }

    /// Evaluate this filter against a set of properties
    pub fn matches<P: FilterProperties + ?Sized>(&self, props: &P) -> bool {
        match self {
            Filter::And(filters) => filters.iter().all(|f| f.matches(props)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(props)),
            Filter::Not(filter) => !filter.matches(props),
            Filter::Present(key) => props.property(key).is_some(),
            Filter::Equal { key, value } => props
                .property(key)
                .map(|actual| compare(&actual, value) == Ordering::Equal)
                .unwrap_or(false),
            Filter::Approx { key, value } => props
                .property(key)
                .map(|actual| normalize_approx(&actual) == normalize_approx(value))
                .unwrap_or(false),
            Filter::GreaterEq { key, value } => props
                .property(key)
                .map(|actual| compare(&actual, value) != Ordering::Less)
                .unwrap_or(false),
            Filter::LessEq { key, value } => props
                .property(key)
                .map(|actual| compare(&actual, value) != Ordering::Greater)
                .unwrap_or(false),
            Filter::Substring { key, parts } => props
                .property(key)
                .map(|actual| matches_substring(&actual, parts))
                .unwrap_or(false),
        }
    }
}

/// Integers compare numerically, versions as versions, anything else as text
fn compare(actual: &str, expected: &str) -> Ordering {
    let (a, e) = (actual.trim(), expected.trim());
    if let (Ok(a), Ok(e)) = (a.parse::<i64>(), e.parse::<i64>()) {
        return a.cmp(&e);
    }
    if let (Ok(a), Ok(e)) = (Version::parse(a), Version::parse(e)) {
        return a.cmp(&e);
    }
    actual.cmp(expected)
}

fn normalize_approx(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn matches_substring(actual: &str, parts: &[String]) -> bool {
    let Some((first, rest)) = parts.split_first() else {
        return true;
    };
    let Some((last, middle)) = rest.split_last() else {
        return actual == first;
    };

    if !actual.starts_with(first.as_str()) {
        return false;
    }
    let mut remaining = &actual[first.len()..];
    for part in middle {
        match remaining.find(part.as_str()) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last.as_str())
}

struct Parser<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> P2Error {
        P2Error::InvalidFilter {
            filter: self.text.to_string(),
            reason: format!("{} at position {}", reason, self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn parse_filter(&mut self) -> Result<Filter> {
        self.expect('(')?;
        self.skip_whitespace();
        let filter = match self.peek() {
            Some('&') => {
                self.pos += 1;
                Filter::And(self.parse_list()?)
            }
            Some('|') => {
                self.pos += 1;
                Filter::Or(self.parse_list()?)
            }
            Some('!') => {
                self.pos += 1;
                Filter::Not(Box::new(self.parse_filter()?))
            }
            Some(_) => self.parse_item()?,
            None => return Err(self.error("unexpected end of filter")),
        };
        self.expect(')')?;
        Ok(filter)
    }

    fn parse_list(&mut self) -> Result<Vec<Filter>> {
        let mut filters = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() != Some('(') {
                break;
            }
            filters.push(self.parse_filter()?);
        }
        if filters.is_empty() {
            return Err(self.error("empty filter list"));
        }
        Ok(filters)
    }

    fn parse_item(&mut self) -> Result<Filter> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '=' | '~' | '<' | '>' | '(' | ')') {
                break;
            }
            self.pos += 1;
        }
        let key: String = self.chars[start..self.pos].iter().collect();
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(self.error("missing attribute name"));
        }

        let op = match self.peek() {
            Some('=') => {
                self.pos += 1;
                '='
            }
            Some(c @ ('~' | '<' | '>')) => {
                self.pos += 1;
                if self.peek() != Some('=') {
                    return Err(self.error("expected '='"));
                }
                self.pos += 1;
                c
            }
            _ => return Err(self.error("expected operator")),
        };

        let parts = self.parse_value()?;

        match op {
            '=' if parts.len() == 2 && parts.iter().all(|p| p.is_empty()) => Ok(Filter::Present(key)),
            '=' if parts.len() > 1 => Ok(Filter::Substring { key, parts }),
            _ if parts.len() > 1 => Err(self.error("wildcard only allowed with '='")),
            '=' => Ok(Filter::Equal { key, value: single_value(parts) }),
            '~' => Ok(Filter::Approx { key, value: single_value(parts) }),
            '>' => Ok(Filter::GreaterEq { key, value: single_value(parts) }),
            _ => Ok(Filter::LessEq { key, value: single_value(parts) }),
        }
    }

    /// Read a value up to the closing paren, split on unescaped `*`
    fn parse_value(&mut self) -> Result<Vec<String>> {
        let mut parts = vec![String::new()];
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated value")),
                Some(')') => break,
                Some('(') => return Err(self.error("unescaped '(' in value")),
                Some('\\') => {
                    self.pos += 1;
                    let Some(c) = self.peek() else {
                        return Err(self.error("dangling escape"));
                    };
                    if let Some(last) = parts.last_mut() {
                        last.push(c);
                    }
                    self.pos += 1;
                }
                Some('*') => {
                    parts.push(String::new());
                    self.pos += 1;
                }
                Some(c) => {
                    if let Some(last) = parts.last_mut() {
                        last.push(c);
                    }
                    self.pos += 1;
                }
            }
        }
        Ok(parts)
    }
}

fn single_value(mut parts: Vec<String>) -> String {
    parts.pop().unwrap_or_default()
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '*' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(filters) => {
                write!(f, "(&")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                write!(f, ")")
            }
            Filter::Or(filters) => {
                write!(f, "(|")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                write!(f, ")")
            }
            Filter::Not(filter) => write!(f, "(!{})", filter),
            Filter::Equal { key, value } => write!(f, "({}={})", key, escape(value)),
            Filter::Approx { key, value } => write!(f, "({}~={})", key, escape(value)),
            Filter::GreaterEq { key, value } => write!(f, "({}>={})", key, escape(value)),
            Filter::LessEq { key, value } => write!(f, "({}<={})", key, escape(value)),
            Filter::Present(key) => write!(f, "({}=*)", key),
            Filter::Substring { key, parts } => {
                let escaped: Vec<String> = parts.iter().map(|p| escape(p)).collect();
                write!(f, "({}={})", key, escaped.join("*"))
            }
        }
    }
}

impl FromStr for Filter {
    type Err = P2Error;

    fn from_str(s: &str) -> Result<Self> {
        Filter::parse(s)
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Filter::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SelectionContext;

    fn linux() -> SelectionContext {
        SelectionContext::new()
            .with("osgi.os", "linux")
            .with("osgi.ws", "gtk")
            .with("osgi.arch", "x86_64")
    }

    #[test]
    fn test_simple_equality() {
        let filter = Filter::parse("(osgi.os=linux)").unwrap();
        assert!(filter.matches(&linux()));
        assert!(!Filter::parse("(osgi.os=win32)").unwrap().matches(&linux()));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let filter = Filter::parse("(OSGI.OS=linux)").unwrap();
        assert!(filter.matches(&linux()));
    }

    #[test]
    fn test_composite() {
        let filter =
            Filter::parse("(& (osgi.os=linux) (| (osgi.arch=x86_64) (osgi.arch=aarch64)) (!(osgi.ws=win32)))")
                .unwrap();
        assert!(filter.matches(&linux()));

        let other = SelectionContext::new().with("osgi.os", "linux").with("osgi.arch", "ppc64le");
        assert!(!filter.matches(&other));
    }

    #[test]
    fn test_presence_and_substring() {
        assert!(Filter::parse("(osgi.ws=*)").unwrap().matches(&linux()));
        assert!(!Filter::parse("(osgi.nl=*)").unwrap().matches(&linux()));
        assert!(Filter::parse("(osgi.arch=x86*)").unwrap().matches(&linux()));
        assert!(Filter::parse("(osgi.arch=*_64)").unwrap().matches(&linux()));
        assert!(Filter::parse("(osgi.arch=x*6*4)").unwrap().matches(&linux()));
        assert!(!Filter::parse("(osgi.arch=arm*)").unwrap().matches(&linux()));
    }

    #[test]
    fn test_version_and_integer_comparison() {
        let ctx = SelectionContext::new().with("version", "17.0.0").with("count", "10");
        assert!(Filter::parse("(version=17)").unwrap().matches(&ctx));
        assert!(Filter::parse("(version>=11)").unwrap().matches(&ctx));
        assert!(!Filter::parse("(version<=1.8)").unwrap().matches(&ctx));
        assert!(Filter::parse("(count>=9)").unwrap().matches(&ctx));
        assert!(!Filter::parse("(count<=9)").unwrap().matches(&ctx));
    }

    #[test]
    fn test_approx() {
        let ctx = SelectionContext::new().with("name", "Hello World");
        assert!(Filter::parse("(name~=helloworld)").unwrap().matches(&ctx));
    }

    #[test]
    fn test_missing_property_never_matches() {
        let ctx = SelectionContext::new();
        assert!(!Filter::parse("(osgi.os=linux)").unwrap().matches(&ctx));
        assert!(Filter::parse("(!(osgi.os=linux))").unwrap().matches(&ctx));
    }

    #[test]
    fn test_malformed() {
        for text in ["", "osgi.os=linux", "(osgi.os=linux", "(&)", "(=linux)", "(a>b)", "(a=b))"] {
            assert!(Filter::parse(text).is_err(), "{} should not parse", text);
        }
    }

    #[test]
    fn test_display_roundtrip() {
        let text = "(&(osgi.os=linux)(|(osgi.arch=x86_64)(osgi.arch=aarch64))(!(a=*))(b=x*y)(c>=1.0))";
        let filter = Filter::parse(text).unwrap();
        assert_eq!(filter.to_string(), text);
        assert_eq!(Filter::parse(&filter.to_string()).unwrap(), filter);
    }

    #[test]
    fn test_escaped_value() {
        let filter = Filter::parse(r"(name=a\*b)").unwrap();
        assert_eq!(filter, Filter::equal("name", "a*b"));
        assert_eq!(filter.to_string(), r"(name=a\*b)");
    }
}
