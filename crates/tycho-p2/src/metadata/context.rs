use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::filter::FilterProperties;

/// Properties that unit and requirement filters are evaluated against.
///
/// Keys are stored lowercase; insertion order is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionContext {
    properties: IndexMap<String, String>,
}

impl SelectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, returning the context for chaining
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.properties
            .insert(key.as_ref().to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Copy every property of `other` that is not already set
    pub fn merge_missing(&mut self, other: &SelectionContext) {
        for (key, value) in other.iter() {
            self.properties
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

impl FilterProperties for SelectionContext {
    fn property(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(Cow::Borrowed)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for SelectionContext {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut context = SelectionContext::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

impl fmt::Display for SelectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .properties
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}", pairs.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_lowercased() {
        let ctx = SelectionContext::new().with("OSGI.OS", "linux");
        assert_eq!(ctx.get("osgi.os"), Some("linux"));
        assert_eq!(ctx.get("Osgi.Os"), Some("linux"));
    }

    #[test]
    fn test_display_keeps_order() {
        let ctx: SelectionContext = vec![("osgi.os", "win32"), ("osgi.ws", "win32"), ("osgi.arch", "x86_64")]
            .into_iter()
            .collect();
        assert_eq!(ctx.to_string(), "osgi.os=win32, osgi.ws=win32, osgi.arch=x86_64");
    }

    #[test]
    fn test_merge_missing_keeps_existing() {
        let mut ctx = SelectionContext::new().with("a", "1");
        ctx.merge_missing(&SelectionContext::new().with("a", "2").with("b", "3"));
        assert_eq!(ctx.get("a"), Some("1"));
        assert_eq!(ctx.get("b"), Some("3"));
    }
}
