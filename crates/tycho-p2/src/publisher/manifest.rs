//! OSGi manifest header values.
//!
//! A header value is a comma separated list of clauses. Each clause holds
//! one or more `;` separated values followed by attributes (`key=value`,
//! optionally typed as `key:Type=value`) and directives (`key:=value`).
//! Quoted strings may contain any separator.

use indexmap::IndexMap;

/// Manifest headers, looked up case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    headers: IndexMap<String, String>,
}

impl Manifest {
    pub fn new(headers: IndexMap<String, String>) -> Self {
        Self { headers }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the clauses of a header; empty when the header is absent
    pub fn elements(&self, name: &str) -> Vec<ManifestElement> {
        self.get(name)
            .map(ManifestElement::parse_header)
            .unwrap_or_default()
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Manifest {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            headers: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// One clause of a header value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestElement {
    pub values: Vec<String>,
    pub attributes: IndexMap<String, String>,
    pub directives: IndexMap<String, String>,
}

impl ManifestElement {
    /// The first value of the clause
    pub fn value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn directive(&self, key: &str) -> Option<&str> {
        self.directives.get(key).map(String::as_str)
    }

    /// Parse a complete header value into its clauses
    pub fn parse_header(value: &str) -> Vec<ManifestElement> {
        split_unquoted(value, ',')
            .into_iter()
            .filter(|clause| !clause.trim().is_empty())
            .map(|clause| Self::parse_clause(&clause))
            .collect()
    }

    fn parse_clause(clause: &str) -> ManifestElement {
        let mut element = ManifestElement::default();

        for part in split_unquoted(clause, ';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((key, value)) = split_parameter(part, ":=") {
                element.directives.insert(key, value);
            } else if let Some((key, value)) = split_parameter(part, "=") {
                // typed attributes: drop the `:Type` suffix of the key
                let key = match key.split_once(':') {
                    Some((name, _)) => name.trim().to_string(),
                    None => key,
                };
                element.attributes.insert(key, value);
            } else {
                element.values.push(unquote(part));
            }
        }

        element
    }
}

/// Split `key<sep>value` when the separator occurs outside quotes
fn split_parameter(part: &str, separator: &str) -> Option<(String, String)> {
    let idx = find_unquoted(part, separator)?;
    if separator == "=" && part[..idx].ends_with(':') {
        return None;
    }
    let key = part[..idx].trim().to_string();
    let value = unquote(part[idx + separator.len()..].trim());
    Some((key, value))
}

fn find_unquoted(text: &str, pattern: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, c) in text.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes && text[idx..].starts_with(pattern) {
            return Some(idx);
        }
    }
    None
}

fn split_unquoted(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c == separator && !in_quotes => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_require_bundle() {
        let elements = ManifestElement::parse_header(
            r#"org.eclipse.core.runtime;bundle-version="[3.0.0,4.0.0)",org.foo;resolution:=optional;x-installation:=greedy"#,
        );

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].value(), "org.eclipse.core.runtime");
        assert_eq!(elements[0].attribute("bundle-version"), Some("[3.0.0,4.0.0)"));
        assert_eq!(elements[1].directive("resolution"), Some("optional"));
        assert_eq!(elements[1].directive("x-installation"), Some("greedy"));
    }

    #[test]
    fn test_multiple_values_and_typed_attribute() {
        let elements = ManifestElement::parse_header("a.b;a.c;version:Version=1.2,d");

        assert_eq!(elements[0].values, vec!["a.b", "a.c"]);
        assert_eq!(elements[0].attribute("version"), Some("1.2"));
        assert_eq!(elements[1].value(), "d");
    }

    #[test]
    fn test_quoted_filter_directive() {
        let elements = ManifestElement::parse_header(
            r#"osgi.service;filter:="(&(objectClass=a.B)(x=1,2))";effective:=active"#,
        );

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].directive("filter"), Some("(&(objectClass=a.B)(x=1,2))"));
        assert_eq!(elements[0].directive("effective"), Some("active"));
    }

    #[test]
    fn test_manifest_lookup_is_case_insensitive() {
        let manifest: Manifest = [("Bundle-SymbolicName", "x")].into_iter().collect();
        assert_eq!(manifest.get("bundle-symbolicname"), Some("x"));
        assert!(manifest.elements("Import-Package").is_empty());
    }
}
