//! Multi-part diagnostics.

use std::fmt;

use serde::Serialize;

/// Severity of a status, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Error,
    Cancel,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Cancel => "CANCEL",
        }
    }
}

/// A status tree: a severity and message plus nested causes.
///
/// A multi-status takes the highest severity of its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    severity: Severity,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Status>,
}

impl Status {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            children: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(Severity::Ok, "OK")
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn cancel(message: impl Into<String>) -> Self {
        Self::new(Severity::Cancel, message)
    }

    /// Create a multi-status from child statuses
    pub fn multi(message: impl Into<String>, children: Vec<Status>) -> Self {
        let severity = children
            .iter()
            .map(|c| c.severity)
            .max()
            .unwrap_or(Severity::Ok);
        Self {
            severity,
            message: message.into(),
            children,
        }
    }

    /// Add a child, raising the severity if needed
    pub fn add(&mut self, child: Status) {
        self.severity = self.severity.max(child.severity);
        self.children.push(child);
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn children(&self) -> &[Status] {
        &self.children
    }

    pub fn is_ok(&self) -> bool {
        self.severity <= Severity::Info
    }

    pub fn is_multi(&self) -> bool {
        !self.children.is_empty()
    }

    /// All messages in this tree, depth first
    pub fn messages(&self) -> Vec<&str> {
        let mut out = vec![self.message.as_str()];
        for child in &self.children {
            out.extend(child.messages());
        }
        out
    }

    /// Check if any message in the tree contains the given text
    pub fn mentions(&self, text: &str) -> bool {
        self.messages().iter().any(|m| m.contains(text))
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for child in &self.children {
            writeln!(f)?;
            write!(f, "{}- {}", "  ".repeat(depth), child.message)?;
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        self.write_indented(f, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_takes_highest_severity() {
        let status = Status::multi(
            "Resolution failed",
            vec![Status::warning("w"), Status::error("e"), Status::info("i")],
        );
        assert_eq!(status.severity(), Severity::Error);
        assert!(!status.is_ok());
        assert_eq!(status.children().len(), 3);
    }

    #[test]
    fn test_empty_multi_is_ok() {
        let status = Status::multi("Nothing", vec![]);
        assert!(status.is_ok());
    }

    #[test]
    fn test_display_renders_tree() {
        let mut status = Status::multi("top", vec![Status::error("first")]);
        status.add(Status::multi("second", vec![Status::error("nested")]));

        let text = status.to_string();
        assert_eq!(text, "top\n  - first\n  - second\n    - nested");
        assert!(status.mentions("nested"));
        assert!(!status.mentions("absent"));
    }
}
