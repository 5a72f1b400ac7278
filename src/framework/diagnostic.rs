//! Diagnostics returned to the framework instead of hard failures.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ProviderError};

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// The operation failed.
    Error,
    /// The operation succeeded but something needs attention.
    Warning,
}

/// A user-facing message with a short title and a longer detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Returns true for error diagnostics.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Error)
    }
}

impl From<&ProviderError> for Diagnostic {
    fn from(err: &ProviderError) -> Self {
        let summary = match err {
            ProviderError::Config(_) => String::from("Invalid provider configuration"),
            ProviderError::Input(_) => String::from("Invalid input"),
            ProviderError::Lookup(crate::error::LookupError::NotFound { kind, .. })
            | ProviderError::Api(ApiError::NotFound { kind, .. }) => {
                format!("{} not found", capitalize(kind))
            }
            ProviderError::Lookup(crate::error::LookupError::Ambiguous { kind, .. }) => {
                format!("Multiple {kind}s found")
            }
            ProviderError::Api(_) => String::from("Braintrust API error"),
            ProviderError::Serialization(_) => String::from("Serialization error"),
            ProviderError::Io(_) | ProviderError::Internal(_) => String::from("Internal error"),
        };

        let detail = match err {
            ProviderError::Config(inner) => inner.to_string(),
            ProviderError::Input(inner) => inner.to_string(),
            ProviderError::Lookup(inner) => inner.to_string(),
            ProviderError::Api(inner) => inner.to_string(),
            ProviderError::Serialization(inner) => inner.to_string(),
            ProviderError::Io(inner) => inner.to_string(),
            ProviderError::Internal(message) => message.clone(),
        };

        Self::error(summary).with_detail(detail)
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        Self::from(&err)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Appends the diagnostic for an error.
    pub fn push_error(&mut self, err: &ProviderError) {
        self.0.push(Diagnostic::from(err));
    }

    /// Appends every diagnostic from `other`.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Returns true if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the diagnostics in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(items: Vec<Diagnostic>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            DiagnosticSeverity::Error => "Error",
            DiagnosticSeverity::Warning => "Warning",
        };
        write!(f, "{level}: {}", self.summary)?;
        if let Some(attribute) = &self.attribute {
            write!(f, " (at {attribute})")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, "\n  {detail}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InputError, LookupError};

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::error("Invalid configuration")
            .with_detail("The value must be positive")
            .with_attribute("limit");

        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.summary, "Invalid configuration");
        assert_eq!(diag.detail.as_deref(), Some("The value must be positive"));
        assert_eq!(diag.attribute.as_deref(), Some("limit"));
    }

    #[test]
    fn test_lookup_errors_render_distinct_titles() {
        let not_found = Diagnostic::from(ProviderError::Lookup(LookupError::NotFound {
            kind: "project",
            key: "name",
            value: String::from("demo"),
        }));
        let ambiguous = Diagnostic::from(ProviderError::Lookup(LookupError::Ambiguous {
            kind: "project",
            key: "name",
            value: String::from("demo"),
            count: 3,
        }));

        assert_eq!(not_found.summary, "Project not found");
        assert_eq!(ambiguous.summary, "Multiple projects found");
        assert_ne!(not_found.detail, ambiguous.detail);
    }

    #[test]
    fn test_input_error_title() {
        let diag = Diagnostic::from(ProviderError::Input(InputError::NonPositiveLimit {
            value: 0,
        }));
        assert_eq!(diag.summary, "Invalid input");
        assert!(diag.detail.unwrap_or_default().contains("greater than zero"));
    }

    #[test]
    fn test_has_errors() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning("heads up"));
        assert!(!diags.has_errors());
        diags.push(Diagnostic::error("broken"));
        assert!(diags.has_errors());
        assert_eq!(diags.len(), 2);
    }
}
